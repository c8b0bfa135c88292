use axum::Router;

pub mod search;
pub mod ws;

pub fn router() -> Router {
    Router::new()
        .nest("/api/search", search::router())
        .merge(ws::router())
}
