mod error;
mod protocol;
mod room;
mod routes;
mod state;

use axum::{http::Method, Extension, Router};
use tower_http::cors::{Any, CorsLayer};

use crate::room::RoomRegistry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt().init();

    let rooms = RoomRegistry::default();

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    let app = Router::new()
        .merge(routes::router())
        .layer(Extension(rooms))
        .layer(cors);

    let port = std::env::var("PORT").unwrap_or_else(|_| "5000".into());
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}")).await?;
    tracing::info!("backend running on port {port}");
    axum::serve(listener, app.into_make_service()).await?;
    Ok(())
}
