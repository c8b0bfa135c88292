use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

pub type AppResult<T> = Result<T, AppErr>;

#[derive(thiserror::Error, Debug)]
pub enum AppErr {
    /// Only surfaced for `joinRoom`; every other operation on an unknown
    /// room is a silent no-op.
    #[error("Room not found")]
    RoomNotFound,

    #[error("Missing query")]
    MissingQuery,

    #[error("{0}")]
    UpstreamForbidden(String),

    #[error("{0}")]
    Upstream(String),

    #[error("request error: {0}")]
    Http(#[from] reqwest::Error),
}

impl IntoResponse for AppErr {
    fn into_response(self) -> axum::response::Response {
        let code = match &self {
            AppErr::RoomNotFound => StatusCode::NOT_FOUND,
            AppErr::MissingQuery => StatusCode::BAD_REQUEST,
            AppErr::UpstreamForbidden(_) => StatusCode::FORBIDDEN,
            AppErr::Upstream(_) | AppErr::Http(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (code, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
