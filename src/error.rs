use crate::exposition;
use axum::{
    http::StatusCode,
    response::{
        IntoResponse,
        Response,
    },
};

#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("Rendering the collected metrics failed: {0}")]
    Exposition(#[from] exposition::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        error!(error = ?self, "scrape failed");
        (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()).into_response()
    }
}
