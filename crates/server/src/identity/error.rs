use axum::{
    Json,
    response::{IntoResponse, Response},
};
use http::StatusCode;
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("Client certificate required/invalid")]
    Unauthorized,
}

impl IntoResponse for IdentityError {
    fn into_response(self) -> Response {
        #[derive(Serialize)]
        struct Content {
            detail: String,
        }

        let status = match self {
            IdentityError::Unauthorized => StatusCode::UNAUTHORIZED,
        };

        (status, Json(Content { detail: self.to_string() })).into_response()
    }
}
