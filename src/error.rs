use actix_web::{
    error::BlockingError,
    http::{header::ContentType, StatusCode},
    HttpResponse, ResponseError,
};

use crate::parts::PersistError;

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    /// The request lacked the `image` file or a non-empty `text` label
    #[error("Missing image or text")]
    MissingField,
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Persist(#[from] PersistError),
    #[error("could not encode metadata: {0}")]
    Json(#[from] serde_json::Error),
    #[error("blocking task was cancelled")]
    Blocking(#[from] BlockingError),
}

impl ResponseError for UploadError {
    fn status_code(&self) -> StatusCode {
        match self {
            UploadError::MissingField => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let body = match self {
            UploadError::MissingField => self.to_string(),
            _ => {
                log::error!("upload failed: {}", self);
                status.canonical_reason().unwrap_or_default().to_owned()
            }
        };
        HttpResponse::build(status).content_type(ContentType::plaintext()).body(body)
    }
}
