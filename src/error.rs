use actix_web::{HttpResponse, ResponseError};
use reqwest::StatusCode;
use serde_json::json;

use crate::{config::ConfigDecodeError, entur::error::EnturError};

#[derive(thiserror::Error, Debug)]
pub enum TavlaError {
    #[error("Entur error: {0}")]
    Entur(#[from] EnturError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigDecodeError),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl ResponseError for TavlaError {
    fn error_response(&self) -> HttpResponse<actix_web::body::BoxBody> {
        match self {
            TavlaError::NotFound(message) => {
                HttpResponse::build(self.status_code()).json(json!({ "error": message }))
            }
            other => {
                log::error!("{}", other);
                HttpResponse::InternalServerError().finish()
            }
        }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            TavlaError::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<TavlaError> for std::io::Error {
    fn from(e: TavlaError) -> std::io::Error {
        std::io::Error::new(std::io::ErrorKind::Other, e)
    }
}

pub type TavlaResult<T> = Result<T, TavlaError>;
