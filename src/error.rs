use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::feature::Feature;
use crate::gemini::ModelError;
use crate::quality::QualityError;
use crate::upload::UploadRejection;

#[derive(Debug, Error)]
pub enum AppError {
    /// A required form field was absent or empty
    #[error("{0}")]
    MissingInput(&'static str),

    /// An image failed upload validation
    #[error("{field}: {rejection}")]
    InvalidUpload {
        field: &'static str,
        rejection: UploadRejection,
    },

    /// The multipart body could not be read
    #[error(transparent)]
    Multipart(#[from] MultipartError),

    #[error(transparent)]
    UnreadableImage(#[from] QualityError),

    /// The model call failed; only the feature's message reaches the client
    #[error("{}", .feature.failure_message())]
    Downstream {
        feature: Feature,
        #[source]
        source: ModelError,
    },
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::MissingInput(_) | AppError::InvalidUpload { .. } | AppError::UnreadableImage(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::Multipart(err) => err.status(),
            AppError::Downstream { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn user_message(&self) -> String {
        match self {
            AppError::Multipart(err) if err.status() == StatusCode::PAYLOAD_TOO_LARGE => {
                UploadRejection::TooLarge.to_string()
            }
            AppError::Multipart(err) => err.body_text(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::Downstream { feature, source } => {
                tracing::error!(feature = feature.slug(), error = %source, "Model call failed");
            }
            other => {
                tracing::info!("Rejected request: {}", other);
            }
        }

        let body = ErrorBody {
            error: self.user_message(),
        };
        (self.status_code(), Json(body)).into_response()
    }
}
