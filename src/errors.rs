use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RepoError {
    #[error("Database backend error: {0}")]
    BackendError(#[from] anyhow::Error), // Wrap Anyhow errors from DB layer

    #[error("Stored data is malformed: {0}")]
    DataCorruption(String),
}

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Meme catalog could not be read from {path}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Meme catalog at {path} is not a valid template list: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Error, Debug)]
pub enum CompletionError {
    #[error("Completion request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Completion API returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Completion API returned no content")]
    EmptyContent,
}

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Render request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Render API returned {0}")]
    Status(u16),
    #[error("Render API rejected the request: {0}")]
    Rejected(String),
}

/// Error returned by handlers; rendered as `{"error": message}`.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Method not allowed: {0}")]
    MethodNotAllowed(String),
    #[error("Invalid meme ID format: {0}")]
    InvalidUuid(#[from] uuid::Error),
    #[error("Meme not found: {0}")]
    MemeNotFound(String),

    // Pipeline failures
    #[error("Meme catalog unavailable")]
    CatalogUnavailable(#[source] CatalogError),
    #[error("No template in the catalog has a description")]
    NoEligibleTemplate,
    #[error("Could not contact generation service")]
    GenerationServiceUnreachable(#[source] CompletionError),
    #[error("Meme generation failed: {0}")]
    RenderOrParseFailure(String),
    #[error("Could not save meme data")]
    RepositoryError(#[source] RepoError),

    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Initialization error: {0}")]
    InitError(String),

    #[error("Internal server error: {0}")]
    InternalServerError(String),
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        AppError::RepositoryError(err)
    }
}

impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        AppError::CatalogUnavailable(err)
    }
}

impl From<CompletionError> for AppError {
    fn from(err: CompletionError) -> Self {
        AppError::GenerationServiceUnreachable(err)
    }
}

impl From<crate::config::ConfigError> for AppError {
    fn from(err: crate::config::ConfigError) -> Self {
        AppError::ConfigError(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::InternalServerError(err.to_string())
    }
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            AppError::InvalidUuid(_) => StatusCode::BAD_REQUEST,
            AppError::MemeNotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_message = match &self {
            AppError::MethodNotAllowed(_) => "Method not allowed".to_string(),
            AppError::InvalidUuid(e) => format!("Invalid ID format: {}", e),
            AppError::MemeNotFound(what) => format!("Meme not found: {}", what),

            AppError::CatalogUnavailable(e) => {
                tracing::error!(error.source = ?e, "Meme catalog unavailable");
                "Meme catalog unavailable".to_string()
            }
            AppError::NoEligibleTemplate => "No meme template available".to_string(),
            AppError::GenerationServiceUnreachable(e) => {
                tracing::error!(error.source = ?e, "Generation service call failed");
                "Could not contact generation service".to_string()
            }
            AppError::RenderOrParseFailure(_) => "Failed to generate meme".to_string(),
            AppError::RepositoryError(e) => {
                tracing::error!(error.source = ?e, "Repository error occurred");
                "Database operation failed".to_string()
            }
            AppError::ConfigError(msg) => {
                tracing::error!("Configuration error: {}", msg);
                "Server configuration error".to_string()
            }
            AppError::InitError(msg) => {
                tracing::error!("Initialization error: {}", msg);
                "Server initialization error".to_string()
            }
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal server error: {}", msg);
                "An internal server error occurred".to_string()
            }
        };

        tracing::warn!(error.message = %error_message, error.detail = %self, error.status = %status, "Responding with error");

        let body = Json(serde_json::json!({ "error": error_message }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pipeline_failures_map_to_500() {
        let cases = [
            AppError::NoEligibleTemplate,
            AppError::GenerationServiceUnreachable(CompletionError::EmptyContent),
            AppError::RenderOrParseFailure("no captions".into()),
            AppError::RepositoryError(RepoError::DataCorruption("bad".into())),
        ];
        for err in cases {
            assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR, "{err}");
        }
    }

    #[test]
    fn wrong_method_maps_to_405() {
        let err = AppError::MethodNotAllowed("GET".into());
        assert_eq!(err.into_response().status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[test]
    fn generation_error_message_is_flat() {
        let err = AppError::from(CompletionError::EmptyContent);
        assert_eq!(err.to_string(), "Could not contact generation service");
    }
}
