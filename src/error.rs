use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Failures reported by an `LmsClient` transport.
#[derive(Error, Debug)]
pub enum LmsError {
    #[error("request to {path} failed: {message}")]
    Transport { path: String, message: String },
    #[error("{path} returned {status}: {body}")]
    Status {
        path: String,
        status: StatusCode,
        body: String,
    },
    #[error("failed to decode response from {path}: {message}")]
    Decode { path: String, message: String },
    #[error("failed to encode request body for {path}: {message}")]
    Encode { path: String, message: String },
}

#[derive(Error, Debug)]
pub enum TermLookupError {
    /// A name was given but neither it nor the fallback term is in the catalog.
    #[error("no enrollment term named {name:?} and no {fallback:?} fallback in the catalog")]
    TermNotFound { name: String, fallback: String },
    #[error("enrollment term catalog unavailable: {0}")]
    CatalogUnavailable(#[source] LmsError),
}

impl TermLookupError {
    /// Transport failures may succeed later; a missing term is a data problem.
    pub fn is_retryable(&self) -> bool {
        matches!(self, TermLookupError::CatalogUnavailable(_))
    }
}

/// Which of the three writes a failure belongs to.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum UpdateTarget {
    Course,
    Settings,
    Features,
}

impl std::fmt::Display for UpdateTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            UpdateTarget::Course => "course",
            UpdateTarget::Settings => "course settings",
            UpdateTarget::Features => "course features",
        })
    }
}

#[derive(Error, Debug)]
pub enum StepError {
    #[error("platform {platform:?} is not configured by this step")]
    PlatformNotApplicable { platform: String },
    #[error("failed to update {target}: {source}")]
    UpdateFailed {
        target: UpdateTarget,
        #[source]
        source: LmsError,
    },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{0} not set")]
    Missing(&'static str),
    #[error("{name} has invalid value {value:?}")]
    Invalid { name: &'static str, value: String },
    #[error("failed to read policy file {path}: {source}")]
    PolicyRead {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse policy file {path}: {source}")]
    PolicyParse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to build http client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

#[derive(Serialize, Debug)]
pub struct ErrorBody {
    pub error: &'static str,
    pub message: String,
}

/// HTTP-facing wrapper for failures the service surfaces to callers.
#[derive(Debug)]
pub struct ApiError(pub StepError);

impl From<StepError> for ApiError {
    fn from(err: StepError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self.0 {
            StepError::PlatformNotApplicable { .. } => {
                (StatusCode::UNPROCESSABLE_ENTITY, "platform_not_applicable")
            }
            StepError::UpdateFailed { .. } => (StatusCode::BAD_GATEWAY, "update_failed"),
        };
        if status.is_server_error() {
            tracing::error!(error=%self.0, "request failed");
        }
        let body = ErrorBody {
            error: code,
            message: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lms_failure() -> LmsError {
        LmsError::Status {
            path: "/api/v1/accounts/1/terms".into(),
            status: StatusCode::UNAUTHORIZED,
            body: "unauthorized".into(),
        }
    }

    #[test]
    fn catalog_unavailable_is_retryable_but_missing_term_is_not() {
        assert!(TermLookupError::CatalogUnavailable(lms_failure()).is_retryable());
        let missing = TermLookupError::TermNotFound {
            name: "Winter 2024".into(),
            fallback: "Default Term".into(),
        };
        assert!(!missing.is_retryable());
        assert!(missing.to_string().contains("Winter 2024"));
    }

    #[test]
    fn platform_not_applicable_maps_to_422() {
        let response = ApiError(StepError::PlatformNotApplicable {
            platform: "residential".into(),
        })
        .into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn update_failed_names_its_target() {
        let err = StepError::UpdateFailed {
            target: UpdateTarget::Settings,
            source: lms_failure(),
        };
        assert!(err.to_string().starts_with("failed to update course settings"));
    }
}
