use reqwest::StatusCode;
use thiserror::Error;

// Failures of a single API request.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Invalid API path `{path}`: {source}")]
    Path {
        path: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Request to `{path}` timed out")]
    Timeout { path: String },

    #[error("Request to `{path}` failed: {source}")]
    Request {
        path: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Request to `{path}` returned status {status}")]
    Status { path: String, status: StatusCode },

    #[error("Malformed JSON from `{path}`: {reason}")]
    Decode { path: String, reason: String },
}

// Everything that can keep a widget from being rendered.
#[derive(Error, Debug)]
pub enum ImpactError {
    #[error("No assignment id found in `{0}`")]
    InvalidAssignmentUrl(String),

    #[error("Assignment {0} does not belong to any section")]
    AssignmentNotFound(u64),

    #[error("{0} not found in the grade report")]
    NotFound(String),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl ImpactError {
    pub fn not_found(what: impl Into<String>) -> Self {
        ImpactError::NotFound(what.into())
    }

    // Missing data is expected on some pages and only skips the widget.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ImpactError::AssignmentNotFound(_) | ImpactError::NotFound(_))
    }
}

pub type WidgetResult<T> = std::result::Result<T, ImpactError>;
