use std::path::PathBuf;

use miette::Diagnostic;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing_error::SpanTrace;

/// Body the API sends alongside a non-2xx status.
///
/// The server reports a human readable message under `detail`. Request validation
/// failures arrive as a list of `{ loc, msg, type }` objects instead of a string.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorResponse {
    #[serde(default)]
    pub detail: Option<Value>,
}

impl ErrorResponse {
    /// Flatten `detail` into a single line suitable for a notification.
    #[must_use]
    pub fn message(&self) -> Option<String> {
        match self.detail.as_ref()? {
            Value::Null => None,
            Value::String(message) => Some(message.clone()),
            Value::Array(items) => {
                let messages: Vec<String> = items
                    .iter()
                    .map(|item| match item.get("msg").and_then(Value::as_str) {
                        Some(msg) => msg.to_string(),
                        None => item.to_string(),
                    })
                    .collect();
                (!messages.is_empty()).then(|| messages.join("; "))
            }
            other => Some(other.to_string()),
        }
    }
}

/// Errors that can occur when talking to the employee API or preparing data for it.
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    /// No response was received: connection refused, DNS failure, broken transfer.
    #[error("error making request: {source}")]
    #[diagnostic(
        code(ems_rs::request_error),
        help("Check your network connection and that the employee API is running")
    )]
    Request {
        #[source]
        source: reqwest::Error,
        span_trace: SpanTrace,
    },

    #[error("object not found: {entity} (url: {url})")]
    #[diagnostic(
        code(ems_rs::not_found),
        help("Verify that the {entity} exists; it may have been deleted since the last refresh")
    )]
    NotFound {
        entity: String,
        url: String,
        detail: Option<String>,
        response_body: Option<String>,
    },

    /// The server answered with a non-2xx status.
    #[error("API responded with {status_code} for {url}: {}", .detail.as_deref().unwrap_or("no detail"))]
    #[diagnostic(
        code(ems_rs::api_error),
        help("The employee API rejected the request; see the detail for the reason")
    )]
    Api {
        status_code: StatusCode,
        url: String,
        detail: Option<String>,
        response_body: Option<String>,
        span_trace: SpanTrace,
    },

    #[error("error decoding response: {source}")]
    #[diagnostic(
        code(ems_rs::deserialization_error),
        help("The API returned data in an unexpected format")
    )]
    DeserializationError {
        #[source]
        source: serde_json::Error,
        response_body: Option<String>,
    },

    #[error("endpoint could not be parsed as a URL")]
    #[diagnostic(
        code(ems_rs::invalid_endpoint),
        help("Check that EMS_API_URL is an absolute http(s) URL")
    )]
    InvalidEndpoint,

    /// A payload failed the client-side schema check before it was sent.
    #[error("employee failed validation: {0}")]
    #[diagnostic(
        code(ems_rs::validation),
        help("Name and role are required, salary must not be negative and the rating must be between 0 and 5")
    )]
    Validation(#[from] validator::ValidationErrors),

    #[error("the employee form is not open")]
    #[diagnostic(code(ems_rs::form_closed))]
    FormClosed,

    #[error("malformed CSV: {reason}")]
    #[diagnostic(
        code(ems_rs::malformed_csv),
        help("Upload a UTF-8 CSV file with a header row followed by id,name,email,role,department,salary rows")
    )]
    MalformedCsv { reason: String },

    #[error("could not write {}: {source}", .path.display())]
    #[diagnostic(code(ems_rs::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl From<reqwest::Error> for Error {
    fn from(source: reqwest::Error) -> Self {
        Self::Request {
            source,
            span_trace: SpanTrace::capture(),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(source: serde_json::Error) -> Self {
        Self::DeserializationError {
            source,
            response_body: None,
        }
    }
}

impl Error {
    /// The span trace captured where the error was created, if any.
    #[must_use]
    pub fn span_trace(&self) -> Option<&SpanTrace> {
        match self {
            Self::Request { span_trace, .. } | Self::Api { span_trace, .. } => Some(span_trace),
            _ => None,
        }
    }

    #[must_use]
    pub fn status_code(&self) -> Option<StatusCode> {
        match self {
            Self::Api { status_code, .. } => Some(*status_code),
            Self::NotFound { .. } => Some(StatusCode::NOT_FOUND),
            Self::Request { source, .. } => source.status(),
            _ => None,
        }
    }

    #[must_use]
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Api { url, .. } | Self::NotFound { url, .. } => Some(url),
            _ => None,
        }
    }

    #[must_use]
    pub fn response_body(&self) -> Option<&str> {
        match self {
            Self::Api { response_body, .. }
            | Self::NotFound { response_body, .. }
            | Self::DeserializationError { response_body, .. } => response_body.as_deref(),
            _ => None,
        }
    }

    /// The error detail reported by the server, if it sent one.
    #[must_use]
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Api { detail, .. } | Self::NotFound { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }

    /// True when no response was received at all.
    #[must_use]
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Request { .. })
    }

    /// Text to show the user: the server's detail when present, otherwise `fallback`.
    ///
    /// Client-side validation failures list the offending fields instead.
    #[must_use]
    pub fn user_message(&self, fallback: &str) -> String {
        if let Some(detail) = self.detail() {
            return detail.to_string();
        }
        match self {
            Self::Validation(errors) => {
                let mut fields: Vec<String> = errors
                    .field_errors()
                    .into_iter()
                    .map(|(field, errors)| {
                        errors
                            .iter()
                            .find_map(|e| e.message.as_ref().map(ToString::to_string))
                            .unwrap_or_else(|| format!("{field} is invalid"))
                    })
                    .collect();
                fields.sort();
                if fields.is_empty() {
                    fallback.to_string()
                } else {
                    fields.join(", ")
                }
            }
            _ => fallback.to_string(),
        }
    }
}

/// Type alias for results from this crate.
///
/// This is already a Miette diagnostic result due to the implementation of
/// the Diagnostic trait for the Error type.
pub type Result<O> = std::result::Result<O, Error>;
