//! Sentry integration for ems-rs errors.
//!
//! Only available with the `sentry` feature. Errors created inside an instrumented span
//! carry a span trace once `tracing_error::ErrorLayer` is installed.

use std::collections::BTreeMap;

use sentry_core::{Breadcrumb, protocol::Value};

use crate::error::Error;

const MAX_BODY_PREVIEW: usize = 500;

impl<'a> From<&'a Error> for Breadcrumb {
    fn from(error: &'a Error) -> Self {
        let mut data = BTreeMap::new();
        let (category, message) = match error {
            Error::Request { source, .. } => ("http.request", format!("HTTP request error: {source}")),

            Error::NotFound { entity, url, .. } => {
                data.insert("entity".to_string(), Value::from(entity.clone()));
                data.insert("url".to_string(), Value::from(url.clone()));
                ("http.response", format!("{entity} not found"))
            }

            Error::Api {
                status_code,
                url,
                detail,
                ..
            } => {
                data.insert("url".to_string(), Value::from(url.clone()));
                data.insert("status_code".to_string(), Value::from(status_code.as_u16()));
                if let Some(detail) = detail {
                    data.insert("detail".to_string(), Value::from(detail.clone()));
                }
                ("ems.api", format!("API error: {status_code}"))
            }

            Error::DeserializationError { source, .. } => {
                ("http.response", format!("Failed to decode response: {source}"))
            }

            Error::InvalidEndpoint => ("ems.config", "Invalid endpoint URL".to_string()),

            Error::Validation(errors) => {
                let fields: Vec<Value> = errors
                    .field_errors()
                    .keys()
                    .map(|field| Value::from(field.to_string()))
                    .collect();
                data.insert("fields".to_string(), Value::from(fields));
                ("ems.validation", "Employee failed validation".to_string())
            }

            Error::FormClosed => ("ems.form", "Submitted a closed form".to_string()),

            Error::MalformedCsv { reason } => ("ems.csv", format!("Malformed CSV: {reason}")),

            Error::Io { path, source } => {
                data.insert("path".to_string(), Value::from(path.display().to_string()));
                ("ems.io", format!("I/O error: {source}"))
            }
        };

        Breadcrumb {
            ty: "error".to_string(),
            category: Some(category.to_string()),
            message: Some(message),
            data,
            level: sentry_core::Level::Error,
            ..Default::default()
        }
    }
}

/// Extract extra Sentry context from an error.
///
/// ```ignore
/// use sentry::configure_scope;
/// use ems_rs::sentry_integration::error_to_sentry_context;
///
/// if let Err(e) = client.employees().stats().await {
///     configure_scope(|scope| {
///         for (key, value) in error_to_sentry_context(&e) {
///             scope.set_extra(&key, value);
///         }
///     });
/// }
/// ```
#[must_use]
pub fn error_to_sentry_context(error: &Error) -> BTreeMap<String, Value> {
    let mut context = BTreeMap::new();

    if let Some(span_trace) = error.span_trace() {
        context.insert("ems.span_trace".to_string(), Value::from(span_trace.to_string()));
    }
    if let Some(url) = error.url() {
        context.insert("ems.url".to_string(), Value::from(url.to_string()));
    }
    if let Some(status) = error.status_code() {
        context.insert("ems.status_code".to_string(), Value::from(status.as_u16()));
    }
    if let Some(detail) = error.detail() {
        context.insert("ems.detail".to_string(), Value::from(detail.to_string()));
    }
    if let Some(body) = error.response_body() {
        let preview: String = body.chars().take(MAX_BODY_PREVIEW).collect();
        let truncated = if preview.len() < body.len() {
            format!("{preview}...")
        } else {
            preview
        };
        context.insert("ems.response_body".to_string(), Value::from(truncated));
    }

    context
}

#[cfg(test)]
mod tests {
    use reqwest::StatusCode;
    use tracing_error::SpanTrace;

    use super::*;

    fn api_error(body: String) -> Error {
        Error::Api {
            status_code: StatusCode::BAD_REQUEST,
            url: "http://localhost:8000/api/employees".to_string(),
            detail: Some("Email already registered".to_string()),
            response_body: Some(body),
            span_trace: SpanTrace::capture(),
        }
    }

    #[test]
    fn not_found_becomes_response_breadcrumb() {
        let error = Error::NotFound {
            entity: "employees".to_string(),
            url: "http://localhost:8000/api/employees/9".to_string(),
            detail: Some("Employee not found".to_string()),
            response_body: None,
        };
        let breadcrumb = Breadcrumb::from(&error);
        assert_eq!(breadcrumb.category.as_deref(), Some("http.response"));
        assert_eq!(breadcrumb.message.as_deref(), Some("employees not found"));
        assert_eq!(breadcrumb.data.get("entity"), Some(&Value::from("employees")));
        assert_eq!(breadcrumb.level, sentry_core::Level::Error);
    }

    #[test]
    fn api_breadcrumb_carries_status_and_detail() {
        let breadcrumb = Breadcrumb::from(&api_error("{}".to_string()));
        assert_eq!(breadcrumb.category.as_deref(), Some("ems.api"));
        assert_eq!(breadcrumb.data.get("status_code"), Some(&Value::from(400u16)));
        assert_eq!(
            breadcrumb.data.get("detail"),
            Some(&Value::from("Email already registered"))
        );
    }

    #[test]
    fn malformed_csv_breadcrumb_keeps_reason() {
        let error = Error::MalformedCsv {
            reason: "header row has no columns".to_string(),
        };
        let breadcrumb = Breadcrumb::from(&error);
        assert_eq!(breadcrumb.category.as_deref(), Some("ems.csv"));
        assert_eq!(
            breadcrumb.message.as_deref(),
            Some("Malformed CSV: header row has no columns")
        );
        assert!(breadcrumb.data.is_empty());
    }

    #[test]
    fn context_truncates_long_bodies() {
        let context = error_to_sentry_context(&api_error("x".repeat(600)));
        let body = context["ems.response_body"].as_str().unwrap();
        assert_eq!(body.len(), MAX_BODY_PREVIEW + 3);
        assert!(body.ends_with("..."));
        assert_eq!(context["ems.status_code"], Value::from(400u16));
        assert_eq!(context["ems.detail"], Value::from("Email already registered"));
        assert_eq!(
            context["ems.url"],
            Value::from("http://localhost:8000/api/employees")
        );
        assert!(context.contains_key("ems.span_trace"));
    }

    #[test]
    fn context_keeps_short_bodies_whole() {
        let context = error_to_sentry_context(&api_error(r#"{"detail":"x"}"#.to_string()));
        assert_eq!(context["ems.response_body"], Value::from(r#"{"detail":"x"}"#));

        let context = error_to_sentry_context(&Error::FormClosed);
        assert!(context.is_empty());
    }
}
