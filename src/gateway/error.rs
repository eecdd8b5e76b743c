use serde_json::Value;
use thiserror::Error;

/// Last-resort message when neither the server nor the transport said anything useful.
pub const DEFAULT_FAILURE_MESSAGE: &str = "request failed";

/// The one failure shape every API call surfaces, whether the exchange failed in transit
/// or the server answered with an error status.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct ApiError {
    /// HTTP status when a response arrived.
    pub status: Option<u16>,
    pub message: String,
}

impl ApiError {
    pub fn is_unauthorized(&self) -> bool { self.status == Some(401) }

    pub(crate) fn transport(err: &reqwest::Error) -> Self {
        normalize_failure(None, Some(&err.to_string()), err.status().map(|s| s.as_u16()))
    }
}

/// Build the uniform error: server `detail` first, then the transport message, then the
/// literal default.
pub fn normalize_failure(body: Option<&Value>, transport: Option<&str>, status: Option<u16>) -> ApiError {
    let message = body
        .and_then(|b| b.get("detail"))
        .and_then(detail_message)
        .or_else(|| transport.map(str::trim).filter(|t| !t.is_empty()).map(str::to_string))
        .unwrap_or_else(|| DEFAULT_FAILURE_MESSAGE.to_string());
    ApiError { status, message }
}

// `detail` is a plain string for application errors and a list of `{loc, msg, type}`
// objects for request validation errors.
fn detail_message(detail: &Value) -> Option<String> {
    let text = match detail {
        Value::Null => return None,
        Value::String(s) => s.trim().to_string(),
        Value::Array(items) => items
            .iter()
            .filter_map(|it| match it {
                Value::String(s) => Some(s.clone()),
                Value::Object(_) => it.get("msg").and_then(|m| m.as_str()).map(str::to_string),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("; "),
        Value::Object(_) => detail
            .get("msg")
            .and_then(|m| m.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| detail.to_string()),
        other => other.to_string(),
    };
    if text.is_empty() { None } else { Some(text) }
}
