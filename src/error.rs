//! Unified application error model for the console.
//! API failures arrive as the gateway's uniform `ApiError`; this enum adds the local
//! failure classes (configuration, session storage, user input) and maps them to exit codes.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

use crate::gateway::ApiError;
use crate::identity::SessionError;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AppError {
    UserInput { code: String, message: String },
    NotFound { code: String, message: String },
    Auth { code: String, message: String },
    Forbidden { code: String, message: String },
    Remote { code: String, message: String },
    Storage { code: String, message: String },
    Config { code: String, message: String },
    Internal { code: String, message: String },
}

impl AppError {
    pub fn code_str(&self) -> &str {
        match self {
            AppError::UserInput { code, .. }
            | AppError::NotFound { code, .. }
            | AppError::Auth { code, .. }
            | AppError::Forbidden { code, .. }
            | AppError::Remote { code, .. }
            | AppError::Storage { code, .. }
            | AppError::Config { code, .. }
            | AppError::Internal { code, .. } => code.as_str(),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            AppError::UserInput { message, .. }
            | AppError::NotFound { message, .. }
            | AppError::Auth { message, .. }
            | AppError::Forbidden { message, .. }
            | AppError::Remote { message, .. }
            | AppError::Storage { message, .. }
            | AppError::Config { message, .. }
            | AppError::Internal { message, .. } => message.as_str(),
        }
    }

    pub fn user<S: Into<String>>(code: S, msg: S) -> Self { AppError::UserInput { code: code.into(), message: msg.into() } }
    pub fn not_found<S: Into<String>>(code: S, msg: S) -> Self { AppError::NotFound { code: code.into(), message: msg.into() } }
    pub fn auth<S: Into<String>>(code: S, msg: S) -> Self { AppError::Auth { code: code.into(), message: msg.into() } }
    pub fn forbidden<S: Into<String>>(code: S, msg: S) -> Self { AppError::Forbidden { code: code.into(), message: msg.into() } }
    pub fn remote<S: Into<String>>(code: S, msg: S) -> Self { AppError::Remote { code: code.into(), message: msg.into() } }
    pub fn storage<S: Into<String>>(code: S, msg: S) -> Self { AppError::Storage { code: code.into(), message: msg.into() } }
    pub fn config<S: Into<String>>(code: S, msg: S) -> Self { AppError::Config { code: code.into(), message: msg.into() } }
    pub fn internal<S: Into<String>>(code: S, msg: S) -> Self { AppError::Internal { code: code.into(), message: msg.into() } }

    /// Process exit code for one-shot console runs.
    pub fn exit_code(&self) -> i32 {
        match self {
            AppError::UserInput { .. } | AppError::Config { .. } => 2,
            AppError::Auth { .. } | AppError::Forbidden { .. } => 3,
            AppError::NotFound { .. } | AppError::Remote { .. } => 4,
            AppError::Storage { .. } => 5,
            AppError::Internal { .. } => 1,
        }
    }
}

impl Display for AppError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code_str(), self.message())
    }
}

impl std::error::Error for AppError {}

pub type AppResult<T> = Result<T, AppError>;

impl From<ApiError> for AppError {
    fn from(err: ApiError) -> Self {
        let message = err.message;
        match err.status {
            Some(401) => AppError::Auth { code: "unauthorized".into(), message },
            Some(403) => AppError::Forbidden { code: "forbidden".into(), message },
            Some(404) => AppError::NotFound { code: "not_found".into(), message },
            Some(400) | Some(409) | Some(422) => AppError::UserInput { code: "rejected".into(), message },
            Some(_) => AppError::Remote { code: "remote_error".into(), message },
            None => AppError::Remote { code: "transport_error".into(), message },
        }
    }
}

impl From<SessionError> for AppError {
    fn from(err: SessionError) -> Self {
        AppError::Storage { code: "session_storage".into(), message: err.to_string() }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal { code: "internal".into(), message: err.to_string() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::normalize_failure;

    #[test]
    fn api_status_mapping() {
        let e: AppError = normalize_failure(None, Some("t"), Some(401)).into();
        assert!(matches!(e, AppError::Auth { .. }));
        let e: AppError = normalize_failure(None, Some("t"), Some(403)).into();
        assert!(matches!(e, AppError::Forbidden { .. }));
        let e: AppError = normalize_failure(None, Some("t"), Some(404)).into();
        assert_eq!(e.code_str(), "not_found");
        let e: AppError = normalize_failure(None, Some("t"), Some(422)).into();
        assert_eq!(e.exit_code(), 2);
        let e: AppError = normalize_failure(None, Some("boom"), None).into();
        assert_eq!(e.code_str(), "transport_error");
        assert_eq!(e.message(), "boom");
    }

    #[test]
    fn display_is_code_and_message() {
        assert_eq!(AppError::config("bad_url", "no scheme").to_string(), "bad_url: no scheme");
    }

    #[test]
    fn exit_codes() {
        assert_eq!(AppError::user("x", "y").exit_code(), 2);
        assert_eq!(AppError::auth("x", "y").exit_code(), 3);
        assert_eq!(AppError::remote("x", "y").exit_code(), 4);
        assert_eq!(AppError::storage("x", "y").exit_code(), 5);
        assert_eq!(AppError::internal("x", "y").exit_code(), 1);
    }

    #[test]
    fn serde_tagging() {
        let v = serde_json::to_value(AppError::not_found("nf", "missing")).unwrap();
        assert_eq!(v["type"], "not_found");
        assert_eq!(v["code"], "nf");
    }
}
