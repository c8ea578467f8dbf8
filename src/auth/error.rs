use thiserror::Error;

use crate::backend::ResultCode;

/// Outcome errors delivered to login/logout/refresh callers.
///
/// The `Display` strings are what the CLI prints after a failed flow.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("Auth handle not initialized")]
    NotInitialized,
    #[error("Not logged in")]
    NotLoggedIn,
    #[error("Login failed: {}", .0.describe())]
    LoginFailed(ResultCode),
    #[error("Logout failed: {}", .0.describe())]
    LogoutFailed(ResultCode),
    #[error("Token unavailable: {}", .0.describe())]
    TokenUnavailable(ResultCode),
}

impl AuthError {
    /// Backend result code behind this error, if the backend reported one.
    pub fn result_code(&self) -> Option<ResultCode> {
        match self {
            Self::LoginFailed(code) | Self::LogoutFailed(code) | Self::TokenUnavailable(code) => {
                Some(*code)
            }
            Self::NotInitialized | Self::NotLoggedIn => None,
        }
    }
}
