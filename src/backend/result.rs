//! Platform result codes.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Result code reported by the platform for synchronous calls and in
/// completion callbacks.
///
/// The discriminants mirror the platform's numeric codes so that log lines
/// and error messages can be matched against the vendor documentation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
#[repr(i32)]
pub enum ResultCode {
    Success = 0,
    NoConnection = 1,
    InvalidCredentials = 2,
    InvalidUser = 3,
    InvalidAuth = 4,
    AccessDenied = 5,
    TooManyRequests = 8,
    AlreadyPending = 9,
    InvalidParameters = 10,
    NotConfigured = 14,
    AlreadyConfigured = 15,
    NotFound = 18,
    UnexpectedError = 0x7FFF_FFFF,
}

impl ResultCode {
    /// Numeric code as reported by the platform.
    pub fn code(self) -> i32 {
        self as i32
    }

    pub fn is_success(self) -> bool {
        self == ResultCode::Success
    }

    /// Human-readable form used in callback error messages, e.g.
    /// `invalid_credentials (2)`.
    pub fn describe(self) -> String {
        format!("{self} ({})", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn codes_match_platform_values() {
        assert_eq!(ResultCode::Success.code(), 0);
        assert_eq!(ResultCode::InvalidCredentials.code(), 2);
        assert_eq!(ResultCode::AlreadyConfigured.code(), 15);
        assert_eq!(ResultCode::UnexpectedError.code(), i32::MAX);
    }

    #[test]
    fn describe_includes_name_and_number() {
        assert_eq!(ResultCode::NoConnection.describe(), "no_connection (1)");
    }

    #[test]
    fn parses_snake_case_names() {
        assert_eq!(
            ResultCode::from_str("invalid_user").unwrap(),
            ResultCode::InvalidUser
        );
        assert!(ResultCode::from_str("InvalidUser").is_err());
    }

    #[test]
    fn only_success_is_success() {
        assert!(ResultCode::Success.is_success());
        assert!(!ResultCode::NotFound.is_success());
    }
}
