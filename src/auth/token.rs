use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::backend::UserAuthToken;

/// Snapshot of the session token.
///
/// Replaced wholesale on login and refresh, never patched field by field.
/// The default value (empty strings, no expiry, invalid) is what a session
/// reports before any successful login.
///
/// # Example
/// ```
/// use eos_auth_harness::auth::TokenInfo;
///
/// let token = TokenInfo::default();
/// assert!(!token.is_valid);
/// assert!(token.access_token.is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenInfo {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: Option<DateTime<Utc>>,
    pub is_valid: bool,
}

impl TokenInfo {
    /// Builds a snapshot from a token copied out of the backend.
    pub fn from_user_token(token: &UserAuthToken, now: DateTime<Utc>) -> Self {
        Self {
            access_token: token.access_token.clone(),
            refresh_token: token.refresh_token.clone(),
            expires_at: Some(token.expires_at),
            is_valid: token.expires_at > now,
        }
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.map_or(true, |expires| expires <= now)
    }

    /// Copy of the snapshot with `is_valid` cleared once expired.
    pub(crate) fn checked_at(&self, now: DateTime<Utc>) -> Self {
        Self {
            is_valid: self.is_valid && !self.is_expired_at(now),
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::AccountId;
    use chrono::Duration;
    use pretty_assertions::assert_eq;

    fn user_token(expires_at: DateTime<Utc>) -> UserAuthToken {
        UserAuthToken {
            account_id: AccountId::new("acct"),
            access_token: "access".to_string(),
            refresh_token: "refresh".to_string(),
            expires_at,
        }
    }

    #[test]
    fn default_is_the_empty_invalid_snapshot() {
        let token = TokenInfo::default();
        assert_eq!(
            token,
            TokenInfo {
                access_token: String::new(),
                refresh_token: String::new(),
                expires_at: None,
                is_valid: false,
            }
        );
        assert!(token.is_expired_at(Utc::now()));
    }

    #[test]
    fn from_user_token_marks_unexpired_tokens_valid() {
        let now = Utc::now();
        let token = TokenInfo::from_user_token(&user_token(now + Duration::minutes(5)), now);
        assert!(token.is_valid);
        assert_eq!(token.access_token, "access");
        assert_eq!(token.refresh_token, "refresh");

        let stale = TokenInfo::from_user_token(&user_token(now - Duration::minutes(5)), now);
        assert!(!stale.is_valid);
    }

    #[test]
    fn checked_at_invalidates_after_expiry() {
        let now = Utc::now();
        let token = TokenInfo::from_user_token(&user_token(now + Duration::minutes(5)), now);
        assert!(token.checked_at(now).is_valid);
        assert!(!token.checked_at(now + Duration::minutes(10)).is_valid);
    }
}
