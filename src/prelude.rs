//! Convenience re-exports for common use.

pub use crate::auth::{
    login_and_wait, logout_and_wait, AuthError, AuthSession, PollPolicy, TokenInfo,
};
pub use crate::backend::{PlatformBackend, ResultCode, SimulatedBackend};
pub use crate::config::HarnessConfig;
pub use crate::error::{HarnessError, Result};
