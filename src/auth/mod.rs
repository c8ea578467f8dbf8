//! Session handle, login/logout callback bridge and completion polling.

pub mod bridge;
pub mod error;
pub mod poll;
pub mod session;
pub mod token;

pub use error::AuthError;
pub use poll::{login_and_wait, logout_and_wait, wait_for_completion, PollPolicy};
pub use session::{AuthCallback, AuthSession};
pub use token::TokenInfo;
