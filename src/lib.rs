//! eos-auth-harness — Dev Auth login harness
//!
//! Authenticates a local test user against an online-services platform's
//! developer-authentication flow and exposes login, logout, refresh and
//! status. The platform SDK sits behind [`backend::PlatformBackend`]; its
//! callback-style submits are bridged into single-use continuations by
//! [`auth::AuthSession`], and [`auth::poll`] turns them into awaited results
//! with a fixed tick budget.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::rc::Rc;
//! use eos_auth_harness::prelude::*;
//!
//! # async fn example() -> eos_auth_harness::error::Result<()> {
//! let mut session = AuthSession::new(Rc::new(SimulatedBackend::new()));
//! session.initialize("product", "sandbox", "deployment")?;
//! login_and_wait(&session, "localhost:6547", "testuser1", PollPolicy::default()).await?;
//! assert!(session.is_logged_in());
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod backend;
pub mod config;
pub mod error;
pub mod prelude;

#[cfg(feature = "cli")]
pub mod cli;
