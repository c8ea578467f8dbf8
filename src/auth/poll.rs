//! Bounded wait for a callback-driven completion.

use std::time::Duration;

use tokio::sync::oneshot::{self, error::TryRecvError};
use tracing::{debug, warn};

use super::session::AuthSession;
use crate::error::HarnessError;

/// How long to pump the backend while waiting for a completion.
///
/// The total budget is `max_attempts × interval` (10 s by default).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub max_attempts: u32,
    pub interval: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 100,
            interval: Duration::from_millis(100),
        }
    }
}

impl PollPolicy {
    pub fn budget(&self) -> Duration {
        self.interval
            .checked_mul(self.max_attempts)
            .unwrap_or(Duration::MAX)
    }
}

/// Ticks `session` until `completion` resolves or the attempt budget is
/// spent.
///
/// The completion is checked before each tick, so one that was resolved
/// synchronously returns without pumping the backend at all. On timeout the
/// receiver is dropped; a completion that fires later finds no receiver and
/// is discarded.
pub async fn wait_for_completion<T>(
    session: &AuthSession,
    operation: &'static str,
    mut completion: oneshot::Receiver<T>,
    policy: PollPolicy,
) -> Result<T, HarnessError> {
    let mut attempts = 0;
    loop {
        match completion.try_recv() {
            Ok(value) => {
                debug!(operation, attempts, "completion received");
                return Ok(value);
            }
            Err(TryRecvError::Closed) => {
                return Err(HarnessError::InvalidState(format!(
                    "{operation} completion was dropped without firing"
                )));
            }
            Err(TryRecvError::Empty) => {}
        }
        if attempts >= policy.max_attempts {
            warn!(operation, attempts, "no completion within the poll budget");
            return Err(HarnessError::Timeout {
                operation,
                waited_ms: u64::try_from(policy.budget().as_millis()).unwrap_or(u64::MAX),
            });
        }
        session.tick();
        tokio::time::sleep(policy.interval).await;
        attempts += 1;
    }
}

/// Runs [`AuthSession::login_dev_auth`] and waits for its outcome.
pub async fn login_and_wait(
    session: &AuthSession,
    host: &str,
    credential_name: &str,
    policy: PollPolicy,
) -> Result<(), HarnessError> {
    let (tx, rx) = oneshot::channel();
    session.login_dev_auth(host, credential_name, move |outcome| {
        let _ = tx.send(outcome);
    });
    Ok(wait_for_completion(session, "login", rx, policy).await??)
}

/// Runs [`AuthSession::logout`] and waits for its outcome.
pub async fn logout_and_wait(session: &AuthSession, policy: PollPolicy) -> Result<(), HarnessError> {
    let (tx, rx) = oneshot::channel();
    session.logout(move |outcome| {
        let _ = tx.send(outcome);
    });
    Ok(wait_for_completion(session, "logout", rx, policy).await??)
}
