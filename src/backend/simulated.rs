//! In-process stand-in for the platform SDK.
//!
//! Behaves like a local Dev Auth setup: submits are queued and completed
//! from [`PlatformBackend::tick`] after a configurable number of ticks.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};

use chrono::{Duration, Utc};
use sha2::{Digest, Sha256};
use tracing::debug;

use super::{
    AccountId, AuthHandle, ClientData, DeveloperCredentials, InitializeOptions, LoginCallbackInfo,
    LogoutCallbackInfo, OnLoginComplete, OnLogoutComplete, PlatformBackend, PlatformHandle,
    PlatformOptions, ResultCode, UserAuthToken,
};

/// Knobs for [`SimulatedBackend`].
#[derive(Debug, Clone)]
pub struct SimulatedBehavior {
    /// Ticks until a submitted operation completes. `None` never completes.
    pub completion_ticks: Option<u32>,
    /// Result of the process-wide bootstrap when it is not already done.
    pub initialize_result: ResultCode,
    pub fail_platform_create: bool,
    /// Forces the login outcome instead of checking the credentials.
    pub login_result: Option<ResultCode>,
    /// Forces the logout outcome instead of checking the session table.
    pub logout_result: Option<ResultCode>,
    pub token_lifetime: Duration,
}

impl Default for SimulatedBehavior {
    fn default() -> Self {
        Self {
            completion_ticks: Some(2),
            initialize_result: ResultCode::Success,
            fail_platform_create: false,
            login_result: None,
            logout_result: None,
            token_lifetime: Duration::hours(2),
        }
    }
}

impl SimulatedBehavior {
    /// Accepts submits but never completes them.
    pub fn stalled() -> Self {
        Self {
            completion_ticks: None,
            ..Self::default()
        }
    }
}

/// Per-entry-point call counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BackendCalls {
    pub initialize: u32,
    pub shutdown: u32,
    pub create_platform: u32,
    pub release_platform: u32,
    pub login: u32,
    pub logout: u32,
    pub copy_user_auth_token: u32,
    pub tick: u32,
}

enum Submit {
    Login {
        credentials: DeveloperCredentials,
        on_complete: OnLoginComplete,
    },
    Logout {
        local_user_id: AccountId,
        on_complete: OnLogoutComplete,
    },
}

struct PendingOp {
    platform: u64,
    remaining_ticks: u32,
    submit: Submit,
    client_data: ClientData,
}

#[derive(Default)]
struct SimState {
    bootstrapped: bool,
    next_handle: u64,
    platforms: HashMap<u64, PlatformOptions>,
    pending: VecDeque<PendingOp>,
    sessions: HashMap<AccountId, UserAuthToken>,
    calls: BackendCalls,
}

/// Single-threaded simulated platform.
///
/// # Example
/// ```
/// use eos_auth_harness::backend::{InitializeOptions, PlatformBackend, SimulatedBackend};
///
/// let backend = SimulatedBackend::new();
/// let options = InitializeOptions {
///     product_name: "harness".to_string(),
///     product_version: "1.0".to_string(),
/// };
/// assert!(backend.initialize(&options).is_ok());
/// assert!(backend.initialize(&options).is_err());
/// ```
#[derive(Default)]
pub struct SimulatedBackend {
    behavior: SimulatedBehavior,
    state: RefCell<SimState>,
}

impl SimulatedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_behavior(behavior: SimulatedBehavior) -> Self {
        Self {
            behavior,
            state: RefCell::default(),
        }
    }

    pub fn calls(&self) -> BackendCalls {
        self.state.borrow().calls
    }

    pub fn is_bootstrapped(&self) -> bool {
        self.state.borrow().bootstrapped
    }

    pub fn live_platforms(&self) -> usize {
        self.state.borrow().platforms.len()
    }

    pub fn pending_operations(&self) -> usize {
        self.state.borrow().pending.len()
    }

    fn complete(&self, op: PendingOp) {
        match op.submit {
            Submit::Login {
                credentials,
                on_complete,
            } => {
                let result_code = self
                    .behavior
                    .login_result
                    .unwrap_or_else(|| check_developer_credentials(&credentials));
                let local_user_id = if result_code.is_success() {
                    let account_id = account_id_for(&credentials.token);
                    let token = self.issue_token(&account_id);
                    self.state
                        .borrow_mut()
                        .sessions
                        .insert(account_id.clone(), token);
                    Some(account_id)
                } else {
                    None
                };
                debug!(%result_code, host = %credentials.id, "simulated login completed");
                on_complete(LoginCallbackInfo {
                    result_code,
                    client_data: op.client_data,
                    local_user_id,
                });
            }
            Submit::Logout {
                local_user_id,
                on_complete,
            } => {
                let removed = self
                    .state
                    .borrow_mut()
                    .sessions
                    .remove(&local_user_id)
                    .is_some();
                let result_code = self.behavior.logout_result.unwrap_or(if removed {
                    ResultCode::Success
                } else {
                    ResultCode::InvalidUser
                });
                debug!(%result_code, account = %local_user_id, "simulated logout completed");
                on_complete(LogoutCallbackInfo {
                    result_code,
                    client_data: op.client_data,
                    local_user_id,
                });
            }
        }
    }

    fn issue_token(&self, account_id: &AccountId) -> UserAuthToken {
        UserAuthToken {
            account_id: account_id.clone(),
            access_token: uuid::Uuid::new_v4().simple().to_string(),
            refresh_token: uuid::Uuid::new_v4().simple().to_string(),
            expires_at: Utc::now() + self.behavior.token_lifetime,
        }
    }

    fn enqueue(&self, auth: AuthHandle, submit: Submit, client_data: ClientData) {
        let remaining_ticks = self.behavior.completion_ticks.unwrap_or(0).max(1);
        self.state.borrow_mut().pending.push_back(PendingOp {
            platform: auth.0,
            remaining_ticks,
            submit,
            client_data,
        });
    }
}

impl PlatformBackend for SimulatedBackend {
    fn initialize(&self, options: &InitializeOptions) -> Result<(), ResultCode> {
        let mut state = self.state.borrow_mut();
        state.calls.initialize += 1;
        if state.bootstrapped {
            return Err(ResultCode::AlreadyConfigured);
        }
        if !self.behavior.initialize_result.is_success() {
            return Err(self.behavior.initialize_result);
        }
        debug!(product = %options.product_name, version = %options.product_version, "simulated bootstrap");
        state.bootstrapped = true;
        Ok(())
    }

    fn shutdown(&self) -> Result<(), ResultCode> {
        let mut state = self.state.borrow_mut();
        state.calls.shutdown += 1;
        if !state.bootstrapped {
            return Err(ResultCode::NotConfigured);
        }
        state.bootstrapped = false;
        Ok(())
    }

    fn create_platform(&self, options: &PlatformOptions) -> Option<PlatformHandle> {
        let mut state = self.state.borrow_mut();
        state.calls.create_platform += 1;
        if !state.bootstrapped || self.behavior.fail_platform_create {
            return None;
        }
        if [&options.product_id, &options.sandbox_id, &options.deployment_id]
            .iter()
            .any(|id| id.trim().is_empty())
        {
            return None;
        }
        state.next_handle += 1;
        let handle = state.next_handle;
        state.platforms.insert(handle, options.clone());
        Some(PlatformHandle(handle))
    }

    fn release_platform(&self, platform: PlatformHandle) {
        // Dropped after the borrow ends: client data may own arbitrary closures.
        let abandoned: VecDeque<PendingOp> = {
            let mut state = self.state.borrow_mut();
            state.calls.release_platform += 1;
            state.platforms.remove(&platform.0);
            let (abandoned, kept): (VecDeque<_>, VecDeque<_>) = state
                .pending
                .drain(..)
                .partition(|op| op.platform == platform.0);
            state.pending = kept;
            abandoned
        };
        if !abandoned.is_empty() {
            debug!(count = abandoned.len(), "dropping operations of released platform");
        }
        drop(abandoned);
    }

    fn auth_interface(&self, platform: PlatformHandle) -> Option<AuthHandle> {
        let state = self.state.borrow();
        state
            .platforms
            .contains_key(&platform.0)
            .then_some(AuthHandle(platform.0))
    }

    fn tick(&self, platform: PlatformHandle) {
        let due: Vec<PendingOp> = {
            let mut state = self.state.borrow_mut();
            state.calls.tick += 1;
            if !state.platforms.contains_key(&platform.0) || self.behavior.completion_ticks.is_none()
            {
                return;
            }
            let mut due = Vec::new();
            let mut waiting = VecDeque::with_capacity(state.pending.len());
            for mut op in state.pending.drain(..) {
                if op.platform != platform.0 {
                    waiting.push_back(op);
                } else if op.remaining_ticks <= 1 {
                    due.push(op);
                } else {
                    op.remaining_ticks -= 1;
                    waiting.push_back(op);
                }
            }
            state.pending = waiting;
            due
        };
        for op in due {
            self.complete(op);
        }
    }

    fn login(
        &self,
        auth: AuthHandle,
        credentials: &DeveloperCredentials,
        client_data: ClientData,
        on_complete: OnLoginComplete,
    ) {
        self.state.borrow_mut().calls.login += 1;
        debug!(host = %credentials.id, "simulated login submitted");
        self.enqueue(
            auth,
            Submit::Login {
                credentials: credentials.clone(),
                on_complete,
            },
            client_data,
        );
    }

    fn logout(
        &self,
        auth: AuthHandle,
        local_user_id: &AccountId,
        client_data: ClientData,
        on_complete: OnLogoutComplete,
    ) {
        self.state.borrow_mut().calls.logout += 1;
        debug!(account = %local_user_id, "simulated logout submitted");
        self.enqueue(
            auth,
            Submit::Logout {
                local_user_id: local_user_id.clone(),
                on_complete,
            },
            client_data,
        );
    }

    fn copy_user_auth_token(
        &self,
        auth: AuthHandle,
        local_user_id: &AccountId,
    ) -> Result<UserAuthToken, ResultCode> {
        let mut state = self.state.borrow_mut();
        state.calls.copy_user_auth_token += 1;
        if !state.platforms.contains_key(&auth.0) {
            return Err(ResultCode::InvalidParameters);
        }
        state
            .sessions
            .get(local_user_id)
            .cloned()
            .ok_or(ResultCode::InvalidUser)
    }
}

/// Dev Auth accepts `host:port` plus a non-empty credential name.
fn check_developer_credentials(credentials: &DeveloperCredentials) -> ResultCode {
    let reachable = credentials
        .id
        .rsplit_once(':')
        .is_some_and(|(host, port)| !host.is_empty() && port.parse::<u16>().is_ok());
    if !reachable {
        return ResultCode::NoConnection;
    }
    if credentials.token.trim().is_empty() {
        return ResultCode::InvalidCredentials;
    }
    ResultCode::Success
}

fn account_id_for(credential_name: &str) -> AccountId {
    let digest = format!("{:x}", Sha256::digest(credential_name.as_bytes()));
    AccountId::new(&digest[..32])
}
