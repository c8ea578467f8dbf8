use std::cell::RefCell;
use std::rc::Rc;

use chrono::Utc;
use tracing::{debug, error, info, warn};

use super::error::AuthError;
use super::token::TokenInfo;
use crate::backend::{
    AccountId, AuthHandle, ClientCredentials, InitializeOptions, PlatformBackend, PlatformHandle,
    PlatformOptions,
};
use crate::error::HarnessError;

/// Single-use continuation for login and logout.
pub type AuthCallback = Box<dyn FnOnce(Result<(), AuthError>)>;

/// Account and token state shared with in-flight completion trampolines.
#[derive(Debug, Default)]
pub(crate) struct AccountState {
    pub(crate) account_id: Option<AccountId>,
    pub(crate) current_token: TokenInfo,
}

/// Platform handle and the auth handle borrowed from it. Held as one value
/// so that one never outlives the other.
#[derive(Debug, Clone, Copy)]
pub(crate) struct PlatformContext {
    pub(crate) platform: PlatformHandle,
    pub(crate) auth: AuthHandle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Bootstrap {
    NotStarted,
    Initialized,
}

/// Session handle over a [`PlatformBackend`].
///
/// Owns the platform context, the logged-in account id and the last token
/// snapshot. Created empty; [`AuthSession::initialize`] acquires the
/// platform and [`AuthSession::shutdown`] (also run on drop) releases it.
///
/// # Example
/// ```
/// use std::rc::Rc;
/// use eos_auth_harness::auth::AuthSession;
/// use eos_auth_harness::backend::SimulatedBackend;
///
/// let mut session = AuthSession::new(Rc::new(SimulatedBackend::new()));
/// session.initialize("p", "s", "d")?;
/// assert!(session.is_initialized());
/// assert!(!session.is_logged_in());
/// session.shutdown();
/// # Ok::<(), eos_auth_harness::error::HarnessError>(())
/// ```
pub struct AuthSession {
    pub(crate) backend: Rc<dyn PlatformBackend>,
    pub(crate) context: Option<PlatformContext>,
    pub(crate) account: Rc<RefCell<AccountState>>,
    bootstrap: Bootstrap,
    init_options: InitializeOptions,
    client_credentials: ClientCredentials,
}

impl AuthSession {
    pub fn new(backend: Rc<dyn PlatformBackend>) -> Self {
        Self {
            backend,
            context: None,
            account: Rc::new(RefCell::new(AccountState::default())),
            bootstrap: Bootstrap::NotStarted,
            init_options: InitializeOptions {
                product_name: "EOS Auth Harness".to_string(),
                product_version: "1.0".to_string(),
            },
            client_credentials: ClientCredentials::default(),
        }
    }

    pub fn with_initialize_options(mut self, options: InitializeOptions) -> Self {
        self.init_options = options;
        self
    }

    pub fn with_client_credentials(mut self, credentials: ClientCredentials) -> Self {
        self.client_credentials = credentials;
        self
    }

    /// Bootstraps the backend and creates a platform context for the given
    /// identifiers.
    ///
    /// Fails wholly: on any error the session is left not initialized, and a
    /// bootstrap that already succeeded is torn down again. Calling it on an
    /// initialized session is rejected without touching the backend.
    pub fn initialize(
        &mut self,
        product_id: &str,
        sandbox_id: &str,
        deployment_id: &str,
    ) -> Result<(), HarnessError> {
        if self.bootstrap == Bootstrap::Initialized {
            return Err(HarnessError::InvalidState(
                "session already initialized; shut it down first".to_string(),
            ));
        }

        self.backend.initialize(&self.init_options).map_err(|code| {
            error!(%code, "platform bootstrap failed");
            HarnessError::backend("initialize", code)
        })?;
        self.bootstrap = Bootstrap::Initialized;

        let options = PlatformOptions {
            product_id: product_id.to_string(),
            sandbox_id: sandbox_id.to_string(),
            deployment_id: deployment_id.to_string(),
            client_credentials: self.client_credentials.clone(),
        };
        let Some(platform) = self.backend.create_platform(&options) else {
            error!(product_id, sandbox_id, deployment_id, "platform creation failed");
            self.unwind_bootstrap();
            return Err(HarnessError::Platform(
                "platform creation failed".to_string(),
            ));
        };

        let Some(auth) = self.backend.auth_interface(platform) else {
            error!("platform has no auth interface");
            self.backend.release_platform(platform);
            self.unwind_bootstrap();
            return Err(HarnessError::Platform(
                "auth interface unavailable".to_string(),
            ));
        };

        self.context = Some(PlatformContext { platform, auth });
        info!(product_id, sandbox_id, deployment_id, "platform initialized");
        Ok(())
    }

    /// Releases the platform context and tears down the bootstrap.
    ///
    /// Safe to call any number of times, including on a session that was
    /// never initialized.
    pub fn shutdown(&mut self) {
        if let Some(context) = self.context.take() {
            debug!("releasing platform");
            self.backend.release_platform(context.platform);
        }
        if self.bootstrap == Bootstrap::Initialized {
            self.unwind_bootstrap();
        }
        *self.account.borrow_mut() = AccountState::default();
    }

    fn unwind_bootstrap(&mut self) {
        self.bootstrap = Bootstrap::NotStarted;
        if let Err(code) = self.backend.shutdown() {
            warn!(%code, "platform shutdown reported an error");
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.context.is_some()
    }

    pub fn is_logged_in(&self) -> bool {
        self.account.borrow().account_id.is_some()
    }

    pub fn account_id(&self) -> Option<AccountId> {
        self.account.borrow().account_id.clone()
    }

    /// Last token snapshot, with validity re-checked against the clock and
    /// the current login state.
    pub fn token_info(&self) -> TokenInfo {
        let state = self.account.borrow();
        let mut token = state.current_token.checked_at(Utc::now());
        token.is_valid &= state.account_id.is_some();
        token
    }

    /// Pumps the backend once. Completions are only ever delivered from here.
    pub fn tick(&self) {
        if let Some(context) = self.context {
            self.backend.tick(context.platform);
        }
    }

    /// Re-queries the backend for the logged-in user's token and replaces
    /// the snapshot.
    ///
    /// Without a session there is nothing to refresh and this succeeds
    /// without effect.
    pub fn refresh_token(&self) -> Result<(), AuthError> {
        let (Some(context), Some(account_id)) = (self.context, self.account_id()) else {
            debug!("refresh requested without a session");
            return Ok(());
        };
        let token = self
            .backend
            .copy_user_auth_token(context.auth, &account_id)
            .map_err(|code| {
                warn!(%code, account = %account_id, "token refresh failed");
                AuthError::TokenUnavailable(code)
            })?;
        self.account.borrow_mut().current_token = TokenInfo::from_user_token(&token, Utc::now());
        debug!(account = %account_id, "token snapshot refreshed");
        Ok(())
    }
}

impl Drop for AuthSession {
    fn drop(&mut self) {
        self.shutdown();
    }
}
