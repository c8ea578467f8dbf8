//! Callback bridge for the asynchronous login and logout submits.
//!
//! Each call boxes a single-use context (the caller's continuation plus weak
//! links back to the session) and hands it to the backend as client data.
//! The backend returns it through exactly one trampoline invocation; the
//! trampoline downcasts it, updates the session, runs the continuation and
//! frees the context. Nothing else ever frees it.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use chrono::Utc;
use tracing::{debug, error, info, warn};

use super::error::AuthError;
use super::session::{AccountState, AuthCallback, AuthSession};
use super::token::TokenInfo;
use crate::backend::{
    AccountId, AuthHandle, DeveloperCredentials, LoginCallbackInfo, LogoutCallbackInfo,
    PlatformBackend, ResultCode,
};

struct LoginContext {
    account: Weak<RefCell<AccountState>>,
    backend: Weak<dyn PlatformBackend>,
    auth: AuthHandle,
    on_done: AuthCallback,
}

struct LogoutContext {
    account: Weak<RefCell<AccountState>>,
    on_done: AuthCallback,
}

impl AuthSession {
    /// Starts a Dev Auth login.
    ///
    /// `host` is the address of the local auth tool and `credential_name`
    /// the credential registered in it. `on_done` runs exactly once: right
    /// away with [`AuthError::NotInitialized`] when there is no auth handle,
    /// otherwise from a later [`AuthSession::tick`] with the backend's
    /// outcome. On success the account id and a fresh token snapshot are
    /// recorded before `on_done` runs.
    pub fn login_dev_auth<F>(&self, host: &str, credential_name: &str, on_done: F)
    where
        F: FnOnce(Result<(), AuthError>) + 'static,
    {
        let Some(context) = self.context else {
            on_done(Err(AuthError::NotInitialized));
            return;
        };

        let credentials = DeveloperCredentials::new(host, credential_name);
        let client_data = LoginContext {
            account: Rc::downgrade(&self.account),
            backend: Rc::downgrade(&self.backend),
            auth: context.auth,
            on_done: Box::new(on_done),
        };
        debug!(host, "submitting dev auth login");
        self.backend.login(
            context.auth,
            &credentials,
            Box::new(client_data),
            on_login_complete,
        );
    }

    /// Starts a logout of the current account.
    ///
    /// Without an auth handle or a logged-in account `on_done` runs right
    /// away with [`AuthError::NotLoggedIn`] and the backend is not called.
    pub fn logout<F>(&self, on_done: F)
    where
        F: FnOnce(Result<(), AuthError>) + 'static,
    {
        let account_id = self.account.borrow().account_id.clone();
        let (Some(context), Some(account_id)) = (self.context, account_id) else {
            on_done(Err(AuthError::NotLoggedIn));
            return;
        };

        let client_data = LogoutContext {
            account: Rc::downgrade(&self.account),
            on_done: Box::new(on_done),
        };
        debug!(account = %account_id, "submitting logout");
        self.backend.logout(
            context.auth,
            &account_id,
            Box::new(client_data),
            on_logout_complete,
        );
    }
}

fn on_login_complete(info: LoginCallbackInfo) {
    let context = match info.client_data.downcast::<LoginContext>() {
        Ok(context) => *context,
        Err(_) => {
            error!("login completion carried foreign client data");
            return;
        }
    };

    let outcome = match (info.result_code, info.local_user_id) {
        (ResultCode::Success, Some(account_id)) => {
            info!(account = %account_id, "login successful");
            record_login(&context, account_id);
            Ok(())
        }
        (ResultCode::Success, None) => {
            warn!("login reported success without an account id");
            Err(AuthError::LoginFailed(ResultCode::UnexpectedError))
        }
        (code, _) => {
            warn!(%code, "login failed");
            Err(AuthError::LoginFailed(code))
        }
    };
    (context.on_done)(outcome);
}

fn record_login(context: &LoginContext, account_id: AccountId) {
    let Some(account) = context.account.upgrade() else {
        debug!("session dropped before login completed");
        return;
    };
    let token = match context.backend.upgrade() {
        Some(backend) => match backend.copy_user_auth_token(context.auth, &account_id) {
            Ok(token) => TokenInfo::from_user_token(&token, Utc::now()),
            Err(code) => {
                warn!(%code, "copying the user auth token failed");
                TokenInfo::default()
            }
        },
        None => TokenInfo::default(),
    };
    let mut state = account.borrow_mut();
    state.account_id = Some(account_id);
    state.current_token = token;
}

fn on_logout_complete(info: LogoutCallbackInfo) {
    let context = match info.client_data.downcast::<LogoutContext>() {
        Ok(context) => *context,
        Err(_) => {
            error!("logout completion carried foreign client data");
            return;
        }
    };

    let outcome = if info.result_code.is_success() {
        info!(account = %info.local_user_id, "logout successful");
        if let Some(account) = context.account.upgrade() {
            let mut state = account.borrow_mut();
            if state.account_id.as_ref() == Some(&info.local_user_id) {
                *state = AccountState::default();
            }
        }
        Ok(())
    } else {
        warn!(code = %info.result_code, "logout failed");
        Err(AuthError::LogoutFailed(info.result_code))
    };
    (context.on_done)(outcome);
}
