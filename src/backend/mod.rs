//! Seam to the online-services platform SDK.
//!
//! The platform is reached through four call shapes: a process-wide
//! bootstrap, a platform context scoped to product/sandbox/deployment ids,
//! asynchronous submits that carry opaque client data plus a completion
//! trampoline, and a tick that pumps pending work. [`PlatformBackend`]
//! captures exactly those shapes so the session and bridge code never
//! depend on a concrete SDK.

pub mod result;
pub mod simulated;

pub use result::ResultCode;
pub use simulated::{BackendCalls, SimulatedBackend, SimulatedBehavior};

use std::any::Any;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Opaque context handed to an asynchronous submit and returned, unchanged,
/// in the matching callback info.
pub type ClientData = Box<dyn Any>;

/// Completion trampoline for [`PlatformBackend::login`].
pub type OnLoginComplete = fn(LoginCallbackInfo);

/// Completion trampoline for [`PlatformBackend::logout`].
pub type OnLogoutComplete = fn(LogoutCallbackInfo);

/// Handle to a platform context created by [`PlatformBackend::create_platform`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlatformHandle(pub u64);

/// Handle to the auth interface of a platform context. Only valid while the
/// owning platform is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AuthHandle(pub u64);

/// Platform account identifier of a logged-in local user.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(String);

impl AccountId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Options for the process-wide bootstrap.
#[derive(Debug, Clone)]
pub struct InitializeOptions {
    pub product_name: String,
    pub product_version: String,
}

/// Application-level client credentials registered with the platform.
#[derive(Debug, Clone, Default)]
pub struct ClientCredentials {
    pub client_id: String,
    pub client_secret: String,
}

/// Options for creating a platform context.
#[derive(Debug, Clone)]
pub struct PlatformOptions {
    pub product_id: String,
    pub sandbox_id: String,
    pub deployment_id: String,
    pub client_credentials: ClientCredentials,
}

/// Developer credential used by the Dev Auth flow.
///
/// `id` is the address of the local auth tool (`host:port`), `token` is the
/// credential name registered in it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeveloperCredentials {
    pub id: String,
    pub token: String,
}

impl DeveloperCredentials {
    pub fn new(host: impl Into<String>, credential_name: impl Into<String>) -> Self {
        Self {
            id: host.into(),
            token: credential_name.into(),
        }
    }
}

/// Token issued to a logged-in user, as copied out of the platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserAuthToken {
    pub account_id: AccountId,
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
}

/// Delivered to the login trampoline.
pub struct LoginCallbackInfo {
    pub result_code: ResultCode,
    pub client_data: ClientData,
    /// Present when `result_code` is [`ResultCode::Success`].
    pub local_user_id: Option<AccountId>,
}

/// Delivered to the logout trampoline.
pub struct LogoutCallbackInfo {
    pub result_code: ResultCode,
    pub client_data: ClientData,
    pub local_user_id: AccountId,
}

/// The external platform SDK.
///
/// Asynchronous submits (`login`, `logout`) take ownership of their client
/// data and must hand it back through exactly one invocation of the given
/// trampoline, and only from inside [`PlatformBackend::tick`]. Submits whose
/// platform is released before completion are dropped without invoking the
/// trampoline.
pub trait PlatformBackend {
    /// One-time process-wide bootstrap. Not reentrant.
    fn initialize(&self, options: &InitializeOptions) -> Result<(), ResultCode>;

    /// Tears down the bootstrap.
    fn shutdown(&self) -> Result<(), ResultCode>;

    fn create_platform(&self, options: &PlatformOptions) -> Option<PlatformHandle>;

    fn release_platform(&self, platform: PlatformHandle);

    fn auth_interface(&self, platform: PlatformHandle) -> Option<AuthHandle>;

    /// Processes pending work and invokes due completions.
    fn tick(&self, platform: PlatformHandle);

    fn login(
        &self,
        auth: AuthHandle,
        credentials: &DeveloperCredentials,
        client_data: ClientData,
        on_complete: OnLoginComplete,
    );

    fn logout(
        &self,
        auth: AuthHandle,
        local_user_id: &AccountId,
        client_data: ClientData,
        on_complete: OnLogoutComplete,
    );

    fn copy_user_auth_token(
        &self,
        auth: AuthHandle,
        local_user_id: &AccountId,
    ) -> Result<UserAuthToken, ResultCode>;
}
