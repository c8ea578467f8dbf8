//! CLI auth command handlers for login, logout, status, and refresh.
//!
//! Handlers print only once a flow has resolved. Failures are returned to
//! `main`, which prints them and exits non-zero; logout is the exception and
//! always succeeds after reporting.

use serde::Serialize;

use super::{LoginArgs, StatusArgs};
use crate::auth::{login_and_wait, logout_and_wait, AuthSession, PollPolicy, TokenInfo};
use crate::backend::AccountId;
use crate::error::HarnessError;

/// Handle `eos-auth-tool login <host> <credential_name>`.
pub async fn handle_login(
    session: &AuthSession,
    args: &LoginArgs,
    policy: PollPolicy,
) -> Result<(), HarnessError> {
    login_and_wait(session, &args.host, &args.credential_name, policy).await?;
    println!("✓ Login successful!");
    Ok(())
}

/// Handle `eos-auth-tool logout`.
pub async fn handle_logout(session: &AuthSession, policy: PollPolicy) -> Result<(), HarnessError> {
    match logout_and_wait(session, policy).await {
        Ok(()) => println!("✓ Logged out successfully"),
        Err(e) => eprintln!("✗ {e}"),
    }
    Ok(())
}

/// Handle `eos-auth-tool status`.
pub fn handle_status(session: &AuthSession, args: &StatusArgs) -> Result<(), HarnessError> {
    let report = StatusReport::of(session);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", report.render());
    }
    Ok(())
}

/// Handle `eos-auth-tool refresh`.
pub fn handle_refresh(session: &AuthSession) -> Result<(), HarnessError> {
    session.refresh_token()?;
    println!("✓ Token refreshed");
    Ok(())
}

/// Status snapshot printed by `status`.
#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    pub logged_in: bool,
    pub account_id: Option<AccountId>,
    pub token: TokenInfo,
}

impl StatusReport {
    pub fn of(session: &AuthSession) -> Self {
        Self {
            logged_in: session.is_logged_in(),
            account_id: session.account_id(),
            token: session.token_info(),
        }
    }

    pub fn render(&self) -> String {
        if !self.logged_in {
            return "Status: Not logged in".to_string();
        }
        let mut lines = vec!["Status: Logged in".to_string()];
        if let Some(account_id) = &self.account_id {
            lines.push(format!("Account: {account_id}"));
        }
        lines.push(format!(
            "Token valid: {}",
            if self.token.is_valid { "yes" } else { "no" }
        ));
        if let Some(expires) = self.token.expires_at {
            lines.push(format!("Expires: {}", expires.format("%Y-%m-%d %H:%M")));
        }
        lines.join("\n")
    }
}
