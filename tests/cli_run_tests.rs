//! Command dispatch through `cli::run_with_env` with a config file in a temp
//! dir and an explicit env lookup, so nothing is read from the home directory
//! or the process environment.

#![cfg(feature = "cli")]

use std::path::Path;
use std::rc::Rc;

use clap::Parser;
use tempfile::TempDir;

use eos_auth_harness::backend::{SimulatedBackend, SimulatedBehavior};
use eos_auth_harness::cli::{run_with_env, Cli};
use eos_auth_harness::error::HarnessError;

fn config_dir() -> TempDir {
    let dir = TempDir::new().expect("tempdir");
    std::fs::write(
        dir.path().join("config.toml"),
        "product_id = \"prod\"\nsandbox_id = \"sbx\"\ndeployment_id = \"dep\"\n",
    )
    .expect("write config");
    dir
}

fn cli(config: &Path, args: &[&str]) -> Cli {
    let config = config.join("config.toml");
    let mut argv = vec!["eos-auth-tool", "--config", config.to_str().unwrap()];
    argv.extend_from_slice(args);
    Cli::try_parse_from(argv).expect("arguments should parse")
}

async fn run(behavior: SimulatedBehavior, args: &[&str]) -> (Rc<SimulatedBackend>, Result<(), HarnessError>) {
    run_env(behavior, args, &[]).await
}

async fn run_env(
    behavior: SimulatedBehavior,
    args: &[&str],
    env: &[(&str, &str)],
) -> (Rc<SimulatedBackend>, Result<(), HarnessError>) {
    let dir = config_dir();
    let backend = Rc::new(SimulatedBackend::with_behavior(behavior));
    let env: Vec<(String, String)> = env
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    let lookup = move |key: &str| {
        env.iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
    };
    let result = run_with_env(cli(dir.path(), args), backend.clone(), lookup).await;
    (backend, result)
}

#[tokio::test(start_paused = true)]
async fn login_succeeds_and_releases_the_platform() {
    let (backend, result) = run(
        SimulatedBehavior::default(),
        &["login", "localhost:6547", "testuser1"],
    )
    .await;
    result.unwrap();
    assert_eq!(backend.calls().login, 1);
    assert_eq!(backend.live_platforms(), 0);
    assert!(!backend.is_bootstrapped());
}

#[tokio::test(start_paused = true)]
async fn login_with_bad_credentials_fails() {
    let (_backend, result) = run(
        SimulatedBehavior::default(),
        &["login", "localhost:6547", " "],
    )
    .await;
    let err = result.unwrap_err();
    assert_eq!(err.to_string(), "Login failed: invalid_credentials (2)");
}

#[tokio::test(start_paused = true)]
async fn login_timeout_uses_the_configured_budget() {
    let (backend, result) = run(
        SimulatedBehavior::stalled(),
        &[
            "login",
            "localhost:6547",
            "testuser1",
            "--poll-attempts",
            "4",
            "--poll-interval-ms",
            "25",
        ],
    )
    .await;
    let err = result.unwrap_err();
    assert!(matches!(
        err,
        HarnessError::Timeout {
            operation: "login",
            waited_ms: 100
        }
    ));
    assert_eq!(backend.calls().tick, 4);
    assert_eq!(backend.pending_operations(), 0);
}

#[tokio::test(start_paused = true)]
async fn logout_in_a_fresh_process_still_succeeds() {
    let (backend, result) = run(SimulatedBehavior::default(), &["logout"]).await;
    result.unwrap();
    assert_eq!(backend.calls().logout, 0);
}

#[tokio::test(start_paused = true)]
async fn status_and_refresh_succeed() {
    let (_backend, result) = run(SimulatedBehavior::default(), &["status"]).await;
    result.unwrap();
    let (_backend, result) = run(SimulatedBehavior::default(), &["status", "--json"]).await;
    result.unwrap();
    let (_backend, result) = run(SimulatedBehavior::default(), &["refresh"]).await;
    result.unwrap();
}

#[tokio::test(start_paused = true)]
async fn initialization_failure_stops_before_dispatch() {
    let (backend, result) = run(
        SimulatedBehavior {
            fail_platform_create: true,
            ..Default::default()
        },
        &["login", "localhost:6547", "testuser1"],
    )
    .await;
    assert!(matches!(result.unwrap_err(), HarnessError::Platform(_)));
    assert_eq!(backend.calls().login, 0);
    assert!(!backend.is_bootstrapped());
}

#[tokio::test(start_paused = true)]
async fn invalid_config_is_rejected() {
    let (backend, result) = run(
        SimulatedBehavior::default(),
        &["status", "--poll-attempts", "0"],
    )
    .await;
    assert!(matches!(result.unwrap_err(), HarnessError::Configuration(_)));
    assert_eq!(backend.calls().initialize, 0);
}

#[tokio::test(start_paused = true)]
async fn env_overrides_apply_between_file_and_flags() {
    let (backend, result) = run_env(
        SimulatedBehavior::stalled(),
        &["login", "localhost:6547", "testuser1", "--poll-interval-ms", "10"],
        &[("EOS_POLL_ATTEMPTS", "2"), ("EOS_POLL_INTERVAL_MS", "500")],
    )
    .await;
    assert!(matches!(
        result.unwrap_err(),
        HarnessError::Timeout {
            operation: "login",
            waited_ms: 20
        }
    ));
    assert_eq!(backend.calls().tick, 2);
}

#[tokio::test(start_paused = true)]
async fn empty_env_id_is_rejected_before_initialize() {
    let (backend, result) = run_env(
        SimulatedBehavior::default(),
        &["status"],
        &[("EOS_SANDBOX_ID", "")],
    )
    .await;
    assert!(matches!(result.unwrap_err(), HarnessError::Configuration(_)));
    assert_eq!(backend.calls().initialize, 0);
}
