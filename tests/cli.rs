//! Integration tests for the ssm-env binary that need no AWS access.

use assert_cmd::Command;
use predicates::prelude::*;

/// ssm-env with an AWS configuration that resolves no region and never
/// reaches the instance metadata service.
#[allow(deprecated)]
fn ssm_env() -> Command {
    let mut cmd = Command::cargo_bin("ssm-env").unwrap();
    cmd.env_remove("AWS_REGION")
        .env_remove("AWS_DEFAULT_REGION")
        .env_remove("AWS_PROFILE")
        .env("AWS_CONFIG_FILE", "/nonexistent/ssm-env/config")
        .env("AWS_SHARED_CREDENTIALS_FILE", "/nonexistent/ssm-env/credentials")
        .env("AWS_EC2_METADATA_DISABLED", "true");
    cmd
}

#[test]
fn test_help_lists_flags() {
    ssm_env()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--prefix"))
        .stdout(predicate::str::contains("--leave-encrypted"))
        .stdout(predicate::str::contains("--pristine"))
        .stdout(predicate::str::contains("--cmd"));
}

#[test]
fn test_missing_cmd_is_usage_error() {
    ssm_env()
        .args(["--prefix", "app/"])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("--cmd"));
}

#[test]
fn test_session_error_is_fatal() {
    ssm_env()
        .args(["--cmd", "true"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("no AWS region configured"));
}
