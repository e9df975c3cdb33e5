//! `check` specs

use crate::prelude::*;

#[test]
fn missing_config_file_fails() {
    let project = Project::empty();
    let path = project.path().join("absent.toml");
    cli()
        .args(&["check", "--config", &path.display().to_string()])
        .fails()
        .stderr_has("failed to read config");
}

#[test]
fn config_path_comes_from_environment() {
    let project = Project::empty();
    let path = project.path().join("from-env.toml");
    cli()
        .args(&["check"])
        .env("TPD_CONFIG", path.display().to_string())
        .fails()
        .stderr_has("from-env.toml");
}

#[test]
fn missing_required_value_is_named() {
    let project = Project::empty();
    let config = project.file(
        "partial.toml",
        "[pagerduty]\napi_key = \"key\"\nuser_email = \"bot@example.com\"\n",
    );
    cli()
        .args(&["check", "--config", &config.display().to_string()])
        .fails()
        .stderr_has("missing required value pagerduty.service_id");
}

#[test]
fn unknown_keys_are_rejected() {
    let project = Project::empty();
    let config = project.file("typo.toml", "[pagerduty]\napi_kee = \"key\"\n");
    cli()
        .args(&["check", "--config", &config.display().to_string()])
        .fails()
        .stderr_has("failed to parse config");
}

#[test]
fn unreachable_pagerduty_fails_after_provisioning_cert() {
    let project = Project::empty();
    let config = project.config("http://127.0.0.1:1");
    cli()
        .args(&["check", "--config", &config.display().to_string()])
        .fails()
        .stderr_has("pagerduty api health check failed");
    assert!(project.path().join("tls").join("server.crt").exists());
    assert!(project.path().join("tls").join("server.key").exists());
}
