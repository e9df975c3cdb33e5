//! Usage and version output specs

use crate::prelude::*;

#[test]
fn no_args_shows_usage_and_fails() {
    cli().fails().stderr_has("Usage:");
}

#[test]
fn help_lists_subcommands() {
    cli()
        .args(&["--help"])
        .passes()
        .stdout_has("Usage:")
        .stdout_has("configure")
        .stdout_has("version")
        .stdout_has("check");
}

#[test]
fn check_help_shows_config_flag() {
    cli().args(&["check", "--help"]).passes().stdout_has("--config");
}

#[test]
fn version_prints_binary_name_and_version() {
    cli()
        .args(&["version"])
        .passes()
        .stdout_eq(&format!("teleport-pagerduty v{}\n", env!("CARGO_PKG_VERSION")));
}

#[test]
fn unknown_subcommand_fails() {
    cli().args(&["start"]).fails().stderr_has("unrecognized subcommand");
}
