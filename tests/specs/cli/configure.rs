//! `configure` specs

use crate::prelude::*;

#[test]
fn prints_sample_with_every_section() {
    cli()
        .args(&["configure"])
        .passes()
        .stdout_has("[pagerduty]")
        .stdout_has("[http]")
        .stdout_has("[log]")
        .stdout_has("public_addr");
}

#[test]
fn sample_loads_as_config() {
    let project = Project::empty();
    let sample = cli().args(&["configure"]).passes().stdout();
    let tls = project.path().join("tls");
    let sample = sample
        .replace("/var/lib/teleport/plugins/pagerduty", &tls.display().to_string())
        .replace(r#"api_key = "key""#, r#"api_endpoint = "http://127.0.0.1:1"
api_key = "key""#);
    let config = project.file("sample.toml", &sample);

    // Loading succeeds; only the unreachable PagerDuty endpoint fails the check.
    cli()
        .args(&["check", "--config", &config.display().to_string()])
        .fails()
        .stderr_has("health check failed");
}
