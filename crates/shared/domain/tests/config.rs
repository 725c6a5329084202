use mkit_domain::{SetupConfig, load_config};
use serial_test::serial;
use std::io::Write;
use std::path::Path;

fn write_config(dir: &Path, body: &str) -> std::path::PathBuf {
    let path = dir.join("mkit.toml");
    let mut file = std::fs::File::create(&path).expect("create config file");
    file.write_all(body.as_bytes()).expect("write config file");
    path
}

#[test]
#[serial]
fn load_explicit_file() {
    let tmp = tempfile::tempdir().unwrap();
    let path = write_config(
        tmp.path(),
        r#"
[agent]
hostname = "web-01"
interval = 30
read_threads = 8

[endpoint]
namespace = "prod-metrics"
port = 9103

[retry]
max_attempts = 3
wait_secs = 5

[[plugins]]
name = "cpu"

[[plugins]]
name = "df"
options = ["MountPoint \"/\"", "IgnoreSelected false"]
"#,
    );

    let cfg: SetupConfig = load_config(Some(&path)).expect("config should load");

    assert_eq!(cfg.agent.hostname.as_deref(), Some("web-01"));
    assert_eq!(cfg.agent.interval, 30);
    assert_eq!(cfg.agent.read_threads, 8);
    assert_eq!(cfg.endpoint.namespace, "prod-metrics");
    assert_eq!(cfg.endpoint.port, Some(9103));
    assert_eq!(cfg.retry.max_attempts, 3);
    assert_eq!(cfg.plugins.len(), 2);
    assert_eq!(cfg.plugins[1].options.len(), 2);
    assert_eq!(cfg.plugins[1].options[0], "MountPoint \"/\"");
}

#[test]
#[serial]
fn missing_explicit_file_is_an_error() {
    let result: Result<SetupConfig, _> = load_config(Some("/nonexistent/mkit.toml"));
    assert!(result.is_err());
}

#[test]
#[serial]
fn defaults_apply_when_sections_are_absent() {
    let tmp = tempfile::tempdir().unwrap();
    let path = write_config(tmp.path(), "[agent]\nhostname = \"bare\"\n");

    let cfg: SetupConfig = load_config(Some(&path)).expect("config should load");

    assert_eq!(cfg.agent.hostname.as_deref(), Some("bare"));
    assert_eq!(cfg.agent.interval, 10, "interval should default");
    assert_eq!(cfg.agent.service, "collectd");
    assert_eq!(cfg.retry.max_attempts, 5);
    assert!(
        cfg.plugins.iter().any(|p| p.name == "cpu"),
        "no plugins section falls back to the default plugin set"
    );
}
