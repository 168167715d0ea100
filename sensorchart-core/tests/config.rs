use sensorchart_core::config::CONFIG_ENV_VAR;
use sensorchart_core::{ChartConfig, SessionOptions};
use serial_test::serial;
use std::time::Duration;

#[test]
#[serial]
fn resolve_reads_env_var_path() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("chart.toml");
    std::fs::write(
        &path,
        "refresh_seconds = 7\n[feed]\nroot = \"farm/sensors\"\n",
    )
    .expect("write config");

    std::env::set_var(CONFIG_ENV_VAR, &path);
    let config = ChartConfig::resolve(None);
    std::env::remove_var(CONFIG_ENV_VAR);

    let config = config.expect("config");
    assert_eq!(config.refresh_seconds, 7);
    let options = SessionOptions::from_config(&config).expect("options");
    assert_eq!(options.feed_root.to_string(), "/farm/sensors");
    assert_eq!(options.refresh, Duration::from_secs(7));
}

#[test]
#[serial]
fn explicit_path_beats_env_var() {
    let dir = tempfile::tempdir().expect("tempdir");
    let explicit = dir.path().join("explicit.toml");
    std::fs::write(&explicit, "log_level = \"debug\"\n").expect("write config");

    std::env::set_var(CONFIG_ENV_VAR, dir.path().join("missing.toml"));
    let config = ChartConfig::resolve(Some(&explicit));
    std::env::remove_var(CONFIG_ENV_VAR);

    assert_eq!(config.expect("config").log_level, "debug");
}

#[test]
#[serial]
fn missing_env_file_is_an_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    std::env::set_var(CONFIG_ENV_VAR, dir.path().join("missing.toml"));
    let config = ChartConfig::resolve(None);
    std::env::remove_var(CONFIG_ENV_VAR);
    assert!(config.is_err());
}
