//! Configuration loading behaviour as the daemon exercises it:
//! file loading, first-run creation, environment overrides, and the
//! runtime validation gate that decides startup failure (exit code 1).

use serial_test::serial;

use logvigil_core::config::LogvigilConfig;

fn write_config(dir: &tempfile::TempDir, content: &str) -> std::path::PathBuf {
    let path = dir.path().join("logvigil.toml");
    std::fs::write(&path, content).expect("should write config file");
    path
}

#[tokio::test]
async fn load_reads_remote_section() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(
        &dir,
        r#"
[remote]
api_base_url = "https://portal.example.net/api/environments"
api_key = "secret"
environment_id = "env-prod"
"#,
    );

    let config = LogvigilConfig::load(&path).await.unwrap();
    assert_eq!(config.remote.environment_id, "env-prod");
    config.validate_runtime().unwrap();
}

#[tokio::test]
async fn first_run_creates_config_that_fails_runtime_validation() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("logvigil.toml");

    let (config, created) = LogvigilConfig::load_or_create(&path).await.unwrap();
    assert!(created);
    assert!(path.exists());

    // The generated file passes static validation but is not runnable
    // until the user fills in the remote credentials.
    config.validate().unwrap();
    assert!(config.validate_runtime().is_err());
}

#[tokio::test]
async fn created_file_is_parseable_toml() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("logvigil.toml");

    LogvigilConfig::load_or_create(&path).await.unwrap();
    let content = std::fs::read_to_string(&path).unwrap();
    assert!(content.contains("[remote]"));
    assert!(content.contains("[monitor]"));

    let parsed = LogvigilConfig::parse(&content).unwrap();
    assert_eq!(parsed.monitor.check_interval_minutes, 5);
}

#[tokio::test]
#[serial]
async fn env_var_overrides_api_key() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(
        &dir,
        r#"
[remote]
api_base_url = "https://portal.example.net/api/environments"
api_key = "from-file"
environment_id = "env-prod"
"#,
    );

    // SAFETY: #[serial] keeps env-mutating tests from overlapping.
    unsafe { std::env::set_var("LOGVIGIL_REMOTE_API_KEY", "from-env") };
    let config = LogvigilConfig::load(&path).await.unwrap();
    unsafe { std::env::remove_var("LOGVIGIL_REMOTE_API_KEY") };

    assert_eq!(config.remote.api_key, "from-env");
}

#[tokio::test]
#[serial]
async fn env_var_overrides_check_interval() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(&dir, "");

    // SAFETY: #[serial] keeps env-mutating tests from overlapping.
    unsafe { std::env::set_var("LOGVIGIL_MONITOR_CHECK_INTERVAL_MINUTES", "1") };
    let config = LogvigilConfig::load(&path).await.unwrap();
    unsafe { std::env::remove_var("LOGVIGIL_MONITOR_CHECK_INTERVAL_MINUTES") };

    assert_eq!(config.monitor.check_interval_minutes, 1);
}

#[tokio::test]
async fn invalid_config_file_fails_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(
        &dir,
        r#"
[monitor]
check_interval_minutes = 0
"#,
    );

    let result = LogvigilConfig::load(&path).await;
    assert!(result.is_err());
    assert!(
        result
            .unwrap_err()
            .to_string()
            .contains("check_interval_minutes")
    );
}

#[tokio::test]
async fn watcher_config_derives_from_loaded_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(
        &dir,
        r#"
[remote]
api_base_url = "https://portal.example.net/api/environments"
api_key = "secret"
environment_id = "env-prod"
log_file_name = "error"

[monitor]
trigger_string = "upstream timed out (110: Connection timed out)"
check_interval_minutes = 3
"#,
    );

    let config = LogvigilConfig::load(&path).await.unwrap();
    let watcher_config = logvigil_monitor::WatcherConfig::from_core(&config);
    watcher_config.validate().unwrap();
    assert_eq!(watcher_config.environment_id, "env-prod");
    assert_eq!(watcher_config.check_interval_minutes, 3);
}
