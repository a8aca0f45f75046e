use gantry_kernel::config::{ConfigError, ConfigLoader};
use gantry_kernel::domain::config::ApiConfig;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

type TestResult = Result<(), Box<dyn std::error::Error>>;

const NO_VARS: [(&str, &str); 0] = [];

fn write_config(contents: &str) -> Result<(TempDir, PathBuf), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    fs::write(dir.path().join("server.toml"), contents)?;
    let base = dir.path().join("server");
    Ok((dir, base))
}

#[test]
fn missing_file_and_empty_environment_yield_defaults() -> TestResult {
    let dir = tempfile::tempdir()?;
    let cfg: ApiConfig = ConfigLoader::new().path(dir.path().join("absent")).vars(NO_VARS).load()?;

    assert_eq!(cfg.server.port, 3000);
    assert!(cfg.database.url.is_none());
    Ok(())
}

#[test]
fn port_variable_overrides_default() -> TestResult {
    let dir = tempfile::tempdir()?;
    let cfg: ApiConfig =
        ConfigLoader::new().path(dir.path().join("absent")).vars([("PORT", "8080")]).load()?;

    assert_eq!(cfg.server.port, 8080);
    Ok(())
}

#[test]
fn empty_port_keeps_layered_value() -> TestResult {
    let (_dir, base) = write_config("[server]\nport = 4000\n")?;
    let cfg: ApiConfig = ConfigLoader::new().path(&base).vars([("PORT", "")]).load()?;

    assert_eq!(cfg.server.port, 4000);
    Ok(())
}

#[test]
fn invalid_port_is_fatal() {
    let result = ConfigLoader::new().vars([("PORT", "eighty")]).load::<ApiConfig>();

    assert!(matches!(result, Err(ConfigError::InvalidPort { ref value, .. }) if value == "eighty"));
}

#[test]
fn layers_apply_in_order() -> TestResult {
    let (_dir, base) = write_config(
        "[server]\nport = 4000\n\n[database]\nurl = \"sqlite://file.db\"\nmax_connections = 2\n",
    )?;

    let file_only: ApiConfig = ConfigLoader::new().path(&base).vars(NO_VARS).load()?;
    assert_eq!(file_only.server.port, 4000);
    assert_eq!(file_only.database.url.as_deref(), Some("sqlite://file.db"));
    assert_eq!(file_only.database.max_connections, 2);

    let with_env: ApiConfig = ConfigLoader::new()
        .path(&base)
        .vars([("GANTRY__SERVER__PORT", "5000"), ("GANTRY__DATABASE__URL", "sqlite::memory:")])
        .load()?;
    assert_eq!(with_env.server.port, 5000);
    assert_eq!(with_env.database.url.as_deref(), Some("sqlite::memory:"));

    let with_port: ApiConfig = ConfigLoader::new()
        .path(&base)
        .vars([("GANTRY__SERVER__PORT", "5000"), ("PORT", "6000")])
        .load()?;
    assert_eq!(with_port.server.port, 6000);
    Ok(())
}

#[test]
fn numeric_environment_values_are_coerced() -> TestResult {
    let dir = tempfile::tempdir()?;
    let cfg: ApiConfig = ConfigLoader::new()
        .path(dir.path().join("absent"))
        .vars([
            ("GANTRY__SERVER__PORT", "5000"),
            ("GANTRY__DATABASE__MAX_CONNECTIONS", "2"),
            ("GANTRY__SERVER__ADDRESS", "127.0.0.1"),
        ])
        .load()?;

    assert_eq!(cfg.server.port, 5000);
    assert_eq!(cfg.database.max_connections, 2);
    assert!(cfg.server.address.is_loopback());
    Ok(())
}

#[test]
fn non_numeric_environment_value_is_a_config_error() {
    let err = ConfigLoader::new()
        .vars([("GANTRY__DATABASE__MAX_CONNECTIONS", "many")])
        .load::<ApiConfig>()
        .unwrap_err();

    assert_eq!(err.kind(), "Config");
}

#[test]
fn malformed_file_reports_config_error() -> TestResult {
    let (_dir, base) = write_config("[server]\nport = \"not a number\"\n")?;
    let err = ConfigLoader::new().path(&base).vars(NO_VARS).load::<ApiConfig>().unwrap_err();

    assert_eq!(err.kind(), "Config");
    assert!(err.to_string().contains("Failed to deserialize config"));
    Ok(())
}
