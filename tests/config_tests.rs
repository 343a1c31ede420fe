// Config loading and validation tests

use gopanel::config::AppConfig;

const VALID_CONFIG: &str = r#"
[server]
host = "127.0.0.1"
port = 9000

[database]
path = "data/panel.db"
retention_days = 3

[sampling]
interval_ms = 1000
viewer_queue_capacity = 8
stats_log_interval_secs = 60

[cache]
refresh_interval_secs = 15
query_timeout_secs = 5
"#;

#[test]
fn test_config_loads_from_str() {
    let config = AppConfig::load_from_str(VALID_CONFIG).expect("load_from_str");
    assert_eq!(config.server.host, "127.0.0.1");
    assert_eq!(config.server.port, 9000);
    assert_eq!(config.database.path, "data/panel.db");
    assert_eq!(config.database.retention_days, 3);
    assert_eq!(config.sampling.interval_ms, 1000);
    assert_eq!(config.sampling.viewer_queue_capacity, 8);
    assert_eq!(config.cache.refresh_interval_secs, 15);
    assert_eq!(config.cache.query_timeout_secs, 5);
}

#[test]
fn test_config_empty_string_uses_defaults() {
    let config = AppConfig::load_from_str("").expect("defaults");
    assert_eq!(config.server.port, 8090);
    assert_eq!(config.database.retention_days, 7);
    assert_eq!(config.sampling.interval_ms, 2000);
    assert_eq!(config.cache.refresh_interval_secs, 30);
}

#[test]
fn test_config_partial_section_uses_defaults_for_rest() {
    let config = AppConfig::load_from_str("[server]\nport = 8888\n").expect("partial");
    assert_eq!(config.server.port, 8888);
    assert_eq!(config.server.host, "0.0.0.0");
    assert_eq!(config.sampling.viewer_queue_capacity, 16);
}

#[test]
fn test_config_rejects_zero_retention() {
    let result = AppConfig::load_from_str("[database]\nretention_days = 0\n");
    assert!(result.is_err());
}

#[test]
fn test_config_rejects_zero_interval() {
    let result = AppConfig::load_from_str("[sampling]\ninterval_ms = 0\n");
    assert!(result.is_err());
}

#[test]
fn test_config_rejects_empty_db_path() {
    let result = AppConfig::load_from_str("[database]\npath = \"\"\n");
    assert!(result.is_err());
}

#[test]
fn test_config_rejects_zero_refresh_interval() {
    let result = AppConfig::load_from_str("[cache]\nrefresh_interval_secs = 0\n");
    assert!(result.is_err());
}
