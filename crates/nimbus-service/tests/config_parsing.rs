use std::{env, fs};

use nimbus_service::config::loader::load_config;

#[test]
fn config_parsing_and_env_overrides_and_validation() {
    // Create a temporary TOML configuration file
    let dir = tempfile::tempdir().expect("tmp dir");
    let path = dir.path().join("nimbus.toml");

    let toml_content = r#"
cities = ["Johannesburg", "Cape Town", "Durban"]

[cache]
ttl_secs = 300
refresh_interval_mins = 5
report_interval_secs = 30

[redis]
enabled = false

[provider]
base_url = "https://api.openweathermap.org/data/2.5/weather"
api_key = "file-key"
timeout_secs = 5

[logging]
level = "debug"
"#;
    fs::write(&path, toml_content).expect("write toml");

    // 1) Valid config parses
    let cfg = load_config(path.to_str()).expect("should parse config");
    assert_eq!(cfg.cities.len(), 3);
    assert_eq!(cfg.cache.ttl_secs, 300);
    assert_eq!(cfg.cache.refresh_interval_mins, 5);
    assert!(!cfg.redis.enabled);
    assert_eq!(cfg.provider.api_key, "file-key");
    assert_eq!(cfg.logging.level.to_ascii_lowercase(), "debug");

    // 2) Env override should win over file
    unsafe {
        env::set_var("NIMBUS__CACHE__TTL_SECS", "120");
    }
    let cfg_env = load_config(path.to_str()).expect("should parse config with env overrides");
    assert_eq!(cfg_env.cache.ttl_secs, 120);
    // cleanup env var
    unsafe {
        env::remove_var("NIMBUS__CACHE__TTL_SECS");
    }

    // 3) Invalid config (no cities) should error
    let invalid_path = dir.path().join("invalid.toml");
    let invalid_toml = r#"
cities = []

[provider]
api_key = "file-key"
"#;
    fs::write(&invalid_path, invalid_toml).expect("write invalid toml");
    let err = load_config(invalid_path.to_str()).expect_err("expected validation error");
    assert!(err.contains("cities must not be empty"));
}

#[test]
fn config_defaults_apply_without_file() {
    // A file with only the required cities list picks up every default.
    let dir = tempfile::tempdir().expect("tmp dir");
    let path = dir.path().join("minimal.toml");
    fs::write(&path, "cities = [\"Durban\"]\n").expect("write toml");

    let cfg = load_config(path.to_str()).expect("should parse minimal config");
    assert_eq!(cfg.cache.ttl_secs, 600);
    assert_eq!(cfg.cache.refresh_interval_mins, 10);
    assert_eq!(cfg.cache.report_interval_secs, 60);
    assert!(cfg.redis.enabled);
    assert_eq!(cfg.redis.url, "redis://localhost:6379");
    assert_eq!(cfg.provider.timeout_secs, 10);
    assert_eq!(cfg.logging.level, "info");
}
