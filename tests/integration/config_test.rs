use pulsemon::core::config::{Config, DEFAULT_TOOLS};
use pulsemon::PulseError;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_config_default() {
    let config = Config::default();
    assert_eq!(config.slow_factor, 5);
    assert_eq!(config.public_ip_ttl_secs, 60);
    assert_eq!(config.tools, DEFAULT_TOOLS.to_vec());
    assert!(!config.start_idle);
}

#[test]
fn test_config_roundtrip() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("pulsemon").join("config.json");

    let config = Config {
        fast_base_ms: 250,
        tools: vec!["nmap".to_string(), "ffuf".to_string()],
        ..Default::default()
    };
    config.save_to(&path).unwrap();

    let raw = fs::read_to_string(&path).unwrap();
    assert!(raw.contains("\"fast_base_ms\": 250"));
    assert_eq!(Config::load_from(&path), config);
}

#[test]
fn test_config_load_nonexistent_returns_default() {
    let temp_dir = TempDir::new().unwrap();
    let config = Config::load_from(&temp_dir.path().join("missing.json"));
    assert_eq!(config, Config::default());
}

#[test]
fn test_config_unknown_fields_are_ignored() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.json");
    fs::write(&path, r#"{"slow_factor": 2, "theme": "dark"}"#).unwrap();

    let config = Config::load_from(&path);
    assert_eq!(config.slow_factor, 2);
}

#[test]
fn test_config_validate() {
    assert!(Config::default().validate().is_ok());

    let config = Config {
        public_ip_ttl_secs: 0,
        ..Default::default()
    };
    assert!(matches!(config.validate(), Err(PulseError::Config(_))));
}

#[test]
fn test_config_path_is_namespaced() {
    if let Ok(path) = Config::get_config_path() {
        assert!(path.ends_with("pulsemon/config.json"));
    }
}
