//! Configuration tests - defaults, YAML overrides, env expansion
#![cfg(feature = "server")]

use logstore::server::ServerConfig;

#[test]
fn test_config_defaults() {
  let config = ServerConfig::default();
  assert_eq!(config.server.host, "0.0.0.0");
  assert_eq!(config.server.port, 8800);
  assert_eq!(config.server.cors_origins, vec!["*".to_string()]);
  assert_eq!(config.datastore.path, "./datasource/repository/logs.json");
  assert!(config.datastore.create_if_missing);
  assert_eq!(config.logging.level, "info");
  assert_eq!(config.address(), "0.0.0.0:8800");
}

#[test]
fn test_config_from_yaml_full() {
  let yaml = r#"
server:
  host: 127.0.0.1
  port: 9000
  cors_origins: ["http://localhost:3000"]
datastore:
  path: /tmp/logs.json
  create_if_missing: false
logging:
  level: debug
"#;

  let config = ServerConfig::from_yaml(yaml).unwrap();
  assert_eq!(config.address(), "127.0.0.1:9000");
  assert_eq!(config.server.cors_origins, vec!["http://localhost:3000"]);
  assert_eq!(config.datastore.path, "/tmp/logs.json");
  assert!(!config.datastore.create_if_missing);
  assert_eq!(config.logging.level, "debug");
}

#[test]
fn test_config_from_yaml_partial() {
  let yaml = r#"
server:
  port: 3000
"#;

  let config = ServerConfig::from_yaml(yaml).unwrap();
  // Defaults should apply for unspecified fields
  assert_eq!(config.server.port, 3000);
  assert_eq!(config.server.host, "0.0.0.0");
  assert_eq!(config.datastore.path, "./datasource/repository/logs.json");
  assert!(config.datastore.create_if_missing);
}

#[test]
fn test_config_env_expansion() {
  std::env::set_var("LOGSTORE_CONFIG_TEST_PATH", "/srv/data");
  let yaml = r#"
datastore:
  path: ${LOGSTORE_CONFIG_TEST_PATH}/logs.json
"#;

  let config = ServerConfig::from_yaml(yaml).unwrap();
  assert_eq!(config.datastore.path, "/srv/data/logs.json");
}

#[test]
fn test_config_from_file() {
  let dir = tempfile::TempDir::new().unwrap();
  let path = dir.path().join("logstore.yaml");
  std::fs::write(&path, "logging:\n  level: warn\n").unwrap();

  let config = ServerConfig::from_file(&path).unwrap();
  assert_eq!(config.logging.level, "warn");
}

#[test]
fn test_config_invalid_yaml() {
  assert!(ServerConfig::from_yaml("server: [not, a, map]").is_err());
}
