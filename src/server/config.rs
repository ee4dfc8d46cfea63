use serde::{Deserialize, Serialize};
use std::path::Path;

/// Expand environment variables in a string.
/// Supports $VAR_NAME and ${VAR_NAME} syntax. Substituted values are not
/// expanded again.
fn expand_env_vars(input: &str) -> String {
  let mut result = String::with_capacity(input.len());
  let mut rest = input;

  while let Some(pos) = rest.find('$') {
    result.push_str(&rest[..pos]);
    let after = &rest[pos + 1..];

    // ${VAR_NAME}
    if let Some(braced) = after.strip_prefix('{') {
      let Some(end) = braced.find('}') else {
        result.push_str(&rest[pos..]);
        return result;
      };
      result.push_str(&std::env::var(&braced[..end]).unwrap_or_default());
      rest = &braced[end + 1..];
      continue;
    }

    // $VAR_NAME (word boundary: alphanumeric + underscore)
    let var_len = after
      .chars()
      .take_while(|c| c.is_ascii_alphanumeric() || *c == '_')
      .count();
    if var_len > 0 {
      result.push_str(&std::env::var(&after[..var_len]).unwrap_or_default());
    } else {
      result.push('$');
    }
    rest = &after[var_len..];
  }

  result.push_str(rest);
  result
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerConfig {
  #[serde(default)]
  pub server: ServerSection,
  #[serde(default)]
  pub datastore: DatastoreSection,
  #[serde(default)]
  pub logging: LoggingSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSection {
  #[serde(default = "default_host")]
  pub host: String,
  #[serde(default = "default_port")]
  pub port: u16,
  /// CORS allowed origins
  /// Use ["*"] for permissive mode, or specify origins like ["http://localhost:3000"]
  #[serde(default = "default_cors_origins")]
  pub cors_origins: Vec<String>,
}

fn default_host() -> String {
  "0.0.0.0".into()
}
fn default_port() -> u16 {
  8800
}
fn default_cors_origins() -> Vec<String> {
  vec!["*".to_string()]
}

impl Default for ServerSection {
  fn default() -> Self {
    Self {
      host: default_host(),
      port: default_port(),
      cors_origins: default_cors_origins(),
    }
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatastoreSection {
  /// JSON document holding every collection
  #[serde(default = "default_datastore_path")]
  pub path: String,
  /// Write an empty document on startup when the file is absent
  #[serde(default = "default_true")]
  pub create_if_missing: bool,
}

fn default_datastore_path() -> String {
  "./datasource/repository/logs.json".into()
}
fn default_true() -> bool {
  true
}

impl Default for DatastoreSection {
  fn default() -> Self {
    Self {
      path: default_datastore_path(),
      create_if_missing: true,
    }
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSection {
  #[serde(default = "default_level")]
  pub level: String,
}
fn default_level() -> String {
  "info".into()
}
impl Default for LoggingSection {
  fn default() -> Self {
    Self {
      level: default_level(),
    }
  }
}

impl ServerConfig {
  pub fn from_file(path: impl AsRef<Path>) -> Result<Self, anyhow::Error> {
    let content = std::fs::read_to_string(&path)?;
    Self::from_yaml(&content)
  }

  pub fn from_yaml(content: &str) -> Result<Self, anyhow::Error> {
    let expanded = expand_env_vars(content);
    Ok(serde_yaml::from_str(&expanded)?)
  }

  pub fn find_and_load() -> Result<Option<Self>, anyhow::Error> {
    for p in ["logstore.yaml", "logstore.yml"] {
      if Path::new(p).exists() {
        tracing::info!("Loading config from {}", p);
        return Ok(Some(Self::from_file(p)?));
      }
    }
    Ok(None)
  }

  pub fn address(&self) -> String {
    format!("{}:{}", self.server.host, self.server.port)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_expand_braced_and_bare_vars() {
    std::env::set_var("LOGSTORE_TEST_DIR", "/var/lib/logstore");
    assert_eq!(
      expand_env_vars("path: ${LOGSTORE_TEST_DIR}/logs.json"),
      "path: /var/lib/logstore/logs.json"
    );
    assert_eq!(
      expand_env_vars("path: $LOGSTORE_TEST_DIR/logs.json"),
      "path: /var/lib/logstore/logs.json"
    );
  }

  #[test]
  fn test_expand_unset_var_is_empty() {
    assert_eq!(expand_env_vars("x${LOGSTORE_TEST_UNSET}y"), "xy");
  }

  #[test]
  fn test_expand_does_not_rescan_values() {
    std::env::set_var("LOGSTORE_TEST_SELF", "${LOGSTORE_TEST_SELF}");
    std::env::set_var("LOGSTORE_TEST_BARE", "$LOGSTORE_TEST_BARE/x");
    assert_eq!(
      expand_env_vars("a ${LOGSTORE_TEST_SELF} b"),
      "a ${LOGSTORE_TEST_SELF} b"
    );
    assert_eq!(expand_env_vars("$LOGSTORE_TEST_BARE"), "$LOGSTORE_TEST_BARE/x");
  }

  #[test]
  fn test_expand_unterminated_brace() {
    assert_eq!(expand_env_vars("x ${OPEN"), "x ${OPEN");
  }

  #[test]
  fn test_expand_leaves_plain_text() {
    assert_eq!(expand_env_vars("price: 5 $ é"), "price: 5 $ é");
  }
}
