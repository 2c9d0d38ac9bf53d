use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::data::pagination::DEFAULT_MAX_PAGE_SIZE;
use crate::data::query::{DEFAULT_ID_FIELD, IdentifierKind};
use crate::utils::file::expand_path;

use super::cli::CliConfig;
use super::constants::{
    APP_DOT_FOLDER, CONFIG_FILE_NAME, DEFAULT_HOST, DEFAULT_MAX_COLUMNS, DEFAULT_PORT,
};

// =============================================================================
// File Config Structs (deserialized from JSON)
// =============================================================================

/// Server section of the config file
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ServerFileConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
}

/// Query section of the config file
#[derive(Debug, Default, Clone, Deserialize)]
pub struct QueryFileConfig {
    pub max_page_size: Option<i64>,
    pub max_columns: Option<usize>,
    pub id_field: Option<String>,
    pub id_kind: Option<IdentifierKind>,
}

/// File-based configuration (JSON)
#[derive(Debug, Default, Deserialize)]
pub struct FileConfig {
    pub server: Option<ServerFileConfig>,
    pub query: Option<QueryFileConfig>,
    #[serde(flatten)]
    pub extra: serde_json::Value,
}

impl FileConfig {
    /// Load configuration from a JSON file
    fn load_from_file(path: &Path) -> Result<Self> {
        tracing::debug!(path = %path.display(), "Loading config file");
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        tracing::trace!(config = ?config, "Parsed config file");
        Ok(config)
    }

    /// Warn about unknown fields in the config
    fn warn_unknown_fields(&self) {
        if let serde_json::Value::Object(map) = &self.extra
            && !map.is_empty()
        {
            let keys_str: String = map
                .keys()
                .map(|k| k.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            tracing::warn!(
                fields = %keys_str,
                "Unknown fields in config file (possible typos)"
            );
        }
    }

    /// Merge another FileConfig into this one (other takes precedence)
    fn merge(&mut self, other: FileConfig) {
        if let Some(server) = other.server {
            let current = self.server.get_or_insert_with(ServerFileConfig::default);
            if server.host.is_some() {
                tracing::trace!(host = ?server.host, "Merging server.host");
                current.host = server.host;
            }
            if server.port.is_some() {
                tracing::trace!(port = ?server.port, "Merging server.port");
                current.port = server.port;
            }
        }

        if let Some(query) = other.query {
            let current = self.query.get_or_insert_with(QueryFileConfig::default);
            if query.max_page_size.is_some() {
                tracing::trace!(max_page_size = ?query.max_page_size, "Merging query.max_page_size");
                current.max_page_size = query.max_page_size;
            }
            if query.max_columns.is_some() {
                tracing::trace!(max_columns = ?query.max_columns, "Merging query.max_columns");
                current.max_columns = query.max_columns;
            }
            if query.id_field.is_some() {
                tracing::trace!(id_field = ?query.id_field, "Merging query.id_field");
                current.id_field = query.id_field;
            }
            if query.id_kind.is_some() {
                tracing::trace!(id_kind = ?query.id_kind, "Merging query.id_kind");
                current.id_kind = query.id_kind;
            }
        }
    }
}

// =============================================================================
// Runtime Config Structs (final merged configuration)
// =============================================================================

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

/// Query compilation configuration
#[derive(Debug, Clone)]
pub struct QueryConfig {
    /// Upper bound on page size (raised to at least 10 when applied)
    pub max_page_size: i64,
    /// Maximum number of columns accepted per HTTP request
    pub max_columns: usize,
    pub id_field: String,
    pub id_kind: IdentifierKind,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            max_page_size: DEFAULT_MAX_PAGE_SIZE as i64,
            max_columns: DEFAULT_MAX_COLUMNS,
            id_field: DEFAULT_ID_FIELD.to_string(),
            id_kind: IdentifierKind::default(),
        }
    }
}

/// Final merged application configuration
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub query: QueryConfig,
}

impl AppConfig {
    /// Load configuration from all sources
    ///
    /// Priority (lowest to highest):
    /// 1. Defaults
    /// 2. Profile directory config (~/.sieve/sieve.json)
    /// 3. Local directory config OR CLI-specified config path
    /// 4. CLI arguments (which include env var fallbacks via clap)
    pub fn load(cli: &CliConfig) -> Result<Self> {
        tracing::debug!("Loading application configuration");
        tracing::trace!(cli = ?cli, "CLI config");

        let mut file_config = FileConfig::default();
        let mut found_configs: Vec<String> = Vec::new();

        if let Some(profile_path) = get_profile_config_path()
            && profile_path.exists()
        {
            let profile_config = FileConfig::load_from_file(&profile_path)?;
            profile_config.warn_unknown_fields();
            file_config.merge(profile_config);
            found_configs.push(profile_path.display().to_string());
        }

        let overlay_path = if let Some(ref path) = cli.config {
            let expanded = expand_path(&path.to_string_lossy());
            if !expanded.exists() {
                anyhow::bail!("Config file not found: {}", expanded.display());
            }
            Some(expanded)
        } else {
            let local = PathBuf::from(CONFIG_FILE_NAME);
            if local.exists() { Some(local) } else { None }
        };

        if let Some(path) = overlay_path {
            let overlay_config = FileConfig::load_from_file(&path)?;
            overlay_config.warn_unknown_fields();
            file_config.merge(overlay_config);
            found_configs.push(path.display().to_string());
        }

        tracing::debug!(configs = ?found_configs, "Config files loaded");

        let file_server = file_config.server.unwrap_or_default();
        let file_query = file_config.query.unwrap_or_default();
        let defaults = QueryConfig::default();

        let server = ServerConfig {
            host: cli
                .host
                .clone()
                .or(file_server.host)
                .unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: cli.port.or(file_server.port).unwrap_or(DEFAULT_PORT),
        };

        let query = QueryConfig {
            max_page_size: cli
                .max_page_size
                .or(file_query.max_page_size)
                .unwrap_or(defaults.max_page_size),
            max_columns: cli
                .max_columns
                .or(file_query.max_columns)
                .unwrap_or(defaults.max_columns),
            id_field: cli
                .id_field
                .clone()
                .or(file_query.id_field)
                .unwrap_or(defaults.id_field),
            id_kind: cli
                .id_kind
                .or(file_query.id_kind)
                .unwrap_or(defaults.id_kind),
        };

        let config = Self { server, query };
        config.validate()?;

        tracing::debug!(
            host = %config.server.host,
            port = config.server.port,
            max_page_size = config.query.max_page_size,
            max_columns = config.query.max_columns,
            id_field = %config.query.id_field,
            id_kind = %config.query.id_kind,
            "Configuration loaded"
        );

        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.server.host.is_empty() {
            anyhow::bail!("Configuration error: server.host must not be empty");
        }

        // Port 0 would bind a random port
        if self.server.port == 0 {
            anyhow::bail!("Configuration error: server.port must be greater than 0");
        }

        if self.query.max_columns == 0 {
            anyhow::bail!("Configuration error: query.max_columns must be greater than 0");
        }

        if self.query.id_field.trim().is_empty() {
            anyhow::bail!("Configuration error: query.id_field must not be empty");
        }

        Ok(())
    }
}

/// Get the profile config path (~/.sieve/sieve.json)
fn get_profile_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(APP_DOT_FOLDER).join(CONFIG_FILE_NAME))
}

/// Check if host binds to all network interfaces
pub(crate) fn is_all_interfaces(host: &str) -> bool {
    matches!(host, "0.0.0.0" | "::" | "[::]")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_file_config_parse_full() {
        let json = r#"{
            "server": { "host": "0.0.0.0", "port": 8080 },
            "query": { "max_page_size": 200, "max_columns": 12, "id_field": "uid", "id_kind": "uuid" }
        }"#;
        let config: FileConfig = serde_json::from_str(json).unwrap();

        let server = config.server.as_ref().unwrap();
        assert_eq!(server.host, Some("0.0.0.0".to_string()));
        assert_eq!(server.port, Some(8080));

        let query = config.query.as_ref().unwrap();
        assert_eq!(query.max_page_size, Some(200));
        assert_eq!(query.max_columns, Some(12));
        assert_eq!(query.id_field, Some("uid".to_string()));
        assert_eq!(query.id_kind, Some(IdentifierKind::Uuid));
    }

    #[test]
    fn test_is_all_interfaces() {
        assert!(is_all_interfaces("0.0.0.0"));
        assert!(is_all_interfaces("::"));
        assert!(!is_all_interfaces("127.0.0.1"));
    }

    #[test]
    fn test_file_config_parse_empty() {
        let config: FileConfig = serde_json::from_str("{}").unwrap();
        assert!(config.server.is_none());
        assert!(config.query.is_none());
    }

    #[test]
    fn test_file_config_parse_extra_fields() {
        let json = r#"{ "server": { "host": "localhost" }, "unknown_field": 123 }"#;
        let config: FileConfig = serde_json::from_str(json).unwrap();

        assert_eq!(
            config.server.as_ref().unwrap().host,
            Some("localhost".to_string())
        );
        assert_eq!(config.extra.get("unknown_field").unwrap(), 123);
    }

    #[test]
    fn test_file_config_rejects_bad_id_kind() {
        let json = r#"{ "query": { "id_kind": "serial" } }"#;
        assert!(serde_json::from_str::<FileConfig>(json).is_err());
    }

    #[test]
    fn test_file_config_merge() {
        let mut base = FileConfig {
            server: Some(ServerFileConfig {
                host: Some("base.host".to_string()),
                port: Some(1000),
            }),
            query: Some(QueryFileConfig {
                max_page_size: Some(100),
                id_field: Some("_id".to_string()),
                ..Default::default()
            }),
            extra: serde_json::Value::Null,
        };
        let overlay = FileConfig {
            server: Some(ServerFileConfig {
                host: None,
                port: Some(2000),
            }),
            query: Some(QueryFileConfig {
                max_page_size: Some(300),
                id_kind: Some(IdentifierKind::Uuid),
                ..Default::default()
            }),
            extra: serde_json::Value::Null,
        };

        base.merge(overlay);

        let server = base.server.as_ref().unwrap();
        assert_eq!(server.host, Some("base.host".to_string()));
        assert_eq!(server.port, Some(2000));

        let query = base.query.as_ref().unwrap();
        assert_eq!(query.max_page_size, Some(300));
        assert_eq!(query.id_field, Some("_id".to_string()));
        assert_eq!(query.id_kind, Some(IdentifierKind::Uuid));
        assert!(query.max_columns.is_none());
    }

    #[test]
    fn test_app_config_defaults() {
        let config = AppConfig::load(&CliConfig::default()).unwrap();

        assert_eq!(config.server.host, DEFAULT_HOST);
        assert_eq!(config.server.port, DEFAULT_PORT);
        assert_eq!(config.query.max_page_size, 1000);
        assert_eq!(config.query.max_columns, DEFAULT_MAX_COLUMNS);
        assert_eq!(config.query.id_field, "_id");
        assert_eq!(config.query.id_kind, IdentifierKind::ObjectId);
    }

    #[test]
    fn test_app_config_from_file() {
        let file = write_config(
            r#"{ "server": { "port": 7000 }, "query": { "max_page_size": 75, "id_field": "key" } }"#,
        );
        let cli = CliConfig {
            config: Some(file.path().to_path_buf()),
            ..Default::default()
        };
        let config = AppConfig::load(&cli).unwrap();

        assert_eq!(config.server.port, 7000);
        assert_eq!(config.query.max_page_size, 75);
        assert_eq!(config.query.id_field, "key");
        assert_eq!(config.query.max_columns, DEFAULT_MAX_COLUMNS);
    }

    #[test]
    fn test_app_config_cli_overrides_file() {
        let file = write_config(r#"{ "server": { "port": 7000 }, "query": { "id_kind": "uuid" } }"#);
        let cli = CliConfig {
            host: Some("cli.host".to_string()),
            port: Some(3000),
            config: Some(file.path().to_path_buf()),
            max_page_size: Some(20),
            max_columns: Some(5),
            id_field: Some("pk".to_string()),
            id_kind: Some(IdentifierKind::ObjectId),
        };
        let config = AppConfig::load(&cli).unwrap();

        assert_eq!(config.server.host, "cli.host");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.query.max_page_size, 20);
        assert_eq!(config.query.max_columns, 5);
        assert_eq!(config.query.id_field, "pk");
        assert_eq!(config.query.id_kind, IdentifierKind::ObjectId);
    }

    #[test]
    fn test_app_config_missing_file() {
        let cli = CliConfig {
            config: Some(PathBuf::from("/nonexistent/sieve.json")),
            ..Default::default()
        };
        let result = AppConfig::load(&cli);
        assert!(result.unwrap_err().to_string().contains("Config file not found"));
    }

    #[test]
    fn test_app_config_invalid_json() {
        let file = write_config("{ not json");
        let cli = CliConfig {
            config: Some(file.path().to_path_buf()),
            ..Default::default()
        };
        let result = AppConfig::load(&cli);
        assert!(result.unwrap_err().to_string().contains("Failed to parse"));
    }

    #[test]
    fn test_app_config_validation_port_zero() {
        let cli = CliConfig {
            port: Some(0),
            ..Default::default()
        };
        let result = AppConfig::load(&cli);
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("server.port must be greater than 0")
        );
    }

    #[test]
    fn test_app_config_validation_max_columns_zero() {
        let cli = CliConfig {
            max_columns: Some(0),
            ..Default::default()
        };
        assert!(AppConfig::load(&cli).is_err());
    }

    #[test]
    fn test_app_config_validation_empty_id_field() {
        let cli = CliConfig {
            id_field: Some("  ".to_string()),
            ..Default::default()
        };
        let result = AppConfig::load(&cli);
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("query.id_field must not be empty")
        );
    }
}
