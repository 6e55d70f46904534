//! Configuration loading for the docview client.
//!
//! Connection and auth fields are required. Logging and module overrides
//! are optional.

use docview_core::{ModuleRoute, PropertyScope, RouteTable};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub const CONFIG_ENV_VAR: &str = "DOCVIEW_CONFIG";

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClientConfig {
    pub api_base_url: String,
    pub auth: AuthConfig,
    pub request_timeout_ms: u64,
    #[serde(default)]
    pub log: LogConfig,
    /// Route-table additions keyed by module id.
    #[serde(default)]
    pub modules: BTreeMap<String, ModuleOverride>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuthConfig {
    pub api_key: Option<String>,
    pub jwt: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LogConfig {
    #[serde(default = "default_log_filter")]
    pub filter: String,
    #[serde(default)]
    pub json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
            json: false,
        }
    }
}

fn default_log_filter() -> String {
    "docview_client=info,warn".to_string()
}

/// Per-module path overrides. `property_view` switches the module to
/// view-scoped property management with that default view.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModuleOverride {
    pub base: Option<String>,
    pub records: Option<String>,
    pub property_view: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing configuration file path (use --config or DOCVIEW_CONFIG)")]
    MissingConfigPath,
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid config value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}

impl ClientConfig {
    /// Load from `--config <path>` or `DOCVIEW_CONFIG`, then validate.
    pub fn load() -> Result<Self, ConfigError> {
        let path = config_path().ok_or(ConfigError::MissingConfigPath)?;
        let config = Self::from_path(&path)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let config: ClientConfig = toml::from_str(contents)?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let base = self.api_base_url.trim();
        if base.is_empty() {
            return Err(invalid("api_base_url", "must not be empty"));
        }
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(invalid("api_base_url", "must start with http:// or https://"));
        }
        if self.auth.api_key.is_none() && self.auth.jwt.is_none() {
            return Err(invalid("auth", "api_key or jwt must be provided"));
        }
        if self.request_timeout_ms == 0 {
            return Err(invalid("request_timeout_ms", "must be > 0"));
        }
        if self.log.filter.trim().is_empty() {
            return Err(invalid("log.filter", "must not be empty"));
        }
        for (module, entry) in &self.modules {
            if module.trim().is_empty() || module.contains('/') {
                return Err(invalid("modules", &format!("'{}' is not a module id", module)));
            }
            if let Some(base) = &entry.base {
                if !base.starts_with('/') {
                    return Err(invalid(
                        &format!("modules.{}.base", module),
                        "must start with '/'",
                    ));
                }
            }
            if let Some(records) = &entry.records {
                if !(records.starts_with('/') || records.starts_with("{base}")) {
                    return Err(invalid(
                        &format!("modules.{}.records", module),
                        "must start with '/' or '{base}'",
                    ));
                }
            }
            if let Some(view) = &entry.property_view {
                if view.trim().is_empty() || view.contains('/') {
                    return Err(invalid(
                        &format!("modules.{}.property_view", module),
                        "must be a non-empty view id",
                    ));
                }
            }
        }
        Ok(())
    }

    /// Built-in routes with the configured module overrides applied.
    pub fn route_table(&self) -> RouteTable {
        let builtin = RouteTable::builtin();
        let mut table = builtin.clone();
        for (module, entry) in &self.modules {
            let mut route = builtin
                .route(module)
                .cloned()
                .unwrap_or_else(ModuleRoute::generic);
            if let Some(base) = &entry.base {
                route.base = base.clone();
            }
            if let Some(records) = &entry.records {
                route.records = records.clone();
            }
            if let Some(view) = &entry.property_view {
                route.property_scope = PropertyScope::View {
                    default_view_id: view.clone(),
                };
            }
            table = table.with_route(module, route);
        }
        table
    }
}

fn invalid(field: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}

/// `--config` from the process arguments, else `DOCVIEW_CONFIG`.
pub fn config_path() -> Option<PathBuf> {
    config_path_from_args(std::env::args().skip(1)).or_else(config_path_from_env)
}

fn config_path_from_env() -> Option<PathBuf> {
    std::env::var(CONFIG_ENV_VAR).ok().map(PathBuf::from)
}

/// Value following `--config`, if present.
pub fn config_path_from_args<I>(args: I) -> Option<PathBuf>
where
    I: IntoIterator<Item = String>,
{
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        if arg == "--config" {
            return args.next().map(PathBuf::from);
        }
        if let Some(path) = arg.strip_prefix("--config=") {
            return Some(PathBuf::from(path));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_config_path_from_args() {
        assert_eq!(
            config_path_from_args(args(&["list", "--config", "/etc/docview.toml"])),
            Some(PathBuf::from("/etc/docview.toml"))
        );
        assert_eq!(
            config_path_from_args(args(&["--config=local.toml", "views"])),
            Some(PathBuf::from("local.toml"))
        );
        assert_eq!(config_path_from_args(args(&["list", "tasks"])), None);
    }

    #[test]
    fn test_log_defaults() {
        let config = ClientConfig::from_toml(
            r#"
api_base_url = "https://api.example.test"
request_timeout_ms = 5000

[auth]
jwt = "token"
"#,
        )
        .unwrap();
        assert_eq!(config.log.filter, "docview_client=info,warn");
        assert!(!config.log.json);
        assert!(config.modules.is_empty());
        assert!(config.validate().is_ok());
    }
}
