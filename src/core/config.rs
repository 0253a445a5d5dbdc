use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

use crate::core::formatter;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Root of the local mirror tree holding downloaded manifests and
    /// cost files, one subtree per grantee.
    #[serde(default = "default_mirror_dir")]
    pub mirror_dir: PathBuf,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_mirror_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("curtrack")
        .join("mirror")
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            mirror_dir: default_mirror_dir(),
            log_level: default_log_level(),
        }
    }
}

/// One grantee: where its CUR output lives in S3 and how to present it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GranteeConfig {
    pub name: String,
    pub s3_bucket: String,
    #[serde(default)]
    pub s3_prefix: String,
    /// CUR report base name; manifests and data files are named after it.
    pub report_name: String,
    #[serde(default = "default_chart_color")]
    pub chart_color: String,
    /// Grant ceiling in USD for the remaining-vs-spent view.
    pub grant_amount: f64,
}

fn default_chart_color() -> String {
    "cyan".to_string()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub grantees: Vec<GranteeConfig>,
}

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

impl AppConfig {
    /// Get the config file path, respecting XDG_CONFIG_HOME
    pub fn config_path() -> PathBuf {
        let config_dir = std::env::var("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                dirs::home_dir()
                    .unwrap_or_else(|| PathBuf::from("~"))
                    .join(".config")
            });
        config_dir.join("curtrack").join("config.toml")
    }

    /// Load config from the default path, falling back to defaults if not found
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::config_path();
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(&path)?;
        let config: AppConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Serialize and write this config to the config file path.
    pub fn save(&self) -> Result<PathBuf, std::io::Error> {
        let path = Self::config_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self).expect("Failed to serialize config");
        std::fs::write(&path, content)?;
        Ok(path)
    }

    /// Starter config with one example grantee, for `config init`.
    pub fn sample() -> Self {
        Self {
            settings: Settings::default(),
            grantees: vec![GranteeConfig {
                name: "example".to_string(),
                s3_bucket: "example-cur-bucket".to_string(),
                s3_prefix: "reports/cur".to_string(),
                report_name: "ExampleCostReport".to_string(),
                chart_color: default_chart_color(),
                grant_amount: 10_000.0,
            }],
        }
    }

    /// Validate the config
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();
        if !LOG_LEVELS.contains(&self.settings.log_level.as_str()) {
            issues.push(format!(
                "Invalid log_level: '{}' (must be one of {})",
                self.settings.log_level,
                LOG_LEVELS.join("|")
            ));
        }
        if self.settings.mirror_dir.as_os_str().is_empty() {
            issues.push("mirror_dir must not be empty".to_string());
        }

        let mut seen = std::collections::HashSet::new();
        for g in &self.grantees {
            if g.name.is_empty() {
                issues.push("Grantee with empty name".to_string());
                continue;
            }
            if !seen.insert(g.name.as_str()) {
                issues.push(format!("Duplicate grantee name: '{}'", g.name));
            }
            if g.s3_bucket.is_empty() {
                issues.push(format!("Grantee '{}': s3_bucket must not be empty", g.name));
            }
            if g.report_name.is_empty() {
                issues.push(format!(
                    "Grantee '{}': report_name must not be empty",
                    g.name
                ));
            }
            if formatter::chart_color(&g.chart_color).is_none() {
                issues.push(format!(
                    "Grantee '{}': unknown chart_color '{}'",
                    g.name, g.chart_color
                ));
            }
            if !g.grant_amount.is_finite() || g.grant_amount < 0.0 {
                issues.push(format!(
                    "Grantee '{}': grant_amount must be a non-negative number",
                    g.name
                ));
            }
        }
        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        let issues = config.validate();
        assert!(
            issues.is_empty(),
            "Default config should be valid, got: {:?}",
            issues
        );
    }

    #[test]
    fn sample_config_is_valid() {
        let config = AppConfig::sample();
        assert!(config.validate().is_empty());
        assert_eq!(config.grantees.len(), 1);
    }

    #[test]
    fn default_log_level_is_info() {
        let settings = Settings::default();
        assert_eq!(settings.log_level, "info");
    }

    #[test]
    fn validate_catches_invalid_log_level() {
        let mut config = AppConfig::default();
        config.settings.log_level = "loud".to_string();
        let issues = config.validate();
        assert!(issues.iter().any(|i| i.contains("log_level")));
    }

    #[test]
    fn validate_catches_duplicate_grantee_names() {
        let mut config = AppConfig::sample();
        let dup = config.grantees[0].clone();
        config.grantees.push(dup);
        let issues = config.validate();
        assert!(issues.iter().any(|i| i.contains("Duplicate grantee")));
    }

    #[test]
    fn validate_catches_unknown_chart_color() {
        let mut config = AppConfig::sample();
        config.grantees[0].chart_color = "chartreuse".to_string();
        let issues = config.validate();
        assert!(issues.iter().any(|i| i.contains("chart_color")));
    }

    #[test]
    fn validate_catches_negative_grant_amount() {
        let mut config = AppConfig::sample();
        config.grantees[0].grant_amount = -1.0;
        let issues = config.validate();
        assert!(issues.iter().any(|i| i.contains("grant_amount")));
    }

    #[test]
    fn parse_minimal_toml() {
        let toml = r#"
[settings]
mirror_dir = "/tmp/mirror"
log_level = "debug"
"#;
        let config: AppConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.settings.mirror_dir, PathBuf::from("/tmp/mirror"));
        assert_eq!(config.settings.log_level, "debug");
        assert!(config.grantees.is_empty());
    }

    #[test]
    fn parse_grantee_toml() {
        let toml = r#"
[[grantees]]
name = "cf"
s3_bucket = "cf-cur"
s3_prefix = "reports/cur"
report_name = "CFAWSCostReportRegular"
chart_color = "blue"
grant_amount = 25000.0
"#;
        let config: AppConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.grantees.len(), 1);
        assert_eq!(config.grantees[0].name, "cf");
        assert_eq!(config.grantees[0].chart_color, "blue");
        assert_eq!(config.grantees[0].grant_amount, 25000.0);
    }

    #[test]
    fn parse_empty_toml_gives_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.settings.log_level, "info");
        assert!(config.grantees.is_empty());
    }

    #[test]
    fn config_path_uses_xdg_when_set() {
        std::env::set_var("XDG_CONFIG_HOME", "/tmp/test_xdg_config");
        let path = AppConfig::config_path();
        std::env::remove_var("XDG_CONFIG_HOME");
        assert_eq!(
            path,
            PathBuf::from("/tmp/test_xdg_config/curtrack/config.toml")
        );
    }
}
