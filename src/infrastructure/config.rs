use serde::Deserialize;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerSettings,
    pub backend: BackendSettings,
    pub dashboard: DashboardSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    pub bind_addr: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BackendSettings {
    pub base_url: String,
    #[serde(default)]
    pub api_token: Option<String>,
    pub timeout_secs: u64,
    pub machines_path: String,
    /// Template with an `${id}` placeholder.
    pub machine_path: String,
    pub stats_path: String,
    pub machine_types_path: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DashboardSettings {
    pub maintenance_threshold_hours: f64,
    pub refresh_interval_secs: u64,
    #[serde(default)]
    pub alerts_path: Option<String>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid setting {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let base_url = self.backend.base_url.trim();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ConfigError::Invalid {
                key: "backend.base_url",
                reason: format!("expected an http(s) URL, got '{}'", base_url),
            });
        }
        if self.backend.timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                key: "backend.timeout_secs",
                reason: "must be greater than zero".to_string(),
            });
        }
        if !self.backend.machine_path.contains("${id}") {
            return Err(ConfigError::Invalid {
                key: "backend.machine_path",
                reason: "must contain an ${id} placeholder".to_string(),
            });
        }
        if self.dashboard.refresh_interval_secs == 0 {
            return Err(ConfigError::Invalid {
                key: "dashboard.refresh_interval_secs",
                reason: "must be greater than zero".to_string(),
            });
        }
        let threshold = self.dashboard.maintenance_threshold_hours;
        if threshold.is_nan() || threshold <= 0.0 {
            return Err(ConfigError::Invalid {
                key: "dashboard.maintenance_threshold_hours",
                reason: "must be a positive number of hours".to_string(),
            });
        }
        Ok(())
    }
}

fn defaults() -> anyhow::Result<config::ConfigBuilder<config::builder::DefaultState>> {
    Ok(config::Config::builder()
        .set_default("server.bind_addr", "0.0.0.0:8080")?
        .set_default("backend.base_url", "http://localhost:8000")?
        .set_default("backend.timeout_secs", 10_i64)?
        .set_default("backend.machines_path", "/api/machines/")?
        .set_default("backend.machine_path", "/api/machines/${id}/")?
        .set_default("backend.stats_path", "/api/machines/stats/")?
        .set_default("backend.machine_types_path", "/api/machine-types/")?
        .set_default("dashboard.maintenance_threshold_hours", 500.0)?
        .set_default("dashboard.refresh_interval_secs", 30_i64)?)
}

/// Defaults, then `config/dashboard.*`, then the file named by
/// `TEXTILE_CONFIG`, then `TEXTILE__SECTION__KEY` environment variables.
pub fn load_app_config() -> anyhow::Result<AppConfig> {
    let mut builder = defaults()?.add_source(config::File::with_name("config/dashboard").required(false));

    if let Ok(path) = std::env::var("TEXTILE_CONFIG") {
        builder = builder.add_source(config::File::with_name(&path));
    }

    let settings = builder
        .add_source(config::Environment::with_prefix("TEXTILE").separator("__"))
        .build()?;

    let app_config: AppConfig = settings.try_deserialize()?;
    app_config.validate()?;
    Ok(app_config)
}

/// Replace `${var}` placeholders in an endpoint template
pub fn prepare_path(template: &str, vars: &HashMap<String, String>) -> String {
    let mut result = template.to_string();
    for (key, value) in vars {
        let placeholder = format!("${{{}}}", key);
        result = result.replace(&placeholder, value);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load_app_config_from_str(toml: &str) -> anyhow::Result<AppConfig> {
        let settings = defaults()?
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()?;

        let app_config: AppConfig = settings.try_deserialize()?;
        app_config.validate()?;
        Ok(app_config)
    }

    #[test]
    fn test_prepare_path() {
        let mut vars = HashMap::new();
        vars.insert("id".to_string(), "42".to_string());

        let result = prepare_path("/api/machines/${id}/", &vars);
        assert_eq!(result, "/api/machines/42/");
    }

    #[test]
    fn test_defaults() {
        let config = load_app_config_from_str("").unwrap();
        assert_eq!(config.server.bind_addr, "0.0.0.0:8080");
        assert_eq!(config.backend.machines_path, "/api/machines/");
        assert_eq!(config.dashboard.maintenance_threshold_hours, 500.0);
        assert_eq!(config.dashboard.refresh_interval_secs, 30);
        assert!(config.backend.api_token.is_none());
        assert!(config.dashboard.alerts_path.is_none());
    }

    #[test]
    fn test_file_overrides_defaults() {
        let config = load_app_config_from_str(
            r#"
            [backend]
            base_url = "https://mes.example.com"
            api_token = "secret"

            [dashboard]
            refresh_interval_secs = 5
            alerts_path = "config/alerts.toml"
            "#,
        )
        .unwrap();

        assert_eq!(config.backend.base_url, "https://mes.example.com");
        assert_eq!(config.backend.api_token.as_deref(), Some("secret"));
        assert_eq!(config.dashboard.refresh_interval_secs, 5);
        assert_eq!(config.backend.timeout_secs, 10);
    }

    #[test]
    fn test_validation_rejects_bad_settings() {
        let err = load_app_config_from_str("[backend]\nbase_url = \"ftp://mes\"").unwrap_err();
        assert!(err.to_string().contains("backend.base_url"));

        let err = load_app_config_from_str("[dashboard]\nrefresh_interval_secs = 0").unwrap_err();
        assert!(err.to_string().contains("refresh_interval_secs"));

        let err = load_app_config_from_str("[backend]\nmachine_path = \"/api/machines/\"").unwrap_err();
        assert!(err.to_string().contains("machine_path"));
    }
}
