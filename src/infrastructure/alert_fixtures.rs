// Alert source backed by a TOML fixture file
use crate::application::alert_source::AlertSource;
use crate::domain::alert::{Alert, AlertOrigin, Severity};
use crate::domain::quality::QualityImpact;
use crate::domain::status::Role;
use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct FixtureFile {
    #[serde(default)]
    alerts: Vec<FixtureAlert>,
}

#[derive(Debug, Deserialize)]
struct FixtureAlert {
    id: String,
    severity: Severity,
    title: String,
    #[serde(default)]
    message: String,
    machine_id: Option<String>,
    machine_status: Option<String>,
    quality_impact: Option<QualityImpact>,
    #[serde(default)]
    audience: Vec<Role>,
    raised_at: Option<DateTime<Utc>>,
}

impl FixtureAlert {
    fn into_alert(self, loaded_at: DateTime<Utc>) -> Alert {
        Alert {
            id: self.id,
            severity: self.severity,
            title: self.title,
            message: self.message,
            machine_id: self.machine_id,
            machine_status: self.machine_status,
            quality_impact: self.quality_impact,
            audience: self.audience,
            raised_at: self.raised_at.unwrap_or(loaded_at),
            origin: AlertOrigin::Fixture,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct FixtureAlertSource {
    alerts: Vec<Alert>,
}

impl FixtureAlertSource {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading alert fixtures from {}", path.display()))?;
        let source = Self::from_toml_str(&raw)
            .with_context(|| format!("parsing alert fixtures in {}", path.display()))?;
        tracing::info!(path = %path.display(), alerts = source.alerts.len(), "loaded alert fixtures");
        Ok(source)
    }

    pub fn from_toml_str(raw: &str) -> anyhow::Result<Self> {
        let file: FixtureFile = toml::from_str(raw)?;
        let loaded_at = Utc::now();
        Ok(Self {
            alerts: file.alerts.into_iter().map(|a| a.into_alert(loaded_at)).collect(),
        })
    }
}

#[async_trait]
impl AlertSource for FixtureAlertSource {
    async fn list_alerts(&self) -> anyhow::Result<Vec<Alert>> {
        Ok(self.alerts.clone())
    }
}
