// Alert service - Merges fixture alerts with alerts derived from machine state
use crate::application::alert_source::AlertSource;
use crate::application::fleet_service::{FleetLoad, FleetService};
use crate::domain::alert::{AlertView, Severity, derive_alerts, sort_alerts};
use crate::domain::status::Role;
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertFeed {
    pub role: Role,
    pub alerts: Vec<AlertView>,
    pub error: Option<String>,
}

#[derive(Clone)]
pub struct AlertService {
    source: Arc<dyn AlertSource>,
    fleet_service: FleetService,
}

impl AlertService {
    pub fn new(source: Arc<dyn AlertSource>, fleet_service: FleetService) -> Self {
        Self { source, fleet_service }
    }

    pub async fn alerts(&self, role: Role, min_severity: Option<Severity>) -> AlertFeed {
        let load = self.fleet_service.load_fleet().await;
        self.alerts_from(role, min_severity, &load).await
    }

    /// Same as `alerts` but reuses an already loaded fleet.
    pub async fn alerts_from(&self, role: Role, min_severity: Option<Severity>, load: &FleetLoad) -> AlertFeed {
        let mut errors = Vec::new();
        if let Some(e) = &load.error {
            errors.push(e.clone());
        }

        let mut alerts = match self.source.list_alerts().await {
            Ok(alerts) => alerts,
            Err(e) => {
                tracing::warn!(error = %e, "alert source failed, showing derived alerts only");
                errors.push(e.to_string());
                Vec::new()
            }
        };
        alerts.extend(derive_alerts(
            &load.machines,
            self.fleet_service.maintenance_threshold_hours(),
            Utc::now(),
        ));

        alerts.retain(|a| a.is_visible_to(role) && min_severity.is_none_or(|min| a.severity >= min));
        sort_alerts(&mut alerts);

        AlertFeed {
            role,
            alerts: alerts.into_iter().map(|a| AlertView::new(a, role)).collect(),
            error: if errors.is_empty() { None } else { Some(errors.join("; ")) },
        }
    }
}
