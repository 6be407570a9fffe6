// Alert and notification domain model
use super::machine::{MachineRecord, OperationalStatus};
use super::quality::QualityImpact;
use super::status::Role;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

impl Severity {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "info" => Some(Self::Info),
            "warning" => Some(Self::Warning),
            "critical" => Some(Self::Critical),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertOrigin {
    Fixture,
    Derived,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub id: String,
    pub severity: Severity,
    pub title: String,
    pub message: String,
    pub machine_id: Option<String>,
    /// Status as reported when the alert was raised; not validated.
    pub machine_status: Option<String>,
    pub quality_impact: Option<QualityImpact>,
    /// Roles that should see this alert. Empty means everyone.
    pub audience: Vec<Role>,
    pub raised_at: DateTime<Utc>,
    pub origin: AlertOrigin,
}

impl Alert {
    pub fn is_visible_to(&self, role: Role) -> bool {
        self.audience.is_empty() || self.audience.contains(&role)
    }
}

/// An alert rendered for one role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertView {
    #[serde(flatten)]
    pub alert: Alert,
    pub status_label: Option<String>,
}

impl AlertView {
    pub fn new(alert: Alert, role: Role) -> Self {
        let status_label = alert
            .machine_status
            .as_deref()
            .map(|raw| role.display_raw(raw).to_string());
        Self { alert, status_label }
    }
}

/// Alerts implied by current machine state: breakdowns, offline machines and
/// overdue maintenance.
pub fn derive_alerts(machines: &[MachineRecord], threshold_hours: f64, now: DateTime<Utc>) -> Vec<Alert> {
    let mut alerts = Vec::new();

    for machine in machines {
        let impact = QualityImpact::classify(&machine.machine_type);
        let base = |id: String, severity: Severity, title: String, message: String, audience: Vec<Role>| Alert {
            id,
            severity,
            title,
            message,
            machine_id: Some(machine.id.clone()),
            machine_status: Some(machine.operational_status.as_str().to_string()),
            quality_impact: Some(impact),
            audience,
            raised_at: now,
            origin: AlertOrigin::Derived,
        };

        match machine.operational_status {
            OperationalStatus::Breakdown => alerts.push(base(
                format!("breakdown-{}", machine.id),
                Severity::Critical,
                format!("{} has broken down", machine.name),
                format!("{} ({}) reported a breakdown", machine.name, machine.machine_type.name),
                Vec::new(),
            )),
            OperationalStatus::Offline => alerts.push(base(
                format!("offline-{}", machine.id),
                Severity::Warning,
                format!("{} is offline", machine.name),
                format!("{} ({}) is not reporting", machine.name, machine.machine_type.name),
                Vec::new(),
            )),
            _ => {}
        }

        if machine.hours_since_maintenance >= threshold_hours {
            alerts.push(base(
                format!("maintenance-{}", machine.id),
                Severity::Warning,
                format!("{} is due for maintenance", machine.name),
                format!(
                    "{:.0}h since last maintenance (threshold {:.0}h)",
                    machine.hours_since_maintenance, threshold_hours
                ),
                vec![Role::Technician, Role::Admin],
            ));
        }
    }

    alerts
}

/// Most severe first, then highest quality impact, then newest, then id.
pub fn sort_alerts(alerts: &mut [Alert]) {
    alerts.sort_by(|a, b| {
        b.severity
            .cmp(&a.severity)
            .then_with(|| b.quality_impact.cmp(&a.quality_impact))
            .then_with(|| b.raised_at.cmp(&a.raised_at))
            .then_with(|| a.id.cmp(&b.id))
    });
}
