// Machine domain model
use serde::{Deserialize, Serialize};
use std::fmt;

/// Backend operational status. Closed set; wire values outside it are
/// resolved at the client boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationalStatus {
    Running,
    Idle,
    Maintenance,
    Breakdown,
    Offline,
}

impl OperationalStatus {
    pub const ALL: [OperationalStatus; 5] = [
        OperationalStatus::Running,
        OperationalStatus::Idle,
        OperationalStatus::Maintenance,
        OperationalStatus::Breakdown,
        OperationalStatus::Offline,
    ];

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "running" => Some(Self::Running),
            "idle" => Some(Self::Idle),
            "maintenance" => Some(Self::Maintenance),
            "breakdown" => Some(Self::Breakdown),
            "offline" => Some(Self::Offline),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Idle => "idle",
            Self::Maintenance => "maintenance",
            Self::Breakdown => "breakdown",
            Self::Offline => "offline",
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running)
    }
}

impl fmt::Display for OperationalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Machine type, always resolved to both id and name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MachineType {
    pub id: String,
    pub name: String,
}

impl MachineType {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }

    /// Name used when only the id is known and the type catalog has no entry.
    pub fn unresolved(id: impl Into<String>) -> Self {
        let id = id.into();
        let name = format!("Type {}", id);
        Self { id, name }
    }

    pub fn unknown() -> Self {
        Self::new("unknown", "Unknown")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MachineRecord {
    pub id: String,
    pub name: String,
    pub operational_status: OperationalStatus,
    /// `None` when the backend did not report it; `Some(0.0)` marks a new machine.
    pub total_operating_hours: Option<f64>,
    pub hours_since_maintenance: f64,
    pub rated_power: Option<f64>,
    pub rated_capacity: Option<f64>,
    pub machine_type: MachineType,
    pub location: Option<String>,
}

impl MachineRecord {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        operational_status: OperationalStatus,
        machine_type: MachineType,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            operational_status,
            total_operating_hours: None,
            hours_since_maintenance: 0.0,
            rated_power: None,
            rated_capacity: None,
            machine_type,
            location: None,
        }
    }

    pub fn with_hours_since_maintenance(mut self, hours: f64) -> Self {
        self.hours_since_maintenance = non_negative(hours);
        self
    }

    pub fn with_total_operating_hours(mut self, hours: f64) -> Self {
        self.total_operating_hours = Some(non_negative(hours));
        self
    }

    pub fn is_new(&self) -> bool {
        self.total_operating_hours == Some(0.0)
    }
}

/// Clamp a wire number into the non-negative range the model requires.
pub fn non_negative(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

/// Fields accepted when registering a machine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MachineDraft {
    pub name: String,
    pub machine_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operational_status: Option<OperationalStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rated_power: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rated_capacity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

/// Partial update; only present fields are sent upstream.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MachinePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operational_status: Option<OperationalStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hours_since_maintenance: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl MachinePatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.operational_status.is_none()
            && self.hours_since_maintenance.is_none()
            && self.location.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_status() {
        assert_eq!(OperationalStatus::parse("running"), Some(OperationalStatus::Running));
        assert_eq!(OperationalStatus::parse(" Breakdown "), Some(OperationalStatus::Breakdown));
        assert_eq!(OperationalStatus::parse("exploded"), None);

        for status in OperationalStatus::ALL {
            assert_eq!(OperationalStatus::parse(status.as_str()), Some(status));
        }
    }

    #[test]
    fn test_status_serde_is_lowercase() {
        let json = serde_json::to_string(&OperationalStatus::Maintenance).unwrap();
        assert_eq!(json, "\"maintenance\"");
    }

    #[test]
    fn test_builders_clamp_negative_hours() {
        let machine = MachineRecord::new("m1", "Loom 1", OperationalStatus::Running, MachineType::unknown())
            .with_hours_since_maintenance(-4.0)
            .with_total_operating_hours(f64::NAN);

        assert_eq!(machine.hours_since_maintenance, 0.0);
        assert_eq!(machine.total_operating_hours, Some(0.0));
        assert!(machine.is_new());
    }

    #[test]
    fn test_unresolved_type_name() {
        let machine_type = MachineType::unresolved("7");
        assert_eq!(machine_type.name, "Type 7");
    }

    #[test]
    fn test_empty_patch() {
        assert!(MachinePatch::default().is_empty());
        let patch = MachinePatch {
            location: Some("Hall B".to_string()),
            ..Default::default()
        };
        assert!(!patch.is_empty());
    }
}
