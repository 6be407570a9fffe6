// Role-specific status mapping
use super::machine::OperationalStatus;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Admin,
    Analyst,
    Inspector,
    Technician,
}

impl Role {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "admin" => Some(Self::Admin),
            "analyst" => Some(Self::Analyst),
            "inspector" => Some(Self::Inspector),
            "technician" => Some(Self::Technician),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Analyst => "analyst",
            Self::Inspector => "inspector",
            Self::Technician => "technician",
        }
    }

    /// Label a status in this role's vocabulary. Admins and technicians
    /// work with the backend status directly.
    pub fn display_status(&self, status: OperationalStatus) -> &'static str {
        match self {
            Self::Analyst => AnalystStatus::from(status).as_str(),
            Self::Inspector => InspectorStatus::from(status).as_str(),
            Self::Admin | Self::Technician => status.as_str(),
        }
    }

    /// Label a status string that has not been validated, e.g. one carried
    /// by an alert fixture.
    pub fn display_raw(&self, raw: &str) -> &'static str {
        match self {
            Self::Analyst => AnalystStatus::from_raw(raw).as_str(),
            Self::Inspector => InspectorStatus::from_raw(raw).as_str(),
            Self::Admin | Self::Technician => OperationalStatus::parse(raw)
                .map(|s| s.as_str())
                .unwrap_or("unknown"),
        }
    }

    /// Ordered bucket labels for this role's view.
    pub fn status_labels(&self) -> Vec<&'static str> {
        match self {
            Self::Analyst => AnalystStatus::ALL.iter().map(|s| s.as_str()).collect(),
            Self::Inspector => InspectorStatus::ALL.iter().map(|s| s.as_str()).collect(),
            Self::Admin | Self::Technician => {
                OperationalStatus::ALL.iter().map(|s| s.as_str()).collect()
            }
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalystStatus {
    Active,
    Maintenance,
    Idle,
    Error,
}

impl AnalystStatus {
    pub const ALL: [AnalystStatus; 4] = [
        AnalystStatus::Active,
        AnalystStatus::Maintenance,
        AnalystStatus::Idle,
        AnalystStatus::Error,
    ];

    /// Unrecognized input maps to `Idle`.
    pub fn from_raw(raw: &str) -> Self {
        match OperationalStatus::parse(raw) {
            Some(status) => status.into(),
            None => {
                tracing::debug!(raw, "unrecognized status, analyst view falls back to idle");
                Self::Idle
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Maintenance => "maintenance",
            Self::Idle => "idle",
            Self::Error => "error",
        }
    }
}

impl From<OperationalStatus> for AnalystStatus {
    fn from(status: OperationalStatus) -> Self {
        match status {
            OperationalStatus::Running => Self::Active,
            OperationalStatus::Idle => Self::Idle,
            OperationalStatus::Maintenance => Self::Maintenance,
            OperationalStatus::Breakdown | OperationalStatus::Offline => Self::Error,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InspectorStatus {
    Operational,
    Maintenance,
    Offline,
}

impl InspectorStatus {
    pub const ALL: [InspectorStatus; 3] = [
        InspectorStatus::Operational,
        InspectorStatus::Maintenance,
        InspectorStatus::Offline,
    ];

    /// Unrecognized input maps to `Offline`.
    pub fn from_raw(raw: &str) -> Self {
        match OperationalStatus::parse(raw) {
            Some(status) => status.into(),
            None => {
                tracing::debug!(raw, "unrecognized status, inspector view falls back to offline");
                Self::Offline
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Operational => "operational",
            Self::Maintenance => "maintenance",
            Self::Offline => "offline",
        }
    }
}

impl From<OperationalStatus> for InspectorStatus {
    fn from(status: OperationalStatus) -> Self {
        match status {
            OperationalStatus::Running | OperationalStatus::Idle => Self::Operational,
            OperationalStatus::Maintenance | OperationalStatus::Breakdown => Self::Maintenance,
            OperationalStatus::Offline => Self::Offline,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analyst_mapping() {
        use OperationalStatus::*;
        assert_eq!(AnalystStatus::from(Running), AnalystStatus::Active);
        assert_eq!(AnalystStatus::from(Idle), AnalystStatus::Idle);
        assert_eq!(AnalystStatus::from(Maintenance), AnalystStatus::Maintenance);
        assert_eq!(AnalystStatus::from(Breakdown), AnalystStatus::Error);
        assert_eq!(AnalystStatus::from(Offline), AnalystStatus::Error);
    }

    #[test]
    fn test_inspector_mapping() {
        use OperationalStatus::*;
        assert_eq!(InspectorStatus::from(Running), InspectorStatus::Operational);
        assert_eq!(InspectorStatus::from(Idle), InspectorStatus::Operational);
        assert_eq!(InspectorStatus::from(Maintenance), InspectorStatus::Maintenance);
        assert_eq!(InspectorStatus::from(Breakdown), InspectorStatus::Maintenance);
        assert_eq!(InspectorStatus::from(Offline), InspectorStatus::Offline);
    }

    #[test]
    fn test_mapping_is_total_and_in_enum() {
        for status in OperationalStatus::ALL {
            assert!(AnalystStatus::ALL.contains(&AnalystStatus::from(status)));
            assert!(InspectorStatus::ALL.contains(&InspectorStatus::from(status)));
        }
    }

    #[test]
    fn test_raw_fallbacks() {
        assert_eq!(AnalystStatus::from_raw("warming_up"), AnalystStatus::Idle);
        assert_eq!(InspectorStatus::from_raw(""), InspectorStatus::Offline);
        assert_eq!(AnalystStatus::from_raw("RUNNING"), AnalystStatus::Active);
        assert_eq!(InspectorStatus::from_raw("breakdown"), InspectorStatus::Maintenance);
    }

    #[test]
    fn test_display_status_per_role() {
        let status = OperationalStatus::Breakdown;
        assert_eq!(Role::Analyst.display_status(status), "error");
        assert_eq!(Role::Inspector.display_status(status), "maintenance");
        assert_eq!(Role::Technician.display_status(status), "breakdown");
        assert_eq!(Role::Admin.display_status(status), "breakdown");

        assert_eq!(Role::Analyst.display_raw("spinning up"), "idle");
        assert_eq!(Role::Inspector.display_raw("spinning up"), "offline");
        assert_eq!(Role::Admin.display_raw("spinning up"), "unknown");
    }

    #[test]
    fn test_role_parse() {
        assert_eq!(Role::parse("Inspector"), Some(Role::Inspector));
        assert_eq!(Role::parse("guest"), None);
        assert_eq!(Role::Analyst.status_labels(), vec!["active", "maintenance", "idle", "error"]);
    }
}
