// Machine grid rows, filtering and sorting
use super::heuristics::{METRICS_SOURCE, estimated_efficiency, estimated_uptime};
use super::machine::{MachineRecord, MachineType, OperationalStatus};
use super::quality::QualityImpact;
use super::status::Role;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// One row of the machine grid as a given role sees it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MachineView {
    pub id: String,
    pub name: String,
    pub machine_type: MachineType,
    pub location: Option<String>,
    pub operational_status: OperationalStatus,
    pub display_status: String,
    pub quality_impact: QualityImpact,
    pub hours_since_maintenance: f64,
    pub total_operating_hours: Option<f64>,
    pub rated_power: Option<f64>,
    pub rated_capacity: Option<f64>,
    pub efficiency: f64,
    pub uptime: f64,
    pub metrics_source: String,
}

impl MachineView {
    pub fn new(machine: &MachineRecord, role: Role) -> Self {
        Self {
            id: machine.id.clone(),
            name: machine.name.clone(),
            machine_type: machine.machine_type.clone(),
            location: machine.location.clone(),
            operational_status: machine.operational_status,
            display_status: role.display_status(machine.operational_status).to_string(),
            quality_impact: QualityImpact::classify(&machine.machine_type),
            hours_since_maintenance: machine.hours_since_maintenance,
            total_operating_hours: machine.total_operating_hours,
            rated_power: machine.rated_power,
            rated_capacity: machine.rated_capacity,
            efficiency: estimated_efficiency(machine),
            uptime: estimated_uptime(machine),
            metrics_source: METRICS_SOURCE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    #[default]
    Name,
    Status,
    Efficiency,
    Uptime,
    HoursSinceMaintenance,
    OperatingHours,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MachineFilter {
    /// Backend status or a label from the requesting role's vocabulary.
    pub status: Option<String>,
    /// Machine type id or name.
    pub machine_type: Option<String>,
    pub search: Option<String>,
}

impl MachineFilter {
    pub fn is_active(&self) -> bool {
        [&self.status, &self.machine_type, &self.search]
            .into_iter()
            .any(|v| non_blank(v).is_some())
    }

    pub fn matches(&self, view: &MachineView, role: Role) -> bool {
        if let Some(status) = non_blank(&self.status) {
            let wanted = status.to_ascii_lowercase();
            let backend = view.operational_status.as_str();
            let display = role.display_status(view.operational_status);
            if wanted != backend && wanted != display {
                return false;
            }
        }

        if let Some(machine_type) = non_blank(&self.machine_type) {
            let wanted = machine_type.to_lowercase();
            if view.machine_type.id.to_lowercase() != wanted
                && view.machine_type.name.to_lowercase() != wanted
            {
                return false;
            }
        }

        if let Some(search) = non_blank(&self.search) {
            let needle = search.to_lowercase();
            let haystacks = [
                Some(view.name.as_str()),
                Some(view.id.as_str()),
                view.location.as_deref(),
                Some(view.machine_type.name.as_str()),
            ];
            if !haystacks
                .iter()
                .flatten()
                .any(|h| h.to_lowercase().contains(&needle))
            {
                return false;
            }
        }

        true
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Filter then sort. Ties always fall back to id so the order is stable
/// between refreshes.
pub fn filter_and_sort(
    mut views: Vec<MachineView>,
    filter: &MachineFilter,
    role: Role,
    key: SortKey,
    order: SortOrder,
) -> Vec<MachineView> {
    views.retain(|v| filter.matches(v, role));
    views.sort_by(|a, b| {
        let primary = compare_by(a, b, key);
        let primary = match order {
            SortOrder::Asc => primary,
            SortOrder::Desc => primary.reverse(),
        };
        primary.then_with(|| a.id.cmp(&b.id))
    });
    views
}

fn compare_by(a: &MachineView, b: &MachineView, key: SortKey) -> Ordering {
    match key {
        SortKey::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
        SortKey::Status => a.display_status.cmp(&b.display_status),
        SortKey::Efficiency => a.efficiency.total_cmp(&b.efficiency),
        SortKey::Uptime => a.uptime.total_cmp(&b.uptime),
        SortKey::HoursSinceMaintenance => a.hours_since_maintenance.total_cmp(&b.hours_since_maintenance),
        SortKey::OperatingHours => a
            .total_operating_hours
            .unwrap_or(0.0)
            .total_cmp(&b.total_operating_hours.unwrap_or(0.0)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn views(role: Role) -> Vec<MachineView> {
        let machines = vec![
            MachineRecord::new("m3", "Loom C", OperationalStatus::Breakdown, MachineType::new("1", "Air-Jet Loom"))
                .with_hours_since_maintenance(700.0),
            MachineRecord::new("m1", "Loom A", OperationalStatus::Running, MachineType::new("1", "Air-Jet Loom"))
                .with_hours_since_maintenance(40.0),
            MachineRecord::new("m2", "Spinner B", OperationalStatus::Offline, MachineType::new("2", "Ring Spinning"))
                .with_hours_since_maintenance(300.0),
        ];
        machines.iter().map(|m| MachineView::new(m, role)).collect()
    }

    fn ids(views: &[MachineView]) -> Vec<&str> {
        views.iter().map(|v| v.id.as_str()).collect()
    }

    #[test]
    fn test_view_carries_role_status_and_estimates() {
        let rows = views(Role::Analyst);
        assert_eq!(rows[0].display_status, "error");
        assert_eq!(rows[1].display_status, "active");
        assert_eq!(rows[1].efficiency, 95.0);
        assert_eq!(rows[1].metrics_source, "estimated");
        assert_eq!(rows[0].quality_impact, QualityImpact::Critical);
    }

    #[test]
    fn test_filter_by_role_label() {
        let filter = MachineFilter {
            status: Some("error".to_string()),
            ..Default::default()
        };
        let rows = filter_and_sort(views(Role::Analyst), &filter, Role::Analyst, SortKey::Name, SortOrder::Asc);
        assert_eq!(ids(&rows), vec!["m3", "m2"]);
    }

    #[test]
    fn test_filter_by_backend_status() {
        let filter = MachineFilter {
            status: Some("Offline".to_string()),
            ..Default::default()
        };
        let rows = filter_and_sort(views(Role::Analyst), &filter, Role::Analyst, SortKey::Name, SortOrder::Asc);
        assert_eq!(ids(&rows), vec!["m2"]);
    }

    #[test]
    fn test_filter_by_type_and_search() {
        let filter = MachineFilter {
            machine_type: Some("air-jet loom".to_string()),
            search: Some(" c ".to_string()),
            ..Default::default()
        };
        let rows = filter_and_sort(views(Role::Admin), &filter, Role::Admin, SortKey::Name, SortOrder::Asc);
        assert_eq!(ids(&rows), vec!["m3"]);
    }

    #[test]
    fn test_blank_filter_keeps_everything() {
        let filter = MachineFilter {
            status: Some("  ".to_string()),
            ..Default::default()
        };
        let rows = filter_and_sort(views(Role::Admin), &filter, Role::Admin, SortKey::Name, SortOrder::Asc);
        assert_eq!(rows.len(), 3);
    }

    #[test]
    fn test_sort_orders() {
        let rows = filter_and_sort(
            views(Role::Admin),
            &MachineFilter::default(),
            Role::Admin,
            SortKey::HoursSinceMaintenance,
            SortOrder::Desc,
        );
        assert_eq!(ids(&rows), vec!["m3", "m2", "m1"]);

        // Two machines tie on zero efficiency; id breaks the tie.
        let rows = filter_and_sort(
            views(Role::Admin),
            &MachineFilter::default(),
            Role::Admin,
            SortKey::Efficiency,
            SortOrder::Asc,
        );
        assert_eq!(ids(&rows), vec!["m2", "m3", "m1"]);
    }
}
