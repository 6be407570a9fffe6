// Chart-ready shapes derived from a fleet
use super::fleet::FleetSummary;
use super::heuristics::{estimated_efficiency, estimated_uptime, fleet_average, round_one_decimal};
use super::machine::{MachineRecord, MachineType, OperationalStatus};
use super::status::{AnalystStatus, InspectorStatus, Role};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionSlice {
    pub label: String,
    pub count: usize,
    pub percentage: f64,
}

/// One slice per bucket in the role's vocabulary, in display order.
pub fn status_distribution(summary: &FleetSummary, role: Role) -> Vec<DistributionSlice> {
    let buckets: Vec<(&'static str, usize)> = match role {
        Role::Analyst => AnalystStatus::ALL
            .iter()
            .map(|s| (s.as_str(), summary.analyst.get(*s)))
            .collect(),
        Role::Inspector => InspectorStatus::ALL
            .iter()
            .map(|s| (s.as_str(), summary.inspector.get(*s)))
            .collect(),
        Role::Admin | Role::Technician => OperationalStatus::ALL
            .iter()
            .map(|s| (s.as_str(), summary.counts.get(*s)))
            .collect(),
    };

    buckets
        .into_iter()
        .map(|(label, count)| DistributionSlice {
            label: label.to_string(),
            count,
            percentage: percentage(count, summary.total_machines),
        })
        .collect()
}

fn percentage(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        round_one_decimal(count as f64 * 100.0 / total as f64)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeBreakdown {
    pub machine_type: MachineType,
    pub machines: usize,
    pub running: usize,
    pub average_efficiency: f64,
    pub average_uptime: f64,
}

/// Per-type aggregates, sorted by type name then id.
pub fn type_breakdown(machines: &[MachineRecord]) -> Vec<TypeBreakdown> {
    let mut groups: BTreeMap<(String, String), Vec<MachineRecord>> = BTreeMap::new();
    for machine in machines {
        groups
            .entry((machine.machine_type.name.clone(), machine.machine_type.id.clone()))
            .or_default()
            .push(machine.clone());
    }

    groups
        .into_values()
        .filter_map(|group| {
            let machine_type = group.first()?.machine_type.clone();
            Some(TypeBreakdown {
                machine_type,
                machines: group.len(),
                running: group.iter().filter(|m| m.operational_status.is_running()).count(),
                average_efficiency: fleet_average(&group, estimated_efficiency),
                average_uptime: fleet_average(&group, estimated_uptime),
            })
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaintenanceItem {
    pub machine_id: String,
    pub name: String,
    pub machine_type: MachineType,
    pub operational_status: OperationalStatus,
    pub hours_since_maintenance: f64,
    pub overdue_by: f64,
}

/// Machines at or past the service threshold, most overdue first.
pub fn maintenance_backlog(machines: &[MachineRecord], threshold_hours: f64) -> Vec<MaintenanceItem> {
    let mut backlog: Vec<MaintenanceItem> = machines
        .iter()
        .filter(|m| m.hours_since_maintenance >= threshold_hours)
        .map(|m| MaintenanceItem {
            machine_id: m.id.clone(),
            name: m.name.clone(),
            machine_type: m.machine_type.clone(),
            operational_status: m.operational_status,
            hours_since_maintenance: m.hours_since_maintenance,
            overdue_by: round_one_decimal(m.hours_since_maintenance - threshold_hours),
        })
        .collect();

    backlog.sort_by(|a, b| {
        b.hours_since_maintenance
            .total_cmp(&a.hours_since_maintenance)
            .then_with(|| a.machine_id.cmp(&b.machine_id))
    });
    backlog
}
