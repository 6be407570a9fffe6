// Heuristics - Placeholder efficiency and uptime estimators
// The backend reports no measured efficiency or uptime, so these come from
// status-keyed tables. Display only; served JSON marks them with
// `metrics_source: "estimated"`.

use super::machine::{MachineRecord, OperationalStatus};

pub const METRICS_SOURCE: &str = "estimated";

const FRESH_SERVICE_HOURS: f64 = 100.0;
const DUE_SERVICE_HOURS: f64 = 500.0;

/// Estimated efficiency percentage for one machine.
pub fn estimated_efficiency(machine: &MachineRecord) -> f64 {
    match machine.operational_status {
        OperationalStatus::Running => {
            if machine.hours_since_maintenance < FRESH_SERVICE_HOURS {
                95.0
            } else if machine.hours_since_maintenance < DUE_SERVICE_HOURS {
                90.0
            } else {
                85.0
            }
        }
        OperationalStatus::Idle
        | OperationalStatus::Maintenance
        | OperationalStatus::Breakdown
        | OperationalStatus::Offline => 0.0,
    }
}

/// Estimated uptime percentage for one machine.
///
/// A machine reporting exactly zero operating hours is new and gets a flat
/// 90 (running) or 70 (anything else). Unreported hours use the status table.
pub fn estimated_uptime(machine: &MachineRecord) -> f64 {
    if machine.is_new() {
        return if machine.operational_status.is_running() {
            90.0
        } else {
            70.0
        };
    }

    match machine.operational_status {
        OperationalStatus::Running => 95.0,
        OperationalStatus::Idle => 85.0,
        OperationalStatus::Maintenance => 60.0,
        OperationalStatus::Breakdown => 30.0,
        OperationalStatus::Offline => 0.0,
    }
}

/// Mean of per-machine estimates, clamped to [0, 100] and rounded to one
/// decimal. Empty input yields 0.
pub fn fleet_average<F>(machines: &[MachineRecord], estimate: F) -> f64
where
    F: Fn(&MachineRecord) -> f64,
{
    if machines.is_empty() {
        return 0.0;
    }

    let total: f64 = machines.iter().map(|m| estimate(m)).sum();
    round_one_decimal((total / machines.len() as f64).clamp(0.0, 100.0))
}

pub fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
