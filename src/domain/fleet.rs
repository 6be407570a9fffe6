// Fleet aggregation domain model
use super::heuristics::{estimated_efficiency, estimated_uptime, fleet_average};
use super::machine::{MachineRecord, OperationalStatus};
use super::status::{AnalystStatus, InspectorStatus};
use serde::{Deserialize, Serialize};

/// Machines per backend status bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    pub running: usize,
    pub idle: usize,
    pub maintenance: usize,
    pub breakdown: usize,
    pub offline: usize,
}

impl StatusCounts {
    pub fn tally(machines: &[MachineRecord]) -> Self {
        machines.iter().fold(Self::default(), |mut counts, machine| {
            counts.increment(machine.operational_status);
            counts
        })
    }

    pub fn increment(&mut self, status: OperationalStatus) {
        *self.bucket_mut(status) += 1;
    }

    pub fn get(&self, status: OperationalStatus) -> usize {
        match status {
            OperationalStatus::Running => self.running,
            OperationalStatus::Idle => self.idle,
            OperationalStatus::Maintenance => self.maintenance,
            OperationalStatus::Breakdown => self.breakdown,
            OperationalStatus::Offline => self.offline,
        }
    }

    fn bucket_mut(&mut self, status: OperationalStatus) -> &mut usize {
        match status {
            OperationalStatus::Running => &mut self.running,
            OperationalStatus::Idle => &mut self.idle,
            OperationalStatus::Maintenance => &mut self.maintenance,
            OperationalStatus::Breakdown => &mut self.breakdown,
            OperationalStatus::Offline => &mut self.offline,
        }
    }

    pub fn total(&self) -> usize {
        self.running + self.idle + self.maintenance + self.breakdown + self.offline
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalystCounts {
    pub active: usize,
    pub maintenance: usize,
    pub idle: usize,
    pub error: usize,
}

impl AnalystCounts {
    pub fn get(&self, status: AnalystStatus) -> usize {
        match status {
            AnalystStatus::Active => self.active,
            AnalystStatus::Maintenance => self.maintenance,
            AnalystStatus::Idle => self.idle,
            AnalystStatus::Error => self.error,
        }
    }
}

impl From<&StatusCounts> for AnalystCounts {
    fn from(counts: &StatusCounts) -> Self {
        let mut view = Self::default();
        for status in OperationalStatus::ALL {
            let n = counts.get(status);
            match AnalystStatus::from(status) {
                AnalystStatus::Active => view.active += n,
                AnalystStatus::Maintenance => view.maintenance += n,
                AnalystStatus::Idle => view.idle += n,
                AnalystStatus::Error => view.error += n,
            }
        }
        view
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InspectorCounts {
    pub operational: usize,
    pub maintenance: usize,
    pub offline: usize,
}

impl InspectorCounts {
    pub fn get(&self, status: InspectorStatus) -> usize {
        match status {
            InspectorStatus::Operational => self.operational,
            InspectorStatus::Maintenance => self.maintenance,
            InspectorStatus::Offline => self.offline,
        }
    }
}

impl From<&StatusCounts> for InspectorCounts {
    fn from(counts: &StatusCounts) -> Self {
        let mut view = Self::default();
        for status in OperationalStatus::ALL {
            let n = counts.get(status);
            match InspectorStatus::from(status) {
                InspectorStatus::Operational => view.operational += n,
                InspectorStatus::Maintenance => view.maintenance += n,
                InspectorStatus::Offline => view.offline += n,
            }
        }
        view
    }
}

/// Ephemeral fleet view model. Rebuilt from scratch on every refresh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FleetSummary {
    pub total_machines: usize,
    pub counts: StatusCounts,
    pub analyst: AnalystCounts,
    pub inspector: InspectorCounts,
    /// Placeholder estimate, see `heuristics`.
    pub average_efficiency: f64,
    /// Placeholder estimate, see `heuristics`.
    pub average_uptime: f64,
}

impl FleetSummary {
    /// Pure fold over the records; calling it twice on the same input gives
    /// the same summary.
    pub fn from_machines(machines: &[MachineRecord]) -> Self {
        let counts = StatusCounts::tally(machines);
        Self::from_parts(
            counts,
            fleet_average(machines, estimated_efficiency),
            fleet_average(machines, estimated_uptime),
        )
    }

    /// Build from counts the backend already aggregated. Averages are clamped
    /// into range, and an empty fleet has no averages to report.
    pub fn from_parts(counts: StatusCounts, average_efficiency: f64, average_uptime: f64) -> Self {
        let total_machines = counts.total();
        let (average_efficiency, average_uptime) = if total_machines == 0 {
            (0.0, 0.0)
        } else {
            (average_efficiency, average_uptime)
        };
        Self {
            total_machines,
            analyst: AnalystCounts::from(&counts),
            inspector: InspectorCounts::from(&counts),
            counts,
            average_efficiency: clamp_percentage(average_efficiency),
            average_uptime: clamp_percentage(average_uptime),
        }
    }

    /// Substitute used when the upstream fetch failed.
    pub fn zeroed() -> Self {
        Self::from_parts(StatusCounts::default(), 0.0, 0.0)
    }
}

fn clamp_percentage(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 100.0)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::machine::MachineType;

    fn fleet(statuses: &[OperationalStatus]) -> Vec<MachineRecord> {
        statuses
            .iter()
            .enumerate()
            .map(|(i, status)| {
                MachineRecord::new(format!("m{}", i), format!("Machine {}", i), *status, MachineType::unknown())
            })
            .collect()
    }

    #[test]
    fn test_counts_example() {
        use OperationalStatus::*;
        let machines = fleet(&[Running, Running, Idle, Breakdown, Offline]);
        let summary = FleetSummary::from_machines(&machines);

        assert_eq!(summary.total_machines, 5);
        assert_eq!(summary.counts.running, 2);
        assert_eq!(summary.counts.idle, 1);
        assert_eq!(summary.counts.maintenance, 0);
        assert_eq!(summary.counts.breakdown, 1);
        assert_eq!(summary.counts.offline, 1);

        assert_eq!(
            summary.analyst,
            AnalystCounts { active: 2, maintenance: 0, idle: 1, error: 2 }
        );
        assert_eq!(
            summary.inspector,
            InspectorCounts { operational: 3, maintenance: 1, offline: 1 }
        );
    }

    #[test]
    fn test_counts_sum_to_total_for_every_mix() {
        // Every ordered mix of up to three statuses.
        let mut mixes: Vec<Vec<OperationalStatus>> = Vec::new();
        for len in 0..=3u32 {
            for code in 0..5usize.pow(len) {
                let mut n = code;
                let mix = (0..len)
                    .map(|_| {
                        let status = OperationalStatus::ALL[n % 5];
                        n /= 5;
                        status
                    })
                    .collect();
                mixes.push(mix);
            }
        }

        for mix in mixes {
            let summary = FleetSummary::from_machines(&fleet(&mix));
            let analyst = summary.analyst;
            let inspector = summary.inspector;

            assert_eq!(summary.counts.total(), mix.len());
            assert_eq!(summary.total_machines, mix.len());
            assert_eq!(analyst.active + analyst.maintenance + analyst.idle + analyst.error, mix.len());
            assert_eq!(inspector.operational + inspector.maintenance + inspector.offline, mix.len());
            assert!((0.0..=100.0).contains(&summary.average_efficiency));
            assert!((0.0..=100.0).contains(&summary.average_uptime));
        }
    }

    #[test]
    fn test_empty_fleet() {
        let summary = FleetSummary::from_machines(&[]);
        assert_eq!(summary, FleetSummary::zeroed());
        assert_eq!(summary.total_machines, 0);
        assert_eq!(summary.average_efficiency, 0.0);
        assert_eq!(summary.average_uptime, 0.0);
    }

    #[test]
    fn test_summary_is_idempotent() {
        use OperationalStatus::*;
        let machines = fleet(&[Running, Maintenance, Idle]);
        assert_eq!(FleetSummary::from_machines(&machines), FleetSummary::from_machines(&machines));
    }

    #[test]
    fn test_from_parts_clamps_averages() {
        let counts = StatusCounts { running: 1, ..Default::default() };
        let summary = FleetSummary::from_parts(counts, 140.0, f64::NAN);
        assert_eq!(summary.average_efficiency, 100.0);
        assert_eq!(summary.average_uptime, 0.0);
    }

    #[test]
    fn test_from_parts_zeroes_averages_for_empty_fleet() {
        let summary = FleetSummary::from_parts(StatusCounts::default(), 80.0, 90.0);
        assert_eq!(summary.total_machines, 0);
        assert_eq!(summary.average_efficiency, 0.0);
        assert_eq!(summary.average_uptime, 0.0);
    }
}
