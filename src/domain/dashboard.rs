// Dashboard layout per role
use super::fleet::FleetSummary;
use super::status::Role;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TileMetric {
    TotalMachines,
    AverageEfficiency,
    AverageUptime,
    Running,
    Breakdown,
    Offline,
    InMaintenance,
    Active,
    Error,
    Operational,
    NeedsAttention,
    MaintenanceBacklog,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileSpec {
    pub id: String,
    pub title: String,
    pub unit: String,
    pub precision: i32,
    pub metric: TileMetric,
}

impl TileSpec {
    fn new(metric: TileMetric, title: &str, unit: &str, precision: i32) -> Self {
        let id = serde_json::to_value(metric)
            .ok()
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_else(|| title.to_lowercase().replace(' ', "_"));
        Self {
            id,
            title: title.to_string(),
            unit: unit.to_string(),
            precision,
            metric,
        }
    }

    pub fn value(&self, summary: &FleetSummary, backlog_len: usize) -> f64 {
        match self.metric {
            TileMetric::TotalMachines => summary.total_machines as f64,
            TileMetric::AverageEfficiency => summary.average_efficiency,
            TileMetric::AverageUptime => summary.average_uptime,
            TileMetric::Running => summary.counts.running as f64,
            TileMetric::Breakdown => summary.counts.breakdown as f64,
            TileMetric::Offline => summary.counts.offline as f64,
            TileMetric::InMaintenance => summary.counts.maintenance as f64,
            TileMetric::Active => summary.analyst.active as f64,
            TileMetric::Error => summary.analyst.error as f64,
            TileMetric::Operational => summary.inspector.operational as f64,
            TileMetric::NeedsAttention => summary.inspector.maintenance as f64,
            TileMetric::MaintenanceBacklog => backlog_len as f64,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    StatusDistribution,
    TypeBreakdown,
    MaintenanceBacklog,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSpec {
    pub id: String,
    pub title: String,
    pub kind: ChartKind,
}

impl ChartSpec {
    fn new(kind: ChartKind, title: &str) -> Self {
        let id = match kind {
            ChartKind::StatusDistribution => "status_distribution",
            ChartKind::TypeBreakdown => "type_breakdown",
            ChartKind::MaintenanceBacklog => "maintenance_backlog",
        };
        Self {
            id: id.to_string(),
            title: title.to_string(),
            kind,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardLayout {
    pub role: Role,
    pub title: String,
    /// Status filter options for the machine grid, in display order.
    pub status_labels: Vec<String>,
    pub tiles: Vec<TileSpec>,
    pub charts: Vec<ChartSpec>,
}

impl DashboardLayout {
    pub fn for_role(role: Role) -> Self {
        let mut tiles = vec![
            TileSpec::new(TileMetric::TotalMachines, "Machines", "", 0),
            TileSpec::new(TileMetric::AverageEfficiency, "Avg Efficiency", "%", 1),
            TileSpec::new(TileMetric::AverageUptime, "Avg Uptime", "%", 1),
        ];
        let mut charts = vec![ChartSpec::new(ChartKind::StatusDistribution, "Machine Status")];

        match role {
            Role::Admin => {
                tiles.push(TileSpec::new(TileMetric::Running, "Running", "", 0));
                tiles.push(TileSpec::new(TileMetric::Breakdown, "Breakdowns", "", 0));
                tiles.push(TileSpec::new(TileMetric::Offline, "Offline", "", 0));
                charts.push(ChartSpec::new(ChartKind::TypeBreakdown, "By Machine Type"));
                charts.push(ChartSpec::new(ChartKind::MaintenanceBacklog, "Maintenance Due"));
            }
            Role::Analyst => {
                tiles.push(TileSpec::new(TileMetric::Active, "Active", "", 0));
                tiles.push(TileSpec::new(TileMetric::Error, "In Error", "", 0));
                charts.push(ChartSpec::new(ChartKind::TypeBreakdown, "Efficiency by Type"));
            }
            Role::Inspector => {
                tiles.push(TileSpec::new(TileMetric::Operational, "Operational", "", 0));
                tiles.push(TileSpec::new(TileMetric::NeedsAttention, "Needs Attention", "", 0));
                charts.push(ChartSpec::new(ChartKind::TypeBreakdown, "Machines by Type"));
            }
            Role::Technician => {
                tiles.push(TileSpec::new(TileMetric::InMaintenance, "In Maintenance", "", 0));
                tiles.push(TileSpec::new(TileMetric::Breakdown, "Breakdowns", "", 0));
                tiles.push(TileSpec::new(TileMetric::MaintenanceBacklog, "Service Due", "", 0));
                charts.push(ChartSpec::new(ChartKind::MaintenanceBacklog, "Maintenance Queue"));
            }
        }

        let title = match role {
            Role::Admin => "Plant Overview",
            Role::Analyst => "Production Analytics",
            Role::Inspector => "Quality Inspection",
            Role::Technician => "Maintenance Floor",
        };

        Self {
            role,
            title: title.to_string(),
            status_labels: role.status_labels().into_iter().map(str::to_string).collect(),
            tiles,
            charts,
        }
    }

    pub fn widget_count(&self) -> usize {
        self.tiles.len() + self.charts.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::fleet::StatusCounts;

    #[test]
    fn test_layouts_per_role() {
        let technician = DashboardLayout::for_role(Role::Technician);
        assert!(technician.charts.iter().any(|c| c.kind == ChartKind::MaintenanceBacklog));
        assert!(technician.charts.iter().all(|c| c.kind != ChartKind::TypeBreakdown));

        let analyst = DashboardLayout::for_role(Role::Analyst);
        assert_eq!(analyst.widget_count(), 7);
        assert_eq!(analyst.tiles[0].id, "total_machines");
        assert_eq!(analyst.charts[0].id, "status_distribution");
        assert_eq!(analyst.status_labels, vec!["active", "maintenance", "idle", "error"]);
    }

    #[test]
    fn test_tile_values() {
        let counts = StatusCounts {
            running: 3,
            breakdown: 1,
            offline: 1,
            ..Default::default()
        };
        let summary = FleetSummary::from_parts(counts, 57.0, 63.0);

        let values: Vec<f64> = DashboardLayout::for_role(Role::Analyst)
            .tiles
            .iter()
            .map(|t| t.value(&summary, 0))
            .collect();
        assert_eq!(values, vec![5.0, 57.0, 63.0, 3.0, 2.0]);

        let backlog_tile = TileSpec::new(TileMetric::MaintenanceBacklog, "Service Due", "", 0);
        assert_eq!(backlog_tile.value(&summary, 4), 4.0);
    }
}
