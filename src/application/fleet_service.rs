// Fleet service - Summary and trend use cases with graceful degradation
use crate::application::machine_repository::{MachineQuery, MachineRepository, fetch_all};
use crate::domain::fleet::FleetSummary;
use crate::domain::heuristics::METRICS_SOURCE;
use crate::domain::machine::MachineRecord;
use crate::domain::status::Role;
use crate::domain::trends::{
    DistributionSlice, MaintenanceItem, TypeBreakdown, maintenance_backlog, status_distribution, type_breakdown,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SummarySource {
    /// Aggregates reported by the backend stats endpoint.
    Backend,
    /// Computed here from the machine list.
    Computed,
    /// Upstream unavailable; zeroed placeholder.
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FleetSnapshot {
    pub role: Role,
    pub summary: FleetSummary,
    pub distribution: Vec<DistributionSlice>,
    pub source: SummarySource,
    pub metrics_source: &'static str,
    pub generated_at: DateTime<Utc>,
    /// Set when the view should offer a retry.
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FleetTrends {
    pub role: Role,
    pub distribution: Vec<DistributionSlice>,
    pub type_breakdown: Vec<TypeBreakdown>,
    pub maintenance_backlog: Vec<MaintenanceItem>,
    pub maintenance_threshold_hours: f64,
    pub metrics_source: &'static str,
    pub error: Option<String>,
}

/// Every machine the backend knows about, or an empty list and the reason.
#[derive(Debug, Clone, Default)]
pub struct FleetLoad {
    pub machines: Vec<MachineRecord>,
    pub error: Option<String>,
}

#[derive(Clone)]
pub struct FleetService {
    repository: Arc<dyn MachineRepository>,
    maintenance_threshold_hours: f64,
}

impl FleetService {
    pub fn new(repository: Arc<dyn MachineRepository>, maintenance_threshold_hours: f64) -> Self {
        Self {
            repository,
            maintenance_threshold_hours,
        }
    }

    pub fn maintenance_threshold_hours(&self) -> f64 {
        self.maintenance_threshold_hours
    }

    /// Walk the paginated collection. Any failure degrades to an empty fleet.
    pub async fn load_fleet(&self) -> FleetLoad {
        match fetch_all(&*self.repository, &MachineQuery::default()).await {
            Ok(machines) => FleetLoad {
                machines,
                error: None,
            },
            Err(e) => {
                tracing::warn!(error = %e, transient = e.is_transient(), "failed to load machines, rendering empty fleet");
                FleetLoad {
                    machines: Vec::new(),
                    error: Some(e.to_string()),
                }
            }
        }
    }

    pub async fn summary(&self, role: Role) -> FleetSnapshot {
        match self.backend_stats().await {
            Some(summary) => snapshot(role, summary, SummarySource::Backend, None),
            None => computed_snapshot(role, &self.load_fleet().await),
        }
    }

    /// Like `summary`, but computes from a fleet the caller already loaded
    /// instead of walking the pages again.
    pub async fn summary_from(&self, role: Role, load: &FleetLoad) -> FleetSnapshot {
        match self.backend_stats().await {
            Some(summary) => snapshot(role, summary, SummarySource::Backend, None),
            None => computed_snapshot(role, load),
        }
    }

    async fn backend_stats(&self) -> Option<FleetSummary> {
        match self.repository.fleet_stats().await {
            Ok(stats) => stats,
            Err(e) => {
                tracing::warn!(error = %e, transient = e.is_transient(), "stats endpoint failed, computing locally");
                None
            }
        }
    }

    pub async fn trends(&self, role: Role) -> FleetTrends {
        let load = self.load_fleet().await;
        self.trends_from(role, &load)
    }

    pub fn trends_from(&self, role: Role, load: &FleetLoad) -> FleetTrends {
        let summary = FleetSummary::from_machines(&load.machines);
        FleetTrends {
            role,
            distribution: status_distribution(&summary, role),
            type_breakdown: type_breakdown(&load.machines),
            maintenance_backlog: maintenance_backlog(&load.machines, self.maintenance_threshold_hours),
            maintenance_threshold_hours: self.maintenance_threshold_hours,
            metrics_source: METRICS_SOURCE,
            error: load.error.clone(),
        }
    }
}

fn computed_snapshot(role: Role, load: &FleetLoad) -> FleetSnapshot {
    match &load.error {
        Some(error) => snapshot(role, FleetSummary::zeroed(), SummarySource::Fallback, Some(error.clone())),
        None => snapshot(role, FleetSummary::from_machines(&load.machines), SummarySource::Computed, None),
    }
}

fn snapshot(role: Role, summary: FleetSummary, source: SummarySource, error: Option<String>) -> FleetSnapshot {
    FleetSnapshot {
        role,
        distribution: status_distribution(&summary, role),
        summary,
        source,
        metrics_source: METRICS_SOURCE,
        generated_at: Utc::now(),
        error,
    }
}
