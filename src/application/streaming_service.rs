// Streaming dashboard service - Progressive loading of a role dashboard
use crate::application::alert_service::AlertService;
use crate::application::fleet_service::FleetService;
use crate::domain::alert::AlertView;
use crate::domain::dashboard::{ChartKind, DashboardLayout};
use crate::domain::status::Role;
use crate::domain::trends::{DistributionSlice, MaintenanceItem, TypeBreakdown};
use serde::Serialize;
use std::time::Instant;
use tokio::sync::mpsc;

const CHANNEL_CAPACITY: usize = 100;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "rows", rename_all = "snake_case")]
pub enum ChartData {
    StatusDistribution(Vec<DistributionSlice>),
    TypeBreakdown(Vec<TypeBreakdown>),
    MaintenanceBacklog(Vec<MaintenanceItem>),
}

/// One frame of a dashboard stream. The skeleton always comes first and
/// `Complete` always comes last.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DashboardMessage {
    Skeleton { layout: DashboardLayout },
    TileUpdate { id: String, value: f64 },
    ChartUpdate { id: String, data: ChartData },
    Alerts { alerts: Vec<AlertView> },
    Error { message: String },
    Complete { widgets: usize, duration_ms: u64 },
}

#[derive(Clone)]
pub struct StreamingDashboardService {
    fleet_service: FleetService,
    alert_service: AlertService,
}

impl StreamingDashboardService {
    pub fn new(fleet_service: FleetService, alert_service: AlertService) -> Self {
        Self {
            fleet_service,
            alert_service,
        }
    }

    pub fn stream_dashboard(&self, role: Role) -> mpsc::Receiver<DashboardMessage> {
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        let start_time = Instant::now();
        let layout = DashboardLayout::for_role(role);
        let fleet_service = self.fleet_service.clone();
        let alert_service = self.alert_service.clone();

        tokio::spawn(async move {
            let widgets = layout.widget_count();
            if tx
                .send(DashboardMessage::Skeleton { layout: layout.clone() })
                .await
                .is_err()
            {
                tracing::debug!(%role, "dashboard client went away before skeleton");
                return;
            }

            let load = fleet_service.load_fleet().await;
            let snapshot = fleet_service.summary_from(role, &load).await;
            let trends = fleet_service.trends_from(role, &load);

            // A failed load is the only source of a snapshot error.
            if let Some(error) = &load.error {
                let _ = tx.send(DashboardMessage::Error { message: error.clone() }).await;
            }

            for tile in &layout.tiles {
                let value = tile.value(&snapshot.summary, trends.maintenance_backlog.len());
                let _ = tx
                    .send(DashboardMessage::TileUpdate {
                        id: tile.id.clone(),
                        value,
                    })
                    .await;
            }

            for chart in &layout.charts {
                let data = match chart.kind {
                    ChartKind::StatusDistribution => ChartData::StatusDistribution(snapshot.distribution.clone()),
                    ChartKind::TypeBreakdown => ChartData::TypeBreakdown(trends.type_breakdown.clone()),
                    ChartKind::MaintenanceBacklog => ChartData::MaintenanceBacklog(trends.maintenance_backlog.clone()),
                };
                let _ = tx
                    .send(DashboardMessage::ChartUpdate {
                        id: chart.id.clone(),
                        data,
                    })
                    .await;
            }

            let feed = alert_service.alerts_from(role, None, &load).await;
            let _ = tx.send(DashboardMessage::Alerts { alerts: feed.alerts }).await;

            let duration_ms = start_time.elapsed().as_millis() as u64;
            tracing::debug!(%role, widgets, duration_ms, "dashboard stream complete");
            let _ = tx.send(DashboardMessage::Complete { widgets, duration_ms }).await;
        });

        rx
    }
}
