// Main entry point - Dependency injection and server setup
mod application;
mod domain;
mod error;
mod infrastructure;
mod presentation;

use anyhow::Context;
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tracing_subscriber::EnvFilter;

use crate::application::alert_service::AlertService;
use crate::application::alert_source::AlertSource;
use crate::application::fleet_service::FleetService;
use crate::application::machine_service::MachineService;
use crate::application::refresh::FleetMonitor;
use crate::application::streaming_service::StreamingDashboardService;
use crate::infrastructure::alert_fixtures::FixtureAlertSource;
use crate::infrastructure::config::load_app_config;
use crate::infrastructure::rest_repository::RestMachineRepository;
use crate::presentation::app_state::AppState;
use crate::presentation::router::build_router;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,textile_monitor=debug")),
        )
        .init();

    let config = load_app_config()?;

    // Infrastructure
    let repository = Arc::new(RestMachineRepository::new(&config.backend)?);
    let alert_source: Arc<dyn AlertSource> = match &config.dashboard.alerts_path {
        Some(path) => Arc::new(FixtureAlertSource::load(path)?),
        None => Arc::new(FixtureAlertSource::empty()),
    };

    // Application
    let fleet_service = FleetService::new(repository.clone(), config.dashboard.maintenance_threshold_hours);
    let machine_service = MachineService::new(repository);
    let alert_service = AlertService::new(alert_source, fleet_service.clone());
    let streaming_service = StreamingDashboardService::new(fleet_service.clone(), alert_service.clone());
    let monitor = Arc::new(FleetMonitor::new(fleet_service.clone()));
    let refresher = monitor
        .clone()
        .spawn_background(Duration::from_secs(config.dashboard.refresh_interval_secs));

    let state = Arc::new(AppState {
        machine_service,
        fleet_service,
        alert_service,
        monitor,
        streaming_service,
    });

    // Presentation
    let router = build_router(state);

    let addr: SocketAddr = config
        .server
        .bind_addr
        .parse()
        .with_context(|| format!("invalid server.bind_addr '{}'", config.server.bind_addr))?;
    tracing::info!(%addr, backend = %config.backend.base_url, "starting textile-monitor");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let served = axum::serve(listener, router).await;
    refresher.abort();
    served?;

    Ok(())
}
