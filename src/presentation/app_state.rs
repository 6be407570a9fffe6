// Application state for HTTP handlers
use crate::application::alert_service::AlertService;
use crate::application::fleet_service::FleetService;
use crate::application::machine_service::MachineService;
use crate::application::refresh::FleetMonitor;
use crate::application::streaming_service::StreamingDashboardService;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub machine_service: MachineService,
    pub fleet_service: FleetService,
    pub alert_service: AlertService,
    pub monitor: Arc<FleetMonitor>,
    pub streaming_service: StreamingDashboardService,
}
