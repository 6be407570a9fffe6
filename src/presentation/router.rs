// Route table
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    create_machine, delete_machine, fleet_live, fleet_summary, fleet_trends, get_machine, health_check,
    list_alerts, list_machines, refresh_fleet, stream_dashboard, update_machine,
};
use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

// Compression is applied per response (and per frame for dashboards), so no
// CompressionLayer here.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(health_check))
        .route("/api/machines", get(list_machines).post(create_machine))
        .route(
            "/api/machines/:id",
            get(get_machine).patch(update_machine).delete(delete_machine),
        )
        .route("/api/fleet/summary", get(fleet_summary))
        .route("/api/fleet/trends", get(fleet_trends))
        .route("/api/fleet/live", get(fleet_live))
        .route("/api/fleet/refresh", post(refresh_fleet))
        .route("/api/alerts", get(list_alerts))
        .route("/api/dashboards/:role", get(stream_dashboard))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
