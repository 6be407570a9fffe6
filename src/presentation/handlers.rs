// HTTP request handlers
use crate::application::fleet_service::FleetSnapshot;
use crate::application::machine_service::ListRequest;
use crate::domain::alert::Severity;
use crate::domain::machine::{MachineDraft, MachinePatch};
use crate::domain::query::{MachineFilter, SortKey, SortOrder};
use crate::domain::status::Role;
use crate::error::ApiError;
use crate::infrastructure::chunked_json::stream_from_receiver;
use crate::infrastructure::http_response::{accepts_brotli, json_response};
use crate::presentation::app_state::AppState;
use axum::{
    Json,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug)]
pub enum HandlerError {
    NotFound(String),
    BadRequest(String),
    BadGateway(String),
}

impl IntoResponse for HandlerError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            HandlerError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            HandlerError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            HandlerError::BadGateway(msg) => (StatusCode::BAD_GATEWAY, msg),
        };
        (status, Json(serde_json::json!({"error": message}))).into_response()
    }
}

impl From<ApiError> for HandlerError {
    fn from(e: ApiError) -> Self {
        if e.is_not_found() {
            return HandlerError::NotFound(e.to_string());
        }
        match &e {
            ApiError::Rejected { .. } => HandlerError::BadRequest(e.to_string()),
            ApiError::Status { status, .. } if (400..500).contains(status) => HandlerError::BadRequest(e.to_string()),
            _ => HandlerError::BadGateway(e.to_string()),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct RoleQuery {
    pub role: Option<Role>,
}

#[derive(Debug, Default, Deserialize)]
pub struct MachinesQuery {
    pub role: Option<Role>,
    pub status: Option<String>,
    pub machine_type: Option<String>,
    pub search: Option<String>,
    pub sort: Option<SortKey>,
    pub order: Option<SortOrder>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

impl From<MachinesQuery> for ListRequest {
    fn from(q: MachinesQuery) -> Self {
        let non_blank = |v: Option<String>| v.filter(|s| !s.trim().is_empty());
        ListRequest {
            role: q.role.unwrap_or_default(),
            filter: MachineFilter {
                status: non_blank(q.status),
                machine_type: non_blank(q.machine_type),
                search: non_blank(q.search),
            },
            sort: q.sort.unwrap_or_default(),
            order: q.order.unwrap_or_default(),
            page: q.page,
            page_size: q.page_size,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct AlertsQuery {
    pub role: Option<Role>,
    /// Minimum severity, case-insensitive.
    pub severity: Option<String>,
}

/// Latest monitor snapshot. All fields are null until the first refresh lands.
#[derive(Debug, Serialize)]
pub struct LiveView {
    pub sequence: Option<u64>,
    pub committed_at: Option<DateTime<Utc>>,
    pub snapshot: Option<FleetSnapshot>,
}

async fn respond<T: Serialize>(status: StatusCode, data: &T, headers: &HeaderMap) -> Response {
    match json_response(status, data, accepts_brotli(headers)).await {
        Ok(response) => response,
        Err(status) => status.into_response(),
    }
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

pub async fn list_machines(
    headers: HeaderMap,
    Query(query): Query<MachinesQuery>,
    State(state): State<Arc<AppState>>,
) -> Response {
    let listing = state.machine_service.list(&query.into()).await;
    respond(StatusCode::OK, &listing, &headers).await
}

pub async fn get_machine(
    headers: HeaderMap,
    Path(id): Path<String>,
    Query(query): Query<RoleQuery>,
    State(state): State<Arc<AppState>>,
) -> Result<Response, HandlerError> {
    let view = state.machine_service.get(&id, query.role.unwrap_or_default()).await?;
    Ok(respond(StatusCode::OK, &view, &headers).await)
}

pub async fn create_machine(
    headers: HeaderMap,
    Query(query): Query<RoleQuery>,
    State(state): State<Arc<AppState>>,
    Json(draft): Json<MachineDraft>,
) -> Result<Response, HandlerError> {
    if draft.name.trim().is_empty() {
        return Err(HandlerError::BadRequest("name must not be empty".to_string()));
    }
    if draft.machine_type.trim().is_empty() {
        return Err(HandlerError::BadRequest("machine_type must not be empty".to_string()));
    }

    let view = state.machine_service.create(&draft, query.role.unwrap_or_default()).await?;
    Ok(respond(StatusCode::CREATED, &view, &headers).await)
}

pub async fn update_machine(
    headers: HeaderMap,
    Path(id): Path<String>,
    Query(query): Query<RoleQuery>,
    State(state): State<Arc<AppState>>,
    Json(patch): Json<MachinePatch>,
) -> Result<Response, HandlerError> {
    if patch.is_empty() {
        return Err(HandlerError::BadRequest("no fields to update".to_string()));
    }

    let view = state
        .machine_service
        .update(&id, &patch, query.role.unwrap_or_default())
        .await?;
    Ok(respond(StatusCode::OK, &view, &headers).await)
}

pub async fn delete_machine(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<StatusCode, HandlerError> {
    state.machine_service.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn fleet_summary(
    headers: HeaderMap,
    Query(query): Query<RoleQuery>,
    State(state): State<Arc<AppState>>,
) -> Response {
    let snapshot = state.fleet_service.summary(query.role.unwrap_or_default()).await;
    respond(StatusCode::OK, &snapshot, &headers).await
}

pub async fn fleet_trends(
    headers: HeaderMap,
    Query(query): Query<RoleQuery>,
    State(state): State<Arc<AppState>>,
) -> Response {
    let trends = state.fleet_service.trends(query.role.unwrap_or_default()).await;
    respond(StatusCode::OK, &trends, &headers).await
}

pub async fn fleet_live(headers: HeaderMap, State(state): State<Arc<AppState>>) -> Response {
    let view = match state.monitor.latest().await {
        Some(latest) => LiveView {
            sequence: Some(latest.sequence),
            committed_at: Some(latest.committed_at),
            snapshot: Some(latest.value),
        },
        None => LiveView {
            sequence: None,
            committed_at: None,
            snapshot: None,
        },
    };
    respond(StatusCode::OK, &view, &headers).await
}

pub async fn refresh_fleet(headers: HeaderMap, State(state): State<Arc<AppState>>) -> Response {
    let outcome = state.monitor.refresh().await;
    respond(StatusCode::OK, &outcome, &headers).await
}

pub async fn list_alerts(
    headers: HeaderMap,
    Query(query): Query<AlertsQuery>,
    State(state): State<Arc<AppState>>,
) -> Result<Response, HandlerError> {
    let min_severity = match query.severity.as_deref().filter(|s| !s.trim().is_empty()) {
        Some(raw) => Some(
            Severity::parse(raw).ok_or_else(|| HandlerError::BadRequest(format!("unknown severity '{}'", raw)))?,
        ),
        None => None,
    };

    let feed = state
        .alert_service
        .alerts(query.role.unwrap_or_default(), min_severity)
        .await;
    Ok(respond(StatusCode::OK, &feed, &headers).await)
}

/// Stream a role dashboard (progressive loading)
pub async fn stream_dashboard(
    Path(role): Path<String>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HandlerError> {
    let role = Role::parse(&role).ok_or_else(|| HandlerError::NotFound(format!("no dashboard for role '{}'", role)))?;
    let rx = state.streaming_service.stream_dashboard(role);
    Ok(stream_from_receiver(rx, accepts_brotli(&headers)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_mapping() {
        let cases = [
            (ApiError::NotFound { resource: "machine 9".into() }, StatusCode::NOT_FOUND),
            (ApiError::Status { status: 404, body: String::new() }, StatusCode::NOT_FOUND),
            (ApiError::Rejected { message: "bad type".into() }, StatusCode::BAD_REQUEST),
            (ApiError::Status { status: 422, body: String::new() }, StatusCode::BAD_REQUEST),
            (ApiError::Status { status: 500, body: String::new() }, StatusCode::BAD_GATEWAY),
            (ApiError::unexpected("html"), StatusCode::BAD_GATEWAY),
        ];

        for (error, expected) in cases {
            let response = HandlerError::from(error).into_response();
            assert_eq!(response.status(), expected);
        }
    }

    #[test]
    fn test_blank_query_values_are_ignored() {
        let request: ListRequest = MachinesQuery {
            role: Some(Role::Inspector),
            status: Some("  ".to_string()),
            search: Some("loom".to_string()),
            ..Default::default()
        }
        .into();

        assert_eq!(request.role, Role::Inspector);
        assert!(request.filter.status.is_none());
        assert_eq!(request.filter.search.as_deref(), Some("loom"));
        assert_eq!(request.sort, SortKey::Name);
    }
}
