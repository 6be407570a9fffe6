// REST backend repository implementation
use crate::application::machine_repository::{MachinePage, MachineQuery, MachineRepository};
use crate::domain::fleet::FleetSummary;
use crate::domain::machine::{MachineDraft, MachinePatch, MachineRecord};
use crate::error::ApiError;
use crate::infrastructure::config::{BackendSettings, prepare_path};
use crate::infrastructure::envelope::{parse_collection, parse_single, unwrap_envelope};
use crate::infrastructure::wire::{FleetStatsDto, MachineDto, MachineTypeDto, TypeCatalog};
use anyhow::Context;
use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, StatusCode};
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct RestMachineRepository {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
    machines_path: String,
    machine_path: String,
    stats_path: String,
    machine_types_path: String,
}

impl RestMachineRepository {
    pub fn new(settings: &BackendSettings) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            token: settings.api_token.clone().filter(|t| !t.is_empty()),
            machines_path: settings.machines_path.clone(),
            machine_path: settings.machine_path.clone(),
            stats_path: settings.stats_path.clone(),
            machine_types_path: settings.machine_types_path.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn machine_url(&self, id: &str) -> String {
        let mut vars = HashMap::new();
        vars.insert("id".to_string(), urlencoding::encode(id).into_owned());
        self.url(&prepare_path(&self.machine_path, &vars))
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let builder = self
            .client
            .request(method, url)
            .header("Accept", "application/json");
        match &self.token {
            Some(token) => builder.header("Authorization", format!("Token {}", token)),
            None => builder,
        }
    }

    /// Send and decode the body as JSON. Empty bodies decode to `Null`.
    async fn execute(&self, builder: RequestBuilder) -> Result<Value, ApiError> {
        let response = builder.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::debug!(status = status.as_u16(), "backend request failed");
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await?;
        if status == StatusCode::NO_CONTENT || bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Null);
        }

        serde_json::from_slice(&bytes).map_err(|e| ApiError::unexpected(format!("invalid JSON: {}", e)))
    }

    /// Map a 404 on a single-resource call to `NotFound`.
    fn not_found(id: &str, err: ApiError) -> ApiError {
        if err.is_not_found() {
            ApiError::NotFound {
                resource: format!("machine {}", id),
            }
        } else {
            err
        }
    }

    /// Type catalog for resolving bare type ids. Failures degrade to an empty
    /// catalog, which gives placeholder names.
    async fn fetch_catalog(&self) -> TypeCatalog {
        let url = self.url(&self.machine_types_path);
        let result = self
            .execute(self.request(Method::GET, &url))
            .await
            .and_then(parse_collection::<MachineTypeDto>);

        match result {
            Ok(collection) => {
                let catalog = TypeCatalog::from_dtos(collection.items);
                tracing::debug!(types = catalog.len(), "loaded machine type catalog");
                catalog
            }
            Err(e) => {
                tracing::warn!(error = %e, "machine type catalog unavailable, using placeholder names");
                TypeCatalog::default()
            }
        }
    }

    async fn normalize(&self, dtos: Vec<MachineDto>) -> Vec<MachineRecord> {
        let catalog = if dtos.iter().any(MachineDto::needs_catalog) {
            self.fetch_catalog().await
        } else {
            TypeCatalog::default()
        };
        dtos.into_iter().map(|dto| dto.into_record(&catalog)).collect()
    }

    async fn normalize_one(&self, dto: MachineDto) -> MachineRecord {
        let catalog = if dto.needs_catalog() {
            self.fetch_catalog().await
        } else {
            TypeCatalog::default()
        };
        dto.into_record(&catalog)
    }

    async fn single(&self, id: &str, builder: RequestBuilder) -> Result<MachineRecord, ApiError> {
        let body = self
            .execute(builder)
            .await
            .map_err(|e| Self::not_found(id, e))?;
        let dto = parse_single::<MachineDto>(body)?;
        Ok(self.normalize_one(dto).await)
    }
}

#[async_trait]
impl MachineRepository for RestMachineRepository {
    async fn list_machines(&self, query: &MachineQuery) -> Result<MachinePage, ApiError> {
        let url = self.url(&self.machines_path);
        tracing::debug!(url = %url, ?query, "listing machines");

        let body = self
            .execute(self.request(Method::GET, &url).query(&query.to_params()))
            .await?;
        let collection = parse_collection::<MachineDto>(body)?;
        let count = collection.count;
        let machines = self.normalize(collection.items).await;

        tracing::debug!(machines = machines.len(), count, "listed machines");
        Ok(MachinePage { machines, count })
    }

    async fn get_machine(&self, id: &str) -> Result<MachineRecord, ApiError> {
        let url = self.machine_url(id);
        self.single(id, self.request(Method::GET, &url)).await
    }

    async fn create_machine(&self, draft: &MachineDraft) -> Result<MachineRecord, ApiError> {
        let url = self.url(&self.machines_path);
        let body = self.execute(self.request(Method::POST, &url).json(draft)).await?;
        let dto = parse_single::<MachineDto>(body)?;
        Ok(self.normalize_one(dto).await)
    }

    async fn update_machine(&self, id: &str, patch: &MachinePatch) -> Result<MachineRecord, ApiError> {
        let url = self.machine_url(id);
        self.single(id, self.request(Method::PATCH, &url).json(patch)).await
    }

    async fn delete_machine(&self, id: &str) -> Result<(), ApiError> {
        let url = self.machine_url(id);
        let body = self
            .execute(self.request(Method::DELETE, &url))
            .await
            .map_err(|e| Self::not_found(id, e))?;

        // Some deployments answer 200 with an envelope rather than 204. Only
        // an explicit rejection matters here; `{success: true}` carries no data.
        match unwrap_envelope(body) {
            Err(e @ ApiError::Rejected { .. }) => Err(e),
            _ => Ok(()),
        }
    }

    async fn fleet_stats(&self) -> Result<Option<FleetSummary>, ApiError> {
        let url = self.url(&self.stats_path);
        let body = match self.execute(self.request(Method::GET, &url)).await {
            Ok(body) => body,
            Err(e) if e.is_not_found() => {
                tracing::debug!("backend has no stats endpoint");
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        let payload = unwrap_envelope(body)?;
        let stats: FleetStatsDto =
            serde_json::from_value(payload).map_err(|e| ApiError::unexpected(e.to_string()))?;
        Ok(stats.into_summary())
    }
}
