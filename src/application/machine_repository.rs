// Repository trait for machine data access
use crate::domain::fleet::FleetSummary;
use crate::domain::machine::{MachineDraft, MachinePatch, MachineRecord, OperationalStatus};
use crate::error::ApiError;
use async_trait::async_trait;

const PAGE_SIZE: u32 = 200;
const MAX_PAGES: u32 = 50;

/// Filters forwarded to the backend collection endpoint.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MachineQuery {
    pub status: Option<OperationalStatus>,
    pub machine_type: Option<String>,
    pub search: Option<String>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

impl MachineQuery {
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(status) = self.status {
            params.push(("status", status.as_str().to_string()));
        }
        if let Some(machine_type) = &self.machine_type {
            params.push(("machine_type", machine_type.clone()));
        }
        if let Some(search) = &self.search {
            params.push(("search", search.clone()));
        }
        if let Some(page) = self.page {
            params.push(("page", page.to_string()));
        }
        if let Some(page_size) = self.page_size {
            params.push(("page_size", page_size.to_string()));
        }
        params
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MachinePage {
    pub machines: Vec<MachineRecord>,
    /// Total across all pages as reported by the backend.
    pub count: usize,
}

#[async_trait]
pub trait MachineRepository: Send + Sync {
    async fn list_machines(&self, query: &MachineQuery) -> Result<MachinePage, ApiError>;

    async fn get_machine(&self, id: &str) -> Result<MachineRecord, ApiError>;

    async fn create_machine(&self, draft: &MachineDraft) -> Result<MachineRecord, ApiError>;

    async fn update_machine(&self, id: &str, patch: &MachinePatch) -> Result<MachineRecord, ApiError>;

    async fn delete_machine(&self, id: &str) -> Result<(), ApiError>;

    /// Backend-computed aggregates. `Ok(None)` when the backend has no stats
    /// endpoint or its numbers can't be trusted.
    async fn fleet_stats(&self) -> Result<Option<FleetSummary>, ApiError>;
}

/// Walk every page matching `filter`. Its own `page` and `page_size` are
/// replaced. Stops after `MAX_PAGES` pages.
pub async fn fetch_all(repository: &dyn MachineRepository, filter: &MachineQuery) -> Result<Vec<MachineRecord>, ApiError> {
    let mut machines = Vec::new();

    for page in 1..=MAX_PAGES {
        let query = MachineQuery {
            page: Some(page),
            page_size: Some(PAGE_SIZE),
            ..filter.clone()
        };

        let result = repository.list_machines(&query).await?;
        let received = result.machines.len();
        machines.extend(result.machines);
        if received == 0 || machines.len() >= result.count {
            break;
        }
    }

    Ok(machines)
}
