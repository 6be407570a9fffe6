// Machine service - Grid listing and mutation use cases
use crate::application::machine_repository::{MachineQuery, MachineRepository, fetch_all};
use crate::domain::machine::{MachineDraft, MachinePatch, MachineRecord, OperationalStatus};
use crate::domain::query::{MachineFilter, MachineView, SortKey, SortOrder, filter_and_sort};
use crate::domain::status::Role;
use crate::error::ApiError;
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
pub struct ListRequest {
    pub role: Role,
    pub filter: MachineFilter,
    pub sort: SortKey,
    pub order: SortOrder,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MachineListing {
    pub role: Role,
    pub machines: Vec<MachineView>,
    /// Rows matching the filter across all pages.
    pub count: usize,
    pub error: Option<String>,
}

#[derive(Clone)]
pub struct MachineService {
    repository: Arc<dyn MachineRepository>,
}

impl MachineService {
    pub fn new(repository: Arc<dyn MachineRepository>) -> Self {
        Self { repository }
    }

    /// An unfiltered grid is paged by the backend. A filtered grid is built
    /// from every matching page and paged here, since role labels can span
    /// several backend statuses.
    pub async fn list(&self, request: &ListRequest) -> MachineListing {
        let result = if request.filter.is_active() {
            self.list_filtered(request).await
        } else {
            self.list_page(request).await
        };

        match result {
            Ok((machines, count)) => MachineListing {
                role: request.role,
                machines,
                count,
                error: None,
            },
            Err(e) => {
                tracing::warn!(error = %e, transient = e.is_transient(), "failed to list machines, rendering empty grid");
                MachineListing {
                    role: request.role,
                    machines: Vec::new(),
                    count: 0,
                    error: Some(e.to_string()),
                }
            }
        }
    }

    async fn list_page(&self, request: &ListRequest) -> Result<(Vec<MachineView>, usize), ApiError> {
        let query = MachineQuery {
            page: request.page,
            page_size: request.page_size,
            ..Default::default()
        };
        let page = self.repository.list_machines(&query).await?;
        let rows = views(&page.machines, request.role);
        Ok((
            filter_and_sort(rows, &request.filter, request.role, request.sort, request.order),
            page.count,
        ))
    }

    async fn list_filtered(&self, request: &ListRequest) -> Result<(Vec<MachineView>, usize), ApiError> {
        let machines = fetch_all(&*self.repository, &upstream_query(request)).await?;
        let matching = filter_and_sort(
            views(&machines, request.role),
            &request.filter,
            request.role,
            request.sort,
            request.order,
        );

        let count = matching.len();
        let page_size = request.page_size.map(|s| s.max(1) as usize).unwrap_or(count);
        let skip = request
            .page
            .map(|p| (p as usize).saturating_sub(1) * page_size)
            .unwrap_or(0);
        Ok((matching.into_iter().skip(skip).take(page_size).collect(), count))
    }

    pub async fn get(&self, id: &str, role: Role) -> Result<MachineView, ApiError> {
        let machine = self.repository.get_machine(id).await?;
        Ok(MachineView::new(&machine, role))
    }

    pub async fn create(&self, draft: &MachineDraft, role: Role) -> Result<MachineView, ApiError> {
        let machine = self.repository.create_machine(draft).await?;
        tracing::info!(machine_id = %machine.id, "machine registered");
        Ok(MachineView::new(&machine, role))
    }

    pub async fn update(&self, id: &str, patch: &MachinePatch, role: Role) -> Result<MachineView, ApiError> {
        let machine = self.repository.update_machine(id, patch).await?;
        tracing::info!(machine_id = %machine.id, "machine updated");
        Ok(MachineView::new(&machine, role))
    }

    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        self.repository.delete_machine(id).await?;
        tracing::info!(machine_id = %id, "machine deleted");
        Ok(())
    }
}

fn views(machines: &[MachineRecord], role: Role) -> Vec<MachineView> {
    machines.iter().map(|m| MachineView::new(m, role)).collect()
}

/// Filters the backend understands the same way the grid does. Only a raw
/// status from a role that sees raw statuses qualifies; type and search are
/// passed as given and still re-applied locally.
fn upstream_query(request: &ListRequest) -> MachineQuery {
    let trimmed = |v: &Option<String>| {
        v.as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    };
    let status = match request.role {
        Role::Admin | Role::Technician => request
            .filter
            .status
            .as_deref()
            .and_then(OperationalStatus::parse),
        Role::Analyst | Role::Inspector => None,
    };

    MachineQuery {
        status,
        machine_type: trimmed(&request.filter.machine_type),
        search: trimmed(&request.filter.search),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::test_support::InMemoryRepository;
    use crate::domain::machine::{MachineRecord, MachineType};

    fn service() -> (Arc<InMemoryRepository>, MachineService) {
        let repository = Arc::new(InMemoryRepository::new(vec![
            MachineRecord::new("1", "Loom A", OperationalStatus::Running, MachineType::new("l", "Loom")),
            MachineRecord::new("2", "Loom B", OperationalStatus::Breakdown, MachineType::new("l", "Loom")),
            MachineRecord::new("3", "Dyer C", OperationalStatus::Offline, MachineType::new("d", "Dyeing")),
        ]));
        (repository.clone(), MachineService::new(repository))
    }

    #[tokio::test]
    async fn test_list_with_role_label_filter() {
        let (_, service) = service();
        let request = ListRequest {
            role: Role::Analyst,
            filter: MachineFilter {
                status: Some("error".to_string()),
                ..Default::default()
            },
            ..Default::default()
        };

        let listing = service.list(&request).await;
        let ids: Vec<&str> = listing.machines.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["3", "2"]);
        assert!(listing.machines.iter().all(|m| m.display_status == "error"));
        assert_eq!(listing.count, 2);
    }

    #[tokio::test]
    async fn test_filtered_list_spans_backend_pages() {
        let repository = Arc::new(InMemoryRepository::new(vec![
            MachineRecord::new("1", "Loom A", OperationalStatus::Running, MachineType::new("l", "Loom")),
            MachineRecord::new("2", "Loom B", OperationalStatus::Running, MachineType::new("l", "Loom")),
            MachineRecord::new("3", "Loom C", OperationalStatus::Breakdown, MachineType::new("l", "Loom")),
        ]));
        let service = MachineService::new(repository);
        let request = ListRequest {
            role: Role::Analyst,
            filter: MachineFilter {
                status: Some("error".to_string()),
                ..Default::default()
            },
            page_size: Some(2),
            ..Default::default()
        };

        let listing = service.list(&request).await;
        assert_eq!(listing.machines.len(), 1);
        assert_eq!(listing.machines[0].id, "3");
        assert_eq!(listing.count, 1);
    }

    #[tokio::test]
    async fn test_filtered_list_pages_locally() {
        let (_, service) = service();
        let request = ListRequest {
            role: Role::Admin,
            filter: MachineFilter {
                search: Some("loom".to_string()),
                ..Default::default()
            },
            page: Some(2),
            page_size: Some(1),
            ..Default::default()
        };

        let listing = service.list(&request).await;
        assert_eq!(listing.count, 2);
        assert_eq!(listing.machines.len(), 1);
        assert_eq!(listing.machines[0].id, "2");
    }

    #[tokio::test]
    async fn test_list_forwards_type_and_search() {
        let (repository, service) = service();
        let request = ListRequest {
            role: Role::Analyst,
            filter: MachineFilter {
                status: Some("error".to_string()),
                machine_type: Some(" Loom ".to_string()),
                search: Some("B".to_string()),
            },
            ..Default::default()
        };

        let listing = service.list(&request).await;
        assert_eq!(listing.machines.len(), 1);

        let query = repository.last_query().unwrap();
        assert_eq!(query.status, None);
        assert_eq!(query.machine_type.as_deref(), Some("Loom"));
        assert_eq!(query.search.as_deref(), Some("B"));
    }

    #[tokio::test]
    async fn test_unfiltered_list_uses_backend_paging() {
        let (repository, service) = service();
        let request = ListRequest {
            page: Some(1),
            page_size: Some(2),
            ..Default::default()
        };

        let listing = service.list(&request).await;
        assert_eq!(listing.machines.len(), 2);
        assert_eq!(listing.count, 3);
        assert_eq!(repository.list_calls(), 1);
    }

    #[tokio::test]
    async fn test_list_forwards_raw_status_for_technicians() {
        let (_, service) = service();
        let request = ListRequest {
            role: Role::Technician,
            filter: MachineFilter {
                status: Some("breakdown".to_string()),
                ..Default::default()
            },
            ..Default::default()
        };

        let listing = service.list(&request).await;
        assert_eq!(listing.count, 1);
        assert_eq!(listing.machines[0].id, "2");
    }

    #[tokio::test]
    async fn test_list_degrades_on_failure() {
        let service = MachineService::new(Arc::new(InMemoryRepository::failing()));
        let listing = service.list(&ListRequest::default()).await;

        assert!(listing.machines.is_empty());
        assert_eq!(listing.count, 0);
        assert!(listing.error.unwrap().contains("503"));
    }

    #[tokio::test]
    async fn test_mutations() {
        let (repository, service) = service();

        let draft = MachineDraft {
            name: "Spinner D".to_string(),
            machine_type: "s".to_string(),
            operational_status: None,
            rated_power: None,
            rated_capacity: None,
            location: Some("Hall 2".to_string()),
        };
        let created = service.create(&draft, Role::Inspector).await.unwrap();
        assert_eq!(created.display_status, "operational");
        assert_eq!(created.uptime, 70.0);

        let patch = MachinePatch {
            operational_status: Some(OperationalStatus::Maintenance),
            ..Default::default()
        };
        let updated = service.update(&created.id, &patch, Role::Analyst).await.unwrap();
        assert_eq!(updated.display_status, "maintenance");

        service.delete(&created.id).await.unwrap();
        assert!(matches!(service.get(&created.id, Role::Admin).await, Err(ApiError::NotFound { .. })));
        assert!(repository.list_calls() == 0);
    }
}
