// In-memory repository double shared by service and handler tests
use crate::application::machine_repository::{MachinePage, MachineQuery, MachineRepository};
use crate::domain::fleet::FleetSummary;
use crate::domain::machine::{MachineDraft, MachinePatch, MachineRecord, MachineType, OperationalStatus};
use crate::error::ApiError;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

#[derive(Default)]
pub struct InMemoryRepository {
    machines: Mutex<Vec<MachineRecord>>,
    stats: Option<FleetSummary>,
    failing: bool,
    list_calls: AtomicUsize,
    last_query: Mutex<Option<MachineQuery>>,
    delays: Mutex<VecDeque<Duration>>,
}

impl InMemoryRepository {
    pub fn new(machines: Vec<MachineRecord>) -> Self {
        Self {
            machines: Mutex::new(machines),
            ..Default::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Default::default()
        }
    }

    pub fn with_stats(mut self, stats: FleetSummary) -> Self {
        self.stats = Some(stats);
        self
    }

    /// Delay applied to successive `list_machines` calls, in order.
    pub fn with_list_delays(self, delays: Vec<Duration>) -> Self {
        *self.delays.lock().unwrap() = delays.into();
        self
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn last_query(&self) -> Option<MachineQuery> {
        self.last_query.lock().unwrap().clone()
    }

    fn outage() -> ApiError {
        ApiError::Status {
            status: 503,
            body: "backend unavailable".to_string(),
        }
    }

    fn missing(id: &str) -> ApiError {
        ApiError::NotFound {
            resource: format!("machine {}", id),
        }
    }
}

#[async_trait]
impl MachineRepository for InMemoryRepository {
    async fn list_machines(&self, query: &MachineQuery) -> Result<MachinePage, ApiError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_query.lock().unwrap() = Some(query.clone());
        let delay = self.delays.lock().unwrap().pop_front();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing {
            return Err(Self::outage());
        }

        let matching: Vec<MachineRecord> = self
            .machines
            .lock()
            .unwrap()
            .iter()
            .filter(|m| query.status.is_none_or(|s| s == m.operational_status))
            .cloned()
            .collect();

        let count = matching.len();
        let page_size = query.page_size.map(|s| s as usize).unwrap_or(count.max(1));
        let skip = query.page.map(|p| (p as usize).saturating_sub(1) * page_size).unwrap_or(0);
        let machines = matching.into_iter().skip(skip).take(page_size).collect();

        Ok(MachinePage { machines, count })
    }

    async fn get_machine(&self, id: &str) -> Result<MachineRecord, ApiError> {
        if self.failing {
            return Err(Self::outage());
        }
        self.machines
            .lock()
            .unwrap()
            .iter()
            .find(|m| m.id == id)
            .cloned()
            .ok_or_else(|| Self::missing(id))
    }

    async fn create_machine(&self, draft: &MachineDraft) -> Result<MachineRecord, ApiError> {
        if self.failing {
            return Err(Self::outage());
        }
        let mut machines = self.machines.lock().unwrap();
        let mut record = MachineRecord::new(
            format!("{}", machines.len() + 1),
            draft.name.clone(),
            draft.operational_status.unwrap_or(OperationalStatus::Idle),
            MachineType::unresolved(draft.machine_type.clone()),
        )
        .with_total_operating_hours(0.0);
        record.location = draft.location.clone();
        machines.push(record.clone());
        Ok(record)
    }

    async fn update_machine(&self, id: &str, patch: &MachinePatch) -> Result<MachineRecord, ApiError> {
        if self.failing {
            return Err(Self::outage());
        }
        let mut machines = self.machines.lock().unwrap();
        let machine = machines
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or_else(|| Self::missing(id))?;

        if let Some(name) = &patch.name {
            machine.name = name.clone();
        }
        if let Some(status) = patch.operational_status {
            machine.operational_status = status;
        }
        if let Some(hours) = patch.hours_since_maintenance {
            machine.hours_since_maintenance = hours;
        }
        if let Some(location) = &patch.location {
            machine.location = Some(location.clone());
        }
        Ok(machine.clone())
    }

    async fn delete_machine(&self, id: &str) -> Result<(), ApiError> {
        if self.failing {
            return Err(Self::outage());
        }
        let mut machines = self.machines.lock().unwrap();
        let before = machines.len();
        machines.retain(|m| m.id != id);
        if machines.len() == before {
            return Err(Self::missing(id));
        }
        Ok(())
    }

    async fn fleet_stats(&self) -> Result<Option<FleetSummary>, ApiError> {
        if self.failing {
            return Err(Self::outage());
        }
        Ok(self.stats.clone())
    }
}
