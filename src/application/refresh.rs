// Latest-wins refresh coordination
//
// Refreshes can overlap: the background interval and on-demand requests
// both fetch from the backend, and a slow response may land after a newer
// one. Each refresh takes a ticket up front; a result is committed only if
// its ticket is newer than whatever is already committed.
use crate::application::fleet_service::{FleetService, FleetSnapshot};
use crate::domain::status::Role;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::IntervalStream;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct Ticket(u64);

impl Ticket {
    pub fn sequence(&self) -> u64 {
        self.0
    }
}

#[derive(Debug, Default)]
pub struct RequestSequencer {
    issued: AtomicU64,
}

impl RequestSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tickets start at 1 and strictly increase.
    pub fn begin(&self) -> Ticket {
        Ticket(self.issued.fetch_add(1, Ordering::SeqCst) + 1)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Sequenced<T> {
    pub sequence: u64,
    pub committed_at: DateTime<Utc>,
    pub value: T,
}

#[derive(Debug)]
pub struct LatestSnapshot<T> {
    current: RwLock<Option<Sequenced<T>>>,
}

impl<T: Clone> LatestSnapshot<T> {
    pub fn new() -> Self {
        Self {
            current: RwLock::new(None),
        }
    }

    /// Returns false and drops `value` when a newer ticket already committed.
    pub async fn commit(&self, ticket: Ticket, value: T) -> bool {
        let mut current = self.current.write().await;
        if let Some(existing) = current.as_ref() {
            if existing.sequence >= ticket.sequence() {
                tracing::debug!(
                    stale = ticket.sequence(),
                    committed = existing.sequence,
                    "discarding stale refresh result"
                );
                return false;
            }
        }

        *current = Some(Sequenced {
            sequence: ticket.sequence(),
            committed_at: Utc::now(),
            value,
        });
        true
    }

    pub async fn get(&self) -> Option<Sequenced<T>> {
        self.current.read().await.clone()
    }
}

impl<T: Clone> Default for LatestSnapshot<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RefreshOutcome {
    pub sequence: u64,
    pub committed: bool,
}

/// Keeps the most recent fleet snapshot for the live view.
pub struct FleetMonitor {
    fleet_service: FleetService,
    sequencer: RequestSequencer,
    latest: LatestSnapshot<FleetSnapshot>,
}

impl FleetMonitor {
    pub fn new(fleet_service: FleetService) -> Self {
        Self {
            fleet_service,
            sequencer: RequestSequencer::new(),
            latest: LatestSnapshot::new(),
        }
    }

    pub async fn refresh(&self) -> RefreshOutcome {
        let ticket = self.sequencer.begin();
        let snapshot = self.fleet_service.summary(Role::Admin).await;
        let committed = self.latest.commit(ticket, snapshot).await;

        tracing::debug!(sequence = ticket.sequence(), committed, "fleet refresh finished");
        RefreshOutcome {
            sequence: ticket.sequence(),
            committed,
        }
    }

    pub async fn latest(&self) -> Option<Sequenced<FleetSnapshot>> {
        self.latest.get().await
    }

    /// Refresh on a fixed interval until the task is aborted.
    pub fn spawn_background(self: Arc<Self>, interval: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticks = IntervalStream::new(tokio::time::interval(interval));
            while ticks.next().await.is_some() {
                let outcome = self.refresh().await;
                if !outcome.committed {
                    tracing::info!(sequence = outcome.sequence, "background refresh superseded");
                }
            }
        })
    }
}
