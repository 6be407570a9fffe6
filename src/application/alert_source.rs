// Source of externally raised alerts
use crate::domain::alert::Alert;
use async_trait::async_trait;

#[async_trait]
pub trait AlertSource: Send + Sync {
    /// All alerts currently raised, in no particular order.
    async fn list_alerts(&self) -> anyhow::Result<Vec<Alert>>;
}
