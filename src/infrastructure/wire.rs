// Wire DTOs and their normalization into domain types
use crate::domain::fleet::{FleetSummary, StatusCounts};
use crate::domain::machine::{MachineRecord, MachineType, OperationalStatus, non_negative};
use serde::Deserialize;
use std::collections::HashMap;

/// Identifiers arrive as strings or integers depending on the endpoint.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum WireId {
    Text(String),
    Integer(i64),
}

impl WireId {
    pub fn into_string(self) -> String {
        match self {
            Self::Text(s) => s,
            Self::Integer(n) => n.to_string(),
        }
    }
}

/// Decimal fields are serialized as strings by the backend.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum WireNumber {
    Number(f64),
    Text(String),
}

impl WireNumber {
    pub fn value(&self) -> Option<f64> {
        let parsed = match self {
            Self::Number(n) => Some(*n),
            Self::Text(s) => s.trim().parse::<f64>().ok(),
        };
        parsed.filter(|n| n.is_finite())
    }
}

fn number(field: &Option<WireNumber>) -> Option<f64> {
    field.as_ref().and_then(WireNumber::value)
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum WireMachineType {
    Inline {
        id: WireId,
        #[serde(default)]
        name: Option<String>,
    },
    Bare(WireId),
}

#[derive(Debug, Clone, Deserialize)]
pub struct MachineDto {
    pub id: WireId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, alias = "status")]
    pub operational_status: Option<String>,
    #[serde(default)]
    pub total_operating_hours: Option<WireNumber>,
    #[serde(default)]
    pub hours_since_maintenance: Option<WireNumber>,
    #[serde(default)]
    pub rated_power: Option<WireNumber>,
    #[serde(default)]
    pub rated_capacity: Option<WireNumber>,
    #[serde(default)]
    pub machine_type: Option<WireMachineType>,
    #[serde(default)]
    pub location: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MachineTypeDto {
    pub id: WireId,
    pub name: String,
}

/// Machine type names keyed by id, used to resolve bare type references.
#[derive(Debug, Clone, Default)]
pub struct TypeCatalog {
    names: HashMap<String, String>,
}

impl TypeCatalog {
    pub fn from_dtos(dtos: Vec<MachineTypeDto>) -> Self {
        let names = dtos
            .into_iter()
            .map(|dto| (dto.id.into_string(), dto.name))
            .collect();
        Self { names }
    }

    pub fn resolve(&self, id: String) -> MachineType {
        match self.names.get(&id) {
            Some(name) => MachineType::new(id, name.clone()),
            None => MachineType::unresolved(id),
        }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }
}

impl MachineDto {
    /// True when the type can only be named through the catalog.
    pub fn needs_catalog(&self) -> bool {
        match &self.machine_type {
            Some(WireMachineType::Bare(_)) => true,
            Some(WireMachineType::Inline { name, .. }) => name.as_deref().is_none_or(str::is_empty),
            None => false,
        }
    }

    pub fn into_record(self, catalog: &TypeCatalog) -> MachineRecord {
        let id = self.id.into_string();

        let operational_status = match self.operational_status.as_deref().map(OperationalStatus::parse) {
            Some(Some(status)) => status,
            Some(None) | None => {
                tracing::warn!(
                    machine_id = %id,
                    status = ?self.operational_status,
                    "unrecognized operational status, treating machine as offline"
                );
                OperationalStatus::Offline
            }
        };

        let machine_type = match self.machine_type {
            Some(WireMachineType::Inline { id, name: Some(name) }) if !name.is_empty() => {
                MachineType::new(id.into_string(), name)
            }
            Some(WireMachineType::Inline { id, .. }) | Some(WireMachineType::Bare(id)) => {
                catalog.resolve(id.into_string())
            }
            None => MachineType::unknown(),
        };

        let name = self
            .name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| id.clone());

        let mut record = MachineRecord::new(id, name, operational_status, machine_type)
            .with_hours_since_maintenance(number(&self.hours_since_maintenance).unwrap_or(0.0));
        if let Some(hours) = number(&self.total_operating_hours) {
            record = record.with_total_operating_hours(hours);
        }
        record.rated_power = number(&self.rated_power).map(non_negative);
        record.rated_capacity = number(&self.rated_capacity).map(non_negative);
        record.location = self.location.filter(|l| !l.trim().is_empty());
        record
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatusCountsDto {
    #[serde(default)]
    pub running: Option<u64>,
    #[serde(default)]
    pub idle: Option<u64>,
    #[serde(default)]
    pub maintenance: Option<u64>,
    #[serde(default)]
    pub breakdown: Option<u64>,
    #[serde(default)]
    pub offline: Option<u64>,
}

impl StatusCountsDto {
    fn is_empty(&self) -> bool {
        [self.running, self.idle, self.maintenance, self.breakdown, self.offline]
            .iter()
            .all(Option::is_none)
    }

    fn into_counts(self) -> StatusCounts {
        let count = |n: Option<u64>| n.unwrap_or(0) as usize;
        StatusCounts {
            running: count(self.running),
            idle: count(self.idle),
            maintenance: count(self.maintenance),
            breakdown: count(self.breakdown),
            offline: count(self.offline),
        }
    }
}

/// Aggregate stats endpoint. Counts come either flat or under `by_status`.
#[derive(Debug, Clone, Deserialize)]
pub struct FleetStatsDto {
    #[serde(default)]
    pub total_machines: Option<u64>,
    #[serde(default)]
    pub by_status: Option<StatusCountsDto>,
    #[serde(flatten)]
    pub flat: StatusCountsDto,
    #[serde(default)]
    pub average_efficiency: Option<WireNumber>,
    #[serde(default)]
    pub average_uptime: Option<WireNumber>,
}

impl FleetStatsDto {
    /// `None` when the stats are incomplete or their counts don't add up.
    /// Averages alone say nothing about the fleet size, so at least one count
    /// or `total_machines` must be present.
    pub fn into_summary(self) -> Option<FleetSummary> {
        let source = match self.by_status {
            Some(nested) => nested,
            None if self.flat.is_empty() && self.total_machines.is_none() => {
                tracing::warn!("backend stats carry no counts, ignoring them");
                return None;
            }
            None => self.flat,
        };
        let counts = source.into_counts();

        if let Some(total) = self.total_machines {
            if total as usize != counts.total() {
                tracing::warn!(
                    reported = total,
                    summed = counts.total(),
                    "backend stats counts do not sum to total"
                );
                return None;
            }
        }

        let efficiency = number(&self.average_efficiency)?;
        let uptime = number(&self.average_uptime)?;
        Some(FleetSummary::from_parts(counts, efficiency, uptime))
    }
}
