// Quality impact classification
use super::machine::MachineType;
use serde::{Deserialize, Serialize};

/// How strongly a stoppage of this kind of machine hits fabric quality.
/// Used for UI emphasis and alert ordering only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityImpact {
    Low,
    Medium,
    High,
    Critical,
}

const CRITICAL_KEYWORDS: [&str; 3] = ["loom", "weav", "knit"];
const HIGH_KEYWORDS: [&str; 2] = ["spinn", "warp"];
const MEDIUM_KEYWORDS: [&str; 3] = ["dye", "finish", "print"];

impl QualityImpact {
    pub fn classify(machine_type: &MachineType) -> Self {
        let name = machine_type.name.to_lowercase();
        let matches = |keywords: &[&str]| keywords.iter().any(|k| name.contains(k));

        if matches(&CRITICAL_KEYWORDS[..]) {
            Self::Critical
        } else if matches(&HIGH_KEYWORDS[..]) {
            Self::High
        } else if matches(&MEDIUM_KEYWORDS[..]) {
            Self::Medium
        } else {
            Self::Low
        }
    }
}
