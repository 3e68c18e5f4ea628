//! Ending catalog - the ordered requirement table that resolves the finale.
//!
//! Endings are checked in table order and the first fully-satisfied entry
//! wins. Order is part of the content contract: it is the tie-break when
//! several endings' requirements hold at once.

use serde::{Deserialize, Serialize};

use super::CatalogError;
use crate::flags::FlagValue;
use crate::ids::EndingId;
use crate::state::StoryState;

/// World counters an ending requirement can test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorldStat {
    MainProgress,
    ResearchProgress,
    PandemicSeverity,
    QuantumStabilization,
}

impl WorldStat {
    fn value(&self, state: &StoryState) -> f32 {
        match self {
            WorldStat::MainProgress => state.main_progress,
            WorldStat::ResearchProgress => state.world.research_progress,
            WorldStat::PandemicSeverity => state.world.pandemic_severity,
            WorldStat::QuantumStabilization => state.world.quantum_stabilization,
        }
    }
}

/// One requirement in an ending definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EndingRequirement {
    StatExactly { stat: WorldStat, value: f32 },
    StatAtLeast { stat: WorldStat, min: f32 },
    StatInRange { stat: WorldStat, min: f32, max: f32 },
    EvidenceCollected { evidence: String },
    FlagEquals { flag: String, value: FlagValue },
}

impl EndingRequirement {
    /// Whether the current story state satisfies this requirement.
    pub fn satisfied_by(&self, state: &StoryState) -> bool {
        match self {
            EndingRequirement::StatExactly { stat, value } => stat.value(state) == *value,
            EndingRequirement::StatAtLeast { stat, min } => stat.value(state) >= *min,
            EndingRequirement::StatInRange { stat, min, max } => {
                let value = stat.value(state);
                value >= *min && value <= *max
            }
            EndingRequirement::EvidenceCollected { evidence } => state.has_evidence(evidence),
            EndingRequirement::FlagEquals { flag, value } => {
                state.get_flag(flag) == Some(value)
            }
        }
    }
}

/// A catalog ending definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndingDef {
    pub id: EndingId,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub requirements: Vec<EndingRequirement>,
}

impl EndingDef {
    pub fn new(id: impl Into<EndingId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            requirements: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_requirement(mut self, requirement: EndingRequirement) -> Self {
        self.requirements.push(requirement);
        self
    }

    pub fn is_satisfied_by(&self, state: &StoryState) -> bool {
        self.requirements
            .iter()
            .all(|requirement| requirement.satisfied_by(state))
    }
}

#[derive(Deserialize)]
struct EndingFile {
    fallback: EndingId,
    endings: Vec<EndingDef>,
}

/// The ordered ending table with its fallback.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndingTable {
    endings: Vec<EndingDef>,
    fallback: EndingId,
}

impl EndingTable {
    pub fn new(fallback: impl Into<EndingId>) -> Self {
        Self {
            endings: Vec::new(),
            fallback: fallback.into(),
        }
    }

    pub fn from_defs(
        fallback: impl Into<EndingId>,
        defs: impl IntoIterator<Item = EndingDef>,
    ) -> Result<Self, CatalogError> {
        let mut table = Self::new(fallback);
        for def in defs {
            if table.get(&def.id).is_some() {
                return Err(CatalogError::Duplicate {
                    kind: "ending",
                    id: def.id.to_string(),
                });
            }
            table.endings.push(def);
        }
        Ok(table)
    }

    /// Load a table from an authored TOML document with a `fallback` key and
    /// an ordered `[[endings]]` array.
    pub fn from_toml(source: &str) -> Result<Self, CatalogError> {
        let file: EndingFile = toml::from_str(source)?;
        Self::from_defs(file.fallback, file.endings)
    }

    pub fn with_ending(mut self, ending: EndingDef) -> Self {
        self.endings.push(ending);
        self
    }

    /// Resolve the ending for the given state: first table entry whose
    /// requirements all hold, else the fallback.
    pub fn determine(&self, state: &StoryState) -> EndingId {
        self.endings
            .iter()
            .find(|ending| ending.is_satisfied_by(state))
            .map(|ending| ending.id.clone())
            .unwrap_or_else(|| self.fallback.clone())
    }

    /// All endings whose requirements currently hold, in table order.
    pub fn possible(&self, state: &StoryState) -> Vec<&EndingDef> {
        self.endings
            .iter()
            .filter(|ending| ending.is_satisfied_by(state))
            .collect()
    }

    pub fn get(&self, id: &EndingId) -> Option<&EndingDef> {
        self.endings.iter().find(|ending| &ending.id == id)
    }

    pub fn fallback(&self) -> &EndingId {
        &self.fallback
    }

    pub fn iter(&self) -> impl Iterator<Item = &EndingDef> {
        self.endings.iter()
    }
}
