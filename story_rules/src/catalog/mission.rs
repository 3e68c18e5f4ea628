//! Mission catalog - authored mission and objective definitions.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::CatalogError;
use crate::flags::{FlagSetting, FlagValue};
use crate::ids::{ChapterId, MissionId, ObjectiveId};

/// Declarative predicate that auto-completes an objective when the matching
/// gameplay event arrives. Tagged so every variant carries exactly the
/// fields it needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ObjectiveTrigger {
    FlagSet { flag: String, value: FlagValue },
    LocationEntered { location: String },
    ItemCollected { item: String },
    ResearchReached { threshold: f32 },
    ClueFound { clue: String },
}

/// A single completable condition within a mission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectiveDef {
    pub id: ObjectiveId,
    pub description: String,
    /// Optional auto-completion predicate; objectives without one are
    /// completed explicitly by gameplay code.
    #[serde(default)]
    pub trigger: Option<ObjectiveTrigger>,
}

impl ObjectiveDef {
    pub fn new(id: impl Into<ObjectiveId>, description: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            trigger: None,
        }
    }

    pub fn with_trigger(mut self, trigger: ObjectiveTrigger) -> Self {
        self.trigger = Some(trigger);
        self
    }
}

/// A discoverable clue attached to a mission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClueDef {
    pub id: String,
    pub text: String,
}

/// A catalog mission definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MissionDef {
    pub id: MissionId,
    pub title: String,
    pub description: String,
    pub chapter: ChapterId,
    #[serde(default)]
    pub objectives: Vec<ObjectiveDef>,
    /// All of these must hold simultaneously for the mission to auto-start.
    #[serde(default)]
    pub trigger_flags: Vec<FlagSetting>,
    /// Countdown in minutes; expiry fails the mission.
    #[serde(default)]
    pub time_limit_minutes: Option<u32>,
    /// When true, completing the last objective completes the mission;
    /// otherwise only a notification event is emitted.
    #[serde(default)]
    pub auto_complete_on_all_objectives: bool,
    /// Flags granted on successful completion.
    #[serde(default)]
    pub rewards: Vec<FlagSetting>,
    #[serde(default)]
    pub clues: Vec<ClueDef>,
}

impl MissionDef {
    pub fn new(
        id: impl Into<MissionId>,
        title: impl Into<String>,
        chapter: impl Into<ChapterId>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            chapter: chapter.into(),
            objectives: Vec::new(),
            trigger_flags: Vec::new(),
            time_limit_minutes: None,
            auto_complete_on_all_objectives: false,
            rewards: Vec::new(),
            clues: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_objective(mut self, objective: ObjectiveDef) -> Self {
        self.objectives.push(objective);
        self
    }

    pub fn with_trigger_flag(mut self, flag: impl Into<String>, value: impl Into<FlagValue>) -> Self {
        self.trigger_flags.push(FlagSetting::new(flag, value));
        self
    }

    pub fn with_time_limit(mut self, minutes: u32) -> Self {
        self.time_limit_minutes = Some(minutes);
        self
    }

    pub fn with_auto_complete(mut self) -> Self {
        self.auto_complete_on_all_objectives = true;
        self
    }

    pub fn with_reward(mut self, flag: impl Into<String>, value: impl Into<FlagValue>) -> Self {
        self.rewards.push(FlagSetting::new(flag, value));
        self
    }

    pub fn with_clue(mut self, id: impl Into<String>, text: impl Into<String>) -> Self {
        self.clues.push(ClueDef {
            id: id.into(),
            text: text.into(),
        });
        self
    }

    pub fn objective(&self, id: &ObjectiveId) -> Option<&ObjectiveDef> {
        self.objectives.iter().find(|objective| &objective.id == id)
    }

    pub fn clue(&self, id: &str) -> Option<&ClueDef> {
        self.clues.iter().find(|clue| clue.id == id)
    }
}

#[derive(Deserialize)]
struct MissionFile {
    missions: Vec<MissionDef>,
}

/// Keyed mission table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MissionCatalog {
    missions: HashMap<MissionId, MissionDef>,
}

impl MissionCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from definitions, rejecting duplicate ids.
    pub fn from_defs(defs: impl IntoIterator<Item = MissionDef>) -> Result<Self, CatalogError> {
        let mut missions = HashMap::new();
        for def in defs {
            let id = def.id.clone();
            if missions.insert(id.clone(), def).is_some() {
                return Err(CatalogError::Duplicate {
                    kind: "mission",
                    id: id.to_string(),
                });
            }
        }
        Ok(Self { missions })
    }

    /// Load a catalog from an authored TOML document with a `[[missions]]` array.
    pub fn from_toml(source: &str) -> Result<Self, CatalogError> {
        let file: MissionFile = toml::from_str(source)?;
        Self::from_defs(file.missions)
    }

    pub fn get(&self, id: &MissionId) -> Option<&MissionDef> {
        self.missions.get(id)
    }

    pub fn contains(&self, id: &MissionId) -> bool {
        self.missions.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &MissionDef> {
        self.missions.values()
    }

    pub fn len(&self) -> usize {
        self.missions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.missions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let mission = MissionDef::new("m001", "Containment Protocol", "limbo")
            .with_description("Lock down the outbreak site.")
            .with_objective(
                ObjectiveDef::new("obj1", "Enter the ward").with_trigger(
                    ObjectiveTrigger::LocationEntered {
                        location: "quarantine_ward".to_string(),
                    },
                ),
            )
            .with_time_limit(30)
            .with_reward("containment_done", true);

        assert_eq!(mission.objectives.len(), 1);
        assert_eq!(mission.time_limit_minutes, Some(30));
        assert!(mission.objective(&"obj1".into()).is_some());
        assert!(mission.objective(&"missing".into()).is_none());
    }

    #[test]
    fn test_catalog_lookup() {
        let catalog = MissionCatalog::from_defs(vec![
            MissionDef::new("m001", "One", "limbo"),
            MissionDef::new("m002", "Two", "limbo"),
        ])
        .unwrap();

        assert_eq!(catalog.len(), 2);
        assert!(catalog.contains(&"m001".into()));
        assert!(catalog.get(&"m404".into()).is_none());
    }

    #[test]
    fn test_duplicate_rejected() {
        let result = MissionCatalog::from_defs(vec![
            MissionDef::new("m001", "One", "limbo"),
            MissionDef::new("m001", "Clone", "limbo"),
        ]);
        assert!(result.is_err());
    }
}
