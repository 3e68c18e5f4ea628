//! Story state - the central mutable aggregate for a playthrough.
//!
//! All mutation goes through the methods here. Each mutator clamps numeric
//! ranges, returns `(previous, new)` for diffing, and appends a
//! [`StateChange`] to the internal change log. The log is drained by the
//! engine, which converts committed changes into events; the store itself
//! stays side-effect-free and independently testable.

mod quest;
mod records;

pub use quest::*;
pub use records::*;

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

use crate::flags::FlagValue;
use crate::ids::{ChapterId, CharacterId};

/// Pandemic world counters. Percentages clamp to [0,100]; remaining time
/// floors at zero.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldConditions {
    pub pandemic_severity: f32,
    /// Seconds until the outbreak becomes irreversible.
    pub time_remaining: f64,
    /// Full countdown length, fixed at state creation.
    pub total_duration: f64,
    pub research_progress: f32,
    pub unlocked_facilities: HashSet<String>,
    pub quantum_stabilization: f32,
}

impl WorldConditions {
    pub fn new(total_duration: f64) -> Self {
        Self {
            pandemic_severity: 0.0,
            time_remaining: total_duration,
            total_duration,
            research_progress: 0.0,
            unlocked_facilities: HashSet::new(),
            quantum_stabilization: 0.0,
        }
    }
}

/// The complete narrative state of one playthrough.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoryState {
    /// Random run identifier, carried into save snapshots.
    pub run_id: Uuid,

    /// Story-clock seconds since the session began. Drives every timestamp.
    pub game_time: f64,

    pub main_progress: f32,
    pub current_chapter: ChapterId,
    pub completed_chapters: HashSet<ChapterId>,

    /// Free-form narrative flags.
    pub flags: HashMap<String, FlagValue>,

    /// Character affinity scores, clamped to [-100,100].
    pub relationships: HashMap<CharacterId, f32>,

    pub discovered_lore: HashMap<String, LoreEntry>,
    pub collected_evidence: HashMap<String, EvidenceEntry>,

    pub world: WorldConditions,

    /// Append-only decision history.
    pub decisions: Vec<DecisionRecord>,

    pub quests: HashMap<String, Quest>,

    pub ending_path: EndingPath,

    #[serde(skip)]
    change_log: Vec<StateChange>,
}

impl StoryState {
    /// Create a fresh state at the given opening chapter with a full clock.
    pub fn new(opening_chapter: impl Into<ChapterId>, total_duration: f64) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            game_time: 0.0,
            main_progress: 0.0,
            current_chapter: opening_chapter.into(),
            completed_chapters: HashSet::new(),
            flags: HashMap::new(),
            relationships: HashMap::new(),
            discovered_lore: HashMap::new(),
            collected_evidence: HashMap::new(),
            world: WorldConditions::new(total_duration),
            decisions: Vec::new(),
            quests: HashMap::new(),
            ending_path: EndingPath::Unresolved,
            change_log: Vec::new(),
        }
    }

    /// Advance the story clock. The clock only moves forward.
    pub fn advance_clock(&mut self, delta_seconds: f64) {
        if delta_seconds > 0.0 {
            self.game_time += delta_seconds;
        }
    }

    /// Drain the committed-change log.
    pub fn drain_changes(&mut self) -> Vec<StateChange> {
        std::mem::take(&mut self.change_log)
    }

    // ----- flags ------------------------------------------------------------

    /// Set a flag, returning the previous value if any.
    pub fn set_flag(&mut self, key: impl Into<String>, value: FlagValue) -> Option<FlagValue> {
        let key = key.into();
        let previous = self.flags.insert(key.clone(), value.clone());
        self.change_log.push(StateChange::FlagSet {
            key,
            previous: previous.clone(),
            value,
        });
        previous
    }

    pub fn get_flag(&self, key: &str) -> Option<&FlagValue> {
        self.flags.get(key)
    }

    /// Truthiness of a flag; missing flags are falsy.
    pub fn flag_truthy(&self, key: &str) -> bool {
        self.flags.get(key).map(FlagValue::truthy).unwrap_or(false)
    }

    // ----- relationships ----------------------------------------------------

    /// Apply a relationship delta, clamped to [-100,100].
    ///
    /// Returns `(previous, new)`.
    pub fn modify_relationship(&mut self, character: &CharacterId, delta: f32) -> (f32, f32) {
        let entry = self.relationships.entry(character.clone()).or_insert(0.0);
        let previous = *entry;
        *entry = (previous + delta).clamp(-100.0, 100.0);
        let value = *entry;
        self.change_log.push(StateChange::RelationshipChanged {
            character: character.clone(),
            previous,
            value,
        });
        (previous, value)
    }

    pub fn relationship(&self, character: &CharacterId) -> f32 {
        self.relationships.get(character).copied().unwrap_or(0.0)
    }

    // ----- world counters ---------------------------------------------------

    /// Increase research progress, clamped to [0,100]. Returns `(previous, new)`.
    pub fn advance_research(&mut self, amount: f32) -> (f32, f32) {
        let previous = self.world.research_progress;
        self.world.research_progress = (previous + amount).clamp(0.0, 100.0);
        let value = self.world.research_progress;
        if value != previous {
            self.change_log
                .push(StateChange::ResearchAdvanced { previous, value });
        }
        (previous, value)
    }

    /// Adjust pandemic severity by a signed delta, clamped to [0,100].
    pub fn adjust_severity(&mut self, delta: f32) -> (f32, f32) {
        let previous = self.world.pandemic_severity;
        self.world.pandemic_severity = (previous + delta).clamp(0.0, 100.0);
        let value = self.world.pandemic_severity;
        if value != previous {
            self.change_log
                .push(StateChange::SeverityChanged { previous, value });
        }
        (previous, value)
    }

    /// Adjust quantum stabilization by a signed delta, clamped to [0,100].
    pub fn adjust_stabilization(&mut self, delta: f32) -> (f32, f32) {
        let previous = self.world.quantum_stabilization;
        self.world.quantum_stabilization = (previous + delta).clamp(0.0, 100.0);
        let value = self.world.quantum_stabilization;
        if value != previous {
            self.change_log
                .push(StateChange::StabilizationChanged { previous, value });
        }
        (previous, value)
    }

    /// Advance overall story progress, clamped to [0,100].
    pub fn advance_main_progress(&mut self, amount: f32) -> (f32, f32) {
        let previous = self.main_progress;
        self.main_progress = (previous + amount).clamp(0.0, 100.0);
        let value = self.main_progress;
        if value != previous {
            self.change_log
                .push(StateChange::MainProgressAdvanced { previous, value });
        }
        (previous, value)
    }

    /// Grant extra countdown time. Capped at the total duration.
    pub fn add_time(&mut self, seconds: f64) -> (f64, f64) {
        let previous = self.world.time_remaining;
        self.world.time_remaining = (previous + seconds).min(self.world.total_duration);
        let value = self.world.time_remaining;
        if value != previous {
            self.change_log.push(StateChange::TimeAdded { previous, value });
        }
        (previous, value)
    }

    /// Consume countdown time, flooring at zero.
    pub fn consume_time(&mut self, seconds: f64) -> (f64, f64) {
        let previous = self.world.time_remaining;
        self.world.time_remaining = (previous - seconds).max(0.0);
        let value = self.world.time_remaining;
        if value != previous {
            self.change_log
                .push(StateChange::TimeConsumed { previous, value });
        }
        (previous, value)
    }

    /// Unlock a facility. Returns `false` if it was already unlocked.
    pub fn unlock_facility(&mut self, facility: impl Into<String>) -> bool {
        let facility = facility.into();
        if !self.world.unlocked_facilities.insert(facility.clone()) {
            return false;
        }
        self.change_log.push(StateChange::FacilityUnlocked { facility });
        true
    }

    // ----- discoveries ------------------------------------------------------

    /// Record a lore discovery. Idempotent: a second write to the same key is
    /// a no-op so research bonuses cannot be double-counted by overlapping
    /// triggers.
    pub fn discover_lore(
        &mut self,
        key: impl Into<String>,
        title: impl Into<String>,
        text: impl Into<String>,
        research_value: f32,
    ) -> bool {
        let key = key.into();
        if self.discovered_lore.contains_key(&key) {
            return false;
        }
        self.discovered_lore.insert(
            key.clone(),
            LoreEntry {
                title: title.into(),
                text: text.into(),
                research_value,
                discovered_at: self.game_time,
            },
        );
        self.change_log.push(StateChange::LoreDiscovered {
            key,
            research_value,
        });
        true
    }

    /// Record evidence collection. Idempotent like [`discover_lore`].
    ///
    /// [`discover_lore`]: StoryState::discover_lore
    pub fn collect_evidence(
        &mut self,
        key: impl Into<String>,
        description: impl Into<String>,
        research_value: f32,
    ) -> bool {
        let key = key.into();
        if self.collected_evidence.contains_key(&key) {
            return false;
        }
        self.collected_evidence.insert(
            key.clone(),
            EvidenceEntry {
                description: description.into(),
                research_value,
                collected_at: self.game_time,
            },
        );
        self.change_log.push(StateChange::EvidenceCollected {
            key,
            research_value,
        });
        true
    }

    pub fn has_evidence(&self, key: &str) -> bool {
        self.collected_evidence.contains_key(key)
    }

    // ----- decisions --------------------------------------------------------

    /// Append a decision to the history.
    pub fn record_decision(
        &mut self,
        key: impl Into<String>,
        choice: impl Into<String>,
        kind: Option<DecisionKind>,
    ) {
        let key = key.into();
        let choice = choice.into();
        self.decisions.push(DecisionRecord {
            key: key.clone(),
            choice: choice.clone(),
            kind,
            chapter: self.current_chapter.clone(),
            made_at: self.game_time,
        });
        self.change_log
            .push(StateChange::DecisionRecorded { key, choice, kind });
    }

    /// Replace the running ending-path label.
    pub fn set_ending_path(&mut self, path: EndingPath) -> EndingPath {
        let previous = self.ending_path;
        if previous != path {
            self.ending_path = path;
            self.change_log.push(StateChange::EndingPathChanged {
                previous,
                value: path,
            });
        }
        previous
    }

    // ----- chapters ---------------------------------------------------------

    /// Complete the current chapter and move to the next one.
    ///
    /// Returns `false` if the current chapter was already completed.
    pub fn complete_chapter(&mut self, next: impl Into<ChapterId>) -> bool {
        let finished = self.current_chapter.clone();
        if !self.completed_chapters.insert(finished.clone()) {
            return false;
        }
        let next = next.into();
        self.current_chapter = next.clone();
        self.change_log.push(StateChange::ChapterCompleted {
            chapter: finished,
            next,
        });
        true
    }

    // ----- quests -----------------------------------------------------------

    /// Create an active quest record. Returns `false` if the key exists.
    pub fn start_quest(
        &mut self,
        key: impl Into<String>,
        objective_ids: impl IntoIterator<Item = String>,
    ) -> bool {
        let key = key.into();
        if self.quests.contains_key(&key) {
            return false;
        }
        self.quests.insert(key.clone(), Quest::new(objective_ids));
        self.change_log.push(StateChange::QuestUpdated { quest: key });
        true
    }

    /// Mark a quest objective complete. Returns `false` on unknown keys or
    /// an already-complete objective.
    pub fn complete_quest_objective(&mut self, key: &str, objective_id: &str) -> bool {
        let at = self.game_time;
        let Some(quest) = self.quests.get_mut(key) else {
            return false;
        };
        if !quest.complete_objective(objective_id, at) {
            return false;
        }
        self.change_log.push(StateChange::QuestUpdated {
            quest: key.to_string(),
        });
        true
    }

    /// Transition a quest's lifecycle status.
    pub fn set_quest_status(&mut self, key: &str, status: QuestStatus) -> bool {
        let Some(quest) = self.quests.get_mut(key) else {
            return false;
        };
        quest.status = status;
        self.change_log.push(StateChange::QuestUpdated {
            quest: key.to_string(),
        });
        true
    }
}
