//! Record types appended to the story state: decisions, discoveries, changes.

use serde::{Deserialize, Serialize};

use crate::flags::FlagValue;
use crate::ids::{ChapterId, CharacterId};

/// Behavioral tag attached to a decision, used by the ending-path heuristic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionKind {
    Altruistic,
    Pragmatic,
    Risky,
    Careful,
}

/// One entry in the append-only decision history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionRecord {
    pub key: String,
    pub choice: String,
    pub kind: Option<DecisionKind>,
    pub chapter: ChapterId,
    /// Story-clock seconds at which the decision was made.
    pub made_at: f64,
}

/// A discovered lore entry. Write-once per key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoreEntry {
    pub title: String,
    pub text: String,
    /// Research bonus granted on first discovery only.
    pub research_value: f32,
    pub discovered_at: f64,
}

/// A collected piece of evidence. Write-once per key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvidenceEntry {
    pub description: String,
    /// Research bonus granted on first collection only.
    pub research_value: f32,
    pub collected_at: f64,
}

/// The running narrative-outcome label recomputed after every decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EndingPath {
    /// No decisions recorded yet.
    #[default]
    Unresolved,
    CompassionateHero,
    CarefulGuardian,
    BoldPragmatist,
    CalculatedSurvivor,
    Ruthless,
    Heroic,
    Failure,
}

impl EndingPath {
    pub fn as_str(&self) -> &'static str {
        match self {
            EndingPath::Unresolved => "unresolved",
            EndingPath::CompassionateHero => "compassionate_hero",
            EndingPath::CarefulGuardian => "careful_guardian",
            EndingPath::BoldPragmatist => "bold_pragmatist",
            EndingPath::CalculatedSurvivor => "calculated_survivor",
            EndingPath::Ruthless => "ruthless",
            EndingPath::Heroic => "heroic",
            EndingPath::Failure => "failure",
        }
    }
}

impl std::fmt::Display for EndingPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A committed mutation, appended to the store's change log.
///
/// The store itself never emits events; the engine drains this log and
/// converts each change into a typed event after the commit, which is what
/// guarantees listeners only observe clamped, committed values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StateChange {
    FlagSet {
        key: String,
        previous: Option<FlagValue>,
        value: FlagValue,
    },
    RelationshipChanged {
        character: CharacterId,
        previous: f32,
        value: f32,
    },
    ResearchAdvanced {
        previous: f32,
        value: f32,
    },
    SeverityChanged {
        previous: f32,
        value: f32,
    },
    StabilizationChanged {
        previous: f32,
        value: f32,
    },
    MainProgressAdvanced {
        previous: f32,
        value: f32,
    },
    TimeAdded {
        previous: f64,
        value: f64,
    },
    TimeConsumed {
        previous: f64,
        value: f64,
    },
    FacilityUnlocked {
        facility: String,
    },
    LoreDiscovered {
        key: String,
        research_value: f32,
    },
    EvidenceCollected {
        key: String,
        research_value: f32,
    },
    DecisionRecorded {
        key: String,
        choice: String,
        kind: Option<DecisionKind>,
    },
    EndingPathChanged {
        previous: EndingPath,
        value: EndingPath,
    },
    ChapterCompleted {
        chapter: ChapterId,
        next: ChapterId,
    },
    QuestUpdated {
        quest: String,
    },
}
