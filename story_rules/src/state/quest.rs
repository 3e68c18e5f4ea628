//! Quest sub-records kept inside the story state.
//!
//! These mirror the mission tracker's player-facing view of an ongoing
//! mission so that quest progress survives in save snapshots.

use serde::{Deserialize, Serialize};

/// Lifecycle status of a quest record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestStatus {
    Active,
    Completed,
    Failed,
}

/// A single completable condition within a quest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestObjective {
    pub id: String,
    pub completed: bool,
    pub completed_at: Option<f64>,
}

impl QuestObjective {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            completed: false,
            completed_at: None,
        }
    }
}

/// A quest record: status, 0-100 progress, and its objectives in order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quest {
    pub status: QuestStatus,
    pub progress: f32,
    pub objectives: Vec<QuestObjective>,
}

impl Quest {
    /// Create an active quest with all objectives incomplete.
    pub fn new(objective_ids: impl IntoIterator<Item = String>) -> Self {
        Self {
            status: QuestStatus::Active,
            progress: 0.0,
            objectives: objective_ids.into_iter().map(QuestObjective::new).collect(),
        }
    }

    /// Mark an objective complete and recompute progress.
    ///
    /// Returns `false` if the objective is unknown or already complete.
    pub fn complete_objective(&mut self, objective_id: &str, at: f64) -> bool {
        let Some(objective) = self
            .objectives
            .iter_mut()
            .find(|objective| objective.id == objective_id)
        else {
            return false;
        };
        if objective.completed {
            return false;
        }
        objective.completed = true;
        objective.completed_at = Some(at);

        let done = self.objectives.iter().filter(|o| o.completed).count();
        self.progress = if self.objectives.is_empty() {
            100.0
        } else {
            (100.0 * done as f32 / self.objectives.len() as f32).round()
        };
        true
    }

    pub fn is_complete(&self) -> bool {
        !self.objectives.is_empty() && self.objectives.iter().all(|o| o.completed)
    }
}
