//! Mission tracker - discrete mission/objective semantics over engine events.
//!
//! The tracker owns the mission runtime record (active slot, completion set,
//! per-mission objective status, notes, clues, countdown timers) and layers
//! a declarative rules engine on top of story events: trigger flags
//! auto-start missions, objective predicates auto-complete objectives.
//!
//! Exactly one mission may be active at a time; starting a second one while
//! another is active is rejected rather than silently replacing it, so a
//! countdown can never outlive its mission unnoticed.

use std::collections::{HashMap, HashSet};

use log::warn;

use story_rules::{
    FlagValue, MissionCatalog, MissionId, ObjectiveId, ObjectiveTrigger, QuestStatus,
};

use crate::engine::StoryEngine;
use crate::events::StoryEvent;

/// Countdown state for a timed mission.
#[derive(Debug, Clone)]
struct MissionTimer {
    remaining: f64,
    /// Last whole second a timer-updated event was emitted for.
    last_whole: u64,
}

/// Player-facing snapshot of the active mission.
#[derive(Debug, Clone)]
pub struct ActiveMissionStatus {
    pub mission: MissionId,
    pub title: String,
    pub progress: u8,
    /// Objectives in catalog order with completion status.
    pub objectives: Vec<(ObjectiveId, bool)>,
    pub remaining_seconds: Option<f64>,
}

enum TriggerProbe<'a> {
    Flag { key: &'a str, value: &'a FlagValue },
    Research { value: f32 },
    Location { location: &'a str },
    Item { item: &'a str },
}

/// Mission lifecycle manager.
pub struct MissionTracker {
    catalog: MissionCatalog,
    active: Option<MissionId>,
    completed: HashSet<MissionId>,
    progress: HashMap<MissionId, u8>,
    objective_status: HashMap<MissionId, HashMap<ObjectiveId, bool>>,
    notes: HashMap<MissionId, Vec<String>>,
    clues: HashMap<MissionId, Vec<String>>,
    timers: HashMap<MissionId, MissionTimer>,
}

impl MissionTracker {
    pub fn new(catalog: MissionCatalog) -> Self {
        Self {
            catalog,
            active: None,
            completed: HashSet::new(),
            progress: HashMap::new(),
            objective_status: HashMap::new(),
            notes: HashMap::new(),
            clues: HashMap::new(),
            timers: HashMap::new(),
        }
    }

    pub fn catalog(&self) -> &MissionCatalog {
        &self.catalog
    }

    // ----- lifecycle --------------------------------------------------------

    /// Start a mission.
    ///
    /// Fails on unknown ids, already-completed missions, and while any
    /// mission is active (including the same one).
    pub fn start_mission(&mut self, engine: &mut StoryEngine, id: &MissionId) -> bool {
        let Some(def) = self.catalog.get(id) else {
            warn!("cannot start unknown mission `{id}`");
            return false;
        };
        if self.completed.contains(id) {
            warn!("mission `{id}` is already completed");
            return false;
        }
        match &self.active {
            Some(active) if active == id => {
                warn!("mission `{id}` is already active");
                return false;
            }
            Some(active) => {
                warn!("cannot start `{id}` while `{active}` is active");
                return false;
            }
            None => {}
        }

        let objective_ids: Vec<ObjectiveId> =
            def.objectives.iter().map(|objective| objective.id.clone()).collect();
        let time_limit = def.time_limit_minutes;

        self.objective_status.insert(
            id.clone(),
            objective_ids.iter().cloned().map(|objective| (objective, false)).collect(),
        );
        self.progress.insert(id.clone(), 0);
        self.notes.entry(id.clone()).or_default();
        self.clues.entry(id.clone()).or_default();
        if let Some(minutes) = time_limit {
            let remaining = minutes as f64 * 60.0;
            self.timers.insert(
                id.clone(),
                MissionTimer {
                    remaining,
                    last_whole: remaining.ceil() as u64,
                },
            );
        }
        self.active = Some(id.clone());

        engine.start_quest(
            id.0.clone(),
            objective_ids.iter().map(|objective| objective.0.clone()),
        );
        engine.emit(StoryEvent::MissionStarted { mission: id.clone() });
        true
    }

    /// Advance the active mission's countdown.
    ///
    /// Emits a timer-updated event when a whole-second boundary is crossed
    /// and auto-fails the mission on expiry. Timers are removed on every
    /// mission exit, so a stale countdown can never fire.
    pub fn tick(&mut self, engine: &mut StoryEngine, delta_seconds: f64) {
        if delta_seconds <= 0.0 {
            return;
        }
        let Some(active) = self.active.clone() else {
            return;
        };
        let Some(timer) = self.timers.get_mut(&active) else {
            return;
        };

        timer.remaining -= delta_seconds;
        let whole = timer.remaining.max(0.0).floor() as u64;
        let expired = timer.remaining <= 0.0;
        if whole < timer.last_whole {
            timer.last_whole = whole;
            engine.emit(StoryEvent::MissionTimerUpdated {
                mission: active.clone(),
                remaining_seconds: whole,
            });
        }
        if expired {
            warn!("mission `{active}` failed: timer expired");
            self.fail_mission(engine);
        }
    }

    /// Mark an objective complete on the active mission.
    ///
    /// Idempotent: re-completing returns `false` and leaves progress
    /// untouched. Completing the last objective either auto-completes the
    /// mission or emits an all-objectives notification, per the catalog.
    pub fn complete_objective(
        &mut self,
        engine: &mut StoryEngine,
        mission_id: &MissionId,
        objective_id: &ObjectiveId,
    ) -> bool {
        if self.active.as_ref() != Some(mission_id) {
            warn!("mission `{mission_id}` is not active");
            return false;
        }
        let Some(def) = self.catalog.get(mission_id) else {
            warn!("unknown mission `{mission_id}`");
            return false;
        };
        if def.objective(objective_id).is_none() {
            warn!("mission `{mission_id}` has no objective `{objective_id}`");
            return false;
        }
        let total = def.objectives.len();
        let auto_complete = def.auto_complete_on_all_objectives;

        let Some(status) = self.objective_status.get_mut(mission_id) else {
            warn!("mission `{mission_id}` has no runtime record");
            return false;
        };
        let Some(done_flag) = status.get_mut(objective_id) else {
            return false;
        };
        if *done_flag {
            warn!("objective `{objective_id}` on `{mission_id}` is already complete");
            return false;
        }
        *done_flag = true;
        let done = status.values().filter(|completed| **completed).count();
        let progress = (100.0 * done as f64 / total.max(1) as f64).round() as u8;
        self.progress.insert(mission_id.clone(), progress);

        engine.complete_quest_objective(&mission_id.0, &objective_id.0);
        engine.emit(StoryEvent::ObjectiveCompleted {
            mission: mission_id.clone(),
            objective: objective_id.clone(),
            progress,
        });

        if done == total {
            if auto_complete {
                self.complete_mission(engine, true);
            } else {
                engine.emit(StoryEvent::AllObjectivesCompleted {
                    mission: mission_id.clone(),
                });
            }
        }
        true
    }

    /// End the active mission. On success the mission joins the completed
    /// set and its rewards are applied as flags through the engine.
    pub fn complete_mission(&mut self, engine: &mut StoryEngine, success: bool) -> bool {
        let Some(mission_id) = self.active.take() else {
            warn!("no active mission to complete");
            return false;
        };
        self.timers.remove(&mission_id);

        if success {
            self.completed.insert(mission_id.clone());
            let rewards = self
                .catalog
                .get(&mission_id)
                .map(|def| def.rewards.clone())
                .unwrap_or_default();
            for reward in rewards {
                engine.set_flag(reward.flag, reward.value);
            }
            engine.set_quest_status(&mission_id.0, QuestStatus::Completed);
            engine.emit(StoryEvent::MissionCompleted { mission: mission_id });
        } else {
            engine.set_quest_status(&mission_id.0, QuestStatus::Failed);
            engine.emit(StoryEvent::MissionFailed { mission: mission_id });
        }
        true
    }

    /// Fail the active mission.
    pub fn fail_mission(&mut self, engine: &mut StoryEngine) -> bool {
        self.complete_mission(engine, false)
    }

    /// Record a clue discovery on the active mission.
    ///
    /// Validated against the mission's clue list and idempotent per mission.
    /// Cascades into any objective waiting on this clue.
    pub fn discover_clue(&mut self, engine: &mut StoryEngine, clue_id: &str) -> bool {
        let Some(mission_id) = self.active.clone() else {
            warn!("no active mission to attach clue `{clue_id}` to");
            return false;
        };
        let Some(def) = self.catalog.get(&mission_id) else {
            return false;
        };
        if def.clue(clue_id).is_none() {
            warn!("mission `{mission_id}` has no clue `{clue_id}`");
            return false;
        }
        let cascade: Vec<ObjectiveId> = def
            .objectives
            .iter()
            .filter(|objective| {
                matches!(
                    &objective.trigger,
                    Some(ObjectiveTrigger::ClueFound { clue }) if clue == clue_id
                )
            })
            .map(|objective| objective.id.clone())
            .collect();

        let found = self.clues.entry(mission_id.clone()).or_default();
        if found.iter().any(|clue| clue == clue_id) {
            warn!("clue `{clue_id}` already discovered on `{mission_id}`");
            return false;
        }
        found.push(clue_id.to_string());
        engine.emit(StoryEvent::ClueDiscovered {
            mission: mission_id.clone(),
            clue: clue_id.to_string(),
        });

        for objective in cascade {
            self.complete_objective(engine, &mission_id, &objective);
        }
        true
    }

    /// Attach a free-form note to the active mission.
    pub fn add_note(&mut self, text: impl Into<String>) -> bool {
        let Some(mission_id) = self.active.clone() else {
            warn!("no active mission to attach a note to");
            return false;
        };
        self.notes.entry(mission_id).or_default().push(text.into());
        true
    }

    // ----- event-driven triggering ------------------------------------------

    /// React to a story event: auto-start flag-triggered missions and
    /// auto-complete matching objectives on the active mission. Runs
    /// synchronously inside the tick that committed the change.
    pub fn handle_event(&mut self, engine: &mut StoryEngine, event: &StoryEvent) {
        match event {
            StoryEvent::FlagChanged { key, value, .. } => {
                self.check_mission_triggers(engine);
                self.check_objective_triggers(engine, &TriggerProbe::Flag { key, value });
            }
            StoryEvent::ResearchAdvanced { value, .. } => {
                self.check_objective_triggers(engine, &TriggerProbe::Research { value: *value });
            }
            StoryEvent::LocationChanged { location } => {
                self.check_objective_triggers(engine, &TriggerProbe::Location { location });
            }
            StoryEvent::ItemCollected { item } => {
                self.check_objective_triggers(engine, &TriggerProbe::Item { item });
            }
            _ => {}
        }
    }

    fn check_mission_triggers(&mut self, engine: &mut StoryEngine) {
        // Reject-while-active policy: do not churn start attempts that
        // would only be refused.
        if self.active.is_some() {
            return;
        }
        let mut candidates: Vec<MissionId> = self
            .catalog
            .iter()
            .filter(|def| !def.trigger_flags.is_empty())
            .filter(|def| !self.completed.contains(&def.id))
            .filter(|def| {
                def.trigger_flags
                    .iter()
                    .all(|requirement| engine.get_flag(&requirement.flag) == Some(&requirement.value))
            })
            .map(|def| def.id.clone())
            .collect();
        candidates.sort_by(|a, b| a.0.cmp(&b.0));

        for id in candidates {
            if self.active.is_some() {
                break;
            }
            self.start_mission(engine, &id);
        }
    }

    fn check_objective_triggers(&mut self, engine: &mut StoryEngine, probe: &TriggerProbe<'_>) {
        let Some(mission_id) = self.active.clone() else {
            return;
        };
        let Some(def) = self.catalog.get(&mission_id) else {
            return;
        };
        let status = self.objective_status.get(&mission_id);
        let matching: Vec<ObjectiveId> = def
            .objectives
            .iter()
            .filter(|objective| {
                status
                    .and_then(|map| map.get(&objective.id))
                    .copied()
                    == Some(false)
            })
            .filter(|objective| match (&objective.trigger, probe) {
                (
                    Some(ObjectiveTrigger::FlagSet { flag, value }),
                    TriggerProbe::Flag { key, value: changed },
                ) => flag.as_str() == *key && value == *changed,
                (
                    Some(ObjectiveTrigger::ResearchReached { threshold }),
                    TriggerProbe::Research { value },
                ) => value >= threshold,
                (
                    Some(ObjectiveTrigger::LocationEntered { location }),
                    TriggerProbe::Location { location: entered },
                ) => location.as_str() == *entered,
                (
                    Some(ObjectiveTrigger::ItemCollected { item }),
                    TriggerProbe::Item { item: collected },
                ) => item.as_str() == *collected,
                _ => false,
            })
            .map(|objective| objective.id.clone())
            .collect();

        for objective in matching {
            self.complete_objective(engine, &mission_id, &objective);
        }
    }

    // ----- queries ----------------------------------------------------------

    pub fn active_mission(&self) -> Option<&MissionId> {
        self.active.as_ref()
    }

    pub fn is_mission_completed(&self, id: &MissionId) -> bool {
        self.completed.contains(id)
    }

    pub fn mission_progress(&self, id: &MissionId) -> Option<u8> {
        self.progress.get(id).copied()
    }

    pub fn objective_completed(&self, mission: &MissionId, objective: &ObjectiveId) -> Option<bool> {
        self.objective_status
            .get(mission)
            .and_then(|status| status.get(objective))
            .copied()
    }

    pub fn remaining_seconds(&self, id: &MissionId) -> Option<f64> {
        self.timers.get(id).map(|timer| timer.remaining.max(0.0))
    }

    pub fn clues_found(&self, id: &MissionId) -> Option<&Vec<String>> {
        self.clues.get(id)
    }

    pub fn notes(&self, id: &MissionId) -> Option<&Vec<String>> {
        self.notes.get(id)
    }

    /// Snapshot of the active mission for UI consumption.
    pub fn active_status(&self) -> Option<ActiveMissionStatus> {
        let mission_id = self.active.as_ref()?;
        let def = self.catalog.get(mission_id)?;
        let status = self.objective_status.get(mission_id);
        Some(ActiveMissionStatus {
            mission: mission_id.clone(),
            title: def.title.clone(),
            progress: self.progress.get(mission_id).copied().unwrap_or(0),
            objectives: def
                .objectives
                .iter()
                .map(|objective| {
                    let done = status
                        .and_then(|map| map.get(&objective.id))
                        .copied()
                        .unwrap_or(false);
                    (objective.id.clone(), done)
                })
                .collect(),
            remaining_seconds: self.timers.get(mission_id).map(|timer| timer.remaining.max(0.0)),
        })
    }
}

impl std::fmt::Debug for MissionTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MissionTracker")
            .field("active", &self.active)
            .field("completed", &self.completed.len())
            .field("catalog", &self.catalog.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::EngineConfig;
    use story_rules::{EndingTable, MissionDef, ObjectiveDef, StoryState};

    fn engine() -> StoryEngine {
        StoryEngine::new(
            StoryState::new("limbo", 72.0 * 3600.0),
            EndingTable::new("emergency_solution"),
            EngineConfig::default(),
        )
    }

    fn catalog() -> MissionCatalog {
        MissionCatalog::from_defs([
            MissionDef::new("recon", "Recon Sweep", "limbo")
                .with_objective(ObjectiveDef::new("scout", "Scout the cordon"))
                .with_objective(
                    ObjectiveDef::new("sample", "Bag a sample").with_trigger(
                        ObjectiveTrigger::ItemCollected {
                            item: "virophage_sample".to_string(),
                        },
                    ),
                )
                .with_reward("recon_done", true),
            MissionDef::new("followup", "Follow the Static", "limbo")
                .with_trigger_flag("recon_done", true)
                .with_auto_complete()
                .with_objective(
                    ObjectiveDef::new("tune_in", "Tune the listening post").with_trigger(
                        ObjectiveTrigger::FlagSet {
                            flag: "listening_post_online".to_string(),
                            value: FlagValue::Bool(true),
                        },
                    ),
                ),
            MissionDef::new("timed", "Race the Collapse", "limbo")
                .with_time_limit(1)
                .with_objective(ObjectiveDef::new("escape", "Reach the surface")),
            MissionDef::new("sleuth", "Paper Trail", "limbo")
                .with_objective(
                    ObjectiveDef::new("chart", "Chart patient zero").with_trigger(
                        ObjectiveTrigger::ClueFound {
                            clue: "patient_zero_chart".to_string(),
                        },
                    ),
                )
                .with_objective(ObjectiveDef::new("report", "File the report"))
                .with_clue("patient_zero_chart", "An annotated shift roster."),
        ])
        .unwrap()
    }

    #[test]
    fn test_start_guards() {
        let mut engine = engine();
        let mut tracker = MissionTracker::new(catalog());

        assert!(!tracker.start_mission(&mut engine, &"nope".into()));
        assert!(tracker.start_mission(&mut engine, &"recon".into()));
        // Same mission again and a different one are both rejected.
        assert!(!tracker.start_mission(&mut engine, &"recon".into()));
        assert!(!tracker.start_mission(&mut engine, &"timed".into()));
        assert_eq!(tracker.active_mission(), Some(&"recon".into()));
    }

    #[test]
    fn test_completed_mission_cannot_restart() {
        let mut engine = engine();
        let mut tracker = MissionTracker::new(catalog());

        tracker.start_mission(&mut engine, &"recon".into());
        tracker.complete_mission(&mut engine, true);
        assert!(tracker.is_mission_completed(&"recon".into()));
        assert!(!tracker.start_mission(&mut engine, &"recon".into()));
    }

    #[test]
    fn test_objective_completion_idempotent() {
        let mut engine = engine();
        let mut tracker = MissionTracker::new(catalog());
        tracker.start_mission(&mut engine, &"recon".into());

        assert!(tracker.complete_objective(&mut engine, &"recon".into(), &"scout".into()));
        assert_eq!(tracker.mission_progress(&"recon".into()), Some(50));

        assert!(!tracker.complete_objective(&mut engine, &"recon".into(), &"scout".into()));
        assert_eq!(tracker.mission_progress(&"recon".into()), Some(50));

        assert!(!tracker.complete_objective(&mut engine, &"recon".into(), &"missing".into()));
    }

    #[test]
    fn test_all_objectives_without_auto_complete_notifies() {
        let mut engine = engine();
        let mut tracker = MissionTracker::new(catalog());
        tracker.start_mission(&mut engine, &"recon".into());
        engine.drain_events();

        tracker.complete_objective(&mut engine, &"recon".into(), &"scout".into());
        tracker.complete_objective(&mut engine, &"recon".into(), &"sample".into());

        let events = engine.drain_events();
        assert!(events.iter().any(|event| matches!(
            event,
            StoryEvent::AllObjectivesCompleted { mission } if mission == &"recon".into()
        )));
        // Mission still active until an explicit completion call.
        assert!(!tracker.is_mission_completed(&"recon".into()));
        assert_eq!(tracker.active_status().unwrap().progress, 100);
    }

    #[test]
    fn test_success_applies_rewards() {
        let mut engine = engine();
        let mut tracker = MissionTracker::new(catalog());
        tracker.start_mission(&mut engine, &"recon".into());

        tracker.complete_mission(&mut engine, true);
        assert_eq!(engine.get_flag("recon_done"), Some(&FlagValue::Bool(true)));
        assert!(tracker.active_mission().is_none());
    }

    #[test]
    fn test_timer_expiry_fails_mission() {
        let mut engine = engine();
        let mut tracker = MissionTracker::new(catalog());
        tracker.start_mission(&mut engine, &"timed".into());
        engine.drain_events();

        tracker.tick(&mut engine, 61.0);

        assert!(tracker.active_mission().is_none());
        assert!(!tracker.is_mission_completed(&"timed".into()));
        let events = engine.drain_events();
        assert!(events.iter().any(|event| matches!(
            event,
            StoryEvent::MissionTimerUpdated { remaining_seconds: 0, .. }
        )));
        assert!(events
            .iter()
            .any(|event| matches!(event, StoryEvent::MissionFailed { .. })));
    }

    #[test]
    fn test_timer_updates_each_second() {
        let mut engine = engine();
        let mut tracker = MissionTracker::new(catalog());
        tracker.start_mission(&mut engine, &"timed".into());
        engine.drain_events();

        tracker.tick(&mut engine, 1.0);
        tracker.tick(&mut engine, 0.5);
        tracker.tick(&mut engine, 0.5);

        let updates: Vec<u64> = engine
            .drain_events()
            .into_iter()
            .filter_map(|event| match event {
                StoryEvent::MissionTimerUpdated { remaining_seconds, .. } => {
                    Some(remaining_seconds)
                }
                _ => None,
            })
            .collect();
        assert_eq!(updates, vec![59, 58]);
    }

    #[test]
    fn test_timer_canceled_on_completion() {
        let mut engine = engine();
        let mut tracker = MissionTracker::new(catalog());
        tracker.start_mission(&mut engine, &"timed".into());

        tracker.complete_objective(&mut engine, &"timed".into(), &"escape".into());
        tracker.complete_mission(&mut engine, true);
        engine.drain_events();

        // A later tick finds no timer and emits nothing.
        tracker.tick(&mut engine, 120.0);
        assert!(engine.drain_events().is_empty());
        assert!(tracker.is_mission_completed(&"timed".into()));
    }

    #[test]
    fn test_flag_event_auto_starts_and_auto_completes() {
        let mut engine = engine();
        let mut tracker = MissionTracker::new(catalog());

        // recon_done satisfies followup's trigger flags.
        engine.set_flag("recon_done", true);
        for event in engine.drain_events() {
            tracker.handle_event(&mut engine, &event);
        }
        assert_eq!(tracker.active_mission(), Some(&"followup".into()));

        // listening_post_online completes followup's only objective, and the
        // mission auto-completes.
        engine.set_flag("listening_post_online", true);
        let mut pending: std::collections::VecDeque<StoryEvent> =
            engine.drain_events().into();
        while let Some(event) = pending.pop_front() {
            tracker.handle_event(&mut engine, &event);
            pending.extend(engine.drain_events());
        }
        assert!(tracker.is_mission_completed(&"followup".into()));
        assert!(tracker.active_mission().is_none());
    }

    #[test]
    fn test_item_event_completes_objective() {
        let mut engine = engine();
        let mut tracker = MissionTracker::new(catalog());
        tracker.start_mission(&mut engine, &"recon".into());

        engine.collect_item("virophage_sample");
        for event in engine.drain_events() {
            tracker.handle_event(&mut engine, &event);
        }
        assert_eq!(
            tracker.objective_completed(&"recon".into(), &"sample".into()),
            Some(true)
        );
    }

    #[test]
    fn test_discover_clue_idempotent_and_cascades() {
        let mut engine = engine();
        let mut tracker = MissionTracker::new(catalog());
        tracker.start_mission(&mut engine, &"sleuth".into());

        assert!(!tracker.discover_clue(&mut engine, "unlisted_clue"));

        assert!(tracker.discover_clue(&mut engine, "patient_zero_chart"));
        assert_eq!(
            tracker.objective_completed(&"sleuth".into(), &"chart".into()),
            Some(true)
        );

        assert!(!tracker.discover_clue(&mut engine, "patient_zero_chart"));
        assert_eq!(tracker.mission_progress(&"sleuth".into()), Some(50));
    }

    #[test]
    fn test_notes_require_active_mission() {
        let mut engine = engine();
        let mut tracker = MissionTracker::new(catalog());

        assert!(!tracker.add_note("orphan note"));
        tracker.start_mission(&mut engine, &"recon".into());
        assert!(tracker.add_note("cordon holds for now"));
        assert_eq!(tracker.notes(&"recon".into()).unwrap().len(), 1);
    }
}
