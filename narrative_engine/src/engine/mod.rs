//! Story engine - the narrative clock and trigger evaluator.
//!
//! The engine is the single writer of the story state. Every mutator
//! commits through the state's clamping primitives, drains the change log,
//! and converts each committed change into a typed event on the outbox.
//! One-time narrative signals go through the triggered-events guard, so a
//! key can fire at most once per playthrough.

mod endings;

use std::collections::{HashSet, VecDeque};

use log::{debug, error};
use serde_json::Value;

use story_rules::{
    CharacterId, DecisionKind, EndingDef, EndingId, EndingTable, FlagValue, StateChange,
    StoryState,
};

use crate::events::StoryEvent;
use crate::save::{SaveGame, SAVE_SCHEMA_VERSION};

/// Severity percentages that fire a one-time `pandemic_severity_<n>` trigger.
pub const SEVERITY_THRESHOLDS: [f32; 5] = [25.0, 50.0, 75.0, 90.0, 95.0];

/// Remaining-time marks (hours, descending) that fire one-time warnings.
pub const TIME_THRESHOLDS_HOURS: [f64; 6] = [24.0, 12.0, 6.0, 3.0, 1.0, 0.5];

/// Research percentages that fire a one-time `research_milestone_<n>` trigger.
pub const RESEARCH_MILESTONES: [f32; 6] = [10.0, 25.0, 50.0, 75.0, 90.0, 100.0];

/// Countdown seconds granted when the cure formula is discovered.
const CURE_TIME_BONUS_SECONDS: f64 = 1800.0;

/// Severity relief applied at the 50% research milestone.
const MIDPOINT_SEVERITY_RELIEF: f32 = 5.0;

/// Tunables for the narrative clock.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Severity points per second at neutral research and a full clock.
    pub base_severity_rate: f32,

    /// Seconds a resolved decision stays on screen before the cinematic
    /// advances.
    pub decision_display_delay: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            base_severity_rate: 0.05,
            decision_display_delay: 2.0,
        }
    }
}

/// Handle for a registered condition watcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WatcherId(pub u64);

struct ConditionWatcher {
    id: WatcherId,
    predicate: Box<dyn Fn(&StoryState) -> bool>,
    callback: Box<dyn FnMut(&mut StoryEngine)>,
    once: bool,
}

/// The narrative clock and trigger evaluator.
pub struct StoryEngine {
    config: EngineConfig,
    state: StoryState,
    endings: EndingTable,
    triggered: HashSet<String>,
    watchers: Vec<ConditionWatcher>,
    next_watcher_id: u64,
    outbox: VecDeque<StoryEvent>,
}

impl StoryEngine {
    pub fn new(state: StoryState, endings: EndingTable, config: EngineConfig) -> Self {
        Self {
            config,
            state,
            endings,
            triggered: HashSet::new(),
            watchers: Vec::new(),
            next_watcher_id: 0,
            outbox: VecDeque::new(),
        }
    }

    pub fn state(&self) -> &StoryState {
        &self.state
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn endings(&self) -> &EndingTable {
        &self.endings
    }

    pub fn triggered_events(&self) -> &HashSet<String> {
        &self.triggered
    }

    pub fn has_triggered(&self, key: &str) -> bool {
        self.triggered.contains(key)
    }

    // ----- event plumbing ---------------------------------------------------

    pub(crate) fn emit(&mut self, event: StoryEvent) {
        self.outbox.push_back(event);
    }

    /// Pop the next pending event, oldest first.
    pub fn poll_event(&mut self) -> Option<StoryEvent> {
        self.outbox.pop_front()
    }

    /// Drain every pending event, oldest first.
    pub fn drain_events(&mut self) -> Vec<StoryEvent> {
        self.outbox.drain(..).collect()
    }

    /// Convert committed state changes into events, preserving commit order.
    fn flush_changes(&mut self) {
        for change in self.state.drain_changes() {
            let event = match change {
                StateChange::FlagSet { key, previous, value } => {
                    StoryEvent::FlagChanged { key, previous, value }
                }
                StateChange::RelationshipChanged { character, previous, value } => {
                    StoryEvent::RelationshipChanged { character, previous, value }
                }
                StateChange::ResearchAdvanced { previous, value } => {
                    StoryEvent::ResearchAdvanced { previous, value }
                }
                StateChange::SeverityChanged { previous, value } => {
                    StoryEvent::SeverityChanged { previous, value }
                }
                StateChange::StabilizationChanged { previous, value } => {
                    StoryEvent::StabilizationChanged { previous, value }
                }
                StateChange::MainProgressAdvanced { previous, value } => {
                    StoryEvent::MainProgressAdvanced { previous, value }
                }
                StateChange::TimeAdded { previous, value } => {
                    StoryEvent::TimeAdded { previous, value }
                }
                StateChange::TimeConsumed { previous, value } => {
                    StoryEvent::TimeConsumed { previous, value }
                }
                StateChange::FacilityUnlocked { facility } => {
                    StoryEvent::FacilityUnlocked { facility }
                }
                StateChange::LoreDiscovered { key, research_value } => {
                    StoryEvent::LoreDiscovered { key, research_value }
                }
                StateChange::EvidenceCollected { key, research_value } => {
                    StoryEvent::EvidenceCollected { key, research_value }
                }
                StateChange::DecisionRecorded { key, choice, kind } => {
                    StoryEvent::DecisionMade { key, choice, kind }
                }
                StateChange::EndingPathChanged { previous, value } => {
                    StoryEvent::EndingPathChanged { previous, value }
                }
                StateChange::ChapterCompleted { chapter, next } => {
                    StoryEvent::ChapterCompleted { chapter, next }
                }
                StateChange::QuestUpdated { quest } => StoryEvent::QuestUpdated { quest },
            };
            self.outbox.push_back(event);
        }
    }

    // ----- the clock --------------------------------------------------------

    /// Advance the narrative clock by `delta_seconds`.
    ///
    /// Decrements the countdown (floor 0), integrates pandemic severity with
    /// `base_rate * research_factor * (1 + time_ratio)`, fires one-time
    /// severity and time-warning triggers, fires `time_expired` exactly once
    /// at zero, and evaluates registered condition watchers.
    pub fn update(&mut self, delta_seconds: f64) {
        if delta_seconds <= 0.0 {
            return;
        }
        self.state.advance_clock(delta_seconds);
        let (previous_remaining, remaining) = self.state.consume_time(delta_seconds);

        // The pandemic accelerates as the deadline nears and slows as
        // research progresses.
        let research_factor = 1.0 - 0.9 * (self.state.world.research_progress / 100.0);
        let time_ratio = if self.state.world.total_duration > 0.0 {
            1.0 - (remaining / self.state.world.total_duration)
        } else {
            1.0
        };
        let severity_delta = self.config.base_severity_rate
            * research_factor
            * (1.0 + time_ratio as f32)
            * delta_seconds as f32;
        self.state.adjust_severity(severity_delta);
        self.flush_changes();

        let severity = self.state.world.pandemic_severity;
        for threshold in SEVERITY_THRESHOLDS {
            if severity >= threshold {
                self.trigger_event(&format!("pandemic_severity_{}", threshold as u32), None);
            }
        }
        for hours in TIME_THRESHOLDS_HOURS {
            if remaining <= hours * 3600.0 {
                self.trigger_event(&time_threshold_key(hours), None);
            }
        }
        if previous_remaining > 0.0 && remaining <= 0.0 {
            self.trigger_event("time_expired", None);
        }

        self.run_watchers();
    }

    // ----- state operations -------------------------------------------------

    /// Set a flag and emit the change.
    pub fn set_flag(&mut self, key: impl Into<String>, value: impl Into<FlagValue>) {
        self.state.set_flag(key, value.into());
        self.flush_changes();
    }

    pub fn get_flag(&self, key: &str) -> Option<&FlagValue> {
        self.state.get_flag(key)
    }

    /// Read a flag, falling back to `default` when unset.
    pub fn flag_or(&self, key: &str, default: FlagValue) -> FlagValue {
        self.state.get_flag(key).cloned().unwrap_or(default)
    }

    /// Apply a clamped relationship delta. Returns `(previous, new)`.
    pub fn modify_relationship(&mut self, character: &CharacterId, delta: f32) -> (f32, f32) {
        let result = self.state.modify_relationship(character, delta);
        self.flush_changes();
        result
    }

    /// Append a decision, set the derived `decision_<key>` flag, and
    /// recompute the ending path.
    pub fn record_decision(
        &mut self,
        key: impl Into<String>,
        choice: impl Into<String>,
        kind: Option<DecisionKind>,
    ) {
        let key = key.into();
        let choice = choice.into();
        self.state.record_decision(key.clone(), choice.clone(), kind);
        self.state
            .set_flag(format!("decision_{key}"), FlagValue::Text(choice));
        let path = endings::recompute_path(&self.state);
        self.state.set_ending_path(path);
        self.flush_changes();
    }

    /// Increase research progress. Milestone crossings fire one-time
    /// triggers with small, explicit payoffs: severity relief at 50% and the
    /// cure formula at 100%.
    pub fn advance_research(&mut self, amount: f32) -> (f32, f32) {
        let (previous, value) = self.state.advance_research(amount);
        self.flush_changes();

        for milestone in RESEARCH_MILESTONES {
            if previous < milestone && value >= milestone {
                self.trigger_event(&format!("research_milestone_{}", milestone as u32), None);
                if milestone as u32 == 50 {
                    self.state.adjust_severity(-MIDPOINT_SEVERITY_RELIEF);
                    self.flush_changes();
                }
                if milestone as u32 == 100 {
                    self.trigger_event("cure_formula_discovered", None);
                }
            }
        }
        (previous, value)
    }

    /// Adjust quantum stabilization. Returns `(previous, new)`.
    pub fn adjust_stabilization(&mut self, delta: f32) -> (f32, f32) {
        let result = self.state.adjust_stabilization(delta);
        self.flush_changes();
        result
    }

    /// Advance overall story progress. Returns `(previous, new)`.
    pub fn advance_main_progress(&mut self, amount: f32) -> (f32, f32) {
        let result = self.state.advance_main_progress(amount);
        self.flush_changes();
        result
    }

    /// Grant extra countdown time.
    pub fn add_time(&mut self, seconds: f64) -> (f64, f64) {
        let result = self.state.add_time(seconds);
        self.flush_changes();
        result
    }

    /// Record a lore discovery. Idempotent; the research bonus applies only
    /// on first discovery.
    pub fn discover_lore(
        &mut self,
        key: impl Into<String>,
        title: impl Into<String>,
        text: impl Into<String>,
        research_value: f32,
    ) -> bool {
        let key = key.into();
        if !self.state.discover_lore(key.clone(), title, text, research_value) {
            debug!("lore `{key}` already discovered");
            return false;
        }
        self.flush_changes();
        if research_value > 0.0 {
            self.advance_research(research_value);
        }
        true
    }

    /// Record evidence collection. Idempotent like [`discover_lore`].
    ///
    /// [`discover_lore`]: StoryEngine::discover_lore
    pub fn collect_evidence(
        &mut self,
        key: impl Into<String>,
        description: impl Into<String>,
        research_value: f32,
    ) -> bool {
        let key = key.into();
        if !self.state.collect_evidence(key.clone(), description, research_value) {
            debug!("evidence `{key}` already collected");
            return false;
        }
        self.flush_changes();
        if research_value > 0.0 {
            self.advance_research(research_value);
        }
        true
    }

    /// Unlock a facility. Returns `false` if already unlocked.
    pub fn unlock_facility(&mut self, facility: impl Into<String>) -> bool {
        let unlocked = self.state.unlock_facility(facility);
        self.flush_changes();
        unlocked
    }

    /// Player entered a location: marks it visited and emits the change.
    pub fn enter_location(&mut self, location: impl Into<String>) {
        let location = location.into();
        self.state
            .set_flag(format!("visited_{location}"), FlagValue::Bool(true));
        self.flush_changes();
        self.emit(StoryEvent::LocationChanged { location });
    }

    /// Player collected an item: pure notification, no core state.
    pub fn collect_item(&mut self, item: impl Into<String>) {
        self.emit(StoryEvent::ItemCollected { item: item.into() });
    }

    /// Complete the current chapter and move to the next.
    pub fn complete_chapter(&mut self, next: impl Into<story_rules::ChapterId>) -> bool {
        let completed = self.state.complete_chapter(next);
        self.flush_changes();
        completed
    }

    // ----- quest mirror -----------------------------------------------------

    pub fn start_quest(
        &mut self,
        key: impl Into<String>,
        objective_ids: impl IntoIterator<Item = String>,
    ) -> bool {
        let started = self.state.start_quest(key, objective_ids);
        self.flush_changes();
        started
    }

    pub fn complete_quest_objective(&mut self, key: &str, objective_id: &str) -> bool {
        let completed = self.state.complete_quest_objective(key, objective_id);
        self.flush_changes();
        completed
    }

    pub fn set_quest_status(&mut self, key: &str, status: story_rules::QuestStatus) -> bool {
        let updated = self.state.set_quest_status(key, status);
        self.flush_changes();
        updated
    }

    // ----- triggers ---------------------------------------------------------

    /// Fire a one-time keyed narrative trigger.
    ///
    /// Returns `false` if the key has already fired. On first fire the keyed
    /// event is emitted and the hard-coded effect table is consulted.
    pub fn trigger_event(&mut self, key: &str, data: Option<Value>) -> bool {
        if !self.triggered.insert(key.to_string()) {
            debug!("trigger `{key}` already fired");
            return false;
        }
        self.emit(StoryEvent::StoryTriggered {
            key: key.to_string(),
            data,
        });
        self.apply_trigger_effects(key);
        true
    }

    /// The event→effect table. Deliberately small and explicit so side
    /// effects stay auditable.
    fn apply_trigger_effects(&mut self, key: &str) {
        match key {
            "cure_formula_discovered" => {
                self.state.add_time(CURE_TIME_BONUS_SECONDS);
                self.state
                    .set_flag("cure_formula_discovered", FlagValue::Bool(true));
                self.flush_changes();
            }
            "quantum_containment_breach" => {
                self.state.adjust_severity(15.0);
                self.state.adjust_stabilization(-10.0);
                self.flush_changes();
            }
            "survivors_rescued" => {
                self.state
                    .modify_relationship(&CharacterId::new("beatrice"), 10.0);
                self.state.set_flag("saved_survivors", FlagValue::Bool(true));
                self.flush_changes();
            }
            _ => {}
        }
    }

    // ----- condition watchers -----------------------------------------------

    /// Register a polling condition watcher evaluated on every `update`.
    ///
    /// When `once` is set the watcher is removed after its first firing.
    pub fn when(
        &mut self,
        predicate: impl Fn(&StoryState) -> bool + 'static,
        callback: impl FnMut(&mut StoryEngine) + 'static,
        once: bool,
    ) -> WatcherId {
        self.next_watcher_id += 1;
        let id = WatcherId(self.next_watcher_id);
        self.watchers.push(ConditionWatcher {
            id,
            predicate: Box::new(predicate),
            callback: Box::new(callback),
            once,
        });
        id
    }

    /// Remove a watcher by id. Returns `false` if unknown.
    pub fn remove_watcher(&mut self, id: WatcherId) -> bool {
        let before = self.watchers.len();
        self.watchers.retain(|watcher| watcher.id != id);
        self.watchers.len() != before
    }

    fn run_watchers(&mut self) {
        let fired: Vec<WatcherId> = self
            .watchers
            .iter()
            .filter(|watcher| (watcher.predicate)(&self.state))
            .map(|watcher| watcher.id)
            .collect();

        for id in fired {
            // Take the watcher out so its callback can borrow the engine.
            let Some(position) = self.watchers.iter().position(|watcher| watcher.id == id)
            else {
                continue;
            };
            let mut watcher = self.watchers.remove(position);
            (watcher.callback)(self);
            self.emit(StoryEvent::WatcherFired { watcher: id.0 });
            if !watcher.once {
                let position = position.min(self.watchers.len());
                self.watchers.insert(position, watcher);
            }
        }
    }

    // ----- persistence ------------------------------------------------------

    /// Capture a versioned snapshot of the playthrough.
    pub fn save(&self) -> SaveGame {
        SaveGame {
            schema_version: SAVE_SCHEMA_VERSION,
            run_id: self.state.run_id,
            game_time: self.state.game_time,
            state: self.state.clone(),
            triggered_events: self.triggered.clone(),
        }
    }

    /// Restore a snapshot. Fails closed: on a version mismatch the engine
    /// is left untouched and `false` is returned.
    pub fn load(&mut self, save: SaveGame) -> bool {
        if save.schema_version != SAVE_SCHEMA_VERSION {
            error!(
                "rejecting save snapshot with schema version {} (expected {})",
                save.schema_version, SAVE_SCHEMA_VERSION
            );
            return false;
        }
        self.state = save.state;
        self.triggered = save.triggered_events;
        true
    }

    // ----- endings ----------------------------------------------------------

    /// Resolve the ending for the current state (first table match wins).
    pub fn determine_ending(&self) -> EndingId {
        self.endings.determine(&self.state)
    }

    /// All endings whose requirements currently hold, in table order.
    pub fn possible_endings(&self) -> Vec<&EndingDef> {
        self.endings.possible(&self.state)
    }
}

fn time_threshold_key(hours: f64) -> String {
    if hours < 1.0 {
        format!("time_warning_{}m", (hours * 60.0) as u32)
    } else {
        format!("time_warning_{}h", hours as u32)
    }
}

impl std::fmt::Debug for StoryEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoryEngine")
            .field("game_time", &self.state.game_time)
            .field("triggered", &self.triggered.len())
            .field("watchers", &self.watchers.len())
            .field("pending_events", &self.outbox.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use story_rules::EndingTable;

    fn engine() -> StoryEngine {
        let state = StoryState::new("limbo", 72.0 * 3600.0);
        StoryEngine::new(
            state,
            EndingTable::new("emergency_solution"),
            EngineConfig::default(),
        )
    }

    fn count_triggers(events: &[StoryEvent], wanted: &str) -> usize {
        events
            .iter()
            .filter(|event| matches!(event, StoryEvent::StoryTriggered { key, .. } if key == wanted))
            .count()
    }

    #[test]
    fn test_update_decrements_time_and_grows_severity() {
        let mut engine = engine();
        engine.update(60.0);

        assert_eq!(engine.state().world.time_remaining, 72.0 * 3600.0 - 60.0);
        assert!(engine.state().world.pandemic_severity > 0.0);
        assert_eq!(engine.state().game_time, 60.0);
    }

    #[test]
    fn test_severity_threshold_fires_once() {
        let mut engine = engine();
        // Park severity just below the first threshold, then tick across it.
        engine.state.adjust_severity(24.0);
        engine.state.drain_changes();

        let mut events = Vec::new();
        for _ in 0..50 {
            engine.update(10.0);
            events.extend(engine.drain_events());
        }

        assert!(engine.state().world.pandemic_severity > 25.0);
        assert_eq!(count_triggers(&events, "pandemic_severity_25"), 1);
    }

    #[test]
    fn test_time_warnings_fire_once_each() {
        let state = StoryState::new("limbo", 25.0 * 3600.0);
        let mut engine = StoryEngine::new(
            state,
            EndingTable::new("emergency_solution"),
            EngineConfig::default(),
        );

        let mut events = Vec::new();
        // Two hours of hour-long ticks crosses only the 24h mark.
        engine.update(3600.0);
        engine.update(3600.0);
        events.extend(engine.drain_events());

        assert_eq!(count_triggers(&events, "time_warning_24h"), 1);
        assert_eq!(count_triggers(&events, "time_warning_12h"), 0);
    }

    #[test]
    fn test_time_expired_fires_exactly_once() {
        let state = StoryState::new("limbo", 30.0);
        let mut engine = StoryEngine::new(
            state,
            EndingTable::new("emergency_solution"),
            EngineConfig::default(),
        );

        let mut events = Vec::new();
        for _ in 0..5 {
            engine.update(20.0);
            events.extend(engine.drain_events());
        }

        assert_eq!(engine.state().world.time_remaining, 0.0);
        assert_eq!(count_triggers(&events, "time_expired"), 1);
    }

    #[test]
    fn test_research_milestone_50_relieves_severity() {
        let mut engine = engine();
        engine.state.adjust_severity(40.0);
        engine.state.drain_changes();

        engine.advance_research(55.0);
        let events = engine.drain_events();

        assert_eq!(count_triggers(&events, "research_milestone_10"), 1);
        assert_eq!(count_triggers(&events, "research_milestone_25"), 1);
        assert_eq!(count_triggers(&events, "research_milestone_50"), 1);
        assert_eq!(engine.state().world.pandemic_severity, 35.0);
    }

    #[test]
    fn test_cure_formula_grants_time() {
        let mut engine = engine();
        engine.state.consume_time(3600.0);
        engine.state.drain_changes();
        let before = engine.state().world.time_remaining;

        engine.advance_research(100.0);
        let events = engine.drain_events();

        assert_eq!(count_triggers(&events, "research_milestone_100"), 1);
        assert_eq!(count_triggers(&events, "cure_formula_discovered"), 1);
        assert_eq!(engine.state().world.time_remaining, before + 1800.0);
        assert!(engine.state().flag_truthy("cure_formula_discovered"));
    }

    #[test]
    fn test_lore_research_bonus_applies_once() {
        let mut engine = engine();

        assert!(engine.discover_lore("inferno_map", "The Map", "Nine circles.", 5.0));
        assert_eq!(engine.state().world.research_progress, 5.0);

        assert!(!engine.discover_lore("inferno_map", "The Map", "Nine circles.", 5.0));
        assert_eq!(engine.state().world.research_progress, 5.0);
    }

    #[test]
    fn test_trigger_event_is_idempotent() {
        let mut engine = engine();

        assert!(engine.trigger_event("quantum_containment_breach", None));
        let severity = engine.state().world.pandemic_severity;
        assert_eq!(severity, 15.0);

        assert!(!engine.trigger_event("quantum_containment_breach", None));
        assert_eq!(engine.state().world.pandemic_severity, severity);
    }

    #[test]
    fn test_record_decision_sets_derived_flag_and_path() {
        let mut engine = engine();
        engine.record_decision("accept_mission", "accept", Some(DecisionKind::Altruistic));

        assert_eq!(
            engine.get_flag("decision_accept_mission"),
            Some(&FlagValue::Text("accept".to_string()))
        );
        // Research is still 0, so the floor override forces failure.
        assert_eq!(engine.state().ending_path, story_rules::EndingPath::Failure);

        let events = engine.drain_events();
        assert!(events
            .iter()
            .any(|event| matches!(event, StoryEvent::DecisionMade { key, .. } if key == "accept_mission")));
    }

    #[test]
    fn test_watcher_once_fires_and_unregisters() {
        let mut engine = engine();
        engine.when(
            |state| state.flag_truthy("gate_open"),
            |engine| {
                engine.set_flag("watcher_saw_gate", true);
            },
            true,
        );

        engine.update(1.0);
        assert!(engine.get_flag("watcher_saw_gate").is_none());

        engine.set_flag("gate_open", true);
        engine.update(1.0);
        assert!(engine.state().flag_truthy("watcher_saw_gate"));

        engine.set_flag("watcher_saw_gate", false);
        engine.update(1.0);
        // Removed after firing; the flag stays false.
        assert!(!engine.state().flag_truthy("watcher_saw_gate"));
    }

    #[test]
    fn test_watcher_repeating_and_removal() {
        let mut engine = engine();
        let id = engine.when(
            |_| true,
            |engine| {
                let count = engine
                    .flag_or("tick_count", FlagValue::Int(0))
                    .as_int()
                    .unwrap_or(0);
                engine.set_flag("tick_count", count + 1);
            },
            false,
        );

        engine.update(1.0);
        engine.update(1.0);
        assert_eq!(engine.flag_or("tick_count", FlagValue::Int(0)).as_int(), Some(2));

        assert!(engine.remove_watcher(id));
        assert!(!engine.remove_watcher(id));
        engine.update(1.0);
        assert_eq!(engine.flag_or("tick_count", FlagValue::Int(0)).as_int(), Some(2));
    }

    #[test]
    fn test_events_follow_commits() {
        let mut engine = engine();
        engine.modify_relationship(&CharacterId::new("virgil"), 250.0);

        let events = engine.drain_events();
        let Some(StoryEvent::RelationshipChanged { value, .. }) = events.first() else {
            panic!("expected a relationship event");
        };
        // The observed value is the committed, clamped one.
        assert_eq!(*value, 100.0);
    }
}
