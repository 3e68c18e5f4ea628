//! Story session - the wired-together narrative core.
//!
//! Owns the engine, tracker, sequencer and event bus, constructed explicitly
//! per playthrough (no singletons). Enforces the single-writer discipline:
//! every state change routes through the engine, and the dispatch loop
//! delivers each committed event to subscribers and the tracker
//! synchronously, so a flag set in tick N can start a mission and complete
//! an objective within the same logical step.

use serde_json::Value;

use story_rules::{
    Campaign, CharacterId, CinematicId, DecisionKind, EndingDef, EndingId, FlagValue, MissionId,
    ObjectiveId, StoryState,
};

use crate::engine::{EngineConfig, StoryEngine, WatcherId};
use crate::events::{EventBus, StoryEvent, SubscriptionId};
use crate::save::SaveGame;
use crate::sequencer::{CinematicOutcome, CinematicSequencer};
use crate::tracker::{ActiveMissionStatus, MissionTracker};

/// One playthrough's narrative core: engine + tracker + sequencer + bus.
pub struct StorySession {
    engine: StoryEngine,
    tracker: MissionTracker,
    sequencer: CinematicSequencer,
    bus: EventBus,
}

impl StorySession {
    pub fn new(state: StoryState, campaign: Campaign, config: EngineConfig) -> Self {
        let Campaign {
            missions,
            cinematics,
            endings,
        } = campaign;
        Self {
            engine: StoryEngine::new(state, endings, config),
            tracker: MissionTracker::new(missions),
            sequencer: CinematicSequencer::new(cinematics),
            bus: EventBus::new(),
        }
    }

    /// Advance the whole core by one tick: the narrative clock, the mission
    /// countdown, and the scene timeline, draining events after each.
    pub fn update(&mut self, delta_seconds: f64) {
        self.engine.update(delta_seconds);
        self.dispatch();
        self.tracker.tick(&mut self.engine, delta_seconds);
        self.dispatch();
        self.sequencer.tick(&mut self.engine, delta_seconds);
        self.dispatch();
    }

    /// Deliver every pending event in commit order. Reactions may enqueue
    /// further events; those are processed in the same loop.
    fn dispatch(&mut self) {
        while let Some(event) = self.engine.poll_event() {
            self.bus.publish(&event);
            self.tracker.handle_event(&mut self.engine, &event);
        }
    }

    // ----- observers --------------------------------------------------------

    pub fn subscribe(&mut self, handler: impl FnMut(&StoryEvent) + 'static) -> SubscriptionId {
        self.bus.subscribe(handler)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.bus.unsubscribe(id)
    }

    // ----- engine commands --------------------------------------------------

    pub fn set_flag(&mut self, key: impl Into<String>, value: impl Into<FlagValue>) {
        self.engine.set_flag(key, value);
        self.dispatch();
    }

    pub fn get_flag(&self, key: &str) -> Option<&FlagValue> {
        self.engine.get_flag(key)
    }

    pub fn modify_relationship(&mut self, character: &CharacterId, delta: f32) -> (f32, f32) {
        let result = self.engine.modify_relationship(character, delta);
        self.dispatch();
        result
    }

    pub fn record_decision(
        &mut self,
        key: impl Into<String>,
        choice: impl Into<String>,
        kind: Option<DecisionKind>,
    ) {
        self.engine.record_decision(key, choice, kind);
        self.dispatch();
    }

    pub fn advance_research(&mut self, amount: f32) -> (f32, f32) {
        let result = self.engine.advance_research(amount);
        self.dispatch();
        result
    }

    pub fn discover_lore(
        &mut self,
        key: impl Into<String>,
        title: impl Into<String>,
        text: impl Into<String>,
        research_value: f32,
    ) -> bool {
        let discovered = self.engine.discover_lore(key, title, text, research_value);
        self.dispatch();
        discovered
    }

    pub fn collect_evidence(
        &mut self,
        key: impl Into<String>,
        description: impl Into<String>,
        research_value: f32,
    ) -> bool {
        let collected = self.engine.collect_evidence(key, description, research_value);
        self.dispatch();
        collected
    }

    pub fn unlock_facility(&mut self, facility: impl Into<String>) -> bool {
        let unlocked = self.engine.unlock_facility(facility);
        self.dispatch();
        unlocked
    }

    pub fn enter_location(&mut self, location: impl Into<String>) {
        self.engine.enter_location(location);
        self.dispatch();
    }

    pub fn collect_item(&mut self, item: impl Into<String>) {
        self.engine.collect_item(item);
        self.dispatch();
    }

    pub fn trigger_event(&mut self, key: &str, data: Option<Value>) -> bool {
        let fired = self.engine.trigger_event(key, data);
        self.dispatch();
        fired
    }

    pub fn determine_ending(&self) -> EndingId {
        self.engine.determine_ending()
    }

    pub fn possible_endings(&self) -> Vec<&EndingDef> {
        self.engine.possible_endings()
    }

    // ----- mission commands -------------------------------------------------

    pub fn start_mission(&mut self, id: &MissionId) -> bool {
        let started = self.tracker.start_mission(&mut self.engine, id);
        self.dispatch();
        started
    }

    pub fn complete_objective(&mut self, mission: &MissionId, objective: &ObjectiveId) -> bool {
        let completed = self
            .tracker
            .complete_objective(&mut self.engine, mission, objective);
        self.dispatch();
        completed
    }

    pub fn complete_mission(&mut self, success: bool) -> bool {
        let completed = self.tracker.complete_mission(&mut self.engine, success);
        self.dispatch();
        completed
    }

    pub fn fail_mission(&mut self) -> bool {
        let failed = self.tracker.fail_mission(&mut self.engine);
        self.dispatch();
        failed
    }

    pub fn discover_clue(&mut self, clue_id: &str) -> bool {
        let discovered = self.tracker.discover_clue(&mut self.engine, clue_id);
        self.dispatch();
        discovered
    }

    pub fn add_note(&mut self, text: impl Into<String>) -> bool {
        self.tracker.add_note(text)
    }

    pub fn active_mission_status(&self) -> Option<ActiveMissionStatus> {
        self.tracker.active_status()
    }

    // ----- cinematic commands -----------------------------------------------

    pub fn play_cinematic(&mut self, id: &CinematicId) -> bool {
        let started = self.sequencer.play_cinematic(&mut self.engine, id);
        self.dispatch();
        started
    }

    pub fn resolve_decision(&mut self, choice_id: &str) -> bool {
        let resolved = self.sequencer.resolve_decision(&mut self.engine, choice_id);
        self.dispatch();
        resolved
    }

    pub fn skip_cinematic(&mut self) -> bool {
        let skipped = self.sequencer.skip_cinematic(&mut self.engine);
        self.dispatch();
        skipped
    }

    pub fn toggle_pause(&mut self) -> bool {
        self.sequencer.toggle_pause()
    }

    pub fn take_cinematic_outcome(&mut self) -> Option<CinematicOutcome> {
        self.sequencer.take_outcome()
    }

    // ----- persistence ------------------------------------------------------

    pub fn save(&self) -> SaveGame {
        self.engine.save()
    }

    pub fn load(&mut self, save: SaveGame) -> bool {
        self.engine.load(save)
    }

    // ----- read access ------------------------------------------------------

    pub fn engine(&self) -> &StoryEngine {
        &self.engine
    }

    pub fn tracker(&self) -> &MissionTracker {
        &self.tracker
    }

    pub fn sequencer(&self) -> &CinematicSequencer {
        &self.sequencer
    }

    pub fn state(&self) -> &StoryState {
        self.engine.state()
    }

    /// Register a polled condition watcher on the engine.
    pub fn when(
        &mut self,
        predicate: impl Fn(&StoryState) -> bool + 'static,
        callback: impl FnMut(&mut StoryEngine) + 'static,
        once: bool,
    ) -> WatcherId {
        self.engine.when(predicate, callback, once)
    }
}

impl std::fmt::Debug for StorySession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorySession")
            .field("engine", &self.engine)
            .field("tracker", &self.tracker)
            .field("sequencer", &self.sequencer)
            .finish()
    }
}
