//! Cinematic sequencer - the pausable scene-script interpreter.
//!
//! Interprets a cinematic's ordered scene list. Each scene plays for its
//! declared duration on the sequencer clock, except decision-point scenes,
//! which suspend playback until a choice resolves through the story engine.
//! Lifecycle: Idle → Playing ⇄ Paused → Completed|Skipped → Idle.

use log::warn;

use story_rules::{CinematicCatalog, CinematicId};

use crate::engine::StoryEngine;
use crate::events::StoryEvent;

/// How the current scene advances.
#[derive(Debug, Clone, PartialEq)]
enum SceneGate {
    /// Auto-advance when the scene clock reaches the declared duration.
    Timed,
    /// Suspended until a decision resolves.
    AwaitingDecision,
    /// Decision resolved; advance after the display delay runs out.
    PostDecision { remaining: f64 },
}

#[derive(Debug, Clone)]
struct ActiveCinematic {
    id: CinematicId,
    scene_index: usize,
    scene_clock: f64,
    paused: bool,
    gate: SceneGate,
}

/// Terminal result of a cinematic, the poll-able counterpart of the
/// finished event.
#[derive(Debug, Clone, PartialEq)]
pub struct CinematicOutcome {
    pub cinematic: CinematicId,
    pub completed: bool,
    pub skipped: bool,
}

/// The scene-script interpreter.
pub struct CinematicSequencer {
    catalog: CinematicCatalog,
    active: Option<ActiveCinematic>,
    outcome: Option<CinematicOutcome>,
}

impl CinematicSequencer {
    pub fn new(catalog: CinematicCatalog) -> Self {
        Self {
            catalog,
            active: None,
            outcome: None,
        }
    }

    pub fn catalog(&self) -> &CinematicCatalog {
        &self.catalog
    }

    pub fn is_playing(&self) -> bool {
        self.active.is_some()
    }

    pub fn is_paused(&self) -> bool {
        self.active.as_ref().map(|active| active.paused).unwrap_or(false)
    }

    pub fn current_cinematic(&self) -> Option<&CinematicId> {
        self.active.as_ref().map(|active| &active.id)
    }

    pub fn current_scene_index(&self) -> Option<usize> {
        self.active.as_ref().map(|active| active.scene_index)
    }

    /// Whether playback is suspended at a decision point.
    pub fn awaiting_decision(&self) -> bool {
        self.active
            .as_ref()
            .map(|active| active.gate == SceneGate::AwaitingDecision)
            .unwrap_or(false)
    }

    /// Take the terminal outcome of the last finished cinematic, if any.
    pub fn take_outcome(&mut self) -> Option<CinematicOutcome> {
        self.outcome.take()
    }

    // ----- lifecycle --------------------------------------------------------

    /// Begin playing a cinematic from its first scene.
    ///
    /// Rejected while another cinematic is playing; there is no nesting or
    /// queueing.
    pub fn play_cinematic(&mut self, engine: &mut StoryEngine, id: &CinematicId) -> bool {
        if let Some(active) = &self.active {
            warn!("cannot play `{id}` while `{}` is playing", active.id);
            return false;
        }
        let Some(def) = self.catalog.get(id) else {
            warn!("unknown cinematic `{id}`");
            return false;
        };
        let scene_count = def.scenes.len();

        self.outcome = None;
        self.active = Some(ActiveCinematic {
            id: id.clone(),
            scene_index: 0,
            scene_clock: 0.0,
            paused: false,
            gate: SceneGate::Timed,
        });
        engine.emit(StoryEvent::CinematicStarted { cinematic: id.clone() });

        if scene_count == 0 {
            self.finish(engine, false);
        } else {
            self.enter_scene(engine);
        }
        true
    }

    /// Advance the scene clock. No-op while paused, idle, or awaiting a
    /// decision.
    pub fn tick(&mut self, engine: &mut StoryEngine, delta_seconds: f64) {
        if delta_seconds <= 0.0 {
            return;
        }
        let Some(active) = self.active.as_mut() else {
            return;
        };
        if active.paused {
            return;
        }

        match active.gate {
            SceneGate::AwaitingDecision => {}
            SceneGate::PostDecision { remaining } => {
                let remaining = remaining - delta_seconds;
                active.gate = SceneGate::PostDecision { remaining };
                if remaining <= 0.0 {
                    self.advance_scene(engine);
                }
            }
            SceneGate::Timed => {
                active.scene_clock += delta_seconds;
                // A long tick may cross several scene boundaries.
                loop {
                    let Some(active) = self.active.as_ref() else {
                        break;
                    };
                    if active.gate != SceneGate::Timed {
                        break;
                    }
                    let Some(duration) = self
                        .catalog
                        .get(&active.id)
                        .and_then(|def| def.scene(active.scene_index))
                        .map(|scene| scene.duration)
                    else {
                        break;
                    };
                    if active.scene_clock < duration {
                        break;
                    }
                    let carry = active.scene_clock - duration;
                    self.advance_scene(engine);
                    if let Some(active) = self.active.as_mut() {
                        active.scene_clock = carry;
                    }
                }
            }
        }
    }

    /// Resolve the pending decision with the given choice id.
    ///
    /// Records the decision and the choice's flags through the engine, then
    /// resumes advancement after the configured display delay.
    pub fn resolve_decision(&mut self, engine: &mut StoryEngine, choice_id: &str) -> bool {
        let Some(active) = self.active.as_ref() else {
            warn!("no cinematic is playing");
            return false;
        };
        if active.gate != SceneGate::AwaitingDecision {
            warn!("cinematic `{}` is not awaiting a decision", active.id);
            return false;
        }
        let cinematic_id = active.id.clone();
        let scene_index = active.scene_index;

        let Some(point) = self
            .catalog
            .get(&cinematic_id)
            .and_then(|def| def.scene(scene_index))
            .and_then(|scene| scene.decision_point.clone())
        else {
            warn!("scene {scene_index} of `{cinematic_id}` has no decision point");
            return false;
        };
        let Some(choice) = point.choice(choice_id) else {
            warn!("decision `{}` has no choice `{choice_id}`", point.key);
            return false;
        };

        engine.record_decision(point.key.as_str(), choice.id.as_str(), Some(choice.kind));
        for setting in &choice.set_flags {
            engine.set_flag(setting.flag.clone(), setting.value.clone());
        }
        engine.emit(StoryEvent::DecisionResolved {
            cinematic: cinematic_id,
            key: point.key.clone(),
            choice: choice_id.to_string(),
        });

        let delay = engine.config().decision_display_delay;
        if let Some(active) = self.active.as_mut() {
            active.gate = SceneGate::PostDecision { remaining: delay };
        }
        true
    }

    /// Skip the playing cinematic, honored only when it is skippable.
    pub fn skip_cinematic(&mut self, engine: &mut StoryEngine) -> bool {
        let Some(active) = self.active.as_ref() else {
            warn!("no cinematic to skip");
            return false;
        };
        let skippable = self
            .catalog
            .get(&active.id)
            .map(|def| def.skippable)
            .unwrap_or(false);
        if !skippable {
            warn!("cinematic `{}` is not skippable", active.id);
            return false;
        }
        self.finish(engine, true);
        true
    }

    /// Pause or resume the scene timeline without touching the scene index.
    /// Returns the new paused state; `false` (with a warning) when idle.
    pub fn toggle_pause(&mut self) -> bool {
        let Some(active) = self.active.as_mut() else {
            warn!("no cinematic to pause");
            return false;
        };
        active.paused = !active.paused;
        active.paused
    }

    // ----- internals --------------------------------------------------------

    /// Announce the current scene and open its gate.
    fn enter_scene(&mut self, engine: &mut StoryEngine) {
        let Some(active) = self.active.as_mut() else {
            return;
        };
        let Some(scene) = self
            .catalog
            .get(&active.id)
            .and_then(|def| def.scene(active.scene_index))
        else {
            return;
        };

        engine.emit(StoryEvent::SceneStarted {
            cinematic: active.id.clone(),
            index: active.scene_index,
            kind: scene.kind,
        });

        // Decision scenes suspend immediately; their visual setup is the
        // rendering layer's concern.
        if let Some(point) = &scene.decision_point {
            active.gate = SceneGate::AwaitingDecision;
            engine.emit(StoryEvent::DecisionPointReached {
                cinematic: active.id.clone(),
                key: point.key.clone(),
                prompt: point.prompt.clone(),
            });
        } else {
            active.gate = SceneGate::Timed;
        }
    }

    /// Move to the next scene, finishing the cinematic past the last one.
    fn advance_scene(&mut self, engine: &mut StoryEngine) {
        let Some(active) = self.active.as_mut() else {
            return;
        };
        active.scene_index += 1;
        active.scene_clock = 0.0;
        active.gate = SceneGate::Timed;

        let scene_count = self
            .catalog
            .get(&active.id)
            .map(|def| def.scenes.len())
            .unwrap_or(0);
        if active.scene_index >= scene_count {
            self.finish(engine, false);
        } else {
            self.enter_scene(engine);
        }
    }

    /// Tear down playback and notify: a synthetic keyed trigger for
    /// downstream mission/chapter logic plus the finished event.
    fn finish(&mut self, engine: &mut StoryEngine, skipped: bool) {
        let Some(active) = self.active.take() else {
            return;
        };
        self.outcome = Some(CinematicOutcome {
            cinematic: active.id.clone(),
            completed: !skipped,
            skipped,
        });
        engine.trigger_event(&format!("cinematic_{}_finished", active.id), None);
        engine.emit(StoryEvent::CinematicFinished {
            cinematic: active.id,
            skipped,
        });
    }
}

impl std::fmt::Debug for CinematicSequencer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CinematicSequencer")
            .field("active", &self.active)
            .field("catalog", &self.catalog.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::EngineConfig;
    use story_rules::{
        CinematicDef, DecisionChoiceDef, DecisionKind, DecisionPointDef, EndingTable, FlagValue,
        SceneDef, SceneKind, StoryState,
    };

    fn engine() -> StoryEngine {
        StoryEngine::new(
            StoryState::new("limbo", 72.0 * 3600.0),
            EndingTable::new("emergency_solution"),
            EngineConfig::default(),
        )
    }

    fn catalog() -> CinematicCatalog {
        CinematicCatalog::from_defs([
            CinematicDef::new("briefing", "Briefing")
                .with_scene(SceneDef::new(SceneKind::NewsBroadcast, 2.0))
                .with_scene(SceneDef::new(SceneKind::Footage, 2.0))
                .with_scene(
                    SceneDef::new(SceneKind::Closeup, 2.0).with_decision_point(
                        DecisionPointDef::new("accept_mission", "Lead the descent?")
                            .with_choice(
                                DecisionChoiceDef::new("accept", "Accept", DecisionKind::Altruistic)
                                    .with_flag("mission_accepted", true),
                            )
                            .with_choice(
                                DecisionChoiceDef::new("decline", "Decline", DecisionKind::Careful)
                                    .with_flag("mission_accepted", false),
                            ),
                    ),
                )
                .with_scene(SceneDef::new(SceneKind::Epilogue, 2.0)),
            CinematicDef::new("stinger", "Stinger")
                .skippable()
                .with_scene(SceneDef::new(SceneKind::Montage, 5.0))
                .with_scene(SceneDef::new(SceneKind::Epilogue, 5.0)),
        ])
        .unwrap()
    }

    #[test]
    fn test_play_rejects_nesting_and_unknown() {
        let mut engine = engine();
        let mut sequencer = CinematicSequencer::new(catalog());

        assert!(!sequencer.play_cinematic(&mut engine, &"ghost".into()));
        assert!(sequencer.play_cinematic(&mut engine, &"briefing".into()));
        assert!(!sequencer.play_cinematic(&mut engine, &"stinger".into()));
    }

    #[test]
    fn test_scenes_advance_in_order_by_duration() {
        let mut engine = engine();
        let mut sequencer = CinematicSequencer::new(catalog());
        sequencer.play_cinematic(&mut engine, &"briefing".into());
        assert_eq!(sequencer.current_scene_index(), Some(0));

        sequencer.tick(&mut engine, 2.0);
        assert_eq!(sequencer.current_scene_index(), Some(1));

        // One long tick carries over into the decision scene.
        sequencer.tick(&mut engine, 2.5);
        assert_eq!(sequencer.current_scene_index(), Some(2));
        assert!(sequencer.awaiting_decision());
    }

    #[test]
    fn test_decision_gate_blocks_until_resolution() {
        let mut engine = engine();
        let mut sequencer = CinematicSequencer::new(catalog());
        sequencer.play_cinematic(&mut engine, &"briefing".into());
        sequencer.tick(&mut engine, 4.0);
        assert!(sequencer.awaiting_decision());

        // Time alone never passes a decision gate.
        sequencer.tick(&mut engine, 60.0);
        assert_eq!(sequencer.current_scene_index(), Some(2));

        assert!(!sequencer.resolve_decision(&mut engine, "shrug"));
        assert!(sequencer.resolve_decision(&mut engine, "accept"));
        assert!(!sequencer.resolve_decision(&mut engine, "accept"));

        assert_eq!(
            engine.get_flag("mission_accepted"),
            Some(&FlagValue::Bool(true))
        );
        assert_eq!(
            engine.get_flag("decision_accept_mission"),
            Some(&FlagValue::Text("accept".to_string()))
        );

        // Display delay (2s default), then the epilogue scene, then done.
        sequencer.tick(&mut engine, 2.0);
        assert_eq!(sequencer.current_scene_index(), Some(3));
        assert!(sequencer.is_playing());

        sequencer.tick(&mut engine, 2.0);
        assert!(!sequencer.is_playing());

        let outcome = sequencer.take_outcome().unwrap();
        assert!(outcome.completed);
        assert!(!outcome.skipped);
        assert!(engine.has_triggered("cinematic_briefing_finished"));
    }

    #[test]
    fn test_skip_honors_skippable_flag() {
        let mut engine = engine();
        let mut sequencer = CinematicSequencer::new(catalog());

        sequencer.play_cinematic(&mut engine, &"briefing".into());
        assert!(!sequencer.skip_cinematic(&mut engine));
        assert!(sequencer.is_playing());

        // Finish the non-skippable one, then try the skippable stinger.
        sequencer.tick(&mut engine, 4.0);
        sequencer.resolve_decision(&mut engine, "decline");
        sequencer.tick(&mut engine, 2.0);
        sequencer.tick(&mut engine, 2.0);
        assert!(!sequencer.is_playing());
        sequencer.take_outcome();

        sequencer.play_cinematic(&mut engine, &"stinger".into());
        assert!(sequencer.skip_cinematic(&mut engine));
        let outcome = sequencer.take_outcome().unwrap();
        assert!(outcome.skipped);
        assert!(!outcome.completed);
        assert!(engine.has_triggered("cinematic_stinger_finished"));
    }

    #[test]
    fn test_pause_freezes_the_clock() {
        let mut engine = engine();
        let mut sequencer = CinematicSequencer::new(catalog());
        sequencer.play_cinematic(&mut engine, &"stinger".into());

        assert!(sequencer.toggle_pause());
        sequencer.tick(&mut engine, 60.0);
        assert_eq!(sequencer.current_scene_index(), Some(0));

        assert!(!sequencer.toggle_pause());
        sequencer.tick(&mut engine, 5.0);
        assert_eq!(sequencer.current_scene_index(), Some(1));
    }

    #[test]
    fn test_scene_events_are_emitted_in_order() {
        let mut engine = engine();
        let mut sequencer = CinematicSequencer::new(catalog());
        sequencer.play_cinematic(&mut engine, &"briefing".into());
        sequencer.tick(&mut engine, 4.0);

        let events = engine.drain_events();
        let starts: Vec<usize> = events
            .iter()
            .filter_map(|event| match event {
                StoryEvent::SceneStarted { index, .. } => Some(*index),
                _ => None,
            })
            .collect();
        assert_eq!(starts, vec![0, 1, 2]);
        assert!(events.iter().any(|event| matches!(
            event,
            StoryEvent::DecisionPointReached { key, .. } if key == "accept_mission"
        )));
    }
}
