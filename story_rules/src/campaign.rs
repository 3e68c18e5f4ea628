//! The Quantum Salvation demo campaign.
//!
//! A compact authored content set: the opening chapter of a pandemic story
//! told through Dante's descent, reduced to the missions, cinematics and
//! endings the engine needs. Content edits happen here (or in equivalent
//! TOML documents); no engine code depends on specific entries.

use crate::catalog::{
    CinematicCatalog, CinematicDef, DecisionChoiceDef, DecisionPointDef, EndingDef,
    EndingRequirement, EndingTable, MissionCatalog, MissionDef, ObjectiveDef, ObjectiveTrigger,
    SceneDef, SceneKind, WorldStat,
};
use crate::flags::FlagValue;
use crate::state::DecisionKind;

/// The full authored content for one campaign.
#[derive(Debug, Clone)]
pub struct Campaign {
    pub missions: MissionCatalog,
    pub cinematics: CinematicCatalog,
    pub endings: EndingTable,
}

/// Build the Quantum Salvation campaign content.
pub fn quantum_salvation() -> Campaign {
    Campaign {
        missions: missions(),
        cinematics: cinematics(),
        endings: endings(),
    }
}

fn missions() -> MissionCatalog {
    let containment = MissionDef::new("m001", "Containment Protocol", "limbo")
        .with_description("Seal the first outbreak site before the decoherence front spreads.")
        .with_objective(ObjectiveDef::new("obj1", "Reach the collapsed research wing"))
        .with_objective(
            ObjectiveDef::new("obj2", "Enter the quarantine ward").with_trigger(
                ObjectiveTrigger::LocationEntered {
                    location: "quarantine_ward".to_string(),
                },
            ),
        )
        .with_objective(
            ObjectiveDef::new("obj3", "Recover a virophage sample").with_trigger(
                ObjectiveTrigger::ItemCollected {
                    item: "virophage_sample".to_string(),
                },
            ),
        )
        .with_objective(
            ObjectiveDef::new("obj4", "Chart patient zero's movements").with_trigger(
                ObjectiveTrigger::ClueFound {
                    clue: "patient_zero_chart".to_string(),
                },
            ),
        )
        .with_objective(
            ObjectiveDef::new("obj5", "Restore power to the containment field").with_trigger(
                ObjectiveTrigger::FlagSet {
                    flag: "containment_field_powered".to_string(),
                    value: FlagValue::Bool(true),
                },
            ),
        )
        .with_clue("patient_zero_chart", "A shift roster annotated in a trembling hand.")
        .with_clue("cracked_badge", "A staff badge, half-phased through the floor tile.")
        .with_reward("containment_protocol_complete", true)
        .with_reward("chapter_limbo_cleared", true);

    let echoes = MissionDef::new("m002", "Echoes in the Static", "limbo")
        .with_description("Trace the entangled broadcasts leaking from the hot zone.")
        .with_trigger_flag("mission_accepted", true)
        .with_auto_complete()
        .with_objective(
            ObjectiveDef::new("listen_post", "Bring the listening post online").with_trigger(
                ObjectiveTrigger::FlagSet {
                    flag: "listening_post_online".to_string(),
                    value: FlagValue::Bool(true),
                },
            ),
        )
        .with_objective(
            ObjectiveDef::new("decode_burst", "Decode the first burst transmission").with_trigger(
                ObjectiveTrigger::ResearchReached { threshold: 25.0 },
            ),
        )
        .with_reward("echoes_traced", true);

    let race = MissionDef::new("m003", "Race the Collapse", "city_of_dis")
        .with_description("Evacuate the lower labs before the stabilization field fails.")
        .with_time_limit(30)
        .with_objective(
            ObjectiveDef::new("open_gates", "Override the blast gates").with_trigger(
                ObjectiveTrigger::FlagSet {
                    flag: "blast_gates_open".to_string(),
                    value: FlagValue::Bool(true),
                },
            ),
        )
        .with_objective(
            ObjectiveDef::new("clear_labs", "Clear the lower labs").with_trigger(
                ObjectiveTrigger::LocationEntered {
                    location: "lower_labs".to_string(),
                },
            ),
        )
        .with_auto_complete()
        .with_reward("evacuation_complete", true);

    MissionCatalog::from_defs([containment, echoes, race])
        .expect("campaign mission ids are unique")
}

fn cinematics() -> CinematicCatalog {
    let briefing = CinematicDef::new("emergency_briefing", "Emergency Briefing")
        .with_scene(
            SceneDef::new(SceneKind::NewsBroadcast, 6.0)
                .with_text("Quarantine lines drawn around three cities overnight.")
                .with_background("newsroom_collapse")
                .with_audio("broadcast_static"),
        )
        .with_scene(
            SceneDef::new(SceneKind::Footage, 4.0)
                .with_text("Handheld footage: a hallway folding into itself.")
                .with_background("hot_zone_corridor"),
        )
        .with_scene(
            SceneDef::new(SceneKind::BriefingRoom, 5.0)
                .with_text("Director Alighieri: \"The decoherence front doubles every day.\"")
                .with_background("crisis_room")
                .with_audio("low_drone"),
        )
        .with_scene(
            SceneDef::new(SceneKind::Closeup, 4.0)
                .with_text("The descent team charter slides across the table.")
                .with_decision_point(
                    DecisionPointDef::new("accept_mission", "Will you lead the descent?")
                        .with_choice(
                            DecisionChoiceDef::new("accept", "Accept the charter", DecisionKind::Altruistic)
                                .with_flag("mission_accepted", true),
                        )
                        .with_choice(
                            DecisionChoiceDef::new("decline", "Request reassignment", DecisionKind::Careful)
                                .with_flag("mission_accepted", false),
                        ),
                ),
        )
        .with_scene(
            SceneDef::new(SceneKind::Scene, 3.0)
                .with_text("Elevator doors close over the city lights.")
                .with_background("descent_elevator"),
        );

    let descent = CinematicDef::new("intro_descent", "The Descent")
        .skippable()
        .with_scene(
            SceneDef::new(SceneKind::Montage, 8.0)
                .with_text("Midway through life's journey, the instruments went dark.")
                .with_audio("inferno_theme"),
        )
        .with_scene(
            SceneDef::new(SceneKind::CharacterFocus, 5.0)
                .with_text("Virgil checks the dosimeter twice. It reads in probabilities now."),
        )
        .with_scene(
            SceneDef::new(SceneKind::Epilogue, 4.0)
                .with_text("Below: nine levels of quarantine, and something underneath."),
        );

    CinematicCatalog::from_defs([briefing, descent]).expect("campaign cinematic ids are unique")
}

fn endings() -> EndingTable {
    EndingTable::new("emergency_solution")
        .with_ending(
            EndingDef::new("true_cure", "The True Cure")
                .with_description("The formula holds. The world re-coheres.")
                .with_requirement(EndingRequirement::StatAtLeast {
                    stat: WorldStat::ResearchProgress,
                    min: 100.0,
                })
                .with_requirement(EndingRequirement::StatAtLeast {
                    stat: WorldStat::QuantumStabilization,
                    min: 80.0,
                })
                .with_requirement(EndingRequirement::EvidenceCollected {
                    evidence: "quantum_resonance_scan".to_string(),
                })
                .with_requirement(EndingRequirement::EvidenceCollected {
                    evidence: "patient_zero_genome".to_string(),
                })
                .with_requirement(EndingRequirement::FlagEquals {
                    flag: "cure_formula_discovered".to_string(),
                    value: FlagValue::Bool(true),
                })
                .with_requirement(EndingRequirement::FlagEquals {
                    flag: "facility_secured".to_string(),
                    value: FlagValue::Bool(true),
                }),
        )
        .with_ending(
            EndingDef::new("quantum_ascension", "Quantum Ascension")
                .with_description("Stabilized, but no longer entirely here.")
                .with_requirement(EndingRequirement::StatAtLeast {
                    stat: WorldStat::QuantumStabilization,
                    min: 75.0,
                })
                .with_requirement(EndingRequirement::FlagEquals {
                    flag: "cure_formula_discovered".to_string(),
                    value: FlagValue::Bool(true),
                }),
        )
        .with_ending(
            EndingDef::new("pyrrhic_victory", "Pyrrhic Victory")
                .with_description("The cure arrives after the cities empty.")
                .with_requirement(EndingRequirement::StatAtLeast {
                    stat: WorldStat::ResearchProgress,
                    min: 100.0,
                })
                .with_requirement(EndingRequirement::StatInRange {
                    stat: WorldStat::PandemicSeverity,
                    min: 60.0,
                    max: 100.0,
                }),
        )
        .with_ending(
            EndingDef::new("quiet_containment", "Quiet Containment")
                .with_description("The front never breaks the cordon.")
                .with_requirement(EndingRequirement::StatInRange {
                    stat: WorldStat::PandemicSeverity,
                    min: 0.0,
                    max: 40.0,
                })
                .with_requirement(EndingRequirement::StatAtLeast {
                    stat: WorldStat::ResearchProgress,
                    min: 50.0,
                }),
        )
        .with_ending(
            EndingDef::new("emergency_solution", "Emergency Solution")
                .with_description("A patch, not a cure. The countdown merely pauses.")
                .with_requirement(EndingRequirement::StatAtLeast {
                    stat: WorldStat::MainProgress,
                    min: 101.0,
                }),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::StoryState;

    #[test]
    fn test_campaign_content_shape() {
        let campaign = quantum_salvation();

        let containment = campaign.missions.get(&"m001".into()).unwrap();
        assert_eq!(containment.objectives.len(), 5);
        assert!(!containment.auto_complete_on_all_objectives);
        assert!(containment.clue("patient_zero_chart").is_some());

        let briefing = campaign.cinematics.get(&"emergency_briefing".into()).unwrap();
        assert_eq!(briefing.scenes.len(), 5);
        assert!(briefing.scenes[3].decision_point.is_some());
        assert!(!briefing.skippable);

        let descent = campaign.cinematics.get(&"intro_descent".into()).unwrap();
        assert!(descent.skippable);
    }

    #[test]
    fn test_true_cure_is_first_match() {
        let campaign = quantum_salvation();
        let mut state = StoryState::new("limbo", 72.0 * 3600.0);

        state.advance_research(100.0);
        state.adjust_stabilization(80.0);
        state.collect_evidence("quantum_resonance_scan", "Resonance scan.", 0.0);
        state.collect_evidence("patient_zero_genome", "Genome.", 0.0);
        state.set_flag("cure_formula_discovered", FlagValue::Bool(true));
        state.set_flag("facility_secured", FlagValue::Bool(true));

        // quantum_ascension's requirements also hold; table order decides.
        assert_eq!(campaign.endings.determine(&state), "true_cure".into());
        assert!(campaign.endings.possible(&state).len() >= 2);
    }

    #[test]
    fn test_fresh_state_falls_back() {
        let campaign = quantum_salvation();
        let state = StoryState::new("limbo", 72.0 * 3600.0);
        // Severity 0 but research below 50, so quiet_containment fails too.
        assert_eq!(
            campaign.endings.determine(&state),
            "emergency_solution".into()
        );
    }
}
