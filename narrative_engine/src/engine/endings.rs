//! Ending-path heuristic - the running outcome label.
//!
//! Recomputed after every decision. The steps apply strictly in sequence:
//! decision-kind counts pick the two axes, then the `sacrificed_team`
//! override, then the `saved_everyone` override, then the research floor.

use story_rules::{DecisionKind, EndingPath, StoryState};

/// Research progress below this forces the `failure` path.
const RESEARCH_FLOOR: f32 = 30.0;

/// Compute the ending path from the decision history and world state.
pub(crate) fn recompute_path(state: &StoryState) -> EndingPath {
    let mut altruistic = 0_u32;
    let mut pragmatic = 0_u32;
    let mut risky = 0_u32;
    let mut careful = 0_u32;

    for decision in &state.decisions {
        match decision.kind {
            Some(DecisionKind::Altruistic) => altruistic += 1,
            Some(DecisionKind::Pragmatic) => pragmatic += 1,
            Some(DecisionKind::Risky) => risky += 1,
            Some(DecisionKind::Careful) => careful += 1,
            None => {}
        }
    }

    let mut path = if state.decisions.is_empty() {
        EndingPath::Unresolved
    } else {
        // Ties go humanitarian on the first axis and cautious on the second.
        let humanitarian = altruistic >= pragmatic;
        let bold = risky > careful;
        match (humanitarian, bold) {
            (true, true) => EndingPath::CompassionateHero,
            (true, false) => EndingPath::CarefulGuardian,
            (false, true) => EndingPath::BoldPragmatist,
            (false, false) => EndingPath::CalculatedSurvivor,
        }
    };

    if state.flag_truthy("sacrificed_team") {
        path = EndingPath::Ruthless;
    }
    if state.flag_truthy("saved_everyone") {
        path = EndingPath::Heroic;
    }
    if state.world.research_progress < RESEARCH_FLOOR {
        path = EndingPath::Failure;
    }
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use story_rules::FlagValue;

    fn state_with_research() -> StoryState {
        let mut state = StoryState::new("limbo", 72.0 * 3600.0);
        state.advance_research(50.0);
        state
    }

    #[test]
    fn test_axes_from_decision_counts() {
        let mut state = state_with_research();
        state.record_decision("d1", "a", Some(DecisionKind::Altruistic));
        state.record_decision("d2", "b", Some(DecisionKind::Risky));
        assert_eq!(recompute_path(&state), EndingPath::CompassionateHero);

        state.record_decision("d3", "c", Some(DecisionKind::Pragmatic));
        state.record_decision("d4", "d", Some(DecisionKind::Pragmatic));
        state.record_decision("d5", "e", Some(DecisionKind::Careful));
        state.record_decision("d6", "f", Some(DecisionKind::Careful));
        assert_eq!(recompute_path(&state), EndingPath::CalculatedSurvivor);
    }

    #[test]
    fn test_ties_go_humanitarian_and_cautious() {
        let mut state = state_with_research();
        state.record_decision("d1", "a", Some(DecisionKind::Altruistic));
        state.record_decision("d2", "b", Some(DecisionKind::Pragmatic));
        assert_eq!(recompute_path(&state), EndingPath::CarefulGuardian);
    }

    #[test]
    fn test_flag_overrides_apply_in_sequence() {
        let mut state = state_with_research();
        state.record_decision("d1", "a", Some(DecisionKind::Altruistic));

        state.set_flag("sacrificed_team", FlagValue::Bool(true));
        assert_eq!(recompute_path(&state), EndingPath::Ruthless);

        // saved_everyone is applied after sacrificed_team and wins.
        state.set_flag("saved_everyone", FlagValue::Bool(true));
        assert_eq!(recompute_path(&state), EndingPath::Heroic);
    }

    #[test]
    fn test_research_floor_forces_failure() {
        let mut state = StoryState::new("limbo", 72.0 * 3600.0);
        state.record_decision("d1", "a", Some(DecisionKind::Altruistic));
        state.set_flag("saved_everyone", FlagValue::Bool(true));
        // Research 0 < 30 overrides everything, including the heroic flag.
        assert_eq!(recompute_path(&state), EndingPath::Failure);
    }

    #[test]
    fn test_no_decisions_is_unresolved() {
        let state = state_with_research();
        assert_eq!(recompute_path(&state), EndingPath::Unresolved);
    }
}
