//! Phase sequencing logic.
//!
//! Determines the phase that follows a committed resolution and checks for
//! a victor.
//!
//! Phase flow:
//! - Movement -> Retreat (if units wait for a retreat order)
//! - Movement / Retreat -> Build (autumn, when builds are enabled)
//! - otherwise -> next turn's Movement
//! - Build -> next spring's Movement

use crate::board::{GameState, Map, Phase, PlayerId, Season, Turn};
use crate::config::EngineConfig;

/// Computes the turn and phase that follow `phase` of `turn`.
pub fn next_phase(turn: Turn, phase: Phase, has_retreats: bool, config: &EngineConfig) -> (Turn, Phase) {
    match phase {
        Phase::Movement if has_retreats => (turn, Phase::Retreat),
        Phase::Movement | Phase::Retreat => {
            if turn.season == Season::Autumn && config.builds {
                (turn, Phase::Build)
            } else {
                (turn.next(), Phase::Movement)
            }
        }
        Phase::Build => (turn.next(), Phase::Movement),
    }
}

/// Moves the state to the phase that follows the one just committed.
pub fn advance(state: &mut GameState, config: &EngineConfig) {
    let has_retreats = state.pending_retreats().next().is_some();
    let (turn, phase) = next_phase(state.turn, state.phase, has_retreats, config);
    if turn != state.turn {
        tracing::info!(from = %state.turn, to = %turn, "new turn");
    }
    state.turn = turn;
    state.phase = phase;
}

/// The only player owning at least `threshold` supply centers, if any.
pub fn victor(map: &Map, state: &GameState, threshold: usize) -> Option<PlayerId> {
    let mut leaders = state
        .players()
        .into_iter()
        .filter(|p| state.supply_centers(map, *p) >= threshold);
    match (leaders.next(), leaders.next()) {
        (Some(player), None) => Some(player),
        _ => None,
    }
}
