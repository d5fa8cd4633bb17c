//! Order resolution.
//!
//! Runs one phase to completion as a strict pipeline:
//! validation, support, combat and retreats compute the phase's result
//! from the unchanged state, then `apply` commits it in one step and the
//! state moves on to the next phase.

pub mod apply;
pub mod build;
pub mod combat;
pub mod outcome;
pub mod phase;
pub mod retreat;
pub mod support;
pub mod validate;

pub use apply::{apply, conquests, owners_after, Transition};
pub use build::{build_credits, resolve_builds, BuildResolution};
pub use combat::{resolve_combat, CombatReport, Dislodgement};
pub use outcome::{
    BattleReport, BuildRejection, DestroyReason, Outcome, OwnershipChange, RejectedBuild, SupportReport,
    SupportStatus, TurnResult, UnitOutcome, Verdict, VoidReason, VoidedOrder,
};
pub use phase::{advance, next_phase, victor};
pub use retreat::{freeze_retreats, resolve_retreats, resolve_retreats_auto};
pub use support::{resolve_supports, SupportTally};
pub use validate::{validate_orders, SupportOrder, ValidOrders};

use crate::board::{BuildOrder, GameState, Map, OrderSet, Phase, RetreatOrder, Turn};
use crate::config::{EngineConfig, RetreatMode};

/// The pure part of a movement turn: everything decided before any state
/// changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Adjudication {
    pub valid: ValidOrders,
    pub voided: Vec<VoidedOrder>,
    pub supports: SupportTally,
    pub combat: CombatReport,
}

/// Validates the orders and settles supports and battles without touching
/// the state.
pub fn adjudicate(map: &Map, state: &GameState, orders: &OrderSet) -> Adjudication {
    let (valid, voided) = validate_orders(map, state, orders);
    let supports = resolve_supports(state, &valid);
    let combat = resolve_combat(state, &valid, &supports);
    Adjudication {
        valid,
        voided,
        supports,
        combat,
    }
}

/// Resolves a movement phase, commits it, clears `orders` and advances the
/// state to the following phase.
///
/// # Panics
///
/// If the state is not in the movement phase, or if resolution breaks a
/// board invariant.
pub fn resolve_turn(map: &Map, state: &mut GameState, orders: &mut OrderSet, config: &EngineConfig) -> TurnResult {
    assert_eq!(state.phase, Phase::Movement, "resolve_turn called outside the movement phase");
    let Adjudication {
        voided,
        supports,
        combat,
        ..
    } = adjudicate(map, state, orders);

    let ownership = conquests(map, state, &combat);
    let mut transition = Transition {
        ownership,
        ..Transition::default()
    };

    match config.retreats {
        RetreatMode::Automatic => {
            let owners = owners_after(state, &transition.ownership);
            transition
                .outcomes
                .extend(resolve_retreats_auto(map, state, &combat, &owners));
        }
        RetreatMode::Deferred => {
            let (pending, destroyed) = freeze_retreats(map, state, &combat);
            for retreat in &pending {
                transition.outcomes.push(UnitOutcome {
                    unit: retreat.unit.id,
                    outcome: Outcome::Dislodged {
                        from: retreat.unit.location,
                        attacker_from: retreat.attacker_from,
                    },
                });
            }
            transition.outcomes.extend(destroyed);
            transition.retreats = pending;
        }
    }

    for unit in state.units() {
        if combat.dislodged.contains_key(&unit.id) {
            continue;
        }
        let outcome = match combat.moved.get(&unit.id) {
            Some(to) => Outcome::HeldOrMoved { to: *to },
            None if combat.bounced.contains(&unit.id) => Outcome::Bounced {
                back_to: unit.location,
            },
            None => Outcome::HeldOrMoved { to: unit.location },
        };
        transition.outcomes.push(UnitOutcome { unit: unit.id, outcome });
    }

    let mut result = finish(map, state, config, transition);
    result.supports = supports.into_reports();
    result.voided = voided;
    result.battles = combat.battles;
    orders.clear();

    tracing::info!(
        turn = %result.turn,
        moved = combat.moved.len(),
        bounced = combat.bounced.len(),
        dislodged = combat.dislodged.len(),
        captured = result.ownership.len(),
        "movement resolved"
    );
    result
}

/// Resolves a retreat phase from the owners' choices.
///
/// # Panics
///
/// If the state is not in the retreat phase.
pub fn resolve_retreat_phase(map: &Map, state: &mut GameState, orders: &[RetreatOrder], config: &EngineConfig) -> TurnResult {
    assert_eq!(state.phase, Phase::Retreat, "resolve_retreat_phase called outside the retreat phase");
    let mut transition = Transition {
        outcomes: resolve_retreats(state, orders),
        ..Transition::default()
    };
    transition.outcomes.extend(holding(state));

    let result = finish(map, state, config, transition);
    tracing::info!(turn = %result.turn, "retreats resolved");
    result
}

/// Resolves a build phase.
///
/// # Panics
///
/// If the state is not in the build phase.
pub fn resolve_build_phase(map: &Map, state: &mut GameState, orders: &[BuildOrder], config: &EngineConfig) -> TurnResult {
    assert_eq!(state.phase, Phase::Build, "resolve_build_phase called outside the build phase");
    let BuildResolution { built, rejected } = resolve_builds(map, state, orders);
    let mut transition = Transition::default();
    transition.outcomes.extend(holding(state));
    transition.outcomes.extend(built.iter().map(|u| UnitOutcome {
        unit: u.id,
        outcome: Outcome::Built { at: u.location },
    }));
    transition.built = built;

    let mut result = finish(map, state, config, transition);
    result.rejected_builds = rejected;
    tracing::info!(turn = %result.turn, built = result.outcomes.iter().filter(|o| matches!(o.outcome, Outcome::Built { .. })).count(), "builds resolved");
    result
}

fn holding(state: &GameState) -> impl Iterator<Item = UnitOutcome> + '_ {
    state.units().map(|u| UnitOutcome {
        unit: u.id,
        outcome: Outcome::HeldOrMoved { to: u.location },
    })
}

/// Commits the transition, advances the phase and fills in the common
/// fields of the result.
fn finish(map: &Map, state: &mut GameState, config: &EngineConfig, transition: Transition) -> TurnResult {
    let (turn, phase): (Turn, Phase) = (state.turn, state.phase);
    let (outcomes, ownership) = apply(state, transition);
    advance(state, config);

    let mut result = TurnResult::new(turn, phase);
    result.outcomes = outcomes;
    result.ownership = ownership;
    result.victor = config
        .victory_supply_centers
        .and_then(|threshold| victor(map, state, threshold));
    if let Some(player) = result.victor {
        tracing::info!(%player, "victory");
    }
    result
}
