//! State application.
//!
//! The only stage that mutates `GameState`. A phase's outcomes are first
//! turned into a complete new board (units, ownership, pending retreats),
//! checked against the board invariants, and then swapped in with a single
//! `GameState::commit`. A violated invariant is an adjudication bug and
//! panics before anything is written.

use std::collections::{BTreeMap, BTreeSet};

use crate::board::{GameState, Map, PendingRetreat, PlayerId, TerritoryId, Unit, UnitId};

use super::combat::CombatReport;
use super::outcome::{Outcome, OwnershipChange, UnitOutcome};

/// Everything one phase changes, before it is committed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transition {
    /// One outcome per unit on the board, per pending retreat and per built unit.
    pub outcomes: Vec<UnitOutcome>,
    pub ownership: Vec<OwnershipChange>,
    /// Units that leave the board to wait for a retreat order.
    pub retreats: Vec<PendingRetreat>,
    pub built: Vec<Unit>,
}

/// Territories taken by successful moves, in territory-id order.
///
/// Only non-water territories change hands, and only when the entering
/// unit's owner is not already the owner.
pub fn conquests(map: &Map, state: &GameState, combat: &CombatReport) -> Vec<OwnershipChange> {
    let mut taken: BTreeMap<TerritoryId, PlayerId> = BTreeMap::new();
    for (id, target) in &combat.moved {
        let Some(unit) = state.unit(*id) else { continue };
        if map.territory(*target).map_or(true, |t| t.is_water) {
            continue;
        }
        if let Some(other) = taken.insert(*target, unit.owner) {
            assert_eq!(
                other, unit.owner,
                "{target} entered by units of both {other} and {}",
                unit.owner
            );
        }
    }

    taken
        .into_iter()
        .filter_map(|(territory, owner)| {
            let previous = state.owner(territory);
            (previous != Some(owner)).then_some(OwnershipChange {
                territory,
                previous,
                owner,
            })
        })
        .collect()
}

/// The ownership table with `changes` applied.
pub fn owners_after(state: &GameState, changes: &[OwnershipChange]) -> BTreeMap<TerritoryId, PlayerId> {
    let mut owners = state.owners_map().clone();
    for change in changes {
        owners.insert(change.territory, change.owner);
    }
    owners
}

/// Commits a transition and returns its outcomes in unit-id order together
/// with its ownership changes.
///
/// # Panics
///
/// If a unit has no outcome or more than one, if an outcome names a unit
/// that does not exist, if a dislodged unit has no pending retreat, or if
/// the new board puts units of two players in one territory.
pub fn apply(state: &mut GameState, transition: Transition) -> (Vec<UnitOutcome>, Vec<OwnershipChange>) {
    let Transition {
        mut outcomes,
        ownership,
        retreats,
        built,
    } = transition;

    outcomes.sort_by_key(|o| o.unit);
    for pair in outcomes.windows(2) {
        assert!(pair[0].unit != pair[1].unit, "unit {} has two outcomes", pair[0].unit);
    }

    let mut before: BTreeMap<UnitId, Unit> = state.units_map().clone();
    for retreat in state.retreats_map().values() {
        before.insert(retreat.unit.id, retreat.unit);
    }
    for unit in &built {
        let previous = before.insert(unit.id, *unit);
        assert!(previous.is_none(), "built unit {} reuses a live id", unit.id);
    }
    let outcome_ids: BTreeSet<UnitId> = outcomes.iter().map(|o| o.unit).collect();
    let before_ids: BTreeSet<UnitId> = before.keys().copied().collect();
    assert!(
        outcome_ids == before_ids,
        "outcomes cover {:?} but the board holds {:?}",
        outcome_ids,
        before_ids
    );

    let pending: BTreeMap<UnitId, PendingRetreat> = retreats.into_iter().map(|r| (r.unit.id, r)).collect();
    let mut units = BTreeMap::new();
    for UnitOutcome { unit: id, outcome } in &outcomes {
        let Some(unit) = before.get(id) else { continue };
        match outcome.final_location() {
            Some(location) => {
                units.insert(*id, Unit { location, ..*unit });
            }
            None => {
                if let Outcome::Dislodged { .. } = outcome {
                    assert!(pending.contains_key(id), "dislodged unit {id} has no pending retreat");
                }
            }
        }
    }
    for id in pending.keys() {
        assert!(
            matches!(outcomes.iter().find(|o| o.unit == *id).map(|o| o.outcome), Some(Outcome::Dislodged { .. })),
            "pending retreat for {id} without a dislodged outcome"
        );
    }

    let mut holders: BTreeMap<TerritoryId, PlayerId> = BTreeMap::new();
    for unit in units.values() {
        if let Some(other) = holders.insert(unit.location, unit.owner) {
            assert_eq!(
                other, unit.owner,
                "{} would hold units of both {other} and {}",
                unit.location, unit.owner
            );
        }
    }

    let owners = owners_after(state, &ownership);
    state.commit(units, owners, pending);

    (outcomes, ownership)
}
