//! Retreat resolution.
//!
//! Dislodged units either fall back automatically as part of the movement
//! turn, or are lifted off the board and wait for their owner's choice in a
//! separate retreat phase. Both modes share the candidate rule of
//! `movegen::retreat_options`: an adjacent territory the unit can enter that
//! is empty after combat and saw no standoff. The territory the winning
//! attacker came from is never a candidate.

use std::collections::{BTreeMap, BTreeSet};

use crate::board::{GameState, Map, PendingRetreat, PlayerId, RetreatOrder, TerritoryId, UnitId, UnitKind};
use crate::movegen::retreat_options;

use super::combat::{CombatReport, Dislodgement};
use super::outcome::{DestroyReason, Outcome, UnitOutcome};

/// Places every dislodged unit in unit-id order.
///
/// Each unit takes a candidate its owner holds in `owners` if there is one,
/// otherwise the lowest-id candidate. A taken territory is no longer a
/// candidate for later units. A unit left without candidates is destroyed.
pub fn resolve_retreats_auto(
    map: &Map,
    state: &GameState,
    combat: &CombatReport,
    owners: &BTreeMap<TerritoryId, PlayerId>,
) -> Vec<UnitOutcome> {
    let mut occupied = combat.occupied(state);
    let mut outcomes = Vec::with_capacity(combat.dislodged.len());

    for (id, dislodgement) in &combat.dislodged {
        let Some(unit) = state.unit(*id) else { continue };
        let from = dislodgement.from;
        let options = candidates(map, unit.kind, dislodgement, &occupied, &combat.standoffs);
        let choice = options
            .iter()
            .find(|t| owners.get(t) == Some(&unit.owner))
            .or_else(|| options.first())
            .copied();

        let outcome = match choice {
            Some(to) => {
                occupied.insert(to);
                tracing::debug!(unit = %id, %from, %to, "retreat assigned");
                Outcome::Retreated { from, to }
            }
            None => {
                tracing::debug!(unit = %id, %from, "no retreat, unit destroyed");
                Outcome::Destroyed {
                    from,
                    reason: DestroyReason::NoRetreat,
                }
            }
        };
        outcomes.push(UnitOutcome { unit: *id, outcome });
    }

    outcomes
}

/// Freezes the retreat options of every dislodged unit for a later retreat
/// phase.
///
/// Units without any option are destroyed right away; the rest are returned
/// as pending retreats.
pub fn freeze_retreats(map: &Map, state: &GameState, combat: &CombatReport) -> (Vec<PendingRetreat>, Vec<UnitOutcome>) {
    let occupied = combat.occupied(state);
    let mut pending = Vec::new();
    let mut destroyed = Vec::new();

    for (id, dislodgement) in &combat.dislodged {
        let Some(unit) = state.unit(*id) else { continue };
        let options = candidates(map, unit.kind, dislodgement, &occupied, &combat.standoffs);
        if options.is_empty() {
            destroyed.push(UnitOutcome {
                unit: *id,
                outcome: Outcome::Destroyed {
                    from: dislodgement.from,
                    reason: DestroyReason::NoRetreat,
                },
            });
        } else {
            pending.push(PendingRetreat {
                unit: *unit,
                attacker_from: dislodgement.attacker_from,
                options,
            });
        }
    }

    (pending, destroyed)
}

fn candidates(
    map: &Map,
    kind: UnitKind,
    dislodgement: &Dislodgement,
    occupied: &BTreeSet<TerritoryId>,
    standoffs: &BTreeSet<TerritoryId>,
) -> Vec<TerritoryId> {
    let mut options = retreat_options(map, kind, dislodgement.from, occupied, standoffs);
    options.retain(|t| *t != dislodgement.attacker_from);
    options
}

/// Resolves the owners' retreat choices for every pending retreat.
///
/// - no order: destroyed (`NoRetreatOrder`)
/// - an explicit disband (`to: None`): destroyed (`Disbanded`)
/// - a destination outside the frozen options: destroyed (`IllegalRetreat`)
/// - two or more units picking the same destination: all destroyed
///   (`RetreatCollision`)
///
/// Only the first order per unit counts. Returns one outcome per pending
/// retreat, in unit-id order.
pub fn resolve_retreats(state: &GameState, orders: &[RetreatOrder]) -> Vec<UnitOutcome> {
    let mut chosen: BTreeMap<UnitId, Option<TerritoryId>> = BTreeMap::new();
    for order in orders {
        if state.pending_retreat(order.unit).is_none() {
            tracing::warn!(unit = %order.unit, "retreat order for a unit that is not retreating, ignored");
            continue;
        }
        if chosen.contains_key(&order.unit) {
            tracing::debug!(unit = %order.unit, "duplicate retreat order ignored");
            continue;
        }
        chosen.insert(order.unit, order.to);
    }

    let mut claims: BTreeMap<TerritoryId, usize> = BTreeMap::new();
    for retreat in state.pending_retreats() {
        if let Some(Some(to)) = chosen.get(&retreat.unit.id) {
            if retreat.options.contains(to) {
                *claims.entry(*to).or_default() += 1;
            }
        }
    }
    let contested: BTreeSet<TerritoryId> = claims.into_iter().filter(|(_, n)| *n > 1).map(|(t, _)| t).collect();

    state
        .pending_retreats()
        .map(|retreat| {
            let from = retreat.unit.location;
            let destroyed = |reason| Outcome::Destroyed { from, reason };
            let outcome = match chosen.get(&retreat.unit.id) {
                None => destroyed(DestroyReason::NoRetreatOrder),
                Some(None) => destroyed(DestroyReason::Disbanded),
                Some(Some(to)) if !retreat.options.contains(to) => destroyed(DestroyReason::IllegalRetreat),
                Some(Some(to)) if contested.contains(to) => destroyed(DestroyReason::RetreatCollision),
                Some(Some(to)) => Outcome::Retreated { from, to: *to },
            };
            tracing::debug!(unit = %retreat.unit.id, ?outcome, "retreat resolved");
            UnitOutcome {
                unit: retreat.unit.id,
                outcome,
            }
        })
        .collect()
}
