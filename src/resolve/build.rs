//! Build-phase resolution.
//!
//! After the autumn turn each player may raise one unit per supply center
//! it owns beyond its current unit count. Surplus units are never
//! disbanded.

use std::collections::BTreeMap;

use crate::board::{BuildOrder, GameState, Map, PlayerId, TerritoryId, Unit, UnitId, UnitKind};

use super::outcome::{BuildRejection, RejectedBuild};

/// Builds the player may still make: owned supply centers minus units.
pub fn build_credits(map: &Map, state: &GameState, player: PlayerId) -> usize {
    state
        .supply_centers(map, player)
        .saturating_sub(state.units_of(player))
}

/// The accepted and rejected builds of one build phase.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildResolution {
    /// New units with fresh ids, in submission order.
    pub built: Vec<Unit>,
    pub rejected: Vec<RejectedBuild>,
}

/// Checks build orders in submission order and assigns ids to the accepted
/// ones, starting at `state.next_unit_id()`.
pub fn resolve_builds(map: &Map, state: &GameState, orders: &[BuildOrder]) -> BuildResolution {
    let mut credits: BTreeMap<PlayerId, usize> = BTreeMap::new();
    let mut placed: BTreeMap<TerritoryId, PlayerId> = BTreeMap::new();
    let mut next = state.next_unit_id().0;
    let mut resolution = BuildResolution::default();

    for order in orders {
        let remaining = credits
            .entry(order.player)
            .or_insert_with(|| build_credits(map, state, order.player));

        let check = check_build(map, state, order).and_then(|()| {
            if let Some(other) = placed.get(&order.territory).filter(|p| **p != order.player) {
                tracing::debug!(territory = %order.territory, %other, "territory already taken by a build");
                return Err(BuildRejection::Occupied);
            }
            if *remaining == 0 {
                return Err(BuildRejection::NoCredits);
            }
            Ok(())
        });

        match check {
            Ok(()) => {
                *remaining -= 1;
                placed.insert(order.territory, order.player);
                let unit = Unit {
                    id: UnitId(next),
                    owner: order.player,
                    kind: order.kind,
                    location: order.territory,
                };
                next += 1;
                tracing::debug!(unit = %unit.id, player = %order.player, at = %order.territory, kind = order.kind.name(), "unit built");
                resolution.built.push(unit);
            }
            Err(reason) => {
                tracing::debug!(player = %order.player, at = %order.territory, ?reason, "build rejected");
                resolution.rejected.push(RejectedBuild { order: *order, reason });
            }
        }
    }

    resolution
}

fn check_build(map: &Map, state: &GameState, order: &BuildOrder) -> Result<(), BuildRejection> {
    let territory = map.territory(order.territory).ok_or(BuildRejection::UnknownTerritory)?;
    if !order.kind.can_enter(territory) {
        return Err(BuildRejection::Terrain);
    }
    match order.kind {
        UnitKind::Land | UnitKind::Plane => {
            if state.owner(territory.id) != Some(order.player) {
                return Err(BuildRejection::NotOwned);
            }
            if order.kind == UnitKind::Plane && !territory.is_air_base {
                return Err(BuildRejection::NeedsAirBase);
            }
        }
        UnitKind::Boat => {
            let borders_own = territory
                .adjacent
                .iter()
                .any(|n| state.owner(*n) == Some(order.player));
            if !borders_own {
                return Err(BuildRejection::NotCoastal);
            }
        }
    }
    match state.occupant(territory.id) {
        Some(occupant) if occupant != order.player => Err(BuildRejection::Occupied),
        _ => Ok(()),
    }
}
