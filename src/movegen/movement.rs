//! Movement legality.
//!
//! Decides whether a unit can reach a territory this turn and by which
//! route. Boats sail to adjacent water. Land units march to adjacent land,
//! or cross one stretch of water on a land bridge formed by a friendly boat.
//! Planes fly to adjacent land, or between any two air bases.

use serde::{Deserialize, Serialize};

use crate::board::{GameState, Map, TerritoryId, Unit, UnitKind};

/// How a legal move gets to its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "route", rename_all = "snake_case")]
pub enum Route {
    Adjacent,
    /// Across the water territory holding a friendly boat.
    LandBridge { via: TerritoryId },
    /// Between two air bases.
    AirBase,
}

/// Why a move is not legal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Illegal {
    /// The origin or the target is not on the map.
    UnknownTerritory,
    /// The target is the unit's own territory.
    Stationary,
    /// The unit's kind cannot stand in the target.
    Terrain,
    /// The target is not reachable in one move.
    OutOfRange,
}

/// Checks a move of `unit` into `target` against the pre-turn board.
pub fn check_move(map: &Map, state: &GameState, unit: &Unit, target: TerritoryId) -> Result<Route, Illegal> {
    let from = map.territory(unit.location).ok_or(Illegal::UnknownTerritory)?;
    let to = map.territory(target).ok_or(Illegal::UnknownTerritory)?;
    if from.id == to.id {
        return Err(Illegal::Stationary);
    }
    if !unit.kind.can_enter(to) {
        return Err(Illegal::Terrain);
    }
    if from.borders(to.id) {
        return Ok(Route::Adjacent);
    }
    match unit.kind {
        UnitKind::Boat => Err(Illegal::OutOfRange),
        UnitKind::Land => land_bridge(map, state, unit, target)
            .map(|via| Route::LandBridge { via })
            .ok_or(Illegal::OutOfRange),
        UnitKind::Plane => {
            if from.is_air_base && to.is_air_base {
                Ok(Route::AirBase)
            } else {
                Err(Illegal::OutOfRange)
            }
        }
    }
}

/// Returns the lowest-id water territory bordering both the land unit's
/// territory and `target` that holds a boat of the same owner.
///
/// Only a single hop is supported; boats do not chain.
pub fn land_bridge(map: &Map, state: &GameState, unit: &Unit, target: TerritoryId) -> Option<TerritoryId> {
    if unit.kind != UnitKind::Land {
        return None;
    }
    let from = map.territory(unit.location)?;
    let to = map.territory(target)?;
    if from.is_water || to.is_water {
        return None;
    }
    from.adjacent
        .iter()
        .copied()
        .filter(|w| to.borders(*w))
        .filter(|w| map.territory(*w).is_some_and(|t| t.is_water))
        .find(|w| {
            state
                .units_at(*w)
                .any(|b| b.kind == UnitKind::Boat && b.owner == unit.owner)
        })
}

/// Every territory the unit can legally move into, in id order.
pub fn legal_moves(map: &Map, state: &GameState, unit: &Unit) -> Vec<TerritoryId> {
    map.territories()
        .map(|t| t.id)
        .filter(|t| check_move(map, state, unit, *t).is_ok())
        .collect()
}
