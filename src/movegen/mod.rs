//! Legal move generation.
//!
//! Capability predicates and reachability used both to void illegal orders
//! during adjudication and by order-collection front ends to list choices.

pub mod movement;
pub mod retreat;

pub use movement::{check_move, land_bridge, legal_moves, Illegal, Route};
pub use retreat::retreat_options;

use crate::board::{GameState, Map, PlayerId, TerritoryId, UnitId};

/// Lists the legal move targets of every unit the player owns, in unit-id order.
pub fn legal_moves_for(map: &Map, state: &GameState, player: PlayerId) -> Vec<(UnitId, Vec<TerritoryId>)> {
    state
        .units()
        .filter(|u| u.owner == player)
        .map(|u| (u.id, legal_moves(map, state, u)))
        .collect()
}
