//! Order validation.
//!
//! Malformed orders never abort a turn. A move the unit cannot make, a
//! support of a unit that is gone, or an order naming a territory missing
//! from the map is voided: the unit holds and the order is reported with a
//! reason.

use std::collections::BTreeMap;

use crate::board::{GameState, Map, Order, OrderSet, TerritoryId, Unit, UnitId};
use crate::movegen::{check_move, Illegal};

use super::outcome::{VoidReason, VoidedOrder};

/// A support order that passed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SupportOrder {
    pub target: TerritoryId,
    pub supported: UnitId,
}

/// The orders that survived validation, keyed by unit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidOrders {
    pub moves: BTreeMap<UnitId, TerritoryId>,
    pub supports: BTreeMap<UnitId, SupportOrder>,
}

impl ValidOrders {
    /// Where the unit is heading: its move target, or its own territory.
    pub fn destination(&self, unit: &Unit) -> TerritoryId {
        self.moves.get(&unit.id).copied().unwrap_or(unit.location)
    }

    pub fn is_moving(&self, unit: UnitId) -> bool {
        self.moves.contains_key(&unit)
    }
}

/// Splits the order set into valid orders and voided ones.
pub fn validate_orders(map: &Map, state: &GameState, orders: &OrderSet) -> (ValidOrders, Vec<VoidedOrder>) {
    let mut valid = ValidOrders::default();
    let mut voided = Vec::new();

    for (id, order) in orders.iter() {
        match check_order(map, state, id, order) {
            Ok(()) => match *order {
                Order::Move { target } => {
                    valid.moves.insert(id, target);
                }
                Order::Support { target, supported } => {
                    valid.supports.insert(id, SupportOrder { target, supported });
                }
            },
            Err(reason) => {
                match reason {
                    VoidReason::UnknownUnit | VoidReason::UnknownTerritory => {
                        tracing::warn!(unit = %id, ?order, ?reason, "order references missing data, voided");
                    }
                    _ => tracing::debug!(unit = %id, ?order, ?reason, "order voided"),
                }
                voided.push(VoidedOrder {
                    unit: id,
                    order: *order,
                    reason,
                });
            }
        }
    }

    (valid, voided)
}

fn check_order(map: &Map, state: &GameState, id: UnitId, order: &Order) -> Result<(), VoidReason> {
    let unit = state.unit(id).ok_or(VoidReason::UnknownUnit)?;
    match *order {
        Order::Move { target } => check_move(map, state, unit, target)
            .map(|_| ())
            .map_err(VoidReason::from),
        Order::Support { target, supported } => {
            if !map.contains(target) || !map.contains(unit.location) {
                return Err(Illegal::UnknownTerritory.into());
            }
            if supported == id {
                return Err(VoidReason::SelfSupport);
            }
            if state.unit(supported).is_none() {
                return Err(VoidReason::UnknownSupportedUnit);
            }
            Ok(())
        }
    }
}
