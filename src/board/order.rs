//! Order types for all phases.
//!
//! Movement turns take an `OrderSet` holding at most one `Order` per unit; a
//! unit without an order holds. Retreat and build phases take flat lists of
//! `RetreatOrder` and `BuildOrder`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::territory::TerritoryId;
use super::unit::{PlayerId, UnitId, UnitKind};

/// A movement-phase order for one unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Order {
    /// Move into `target`.
    Move { target: TerritoryId },

    /// Add strength to `supported`, provided it ends up heading for `target`.
    Support {
        target: TerritoryId,
        supported: UnitId,
    },
}

/// One `(unit, order)` pair as it appears on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderEntry {
    pub unit: UnitId,
    #[serde(flatten)]
    pub order: Order,
}

/// The pending orders for one resolution pass, keyed by unit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<OrderEntry>", into = "Vec<OrderEntry>")]
pub struct OrderSet {
    orders: BTreeMap<UnitId, Order>,
}

impl OrderSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the order for a unit, returning the order it replaces.
    pub fn insert(&mut self, unit: UnitId, order: Order) -> Option<Order> {
        self.orders.insert(unit, order)
    }

    pub fn move_to(&mut self, unit: UnitId, target: TerritoryId) -> Option<Order> {
        self.insert(unit, Order::Move { target })
    }

    pub fn support(&mut self, unit: UnitId, target: TerritoryId, supported: UnitId) -> Option<Order> {
        self.insert(unit, Order::Support { target, supported })
    }

    /// Withdraws any order for the unit so that it holds.
    pub fn hold(&mut self, unit: UnitId) -> Option<Order> {
        self.orders.remove(&unit)
    }

    pub fn get(&self, unit: UnitId) -> Option<&Order> {
        self.orders.get(&unit)
    }

    /// Orders in unit-id order.
    pub fn iter(&self) -> impl Iterator<Item = (UnitId, &Order)> {
        self.orders.iter().map(|(u, o)| (*u, o))
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    pub fn clear(&mut self) {
        self.orders.clear();
    }
}

impl From<Vec<OrderEntry>> for OrderSet {
    fn from(entries: Vec<OrderEntry>) -> Self {
        let mut set = OrderSet::new();
        for e in entries {
            set.insert(e.unit, e.order);
        }
        set
    }
}

impl From<OrderSet> for Vec<OrderEntry> {
    fn from(set: OrderSet) -> Self {
        set.orders
            .into_iter()
            .map(|(unit, order)| OrderEntry { unit, order })
            .collect()
    }
}

/// A retreat-phase choice: a destination, or `None` to disband.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RetreatOrder {
    pub unit: UnitId,
    pub to: Option<TerritoryId>,
}

/// A build-phase request to raise a new unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BuildOrder {
    pub player: PlayerId,
    pub territory: TerritoryId,
    pub kind: UnitKind,
}
