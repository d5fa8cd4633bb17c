//! Territory identity and static metadata.
//!
//! Territories are interned into dense `TerritoryId`s when a map is loaded.
//! The id doubles as an index into the map's territory table, and its
//! ordering is the engine's canonical iteration order.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable key of a territory, assigned in definition order at map load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TerritoryId(pub u16);

impl TerritoryId {
    /// Returns the index of this territory in the map's table.
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for TerritoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t{}", self.0)
    }
}

/// Static description of a territory.
///
/// Ownership is dynamic and lives in `GameState`, not here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Territory {
    pub id: TerritoryId,
    pub name: String,
    pub is_water: bool,
    pub is_supply_center: bool,
    pub is_air_base: bool,
    pub adjacent: BTreeSet<TerritoryId>,
}

impl Territory {
    /// Returns true if `other` shares a border with this territory.
    pub fn borders(&self, other: TerritoryId) -> bool {
        self.adjacent.contains(&other)
    }

    /// Returns true if any neighbour is water.
    pub fn is_coastal(&self, map: &super::Map) -> bool {
        self.adjacent
            .iter()
            .filter_map(|&n| map.territory(n))
            .any(|n| n.is_water)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_order_by_index() {
        assert!(TerritoryId(2) < TerritoryId(10));
        assert_eq!(TerritoryId(7).index(), 7);
        assert_eq!(TerritoryId(7).to_string(), "t7");
    }

    #[test]
    fn borders_reads_adjacency() {
        let t = Territory {
            id: TerritoryId(0),
            name: "alpha".into(),
            is_water: false,
            is_supply_center: true,
            is_air_base: false,
            adjacent: [TerritoryId(1)].into_iter().collect(),
        };
        assert!(t.borders(TerritoryId(1)));
        assert!(!t.borders(TerritoryId(2)));
    }
}
