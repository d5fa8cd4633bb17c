//! Unit kinds, identities and ownership.
//!
//! Represents land units, boats and planes, their owning player, and their
//! current territory.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::territory::{Territory, TerritoryId};

/// A player seat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub u32);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "p{}", self.0)
    }
}

/// Stable identity of a unit for its whole lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnitId(pub u32);

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "u{}", self.0)
    }
}

/// The kind of a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitKind {
    Land,
    Boat,
    Plane,
}

impl UnitKind {
    /// Returns whether a unit of this kind may stand in the territory.
    ///
    /// Boats need water; land units and planes need land.
    pub fn can_enter(self, territory: &Territory) -> bool {
        match self {
            UnitKind::Boat => territory.is_water,
            UnitKind::Land | UnitKind::Plane => !territory.is_water,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            UnitKind::Land => "land",
            UnitKind::Boat => "boat",
            UnitKind::Plane => "plane",
        }
    }
}

/// A unit on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Unit {
    pub id: UnitId,
    pub owner: PlayerId,
    pub kind: UnitKind,
    pub location: TerritoryId,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn territory(is_water: bool) -> Territory {
        Territory {
            id: TerritoryId(0),
            name: "x".into(),
            is_water,
            is_supply_center: false,
            is_air_base: false,
            adjacent: BTreeSet::new(),
        }
    }

    #[test]
    fn boats_need_water() {
        assert!(UnitKind::Boat.can_enter(&territory(true)));
        assert!(!UnitKind::Boat.can_enter(&territory(false)));
    }

    #[test]
    fn land_and_planes_need_land() {
        for kind in [UnitKind::Land, UnitKind::Plane] {
            assert!(kind.can_enter(&territory(false)));
            assert!(!kind.can_enter(&territory(true)));
        }
    }

    #[test]
    fn kind_serializes_snake_case() {
        assert_eq!(serde_json::to_string(&UnitKind::Plane).unwrap(), "\"plane\"");
        let k: UnitKind = serde_json::from_str("\"boat\"").unwrap();
        assert_eq!(k, UnitKind::Boat);
    }
}
