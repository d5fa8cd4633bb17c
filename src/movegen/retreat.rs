//! Retreat destination generation.
//!
//! Enumerates the territories a dislodged unit may fall back to.

use std::collections::BTreeSet;

use crate::board::{Map, TerritoryId, UnitKind};

/// Returns the legal retreat destinations for a unit of `kind` dislodged
/// from `from`, in id order.
///
/// A destination must border `from`, admit the unit's kind, be empty once
/// the turn's moves are done (`occupied`), and must not have seen a
/// standoff this turn (`standoffs`).
pub fn retreat_options(
    map: &Map,
    kind: UnitKind,
    from: TerritoryId,
    occupied: &BTreeSet<TerritoryId>,
    standoffs: &BTreeSet<TerritoryId>,
) -> Vec<TerritoryId> {
    map.neighbours(from)
        .filter(|n| *n != from)
        .filter(|n| map.territory(*n).is_some_and(|t| kind.can_enter(t)))
        .filter(|n| !occupied.contains(n))
        .filter(|n| !standoffs.contains(n))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{MapDefinition, TerritoryDef};

    fn map() -> Map {
        let def = MapDefinition::new()
            .with(TerritoryDef::land("keep").adjacent(&["field", "hill", "bay"]))
            .with(TerritoryDef::land("field"))
            .with(TerritoryDef::land("hill"))
            .with(TerritoryDef::water("bay"));
        Map::from_definition(&def).unwrap()
    }

    #[test]
    fn land_unit_retreats_to_empty_land() {
        let map = map();
        let keep = map.id("keep").unwrap();
        let options = retreat_options(&map, UnitKind::Land, keep, &BTreeSet::new(), &BTreeSet::new());
        assert_eq!(options, vec![map.id("field").unwrap(), map.id("hill").unwrap()]);
    }

    #[test]
    fn occupied_and_standoff_territories_are_excluded() {
        let map = map();
        let keep = map.id("keep").unwrap();
        let occupied = [map.id("field").unwrap()].into_iter().collect();
        let standoffs = [map.id("hill").unwrap()].into_iter().collect();
        let options = retreat_options(&map, UnitKind::Land, keep, &occupied, &standoffs);
        assert!(options.is_empty());
    }

    #[test]
    fn boats_only_retreat_to_water() {
        let map = map();
        let keep = map.id("keep").unwrap();
        let options = retreat_options(&map, UnitKind::Boat, keep, &BTreeSet::new(), &BTreeSet::new());
        assert_eq!(options, vec![map.id("bay").unwrap()]);
    }
}
