//! Game state representation.
//!
//! Holds the dynamic half of a game: unit positions, territory ownership,
//! units waiting to retreat, and the current turn and phase. The static
//! territory graph lives in `Map`.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::map::Map;
use super::territory::TerritoryId;
use super::unit::{PlayerId, Unit, UnitId, UnitKind};

/// The season of a game turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Season {
    Spring,
    Autumn,
}

/// A point on the game calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Turn {
    pub year: u16,
    pub season: Season,
}

impl Turn {
    /// The spring turn of the given year.
    pub const fn spring(year: u16) -> Self {
        Turn {
            year,
            season: Season::Spring,
        }
    }

    /// The following turn: Spring -> Autumn -> next year's Spring.
    pub const fn next(self) -> Turn {
        match self.season {
            Season::Spring => Turn {
                year: self.year,
                season: Season::Autumn,
            },
            Season::Autumn => Turn::spring(self.year.saturating_add(1)),
        }
    }
}

impl fmt::Display for Turn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let season = match self.season {
            Season::Spring => "Spring",
            Season::Autumn => "Autumn",
        };
        write!(f, "{} {}", season, self.year)
    }
}

/// The phase within a game turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Movement,
    Retreat,
    Build,
}

/// A dislodged unit lifted off the board until its owner picks a retreat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingRetreat {
    /// The unit as it stood when dislodged; `location` is the lost territory.
    pub unit: Unit,
    pub attacker_from: TerritoryId,
    /// Legal destinations, frozen at dislodgement.
    pub options: Vec<TerritoryId>,
}

/// Errors raised when placing units directly on the board.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("cannot place a unit of {player} in {territory}: held by {occupant}")]
    Occupied {
        player: PlayerId,
        territory: TerritoryId,
        occupant: PlayerId,
    },

    #[error("unit id {0} is already in use")]
    DuplicateUnit(UnitId),
}

/// Complete dynamic game state at a point in time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameState {
    pub turn: Turn,
    pub phase: Phase,
    owners: BTreeMap<TerritoryId, PlayerId>,
    units: BTreeMap<UnitId, Unit>,
    retreats: BTreeMap<UnitId, PendingRetreat>,
    next_unit_id: u32,
}

impl GameState {
    /// Creates an empty movement-phase state with no units or ownership.
    pub fn new(turn: Turn) -> Self {
        GameState {
            turn,
            phase: Phase::Movement,
            owners: BTreeMap::new(),
            units: BTreeMap::new(),
            retreats: BTreeMap::new(),
            next_unit_id: 0,
        }
    }

    pub fn owner(&self, territory: TerritoryId) -> Option<PlayerId> {
        self.owners.get(&territory).copied()
    }

    /// Sets or clears the owner of a territory.
    pub fn set_owner(&mut self, territory: TerritoryId, owner: Option<PlayerId>) {
        match owner {
            Some(p) => {
                self.owners.insert(territory, p);
            }
            None => {
                self.owners.remove(&territory);
            }
        }
    }

    /// Owned territories in id order.
    pub fn owners(&self) -> impl Iterator<Item = (TerritoryId, PlayerId)> + '_ {
        self.owners.iter().map(|(t, p)| (*t, *p))
    }

    pub fn unit(&self, id: UnitId) -> Option<&Unit> {
        self.units.get(&id)
    }

    /// Units on the board in id order.
    pub fn units(&self) -> impl Iterator<Item = &Unit> {
        self.units.values()
    }

    pub fn unit_count(&self) -> usize {
        self.units.len()
    }

    /// Units standing in a territory, in id order.
    pub fn units_at(&self, territory: TerritoryId) -> impl Iterator<Item = &Unit> {
        self.units.values().filter(move |u| u.location == territory)
    }

    /// The player whose units stand in the territory, if any.
    pub fn occupant(&self, territory: TerritoryId) -> Option<PlayerId> {
        self.units_at(territory).next().map(|u| u.owner)
    }

    /// Places a new unit with a fresh id.
    ///
    /// A player may stack several units in one territory, but never share a
    /// territory with another player. Terrain is not checked here.
    pub fn spawn(
        &mut self,
        owner: PlayerId,
        kind: UnitKind,
        location: TerritoryId,
    ) -> Result<UnitId, StateError> {
        let id = UnitId(self.next_unit_id);
        self.insert_unit(Unit {
            id,
            owner,
            kind,
            location,
        })?;
        Ok(id)
    }

    /// Places a unit with a caller-chosen id.
    pub fn insert_unit(&mut self, unit: Unit) -> Result<(), StateError> {
        if self.units.contains_key(&unit.id) || self.retreats.contains_key(&unit.id) {
            return Err(StateError::DuplicateUnit(unit.id));
        }
        if let Some(occupant) = self.occupant(unit.location) {
            if occupant != unit.owner {
                return Err(StateError::Occupied {
                    player: unit.owner,
                    territory: unit.location,
                    occupant,
                });
            }
        }
        self.units.insert(unit.id, unit);
        self.next_unit_id = self.next_unit_id.max(unit.id.0 + 1);
        Ok(())
    }

    /// Units waiting for a retreat order, in id order.
    pub fn pending_retreats(&self) -> impl Iterator<Item = &PendingRetreat> {
        self.retreats.values()
    }

    pub fn pending_retreat(&self, id: UnitId) -> Option<&PendingRetreat> {
        self.retreats.get(&id)
    }

    pub(crate) fn insert_retreat(&mut self, retreat: PendingRetreat) -> Result<(), StateError> {
        let id = retreat.unit.id;
        if self.units.contains_key(&id) || self.retreats.contains_key(&id) {
            return Err(StateError::DuplicateUnit(id));
        }
        self.next_unit_id = self.next_unit_id.max(id.0 + 1);
        self.retreats.insert(id, retreat);
        Ok(())
    }

    /// The id the next spawned unit will receive.
    pub fn next_unit_id(&self) -> UnitId {
        UnitId(self.next_unit_id)
    }

    pub(crate) fn set_next_unit_id(&mut self, next: UnitId) {
        self.next_unit_id = self.next_unit_id.max(next.0);
    }

    /// Number of supply centers the player owns.
    pub fn supply_centers(&self, map: &Map, player: PlayerId) -> usize {
        self.owners
            .iter()
            .filter(|(t, p)| **p == player && map.territory(**t).is_some_and(|t| t.is_supply_center))
            .count()
    }

    /// Number of units the player has on the board.
    pub fn units_of(&self, player: PlayerId) -> usize {
        self.units.values().filter(|u| u.owner == player).count()
    }

    /// Every player that owns a territory or a unit, in id order.
    pub fn players(&self) -> Vec<PlayerId> {
        let mut players: Vec<PlayerId> = self
            .owners
            .values()
            .copied()
            .chain(self.units.values().map(|u| u.owner))
            .chain(self.retreats.values().map(|r| r.unit.owner))
            .collect();
        players.sort();
        players.dedup();
        players
    }

    /// Swaps in a fully computed board in one step.
    pub(crate) fn commit(
        &mut self,
        units: BTreeMap<UnitId, Unit>,
        owners: BTreeMap<TerritoryId, PlayerId>,
        retreats: BTreeMap<UnitId, PendingRetreat>,
    ) {
        if let Some(max) = units.keys().chain(retreats.keys()).max() {
            self.next_unit_id = self.next_unit_id.max(max.0 + 1);
        }
        self.units = units;
        self.owners = owners;
        self.retreats = retreats;
    }

    pub(crate) fn units_map(&self) -> &BTreeMap<UnitId, Unit> {
        &self.units
    }

    pub(crate) fn owners_map(&self) -> &BTreeMap<TerritoryId, PlayerId> {
        &self.owners
    }

    pub(crate) fn retreats_map(&self) -> &BTreeMap<UnitId, PendingRetreat> {
        &self.retreats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const P1: PlayerId = PlayerId(1);
    const P2: PlayerId = PlayerId(2);

    #[test]
    fn turns_cycle_through_seasons() {
        let t = Turn::spring(1901);
        assert_eq!(t.next(), Turn { year: 1901, season: Season::Autumn });
        assert_eq!(t.next().next(), Turn::spring(1902));
        let last = Turn { year: u16::MAX, season: Season::Autumn };
        assert_eq!(last.next(), Turn::spring(u16::MAX));
        assert_eq!(t.next().to_string(), "Autumn 1901");
    }

    #[test]
    fn empty_state_has_no_units() {
        let state = GameState::new(Turn::spring(1901));
        assert_eq!(state.phase, Phase::Movement);
        assert_eq!(state.units().count(), 0);
        assert_eq!(state.owners().count(), 0);
        assert_eq!(state.pending_retreats().count(), 0);
    }

    #[test]
    fn spawn_assigns_increasing_ids() {
        let mut state = GameState::new(Turn::spring(1901));
        let a = state.spawn(P1, UnitKind::Land, TerritoryId(0)).unwrap();
        let b = state.spawn(P1, UnitKind::Land, TerritoryId(0)).unwrap();
        assert_eq!((a, b), (UnitId(0), UnitId(1)));
        assert_eq!(state.units_at(TerritoryId(0)).count(), 2);
        assert_eq!(state.occupant(TerritoryId(0)), Some(P1));
    }

    #[test]
    fn spawn_rejects_foreign_occupied_territory() {
        let mut state = GameState::new(Turn::spring(1901));
        state.spawn(P1, UnitKind::Land, TerritoryId(0)).unwrap();
        let err = state.spawn(P2, UnitKind::Land, TerritoryId(0)).unwrap_err();
        assert!(matches!(err, StateError::Occupied { occupant, .. } if occupant == P1));
    }

    #[test]
    fn insert_unit_rejects_duplicate_ids_and_bumps_counter() {
        let mut state = GameState::new(Turn::spring(1901));
        let unit = Unit {
            id: UnitId(7),
            owner: P1,
            kind: UnitKind::Boat,
            location: TerritoryId(3),
        };
        state.insert_unit(unit).unwrap();
        assert!(matches!(state.insert_unit(unit), Err(StateError::DuplicateUnit(UnitId(7)))));
        assert_eq!(state.next_unit_id(), UnitId(8));
    }

    #[test]
    fn ownership_can_be_set_and_cleared() {
        let mut state = GameState::new(Turn::spring(1901));
        state.set_owner(TerritoryId(2), Some(P2));
        assert_eq!(state.owner(TerritoryId(2)), Some(P2));
        state.set_owner(TerritoryId(2), None);
        assert_eq!(state.owner(TerritoryId(2)), None);
    }

    #[test]
    fn players_lists_owners_and_unit_holders() {
        let mut state = GameState::new(Turn::spring(1901));
        state.set_owner(TerritoryId(0), Some(P2));
        state.spawn(P1, UnitKind::Land, TerritoryId(1)).unwrap();
        assert_eq!(state.players(), vec![P1, P2]);
        assert_eq!(state.units_of(P1), 1);
        assert_eq!(state.units_of(P2), 0);
    }
}
