//! Game snapshots.
//!
//! A snapshot is the persistence payload of a game: territory ownership,
//! every unit with its owner, kind and location, and the units waiting for
//! a retreat order. Territories are written by name so a snapshot stays
//! readable and survives re-ordering of the map file. Together with the map
//! it is enough to resume adjudication with a fresh order set.

use serde::{Deserialize, Serialize};

use crate::board::{GameState, Map, PendingRetreat, Phase, PlayerId, StateError, TerritoryId, Turn, Unit, UnitId, UnitKind};

/// Errors that can occur when restoring a snapshot.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("invalid snapshot: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unknown territory '{0}'")]
    UnknownTerritory(String),

    #[error("territory '{0}' is owned twice")]
    DuplicateOwner(String),

    #[error("water territory '{0}' cannot be owned")]
    OwnedWater(String),

    #[error("{kind} unit {unit} cannot stand in '{territory}'")]
    Terrain {
        unit: UnitId,
        kind: &'static str,
        territory: String,
    },

    #[error("unit {unit} cannot retreat to '{territory}'")]
    RetreatOption { unit: UnitId, territory: String },

    #[error("pending retreats in the {0:?} phase")]
    RetreatsOutsideRetreatPhase(Phase),

    #[error(transparent)]
    Placement(#[from] StateError),
}

/// Ownership of one territory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnerEntry {
    pub territory: String,
    pub owner: PlayerId,
}

/// One unit on the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitEntry {
    pub id: UnitId,
    pub owner: PlayerId,
    pub kind: UnitKind,
    pub location: String,
}

/// One unit waiting for a retreat order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetreatEntry {
    pub id: UnitId,
    pub owner: PlayerId,
    pub kind: UnitKind,
    /// The territory the unit was dislodged from.
    pub from: String,
    pub attacker_from: String,
    pub options: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub turn: Turn,
    pub phase: Phase,
    #[serde(default)]
    pub owners: Vec<OwnerEntry>,
    #[serde(default)]
    pub units: Vec<UnitEntry>,
    #[serde(default)]
    pub retreats: Vec<RetreatEntry>,
    /// The id the next built unit receives. Derived from the units when absent.
    #[serde(default)]
    pub next_unit_id: Option<UnitId>,
}

impl GameSnapshot {
    /// Records the state, naming territories through `map`.
    pub fn capture(map: &Map, state: &GameState) -> Self {
        let name = |t: TerritoryId| map.name(t).map_or_else(|| t.to_string(), str::to_owned);
        GameSnapshot {
            turn: state.turn,
            phase: state.phase,
            owners: state
                .owners()
                .map(|(territory, owner)| OwnerEntry {
                    territory: name(territory),
                    owner,
                })
                .collect(),
            units: state
                .units()
                .map(|u| UnitEntry {
                    id: u.id,
                    owner: u.owner,
                    kind: u.kind,
                    location: name(u.location),
                })
                .collect(),
            retreats: state
                .pending_retreats()
                .map(|r| RetreatEntry {
                    id: r.unit.id,
                    owner: r.unit.owner,
                    kind: r.unit.kind,
                    from: name(r.unit.location),
                    attacker_from: name(r.attacker_from),
                    options: r.options.iter().map(|t| name(*t)).collect(),
                })
                .collect(),
            next_unit_id: Some(state.next_unit_id()),
        }
    }

    /// Rebuilds the state, checking every entry against `map`.
    pub fn restore(&self, map: &Map) -> Result<GameState, SnapshotError> {
        let id = |name: &str| map.id(name).ok_or_else(|| SnapshotError::UnknownTerritory(name.to_owned()));

        let mut state = GameState::new(self.turn);
        state.phase = self.phase;
        if !self.retreats.is_empty() && self.phase != Phase::Retreat {
            return Err(SnapshotError::RetreatsOutsideRetreatPhase(self.phase));
        }

        for entry in &self.owners {
            let territory = id(entry.territory.as_str())?;
            if state.owner(territory).is_some() {
                return Err(SnapshotError::DuplicateOwner(entry.territory.clone()));
            }
            if map.territory(territory).is_some_and(|t| t.is_water) {
                return Err(SnapshotError::OwnedWater(entry.territory.clone()));
            }
            state.set_owner(territory, Some(entry.owner));
        }

        for entry in &self.units {
            let location = id(entry.location.as_str())?;
            check_terrain(map, entry.id, entry.kind, location, &entry.location)?;
            state.insert_unit(Unit {
                id: entry.id,
                owner: entry.owner,
                kind: entry.kind,
                location,
            })?;
        }

        for entry in &self.retreats {
            let from = id(entry.from.as_str())?;
            check_terrain(map, entry.id, entry.kind, from, &entry.from)?;
            let mut options = Vec::with_capacity(entry.options.len());
            for name in &entry.options {
                let option = id(name.as_str())?;
                let reachable = map.is_adjacent(from, option)
                    && map.territory(option).is_some_and(|t| entry.kind.can_enter(t))
                    && state.occupant(option).map_or(true, |p| p == entry.owner);
                if !reachable {
                    return Err(SnapshotError::RetreatOption {
                        unit: entry.id,
                        territory: name.clone(),
                    });
                }
                options.push(option);
            }
            state.insert_retreat(PendingRetreat {
                unit: Unit {
                    id: entry.id,
                    owner: entry.owner,
                    kind: entry.kind,
                    location: from,
                },
                attacker_from: id(entry.attacker_from.as_str())?,
                options,
            })?;
        }

        if let Some(next) = self.next_unit_id {
            state.set_next_unit_id(next);
        }
        Ok(state)
    }

    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

fn check_terrain(map: &Map, unit: UnitId, kind: UnitKind, at: TerritoryId, name: &str) -> Result<(), SnapshotError> {
    match map.territory(at) {
        Some(territory) if kind.can_enter(territory) => Ok(()),
        _ => Err(SnapshotError::Terrain {
            unit,
            kind: kind.name(),
            territory: name.to_owned(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{MapDefinition, TerritoryDef};

    fn map() -> Map {
        let def = MapDefinition::new()
            .with(TerritoryDef::land("harbor").supply_center().adjacent(&["sound", "ridge"]))
            .with(TerritoryDef::land("ridge"))
            .with(TerritoryDef::water("sound"));
        Map::from_definition(&def).unwrap()
    }

    #[test]
    fn capture_then_restore_preserves_state() {
        let map = map();
        let mut state = GameState::new(Turn::spring(1903));
        state.set_owner(map.id("harbor").unwrap(), Some(PlayerId(2)));
        state.spawn(PlayerId(2), UnitKind::Land, map.id("harbor").unwrap()).unwrap();
        state.spawn(PlayerId(3), UnitKind::Boat, map.id("sound").unwrap()).unwrap();

        let snapshot = GameSnapshot::capture(&map, &state);
        assert_eq!(snapshot.units[1].location, "sound");
        let json = snapshot.to_json_pretty().unwrap();
        let restored = GameSnapshot::from_json(&json).unwrap().restore(&map).unwrap();
        assert_eq!(restored, state);
    }

    #[test]
    fn pending_retreats_survive() {
        let map = map();
        let mut state = GameState::new(Turn::spring(1901));
        state.phase = Phase::Retreat;
        let ridge = map.id("ridge").unwrap();
        state
            .insert_retreat(PendingRetreat {
                unit: Unit {
                    id: UnitId(4),
                    owner: PlayerId(1),
                    kind: UnitKind::Land,
                    location: map.id("harbor").unwrap(),
                },
                attacker_from: map.id("sound").unwrap(),
                options: vec![ridge],
            })
            .unwrap();

        let restored = GameSnapshot::capture(&map, &state).restore(&map).unwrap();
        assert_eq!(restored.pending_retreat(UnitId(4)).unwrap().options, vec![ridge]);
        assert_eq!(restored.next_unit_id(), UnitId(5));
    }

    #[test]
    fn minimal_snapshot_json() {
        let map = map();
        let json = r#"{
            "turn": {"year": 1901, "season": "autumn"},
            "phase": "movement",
            "units": [{"id": 0, "owner": 1, "kind": "land", "location": "ridge"}]
        }"#;
        let state = GameSnapshot::from_json(json).unwrap().restore(&map).unwrap();
        assert_eq!(state.unit(UnitId(0)).unwrap().location, map.id("ridge").unwrap());
        assert_eq!(state.next_unit_id(), UnitId(1));
    }

    #[test]
    fn invalid_entries_are_rejected() {
        let map = map();
        let base = GameSnapshot::capture(&map, &GameState::new(Turn::spring(1901)));

        let mut s = base.clone();
        s.units.push(UnitEntry {
            id: UnitId(0),
            owner: PlayerId(1),
            kind: UnitKind::Land,
            location: "atlantis".into(),
        });
        assert!(matches!(s.restore(&map), Err(SnapshotError::UnknownTerritory(n)) if n == "atlantis"));

        let mut s = base.clone();
        s.units.push(UnitEntry {
            id: UnitId(0),
            owner: PlayerId(1),
            kind: UnitKind::Boat,
            location: "ridge".into(),
        });
        assert!(matches!(s.restore(&map), Err(SnapshotError::Terrain { .. })));

        let mut s = base.clone();
        for owner in [1, 2] {
            s.units.push(UnitEntry {
                id: UnitId(owner),
                owner: PlayerId(owner),
                kind: UnitKind::Land,
                location: "ridge".into(),
            });
        }
        assert!(matches!(
            s.restore(&map),
            Err(SnapshotError::Placement(StateError::Occupied { .. }))
        ));

        let mut s = base;
        s.owners.push(OwnerEntry {
            territory: "sound".into(),
            owner: PlayerId(1),
        });
        assert!(matches!(s.restore(&map), Err(SnapshotError::OwnedWater(_))));
    }

    fn retreat_snapshot(options: &[&str]) -> GameSnapshot {
        let mut s = GameSnapshot::capture(&map(), &GameState::new(Turn::spring(1901)));
        s.phase = Phase::Retreat;
        s.units.push(UnitEntry {
            id: UnitId(1),
            owner: PlayerId(2),
            kind: UnitKind::Land,
            location: "ridge".into(),
        });
        s.retreats.push(RetreatEntry {
            id: UnitId(0),
            owner: PlayerId(1),
            kind: UnitKind::Land,
            from: "harbor".into(),
            attacker_from: "sound".into(),
            options: options.iter().map(|o| o.to_string()).collect(),
        });
        s
    }

    #[test]
    fn retreat_options_must_be_reachable_and_free() {
        let map = map();
        assert!(retreat_snapshot(&[]).restore(&map).is_ok());

        // Another player's unit stands in ridge.
        let err = retreat_snapshot(&["ridge"]).restore(&map).unwrap_err();
        assert!(matches!(err, SnapshotError::RetreatOption { unit: UnitId(0), ref territory } if territory == "ridge"));

        // A land unit cannot retreat to sea.
        assert!(matches!(
            retreat_snapshot(&["sound"]).restore(&map),
            Err(SnapshotError::RetreatOption { .. })
        ));

        // A territory that does not border the retreat origin.
        assert!(matches!(
            retreat_snapshot(&["harbor"]).restore(&map),
            Err(SnapshotError::RetreatOption { .. })
        ));
    }
}
