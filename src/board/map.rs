//! The static territory graph.
//!
//! A `Map` is built once from a `MapDefinition` (design-time data, usually
//! JSON) and never changes afterwards. Names are interned into dense
//! `TerritoryId`s in definition order; the name table is kept only for
//! display and for resolving names in snapshots.
//!
//! Adjacency is symmetric. A definition that lists an edge in one direction
//! only gets the reverse edge added at load time.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::territory::{Territory, TerritoryId};

/// Errors that can occur while loading a map definition.
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("failed to parse map definition: {0}")]
    Json(#[from] serde_json::Error),

    #[error("map definition has no territories")]
    Empty,

    #[error("map definition has {0} territories, more than a TerritoryId can index")]
    TooLarge(usize),

    #[error("duplicate territory name: '{0}'")]
    DuplicateName(String),

    #[error("territory '{from}' lists unknown neighbour '{to}'")]
    UnknownNeighbour { from: String, to: String },

    #[error("territory '{0}' lists itself as a neighbour")]
    SelfAdjacent(String),
}

/// One territory as written in a map definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerritoryDef {
    pub name: String,
    #[serde(default)]
    pub water: bool,
    #[serde(default)]
    pub supply_center: bool,
    #[serde(default)]
    pub air_base: bool,
    #[serde(default)]
    pub adjacent: Vec<String>,
}

impl TerritoryDef {
    /// A land territory with no flags and no neighbours.
    pub fn land(name: &str) -> Self {
        TerritoryDef {
            name: name.to_string(),
            water: false,
            supply_center: false,
            air_base: false,
            adjacent: Vec::new(),
        }
    }

    /// A water territory with no neighbours.
    pub fn water(name: &str) -> Self {
        TerritoryDef {
            water: true,
            ..TerritoryDef::land(name)
        }
    }

    pub fn supply_center(mut self) -> Self {
        self.supply_center = true;
        self
    }

    pub fn air_base(mut self) -> Self {
        self.air_base = true;
        self
    }

    /// Adds neighbours by name.
    pub fn adjacent(mut self, names: &[&str]) -> Self {
        self.adjacent.extend(names.iter().map(|n| n.to_string()));
        self
    }
}

/// Design-time description of a whole map.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapDefinition {
    pub territories: Vec<TerritoryDef>,
}

impl MapDefinition {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a territory definition.
    pub fn with(mut self, def: TerritoryDef) -> Self {
        self.territories.push(def);
        self
    }
}

/// The loaded, immutable territory graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Map {
    territories: Vec<Territory>,
    by_name: BTreeMap<String, TerritoryId>,
}

impl Map {
    /// Parses a JSON map definition and builds the map.
    pub fn from_json(json: &str) -> Result<Map, MapError> {
        let def: MapDefinition = serde_json::from_str(json)?;
        Map::from_definition(&def)
    }

    /// Builds a map from a definition, interning names and symmetrizing adjacency.
    pub fn from_definition(def: &MapDefinition) -> Result<Map, MapError> {
        if def.territories.is_empty() {
            return Err(MapError::Empty);
        }
        if def.territories.len() > u16::MAX as usize {
            return Err(MapError::TooLarge(def.territories.len()));
        }

        let mut by_name = BTreeMap::new();
        for (i, t) in def.territories.iter().enumerate() {
            if by_name.insert(t.name.clone(), TerritoryId(i as u16)).is_some() {
                return Err(MapError::DuplicateName(t.name.clone()));
            }
        }

        let mut adjacency: Vec<BTreeSet<TerritoryId>> = vec![BTreeSet::new(); def.territories.len()];
        for (i, t) in def.territories.iter().enumerate() {
            let from = TerritoryId(i as u16);
            for n in &t.adjacent {
                let to = *by_name.get(n).ok_or_else(|| MapError::UnknownNeighbour {
                    from: t.name.clone(),
                    to: n.clone(),
                })?;
                if to == from {
                    return Err(MapError::SelfAdjacent(t.name.clone()));
                }
                adjacency[from.index()].insert(to);
            }
        }

        // Add missing reverse edges.
        for i in 0..adjacency.len() {
            let from = TerritoryId(i as u16);
            let forward: Vec<TerritoryId> = adjacency[i].iter().copied().collect();
            for to in forward {
                if adjacency[to.index()].insert(from) {
                    tracing::warn!(
                        from = %def.territories[i].name,
                        to = %def.territories[to.index()].name,
                        "adjacency listed in one direction only, adding reverse edge"
                    );
                }
            }
        }

        let territories = def
            .territories
            .iter()
            .zip(adjacency)
            .enumerate()
            .map(|(i, (t, adjacent))| Territory {
                id: TerritoryId(i as u16),
                name: t.name.clone(),
                is_water: t.water,
                is_supply_center: t.supply_center,
                is_air_base: t.air_base,
                adjacent,
            })
            .collect();

        Ok(Map {
            territories,
            by_name,
        })
    }

    /// Returns the territory with the given id, or None if the id is not on this map.
    pub fn territory(&self, id: TerritoryId) -> Option<&Territory> {
        self.territories.get(id.index())
    }

    pub fn contains(&self, id: TerritoryId) -> bool {
        id.index() < self.territories.len()
    }

    /// Looks up a territory id by display name.
    pub fn id(&self, name: &str) -> Option<TerritoryId> {
        self.by_name.get(name).copied()
    }

    /// Returns the display name of a territory.
    pub fn name(&self, id: TerritoryId) -> Option<&str> {
        self.territory(id).map(|t| t.name.as_str())
    }

    /// All territories in id order.
    pub fn territories(&self) -> impl Iterator<Item = &Territory> {
        self.territories.iter()
    }

    pub fn len(&self) -> usize {
        self.territories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.territories.is_empty()
    }

    /// Neighbours of `id` in id order. Unknown ids have no neighbours.
    pub fn neighbours(&self, id: TerritoryId) -> impl Iterator<Item = TerritoryId> + '_ {
        self.territory(id)
            .into_iter()
            .flat_map(|t| t.adjacent.iter().copied())
    }

    pub fn is_adjacent(&self, a: TerritoryId, b: TerritoryId) -> bool {
        self.territory(a).is_some_and(|t| t.borders(b))
    }

    /// Number of supply centers on the map.
    pub fn supply_center_count(&self) -> usize {
        self.territories.iter().filter(|t| t.is_supply_center).count()
    }
}
