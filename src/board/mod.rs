//! Board representation and game-state types.
//!
//! Contains the core data structures for territories, the map graph, units,
//! orders, and the overall game state.

pub mod map;
pub mod order;
pub mod state;
pub mod territory;
pub mod unit;

pub use map::{Map, MapDefinition, MapError, TerritoryDef};
pub use order::{BuildOrder, Order, OrderEntry, OrderSet, RetreatOrder};
pub use state::{GameState, PendingRetreat, Phase, Season, StateError, Turn};
pub use territory::{Territory, TerritoryId};
pub use unit::{PlayerId, Unit, UnitId, UnitKind};
