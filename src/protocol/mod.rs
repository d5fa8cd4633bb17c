//! Payload types exchanged with collaborators.
//!
//! The engine owns no file format or wire protocol. This module defines the
//! plain serde payloads the persistence and order-collection layers use:
//! `GameSnapshot` for saved games and `PhaseOrders` for one phase's orders.
//! `TurnResult` itself lives in `resolve::outcome`.

pub mod snapshot;

pub use snapshot::{GameSnapshot, OwnerEntry, RetreatEntry, SnapshotError, UnitEntry};

use serde::{Deserialize, Serialize};

use crate::board::{BuildOrder, OrderSet, RetreatOrder};

/// The orders submitted for one phase. Only the list matching the current
/// phase is read; the others may be omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseOrders {
    #[serde(default)]
    pub orders: OrderSet,
    #[serde(default)]
    pub retreats: Vec<RetreatOrder>,
    #[serde(default)]
    pub builds: Vec<BuildOrder>,
}

impl PhaseOrders {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
