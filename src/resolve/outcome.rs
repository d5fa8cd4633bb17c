//! Resolution results.
//!
//! `TurnResult` is everything the rendering, network and persistence
//! collaborators need from one resolution call. All types are plain data
//! and serialize losslessly with serde; each unit outcome is written as
//! `{"unit": id, "outcome": {"kind": ..., "data": {...}}}`.

use serde::{Deserialize, Serialize};

use crate::board::{BuildOrder, Order, Phase, PlayerId, TerritoryId, Turn, UnitId};
use crate::movegen::Illegal;

/// What happened to one unit this turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum Outcome {
    /// The unit holds, supports, or completed its move; it now stands in `to`.
    HeldOrMoved { to: TerritoryId },
    /// The unit's move failed and it stays in its origin.
    Bounced { back_to: TerritoryId },
    /// The unit lost its territory and awaits a retreat order.
    Dislodged {
        from: TerritoryId,
        attacker_from: TerritoryId,
    },
    /// The unit lost its territory and fell back to `to`.
    Retreated { from: TerritoryId, to: TerritoryId },
    /// The unit was removed from the game.
    Destroyed {
        from: TerritoryId,
        reason: DestroyReason,
    },
    /// The unit was raised this build phase.
    Built { at: TerritoryId },
}

impl Outcome {
    /// Where the unit stands after the turn, or None if it is off the board.
    pub const fn final_location(&self) -> Option<TerritoryId> {
        match *self {
            Outcome::HeldOrMoved { to } | Outcome::Retreated { to, .. } => Some(to),
            Outcome::Bounced { back_to } => Some(back_to),
            Outcome::Built { at } => Some(at),
            Outcome::Dislodged { .. } | Outcome::Destroyed { .. } => None,
        }
    }
}

/// Why a unit was destroyed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DestroyReason {
    /// Dislodged with no legal retreat.
    NoRetreat,
    /// The owner chose to disband instead of retreating.
    Disbanded,
    /// No retreat order arrived.
    NoRetreatOrder,
    /// The chosen retreat was not one of the unit's options.
    IllegalRetreat,
    /// Another unit retreated to the same territory.
    RetreatCollision,
}

/// The outcome of one unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitOutcome {
    pub unit: UnitId,
    pub outcome: Outcome,
}

/// A territory that changed hands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnershipChange {
    pub territory: TerritoryId,
    pub previous: Option<PlayerId>,
    pub owner: PlayerId,
}

/// Why an order was treated as a hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoidReason {
    /// The ordered unit is not on the board.
    UnknownUnit,
    /// The target territory is not on the map.
    UnknownTerritory,
    /// A move into the unit's own territory.
    Stationary,
    /// The unit's kind cannot stand in the target.
    Terrain,
    /// The target is out of reach this turn.
    OutOfRange,
    /// The supported unit is not on the board.
    UnknownSupportedUnit,
    /// A unit ordered to support itself.
    SelfSupport,
}

impl From<Illegal> for VoidReason {
    fn from(illegal: Illegal) -> Self {
        match illegal {
            Illegal::UnknownTerritory => VoidReason::UnknownTerritory,
            Illegal::Stationary => VoidReason::Stationary,
            Illegal::Terrain => VoidReason::Terrain,
            Illegal::OutOfRange => VoidReason::OutOfRange,
        }
    }
}

/// An order the engine discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoidedOrder {
    pub unit: UnitId,
    pub order: Order,
    pub reason: VoidReason,
}

/// Whether a support order added strength.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SupportStatus {
    /// Counted for the supported unit.
    Given,
    /// The supporter's own territory was attacked by `by`.
    Cut { by: UnitId },
    /// The supported unit did not end up heading for the support's target.
    Wasted,
}

/// The fate of one support order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupportReport {
    pub unit: UnitId,
    pub supported: UnitId,
    pub target: TerritoryId,
    pub status: SupportStatus,
}

/// The verdict of one contested territory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum Verdict {
    /// Only one player was involved; every attacker entered.
    Unopposed,
    /// Two or more players tied for the strongest attack; nobody entered.
    Standoff { strength: u32 },
    /// The strongest attack did not exceed the defense.
    Repelled { attack: u32, defense: u32 },
    /// `winner` entered the territory.
    Conquered {
        winner: UnitId,
        player: PlayerId,
        attack: u32,
        defense: u32,
    },
}

/// One contested territory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleReport {
    pub territory: TerritoryId,
    pub attackers: Vec<UnitId>,
    pub defenders: Vec<UnitId>,
    pub verdict: Verdict,
}

/// Why a build order was turned down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildRejection {
    UnknownTerritory,
    /// The player has no build credits left.
    NoCredits,
    /// Land units and planes must be raised in the player's own territory.
    NotOwned,
    /// The unit's kind cannot stand in the territory.
    Terrain,
    /// Planes must be raised at an air base.
    NeedsAirBase,
    /// Boats must be raised in water bordering the player's territory.
    NotCoastal,
    /// Another player's unit stands in the territory.
    Occupied,
}

/// A build order that was turned down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectedBuild {
    pub order: BuildOrder,
    pub reason: BuildRejection,
}

/// The complete, atomically committed result of one resolution call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnResult {
    pub turn: Turn,
    pub phase: Phase,
    /// Exactly one entry per unit that existed before resolution (plus
    /// built units), in unit-id order.
    pub outcomes: Vec<UnitOutcome>,
    /// In territory-id order.
    pub ownership: Vec<OwnershipChange>,
    #[serde(default)]
    pub supports: Vec<SupportReport>,
    #[serde(default)]
    pub voided: Vec<VoidedOrder>,
    #[serde(default)]
    pub battles: Vec<BattleReport>,
    #[serde(default)]
    pub rejected_builds: Vec<RejectedBuild>,
    #[serde(default)]
    pub victor: Option<PlayerId>,
}

impl TurnResult {
    /// An empty result for the given turn and phase.
    pub fn new(turn: Turn, phase: Phase) -> Self {
        TurnResult {
            turn,
            phase,
            outcomes: Vec::new(),
            ownership: Vec::new(),
            supports: Vec::new(),
            voided: Vec::new(),
            battles: Vec::new(),
            rejected_builds: Vec::new(),
            victor: None,
        }
    }

    /// The outcome recorded for a unit.
    pub fn outcome(&self, unit: UnitId) -> Option<Outcome> {
        self.outcomes
            .binary_search_by_key(&unit, |o| o.unit)
            .ok()
            .map(|i| self.outcomes[i].outcome)
    }

    /// The support report for a supporter.
    pub fn support(&self, unit: UnitId) -> Option<SupportStatus> {
        self.supports.iter().find(|s| s.unit == unit).map(|s| s.status)
    }

    /// The battle fought over a territory.
    pub fn battle(&self, territory: TerritoryId) -> Option<&BattleReport> {
        self.battles.iter().find(|b| b.territory == territory)
    }

    /// The new owner of a territory if it changed hands.
    pub fn new_owner(&self, territory: TerritoryId) -> Option<PlayerId> {
        self.ownership
            .iter()
            .find(|c| c.territory == territory)
            .map(|c| c.owner)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
