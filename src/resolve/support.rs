//! Support resolution.
//!
//! A support order adds one point of strength to the supported unit when
//! two checks pass, in this order:
//!
//! 1. The support is not cut. It is cut when a move targets the supporter's
//!    own territory, unless that move comes from the supported unit or from
//!    a unit owned by the supporter's or the supported unit's player.
//! 2. The support's target matches where the supported unit is actually
//!    heading: its move target, or its own territory if it is not moving.
//!
//! A support that fails the second check is wasted, never redirected.

use std::collections::BTreeMap;

use crate::board::{GameState, TerritoryId, Unit, UnitId};

use super::outcome::{SupportReport, SupportStatus};
use super::validate::ValidOrders;

/// Per-unit support totals for one turn.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SupportTally {
    reports: Vec<SupportReport>,
    bonus: BTreeMap<UnitId, u32>,
}

impl SupportTally {
    /// Number of uncut, agreeing supports the unit receives.
    pub fn bonus(&self, unit: UnitId) -> u32 {
        self.bonus.get(&unit).copied().unwrap_or(0)
    }

    /// The unit's own combat strength: 1 plus its bonus.
    pub fn strength(&self, unit: UnitId) -> u32 {
        1 + self.bonus(unit)
    }

    /// One report per valid support order, in supporter-id order.
    pub fn reports(&self) -> &[SupportReport] {
        &self.reports
    }

    pub fn status(&self, supporter: UnitId) -> Option<SupportStatus> {
        self.reports.iter().find(|r| r.unit == supporter).map(|r| r.status)
    }

    pub fn into_reports(self) -> Vec<SupportReport> {
        self.reports
    }
}

/// Computes which supports are cut and what each unit's bonus is.
pub fn resolve_supports(state: &GameState, orders: &ValidOrders) -> SupportTally {
    let mut attackers_by_target: BTreeMap<TerritoryId, Vec<&Unit>> = BTreeMap::new();
    for (id, target) in &orders.moves {
        if let Some(unit) = state.unit(*id) {
            attackers_by_target.entry(*target).or_default().push(unit);
        }
    }

    let mut tally = SupportTally::default();
    for (id, support) in &orders.supports {
        let (Some(supporter), Some(supported)) = (state.unit(*id), state.unit(support.supported)) else {
            continue;
        };

        let cutter = attackers_by_target
            .get(&supporter.location)
            .and_then(|attackers| attackers.iter().find(|a| cuts(a, supporter, supported)));

        let status = if let Some(attacker) = cutter {
            SupportStatus::Cut { by: attacker.id }
        } else if orders.destination(supported) != support.target {
            SupportStatus::Wasted
        } else {
            *tally.bonus.entry(supported.id).or_default() += 1;
            SupportStatus::Given
        };

        tally.reports.push(SupportReport {
            unit: supporter.id,
            supported: supported.id,
            target: support.target,
            status,
        });
    }

    tally
}

/// Whether a move by `attacker` into the supporter's territory cuts the support.
fn cuts(attacker: &Unit, supporter: &Unit, supported: &Unit) -> bool {
    attacker.id != supported.id && attacker.owner != supporter.owner && attacker.owner != supported.owner
}
