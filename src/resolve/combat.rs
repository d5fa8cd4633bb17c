//! Combat resolution.
//!
//! Every territory that receives at least one move is a battle. Attackers
//! and defenders are summed per player (1 plus the uncut agreeing supports
//! of that player's units in the role), and the battle ends in one of four
//! verdicts:
//!
//! - only one player involved: every attacker enters;
//! - two players tie for the strongest attack: standoff, nobody enters;
//! - the strongest attack does not beat the strongest foreign defense:
//!   every attacker bounces;
//! - otherwise the winning player's best-supported attacker enters and the
//!   defenders of other players are dislodged.
//!
//! Whether a unit defends its territory depends on whether its own move
//! succeeds, so the battles are solved together. Resolution starts from
//! the assumption that every move succeeds and recomputes with the failed
//! movers put back as defenders until the set of successful moves stops
//! changing. Putting a unit back can only add defense, so the set shrinks
//! monotonically and the loop ends after at most one pass per move.
//!
//! Two units of different players moving into each other's territory meet
//! head-to-head. The attacker must beat the other unit's move strength or
//! it drops out of the battle without affecting anyone else. Against every
//! other attacker the unit defends only while its own move fails, like any
//! failed mover.

use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet};

use crate::board::{GameState, PlayerId, TerritoryId, Unit, UnitId};

use super::outcome::{BattleReport, Verdict};
use super::support::SupportTally;
use super::validate::ValidOrders;

/// A defender that lost its territory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dislodgement {
    pub unit: UnitId,
    pub from: TerritoryId,
    /// Where the winning attacker came from.
    pub attacker_from: TerritoryId,
    pub by: UnitId,
}

/// The settled result of all battles of one movement turn.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CombatReport {
    /// Successful moves and their targets.
    pub moved: BTreeMap<UnitId, TerritoryId>,
    /// Movers that stay in their origin. Dislodged units are not listed.
    pub bounced: BTreeSet<UnitId>,
    pub dislodged: BTreeMap<UnitId, Dislodgement>,
    /// Territories where a tie between players kept everyone out.
    pub standoffs: BTreeSet<TerritoryId>,
    /// One report per targeted territory, in territory-id order.
    pub battles: Vec<BattleReport>,
}

impl CombatReport {
    /// Where the unit stands after combat, or None if it was dislodged.
    pub fn position(&self, unit: &Unit) -> Option<TerritoryId> {
        if self.dislodged.contains_key(&unit.id) {
            return None;
        }
        Some(self.moved.get(&unit.id).copied().unwrap_or(unit.location))
    }

    /// Territories holding at least one unit after combat.
    pub fn occupied(&self, state: &GameState) -> BTreeSet<TerritoryId> {
        state.units().filter_map(|u| self.position(u)).collect()
    }
}

struct Fight {
    report: BattleReport,
    entered: Vec<UnitId>,
}

/// Settles every battle of the turn.
pub fn resolve_combat(state: &GameState, orders: &ValidOrders, tally: &SupportTally) -> CombatReport {
    let mut attackers: BTreeMap<TerritoryId, Vec<&Unit>> = BTreeMap::new();
    for (id, target) in &orders.moves {
        if let Some(unit) = state.unit(*id) {
            attackers.entry(*target).or_default().push(unit);
        }
    }

    let mut departed: BTreeSet<UnitId> = attackers.values().flatten().map(|u| u.id).collect();
    let mut passes = 0usize;
    loop {
        passes += 1;
        let fights: Vec<Fight> = attackers
            .iter()
            .map(|(territory, list)| fight(*territory, list, state, orders, tally, &departed))
            .collect();
        let entered: BTreeSet<UnitId> = fights
            .iter()
            .flat_map(|f| f.entered.iter().copied())
            .filter(|id| departed.contains(id))
            .collect();

        if entered == departed {
            tracing::trace!(passes, "combat settled");
            return settle(state, orders, fights, &entered);
        }
        departed = entered;
    }
}

fn fight(
    territory: TerritoryId,
    attackers: &[&Unit],
    state: &GameState,
    orders: &ValidOrders,
    tally: &SupportTally,
    departed: &BTreeSet<UnitId>,
) -> Fight {
    let origins: BTreeSet<TerritoryId> = attackers.iter().map(|u| u.location).collect();

    // Units of this territory moving into an attacker's origin.
    let head_on: Vec<(&Unit, TerritoryId)> = state
        .units_at(territory)
        .filter_map(|u| match orders.moves.get(&u.id) {
            Some(to) if origins.contains(to) => Some((u, *to)),
            _ => None,
        })
        .collect();
    let loses_head_on = |a: &Unit| {
        head_on
            .iter()
            .any(|(u, to)| *to == a.location && u.owner != a.owner && tally.strength(a.id) <= tally.strength(u.id))
    };
    let (contenders, beaten): (Vec<&Unit>, Vec<&Unit>) = attackers.iter().copied().partition(|a| !loses_head_on(*a));

    // Each defender with the bonus it brings to the defense.
    let defenders: Vec<(&Unit, u32)> = state
        .units_at(territory)
        .filter_map(|u| match orders.moves.get(&u.id) {
            None => Some((u, tally.bonus(u.id))),
            Some(_) if !departed.contains(&u.id) => Some((u, 0)),
            Some(_) => None,
        })
        .collect();

    let mut attack: BTreeMap<PlayerId, u32> = BTreeMap::new();
    for unit in &contenders {
        *attack.entry(unit.owner).or_insert(1) += tally.bonus(unit.id);
    }
    let mut defense: BTreeMap<PlayerId, u32> = BTreeMap::new();
    for (unit, bonus) in &defenders {
        *defense.entry(unit.owner).or_insert(1) += bonus;
    }

    let players: BTreeSet<PlayerId> = attack.keys().chain(defense.keys()).copied().collect();
    let (verdict, entered) = if contenders.is_empty() {
        let verdict = Verdict::Repelled {
            attack: beaten.iter().map(|u| tally.strength(u.id)).max().unwrap_or(0),
            defense: head_on.iter().map(|(u, _)| tally.strength(u.id)).max().unwrap_or(0),
        };
        (verdict, Vec::new())
    } else if players.len() <= 1 {
        (Verdict::Unopposed, contenders.iter().map(|u| u.id).collect())
    } else {
        contest(&contenders, &attack, &defense, tally)
    };

    Fight {
        report: BattleReport {
            territory,
            attackers: attackers.iter().map(|u| u.id).collect(),
            defenders: defenders.iter().map(|(u, _)| u.id).collect(),
            verdict,
        },
        entered,
    }
}

fn contest(
    attackers: &[&Unit],
    attack: &BTreeMap<PlayerId, u32>,
    defense: &BTreeMap<PlayerId, u32>,
    tally: &SupportTally,
) -> (Verdict, Vec<UnitId>) {
    let best = attack.values().copied().max().unwrap_or(0);
    let leaders: Vec<PlayerId> = attack
        .iter()
        .filter(|(_, s)| **s == best)
        .map(|(p, _)| *p)
        .collect();
    let &[player] = leaders.as_slice() else {
        return (Verdict::Standoff { strength: best }, Vec::new());
    };

    let held = defense
        .iter()
        .filter(|(p, _)| **p != player)
        .map(|(_, s)| *s)
        .max()
        .unwrap_or(0);
    if best <= held {
        return (Verdict::Repelled { attack: best, defense: held }, Vec::new());
    }

    let winner = attackers
        .iter()
        .filter(|u| u.owner == player)
        .max_by_key(|u| (tally.bonus(u.id), Reverse(u.id)));
    match winner {
        Some(unit) => (
            Verdict::Conquered {
                winner: unit.id,
                player,
                attack: best,
                defense: held,
            },
            vec![unit.id],
        ),
        None => (Verdict::Repelled { attack: best, defense: held }, Vec::new()),
    }
}

fn settle(state: &GameState, orders: &ValidOrders, fights: Vec<Fight>, entered: &BTreeSet<UnitId>) -> CombatReport {
    let mut report = CombatReport::default();

    for (id, target) in &orders.moves {
        if entered.contains(id) {
            report.moved.insert(*id, *target);
        } else if state.unit(*id).is_some() {
            report.bounced.insert(*id);
        }
    }

    for Fight { report: battle, .. } in fights {
        match battle.verdict {
            Verdict::Conquered { winner, player, .. } => {
                let attacker_from = state.unit(winner).map_or(battle.territory, |u| u.location);
                for id in &battle.defenders {
                    let Some(defender) = state.unit(*id) else { continue };
                    if defender.owner == player || entered.contains(id) {
                        continue;
                    }
                    report.bounced.remove(id);
                    report.dislodged.insert(
                        *id,
                        Dislodgement {
                            unit: *id,
                            from: battle.territory,
                            attacker_from,
                            by: winner,
                        },
                    );
                }
            }
            Verdict::Standoff { .. } => {
                report.standoffs.insert(battle.territory);
            }
            Verdict::Unopposed | Verdict::Repelled { .. } => {}
        }
        tracing::debug!(territory = %battle.territory, verdict = ?battle.verdict, "battle");
        report.battles.push(battle);
    }

    report
}
