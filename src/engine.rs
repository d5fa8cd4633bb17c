//! Engine session management.
//!
//! Holds the map, the current game state, the configuration and the
//! pending movement orders between resolution calls. Each resolution call
//! is checked against the current phase before anything runs, so a stale
//! or out-of-order call is an error rather than a panic.

use crate::board::{BuildOrder, GameState, Map, Order, OrderSet, Phase, PlayerId, RetreatOrder, TerritoryId, Turn, UnitId};
use crate::config::EngineConfig;
use crate::movegen::legal_moves;
use crate::protocol::{GameSnapshot, PhaseOrders, SnapshotError};
use crate::resolve::{self, TurnResult};

/// Errors returned by engine session calls.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("cannot resolve the {requested:?} phase while the game is in the {current:?} phase")]
    WrongPhase { requested: Phase, current: Phase },

    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
}

/// A game in progress.
pub struct Engine {
    map: Map,
    state: GameState,
    config: EngineConfig,
    orders: OrderSet,
}

impl Engine {
    /// Starts an empty game in the spring movement phase of the configured year.
    pub fn new(map: Map, config: EngineConfig) -> Self {
        let state = GameState::new(Turn::spring(config.start_year));
        Engine::with_state(map, state, config)
    }

    pub fn with_state(map: Map, state: GameState, config: EngineConfig) -> Self {
        Engine {
            map,
            state,
            config,
            orders: OrderSet::new(),
        }
    }

    /// Resumes a saved game.
    pub fn from_snapshot(map: Map, snapshot: &GameSnapshot, config: EngineConfig) -> Result<Self, EngineError> {
        let state = snapshot.restore(&map)?;
        Ok(Engine::with_state(map, state, config))
    }

    pub fn map(&self) -> &Map {
        &self.map
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Mutable access for setting up a position: placing units, assigning
    /// territories.
    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    /// The pending movement orders.
    pub fn orders(&self) -> &OrderSet {
        &self.orders
    }

    /// Records an order for the next movement resolution, replacing any
    /// earlier order of the unit.
    pub fn order(&mut self, unit: UnitId, order: Order) -> Option<Order> {
        self.orders.insert(unit, order)
    }

    /// Withdraws the unit's pending order so it holds.
    pub fn hold(&mut self, unit: UnitId) -> Option<Order> {
        self.orders.hold(unit)
    }

    /// Territories the unit may move to this turn.
    pub fn legal_moves(&self, unit: UnitId) -> Vec<TerritoryId> {
        self.state
            .unit(unit)
            .map(|u| legal_moves(&self.map, &self.state, u))
            .unwrap_or_default()
    }

    pub fn build_credits(&self, player: PlayerId) -> usize {
        resolve::build_credits(&self.map, &self.state, player)
    }

    /// The player that has reached the configured victory threshold.
    pub fn victor(&self) -> Option<PlayerId> {
        self.config
            .victory_supply_centers
            .and_then(|threshold| resolve::victor(&self.map, &self.state, threshold))
    }

    /// Resolves the pending movement orders.
    pub fn resolve_movement(&mut self) -> Result<TurnResult, EngineError> {
        self.expect_phase(Phase::Movement)?;
        Ok(resolve::resolve_turn(&self.map, &mut self.state, &mut self.orders, &self.config))
    }

    pub fn resolve_retreats(&mut self, orders: &[RetreatOrder]) -> Result<TurnResult, EngineError> {
        self.expect_phase(Phase::Retreat)?;
        Ok(resolve::resolve_retreat_phase(&self.map, &mut self.state, orders, &self.config))
    }

    pub fn resolve_builds(&mut self, orders: &[BuildOrder]) -> Result<TurnResult, EngineError> {
        self.expect_phase(Phase::Build)?;
        Ok(resolve::resolve_build_phase(&self.map, &mut self.state, orders, &self.config))
    }

    /// Resolves the current phase with the matching part of `orders`.
    ///
    /// Movement orders replace the pending order set.
    pub fn submit(&mut self, orders: PhaseOrders) -> Result<TurnResult, EngineError> {
        match self.state.phase {
            Phase::Movement => {
                self.orders = orders.orders;
                self.resolve_movement()
            }
            Phase::Retreat => self.resolve_retreats(&orders.retreats),
            Phase::Build => self.resolve_builds(&orders.builds),
        }
    }

    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot::capture(&self.map, &self.state)
    }

    fn expect_phase(&self, requested: Phase) -> Result<(), EngineError> {
        if self.state.phase == requested {
            Ok(())
        } else {
            Err(EngineError::WrongPhase {
                requested,
                current: self.state.phase,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{MapDefinition, Season, TerritoryDef, UnitKind};
    use crate::config::RetreatMode;
    use crate::resolve::Outcome;

    fn map() -> Map {
        let def = MapDefinition::new()
            .with(TerritoryDef::land("north").supply_center().adjacent(&["south", "bay"]))
            .with(TerritoryDef::land("south").supply_center().adjacent(&["bay"]))
            .with(TerritoryDef::water("bay"));
        Map::from_definition(&def).unwrap()
    }

    #[test]
    fn new_engine_starts_in_spring_movement() {
        let config = EngineConfig {
            start_year: 2000,
            ..EngineConfig::default()
        };
        let engine = Engine::new(map(), config);
        assert_eq!(engine.state().turn, Turn::spring(2000));
        assert_eq!(engine.phase(), Phase::Movement);
        assert!(engine.orders().is_empty());
    }

    #[test]
    fn out_of_phase_calls_are_rejected() {
        let mut engine = Engine::new(map(), EngineConfig::default());
        let err = engine.resolve_builds(&[]).unwrap_err();
        assert!(matches!(
            err,
            EngineError::WrongPhase {
                requested: Phase::Build,
                current: Phase::Movement
            }
        ));
        assert!(engine.resolve_retreats(&[]).is_err());
    }

    #[test]
    fn orders_resolve_and_clear() {
        let mut engine = Engine::new(map(), EngineConfig::default());
        let north = engine.map().id("north").unwrap();
        let south = engine.map().id("south").unwrap();
        let unit = engine.state_mut().spawn(PlayerId(1), UnitKind::Land, north).unwrap();
        assert_eq!(engine.legal_moves(unit), vec![south]);

        engine.order(unit, Order::Move { target: south });
        let result = engine.resolve_movement().unwrap();
        assert_eq!(result.outcome(unit), Some(Outcome::HeldOrMoved { to: south }));
        assert!(engine.orders().is_empty());
        assert_eq!(engine.state().owner(south), Some(PlayerId(1)));
        assert_eq!(engine.state().turn.season, Season::Autumn);
    }

    #[test]
    fn submit_follows_the_phase_cycle() {
        let config = EngineConfig {
            retreats: RetreatMode::Deferred,
            ..EngineConfig::default()
        };
        let mut engine = Engine::new(map(), config);
        let north = engine.map().id("north").unwrap();
        engine.state_mut().set_owner(north, Some(PlayerId(1)));

        engine.submit(PhaseOrders::default()).unwrap();
        engine.submit(PhaseOrders::default()).unwrap();
        assert_eq!(engine.phase(), Phase::Build);
        assert_eq!(engine.build_credits(PlayerId(1)), 1);

        let builds = PhaseOrders {
            builds: vec![BuildOrder {
                player: PlayerId(1),
                territory: north,
                kind: UnitKind::Land,
            }],
            ..PhaseOrders::default()
        };
        let result = engine.submit(builds).unwrap();
        assert_eq!(result.outcomes.len(), 1);
        assert_eq!(engine.state().turn, Turn::spring(1902));
    }

    #[test]
    fn snapshot_round_trips_through_a_new_engine() {
        let mut engine = Engine::new(map(), EngineConfig::default());
        let bay = engine.map().id("bay").unwrap();
        engine.state_mut().spawn(PlayerId(2), UnitKind::Boat, bay).unwrap();
        let snapshot = engine.snapshot();

        let resumed = Engine::from_snapshot(map(), &snapshot, EngineConfig::default()).unwrap();
        assert_eq!(resumed.state(), engine.state());
    }
}
