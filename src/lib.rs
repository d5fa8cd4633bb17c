//! Conquest adjudication engine library.
//!
//! Resolves simultaneous Move and Support orders of a territory-conquest
//! game into a conflict-free new board. Exposes the board representation,
//! move generation, the resolver, the engine session and the payload types
//! used by the binary entry point and by collaborators.

pub mod board;
pub mod config;
pub mod engine;
pub mod movegen;
pub mod protocol;
pub mod resolve;
