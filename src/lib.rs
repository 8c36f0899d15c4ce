//! Ludo rules engine: board model, mode policies, dice evaluation, move
//! resolution and turn scheduling for individual, team and dual-color rooms.

pub mod engine;
pub mod games;
