pub mod config;
pub mod dice;
pub mod directory;
pub mod error;
pub mod models;
pub mod simulator;
