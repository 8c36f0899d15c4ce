pub mod modes;
pub mod movement;
pub mod room;
pub mod turn;
pub mod types;

pub use modes::{GameMode, ModePolicy, Winner};
pub use room::{GameInstance, GamePhase, GameState, MoveOutcome, RollOutcome};
pub use types::{Board, Coin, CoinStatus, Color};
