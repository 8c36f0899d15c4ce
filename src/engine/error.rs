use thiserror::Error;

use crate::engine::models::{ParticipantId, RoomId};
use crate::games::ludo::modes::GameMode;
use crate::games::ludo::types::Color;

/// Rejections a room reports back to the caller. None of them alter state.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GameError {
    #[error("room is full (capacity={capacity})")]
    RoomFull { capacity: usize },
    #[error("room plays {room}, join requested {requested}")]
    ModeMismatch { requested: GameMode, room: GameMode },
    #[error("seat {seat} acted out of turn (active seat={active})")]
    NotYourTurn { seat: usize, active: usize },
    #[error("{command} not allowed while {phase}")]
    InvalidPhase {
        command: &'static str,
        phase: &'static str,
    },
    #[error("coin {color} {slot} is not active")]
    UnknownCoin { color: Color, slot: u8 },
    #[error("not enough seats to start (seats={seats}, required={required})")]
    InsufficientSeats { seats: usize, required: usize },
    #[error("participant {0} already has a seat")]
    AlreadySeated(ParticipantId),
    #[error("participant {0} has no seat")]
    UnknownParticipant(ParticipantId),
    #[error("room {0} not found")]
    RoomNotFound(RoomId),
    #[error("dice value {0} outside 1..=6")]
    InvalidDice(u8),
}
