//! Synchronous game driver: replays recorded command logs and plays seeded
//! games that always take the first legal move.

use crate::engine::dice::{ScriptedDice, SeededDice};
use crate::engine::error::GameError;
use crate::engine::models::*;
use crate::games::ludo::modes::{GameMode, Winner};
use crate::games::ludo::room::{GameInstance, GamePhase};

/// Rebuild a room by re-applying an accepted-command log with its recorded
/// dice values.
pub fn replay(room_id: &str, mode: GameMode, log: &[ActionRecord]) -> Result<GameInstance, GameError> {
    let mut game = GameInstance::with_dice(room_id, mode, Box::new(ScriptedDice::new([])));
    for record in log {
        apply_record(&mut game, record)?;
    }
    Ok(game)
}

pub fn apply_record(game: &mut GameInstance, record: &ActionRecord) -> Result<(), GameError> {
    let mode = game.mode();
    match record {
        ActionRecord::Join { participant_id, display_name } => {
            game.join(participant_id, display_name, mode)?;
        }
        ActionRecord::Leave { participant_id } => {
            game.leave(participant_id)?;
        }
        ActionRecord::Start => {
            game.start()?;
        }
        ActionRecord::Roll { seat, dice } => {
            game.roll_dice_with(*seat, *dice)?;
        }
        ActionRecord::Move { seat, color, slot } => {
            game.choose_move(*seat, *color, *slot)?;
        }
    }
    Ok(())
}

/// A game played out by [`play_first_activation`].
#[derive(Debug, Clone)]
pub struct PlayedGame {
    /// `None` when `max_rolls` ran out first.
    pub winner: Option<Winner>,
    pub rolls: usize,
    pub log: Vec<ActionRecord>,
}

/// Seat `seats` players, then play with seeded dice, always moving the first
/// activated coin, for at most `max_rolls` throws.
pub fn play_first_activation(
    mode: GameMode,
    seats: usize,
    seed: u64,
    max_rolls: usize,
) -> Result<PlayedGame, GameError> {
    let mut game = GameInstance::with_dice(format!("seeded-{seed}"), mode, Box::new(SeededDice::new(seed)));
    for i in 0..seats {
        game.join(&format!("p{i}"), &format!("P{i}"), mode)?;
    }
    game.start()?;

    let mut rolls = 0;
    while game.state().phase == GamePhase::InProgress && rolls < max_rolls {
        let seat = match game.state().active_seat() {
            Some(s) => s,
            None => break,
        };
        rolls += 1;
        let rolled = game.roll_dice(seat)?.outcome;
        if let Some(first) = rolled.activations.first() {
            game.choose_move(seat, rolled.color, first.slot)?;
        }
    }

    tracing::debug!(%mode, seats, seed, rolls, finished = game.state().winner.is_some(), "seeded game played");
    Ok(PlayedGame {
        winner: game.state().winner.clone(),
        rolls,
        log: game.log().to_vec(),
    })
}
