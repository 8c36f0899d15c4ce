//! A single Ludo room: board, seats, mode policy and turn scheduler.
//!
//! Every command is computed as a fresh [`GameState`] from the current one and
//! swapped in only once it succeeded, so a rejected command leaves the room as
//! it was.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::engine::dice::{DiceSource, SeededDice};
use crate::engine::error::GameError;
use crate::engine::models::*;

use super::modes::{GameMode, ModePolicy, Winner};
use super::movement::{evaluate_roll, resolve_move, Activation, Capture, RELEASE_ROLL};
use super::turn::{TurnEntry, TurnScheduler, TurnStep};
use super::types::{Board, Cell, CoinStatus, Color};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GamePhase {
    Lobby,
    InProgress,
    Finished,
}

impl GamePhase {
    pub fn as_str(self) -> &'static str {
        match self {
            GamePhase::Lobby => "lobby",
            GamePhase::InProgress => "in_progress",
            GamePhase::Finished => "finished",
        }
    }
}

/// A roll that could not be played and passed the turn on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviousRoll {
    pub seat: usize,
    pub color: Color,
    pub dice: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollOutcome {
    pub seat: usize,
    pub participant_id: ParticipantId,
    pub color: Color,
    pub dice: u8,
    pub can_play: bool,
    pub activations: Vec<Activation>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveOutcome {
    pub seat: usize,
    pub participant_id: ParticipantId,
    pub color: Color,
    pub slot: u8,
    pub from: Cell,
    pub to: Cell,
    pub capture: Option<Capture>,
    pub finished_coin: bool,
    pub play_again: bool,
    pub game_over: bool,
    pub winner: Option<Winner>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    pub mode: GameMode,
    pub phase: GamePhase,
    pub board: Board,
    pub seats: Vec<Seat>,
    pub turn: TurnScheduler,
    #[serde(default)]
    pub previous_roll: Option<PreviousRoll>,
    #[serde(default)]
    pub winner: Option<Winner>,
}

impl GameState {
    pub fn new(mode: GameMode) -> Self {
        Self {
            mode,
            phase: GamePhase::Lobby,
            board: Board::new(),
            seats: Vec::new(),
            turn: TurnScheduler::new(Vec::new()),
            previous_roll: None,
            winner: None,
        }
    }

    pub fn policy(&self) -> &'static dyn ModePolicy {
        self.mode.policy()
    }

    pub fn seat_index(&self, participant_id: &str) -> Option<usize> {
        self.seats.iter().position(|s| s.participant_id == participant_id)
    }

    /// Seat whose turn it is, once the game is running.
    pub fn active_seat(&self) -> Option<usize> {
        match self.phase {
            GamePhase::Lobby => None,
            _ => self.turn.active_entry().map(|e| e.seat),
        }
    }

    /// True while a rolled value waits for a coin choice.
    pub fn board_active(&self) -> bool {
        self.phase == GamePhase::InProgress && self.turn.step() == TurnStep::AwaitingMove
    }

    pub fn join(
        &self,
        participant_id: &str,
        display_name: &str,
        mode: GameMode,
    ) -> Result<(GameState, usize), GameError> {
        if mode != self.mode {
            return Err(GameError::ModeMismatch { requested: mode, room: self.mode });
        }
        if self.seat_index(participant_id).is_some() {
            return Err(GameError::AlreadySeated(participant_id.into()));
        }
        if self.phase != GamePhase::Lobby {
            return Err(GameError::InvalidPhase { command: "join", phase: self.phase.as_str() });
        }
        let policy = self.policy();
        let assignment = policy
            .assign(&self.seats)
            .ok_or(GameError::RoomFull { capacity: policy.capacity() })?;

        let mut next = self.clone();
        next.seats.push(Seat::new(
            participant_id.into(),
            display_name.into(),
            assignment.colors,
            assignment.team,
        ));
        next.turn = TurnScheduler::new(policy.turn_order(&next.seats));
        Ok((next, self.seats.len()))
    }

    pub fn leave(&self, participant_id: &str) -> Result<(GameState, Seat), GameError> {
        let idx = self
            .seat_index(participant_id)
            .ok_or_else(|| GameError::UnknownParticipant(participant_id.into()))?;

        let mut next = self.clone();
        let seat = next.seats.remove(idx);
        next.previous_roll = self.previous_roll.and_then(|prev| match prev.seat.cmp(&idx) {
            Ordering::Less => Some(prev),
            Ordering::Equal => None,
            Ordering::Greater => Some(PreviousRoll { seat: prev.seat - 1, ..prev }),
        });
        let order = self.policy().turn_order(&next.seats);

        next.turn = match self.phase {
            GamePhase::Lobby => TurnScheduler::new(order),
            _ => {
                let kept = self.turn.active_entry().and_then(|prev| {
                    if prev.seat == idx {
                        return None;
                    }
                    let shifted = if prev.seat > idx { prev.seat - 1 } else { prev.seat };
                    order.iter().position(|e| *e == TurnEntry { seat: shifted, color: prev.color })
                });
                if kept.is_none() && self.board_active() {
                    // The leaver's pending roll dies with them.
                    for coin in next.board.coins_mut(seat.active_color).iter_mut() {
                        if coin.status == CoinStatus::Active {
                            coin.status = CoinStatus::Idle;
                            coin.next_position = coin.position;
                        }
                    }
                }
                self.turn.reorder(order, kept)
            }
        };
        next.sync_active_color();
        Ok((next, seat))
    }

    pub fn start(&self) -> Result<GameState, GameError> {
        if self.phase != GamePhase::Lobby {
            return Err(GameError::InvalidPhase { command: "start", phase: self.phase.as_str() });
        }
        let policy = self.policy();
        if !policy.can_start(self.seats.len()) {
            return Err(GameError::InsufficientSeats {
                seats: self.seats.len(),
                required: policy.min_seats(),
            });
        }
        let mut next = self.clone();
        next.phase = GamePhase::InProgress;
        next.turn = TurnScheduler::new(policy.turn_order(&next.seats));
        next.previous_roll = None;
        next.sync_active_color();
        Ok(next)
    }

    /// Check that `seat` may issue `command` right now.
    pub fn expect_turn(
        &self,
        seat: usize,
        command: &'static str,
        step: TurnStep,
    ) -> Result<TurnEntry, GameError> {
        if self.phase != GamePhase::InProgress {
            return Err(GameError::InvalidPhase { command, phase: self.phase.as_str() });
        }
        let entry = self
            .turn
            .active_entry()
            .ok_or(GameError::InvalidPhase { command, phase: self.phase.as_str() })?;
        if entry.seat != seat {
            return Err(GameError::NotYourTurn { seat, active: entry.seat });
        }
        if self.turn.step() != step {
            return Err(GameError::InvalidPhase { command, phase: self.turn.step().as_str() });
        }
        Ok(entry)
    }

    pub fn roll(&self, seat: usize, dice: u8) -> Result<(GameState, RollOutcome), GameError> {
        let entry = self.expect_turn(seat, "roll_dice", TurnStep::AwaitingRoll)?;
        if !(1..=6).contains(&dice) {
            return Err(GameError::InvalidDice(dice));
        }

        let eval = evaluate_roll(&self.board, entry.color, dice);
        let can_play = eval.can_play();

        let mut next = self.clone();
        next.board = eval.board;
        if can_play {
            next.turn = self.turn.await_move(dice);
            next.previous_roll = None;
        } else {
            next.turn = self.turn.advance();
            next.previous_roll = Some(PreviousRoll { seat, color: entry.color, dice });
        }
        next.sync_active_color();

        let outcome = RollOutcome {
            seat,
            participant_id: self.seats[seat].participant_id.clone(),
            color: entry.color,
            dice,
            can_play,
            activations: eval.activations,
        };
        Ok((next, outcome))
    }

    pub fn choose(
        &self,
        seat: usize,
        color: Color,
        slot: u8,
    ) -> Result<(GameState, MoveOutcome), GameError> {
        let entry = self.expect_turn(seat, "choose_move", TurnStep::AwaitingMove)?;
        if color != entry.color {
            return Err(GameError::UnknownCoin { color, slot });
        }
        let resolution =
            resolve_move(&self.board, color, slot).ok_or(GameError::UnknownCoin { color, slot })?;

        let mut next = self.clone();
        next.board = resolution.board;

        let winner = if resolution.finished {
            self.policy().winner(&next.board, &next.seats, seat)
        } else {
            None
        };
        let game_over = winner.is_some();
        let play_again = resolution.capture.is_some() || (resolution.finished && !game_over);
        let rolled_six = self.turn.dice() == Some(RELEASE_ROLL);

        if game_over {
            next.phase = GamePhase::Finished;
            next.turn = self.turn.finish();
            next.winner = winner.clone();
        } else if play_again || rolled_six {
            next.turn = self.turn.retain();
        } else {
            next.turn = self.turn.advance();
        }
        next.sync_active_color();

        let outcome = MoveOutcome {
            seat,
            participant_id: self.seats[seat].participant_id.clone(),
            color,
            slot,
            from: resolution.from,
            to: resolution.to,
            capture: resolution.capture,
            finished_coin: resolution.finished,
            play_again,
            game_over,
            winner,
        };
        Ok((next, outcome))
    }

    fn sync_active_color(&mut self) {
        if self.phase == GamePhase::Lobby {
            return;
        }
        if let Some(entry) = self.turn.active_entry() {
            if let Some(seat) = self.seats.get_mut(entry.seat) {
                seat.active_color = entry.color;
            }
        }
    }
}

/// A room with its dice and command log.
pub struct GameInstance {
    room_id: RoomId,
    state: GameState,
    dice: Box<dyn DiceSource>,
    log: Vec<ActionRecord>,
}

impl GameInstance {
    pub fn new(room_id: impl Into<RoomId>, mode: GameMode) -> Self {
        Self::with_dice(room_id, mode, Box::new(SeededDice::from_entropy()))
    }

    pub fn with_dice(room_id: impl Into<RoomId>, mode: GameMode, dice: Box<dyn DiceSource>) -> Self {
        Self {
            room_id: room_id.into(),
            state: GameState::new(mode),
            dice,
            log: Vec::new(),
        }
    }

    pub fn room_id(&self) -> &str {
        &self.room_id
    }

    pub fn mode(&self) -> GameMode {
        self.state.mode
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn log(&self) -> &[ActionRecord] {
        &self.log
    }

    pub fn is_empty(&self) -> bool {
        self.state.seats.is_empty()
    }

    pub fn join(
        &mut self,
        participant_id: &str,
        display_name: &str,
        mode: GameMode,
    ) -> Result<Transition<usize>, GameError> {
        let (next, seat_index) = self.state.join(participant_id, display_name, mode)?;
        let seat = next.seats[seat_index].clone();
        tracing::debug!(room = %self.room_id, participant = participant_id, colors = ?seat.colors, "seat joined");
        self.commit(next, ActionRecord::Join {
            participant_id: participant_id.into(),
            display_name: display_name.into(),
        });
        Ok(Transition {
            outcome: seat_index,
            events: vec![RoomEvent::SeatJoined {
                room_id: self.room_id.clone(),
                seat_index,
                seat,
                state: self.state.clone(),
            }],
        })
    }

    pub fn leave(&mut self, participant_id: &str) -> Result<Transition<Seat>, GameError> {
        let (next, seat) = self.state.leave(participant_id)?;
        tracing::debug!(room = %self.room_id, participant = participant_id, "seat left");
        self.commit(next, ActionRecord::Leave { participant_id: participant_id.into() });
        Ok(Transition {
            outcome: seat.clone(),
            events: vec![RoomEvent::SeatLeft {
                room_id: self.room_id.clone(),
                seat,
                state: self.state.clone(),
            }],
        })
    }

    pub fn start(&mut self) -> Result<Transition<()>, GameError> {
        let next = self.state.start()?;
        tracing::info!(room = %self.room_id, mode = %self.state.mode, seats = next.seats.len(), "game started");
        self.commit(next, ActionRecord::Start);
        Ok(Transition {
            outcome: (),
            events: vec![RoomEvent::GameStarted {
                room_id: self.room_id.clone(),
                state: self.state.clone(),
            }],
        })
    }

    /// Roll the room's dice for `seat`. The die is only thrown once the seat is
    /// known to be allowed to roll.
    pub fn roll_dice(&mut self, seat: usize) -> Result<Transition<RollOutcome>, GameError> {
        self.state.expect_turn(seat, "roll_dice", TurnStep::AwaitingRoll)?;
        let dice = self.dice.roll();
        self.roll_dice_with(seat, dice)
    }

    /// Apply a roll with a given value, bypassing the room's dice.
    pub fn roll_dice_with(&mut self, seat: usize, dice: u8) -> Result<Transition<RollOutcome>, GameError> {
        let (next, outcome) = self.state.roll(seat, dice)?;
        tracing::debug!(
            room = %self.room_id,
            seat,
            color = ?outcome.color,
            dice,
            can_play = outcome.can_play,
            "dice rolled"
        );
        self.commit(next, ActionRecord::Roll { seat, dice });
        Ok(Transition {
            events: vec![RoomEvent::DiceRolled {
                room_id: self.room_id.clone(),
                outcome: outcome.clone(),
                state: self.state.clone(),
            }],
            outcome,
        })
    }

    pub fn choose_move(
        &mut self,
        seat: usize,
        color: Color,
        slot: u8,
    ) -> Result<Transition<MoveOutcome>, GameError> {
        let (next, outcome) = self.state.choose(seat, color, slot)?;
        tracing::debug!(
            room = %self.room_id,
            seat,
            color = ?color,
            slot,
            from = outcome.from,
            to = outcome.to,
            captured = outcome.capture.is_some(),
            play_again = outcome.play_again,
            "move made"
        );
        if let Some(winner) = &outcome.winner {
            tracing::info!(room = %self.room_id, winner = ?winner, "game won");
        }
        self.commit(next, ActionRecord::Move { seat, color, slot });
        Ok(Transition {
            events: vec![RoomEvent::MoveMade {
                room_id: self.room_id.clone(),
                outcome: outcome.clone(),
                state: self.state.clone(),
            }],
            outcome,
        })
    }

    fn commit(&mut self, next: GameState, record: ActionRecord) {
        self.state = next;
        self.log.push(record);
    }
}
