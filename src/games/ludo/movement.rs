//! Dice evaluation and move resolution.
//!
//! Both entry points are pure: they take a board by reference and return a new
//! board alongside a summary of what changed.

use serde::{Deserialize, Serialize};

use super::types::*;

pub const RELEASE_ROLL: u8 = 6;

/// Where a coin lands after `roll` steps.
///
/// Jailed coins never move here; release is decided by the caller. A home
/// stretch coin that would overshoot `finish` stays put.
pub fn advance(pos: Cell, roll: u8, home_turn: Cell, finish: Cell) -> Cell {
    let roll = roll as Cell;
    if is_jail(pos) {
        pos
    } else if pos >= HOME_BASE {
        // 151 is green's turn-in cell seen through outer-track numbering.
        let p = if pos == 151 { pos - TRACK_LEN } else { pos };
        if p + roll <= finish {
            p + roll
        } else {
            pos
        }
    } else {
        let next = (pos + roll) % TRACK_LEN;
        if pos <= home_turn && home_turn < pos + roll {
            next + HOME_BASE
        } else {
            next
        }
    }
}

/// One movable coin for the current roll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activation {
    pub slot: u8,
    pub from: Cell,
    pub to: Cell,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RollEvaluation {
    pub board: Board,
    pub activations: Vec<Activation>,
}

impl RollEvaluation {
    pub fn can_play(&self) -> bool {
        !self.activations.is_empty()
    }
}

/// Mark every coin of `color` that can move with `dice` as active and record
/// its destination. Coins that cannot move are reset to idle.
pub fn evaluate_roll(board: &Board, color: Color, dice: u8) -> RollEvaluation {
    let meta = color.meta();
    let mut next = *board;
    let mut activations = Vec::new();

    for coin in next.coins_mut(color).iter_mut() {
        if coin.position == meta.finish || coin.is_finished() {
            continue;
        }

        let raw = advance(coin.position, dice, meta.home_turn, meta.finish);
        let destination = if dice == RELEASE_ROLL && is_jail(coin.position) {
            Some(meta.start)
        } else if dice == RELEASE_ROLL && is_outer_track(coin.position) {
            Some(raw)
        } else if raw != coin.position {
            Some(raw)
        } else {
            None
        };

        match destination {
            Some(to) => {
                coin.status = CoinStatus::Active;
                coin.next_position = to;
                activations.push(Activation { slot: coin.slot, from: coin.position, to });
            }
            None => {
                coin.status = CoinStatus::Idle;
                coin.next_position = coin.position;
            }
        }
    }

    RollEvaluation { board: next, activations }
}

/// A coin sent back to jail by a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capture {
    pub color: Color,
    pub slot: u8,
    pub from: Cell,
    pub to: Cell,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveResolution {
    pub board: Board,
    pub from: Cell,
    pub to: Cell,
    pub capture: Option<Capture>,
    /// The moved coin reached its finish cell.
    pub finished: bool,
}

/// Apply the recorded destination of an active coin.
///
/// Returns `None` when the coin does not exist or is not active. Win checks and
/// turn disposition are left to the caller since they depend on the mode.
pub fn resolve_move(board: &Board, color: Color, slot: u8) -> Option<MoveResolution> {
    let coin = board.coin(color, slot)?;
    if coin.status != CoinStatus::Active {
        return None;
    }
    let from = coin.position;
    let to = coin.next_position;
    let mut next = *board;

    let mut capture = None;
    if !is_safe_cell(to) {
        if let Some(occupant) = board.opponent_at(to, color) {
            let (victim_color, victim_slot) = (occupant.color, occupant.slot);
            if let Some(victim) = next.coin_mut(victim_color, victim_slot) {
                victim.send_to_jail();
                capture = Some(Capture {
                    color: victim_color,
                    slot: victim_slot,
                    from: to,
                    to: victim.jail_position,
                });
            }
        }
    }

    let finished = to == color.finish();
    for c in next.coins_mut(color).iter_mut() {
        if c.slot == slot {
            c.position = to;
            c.next_position = to;
            c.status = if finished { CoinStatus::Finished } else { CoinStatus::Idle };
        } else if c.status == CoinStatus::Active {
            c.status = CoinStatus::Idle;
            c.next_position = c.position;
        }
    }

    Some(MoveResolution { board: next, from, to, capture, finished })
}
