//! Turn scheduling: whose turn it is and whether they owe a roll or a move.

use serde::{Deserialize, Serialize};

use super::types::Color;

/// One slot in the turn order: a seat playing one of its colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnEntry {
    pub seat: usize,
    pub color: Color,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnStep {
    AwaitingRoll,
    AwaitingMove,
    Finished,
}

impl TurnStep {
    pub fn as_str(self) -> &'static str {
        match self {
            TurnStep::AwaitingRoll => "awaiting_roll",
            TurnStep::AwaitingMove => "awaiting_move",
            TurnStep::Finished => "finished",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnScheduler {
    order: Vec<TurnEntry>,
    active: usize,
    step: TurnStep,
    /// Value rolled by the active entry while a move choice is pending.
    dice: Option<u8>,
}

impl TurnScheduler {
    pub fn new(order: Vec<TurnEntry>) -> Self {
        Self {
            order,
            active: 0,
            step: TurnStep::AwaitingRoll,
            dice: None,
        }
    }

    pub fn order(&self) -> &[TurnEntry] {
        &self.order
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn active_entry(&self) -> Option<TurnEntry> {
        self.order.get(self.active).copied()
    }

    pub fn step(&self) -> TurnStep {
        self.step
    }

    pub fn dice(&self) -> Option<u8> {
        self.dice
    }

    pub fn next_index(&self) -> usize {
        if self.order.is_empty() {
            0
        } else {
            (self.active + 1) % self.order.len()
        }
    }

    /// Hand the turn to the next entry, awaiting a fresh roll.
    pub fn advance(&self) -> Self {
        Self {
            order: self.order.clone(),
            active: self.next_index(),
            step: TurnStep::AwaitingRoll,
            dice: None,
        }
    }

    /// Keep the turn on the same entry, awaiting a fresh roll.
    pub fn retain(&self) -> Self {
        Self {
            order: self.order.clone(),
            active: self.active,
            step: TurnStep::AwaitingRoll,
            dice: None,
        }
    }

    pub fn await_move(&self, dice: u8) -> Self {
        Self {
            order: self.order.clone(),
            active: self.active,
            step: TurnStep::AwaitingMove,
            dice: Some(dice),
        }
    }

    pub fn finish(&self) -> Self {
        Self {
            order: self.order.clone(),
            active: self.active,
            step: TurnStep::Finished,
            dice: None,
        }
    }

    /// Swap in a new turn order after seats changed.
    ///
    /// `kept` is the index in `order` of the previously active entry, if it
    /// survived; it stays active with its pending roll. Otherwise whatever entry
    /// now occupies the old index takes over and starts with a roll.
    pub fn reorder(&self, order: Vec<TurnEntry>, kept: Option<usize>) -> Self {
        match kept {
            Some(active) => Self {
                order,
                active,
                step: self.step,
                dice: self.dice,
            },
            None => {
                let active = if order.is_empty() { 0 } else { self.active % order.len() };
                let step = match self.step {
                    TurnStep::Finished => TurnStep::Finished,
                    _ => TurnStep::AwaitingRoll,
                };
                Self { order, active, step, dice: None }
            }
        }
    }
}
