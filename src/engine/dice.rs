//! Dice sources. Rooms take any [`DiceSource`] so tests and replays can pin rolls.

use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub trait DiceSource: Send {
    /// A value in 1..=6.
    fn roll(&mut self) -> u8;
}

/// Uniform six-sided die backed by `StdRng`.
pub struct SeededDice {
    rng: StdRng,
}

impl SeededDice {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }
}

impl DiceSource for SeededDice {
    fn roll(&mut self) -> u8 {
        self.rng.gen_range(1..=6)
    }
}

/// Plays back a fixed list of rolls, then keeps repeating the last one.
pub struct ScriptedDice {
    rolls: VecDeque<u8>,
    last: u8,
}

impl ScriptedDice {
    pub fn new(rolls: impl IntoIterator<Item = u8>) -> Self {
        Self {
            rolls: rolls.into_iter().collect(),
            last: 1,
        }
    }

    pub fn remaining(&self) -> usize {
        self.rolls.len()
    }
}

impl DiceSource for ScriptedDice {
    fn roll(&mut self) -> u8 {
        if let Some(v) = self.rolls.pop_front() {
            self.last = v;
        }
        self.last
    }
}
