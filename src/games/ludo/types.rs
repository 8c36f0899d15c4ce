//! Ludo board types: colors, coins and the four-color board.
//!
//! Coordinates are a single integer per coin, split in three bands:
//! `0..52` is the shared outer track, `100..200` a color-private home stretch,
//! and `200..` the jail cells coins wait in before they are released.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A board coordinate. See the module docs for the banding.
pub type Cell = u16;

/// Number of cells on the shared outer track.
pub const TRACK_LEN: Cell = 52;
/// First coordinate of the home-stretch band.
pub const HOME_BASE: Cell = 100;
/// First coordinate of the jail band.
pub const JAIL_BASE: Cell = 200;
/// Coins per color.
pub const COINS_PER_COLOR: usize = 4;

/// Outer-track cells where no capture can happen.
pub const SAFE_CELLS: [Cell; 8] = [0, 8, 13, 21, 26, 34, 39, 47];

pub fn is_safe_cell(cell: Cell) -> bool {
    SAFE_CELLS.contains(&cell)
}

pub fn is_jail(cell: Cell) -> bool {
    cell >= JAIL_BASE
}

pub fn is_outer_track(cell: Cell) -> bool {
    cell < TRACK_LEN
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Red,
    Green,
    Yellow,
    Blue,
}

/// Fixed per-color coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorMeta {
    /// Cell a released coin lands on.
    pub start: Cell,
    /// Last outer-track cell before the coin turns into its home stretch.
    pub home_turn: Cell,
    /// Final cell of the home stretch.
    pub finish: Cell,
    /// Jail cell of each slot, indexed by `slot - 1`.
    pub jail: [Cell; COINS_PER_COLOR],
}

impl Color {
    /// Seat-assignment order used by the individual and team modes.
    pub const ALL: [Color; 4] = [Color::Red, Color::Green, Color::Yellow, Color::Blue];

    pub fn index(self) -> usize {
        match self {
            Color::Red => 0,
            Color::Green => 1,
            Color::Yellow => 2,
            Color::Blue => 3,
        }
    }

    pub fn meta(self) -> &'static ColorMeta {
        &COLOR_META[self.index()]
    }

    pub fn finish(self) -> Cell {
        self.meta().finish
    }

    /// Fixed jail cell of coin `slot`; `None` if `slot` is not in 1..=4.
    pub fn jail_cell(self, slot: u8) -> Option<Cell> {
        slot.checked_sub(1)
            .and_then(|i| self.meta().jail.get(i as usize).copied())
    }

    /// Single-letter prefix used in coin labels ("G1", "R4").
    pub fn letter(self) -> char {
        match self {
            Color::Red => 'R',
            Color::Green => 'G',
            Color::Yellow => 'Y',
            Color::Blue => 'B',
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Color::Red => "red",
            Color::Green => "green",
            Color::Yellow => "yellow",
            Color::Blue => "blue",
        };
        f.write_str(name)
    }
}

const COLOR_META: [ColorMeta; 4] = [
    // red
    ColorMeta { start: 39, home_turn: 37, finish: 143, jail: [249, 251, 259, 261] },
    // green
    ColorMeta { start: 0, home_turn: 50, finish: 104, jail: [210, 212, 220, 222] },
    // yellow
    ColorMeta { start: 26, home_turn: 24, finish: 130, jail: [236, 238, 246, 248] },
    // blue
    ColorMeta { start: 13, home_turn: 11, finish: 117, jail: [223, 225, 233, 235] },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoinStatus {
    Idle,
    /// Movable for the current roll; `next_position` holds its destination.
    Active,
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coin {
    pub color: Color,
    /// 1..=4
    pub slot: u8,
    pub status: CoinStatus,
    pub position: Cell,
    pub next_position: Cell,
    pub jail_position: Cell,
}

impl Coin {
    fn jailed(color: Color, slot: u8, jail: Cell) -> Self {
        Self {
            color,
            slot,
            status: CoinStatus::Idle,
            position: jail,
            next_position: jail,
            jail_position: jail,
        }
    }

    pub fn label(&self) -> String {
        format!("{}{}", self.color.letter(), self.slot)
    }

    pub fn is_finished(&self) -> bool {
        self.status == CoinStatus::Finished
    }

    /// Send the coin back to its own jail cell.
    pub fn send_to_jail(&mut self) {
        self.position = self.jail_position;
        self.next_position = self.jail_position;
        self.status = CoinStatus::Idle;
    }
}

/// Every coin of every color. A plain value: transitions copy it, change the
/// copy and hand it back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    coins: [[Coin; COINS_PER_COLOR]; 4],
}

impl Board {
    pub fn new() -> Self {
        let coins = Color::ALL.map(|color| {
            let jail = color.meta().jail;
            [1u8, 2, 3, 4].map(|slot| Coin::jailed(color, slot, jail[slot as usize - 1]))
        });
        Self { coins }
    }

    /// Coin by color and slot; `None` if `slot` is not in 1..=4.
    pub fn coin(&self, color: Color, slot: u8) -> Option<&Coin> {
        slot.checked_sub(1)
            .and_then(|i| self.coins[color.index()].get(i as usize))
    }

    pub fn coin_mut(&mut self, color: Color, slot: u8) -> Option<&mut Coin> {
        slot.checked_sub(1)
            .and_then(|i| self.coins[color.index()].get_mut(i as usize))
    }

    pub fn coins(&self, color: Color) -> &[Coin; COINS_PER_COLOR] {
        &self.coins[color.index()]
    }

    pub fn coins_mut(&mut self, color: Color) -> &mut [Coin; COINS_PER_COLOR] {
        &mut self.coins[color.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Coin> {
        self.coins.iter().flatten()
    }

    pub fn all_finished(&self, color: Color) -> bool {
        self.coins(color).iter().all(Coin::is_finished)
    }

    pub fn active_slots(&self, color: Color) -> Vec<u8> {
        self.coins(color)
            .iter()
            .filter(|c| c.status == CoinStatus::Active)
            .map(|c| c.slot)
            .collect()
    }

    /// First coin of a color other than `mover` sitting on `cell`.
    pub fn opponent_at(&self, cell: Cell, mover: Color) -> Option<&Coin> {
        self.iter()
            .find(|c| c.color != mover && c.position == cell)
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}
