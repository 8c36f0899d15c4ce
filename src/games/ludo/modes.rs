//! Mode policies: who owns which colors, how many seats a room takes, and what
//! counts as a win.
//!
//! Dice and move rules never vary by mode; only the hooks on [`ModePolicy`] do.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::engine::models::{ParticipantId, Seat, Team};

use super::turn::TurnEntry;
use super::types::{Board, Color};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GameMode {
    Individual,
    Team,
    DualColor,
}

impl GameMode {
    pub const ALL: [GameMode; 3] = [GameMode::Individual, GameMode::Team, GameMode::DualColor];

    pub fn policy(self) -> &'static dyn ModePolicy {
        match self {
            GameMode::Individual => &IndividualPolicy,
            GameMode::Team => &TeamPolicy,
            GameMode::DualColor => &DualColorPolicy,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            GameMode::Individual => "individual",
            GameMode::Team => "team",
            GameMode::DualColor => "dual-color",
        }
    }
}

impl fmt::Display for GameMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GameMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "individual" => Ok(GameMode::Individual),
            "team" => Ok(GameMode::Team),
            "dual-color" | "dual_color" | "dual" => Ok(GameMode::DualColor),
            other => Err(format!("unknown game mode: {other}")),
        }
    }
}

/// Colors (and team tag) handed to the next seat that joins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeatAssignment {
    pub colors: Vec<Color>,
    pub team: Option<Team>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Winner {
    Seat {
        participant_id: ParticipantId,
        colors: Vec<Color>,
    },
    Team {
        team: Team,
        participant_ids: Vec<ParticipantId>,
    },
}

/// Per-mode rules. Implemented once per [`GameMode`] variant.
pub trait ModePolicy: Send + Sync {
    fn mode(&self) -> GameMode;
    fn capacity(&self) -> usize;
    fn min_seats(&self) -> usize;

    fn can_start(&self, seats: usize) -> bool {
        seats >= self.min_seats() && seats <= self.capacity()
    }

    /// Colors for the next seat, or `None` when the room is full.
    fn assign(&self, seats: &[Seat]) -> Option<SeatAssignment>;

    /// Turn order for the current seats. One entry per seat by default.
    fn turn_order(&self, seats: &[Seat]) -> Vec<TurnEntry> {
        seats
            .iter()
            .enumerate()
            .flat_map(|(i, s)| s.colors.iter().map(move |&color| TurnEntry { seat: i, color }))
            .collect()
    }

    /// Evaluated after `mover` finishes a coin.
    fn winner(&self, board: &Board, seats: &[Seat], mover: usize) -> Option<Winner>;
}

fn first_free_color(seats: &[Seat]) -> Option<Color> {
    Color::ALL
        .into_iter()
        .find(|c| !seats.iter().any(|s| s.colors.contains(c)))
}

/// Win for a seat that owns every color it plays outright.
fn seat_winner(board: &Board, seats: &[Seat], mover: usize) -> Option<Winner> {
    let seat = seats.get(mover)?;
    if seat.colors.iter().all(|&c| board.all_finished(c)) {
        Some(Winner::Seat {
            participant_id: seat.participant_id.clone(),
            colors: seat.colors.clone(),
        })
    } else {
        None
    }
}

/// Up to four seats, one color each.
pub struct IndividualPolicy;

impl ModePolicy for IndividualPolicy {
    fn mode(&self) -> GameMode {
        GameMode::Individual
    }
    fn capacity(&self) -> usize {
        4
    }
    fn min_seats(&self) -> usize {
        2
    }

    fn assign(&self, seats: &[Seat]) -> Option<SeatAssignment> {
        if seats.len() >= self.capacity() {
            return None;
        }
        first_free_color(seats).map(|c| SeatAssignment { colors: vec![c], team: None })
    }

    fn winner(&self, board: &Board, seats: &[Seat], mover: usize) -> Option<Winner> {
        seat_winner(board, seats, mover)
    }
}

/// Four seats in two teams: red + yellow against green + blue.
pub struct TeamPolicy;

impl ModePolicy for TeamPolicy {
    fn mode(&self) -> GameMode {
        GameMode::Team
    }
    fn capacity(&self) -> usize {
        4
    }
    fn min_seats(&self) -> usize {
        4
    }

    fn assign(&self, seats: &[Seat]) -> Option<SeatAssignment> {
        if seats.len() >= self.capacity() {
            return None;
        }
        first_free_color(seats).map(|c| SeatAssignment {
            colors: vec![c],
            team: Some(Team::of(c)),
        })
    }

    fn winner(&self, board: &Board, seats: &[Seat], mover: usize) -> Option<Winner> {
        let team = seats.get(mover)?.team?;
        if !team.colors().iter().all(|&c| board.all_finished(c)) {
            return None;
        }
        Some(Winner::Team {
            team,
            participant_ids: seats
                .iter()
                .filter(|s| s.team == Some(team))
                .map(|s| s.participant_id.clone())
                .collect(),
        })
    }
}

/// Two seats with two colors each; turns walk colors, alternating seats.
pub struct DualColorPolicy;

const DUAL_PAIRS: [[Color; 2]; 2] = [[Color::Red, Color::Green], [Color::Yellow, Color::Blue]];

impl ModePolicy for DualColorPolicy {
    fn mode(&self) -> GameMode {
        GameMode::DualColor
    }
    fn capacity(&self) -> usize {
        2
    }
    fn min_seats(&self) -> usize {
        2
    }

    fn assign(&self, seats: &[Seat]) -> Option<SeatAssignment> {
        DUAL_PAIRS
            .iter()
            .find(|pair| !seats.iter().any(|s| s.colors.contains(&pair[0])))
            .map(|pair| SeatAssignment { colors: pair.to_vec(), team: None })
    }

    fn turn_order(&self, seats: &[Seat]) -> Vec<TurnEntry> {
        let rounds = seats.iter().map(|s| s.colors.len()).max().unwrap_or(0);
        let mut order = Vec::new();
        for round in 0..rounds {
            for (i, seat) in seats.iter().enumerate() {
                if let Some(&color) = seat.colors.get(round) {
                    order.push(TurnEntry { seat: i, color });
                }
            }
        }
        order
    }

    fn winner(&self, board: &Board, seats: &[Seat], mover: usize) -> Option<Winner> {
        seat_winner(board, seats, mover)
    }
}
