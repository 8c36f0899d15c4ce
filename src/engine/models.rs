//! Shared data types exchanged between a room and whoever fans its events out.

use serde::{Deserialize, Serialize};

use crate::engine::error::GameError;
use crate::games::ludo::modes::GameMode;
use crate::games::ludo::room::{GameState, MoveOutcome, RollOutcome};
use crate::games::ludo::types::Color;

pub type ParticipantId = String;
pub type RoomId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Team {
    #[serde(rename = "team1")]
    Team1,
    #[serde(rename = "team2")]
    Team2,
}

impl Team {
    pub fn of(color: Color) -> Team {
        match color {
            Color::Red | Color::Yellow => Team::Team1,
            Color::Green | Color::Blue => Team::Team2,
        }
    }

    pub fn colors(self) -> [Color; 2] {
        match self {
            Team::Team1 => [Color::Red, Color::Yellow],
            Team::Team2 => [Color::Green, Color::Blue],
        }
    }
}

/// A participant bound to one or two colors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seat {
    pub participant_id: ParticipantId,
    pub display_name: String,
    pub colors: Vec<Color>,
    #[serde(default)]
    pub team: Option<Team>,
    /// Color currently being played; only differs from `colors[0]` in
    /// dual-color rooms.
    pub active_color: Color,
}

impl Seat {
    pub fn new(
        participant_id: ParticipantId,
        display_name: String,
        colors: Vec<Color>,
        team: Option<Team>,
    ) -> Self {
        let active_color = colors.first().copied().unwrap_or(Color::Red);
        Self {
            participant_id,
            display_name,
            colors,
            team,
            active_color,
        }
    }
}

/// Result of a command: a typed outcome plus the events to fan out.
#[derive(Debug, Clone)]
pub struct Transition<O> {
    pub outcome: O,
    pub events: Vec<RoomEvent>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum RoomEvent {
    SeatJoined {
        room_id: RoomId,
        seat_index: usize,
        seat: Seat,
        state: GameState,
    },
    SeatLeft {
        room_id: RoomId,
        seat: Seat,
        state: GameState,
    },
    GameStarted {
        room_id: RoomId,
        state: GameState,
    },
    DiceRolled {
        room_id: RoomId,
        outcome: RollOutcome,
        state: GameState,
    },
    MoveMade {
        room_id: RoomId,
        outcome: MoveOutcome,
        state: GameState,
    },
    GameModeMismatch {
        room_id: RoomId,
        participant_id: ParticipantId,
        requested: GameMode,
        room_mode: GameMode,
    },
    RoomFull {
        room_id: RoomId,
        participant_id: ParticipantId,
        capacity: usize,
    },
}

impl RoomEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            RoomEvent::SeatJoined { .. } => "seat_joined",
            RoomEvent::SeatLeft { .. } => "seat_left",
            RoomEvent::GameStarted { .. } => "game_started",
            RoomEvent::DiceRolled { .. } => "dice_rolled",
            RoomEvent::MoveMade { .. } => "move_made",
            RoomEvent::GameModeMismatch { .. } => "game_mode_mismatch",
            RoomEvent::RoomFull { .. } => "room_full",
        }
    }

    /// Event announcing a rejected join, for the errors that have one.
    pub fn for_rejected_join(room_id: &str, participant_id: &str, err: &GameError) -> Option<Self> {
        match err {
            GameError::RoomFull { capacity } => Some(RoomEvent::RoomFull {
                room_id: room_id.into(),
                participant_id: participant_id.into(),
                capacity: *capacity,
            }),
            GameError::ModeMismatch { requested, room } => Some(RoomEvent::GameModeMismatch {
                room_id: room_id.into(),
                participant_id: participant_id.into(),
                requested: *requested,
                room_mode: *room,
            }),
            _ => None,
        }
    }
}

/// An accepted command, as recorded for replay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ActionRecord {
    Join {
        participant_id: ParticipantId,
        display_name: String,
    },
    Leave {
        participant_id: ParticipantId,
    },
    Start,
    Roll {
        seat: usize,
        dice: u8,
    },
    Move {
        seat: usize,
        color: Color,
        slot: u8,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_team_membership() {
        for color in Color::ALL {
            assert!(Team::of(color).colors().contains(&color));
        }
        assert_eq!(serde_json::to_string(&Team::Team2).unwrap(), "\"team2\"");
    }

    #[test]
    fn test_rejected_join_events() {
        let full = RoomEvent::for_rejected_join("r1", "p9", &GameError::RoomFull { capacity: 4 });
        assert_eq!(full.map(|e| e.event_type()), Some("room_full"));

        let err = GameError::ModeMismatch { requested: GameMode::Team, room: GameMode::Individual };
        let ev = RoomEvent::for_rejected_join("r1", "p9", &err).unwrap();
        let json = serde_json::to_value(&ev).unwrap();
        assert_eq!(json["event_type"], "game_mode_mismatch");
        assert_eq!(json["requested"], "team");
        assert_eq!(json["room_mode"], "individual");

        assert!(RoomEvent::for_rejected_join("r1", "p9", &GameError::AlreadySeated("p9".into())).is_none());
    }

    #[test]
    fn test_action_record_json_shape() {
        let rec = ActionRecord::Move { seat: 1, color: Color::Blue, slot: 3 };
        let json = serde_json::to_value(&rec).unwrap();
        assert_eq!(json, serde_json::json!({"action": "move", "seat": 1, "color": "blue", "slot": 3}));
    }
}
