//! Keyed store of live rooms with per-room locking and event fan-out.
//!
//! Locks are taken participant index first, then the room map, then the room.
//! None is held across an await. Rooms appear on first join and are dropped
//! when the last seat leaves.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, RwLock};

use tokio::sync::broadcast;

use crate::engine::config::{load_default_config, RoomConfig};
use crate::engine::dice::{DiceSource, SeededDice};
use crate::engine::error::GameError;
use crate::engine::models::*;
use crate::games::ludo::modes::GameMode;
use crate::games::ludo::room::{GameInstance, GameState, MoveOutcome, RollOutcome};
use crate::games::ludo::types::Color;

type DiceFactory = Box<dyn Fn(&str) -> Box<dyn DiceSource> + Send + Sync>;

/// One room: its game behind a single lock, plus the fan-out channel.
pub struct RoomHandle {
    game: Mutex<GameInstance>,
    events: broadcast::Sender<RoomEvent>,
}

impl RoomHandle {
    fn new(game: GameInstance, capacity: usize) -> Self {
        let (events, _) = broadcast::channel(capacity.max(1));
        Self {
            game: Mutex::new(game),
            events,
        }
    }

    fn lock(&self) -> MutexGuard<'_, GameInstance> {
        // A panic mid-command never leaves a half-applied state behind.
        self.game.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn publish(&self, events: Vec<RoomEvent>) {
        for event in events {
            // No subscribers is fine.
            let _ = self.events.send(event);
        }
    }
}

pub struct RoomDirectory {
    rooms: RwLock<HashMap<RoomId, Arc<RoomHandle>>>,
    participants: RwLock<HashMap<ParticipantId, RoomId>>,
    config: RoomConfig,
    dice: DiceFactory,
}

impl RoomDirectory {
    pub fn new(config: RoomConfig) -> Self {
        let seed = config.dice_seed;
        Self::with_dice_factory(
            config,
            Box::new(move |_room: &str| -> Box<dyn DiceSource> {
                match seed {
                    Some(s) => Box::new(SeededDice::new(s)),
                    None => Box::new(SeededDice::from_entropy()),
                }
            }),
        )
    }

    /// Directory configured from the first `ludo.toml` found, or defaults.
    pub fn from_default_config() -> Self {
        Self::new(load_default_config().room)
    }

    /// Build a directory whose new rooms take their dice from `dice`.
    pub fn with_dice_factory(config: RoomConfig, dice: DiceFactory) -> Self {
        Self {
            rooms: RwLock::new(HashMap::new()),
            participants: RwLock::new(HashMap::new()),
            config,
            dice,
        }
    }

    pub fn room_count(&self) -> usize {
        self.rooms.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Room a participant is currently seated in.
    pub fn room_of(&self, participant_id: &str) -> Option<RoomId> {
        self.participants
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(participant_id)
            .cloned()
    }

    fn room(&self, room_id: &str) -> Result<Arc<RoomHandle>, GameError> {
        self.rooms
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(room_id)
            .cloned()
            .ok_or_else(|| GameError::RoomNotFound(room_id.into()))
    }

    /// Subscribe to a live room. Rooms only come into being through `join`.
    pub fn subscribe(&self, room_id: &str) -> Result<broadcast::Receiver<RoomEvent>, GameError> {
        Ok(self.room(room_id)?.events.subscribe())
    }

    pub fn snapshot(&self, room_id: &str) -> Result<GameState, GameError> {
        Ok(self.room(room_id)?.lock().state().clone())
    }

    fn entry(
        &self,
        rooms: &mut HashMap<RoomId, Arc<RoomHandle>>,
        room_id: &str,
        mode: GameMode,
    ) -> Arc<RoomHandle> {
        rooms
            .entry(room_id.to_string())
            .or_insert_with(|| {
                tracing::info!(room = room_id, mode = %mode, "room created");
                let game = GameInstance::with_dice(room_id, mode, (self.dice)(room_id));
                Arc::new(RoomHandle::new(game, self.config.event_capacity))
            })
            .clone()
    }

    pub fn join(
        &self,
        room_id: &str,
        participant_id: &str,
        display_name: &str,
        mode: GameMode,
    ) -> Result<usize, GameError> {
        let mut participants = self.participants.write().unwrap_or_else(|e| e.into_inner());
        if participants.contains_key(participant_id) {
            return Err(GameError::AlreadySeated(participant_id.into()));
        }

        let mut rooms = self.rooms.write().unwrap_or_else(|e| e.into_inner());
        let handle = self.entry(&mut rooms, room_id, mode);
        let mut game = handle.lock();
        drop(rooms);

        match game.join(participant_id, display_name, mode) {
            Ok(transition) => {
                participants.insert(participant_id.into(), room_id.into());
                handle.publish(transition.events);
                Ok(transition.outcome)
            }
            Err(err) => {
                tracing::debug!(room = room_id, participant = participant_id, error = %err, "join rejected");
                if let Some(event) = RoomEvent::for_rejected_join(room_id, participant_id, &err) {
                    handle.publish(vec![event]);
                }
                let abandoned = game.is_empty();
                drop(game);
                drop(participants);
                if abandoned {
                    self.discard_if_empty(room_id);
                }
                Err(err)
            }
        }
    }

    pub fn start(&self, room_id: &str) -> Result<(), GameError> {
        let handle = self.room(room_id)?;
        let mut game = handle.lock();
        let transition = game.start()?;
        handle.publish(transition.events);
        Ok(transition.outcome)
    }

    pub fn roll_dice(&self, room_id: &str, participant_id: &str) -> Result<RollOutcome, GameError> {
        let handle = self.room(room_id)?;
        let mut game = handle.lock();
        let seat = seat_of(&game, participant_id)?;
        let transition = game.roll_dice(seat)?;
        handle.publish(transition.events);
        Ok(transition.outcome)
    }

    pub fn choose_move(
        &self,
        room_id: &str,
        participant_id: &str,
        color: Color,
        slot: u8,
    ) -> Result<MoveOutcome, GameError> {
        let handle = self.room(room_id)?;
        let mut game = handle.lock();
        let seat = seat_of(&game, participant_id)?;
        let transition = game.choose_move(seat, color, slot)?;
        handle.publish(transition.events);
        Ok(transition.outcome)
    }

    /// Free the participant's seat, wherever it is.
    pub fn leave(&self, participant_id: &str) -> Result<Seat, GameError> {
        let room_id = self
            .room_of(participant_id)
            .ok_or_else(|| GameError::UnknownParticipant(participant_id.into()))?;
        let handle = self.room(&room_id)?;

        let (seat, empty) = {
            let mut game = handle.lock();
            let transition = game.leave(participant_id)?;
            handle.publish(transition.events);
            (transition.outcome, game.is_empty())
        };
        self.participants
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .remove(participant_id);
        if empty {
            self.discard_if_empty(&room_id);
        }
        Ok(seat)
    }

    fn discard_if_empty(&self, room_id: &str) {
        let mut rooms = self.rooms.write().unwrap_or_else(|e| e.into_inner());
        let empty = rooms.get(room_id).map_or(false, |h| h.lock().is_empty());
        if empty {
            rooms.remove(room_id);
            tracing::info!(room = room_id, "room discarded");
        }
    }
}

impl Default for RoomDirectory {
    fn default() -> Self {
        Self::new(RoomConfig::default())
    }
}

fn seat_of(game: &GameInstance, participant_id: &str) -> Result<usize, GameError> {
    game.state()
        .seat_index(participant_id)
        .ok_or_else(|| GameError::UnknownParticipant(participant_id.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::dice::ScriptedDice;

    fn scripted(rolls: Vec<u8>) -> RoomDirectory {
        RoomDirectory::with_dice_factory(
            RoomConfig::default(),
            Box::new(move |_room: &str| -> Box<dyn DiceSource> { Box::new(ScriptedDice::new(rolls.clone())) }),
        )
    }

    #[test]
    fn test_room_lifecycle() {
        let dir = RoomDirectory::default();
        assert_eq!(dir.join("r1", "a", "A", GameMode::Individual).unwrap(), 0);
        assert_eq!(dir.join("r1", "b", "B", GameMode::Individual).unwrap(), 1);
        assert_eq!(dir.room_count(), 1);
        assert_eq!(dir.room_of("b").as_deref(), Some("r1"));

        dir.leave("a").unwrap();
        assert_eq!(dir.room_count(), 1);
        dir.leave("b").unwrap();
        assert_eq!(dir.room_count(), 0);
        assert_eq!(dir.snapshot("r1").err(), Some(GameError::RoomNotFound("r1".into())));
    }

    #[test]
    fn test_participant_seated_once() {
        let dir = RoomDirectory::default();
        dir.join("r1", "a", "A", GameMode::Individual).unwrap();
        let err = dir.join("r2", "a", "A", GameMode::Team).unwrap_err();
        assert_eq!(err, GameError::AlreadySeated("a".into()));
        assert_eq!(dir.room_count(), 1);
    }

    #[test]
    fn test_mode_mismatch_leaves_room_untouched() {
        let dir = RoomDirectory::default();
        dir.join("r1", "a", "A", GameMode::DualColor).unwrap();
        let err = dir.join("r1", "b", "B", GameMode::Team).unwrap_err();
        assert!(matches!(err, GameError::ModeMismatch { .. }));
        assert_eq!(dir.snapshot("r1").unwrap().seats.len(), 1);
        assert_eq!(dir.room_of("b"), None);
    }

    #[test]
    fn test_commands_resolve_seat_by_participant() {
        let dir = scripted(vec![6]);
        dir.join("r", "a", "A", GameMode::Individual).unwrap();
        dir.join("r", "b", "B", GameMode::Individual).unwrap();
        dir.start("r").unwrap();

        let err = dir.roll_dice("r", "b").unwrap_err();
        assert_eq!(err, GameError::NotYourTurn { seat: 1, active: 0 });
        assert_eq!(
            dir.roll_dice("r", "ghost").unwrap_err(),
            GameError::UnknownParticipant("ghost".into())
        );

        let roll = dir.roll_dice("r", "a").unwrap();
        assert_eq!(roll.dice, 6);
        assert_eq!(roll.color, Color::Red);
        let mv = dir.choose_move("r", "a", Color::Red, 1).unwrap();
        assert_eq!(mv.to, 39);
        assert!(!mv.play_again);
        assert_eq!(dir.snapshot("r").unwrap().active_seat(), Some(0));
    }

    #[test]
    fn test_directory_from_default_config() {
        let dir = RoomDirectory::from_default_config();
        dir.join("r", "a", "A", GameMode::Team).unwrap();
        assert!(dir.subscribe("r").is_ok());
        assert!(dir.subscribe("elsewhere").is_err());
        assert_eq!(dir.room_count(), 1);
    }
}
