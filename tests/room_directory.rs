//! Room directory fan-out: subscribers see every accepted command and the
//! join rejections that carry an event.
//!
//! Run with:
//!     cargo test --test room_directory

use std::sync::Arc;

use tokio::sync::broadcast::error::TryRecvError;

use ludo_game_engine::engine::config::RoomConfig;
use ludo_game_engine::engine::dice::{DiceSource, ScriptedDice};
use ludo_game_engine::engine::directory::RoomDirectory;
use ludo_game_engine::engine::error::GameError;
use ludo_game_engine::engine::models::RoomEvent;
use ludo_game_engine::games::ludo::{Color, GameMode, GamePhase};

fn directory(rolls: Vec<u8>) -> RoomDirectory {
    RoomDirectory::with_dice_factory(
        RoomConfig::default(),
        Box::new(move |_room: &str| -> Box<dyn DiceSource> { Box::new(ScriptedDice::new(rolls.clone())) }),
    )
}

#[tokio::test]
async fn events_fan_out_to_every_subscriber() {
    let dir = directory(vec![6, 3]);
    dir.join("r", "a", "A", GameMode::Individual).unwrap();
    let mut first = dir.subscribe("r").unwrap();
    let mut second = dir.subscribe("r").unwrap();
    dir.join("r", "b", "B", GameMode::Individual).unwrap();
    dir.start("r").unwrap();
    dir.roll_dice("r", "a").unwrap();
    dir.choose_move("r", "a", Color::Red, 3).unwrap();

    let mut kinds = Vec::new();
    for _ in 0..4 {
        kinds.push(first.recv().await.unwrap().event_type());
    }
    assert_eq!(kinds, vec!["seat_joined", "game_started", "dice_rolled", "move_made"]);

    // Late subscribers only see what happened after they joined.
    assert!(matches!(second.recv().await.unwrap(), RoomEvent::SeatJoined { seat_index: 1, .. }));
    assert!(matches!(second.recv().await.unwrap(), RoomEvent::GameStarted { .. }));

    match second.recv().await.unwrap() {
        RoomEvent::DiceRolled { outcome, state, .. } => {
            assert_eq!(outcome.dice, 6);
            assert!(outcome.can_play);
            assert!(state.board_active());
        }
        other => panic!("expected dice_rolled, got {}", other.event_type()),
    }
    match second.recv().await.unwrap() {
        RoomEvent::MoveMade { outcome, state, .. } => {
            assert_eq!(outcome.to, 39);
            assert_eq!(state.board.coin(Color::Red, 3).unwrap().position, 39);
            assert_eq!(state, dir.snapshot("r").unwrap());
        }
        other => panic!("expected move_made, got {}", other.event_type()),
    }
    assert!(matches!(second.try_recv(), Err(TryRecvError::Empty)));
}

#[tokio::test]
async fn subscribing_never_creates_rooms() {
    let dir = directory(vec![]);
    for r in 0..100 {
        let room = format!("watch-{r}");
        assert_eq!(dir.subscribe(&room).err(), Some(GameError::RoomNotFound(room)));
    }
    assert_eq!(dir.room_count(), 0);

    dir.join("watch-0", "a", "A", GameMode::Individual).unwrap();
    let mut rx = dir.subscribe("watch-0").unwrap();
    dir.leave("a").unwrap();
    assert!(matches!(rx.recv().await.unwrap(), RoomEvent::SeatLeft { .. }));
    assert_eq!(dir.room_count(), 0);
}

#[tokio::test]
async fn rejected_joins_broadcast_their_event() {
    let dir = directory(vec![]);
    dir.join("duo", "a", "A", GameMode::DualColor).unwrap();
    dir.join("duo", "b", "B", GameMode::DualColor).unwrap();
    let mut rx = dir.subscribe("duo").unwrap();

    let err = dir.join("duo", "c", "C", GameMode::DualColor).unwrap_err();
    assert_eq!(err, GameError::RoomFull { capacity: 2 });
    match rx.recv().await.unwrap() {
        RoomEvent::RoomFull { participant_id, capacity, .. } => {
            assert_eq!(participant_id, "c");
            assert_eq!(capacity, 2);
        }
        other => panic!("expected room_full, got {}", other.event_type()),
    }

    let err = dir.join("duo", "d", "D", GameMode::Individual).unwrap_err();
    assert!(matches!(err, GameError::ModeMismatch { .. }));
    match rx.recv().await.unwrap() {
        RoomEvent::GameModeMismatch { requested, room_mode, .. } => {
            assert_eq!(requested, GameMode::Individual);
            assert_eq!(room_mode, GameMode::DualColor);
        }
        other => panic!("expected game_mode_mismatch, got {}", other.event_type()),
    }

    // Illegal commands are reported to the caller only.
    assert!(dir.roll_dice("duo", "a").is_err());
    assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
    assert_eq!(dir.room_of("c"), None);
}

#[tokio::test]
async fn empty_room_is_discarded() {
    let dir = directory(vec![2]);
    dir.join("r", "a", "A", GameMode::Individual).unwrap();
    dir.join("r", "b", "B", GameMode::Individual).unwrap();
    dir.start("r").unwrap();
    let mut rx = dir.subscribe("r").unwrap();

    let seat = dir.leave("a").unwrap();
    assert_eq!(seat.participant_id, "a");
    match rx.recv().await.unwrap() {
        RoomEvent::SeatLeft { state, .. } => {
            assert_eq!(state.seats.len(), 1);
            assert_eq!(state.phase, GamePhase::InProgress);
            assert_eq!(state.active_seat(), Some(0));
        }
        other => panic!("expected seat_left, got {}", other.event_type()),
    }

    dir.leave("b").unwrap();
    assert_eq!(dir.room_count(), 0);
    assert_eq!(dir.leave("b").unwrap_err(), GameError::UnknownParticipant("b".into()));
    assert!(matches!(dir.subscribe("r"), Err(GameError::RoomNotFound(_))));

    // Same id starts over as a fresh lobby in whatever mode joins first.
    dir.join("r", "c", "C", GameMode::Team).unwrap();
    assert_eq!(dir.snapshot("r").unwrap().mode, GameMode::Team);
}

#[tokio::test]
async fn rooms_are_independent_across_tasks() {
    let dir = Arc::new(directory(vec![2]));
    let mut handles = Vec::new();
    for r in 0..8 {
        let dir = dir.clone();
        handles.push(tokio::spawn(async move {
            let room = format!("room-{r}");
            dir.join(&room, &format!("{room}-a"), "A", GameMode::Individual)?;
            dir.join(&room, &format!("{room}-b"), "B", GameMode::Individual)?;
            dir.start(&room)?;
            let out = dir.roll_dice(&room, &format!("{room}-a"))?;
            Ok::<_, GameError>(out.dice)
        }));
    }
    for h in handles {
        assert_eq!(h.await.unwrap().unwrap(), 2);
    }
    assert_eq!(dir.room_count(), 8);
    for r in 0..8 {
        assert_eq!(dir.snapshot(&format!("room-{r}")).unwrap().active_seat(), Some(1));
    }
}
