//! Criterion benchmarks for the roll/move hot path.
//!
//! Run with:
//!     cargo bench --bench turn_cycle

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use ludo_game_engine::engine::simulator::{play_first_activation, replay};
use ludo_game_engine::games::ludo::movement::{evaluate_roll, resolve_move};
use ludo_game_engine::games::ludo::{Color, GameMode, GameState};

struct Fixture {
    label: String,
    state: GameState,
}

/// Mid-game positions taken from a seeded game at a few points of its log.
fn fixtures() -> Vec<Fixture> {
    let played = match play_first_activation(GameMode::Individual, 4, 7, 20_000) {
        Ok(p) => p,
        Err(e) => panic!("seeded game failed: {e}"),
    };

    let mut out = Vec::new();
    for pct in [10, 40, 70] {
        let cut = played.log.len() * pct / 100;
        let game = match replay("bench", GameMode::Individual, &played.log[..cut]) {
            Ok(g) => g,
            Err(e) => panic!("replay failed at {pct}%: {e}"),
        };
        out.push(Fixture {
            label: format!("{pct}pct"),
            state: game.state().clone(),
        });
    }
    out
}

fn bench_evaluate_roll(c: &mut Criterion) {
    let fixtures = fixtures();
    let mut group = c.benchmark_group("evaluate_roll");

    for fixture in &fixtures {
        group.bench_with_input(BenchmarkId::new("all_faces", &fixture.label), fixture, |b, f| {
            let color = f.state.turn.active_entry().map(|e| e.color).unwrap_or(Color::Red);
            b.iter(|| {
                let mut movable = 0usize;
                for dice in 1..=6u8 {
                    movable += evaluate_roll(&f.state.board, color, dice).activations.len();
                }
                movable
            });
        });
    }

    group.finish();
}

fn bench_roll_and_move(c: &mut Criterion) {
    let fixtures = fixtures();
    let mut group = c.benchmark_group("roll_and_move");

    for fixture in &fixtures {
        group.bench_with_input(BenchmarkId::new("full_turn", &fixture.label), fixture, |b, f| {
            b.iter(|| {
                let mut moves = 0usize;
                for dice in 1..=6u8 {
                    let color = match f.state.turn.active_entry() {
                        Some(e) => e.color,
                        None => return moves,
                    };
                    let eval = evaluate_roll(&f.state.board, color, dice);
                    for a in &eval.activations {
                        if resolve_move(&eval.board, color, a.slot).is_some() {
                            moves += 1;
                        }
                    }
                }
                moves
            });
        });
    }

    group.finish();
}

fn bench_state_clone(c: &mut Criterion) {
    let fixtures = fixtures();
    let mut group = c.benchmark_group("state_clone");

    for fixture in &fixtures {
        group.bench_with_input(BenchmarkId::new("clone", &fixture.label), &fixture.state, |b, state| {
            b.iter(|| state.clone());
        });
    }

    group.finish();
}

criterion_group!(benches, bench_evaluate_roll, bench_roll_and_move, bench_state_clone);
criterion_main!(benches);
