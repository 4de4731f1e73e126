//! Performance benchmarks for the battle simulator
//!
//! Measures full unattended matches (demo player against a drafted opponent,
//! instant commits, no step recording) and the initiative resolver alone.

use card_battle_sim::{
    auto::{drain, DefaultPolicy},
    config::derive_energy_cap,
    content::{card_pool, demo_enemy, demo_player, draft_opponent},
    core::{IdAllocator, MatchField, Roster},
    game::{MatchController, StepLog, VerbosityLevel},
    rules::combined_order,
};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::SeedableRng;
use rand_chacha::ChaCha12Rng;

fn teams_for(seed: u64) -> (Roster, Roster) {
    let cap = derive_energy_cap(seed);
    let opponent = draft_opponent(&card_pool(), cap, &mut ChaCha12Rng::seed_from_u64(seed));
    let mut ids = IdAllocator::new();
    let player = demo_player().build(&mut ids, None).expect("demo roster is valid");
    let enemy = opponent.build(&mut ids, Some(cap)).expect("drafted roster fits its cap");
    (player, enemy)
}

/// Allocate a fresh controller for each match
fn bench_match_fresh(c: &mut Criterion) {
    let mut group = c.benchmark_group("match");

    for seed in [42u64, 1234] {
        let (player, enemy) = teams_for(seed);
        group.bench_with_input(BenchmarkId::new("fresh", seed), &seed, |b, &seed| {
            b.iter(|| {
                let mut controller = MatchController::new()
                    .with_seed(Some(seed))
                    .with_verbosity(VerbosityLevel::Silent)
                    .with_step_log(StepLog::disabled());
                controller.submit_teams(player.clone(), enemy.clone());
                black_box(drain(&mut controller, &mut DefaultPolicy))
            })
        });
    }

    group.finish();
}

/// Same match with snapshots recorded for replay
fn bench_match_recorded(c: &mut Criterion) {
    let (player, enemy) = teams_for(42);
    c.bench_function("match/recorded", |b| {
        b.iter(|| {
            let mut controller = MatchController::new()
                .with_seed(Some(42))
                .with_verbosity(VerbosityLevel::Silent);
            controller.submit_teams(player.clone(), enemy.clone());
            black_box(drain(&mut controller, &mut DefaultPolicy));
            black_box(controller.steps().len())
        })
    });
}

fn bench_initiative(c: &mut Criterion) {
    let mut ids = IdAllocator::new();
    let player = demo_player().build(&mut ids, None).expect("demo roster is valid");
    let enemy = demo_enemy().build(&mut ids, None).expect("demo roster is valid");
    let field = MatchField::new(player, enemy);

    c.bench_function("initiative/combined_order", |b| {
        b.iter(|| black_box(combined_order(black_box(&field), Some(42))))
    });
}

criterion_group!(benches, bench_match_fresh, bench_match_recorded, bench_initiative);
criterion_main!(benches);
