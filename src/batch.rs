//! Batch mode: many unattended matches in parallel with statistics
//!
//! Each match gets its own seed derived from a master seed, so a batch is
//! reproducible no matter how rayon schedules it.

use crate::auto::{act_once, ActOutcome, DefaultPolicy};
use crate::config::derive_energy_cap;
use crate::content::{card_pool, demo_player, draft_opponent, RosterSpec};
use crate::core::IdAllocator;
use crate::game::{MatchController, MatchOutcome, PresentationEvent, StepLog, VerbosityLevel, DEFAULT_MAX_ROUNDS};
use crate::{BattleError, Result};
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;
use rayon::prelude::*;
use rustc_hash::FxHashMap;

#[derive(Debug, Clone)]
pub struct BatchOptions {
    pub games: usize,
    pub master_seed: u64,
    /// Budget for drafted opponents; derived per match from its seed if unset
    pub energy_cap: Option<u32>,
    pub max_rounds: u32,
    /// Player lineup; the demo lineup if unset
    pub player: Option<RosterSpec>,
}

impl Default for BatchOptions {
    fn default() -> Self {
        BatchOptions {
            games: 100,
            master_seed: 42,
            energy_cap: None,
            max_rounds: DEFAULT_MAX_ROUNDS,
            player: None,
        }
    }
}

/// Result of one match in a batch
#[derive(Debug, Clone)]
pub struct GameSummary {
    pub index: usize,
    pub seed: u64,
    pub outcome: MatchOutcome,
    pub rounds: u32,
    pub damage: FxHashMap<String, i64>,
}

#[derive(Debug, Clone, Default)]
pub struct BatchStats {
    pub games: usize,
    pub wins: usize,
    pub losses: usize,
    pub draws: usize,
    pub total_rounds: u64,
    pub damage_by_name: FxHashMap<String, i64>,
}

impl BatchStats {
    pub fn record(&mut self, game: &GameSummary) {
        self.games += 1;
        match game.outcome {
            MatchOutcome::Win => self.wins += 1,
            MatchOutcome::Loss => self.losses += 1,
            MatchOutcome::Draw => self.draws += 1,
        }
        self.total_rounds += u64::from(game.rounds);
        for (name, damage) in &game.damage {
            *self.damage_by_name.entry(name.clone()).or_insert(0) += damage;
        }
    }

    pub fn average_rounds(&self) -> f64 {
        if self.games == 0 {
            return 0.0;
        }
        self.total_rounds as f64 / self.games as f64
    }

    /// Highest total damage first, ties by name
    pub fn top_damage_dealers(&self, n: usize) -> Vec<(String, i64)> {
        let mut dealers: Vec<(String, i64)> = self
            .damage_by_name
            .iter()
            .map(|(name, damage)| (name.clone(), *damage))
            .collect();
        dealers.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        dealers.truncate(n);
        dealers
    }
}

/// Seed for match `index` of a batch
pub fn game_seed(master_seed: u64, index: usize) -> u64 {
    master_seed.wrapping_add((index as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15))
}

/// Play one unattended match to completion
pub fn play_one(index: usize, seed: u64, options: &BatchOptions) -> Result<GameSummary> {
    let cap = options.energy_cap.unwrap_or_else(|| derive_energy_cap(seed));
    let mut draft_rng = Xoshiro256PlusPlus::seed_from_u64(seed);
    let opponent = draft_opponent(&card_pool(), cap, &mut draft_rng);
    let player = options.player.clone().unwrap_or_else(demo_player);

    let mut ids = IdAllocator::new();
    let player = player.build(&mut ids, None)?;
    let enemy = opponent.build(&mut ids, Some(cap))?;

    let mut controller = MatchController::new()
        .with_seed(Some(seed))
        .with_max_rounds(options.max_rounds)
        .with_verbosity(VerbosityLevel::Silent)
        .with_step_log(StepLog::disabled());
    controller.submit_teams(player, enemy);

    let mut policy = DefaultPolicy;
    let mut damage: FxHashMap<String, i64> = FxHashMap::default();
    while !controller.is_over() {
        if controller.has_pending_effect() {
            controller.commit_effect_instant();
            continue;
        }
        match act_once(&mut controller, &mut policy) {
            ActOutcome::Deferred => {
                if let Some(PresentationEvent::Attack {
                    side,
                    attacker,
                    damage: dealt,
                    ..
                }) = controller.last_event().map(|e| e.event.clone())
                {
                    if let Some(c) = controller.field().roster(side).get(attacker) {
                        *damage.entry(c.name.clone()).or_insert(0) += i64::from(dealt);
                    }
                }
            }
            ActOutcome::Idle => break,
            ActOutcome::Applied | ActOutcome::Blocked => {}
        }
    }

    let result = controller
        .result()
        .ok_or_else(|| BattleError::InvalidArgument(format!("match {index} ended without a result")))?;
    Ok(GameSummary {
        index,
        seed,
        outcome: result.outcome,
        rounds: result.rounds_played,
        damage,
    })
}

/// Run every match of the batch in parallel and fold the results in order
pub fn run_batch(options: &BatchOptions) -> Result<BatchStats> {
    if options.games == 0 {
        return Err(BattleError::InvalidArgument("batch needs at least one game".to_string()));
    }

    let summaries: Vec<GameSummary> = (0..options.games)
        .into_par_iter()
        .map(|index| play_one(index, game_seed(options.master_seed, index), options))
        .collect::<Result<_>>()?;

    let mut stats = BatchStats::default();
    for summary in &summaries {
        stats.record(summary);
    }
    Ok(stats)
}

pub fn print_report(stats: &BatchStats, elapsed: std::time::Duration) {
    println!("\n=== Batch Complete ===");
    println!("Total games played: {}", stats.games);
    println!("Elapsed time: {:.2}s", elapsed.as_secs_f64());
    if elapsed.as_secs_f64() > 0.0 {
        println!("Games per second: {:.2}", stats.games as f64 / elapsed.as_secs_f64());
    }

    if stats.games > 0 {
        let pct = |n: usize| 100.0 * n as f64 / stats.games as f64;
        println!("\n=== Outcomes ===");
        println!("Wins: {} ({:.1}%)", stats.wins, pct(stats.wins));
        println!("Losses: {} ({:.1}%)", stats.losses, pct(stats.losses));
        println!("Draws: {} ({:.1}%)", stats.draws, pct(stats.draws));
        println!("Average rounds: {:.2}", stats.average_rounds());
    }

    println!("\n=== Top Damage Dealers ===");
    for (name, damage) in stats.top_damage_dealers(5) {
        println!("  {}: {}", name, damage);
    }
}
