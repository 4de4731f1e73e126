//! Card Battle Simulator - Main Binary
//!
//! Plays autonomous matches on the console, runs unattended batches and
//! writes sample configuration files.

use card_battle_sim::{
    auto::DefaultPolicy,
    batch::{print_report, run_batch, BatchOptions},
    config::{resolve_setup, ConfigProvider, JsonFileProvider, MatchSetup, NoProvider, RunMode},
    content::{card_pool, demo_enemy, demo_player, draft_opponent, RosterSpec},
    core::IdAllocator,
    game::{MatchController, VerbosityLevel, DEFAULT_MAX_ROUNDS},
    rules::BattleSpeed,
    session::BattleSession,
    Result,
};
use clap::{Parser, Subcommand};
use rand::SeedableRng;
use rand_chacha::ChaCha12Rng;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::broadcast::error::RecvError;

/// Nominal impact delay of one attack or heal animation at normal speed
const IMPACT_DELAY: Duration = Duration::from_millis(150);

#[derive(Parser)]
#[command(name = "battle")]
#[command(about = "Card Battle Simulator - autonomous two-sided card battles", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play one autonomous match on the console
    Play {
        /// Player roster (JSON); the demo lineup if omitted
        #[arg(long, value_name = "ROSTER_FILE")]
        player: Option<PathBuf>,

        /// Opponent roster (JSON); drafted from the card pool if omitted
        #[arg(long, value_name = "ROSTER_FILE")]
        enemy: Option<PathBuf>,

        /// Use the fixed demo opponent instead of drafting one
        #[arg(long, conflicts_with = "enemy")]
        demo_enemy: bool,

        /// Match configuration file (JSON with matchId, seed, energyCap)
        #[arg(long, value_name = "CONFIG_FILE")]
        config: Option<PathBuf>,

        /// How to acquire the match configuration
        #[arg(long, value_enum, default_value = "offline")]
        mode: RunMode,

        /// Fixed seed (overrides configuration)
        #[arg(long)]
        seed: Option<u64>,

        /// Battle speed: slow, normal or fast
        #[arg(long, default_value = "normal")]
        speed: BattleSpeed,

        /// Skip presentation delays and tempo ticks
        #[arg(long)]
        fast_forward: bool,

        /// Round cap before the match is called a draw
        #[arg(long, default_value_t = DEFAULT_MAX_ROUNDS)]
        max_rounds: u32,

        /// Verbosity level (0=silent, 1=minimal, 2=normal, 3=verbose)
        #[arg(long, short = 'v', default_value = "normal")]
        verbosity: VerbosityLevel,
    },

    /// Run many unattended matches in parallel and report statistics
    Batch {
        /// Number of matches
        #[arg(long, default_value = "100")]
        games: usize,

        /// Master seed; each match derives its own seed from it
        #[arg(long, default_value = "42")]
        seed: u64,

        /// Budget for drafted opponents (derived per match if omitted)
        #[arg(long)]
        energy_cap: Option<u32>,

        /// Player roster (JSON); the demo lineup if omitted
        #[arg(long, value_name = "ROSTER_FILE")]
        player: Option<PathBuf>,

        /// Round cap before a match is called a draw
        #[arg(long, default_value_t = DEFAULT_MAX_ROUNDS)]
        max_rounds: u32,
    },

    /// Print (or write) a sample configuration and the demo rosters
    DemoConfig {
        /// Seed to put into the sample configuration
        #[arg(long, default_value = "42")]
        seed: u64,

        /// Write match.json, player.json and enemy.json into this directory
        #[arg(long, value_name = "DIR")]
        out: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Play {
            player,
            enemy,
            demo_enemy,
            config,
            mode,
            seed,
            speed,
            fast_forward,
            max_rounds,
            verbosity,
        } => {
            run_play(
                player,
                enemy,
                demo_enemy,
                config,
                mode,
                seed,
                speed,
                fast_forward,
                max_rounds,
                verbosity,
            )
            .await?
        }
        Commands::Batch {
            games,
            seed,
            energy_cap,
            player,
            max_rounds,
        } => run_batch_mode(games, seed, energy_cap, player, max_rounds)?,
        Commands::DemoConfig { seed, out } => run_demo_config(seed, out).await?,
    }

    Ok(())
}

#[allow(clippy::too_many_arguments)]
async fn run_play(
    player_path: Option<PathBuf>,
    enemy_path: Option<PathBuf>,
    use_demo_enemy: bool,
    config: Option<PathBuf>,
    mode: RunMode,
    seed: Option<u64>,
    speed: BattleSpeed,
    fast_forward: bool,
    max_rounds: u32,
    verbosity: VerbosityLevel,
) -> Result<()> {
    println!("=== Card Battle Simulator ===\n");

    let setup = match seed {
        Some(seed) => MatchSetup::from_seed(seed),
        None => {
            let provider: Box<dyn ConfigProvider> = match config {
                Some(path) => Box::new(JsonFileProvider::new(path)),
                None => Box::new(NoProvider),
            };
            resolve_setup(mode, provider.as_ref())
        }
    };
    println!("Seed: {}  Energy cap: {}  Source: {:?}", setup.seed, setup.energy_cap, setup.source);

    // A hand-built player team must respect the budget; the demo lineup is exempt
    let player_cap = player_path.as_ref().map(|_| setup.energy_cap);
    let player_spec = match player_path {
        Some(path) => RosterSpec::load(path)?,
        None => demo_player(),
    };
    let enemy_spec = match enemy_path {
        Some(path) => RosterSpec::load(path)?,
        None if use_demo_enemy => demo_enemy(),
        None => draft_opponent(&card_pool(), setup.energy_cap, &mut ChaCha12Rng::seed_from_u64(setup.seed)),
    };

    let mut ids = IdAllocator::new();
    let player = player_spec.build(&mut ids, player_cap)?;
    let enemy = enemy_spec.build(&mut ids, None)?;
    println!(
        "Player energy: {}  Enemy energy: {}\n",
        player.total_energy(),
        enemy.total_energy()
    );

    let controller = MatchController::new()
        .with_seed(Some(setup.seed))
        .with_max_rounds(max_rounds)
        .with_verbosity(verbosity);
    let session = Arc::new(BattleSession::with_parts(controller, Box::new(DefaultPolicy)));
    session.set_tempo(speed);
    session.set_fast_forward(fast_forward);

    // Console presenter: wait for the impact moment of each event, then commit
    let mut events = session.subscribe();
    let presenter_session = session.clone();
    let presenter = tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(_event) => {
                    let tempo = presenter_session.tempo();
                    tokio::time::sleep(tempo.duration_for(IMPACT_DELAY)).await;
                    presenter_session.commit_effect();
                }
                Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => break,
            }
        }
    });

    session.submit_teams(player, enemy);
    if session.start() {
        session.wait_until_stopped().await?;
    }
    presenter.abort();

    match session.result() {
        Some(result) => {
            println!("\n=== Match Over ===");
            println!("Outcome: {:?} after {} rounds ({:?})", result.outcome, result.rounds_played, result.end_reason);
        }
        None => println!("\nMatch did not finish"),
    }
    let steps = session.with_controller(|c| c.steps().len());
    println!("Recorded steps: {}", steps);

    Ok(())
}

fn run_batch_mode(
    games: usize,
    seed: u64,
    energy_cap: Option<u32>,
    player: Option<PathBuf>,
    max_rounds: u32,
) -> Result<()> {
    println!("=== Card Battle Simulator - Batch Mode ===\n");
    println!("Running {games} games with master seed {seed}");

    let player = player.map(RosterSpec::load).transpose()?;
    let options = BatchOptions {
        games,
        master_seed: seed,
        energy_cap,
        max_rounds,
        player,
    };

    let start = Instant::now();
    let stats = run_batch(&options)?;
    print_report(&stats, start.elapsed());
    Ok(())
}

async fn run_demo_config(seed: u64, out: Option<PathBuf>) -> Result<()> {
    let config = card_battle_sim::config::MatchConfig {
        match_id: format!("demo-{seed}"),
        seed,
        energy_cap: Some(card_battle_sim::config::derive_energy_cap(seed)),
    };
    let files = [
        ("match.json", serde_json::to_string_pretty(&config)?),
        ("player.json", serde_json::to_string_pretty(&demo_player())?),
        ("enemy.json", serde_json::to_string_pretty(&demo_enemy())?),
    ];

    match out {
        Some(dir) => {
            tokio::fs::create_dir_all(&dir).await?;
            for (name, contents) in &files {
                let path = dir.join(name);
                tokio::fs::write(&path, contents).await?;
                println!("Wrote {}", path.display());
            }
        }
        None => {
            for (name, contents) in &files {
                println!("// {name}\n{contents}\n");
            }
        }
    }
    Ok(())
}
