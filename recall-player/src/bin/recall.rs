use anyhow::{bail, Context};
use async_std::task;
use clap::{Args, Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use recall_othello::{Board, Color};
use recall_player::connectors::StdioProvider;
use recall_player::{
    decide, play_against, play_game, AgentConfig, JsonFileStore, KnowledgeStore, MoveSource,
    SharedKnowledge,
};
use recall_search::Role;
use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(author, version, about = "A self-teaching Othello agent", long_about = None)]
struct Cli {
    /// Where the agent's knowledge is kept
    #[arg(long, global = true, default_value = "knowledge.json")]
    knowledge: PathBuf,

    /// JSON file overriding search, evaluation and learning parameters
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Subcommand)]
enum Mode {
    /// Play games against itself and learn from each one
    Train(TrainArg),
    /// Choose a move for one position
    Move(MoveArg),
    /// Play one game against an engine speaking the line protocol on stdin/stdout
    Play(PlayArg),
    /// Print the stored knowledge as JSON
    Export {
        /// Write to this file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Replace the stored knowledge with an exported document
    Import { input: PathBuf },
    /// Summarize the stored knowledge
    Stats,
}

#[derive(Debug, Args)]
struct TrainArg {
    #[arg(long, default_value_t = 10)]
    games: usize,
    /// Games played at once
    #[arg(long, default_value_t = 1)]
    workers: usize,
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Debug, Args)]
struct MoveArg {
    /// 64 cells in row-major order: X black, O white, - empty
    board: String,
    /// The side to move
    color: Color,
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Debug, Args)]
struct PlayArg {
    /// The color the agent plays
    #[arg(long, default_value = "black")]
    color: Color,
    #[arg(long)]
    seed: Option<u64>,
}

fn rng_from(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<AgentConfig> {
    let path = match path {
        Some(path) => path,
        None => return Ok(AgentConfig::default()),
    };

    let document = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    serde_json::from_str(&document)
        .with_context(|| format!("failed to parse config {}", path.display()))
}

fn train(store: JsonFileStore, config: &AgentConfig, arg: &TrainArg) -> anyhow::Result<()> {
    if arg.workers == 0 {
        bail!("at least one worker is needed");
    }

    let shared = SharedKnowledge::new(store);
    let next_game = AtomicUsize::new(0);
    let base_seed = arg.seed;

    let failures: usize = thread::scope(|scope| {
        let workers: Vec<_> = (0..arg.workers)
            .map(|worker| {
                let shared = &shared;
                let next_game = &next_game;
                scope.spawn(move || -> anyhow::Result<usize> {
                    let mut rng = rng_from(base_seed.map(|seed| seed.wrapping_add(worker as u64)));
                    let mut failures = 0;

                    while next_game.fetch_add(1, Ordering::SeqCst) < arg.games {
                        let snapshot = shared.snapshot()?;
                        let record = play_game(&snapshot, config, &mut rng)?;
                        match shared.record_game(&record, Color::Black, config) {
                            Ok(updated) => info!(
                                worker,
                                game = updated.total_games,
                                score = %record.score,
                                winner = ?record.winner,
                                entries = updated.memory.len(),
                                "recorded game"
                            ),
                            // Keep playing; this game simply goes unlearned.
                            Err(_) => failures += 1,
                        }
                    }
                    Ok(failures)
                })
            })
            .collect();

        workers
            .into_iter()
            .map(|worker| match worker.join() {
                Ok(result) => result,
                Err(_) => bail!("training worker panicked"),
            })
            .sum::<anyhow::Result<usize>>()
    })?;

    let snapshot = shared.snapshot()?;
    if failures > 0 {
        warn!(failures, "some games could not be saved");
    }
    println!(
        "{} games recorded: {} wins, {} losses, {} draws",
        snapshot.total_games, snapshot.wins, snapshot.losses, snapshot.draws
    );
    Ok(())
}

fn choose(store: &JsonFileStore, config: &AgentConfig, arg: &MoveArg) -> anyhow::Result<()> {
    let board: Board = arg.board.parse().context("invalid board")?;
    let snapshot = store.load()?;
    let mut rng = rng_from(arg.seed);

    match decide(board, arg.color, &snapshot, config, Role::Primary, &mut rng) {
        None => println!("pass"),
        Some(decision) => match decision.source {
            MoveSource::Memory => println!("{} (remembered)", decision.location),
            MoveSource::Search {
                score,
                depth,
                nodes,
            } => println!(
                "{} (score {}, depth {}, {} nodes)",
                decision.location, score, depth, nodes
            ),
        },
    }
    Ok(())
}

fn play(store: JsonFileStore, config: &AgentConfig, arg: &PlayArg) -> anyhow::Result<()> {
    let shared = SharedKnowledge::new(store);
    let snapshot = shared.snapshot()?;
    let mut rng = rng_from(arg.seed);
    let mut provider = StdioProvider::stdio();

    let record = task::block_on(play_against(
        &mut provider,
        arg.color,
        &snapshot,
        config,
        &mut rng,
    ))?;
    info!(score = %record.score, winner = ?record.winner, "game over");

    shared.record_game(&record, arg.color, config)?;
    Ok(())
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref())?;
    let mut store = JsonFileStore::new(&cli.knowledge);

    match &cli.mode {
        Mode::Train(arg) => train(store, &config, arg)?,
        Mode::Move(arg) => choose(&store, &config, arg)?,
        Mode::Play(arg) => play(store, &config, arg)?,
        Mode::Export { output } => {
            let document = store.export()?;
            match output {
                Some(path) => fs::write(path, document)
                    .with_context(|| format!("failed to write {}", path.display()))?,
                None => println!("{}", document),
            }
        }
        Mode::Import { input } => {
            let document = fs::read_to_string(input)
                .with_context(|| format!("failed to read {}", input.display()))?;
            let snapshot = store
                .import(&document)
                .with_context(|| format!("failed to import {}", input.display()))?;
            println!(
                "imported {} games and {} memories",
                snapshot.total_games,
                snapshot.memory.len()
            );
        }
        Mode::Stats => {
            let snapshot = store.load()?;
            println!("games:      {}", snapshot.total_games);
            println!(
                "record:     {} wins, {} losses, {} draws",
                snapshot.wins, snapshot.losses, snapshot.draws
            );
            println!("experience: {}", snapshot.experience);
            println!(
                "memory:     {} of {} entries",
                snapshot.memory.len(),
                snapshot.memory_capacity
            );
            println!("schema:     v{}", snapshot.version);
            println!("file:       {}", store.path().display());
        }
    }

    Ok(())
}
