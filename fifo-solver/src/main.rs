//! FIFO three-in-a-row solver
//!
//! Solves every reachable position and writes the score table, or plays a
//! console game against it.

use std::io;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::{info, warn};

use fifo_core::{Side, StateCode};
use fifo_solver::checkpoint::Checkpoint;
use fifo_solver::export::{read_scores_json, write_scores_json};
use fifo_solver::play::PlayLoop;
use fifo_solver::{compute_scores, solve};

#[derive(Parser, Debug)]
#[command(name = "solver")]
#[command(version, about = "Exact solver for FIFO three-in-a-row", long_about = None)]
struct Args {
    /// Output file for the score table
    #[arg(long, default_value = "scores.json")]
    scores_file: PathBuf,

    /// Also write the binary rank table here
    #[arg(long)]
    checkpoint: Option<PathBuf>,

    /// Play a console game instead of exporting
    #[arg(long)]
    play: bool,

    /// Side played by the bot
    #[arg(long, value_enum, default_value = "o")]
    bot: BotSide,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum BotSide {
    X,
    O,
}

impl From<BotSide> for Side {
    fn from(side: BotSide) -> Side {
        match side {
            BotSide::X => Side::X,
            BotSide::O => Side::O,
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    if args.play {
        play(&args)
    } else {
        export(&args)
    }
}

fn export(args: &Args) -> Result<()> {
    info!("generating score table in {}", args.scores_file.display());
    let start = Instant::now();
    let solver = solve().context("solve failed")?;

    let scores = solver.scores();
    let count = write_scores_json(&args.scores_file, &scores)
        .with_context(|| format!("writing {}", args.scores_file.display()))?;
    info!("wrote {} scores in {:.2}s", count, start.elapsed().as_secs_f64());

    if let Some(path) = &args.checkpoint {
        let saved = Checkpoint::save(path, &solver.ranks())
            .with_context(|| format!("writing checkpoint {}", path.display()))?;
        info!("saved {} ranks to {}", saved, path.display());
    }
    Ok(())
}

fn play(args: &Args) -> Result<()> {
    // Reuse an existing score file when it covers the initial position.
    let scores = match read_scores_json(&args.scores_file) {
        Ok(scores) if scores.contains_key(&StateCode::INITIAL) => scores,
        Ok(_) => {
            warn!("{} has no initial position, solving", args.scores_file.display());
            compute_scores().context("solve failed")?
        }
        Err(e) => {
            warn!("could not read {}: {}, solving", args.scores_file.display(), e);
            compute_scores().context("solve failed")?
        }
    };

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut game = PlayLoop::new(&scores, args.bot.into(), rand::rng());
    game.run(stdin.lock(), &mut stdout)
        .context("console game failed")?;
    Ok(())
}
