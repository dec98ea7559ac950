//! Export a binary rank table to a SQLite tablebase.
//!
//! Usage: export_sqlite [input.bin] [output.db]

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::Parser;
use log::info;

use fifo_solver::checkpoint::Checkpoint;
use fifo_solver::export::{write_sqlite, Tablebase};

#[derive(Parser, Debug)]
#[command(name = "export_sqlite")]
#[command(about = "Convert a binary rank table to a SQLite tablebase")]
struct Args {
    /// Binary rank table written by `solver --checkpoint`
    #[arg(default_value = "data/ranks.bin")]
    input: PathBuf,

    /// SQLite output, replaced if present
    #[arg(default_value = "data/tablebase.db")]
    output: PathBuf,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let start = Instant::now();
    let ranks = Checkpoint::load(&args.input)
        .with_context(|| format!("loading {}", args.input.display()))?
        .into_map();
    info!(
        "loaded {} ranks in {:.2}s",
        ranks.len(),
        start.elapsed().as_secs_f64()
    );

    let start = Instant::now();
    let inserted = write_sqlite(&args.output, &ranks)
        .with_context(|| format!("writing {}", args.output.display()))?;
    info!(
        "inserted {} rows in {:.2}s",
        inserted,
        start.elapsed().as_secs_f64()
    );

    // Spot-check a handful of rows.
    let tablebase = Tablebase::open(&args.output)?;
    let step = (ranks.len() / 5).max(1);
    for (&code, &expected) in ranks.iter().step_by(step).take(5) {
        let found = tablebase.lookup(code)?;
        if found != Some(expected) {
            bail!("rank mismatch for {}: expected {}, found {:?}", code, expected, found);
        }
    }
    info!("verification passed");

    let input_size = std::fs::metadata(&args.input).map(|m| m.len()).unwrap_or(0);
    let output_size = std::fs::metadata(&args.output).map(|m| m.len()).unwrap_or(0);
    info!(
        "sizes: binary {:.1} KB, sqlite {:.1} KB",
        input_size as f64 / 1024.0,
        output_size as f64 / 1024.0
    );
    Ok(())
}
