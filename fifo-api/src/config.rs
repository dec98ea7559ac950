use std::path::PathBuf;

use clap::Parser;

/// Locations searched for a tablebase when none is given.
pub const DEFAULT_TABLEBASE_PATHS: [&str; 3] = [
    "data/tablebase.db",
    "../fifo-solver/data/tablebase.db",
    "tablebase.db",
];

#[derive(Parser, Debug, Clone)]
#[command(name = "fifo-api")]
#[command(version, about = "Web API for FIFO three-in-a-row", long_about = None)]
pub struct Config {
    /// Port to listen on
    #[arg(long, env = "FIFO_PORT", default_value_t = 8000)]
    pub port: u16,

    /// SQLite tablebase; without one the game is solved at startup
    #[arg(long, env = "FIFO_TABLEBASE")]
    pub tablebase: Option<PathBuf>,
}

impl Config {
    pub fn tablebase_paths(&self) -> Vec<PathBuf> {
        match &self.tablebase {
            Some(path) => vec![path.clone()],
            None => DEFAULT_TABLEBASE_PATHS.iter().map(PathBuf::from).collect(),
        }
    }
}
