//! Where position scores come from.

use std::collections::BTreeMap;
use std::path::Path;

use fifo_core::StateCode;
use fifo_solver::export::Tablebase;
use log::{info, warn};

pub enum ScoreSource {
    /// SQLite tablebase written by `export_sqlite`
    Tablebase(Tablebase),
    /// Scores solved in process at startup
    Memory(BTreeMap<StateCode, f64>),
}

impl ScoreSource {
    /// Open the first tablebase that loads, if any.
    pub fn find_tablebase<P: AsRef<Path>>(paths: &[P]) -> Option<ScoreSource> {
        paths.iter().find_map(|path| {
            let path = path.as_ref();
            if !path.exists() {
                return None;
            }
            match Tablebase::open(path) {
                Ok(tb) => {
                    info!("loaded tablebase from {}", path.display());
                    Some(ScoreSource::Tablebase(tb))
                }
                Err(e) => {
                    warn!("failed to load tablebase from {}: {}", path.display(), e);
                    None
                }
            }
        })
    }

    /// Exported score of `code`, or None if the source does not know it.
    pub fn score(&self, code: StateCode) -> Option<f64> {
        match self {
            ScoreSource::Tablebase(tb) => match tb.lookup(code) {
                Ok(rank) => rank.map(|r| r.to_score()),
                Err(e) => {
                    warn!("tablebase lookup for {} failed: {}", code, e);
                    None
                }
            },
            ScoreSource::Memory(scores) => scores.get(&code).copied(),
        }
    }
}
