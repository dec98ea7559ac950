//! Score exports: a JSON score file and a SQLite tablebase.
//!
//! The JSON file maps each state code, written as a decimal string, to its
//! exported score. Keys appear in ascending numeric order so the file is
//! reproducible.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use std::sync::Mutex;

use fifo_core::StateCode;
use log::debug;
use rusqlite::{params, Connection, OptionalExtension};
use thiserror::Error;

use crate::rank::Rank;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("failed to {operation}: {source}")]
    Io {
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("score file error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("tablebase error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("score file key '{key}' is not a state code")]
    BadKey { key: String },
}

fn io_err(operation: &str, path: &Path) -> impl FnOnce(std::io::Error) -> ExportError {
    let operation = format!("{} {}", operation, path.display());
    move |source| ExportError::Io { operation, source }
}

/// Write the score file. Returns the number of entries.
pub fn write_scores_json(
    path: &Path,
    scores: &BTreeMap<StateCode, f64>,
) -> Result<usize, ExportError> {
    // serde_json writes the integer keys as strings, in map order.
    let file = File::create(path).map_err(io_err("create", path))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, scores)?;
    writer.flush().map_err(io_err("write", path))?;

    debug!("wrote {} scores to {}", scores.len(), path.display());
    Ok(scores.len())
}

/// Read a score file written by [`write_scores_json`].
pub fn read_scores_json(path: &Path) -> Result<BTreeMap<StateCode, f64>, ExportError> {
    let file = File::open(path).map_err(io_err("open", path))?;
    let raw: BTreeMap<String, f64> = serde_json::from_reader(BufReader::new(file))?;
    raw.into_iter()
        .map(|(key, score)| match key.parse::<u32>() {
            Ok(code) => Ok((StateCode(code), score)),
            Err(_) => Err(ExportError::BadKey { key }),
        })
        .collect()
}

/// Write a SQLite tablebase, replacing any existing file and creating
/// missing parent directories.
pub fn write_sqlite(path: &Path, ranks: &BTreeMap<StateCode, Rank>) -> Result<usize, ExportError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(io_err("create directory", parent))?;
    }
    if path.exists() {
        std::fs::remove_file(path).map_err(io_err("remove", path))?;
    }

    let mut conn = Connection::open(path)?;
    conn.execute(
        "CREATE TABLE scores (
            code INTEGER PRIMARY KEY,
            rank INTEGER NOT NULL,
            score REAL NOT NULL
        )",
        [],
    )?;

    let tx = conn.transaction()?;
    {
        let mut stmt = tx.prepare("INSERT INTO scores (code, rank, score) VALUES (?1, ?2, ?3)")?;
        for (code, rank) in ranks {
            stmt.execute(params![code.0, rank.value(), rank.to_score()])?;
        }
    }
    tx.commit()?;

    Ok(ranks.len())
}

/// Read-only SQLite tablebase.
pub struct Tablebase {
    conn: Mutex<Connection>,
}

impl Tablebase {
    pub fn open(path: &Path) -> Result<Self, ExportError> {
        let conn = Connection::open(path)?;
        conn.pragma_update(None, "query_only", true)?;
        Ok(Tablebase {
            conn: Mutex::new(conn),
        })
    }

    /// Rank of a state, or None if the state is not in the tablebase.
    pub fn lookup(&self, code: StateCode) -> Result<Option<Rank>, ExportError> {
        let conn = match self.conn.lock() {
            Ok(conn) => conn,
            Err(poisoned) => poisoned.into_inner(),
        };
        let rank: Option<i32> = conn
            .query_row(
                "SELECT rank FROM scores WHERE code = ?1",
                [code.0],
                |row| row.get(0),
            )
            .optional()?;
        Ok(rank.map(Rank::from_value))
    }

    pub fn len(&self) -> Result<usize, ExportError> {
        let conn = match self.conn.lock() {
            Ok(conn) => conn,
            Err(poisoned) => poisoned.into_inner(),
        };
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM scores", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    pub fn is_empty(&self) -> Result<bool, ExportError> {
        Ok(self.len()? == 0)
    }
}
