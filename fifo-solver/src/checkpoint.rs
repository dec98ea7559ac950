//! Binary rank table.
//!
//! Format:
//! - Header (32 bytes):
//!   - Magic: "FIFO" (4 bytes)
//!   - Version: u32 LE (4 bytes)
//!   - Entry count: u64 LE (8 bytes)
//!   - Checksum: u64 LE xxhash of data section (8 bytes)
//!   - Reserved: 8 bytes (zeros)
//! - Data section (entry_count × 8 bytes):
//!   - State code: u32 LE (4 bytes)
//!   - Rank: i32 LE (4 bytes)
//!
//! Entries are sorted by state code.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;

use fifo_core::StateCode;
use xxhash_rust::xxh64::xxh64;

use crate::rank::Rank;

const MAGIC: &[u8; 4] = b"FIFO";
const VERSION: u32 = 1;
const HEADER_SIZE: usize = 32;
const ENTRY_SIZE: usize = 8;

pub struct Checkpoint {
    pub entries: Vec<(StateCode, Rank)>,
}

fn invalid(msg: impl Into<String>) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, msg.into())
}

fn le_u32(bytes: &[u8]) -> u32 {
    let mut buf = [0u8; 4];
    buf.copy_from_slice(&bytes[..4]);
    u32::from_le_bytes(buf)
}

fn le_u64(bytes: &[u8]) -> u64 {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&bytes[..8]);
    u64::from_le_bytes(buf)
}

impl Checkpoint {
    /// Save a rank table. Returns the number of entries written.
    pub fn save(path: &Path, ranks: &BTreeMap<StateCode, Rank>) -> io::Result<usize> {
        let count = ranks.len();

        let mut data = Vec::with_capacity(count * ENTRY_SIZE);
        for (code, rank) in ranks {
            data.extend_from_slice(&code.0.to_le_bytes());
            data.extend_from_slice(&rank.value().to_le_bytes());
        }

        let checksum = xxh64(&data, 0);

        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);

        writer.write_all(MAGIC)?;
        writer.write_all(&VERSION.to_le_bytes())?;
        writer.write_all(&(count as u64).to_le_bytes())?;
        writer.write_all(&checksum.to_le_bytes())?;
        writer.write_all(&[0u8; 8])?; // Reserved

        writer.write_all(&data)?;
        writer.flush()?;

        Ok(count)
    }

    /// Load a rank table, verifying magic, version and checksum.
    pub fn load(path: &Path) -> io::Result<Self> {
        let file = File::open(path)?;
        let file_len = file.metadata()?.len();
        let mut reader = BufReader::new(file);

        let mut header = [0u8; HEADER_SIZE];
        reader.read_exact(&mut header)?;

        if &header[0..4] != MAGIC {
            return Err(invalid("Invalid checkpoint magic"));
        }

        let version = le_u32(&header[4..8]);
        if version != VERSION {
            return Err(invalid(format!(
                "Unsupported checkpoint version: {}",
                version
            )));
        }

        let count = le_u64(&header[8..16]);
        let stored_checksum = le_u64(&header[16..24]);

        // The header count must describe exactly the bytes that follow it.
        let data_len = count
            .checked_mul(ENTRY_SIZE as u64)
            .filter(|&len| len == file_len.saturating_sub(HEADER_SIZE as u64))
            .ok_or_else(|| {
                invalid(format!(
                    "Checkpoint entry count {} does not match file size {}",
                    count, file_len
                ))
            })?;

        let mut data = vec![0u8; data_len as usize];
        reader.read_exact(&mut data)?;

        if xxh64(&data, 0) != stored_checksum {
            return Err(invalid("Checkpoint checksum mismatch"));
        }

        let entries = data
            .chunks_exact(ENTRY_SIZE)
            .map(|chunk| {
                let code = StateCode(le_u32(&chunk[0..4]));
                let rank = Rank::from_value(le_u32(&chunk[4..8]) as i32);
                (code, rank)
            })
            .collect();

        Ok(Checkpoint { entries })
    }

    pub fn into_map(self) -> BTreeMap<StateCode, Rank> {
        self.entries.into_iter().collect()
    }

    /// File size for a given number of entries.
    pub fn estimate_size(count: usize) -> usize {
        HEADER_SIZE + count * ENTRY_SIZE
    }
}
