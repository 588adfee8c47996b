// src/decoder/mod.rs

//! Format/escape execution engine.
//!
//! Bytes pulled from a [`ByteSource`] land in a shared [`StreamBuffer`]. Every
//! format template reads that buffer through its own [`Cursor`], so several
//! templates can decode overlapping spans of the same stream differently.
//! The [`Decoder`] runs one round per output chunk and reconciles the cursors
//! against the buffer afterwards.

mod buffer;
mod cursor;
mod engine;
mod escape;
mod template;

pub use buffer::StreamBuffer;
pub use cursor::Cursor;
pub use engine::{Decoder, SyncPolicy};
pub use escape::{EscapeContext, EscapeOp, BAD_ESCAPE, RECURSIVE_ESCAPE};
pub use template::{Segment, Template};

use serde::{Deserialize, Serialize};
use std::io;

/// Errors that end a decoding round.
///
/// Decoding faults (unknown escapes and the like) never surface here; they are
/// substituted with sentinel text. Only the byte source can fail a round.
#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    /// Shutdown was requested while the round was waiting for a byte.
    #[error("interrupted while waiting for input")]
    Interrupted,
    /// The byte source failed (device unplugged, read error, ...).
    #[error("byte source failed: {0}")]
    Source(#[from] io::Error),
    /// The byte source has already been closed.
    #[error("byte source is closed")]
    Closed,
}

/// A blocking producer of single bytes, typically a serial device.
pub trait ByteSource {
    /// Reads one byte, blocking for at most the source's configured timeout.
    /// Returns `Ok(None)` when the timeout elapsed without data.
    fn read_byte(&mut self) -> io::Result<Option<u8>>;

    /// Releases the underlying device. Returns `true` if it was open.
    fn close(&mut self) -> bool;
}

/// Byte order used when turning bytes into integers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ByteOrder {
    #[default]
    Big,
    Little,
}

impl ByteOrder {
    /// Interprets `bytes` as an unsigned integer. Slices longer than eight
    /// bytes keep only the low 64 bits.
    pub fn to_uint(self, bytes: &[u8]) -> u64 {
        let fold = |acc: u64, b: &u8| (acc << 8) | u64::from(*b);
        match self {
            ByteOrder::Big => bytes.iter().fold(0, fold),
            ByteOrder::Little => bytes.iter().rev().fold(0, fold),
        }
    }
}

impl std::str::FromStr for ByteOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "big" => Ok(ByteOrder::Big),
            "little" => Ok(ByteOrder::Little),
            other => Err(format!("invalid byte order '{}' (expected big or little)", other)),
        }
    }
}

#[cfg(test)]
pub(crate) mod testing;
