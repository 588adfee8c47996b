// src/history.rs

//! Bounded record of the most recently emitted characters.

use anyhow::{Context, Result};
use log::{error, info};
use std::collections::VecDeque;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Keeps the last `max_chars` characters of decoded output.
#[derive(Debug, Clone)]
pub struct History {
    chars: VecDeque<char>,
    max_chars: usize,
}

impl History {
    pub fn new(max_chars: usize) -> Self {
        History {
            chars: VecDeque::new(),
            max_chars,
        }
    }

    pub fn extend(&mut self, chunk: &str) {
        for c in chunk.chars() {
            if self.chars.len() == self.max_chars {
                self.chars.pop_front();
            }
            if self.max_chars > 0 {
                self.chars.push_back(c);
            }
        }
    }

    /// Number of characters retained.
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    pub fn contents(&self) -> String {
        self.chars.iter().collect()
    }

    pub fn write_to(&self, path: &Path) -> Result<()> {
        let file = File::create(path)
            .with_context(|| format!("Failed to create output file {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        writer
            .write_all(self.contents().as_bytes())
            .and_then(|_| writer.flush())
            .with_context(|| format!("Failed to write output file {}", path.display()))
    }

    /// Writes the history to every path. A failing file does not stop the
    /// others; the failed paths are returned.
    pub fn write_all(&self, paths: &[PathBuf]) -> Vec<PathBuf> {
        info!(
            "Writing {} formatted character(s) to {} output file(s)",
            self.len(),
            paths.len()
        );
        let mut failed = Vec::new();
        for path in paths {
            match self.write_to(path) {
                Ok(()) => info!("File '{}' successfully closed", path.display()),
                Err(e) => {
                    error!("{:#}", e);
                    failed.push(path.clone());
                }
            }
        }
        failed
    }
}
