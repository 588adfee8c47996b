// src/config.rs

//! Configuration for a monitoring session.
//!
//! The structures deserialize from a JSON file (see [`Config::load`]) and every
//! field has a default, so a file only needs to name what it changes. Command
//! line flags are applied on top by `cli.rs`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::decoder::{ByteOrder, SyncPolicy};
use crate::os::serial;

// --- Top-Level Configuration Structure ---

/// Complete session configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// How bytes are rendered.
    pub format: FormatConfig,
    /// Which device to open and how.
    pub port: PortConfig,
    /// Where the rolling history goes at shutdown.
    pub output: OutputConfig,
}

/// Problems found by [`Config::validate`].
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("unsupported baud rate {0}")]
    UnsupportedBaudRate(u32),
    #[error("invalid byte size {0} (expected 5, 6, 7 or 8)")]
    InvalidByteSize(u8),
    #[error("timeout must be a positive number of seconds")]
    ZeroTimeout,
    #[error("history limit must be positive")]
    ZeroHistory,
}

impl Config {
    /// Reads a JSON configuration file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let file = std::fs::File::open(path)
            .with_context(|| format!("Failed to open config file {}", path.display()))?;
        let config: Config = serde_json::from_reader(std::io::BufReader::new(file))
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        log::debug!("Loaded config from {}: {:?}", path.display(), config);
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if serial::speed_for(self.port.baudrate).is_none() {
            return Err(ConfigError::UnsupportedBaudRate(self.port.baudrate));
        }
        if !(5..=8).contains(&self.port.bytesize) {
            return Err(ConfigError::InvalidByteSize(self.port.bytesize));
        }
        if self.port.timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        if self.output.max_chars == 0 {
            return Err(ConfigError::ZeroHistory);
        }
        Ok(())
    }
}

// --- Format Configuration ---

/// Settings consumed by the decoding engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatConfig {
    /// Character introducing an escape sequence in a template.
    pub escape: char,
    /// Byte order for integer conversions.
    pub byte_order: ByteOrder,
    /// Format templates, one output fragment each per round.
    /// Empty means a single `<escape>a` template.
    pub templates: Vec<String>,
    /// Keep lookahead of faster templates across rounds instead of
    /// synchronizing every cursor to the hungriest template.
    /// Memory grows without bound if one template keeps lagging.
    pub buffered: bool,
}

impl Default for FormatConfig {
    fn default() -> Self {
        FormatConfig {
            escape: '%',
            byte_order: ByteOrder::Big,
            templates: Vec::new(),
            buffered: false,
        }
    }
}

impl FormatConfig {
    pub fn policy(&self) -> SyncPolicy {
        if self.buffered {
            SyncPolicy::Buffered
        } else {
            SyncPolicy::Synchronized
        }
    }
}

// --- Port Configuration ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[value(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Parity {
    #[default]
    None,
    Even,
    Odd,
    Space,
    Mark,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[value(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StopBits {
    #[default]
    One,
    OnePointFive,
    Two,
}

/// Serial line settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PortConfig {
    /// Device path, e.g. `/dev/ttyUSB0`.
    pub path: Option<PathBuf>,
    pub baudrate: u32,
    /// Data bits per character (5 to 8).
    pub bytesize: u8,
    pub parity: Parity,
    pub stopbits: StopBits,
    /// Read timeout in seconds.
    pub timeout_secs: u64,
    /// XON/XOFF flow control.
    pub swflowctl: bool,
    /// RTS/CTS flow control.
    pub rtscts: bool,
    /// DSR/DTR flow control. Not expressible through termios; logged only.
    pub dsrdtr: bool,
    /// Refuse to open ports that do not show up in the port listing.
    pub check_available: bool,
}

impl Default for PortConfig {
    fn default() -> Self {
        PortConfig {
            path: None,
            baudrate: 9600,
            bytesize: 8,
            parity: Parity::None,
            stopbits: StopBits::One,
            timeout_secs: 1,
            swflowctl: false,
            rtscts: false,
            dsrdtr: false,
            check_available: true,
        }
    }
}

// --- Output Configuration ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Files receiving the history when the session ends.
    pub files: Vec<PathBuf>,
    /// Number of most recent characters kept for the output files.
    pub max_chars: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        OutputConfig {
            files: Vec::new(),
            max_chars: 65535,
        }
    }
}
