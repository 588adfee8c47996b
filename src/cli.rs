// src/cli.rs

//! Command line flags and how they override the file configuration.

use clap::Parser;
use std::path::PathBuf;

use crate::config::{Config, Parity, StopBits};
use crate::decoder::ByteOrder;

fn positive_u64(value: &str) -> Result<u64, String> {
    match value.parse::<u64>() {
        Ok(v) if v > 0 => Ok(v),
        _ => Err(format!("{} is an invalid positive int value", value)),
    }
}

/// Decode a live serial byte stream through format templates.
#[derive(Debug, Parser)]
#[command(name = "serialmon", version, about)]
pub struct Cli {
    /// JSON configuration file; flags given here take precedence
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    // --- output file settings ---
    /// Write the formatted history to this file on exit (repeatable)
    #[arg(long = "ofile", value_name = "FILE", help_heading = "Output file settings")]
    pub ofile: Vec<PathBuf>,
    /// Number of formatted characters kept for the output files [default: 65535]
    #[arg(long, value_parser = positive_u64, help_heading = "Output file settings")]
    pub omax: Option<u64>,

    // --- format settings ---
    /// Custom format string (repeatable)
    #[arg(short = 'f', long = "format", help_heading = "Format settings")]
    pub format: Vec<String>,
    /// Format escape char [default: %]
    #[arg(short = 'e', long, help_heading = "Format settings")]
    pub escape: Option<char>,
    /// Format byte order [default: big]
    #[arg(long, value_name = "big|little", help_heading = "Format settings")]
    pub byteorder: Option<ByteOrder>,
    /// Allow asynchronous format strings with buffer
    #[arg(long, help_heading = "Format settings")]
    pub fbuffer: bool,
    /// List format chars
    #[arg(long, help_heading = "Format settings")]
    pub flist: bool,

    // --- connection settings ---
    /// List available ports
    #[arg(short = 'l', long, conflicts_with = "listex", help_heading = "Connection settings")]
    pub list: bool,
    /// List available ports and their description
    #[arg(long, help_heading = "Connection settings")]
    pub listex: bool,
    /// Port to connect to
    #[arg(short = 'p', long, help_heading = "Connection settings")]
    pub port: Option<PathBuf>,
    /// Set baud rate [default: 9600]
    #[arg(short = 'b', long, value_parser = clap::value_parser!(u32).range(1..), help_heading = "Connection settings")]
    pub baudrate: Option<u32>,
    /// Set byte size [default: 8]
    #[arg(long, value_parser = clap::value_parser!(u8).range(5..=8), help_heading = "Connection settings")]
    pub bytesize: Option<u8>,
    /// Set parity bits [default: NONE]
    #[arg(long, value_enum, help_heading = "Connection settings")]
    pub parity: Option<Parity>,
    /// Set stop bits [default: ONE]
    #[arg(long, value_enum, help_heading = "Connection settings")]
    pub stopbits: Option<StopBits>,
    /// Set timeout in seconds [default: 1]
    #[arg(short = 't', long, value_parser = positive_u64, help_heading = "Connection settings")]
    pub timeout: Option<u64>,
    /// Enable software flow control
    #[arg(long, help_heading = "Connection settings")]
    pub swflowctl: bool,
    /// Enable RTS/CTS
    #[arg(long, help_heading = "Connection settings")]
    pub rtscts: bool,
    /// Enable DSR/DTR
    #[arg(long, help_heading = "Connection settings")]
    pub dsrdtr: bool,
    /// Open the port even if it is not in the port listing
    #[arg(long, help_heading = "Connection settings")]
    pub no_port_check: bool,
}

impl Cli {
    /// Applies the flags that were given on top of `config`.
    pub fn apply_to(&self, config: &mut Config) {
        if !self.ofile.is_empty() {
            config.output.files = self.ofile.clone();
        }
        if let Some(omax) = self.omax {
            config.output.max_chars = usize::try_from(omax).unwrap_or(usize::MAX);
        }

        if !self.format.is_empty() {
            config.format.templates = self.format.clone();
        }
        if let Some(escape) = self.escape {
            config.format.escape = escape;
        }
        if let Some(order) = self.byteorder {
            config.format.byte_order = order;
        }
        config.format.buffered |= self.fbuffer;

        if let Some(port) = &self.port {
            config.port.path = Some(port.clone());
        }
        if let Some(baudrate) = self.baudrate {
            config.port.baudrate = baudrate;
        }
        if let Some(bytesize) = self.bytesize {
            config.port.bytesize = bytesize;
        }
        if let Some(parity) = self.parity {
            config.port.parity = parity;
        }
        if let Some(stopbits) = self.stopbits {
            config.port.stopbits = stopbits;
        }
        if let Some(timeout) = self.timeout {
            config.port.timeout_secs = timeout;
        }
        config.port.swflowctl |= self.swflowctl;
        config.port.rtscts |= self.rtscts;
        config.port.dsrdtr |= self.dsrdtr;
        if self.no_port_check {
            config.port.check_available = false;
        }
    }
}
