// src/main.rs

// Declare modules
pub mod cli;
pub mod config;
pub mod decoder;
pub mod history;
pub mod monitor;
pub mod os;

use crate::{
    cli::Cli,
    config::Config,
    decoder::{Decoder, EscapeOp, StreamBuffer},
    history::History,
    monitor::Monitor,
    os::{ports, serial::SerialPort, signal::ShutdownFlag},
};

use anyhow::{bail, Context};
use clap::Parser;
use log::{error, info, warn};
use std::io::Write;

/// Main entry point for `serialmon`.
fn main() -> anyhow::Result<()> {
    // Logs go to stderr; stdout carries only the decoded stream and listings.
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_micros()
        .init();

    let cli = Cli::parse();

    // --- Configuration ---
    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    cli.apply_to(&mut config);
    config.validate().context("Invalid configuration")?;
    info!("Configuration: {:?}", config);

    let mut stdout = std::io::stdout().lock();

    if cli.flist {
        print_format_chars(&mut stdout).context("Failed to print format chars")?;
    }

    if cli.list || cli.listex {
        print_ports(&mut stdout, cli.listex)?;
    }

    if config.format.buffered {
        warn!("Format buffer enabled. This may cause high memory consumption.");
    }

    if config.port.path.is_some() {
        run_session(&config, &mut stdout)?;
    }

    Ok(())
}

fn print_format_chars(out: &mut impl Write) -> std::io::Result<()> {
    writeln!(out, "Available format chars:")?;
    for op in EscapeOp::ALL {
        writeln!(out, "  {}  {}", op.code(), op.description())?;
    }
    out.flush()
}

fn print_ports(out: &mut impl Write, extended: bool) -> anyhow::Result<()> {
    let available = ports::list_ports().context("Failed to enumerate serial ports")?;
    if available.is_empty() {
        writeln!(out, "No port available")?;
    } else {
        writeln!(out, "Available ports:")?;
        for port in &available {
            if extended {
                writeln!(out, "{}\t{}", port.device.display(), port.description)?;
            } else {
                writeln!(out, "{}", port.device.display())?;
            }
        }
    }
    out.flush()?;
    Ok(())
}

/// Opens the port, decodes until shutdown or failure, then writes the history.
fn run_session(config: &Config, out: &mut dyn Write) -> anyhow::Result<()> {
    let Some(path) = config.port.path.as_deref() else {
        bail!("No serial port configured");
    };

    if config.port.check_available && !ports::is_available(path)? {
        bail!("Port '{}' not available", path.display());
    }
    info!("Port '{}' available", path.display());

    let port = SerialPort::open(&config.port)
        .with_context(|| format!("Error happened while connecting to port '{}'", path.display()))?;
    info!("Connection to port '{}' opened", port.path().display());

    let shutdown = ShutdownFlag::install()?;
    let buffer = StreamBuffer::new(port).with_shutdown(shutdown.handle());
    let decoder = Decoder::new(
        buffer,
        &config.format.templates,
        config.format.escape,
        config.format.byte_order,
        config.format.policy(),
    );
    let history = (!config.output.files.is_empty()).then(|| History::new(config.output.max_chars));

    let mut monitor = Monitor::new(decoder, out, history, shutdown);
    let outcome = monitor.run();
    if let Err(e) = &outcome {
        error!("{:#}", e);
    }
    info!("Connection to port '{}' closed", path.display());

    if let Some(history) = monitor.into_history() {
        let failed = history.write_all(&config.output.files);
        if !failed.is_empty() {
            warn!("{} output file(s) could not be written", failed.len());
        }
    }

    outcome
}
