// src/monitor.rs

//! Drives decoding rounds and forwards their output, the session loop of the
//! application.

use crate::decoder::{ByteSource, Decoder, StreamError};
use crate::history::History;
use crate::os::signal::ShutdownFlag;
use anyhow::{Context, Error as AnyhowError};
use std::io::Write;

/// State of the monitor after one round.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum MonitorStatus {
    /// A chunk was emitted; keep going.
    Running,
    /// Shutdown was requested. Stop and tear down.
    Shutdown,
}

/// Owns the decoder for one session and writes each round's text to `sink`
/// in order, optionally recording it in a [`History`].
pub struct Monitor<'a, S: ByteSource> {
    decoder: Decoder<S>,
    sink: &'a mut dyn Write,
    history: Option<History>,
    shutdown: ShutdownFlag,
    rounds: u64,
}

impl<'a, S: ByteSource> Monitor<'a, S> {
    pub fn new(
        decoder: Decoder<S>,
        sink: &'a mut dyn Write,
        history: Option<History>,
        shutdown: ShutdownFlag,
    ) -> Self {
        Monitor {
            decoder,
            sink,
            history,
            shutdown,
            rounds: 0,
        }
    }

    /// Runs a single round.
    pub fn process_round(&mut self) -> Result<MonitorStatus, AnyhowError> {
        if self.shutdown.is_requested() {
            return Ok(MonitorStatus::Shutdown);
        }
        let chunk = match self.decoder.next_chunk() {
            Ok(chunk) => chunk,
            Err(StreamError::Interrupted) => {
                log::info!("Monitor: round interrupted by shutdown request.");
                return Ok(MonitorStatus::Shutdown);
            }
            Err(e) => return Err(e).context("Error happened while reading from port"),
        };
        self.sink
            .write_all(chunk.as_bytes())
            .and_then(|_| self.sink.flush())
            .context("Failed to write decoded output")?;
        if let Some(history) = self.history.as_mut() {
            history.extend(&chunk);
        }
        self.rounds += 1;
        log::trace!("Monitor: round {} emitted {} byte(s) of text", self.rounds, chunk.len());
        Ok(MonitorStatus::Running)
    }

    /// Runs rounds until shutdown or failure, then closes the source. Errors
    /// are returned after the source has been closed.
    pub fn run(&mut self) -> Result<(), AnyhowError> {
        let outcome = loop {
            match self.process_round() {
                Ok(MonitorStatus::Running) => continue,
                Ok(MonitorStatus::Shutdown) => break Ok(()),
                Err(e) => break Err(e),
            }
        };
        if self.decoder.close() {
            log::info!("Monitor: connection closed after {} round(s).", self.rounds);
        }
        outcome
    }

    pub fn rounds(&self) -> u64 {
        self.rounds
    }

    pub fn history(&self) -> Option<&History> {
        self.history.as_ref()
    }

    pub fn into_history(self) -> Option<History> {
        self.history
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::testing::MockSource;
    use crate::decoder::{ByteOrder, StreamBuffer, SyncPolicy};

    fn decoder(source: MockSource, formats: &[&str], policy: SyncPolicy) -> Decoder<MockSource> {
        let formats: Vec<String> = formats.iter().map(|f| f.to_string()).collect();
        Decoder::new(StreamBuffer::new(source), &formats, '%', ByteOrder::Big, policy)
    }

    #[test_log::test]
    fn test_run_emits_chunks_in_order_until_source_fails() {
        let source = MockSource::new(&[0x01, 0x02, 0x03]);
        let closed = source.closed();
        let mut out = Vec::new();
        let mut monitor = Monitor::new(
            decoder(source, &["%i,"], SyncPolicy::Synchronized),
            &mut out,
            Some(History::new(4)),
            ShutdownFlag::new(),
        );

        // The mock runs dry after three bytes, which ends the session.
        assert!(monitor.run().is_err());
        assert_eq!(monitor.rounds(), 3);
        assert!(closed.get());
        assert_eq!(monitor.history().unwrap().contents(), "2,3,");
        drop(monitor);
        assert_eq!(String::from_utf8(out).unwrap(), "1,2,3,");
    }

    #[test_log::test]
    fn test_shutdown_before_round_stops_cleanly() {
        let source = MockSource::new(b"abc");
        let pulled = source.pulled();
        let shutdown = ShutdownFlag::new();
        shutdown.request();
        let mut out = Vec::new();
        let mut monitor = Monitor::new(
            decoder(source, &["%a"], SyncPolicy::Synchronized),
            &mut out,
            None,
            shutdown,
        );
        assert!(monitor.run().is_ok());
        assert_eq!(monitor.rounds(), 0);
        assert_eq!(pulled.get(), 0);
    }

    #[test_log::test]
    fn test_shutdown_during_blocked_read_ends_session() {
        // The buffer sees the request only once the idle source times out.
        let stream_flag = ShutdownFlag::new();
        let buffer = StreamBuffer::new(MockSource::new(b"AB").timing_out())
            .with_shutdown(stream_flag.handle());
        let mut out = Vec::new();
        let mut monitor = Monitor::new(
            Decoder::new(buffer, &[], '%', ByteOrder::Big, SyncPolicy::Synchronized),
            &mut out,
            None,
            ShutdownFlag::new(),
        );
        assert_eq!(monitor.process_round().unwrap(), MonitorStatus::Running);
        assert_eq!(monitor.process_round().unwrap(), MonitorStatus::Running);
        stream_flag.request();
        assert_eq!(monitor.process_round().unwrap(), MonitorStatus::Shutdown);
        assert_eq!(monitor.rounds(), 2);
        drop(monitor);
        assert_eq!(out, b"AB");
    }
}
