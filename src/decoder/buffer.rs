// src/decoder/buffer.rs

//! Append-only byte queue shared by all cursors.

use super::{ByteSource, StreamError};
use log::{debug, trace};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Bytes pulled from a [`ByteSource`], addressed by absolute offset from the
/// current head.
///
/// The buffer only grows when a cursor asks for a byte past its tail. There is
/// no upper bound: a buffered session whose templates drift apart will hold on
/// to every byte the slowest template has not reached yet.
pub struct StreamBuffer<S: ByteSource> {
    source: Option<S>,
    bytes: VecDeque<u8>,
    shutdown: Option<Arc<AtomicBool>>,
}

impl<S: ByteSource> StreamBuffer<S> {
    pub fn new(source: S) -> Self {
        StreamBuffer {
            source: Some(source),
            bytes: VecDeque::new(),
            shutdown: None,
        }
    }

    /// Lets a pending [`peek`](Self::peek) give up on a source timeout once
    /// `flag` is set.
    pub fn with_shutdown(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown = Some(flag);
        self
    }

    /// Returns the byte at `index`, pulling from the source until it exists.
    pub fn peek(&mut self, index: usize) -> Result<u8, StreamError> {
        while index >= self.bytes.len() {
            self.pull()?;
        }
        Ok(self.bytes[index])
    }

    fn pull(&mut self) -> Result<(), StreamError> {
        let source = self.source.as_mut().ok_or(StreamError::Closed)?;
        loop {
            match source.read_byte()? {
                Some(byte) => {
                    trace!("StreamBuffer: pulled byte {:#04x}", byte);
                    self.bytes.push_back(byte);
                    return Ok(());
                }
                None => {
                    if self
                        .shutdown
                        .as_ref()
                        .is_some_and(|flag| flag.load(Ordering::SeqCst))
                    {
                        debug!("StreamBuffer: shutdown requested during read timeout.");
                        return Err(StreamError::Interrupted);
                    }
                }
            }
        }
    }

    /// Discards the oldest `count` bytes.
    ///
    /// # Panics
    ///
    /// Panics if fewer than `count` bytes are buffered. Reconciliation never
    /// drops past the furthest cursor, so this indicates a bug.
    pub fn drop_front(&mut self, count: usize) {
        assert!(
            count <= self.bytes.len(),
            "dropping {} bytes from a buffer of {}",
            count,
            self.bytes.len()
        );
        self.bytes.drain(..count);
    }

    /// Number of bytes currently held.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Closes the source. Returns `false` if it was already closed.
    pub fn close(&mut self) -> bool {
        match self.source.take() {
            Some(mut source) => source.close(),
            None => false,
        }
    }
}
