// src/decoder/testing.rs

//! In-memory byte source for tests.

use super::ByteSource;
use std::cell::Cell;
use std::collections::VecDeque;
use std::io;
use std::rc::Rc;

/// Serves a fixed byte sequence. Once exhausted it reports `UnexpectedEof`,
/// or keeps timing out if built with [`MockSource::timing_out`].
#[derive(Debug)]
pub struct MockSource {
    data: VecDeque<u8>,
    pulled: Rc<Cell<usize>>,
    closed: Rc<Cell<bool>>,
    timeout_when_empty: bool,
    timeouts_first: usize,
}

impl MockSource {
    pub fn new(data: &[u8]) -> Self {
        MockSource {
            data: data.iter().copied().collect(),
            pulled: Rc::new(Cell::new(0)),
            closed: Rc::new(Cell::new(false)),
            timeout_when_empty: false,
            timeouts_first: 0,
        }
    }

    /// Reports timeouts instead of an error once the data runs out.
    pub fn timing_out(mut self) -> Self {
        self.timeout_when_empty = true;
        self
    }

    /// Reports `count` timeouts before serving the first byte.
    pub fn with_leading_timeouts(mut self, count: usize) -> Self {
        self.timeouts_first = count;
        self
    }

    /// Shared counter of bytes handed out so far.
    pub fn pulled(&self) -> Rc<Cell<usize>> {
        Rc::clone(&self.pulled)
    }

    /// Shared flag set once the source is closed.
    pub fn closed(&self) -> Rc<Cell<bool>> {
        Rc::clone(&self.closed)
    }
}

impl ByteSource for MockSource {
    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        if self.timeouts_first > 0 {
            self.timeouts_first -= 1;
            return Ok(None);
        }
        match self.data.pop_front() {
            Some(byte) => {
                self.pulled.set(self.pulled.get() + 1);
                Ok(Some(byte))
            }
            None if self.timeout_when_empty => Ok(None),
            None => Err(io::Error::new(io::ErrorKind::UnexpectedEof, "mock source exhausted")),
        }
    }

    fn close(&mut self) -> bool {
        !self.closed.replace(true)
    }
}
