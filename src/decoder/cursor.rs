// src/decoder/cursor.rs

use super::{ByteSource, StreamBuffer, StreamError};

/// Read head of one template into the shared [`StreamBuffer`].
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Cursor {
    offset: usize,
}

impl Cursor {
    pub fn new() -> Self {
        Cursor { offset: 0 }
    }

    /// Reads the byte under the cursor and advances it. Blocks if the byte has
    /// not arrived yet.
    pub fn read<S: ByteSource>(&mut self, buffer: &mut StreamBuffer<S>) -> Result<u8, StreamError> {
        let byte = buffer.peek(self.offset)?;
        self.offset += 1;
        Ok(byte)
    }

    /// Moves the cursor back by `count` bytes after the buffer dropped them.
    pub fn rewind(&mut self, count: usize) {
        debug_assert!(count <= self.offset, "rewinding past the buffer head");
        self.offset -= count;
    }

    pub fn position(&self) -> usize {
        self.offset
    }
}
