// src/decoder/engine.rs

//! Round-based decoding over a shared buffer.

use super::escape::dispatch;
use super::{ByteOrder, ByteSource, Cursor, EscapeContext, StreamBuffer, StreamError, Template};
use log::{debug, trace};

/// How cursors are reconciled against the buffer after each round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncPolicy {
    /// Advance by the hungriest template; every cursor restarts at the head.
    /// Bytes a slower template did not reach are skipped.
    #[default]
    Synchronized,
    /// Advance by the slowest template; faster templates keep their lookahead.
    Buffered,
}

/// Runs every configured template once per round against a shared
/// [`StreamBuffer`], then trims the buffer.
pub struct Decoder<S: ByteSource> {
    buffer: StreamBuffer<S>,
    templates: Vec<Template>,
    cursors: Vec<Cursor>,
    ctx: EscapeContext,
    policy: SyncPolicy,
}

impl<S: ByteSource> Decoder<S> {
    /// Creates a decoder. An empty `formats` list falls back to a single
    /// template printing each byte as a character.
    pub fn new(
        buffer: StreamBuffer<S>,
        formats: &[String],
        escape: char,
        byte_order: ByteOrder,
        policy: SyncPolicy,
    ) -> Self {
        let templates: Vec<Template> = if formats.is_empty() {
            vec![Template::parse(&format!("{}a", escape), escape)]
        } else {
            formats.iter().map(|f| Template::parse(f, escape)).collect()
        };
        let cursors = vec![Cursor::new(); templates.len()];
        debug!(
            "Decoder: {} template(s), escape {:?}, {:?}, {:?}",
            templates.len(),
            escape,
            byte_order,
            policy
        );
        Decoder {
            buffer,
            templates,
            cursors,
            ctx: EscapeContext { escape, byte_order },
            policy,
        }
    }

    /// Decodes one round and returns its text.
    ///
    /// If the source fails or the round is interrupted, the partial text is
    /// discarded and no reconciliation takes place.
    pub fn next_chunk(&mut self) -> Result<String, StreamError> {
        let mut out = String::new();
        for (template, cursor) in self.templates.iter().zip(self.cursors.iter_mut()) {
            out.push_str(template.prefix());
            for segment in template.segments() {
                out.push_str(&dispatch(segment.code, cursor, &mut self.buffer, &self.ctx)?);
                out.push_str(&segment.trailing);
            }
        }
        self.reconcile();
        Ok(out)
    }

    fn reconcile(&mut self) {
        let positions = self.cursors.iter().map(Cursor::position);
        let consumed = match self.policy {
            SyncPolicy::Synchronized => positions.max().unwrap_or(0),
            SyncPolicy::Buffered => positions.min().unwrap_or(0),
        };
        for cursor in &mut self.cursors {
            match self.policy {
                SyncPolicy::Synchronized => {
                    let position = cursor.position();
                    cursor.rewind(position);
                }
                SyncPolicy::Buffered => cursor.rewind(consumed),
            }
        }
        self.buffer.drop_front(consumed);
        trace!(
            "Decoder: round consumed {} byte(s), {} left buffered",
            consumed,
            self.buffer.len()
        );
    }

    pub fn templates(&self) -> &[Template] {
        &self.templates
    }

    pub fn cursors(&self) -> &[Cursor] {
        &self.cursors
    }

    pub fn buffer(&self) -> &StreamBuffer<S> {
        &self.buffer
    }

    pub fn policy(&self) -> SyncPolicy {
        self.policy
    }

    /// Closes the underlying source. Returns `false` if it was already closed.
    pub fn close(&mut self) -> bool {
        self.buffer.close()
    }
}
