// src/decoder/escape.rs

//! The fixed table of escape operations available inside format templates.

use super::{ByteOrder, ByteSource, Cursor, StreamBuffer, StreamError};
use log::trace;

/// Emitted in place of an escape code that names no operation.
pub const BAD_ESCAPE: &str = "<BADESC>";
/// Emitted when a dynamic escape reads its own code from the stream.
pub const RECURSIVE_ESCAPE: &str = "<RECESC>";

/// Session-wide settings the operations depend on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EscapeContext {
    pub escape: char,
    pub byte_order: ByteOrder,
}

/// One decoding operation, selected by the character after the escape char.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EscapeOp {
    Binary,
    Hex,
    Integer,
    Word,
    Ascii,
    Discard,
    Dynamic,
    Newline,
    Tab,
}

impl EscapeOp {
    /// Every operation, in the order they are listed to users.
    pub const ALL: [EscapeOp; 9] = [
        EscapeOp::Binary,
        EscapeOp::Hex,
        EscapeOp::Integer,
        EscapeOp::Word,
        EscapeOp::Ascii,
        EscapeOp::Discard,
        EscapeOp::Dynamic,
        EscapeOp::Newline,
        EscapeOp::Tab,
    ];

    pub fn from_code(code: char) -> Option<EscapeOp> {
        match code {
            'b' => Some(EscapeOp::Binary),
            'h' => Some(EscapeOp::Hex),
            'i' => Some(EscapeOp::Integer),
            'd' => Some(EscapeOp::Word),
            'a' => Some(EscapeOp::Ascii),
            'x' => Some(EscapeOp::Discard),
            'e' => Some(EscapeOp::Dynamic),
            'n' => Some(EscapeOp::Newline),
            't' => Some(EscapeOp::Tab),
            _ => None,
        }
    }

    pub fn code(self) -> char {
        match self {
            EscapeOp::Binary => 'b',
            EscapeOp::Hex => 'h',
            EscapeOp::Integer => 'i',
            EscapeOp::Word => 'd',
            EscapeOp::Ascii => 'a',
            EscapeOp::Discard => 'x',
            EscapeOp::Dynamic => 'e',
            EscapeOp::Newline => 'n',
            EscapeOp::Tab => 't',
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            EscapeOp::Binary => "print next byte as binary string",
            EscapeOp::Hex => "print next byte as hexadecimal string",
            EscapeOp::Integer => "print next byte as decimal integer",
            EscapeOp::Word => "print next word as decimal integer",
            EscapeOp::Ascii => "print next byte as ascii char",
            EscapeOp::Discard => "discard next byte",
            EscapeOp::Dynamic => "use next byte as ascii escape char",
            EscapeOp::Newline => "print new line",
            EscapeOp::Tab => "print tab",
        }
    }

    /// Runs the operation, consuming bytes through `cursor`.
    pub fn apply<S: ByteSource>(
        self,
        cursor: &mut Cursor,
        buffer: &mut StreamBuffer<S>,
        ctx: &EscapeContext,
    ) -> Result<String, StreamError> {
        let text = match self {
            EscapeOp::Binary => format!("{:08b}", cursor.read(buffer)?),
            EscapeOp::Hex => format!("{:02x}", cursor.read(buffer)?),
            EscapeOp::Integer => ctx.byte_order.to_uint(&[cursor.read(buffer)?]).to_string(),
            EscapeOp::Word => {
                // Always big-endian, independent of the configured byte order.
                let high = ctx.byte_order.to_uint(&[cursor.read(buffer)?]);
                let low = ctx.byte_order.to_uint(&[cursor.read(buffer)?]);
                ((high << 8) | low).to_string()
            }
            EscapeOp::Ascii => char::from(cursor.read(buffer)?).to_string(),
            EscapeOp::Discard => {
                cursor.read(buffer)?;
                String::new()
            }
            EscapeOp::Dynamic => {
                let code = char::from(cursor.read(buffer)?);
                if code == self.code() {
                    trace!("EscapeOp: dynamic escape selected itself");
                    RECURSIVE_ESCAPE.to_string()
                } else {
                    dispatch(code, cursor, buffer, ctx)?
                }
            }
            EscapeOp::Newline => "\n".to_string(),
            EscapeOp::Tab => "\t".to_string(),
        };
        Ok(text)
    }
}

/// Looks up `code` and runs the matching operation. Unknown codes yield
/// [`BAD_ESCAPE`] without touching the cursor.
pub fn dispatch<S: ByteSource>(
    code: char,
    cursor: &mut Cursor,
    buffer: &mut StreamBuffer<S>,
    ctx: &EscapeContext,
) -> Result<String, StreamError> {
    match EscapeOp::from_code(code) {
        Some(op) => op.apply(cursor, buffer, ctx),
        None => {
            trace!("EscapeOp: no operation for code {:?}", code);
            Ok(BAD_ESCAPE.to_string())
        }
    }
}
