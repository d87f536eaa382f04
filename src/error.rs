/*!
The error taxonomy for parsing.

Every error is fatal to the `parse` call that raised it, but leaves the
[`Parser`](crate::Parser) itself reusable. Variants carry the byte offset the
problem was detected at and, where it helps debugging, the expected and found
bytes.
*/

/// An error encountered while parsing a document.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The input is not valid UTF-8.
    ///
    /// Raised before any structural work is trusted.
    #[error("invalid UTF-8 at byte {offset}")]
    InvalidUtf8 { offset: usize },

    /// A raw control byte appeared inside a string literal.
    #[error("unescaped control character 0x{found:02x} in a string at byte {offset}")]
    UnescapedControlCharacter { offset: usize, found: u8 },

    /// A string literal was still open when the input ended.
    #[error("unterminated string at end of input (byte {offset})")]
    UnterminatedString { offset: usize },

    /// An unknown escape character, malformed `\u` hex sequence, or an
    /// unpaired or invalid surrogate.
    #[error("invalid escape sequence at byte {offset} (`\\{}`)", char::from(*.found))]
    InvalidEscape { offset: usize, found: u8 },

    /// A numeric literal that doesn't follow the JSON grammar.
    #[error("malformed number at byte {offset}: {reason}")]
    MalformedNumber { offset: usize, reason: &'static str },

    /// An integer literal outside the signed 64-bit range.
    #[error("number at byte {offset} is outside the 64-bit integer range")]
    NumberOutOfRange { offset: usize },

    /// The document structure is broken: a missing `:` or `,`, a mismatched
    /// or missing close, an object key that isn't a string, or trailing
    /// tokens after the root value.
    #[error("expected {expected} at byte {offset}, found `{}`", char::from(*.found))]
    Structural {
        offset: usize,
        expected: &'static str,
        found: u8,
    },

    /// The input length or nesting depth exceeds what the parser
    /// preallocated at construction.
    #[error("input exceeds the preallocated capacity ({requested} > {limit})")]
    CapacityExceeded { requested: usize, limit: usize },
}

impl Error {
    /// The byte offset the error was detected at.
    pub fn offset(&self) -> usize {
        match self {
            Error::InvalidUtf8 { offset }
            | Error::UnescapedControlCharacter { offset, .. }
            | Error::UnterminatedString { offset }
            | Error::InvalidEscape { offset, .. }
            | Error::MalformedNumber { offset, .. }
            | Error::NumberOutOfRange { offset }
            | Error::Structural { offset, .. } => *offset,
            Error::CapacityExceeded { .. } => 0,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
