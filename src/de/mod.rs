/*!
Stage 2: building the document tape.

The tape builder walks the structural index produced by stage 1, branching
on the byte each offset points at, and emits the flat document tape. It
drives itself as an explicit state machine rather than by recursion, with a
depth counter into fixed per-depth arrays: one slot records the unclosed
start cell and running count, one records whether that scope is an array.
Parent/child relationships are recomputed from tape positions later, never
stored as pointers.

The walker enforces the structural grammar: every object scope starts with
a string key or closes immediately, every key is followed by `:`, every
value by `,` or the matching close, and a finished document must have
consumed the whole structural index.
*/

mod tape;

pub mod document;

pub use self::document::{Document, Entries, Elements, Value};

use self::tape::{Tape, TapeNode};

use crate::error::{Error, Result};
use crate::num::{self, Number};
use crate::stage1::{self, Cursor, StructuralIndex};
use crate::unescape;
use crate::utf8;

/// Default preallocation: inputs up to 34 MiB.
pub const DEFAULT_CAPACITY: usize = 34 * 1024 * 1024;

/// Default maximum nesting depth.
pub const DEFAULT_MAX_DEPTH: usize = 1024;

/**
A reusable parser instance.

All working buffers (structural index, tape, side string buffer, container
stacks) are allocated once at construction, sized to `capacity` bytes of
input and `max_depth` levels of nesting, and rewound rather than freed
between calls. One instance serves one thread; concurrent parsing wants one
instance per worker.
*/
pub struct Parser {
    index: StructuralIndex,
    tape: Tape,
    strings: Vec<u8>,
    containers: Vec<OpenContainer>,
    is_array: Vec<bool>,
    capacity: usize,
}

#[derive(Debug, Clone, Copy, Default)]
struct OpenContainer {
    tape_index: u32,
    count: u32,
}

impl Default for Parser {
    fn default() -> Self {
        Parser::new(DEFAULT_CAPACITY, DEFAULT_MAX_DEPTH)
    }
}

impl Parser {
    /**
    Preallocate a parser for inputs up to `capacity` bytes nested at most
    `max_depth` levels deep.

    Capacities cap at 4 GiB; the structural index stores 32-bit offsets.
    */
    pub fn new(capacity: usize, max_depth: usize) -> Self {
        let capacity = capacity.min(u32::MAX as usize);

        Parser {
            index: StructuralIndex::with_capacity(capacity),
            // a value costs at most one cell per input byte plus the root
            // markers and a number's payload spill
            tape: Tape::with_capacity(capacity + 8),
            // short strings can outgrow their source text by their length
            // prefix
            strings: Vec::with_capacity(capacity + (capacity / 2) + 64),
            containers: vec![OpenContainer::default(); max_depth],
            is_array: vec![false; max_depth],
            capacity,
        }
    }

    /// The preallocated input capacity in bytes.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The preallocated nesting limit.
    pub fn max_depth(&self) -> usize {
        self.containers.len()
    }

    /**
    Parse `input` into a [`Document`] view over this parser's buffers.

    The caller's buffer is only read, never written, and needs no trailing
    slack. The returned view borrows the parser, so it is invalidated by
    the next `parse` call; the borrow checker enforces that statically.
    */
    pub fn parse<'a>(&'a mut self, input: &[u8]) -> Result<Document<'a>> {
        if input.len() > self.capacity {
            return Err(Error::CapacityExceeded {
                requested: input.len(),
                limit: self.capacity,
            });
        }

        self.reset();

        // the validator runs to completion before any structural work is
        // trusted
        utf8::validate(input)?;
        stage1::index(input, &mut self.index)?;

        let walker = Walker {
            input,
            cursor: self.index.cursor(),
            tape: &mut self.tape,
            strings: &mut self.strings,
            containers: &mut self.containers,
            is_array: &mut self.is_array,
            depth: 0,
        };
        walker.walk()?;

        Ok(Document::new(&self.tape, &self.strings))
    }

    fn reset(&mut self) {
        self.index.reset();
        self.tape.reset();
        self.strings.clear();
    }
}

/// The tape builder states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    ObjectBegin,
    ObjectField,
    ObjectContinue,
    ArrayBegin,
    ArrayValue,
    ArrayContinue,
    ScopeEnd,
    DocumentEnd,
}

struct Walker<'a, 'input> {
    input: &'input [u8],
    cursor: Cursor<'a>,
    tape: &'a mut Tape,
    strings: &'a mut Vec<u8>,
    containers: &'a mut [OpenContainer],
    is_array: &'a mut [bool],
    depth: usize,
}

impl<'a, 'input> Walker<'a, 'input> {
    fn walk(mut self) -> Result<()> {
        if self.cursor.is_empty() {
            return Err(Error::Structural {
                offset: 0,
                expected: "a value",
                found: b' ',
            });
        }

        let root = self.tape.append(TapeNode::Root);

        let offset = self.cursor.advance();
        let mut state = match self.byte_at(offset) {
            b'{' => {
                self.begin_container(false)?;
                State::ObjectBegin
            }
            b'[' => {
                self.begin_container(true)?;
                State::ArrayBegin
            }
            byte => {
                self.append_primitive(offset, byte)?;
                State::DocumentEnd
            }
        };

        loop {
            state = match state {
                State::ObjectBegin => {
                    let offset = self.cursor.advance();
                    match self.byte_at(offset) {
                        b'"' => {
                            self.append_key(offset)?;
                            State::ObjectField
                        }
                        b'}' => {
                            self.end_container();
                            State::ScopeEnd
                        }
                        found => {
                            return Err(Error::Structural {
                                offset,
                                expected: "an object key or `}`",
                                found,
                            })
                        }
                    }
                }
                State::ObjectField => {
                    let offset = self.cursor.advance();
                    match self.byte_at(offset) {
                        b':' => (),
                        found => {
                            return Err(Error::Structural {
                                offset,
                                expected: "`:`",
                                found,
                            })
                        }
                    }

                    let offset = self.cursor.advance();
                    let byte = self.byte_at(offset);
                    self.parse_value(offset, byte, State::ObjectContinue)?
                }
                State::ObjectContinue => {
                    let offset = self.cursor.advance();
                    match self.byte_at(offset) {
                        b',' => {
                            let offset = self.cursor.advance();
                            match self.byte_at(offset) {
                                b'"' => {
                                    self.append_key(offset)?;
                                    State::ObjectField
                                }
                                found => {
                                    return Err(Error::Structural {
                                        offset,
                                        expected: "an object key",
                                        found,
                                    })
                                }
                            }
                        }
                        b'}' => {
                            self.end_container();
                            State::ScopeEnd
                        }
                        found => {
                            return Err(Error::Structural {
                                offset,
                                expected: "`,` or `}`",
                                found,
                            })
                        }
                    }
                }
                State::ArrayBegin => {
                    let offset = self.cursor.advance();
                    match self.byte_at(offset) {
                        b']' => {
                            self.end_container();
                            State::ScopeEnd
                        }
                        byte => {
                            self.bump_count();
                            self.parse_value(offset, byte, State::ArrayContinue)?
                        }
                    }
                }
                State::ArrayValue => {
                    let offset = self.cursor.advance();
                    let byte = self.byte_at(offset);
                    self.bump_count();
                    self.parse_value(offset, byte, State::ArrayContinue)?
                }
                State::ArrayContinue => {
                    let offset = self.cursor.advance();
                    match self.byte_at(offset) {
                        b',' => State::ArrayValue,
                        b']' => {
                            self.end_container();
                            State::ScopeEnd
                        }
                        found => {
                            return Err(Error::Structural {
                                offset,
                                expected: "`,` or `]`",
                                found,
                            })
                        }
                    }
                }
                State::ScopeEnd => {
                    if self.depth == 0 {
                        State::DocumentEnd
                    } else if self.is_array[self.depth - 1] {
                        State::ArrayContinue
                    } else {
                        State::ObjectContinue
                    }
                }
                State::DocumentEnd => {
                    if !self.cursor.fully_consumed() {
                        let offset = self.cursor.advance();
                        return Err(Error::Structural {
                            offset,
                            expected: "end of input",
                            found: self.byte_at(offset),
                        });
                    }

                    self.tape.append(TapeNode::Root);
                    self.tape.seal(root);
                    return Ok(());
                }
            };
        }
    }

    /// The byte at `offset`, reading the sentinel offset as padding.
    #[inline]
    fn byte_at(&self, offset: usize) -> u8 {
        self.input.get(offset).copied().unwrap_or(b' ')
    }

    #[inline]
    fn parse_value(&mut self, offset: usize, byte: u8, continue_state: State) -> Result<State> {
        match byte {
            b'{' => {
                self.begin_container(false)?;
                Ok(State::ObjectBegin)
            }
            b'[' => {
                self.begin_container(true)?;
                Ok(State::ArrayBegin)
            }
            _ => {
                self.append_primitive(offset, byte)?;
                Ok(continue_state)
            }
        }
    }

    #[inline]
    fn append_primitive(&mut self, offset: usize, byte: u8) -> Result<()> {
        match byte {
            b'"' => {
                let string = unescape::unescape_into(self.input, offset, self.strings)?;
                self.tape.append(TapeNode::String { offset: string });
            }
            b't' => {
                self.expect_atom(offset, b"true")?;
                self.tape.append(TapeNode::True);
            }
            b'f' => {
                self.expect_atom(offset, b"false")?;
                self.tape.append(TapeNode::False);
            }
            b'n' => {
                self.expect_atom(offset, b"null")?;
                self.tape.append(TapeNode::Null);
            }
            b'0'..=b'9' | b'-' => match num::parse_number(self.input, offset)? {
                Number::Int(value) => {
                    self.tape.append(TapeNode::Int64(value));
                }
                Number::Double(value) => {
                    self.tape.append(TapeNode::Double(value));
                }
            },
            found => {
                return Err(Error::Structural {
                    offset,
                    expected: "a value",
                    found,
                })
            }
        }

        Ok(())
    }

    #[inline]
    fn expect_atom(&self, offset: usize, atom: &'static [u8]) -> Result<()> {
        let matches = self.input.get(offset..offset + atom.len()) == Some(atom)
            && is_delimiter(self.byte_at(offset + atom.len()));

        if !matches {
            let expected = match atom[0] {
                b't' => "`true`",
                b'f' => "`false`",
                _ => "`null`",
            };
            return Err(Error::Structural {
                offset,
                expected,
                found: self.byte_at(offset),
            });
        }

        Ok(())
    }

    #[inline]
    fn append_key(&mut self, offset: usize) -> Result<()> {
        self.bump_count();

        let string = unescape::unescape_into(self.input, offset, self.strings)?;
        self.tape.append(TapeNode::String { offset: string });

        Ok(())
    }

    #[inline]
    fn bump_count(&mut self) {
        test_assert!(self.depth > 0);

        let open = &mut self.containers[self.depth - 1];
        open.count = open.count.saturating_add(1);
    }

    #[inline]
    fn begin_container(&mut self, is_array: bool) -> Result<()> {
        if self.depth == self.containers.len() {
            return Err(Error::CapacityExceeded {
                requested: self.depth + 1,
                limit: self.containers.len(),
            });
        }

        let node = if is_array {
            TapeNode::StartArray
        } else {
            TapeNode::StartObject
        };
        let tape_index = self.tape.append(node);

        self.containers[self.depth] = OpenContainer {
            tape_index: tape_index as u32,
            count: 0,
        };
        self.is_array[self.depth] = is_array;
        self.depth += 1;

        Ok(())
    }

    /// Close the innermost scope; the state machine guarantees the closing
    /// byte matched the container kind.
    #[inline]
    fn end_container(&mut self) {
        test_assert!(self.depth > 0);

        self.depth -= 1;
        let open = self.containers[self.depth];
        let start = open.tape_index as usize;

        let node = if self.is_array[self.depth] {
            TapeNode::EndArray { start }
        } else {
            TapeNode::EndObject { start }
        };
        let end = self.tape.append(node);

        self.tape.patch_container(start, end, open.count);
    }
}

#[inline]
fn is_delimiter(b: u8) -> bool {
    matches!(
        b,
        b'{' | b'}' | b'[' | b']' | b':' | b',' | b' ' | b'\t' | b'\n' | b'\r'
    )
}
