//! Referee input parsing.
//!
//! The referee sends the map once at start-up:
//!
//! ```text
//! <factoryCount>
//! <linkCount>
//! <factory1> <factory2> <distance>      (linkCount lines)
//! ```
//!
//! and then, every turn:
//!
//! ```text
//! <entityCount>
//! <entityId> <entityType> <arg1> <arg2> <arg3> <arg4> <arg5>   (entityCount lines)
//! ```

use std::io::{self, BufRead};

use thiserror::Error;

use crate::board::{EntityKind, EntityRecord, Link};

/// Upper bound on up-front reservations; larger counts grow as lines arrive.
const MAX_PRESIZE: usize = 1024;

/// Errors that can occur while reading referee input.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("read failed: {0}")]
    Io(#[from] io::Error),

    #[error("line {line}: input ended while expecting {expected}")]
    UnexpectedEof { line: usize, expected: &'static str },

    #[error("line {line}: invalid integer '{token}'")]
    InvalidInteger { line: usize, token: String },

    #[error("line {line}: expected {expected} fields, got {found}")]
    WrongFieldCount {
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("line {line}: unknown entity type '{name}'")]
    UnknownEntityType { line: usize, name: String },

    #[error("line {line}: negative value {value} for {field}")]
    Negative {
        line: usize,
        field: &'static str,
        value: i64,
    },
}

/// The map description sent once before the first turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitialInput {
    pub factory_count: usize,
    pub links: Vec<Link>,
}

/// Line-oriented reader over the referee's input stream.
pub struct TurnReader<R> {
    lines: io::Lines<R>,
    line_no: usize,
}

impl<R: BufRead> TurnReader<R> {
    pub fn new(reader: R) -> Self {
        TurnReader {
            lines: reader.lines(),
            line_no: 0,
        }
    }

    /// Reads the factory count and link list.
    pub fn read_initial(&mut self) -> Result<InitialInput, InputError> {
        let factory_count = self.expect_count("factory count")?;
        let link_count = self.expect_count("link count")?;

        let mut links = Vec::with_capacity(link_count.min(MAX_PRESIZE));
        for _ in 0..link_count {
            let line = self.expect_line("link")?;
            links.push(parse_link(&line, self.line_no)?);
        }

        Ok(InitialInput {
            factory_count,
            links,
        })
    }

    /// Reads one turn's entity records.
    ///
    /// Returns `Ok(None)` when the input ends cleanly before a new turn.
    pub fn read_turn(&mut self) -> Result<Option<Vec<EntityRecord>>, InputError> {
        let Some(header) = self.next_line()? else {
            return Ok(None);
        };
        let count = parse_count(&header, self.line_no, "entity count")?;

        let mut records = Vec::with_capacity(count.min(MAX_PRESIZE));
        for _ in 0..count {
            let line = self.expect_line("entity")?;
            records.push(parse_entity_line(&line, self.line_no)?);
        }
        Ok(Some(records))
    }

    /// Next non-blank line, or `None` at end of input.
    fn next_line(&mut self) -> Result<Option<String>, InputError> {
        for line in self.lines.by_ref() {
            self.line_no += 1;
            let line = line?;
            if !line.trim().is_empty() {
                return Ok(Some(line));
            }
        }
        Ok(None)
    }

    fn expect_line(&mut self, expected: &'static str) -> Result<String, InputError> {
        self.next_line()?.ok_or(InputError::UnexpectedEof {
            line: self.line_no,
            expected,
        })
    }

    fn expect_count(&mut self, expected: &'static str) -> Result<usize, InputError> {
        let line = self.expect_line(expected)?;
        parse_count(&line, self.line_no, expected)
    }
}

/// Parses a link line: `<a> <b> <distance>`.
pub fn parse_link(line: &str, line_no: usize) -> Result<Link, InputError> {
    let tokens = split_fields(line, 3, line_no)?;
    let a = parse_unsigned(tokens[0], line_no, "factory")?;
    let b = parse_unsigned(tokens[1], line_no, "factory")?;
    let distance = parse_unsigned(tokens[2], line_no, "distance")?;
    Ok(Link::new(a as usize, b as usize, distance as u32))
}

/// Parses an entity line: `<id> <type> <arg1> .. <arg5>`.
pub fn parse_entity_line(line: &str, line_no: usize) -> Result<EntityRecord, InputError> {
    let tokens = split_fields(line, 7, line_no)?;
    let id = parse_int(tokens[0], line_no)?;
    let kind = EntityKind::from_wire_name(tokens[1]).ok_or_else(|| InputError::UnknownEntityType {
        line: line_no,
        name: tokens[1].to_string(),
    })?;

    let mut args = [0i32; 5];
    for (slot, token) in args.iter_mut().zip(&tokens[2..]) {
        *slot = parse_int(token, line_no)?;
    }

    Ok(EntityRecord { id, kind, args })
}

fn split_fields(line: &str, expected: usize, line_no: usize) -> Result<Vec<&str>, InputError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() != expected {
        return Err(InputError::WrongFieldCount {
            line: line_no,
            expected,
            found: tokens.len(),
        });
    }
    Ok(tokens)
}

fn parse_count(line: &str, line_no: usize, field: &'static str) -> Result<usize, InputError> {
    let tokens = split_fields(line, 1, line_no)?;
    Ok(parse_unsigned(tokens[0], line_no, field)? as usize)
}

fn parse_int(token: &str, line_no: usize) -> Result<i32, InputError> {
    token.parse().map_err(|_| InputError::InvalidInteger {
        line: line_no,
        token: token.to_string(),
    })
}

fn parse_unsigned(token: &str, line_no: usize, field: &'static str) -> Result<u32, InputError> {
    let value = parse_int(token, line_no)?;
    u32::try_from(value).map_err(|_| InputError::Negative {
        line: line_no,
        field,
        value: i64::from(value),
    })
}
