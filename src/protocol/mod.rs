//! Referee protocol handling.
//!
//! Parses the referee's line-based input (map description and per-turn
//! entity lists) and serializes orders back to the wire command format.

pub mod input;
pub mod output;

pub use input::{parse_entity_line, parse_link, InitialInput, InputError, TurnReader};
pub use output::{format_order, format_orders, write_orders};
