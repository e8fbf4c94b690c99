//! Order serialization.
//!
//! One line per turn, commands separated by `;`:
//! `MOVE 0 1 8;INC 0`. An empty turn is `WAIT`.

use std::io::{self, Write};

use crate::board::Order;

/// Formats a single order as a wire command.
pub fn format_order(order: &Order) -> String {
    match order {
        Order::Move {
            source,
            target,
            cyborgs,
        } => format!("MOVE {} {} {}", source, target, cyborgs),
        Order::Inc { factory } => format!("INC {}", factory),
        Order::Wait => "WAIT".to_string(),
    }
}

/// Formats a turn's orders as one command line.
pub fn format_orders(orders: &[Order]) -> String {
    if orders.is_empty() {
        return format_order(&Order::Wait);
    }
    orders.iter().map(format_order).collect::<Vec<_>>().join(";")
}

/// Writes a turn's orders and flushes, so the referee sees them immediately.
pub fn write_orders<W: Write>(out: &mut W, orders: &[Order]) -> io::Result<()> {
    writeln!(out, "{}", format_orders(orders))?;
    out.flush()
}
