//! Orders a player can issue in one turn.
//!
//! The data model maps directly onto the wire commands, so formatting in
//! `protocol::output` is a straight match.

use super::entity::FactoryId;

/// A single order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Order {
    /// Send troops: `MOVE 0 1 8`
    Move {
        source: FactoryId,
        target: FactoryId,
        cyborgs: u32,
    },

    /// Raise production by one level: `INC 2`
    Inc { factory: FactoryId },

    /// Do nothing this turn: `WAIT`
    Wait,
}

impl Order {
    /// Returns the attack target, if this order is a move.
    pub fn target(&self) -> Option<FactoryId> {
        match self {
            Order::Move { target, .. } => Some(*target),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn move_has_target() {
        let order = Order::Move {
            source: 0,
            target: 3,
            cyborgs: 5,
        };
        assert_eq!(order.target(), Some(3));
    }

    #[test]
    fn inc_and_wait_have_no_target() {
        assert_eq!(Order::Inc { factory: 1 }.target(), None);
        assert_eq!(Order::Wait.target(), None);
    }
}
