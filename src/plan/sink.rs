//! Order accumulation for one turn.

use crate::board::{FactoryId, Order};

/// Collects committed orders and hands them out once per turn.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderSink {
    orders: Vec<Order>,
}

impl OrderSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an attack.
    pub fn attack(&mut self, source: FactoryId, target: FactoryId, cyborgs: u32) {
        self.orders.push(Order::Move {
            source,
            target,
            cyborgs,
        });
    }

    /// Records a production upgrade.
    pub fn inc(&mut self, factory: FactoryId) {
        self.orders.push(Order::Inc { factory });
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    /// Orders committed so far, in commit order.
    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    /// Takes the turn's orders and leaves the sink empty.
    ///
    /// A turn with nothing committed yields a single `Wait`.
    pub fn flush(&mut self) -> Vec<Order> {
        let orders = std::mem::take(&mut self.orders);
        if orders.is_empty() {
            vec![Order::Wait]
        } else {
            orders
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_sink_flushes_wait() {
        let mut sink = OrderSink::new();
        assert!(sink.is_empty());
        assert_eq!(sink.flush(), vec![Order::Wait]);
    }

    #[test]
    fn flush_keeps_commit_order_and_clears() {
        let mut sink = OrderSink::new();
        sink.attack(0, 1, 8);
        sink.inc(0);
        assert_eq!(sink.len(), 2);
        assert_eq!(
            sink.flush(),
            vec![
                Order::Move {
                    source: 0,
                    target: 1,
                    cyborgs: 8
                },
                Order::Inc { factory: 0 },
            ]
        );
        assert!(sink.is_empty());
        assert_eq!(sink.flush(), vec![Order::Wait]);
    }
}
