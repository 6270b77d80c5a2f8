use crate::domain::model::{format_won, MenuItem, OrderLine, OrderSnapshot};
use crate::utils::error::{KioskError, Result};
use std::sync::Arc;

pub const MIN_UNITS: u32 = 1;
pub const MAX_UNITS: u32 = 99;

/// The cart: one line per distinct item id, kept in first-added order.
#[derive(Debug, Default)]
pub struct OrderAggregator {
    lines: Vec<OrderLine>,
}

impl OrderAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one unit of `item`. A line already at `u32::MAX` is left as is.
    pub fn add(&mut self, item: &Arc<MenuItem>) {
        match self.lines.iter_mut().find(|line| line.item.id == item.id) {
            Some(line) => match line.quantity.checked_add(1) {
                Some(quantity) => line.quantity = quantity,
                None => {
                    tracing::warn!("Quantity of {} (id {}) is saturated", item.name, item.id);
                    return;
                }
            },
            None => self.lines.push(OrderLine {
                item: Arc::clone(item),
                quantity: 1,
            }),
        }
        tracing::debug!(
            "Added 1 x {} (id {}), total now {}",
            item.name,
            item.id,
            format_won(self.total())
        );
    }

    /// Quantity-dialog path: adds `quantity` units, one `add` per unit.
    pub fn add_units(&mut self, item: &Arc<MenuItem>, quantity: u32) -> Result<()> {
        if !(MIN_UNITS..=MAX_UNITS).contains(&quantity) {
            return Err(KioskError::InvalidQuantity {
                quantity,
                min: MIN_UNITS,
                max: MAX_UNITS,
            });
        }
        for _ in 0..quantity {
            self.add(item);
        }
        Ok(())
    }

    pub fn clear(&mut self) {
        tracing::debug!("Clearing order with {} lines", self.lines.len());
        self.lines.clear();
    }

    pub fn total(&self) -> u64 {
        self.lines.iter().map(OrderLine::subtotal).sum()
    }

    pub fn lines(&self) -> &[OrderLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn quantity_of(&self, id: u32) -> u32 {
        self.lines
            .iter()
            .find(|line| line.item.id == id)
            .map_or(0, |line| line.quantity)
    }

    pub fn snapshot(&self) -> OrderSnapshot {
        OrderSnapshot {
            lines: self.lines.clone(),
            total: self.total(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gukbap() -> (Arc<MenuItem>, Arc<MenuItem>) {
        (
            Arc::new(MenuItem::new(1, "돼지국밥", 9000)),
            Arc::new(MenuItem::new(2, "순대국밥", 10000)),
        )
    }

    #[test]
    fn test_add_merges_lines_by_id() {
        let (pork, sundae) = gukbap();
        let mut order = OrderAggregator::new();

        order.add(&pork);
        order.add(&sundae);
        order.add(&pork);

        assert_eq!(order.lines().len(), 2);
        assert_eq!(order.lines()[0].item.id, 1);
        assert_eq!(order.lines()[0].quantity, 2);
        assert_eq!(order.lines()[1].item.id, 2);
        assert_eq!(order.total(), 28000);
    }

    #[test]
    fn test_quantity_equals_number_of_adds() {
        let (pork, sundae) = gukbap();
        let mut order = OrderAggregator::new();
        let sequence = [&pork, &sundae, &sundae, &pork, &sundae, &pork, &pork];

        let mut previous_total = 0;
        for item in sequence {
            order.add(item);
            assert!(order.total() >= previous_total);
            previous_total = order.total();
        }

        assert_eq!(order.quantity_of(1), 4);
        assert_eq!(order.quantity_of(2), 3);
        assert_eq!(order.total(), 4 * 9000 + 3 * 10000);
    }

    #[test]
    fn test_clear_resets_total_and_lines() {
        let (pork, _) = gukbap();
        let mut order = OrderAggregator::new();
        order.add_units(&pork, 3).unwrap();

        order.clear();

        assert_eq!(order.total(), 0);
        assert!(order.lines().is_empty());
        assert!(order.snapshot().is_empty());
    }

    #[test]
    fn test_add_units_bounds() {
        let (pork, _) = gukbap();
        let mut order = OrderAggregator::new();

        assert!(matches!(
            order.add_units(&pork, 0),
            Err(KioskError::InvalidQuantity { quantity: 0, .. })
        ));
        assert!(order.add_units(&pork, 100).is_err());
        assert!(order.is_empty());

        order.add_units(&pork, 99).unwrap();
        assert_eq!(order.quantity_of(1), 99);
    }

    #[test]
    fn test_add_on_saturated_line_does_not_wrap() {
        let (pork, _) = gukbap();
        let mut order = OrderAggregator {
            lines: vec![OrderLine {
                item: Arc::clone(&pork),
                quantity: u32::MAX,
            }],
        };

        order.add(&pork);

        assert_eq!(order.quantity_of(1), u32::MAX);
        assert_eq!(order.lines().len(), 1);
    }
}
