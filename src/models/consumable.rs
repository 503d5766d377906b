//! Consumable stock model

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::enums::ConsumableUnit;

/// A stocked supply item with a reorder threshold
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Consumable {
    pub id: String,
    pub name: String,
    pub unit: ConsumableUnit,
    pub quantity: u32,
    pub low_stock_threshold: u32,
}

impl Consumable {
    pub fn is_low_stock(&self) -> bool {
        self.quantity <= self.low_stock_threshold
    }

    /// Quantity after applying `delta`, clamped at zero
    pub fn adjusted_quantity(&self, delta: i64) -> u32 {
        i64::from(self.quantity)
            .saturating_add(delta)
            .clamp(0, i64::from(u32::MAX)) as u32
    }
}

/// Consumable as listed in the inventory view
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ConsumableSummary {
    #[serde(flatten)]
    pub consumable: Consumable,
    pub low_stock: bool,
}

impl From<Consumable> for ConsumableSummary {
    fn from(consumable: Consumable) -> Self {
        Self {
            low_stock: consumable.is_low_stock(),
            consumable,
        }
    }
}

/// Stock adjustment request
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct AdjustQuantity {
    /// Signed change, typically +1 or -1
    pub delta: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tips(quantity: u32) -> Consumable {
        Consumable {
            id: "cons-1".to_string(),
            name: "Pipette Tips".to_string(),
            unit: ConsumableUnit::Box,
            quantity,
            low_stock_threshold: 10,
        }
    }

    #[test]
    fn test_adjust_never_negative() {
        assert_eq!(tips(5).adjusted_quantity(-1000), 0);
        assert_eq!(tips(5).adjusted_quantity(-1), 4);
        assert_eq!(tips(5).adjusted_quantity(1), 6);
        assert_eq!(tips(5).adjusted_quantity(i64::MAX), u32::MAX);
        assert_eq!(tips(5).adjusted_quantity(i64::MIN), 0);
    }

    #[test]
    fn test_low_stock_is_inclusive() {
        assert!(tips(10).is_low_stock());
        assert!(!tips(11).is_low_stock());
    }
}
