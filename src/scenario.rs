//! Scenarios are named sequences of monthly assumptions about prices and growth.
use crate::units::{Dimensionless, MoneyPerUnit, Quantity};
use indexmap::IndexMap;
use serde_string_enum::{DeserializeLabeledStringEnum, SerializeLabeledStringEnum};
use strum::EnumIter;

/// The three scenarios which are simulated and compared against each other
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    EnumIter,
    SerializeLabeledStringEnum,
    DeserializeLabeledStringEnum,
)]
pub enum ScenarioKind {
    /// Pessimistic assumptions
    #[string = "worst"]
    Worst,
    /// The baseline against which the other scenarios are compared
    #[string = "conservative"]
    Conservative,
    /// Optimistic assumptions
    #[string = "best"]
    Best,
}

/// A map of scenario months, keyed by which scenario they belong to
pub type ScenarioMap = IndexMap<ScenarioKind, Vec<ScenarioMonth>>;

/// Values supplied for a month which replace the product's static profile.
///
/// Any field left as `None` falls back to the product's own value.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProfileOverrides {
    /// Replacement sale price
    pub sale_price: Option<MoneyPerUnit>,
    /// Replacement purchase cost
    pub purchase_cost: Option<MoneyPerUnit>,
    /// Replacement lead time
    pub lead_time_days: Option<u32>,
    /// Replacement minimum order quantity
    pub min_order_quantity: Option<Quantity>,
    /// Replacement price sensitivity
    pub price_sensitivity: Option<Dimensionless>,
}

/// The assumptions for a single month of a scenario
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ScenarioMonth {
    /// The product, as written by the user (surrounding whitespace is ignored for lookups)
    pub product_id: String,
    /// Month of the year (1 to 12), used as a seasonal feature
    pub month: Option<u32>,
    /// Change in sale price, in percent (e.g. `-10.0` for a 10% discount)
    pub price_change_pct: f64,
    /// Growth in demand independent of price, in percent
    pub organic_growth_pct: f64,
    /// Whether a trade fair takes place this month (1 or 0)
    pub fair: f64,
    /// Climate indicator for the month
    pub climate: f64,
    /// Overrides for the product's static profile
    pub overrides: ProfileOverrides,
    /// Any further values supplied for the month, which the model may use as features
    pub context: IndexMap<String, String>,
}

impl ScenarioMonth {
    /// Create a [`ScenarioMonth`] with no price change, growth or context
    pub fn new(product_id: &str, month: u32) -> Self {
        Self {
            product_id: product_id.to_string(),
            month: Some(month),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_scenario_kind_names() {
        assert_eq!(
            ScenarioKind::iter().map(|kind| kind.to_string()).collect::<Vec<_>>(),
            ["worst", "conservative", "best"]
        );
        assert_eq!("best".parse::<ScenarioKind>().unwrap(), ScenarioKind::Best);
        assert!("average".parse::<ScenarioKind>().is_err());
    }
}
