//! Combining a product's static profile with the assumptions for one month of a scenario.
use crate::error::PlanningError;
use crate::predictor::{FeatureVector, PRODUCT_FEATURE_PREFIX};
use crate::product::{Product, ProductID};
use crate::scenario::ScenarioMonth;
use crate::units::{Dimensionless, MoneyPerUnit, Quantity};
use anyhow::Result;

/// A product profile merged with a scenario month.
///
/// Values supplied in the scenario month take precedence over the product's static values.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedProfile<'a> {
    /// The product this month refers to
    pub product_id: &'a ProductID,
    /// The scenario month itself
    pub month: &'a ScenarioMonth,
    /// Base sale price (before the scenario's price change)
    pub sale_price: MoneyPerUnit,
    /// Cost of buying one unit
    pub purchase_cost: MoneyPerUnit,
    /// Supplier lead time
    pub lead_time_days: u32,
    /// Minimum order quantity
    pub min_order_quantity: Quantity,
    /// Price elasticity
    pub price_sensitivity: Dimensionless,
}

impl<'a> MergedProfile<'a> {
    /// Merge `product` with `month`
    pub fn new(product: &'a Product, month: &'a ScenarioMonth) -> Self {
        let overrides = &month.overrides;
        Self {
            product_id: &product.id,
            month,
            sale_price: overrides.sale_price.unwrap_or(product.sale_price),
            purchase_cost: overrides.purchase_cost.unwrap_or(product.purchase_cost),
            lead_time_days: overrides.lead_time_days.unwrap_or(product.lead_time_days),
            min_order_quantity: overrides
                .min_order_quantity
                .unwrap_or(product.min_order_quantity),
            price_sensitivity: overrides
                .price_sensitivity
                .unwrap_or(product.price_sensitivity),
        }
    }

    /// Get the value of the named model feature.
    ///
    /// Product indicator features are 1 for this month's product and 0 for all others. Features
    /// which are not known are 0.
    pub fn feature_value(&self, name: &str) -> Result<f64> {
        let value = match name {
            "sale_price" => self.sale_price.value(),
            "purchase_cost" => self.purchase_cost.value(),
            "lead_time_days" => self.lead_time_days as f64,
            "min_order_quantity" => self.min_order_quantity.value(),
            "price_sensitivity" => self.price_sensitivity.0,
            "price_change_pct" => self.month.price_change_pct,
            "organic_growth_pct" => self.month.organic_growth_pct,
            "fair" => self.month.fair,
            "climate" => self.month.climate,
            "month" => self.month.month.map_or(0.0, f64::from),
            _ => {
                if let Some(product) = name.strip_prefix(PRODUCT_FEATURE_PREFIX) {
                    return Ok(if product == &*self.product_id.0 { 1.0 } else { 0.0 });
                }

                match self.month.context.get(name) {
                    Some(raw) => parse_context_value(name, raw)?,
                    None => 0.0,
                }
            }
        };

        Ok(value)
    }

    /// Build the feature vector for the given feature names
    pub fn feature_vector(&self, feature_names: &[String]) -> Result<FeatureVector> {
        FeatureVector::from_names(feature_names.iter().map(String::as_str), |name| {
            self.feature_value(name)
        })
    }
}

/// Parse a free-form context value as a number. Blank values count as 0.
fn parse_context_value(name: &str, raw: &str) -> Result<f64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(0.0);
    }

    let value: f64 = raw.parse().map_err(|_| {
        PlanningError::computation(format!(
            "Could not parse value '{raw}' for feature {name} as a number"
        ))
    })?;
    if !value.is_finite() {
        Err(PlanningError::computation(format!(
            "Value for feature {name} must be finite"
        )))?;
    }

    Ok(value)
}
