//! Products are the goods being sold and purchased. Each has a set of static commercial attributes
//! taken from the sales dataset.
use crate::error::PlanningError;
use crate::id::define_id_type;
use crate::units::{Dimensionless, MoneyPerUnit, Quantity};
use anyhow::Result;
use indexmap::IndexMap;

define_id_type! {ProductID}

/// A map of [`Product`]s, keyed by product ID
pub type ProductMap = IndexMap<ProductID, Product>;

/// The static commercial profile of a product.
///
/// These values do not change over the course of a simulation.
#[derive(PartialEq, Debug, Clone)]
pub struct Product {
    /// Unique identifier for the product (e.g. "SKU-001")
    pub id: ProductID,
    /// Price at which one unit is sold
    pub sale_price: MoneyPerUnit,
    /// Price at which one unit is bought from the supplier
    pub purchase_cost: MoneyPerUnit,
    /// Days between placing an order and receiving it
    pub lead_time_days: u32,
    /// Orders must be placed in multiples of this quantity
    pub min_order_quantity: Quantity,
    /// How strongly demand responds to a change in price
    pub price_sensitivity: Dimensionless,
}

/// Something which can resolve a product ID to a static product profile
pub trait ProductLookup {
    /// Look up a product, ignoring surrounding whitespace in `id`.
    ///
    /// Fails with a not-found [`PlanningError`] if there is no matching product.
    fn get_product(&self, id: &str) -> Result<&Product>;
}

impl ProductLookup for ProductMap {
    fn get_product(&self, id: &str) -> Result<&Product> {
        let id = id.trim();
        self.get(id)
            .ok_or_else(|| PlanningError::not_found(format!("Product not found: '{id}'")).into())
    }
}
