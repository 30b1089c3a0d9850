//! The model represents the static input data provided by the user.
use crate::predictor::LinearPredictor;
use crate::product::{ProductID, ProductMap};
use crate::scenario::ScenarioMap;
use crate::units::Quantity;
use std::path::PathBuf;

pub mod parameters;
pub use parameters::ModelParameters;

/// Model definition
pub struct Model {
    /// Path to model folder
    pub model_path: PathBuf,
    /// Parameters from the model TOML file
    pub parameters: ModelParameters,
    /// Static product profiles, taken from the sales dataset
    pub products: ProductMap,
    /// The trained demand model
    pub predictor: LinearPredictor,
    /// The scenarios to simulate
    pub scenarios: ScenarioMap,
}

impl Model {
    /// The stock held of the given product at the start of the first month
    pub fn opening_stock(&self, product_id: &ProductID) -> Quantity {
        self.parameters
            .opening_stock_by_product
            .get(product_id)
            .copied()
            .unwrap_or(self.parameters.opening_stock)
    }
}
