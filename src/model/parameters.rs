//! Defines the `ModelParameters` struct, which represents the contents of `model.toml`.
use crate::input::{input_err_msg, read_toml};
use crate::planning::SupplyRisk;
use crate::product::{ProductID, ProductMap};
use crate::units::Quantity;
use anyhow::{Context, Result, ensure};
use indexmap::IndexMap;
use log::warn;
use serde::Deserialize;
use std::path::Path;

const MODEL_PARAMETERS_FILE_NAME: &str = "model.toml";

fn default_csv_delimiter() -> char {
    ';'
}

/// Represents the contents of the entire model file.
#[derive(Debug, Deserialize, PartialEq)]
pub struct ModelParameters {
    /// Stock held of each product at the start of the first month
    #[serde(default)]
    pub opening_stock: Quantity,
    /// The state of the supply chain
    #[serde(default)]
    pub supply_risk: SupplyRisk,
    /// The field delimiter used in `sales.csv`
    #[serde(default = "default_csv_delimiter")]
    csv_delimiter: char,
    /// Opening stock for individual products, overriding `opening_stock`
    #[serde(default)]
    pub opening_stock_by_product: IndexMap<ProductID, Quantity>,
}

impl Default for ModelParameters {
    fn default() -> Self {
        Self {
            opening_stock: Quantity(0.0),
            supply_risk: SupplyRisk::default(),
            csv_delimiter: default_csv_delimiter(),
            opening_stock_by_product: IndexMap::new(),
        }
    }
}

/// Check that an opening stock value is valid
fn check_opening_stock(value: Quantity) -> Result<()> {
    ensure!(value.is_finite(), "opening_stock must be a finite number");
    if value < Quantity(0.0) {
        warn!("Opening stock is negative ({value}); treating it as an existing shortfall");
    }

    Ok(())
}

/// Check that the `csv_delimiter` parameter is valid
fn check_csv_delimiter(value: char) -> Result<()> {
    ensure!(
        value.is_ascii()
            && !value.is_ascii_alphanumeric()
            && !matches!(value, '"' | '\n' | '\r'),
        "csv_delimiter must be a single ASCII punctuation or whitespace character"
    );

    Ok(())
}

impl ModelParameters {
    /// Read a model file from the specified directory.
    ///
    /// # Arguments
    ///
    /// * `model_dir` - Folder containing model configuration files
    ///
    /// # Returns
    ///
    /// The model file contents as a [`ModelParameters`] struct or an error if the file is invalid
    pub fn from_path<P: AsRef<Path>>(model_dir: P) -> Result<ModelParameters> {
        let file_path = model_dir.as_ref().join(MODEL_PARAMETERS_FILE_NAME);
        let model_params: ModelParameters = read_toml(&file_path)?;

        model_params
            .validate()
            .with_context(|| input_err_msg(file_path))?;

        Ok(model_params)
    }

    /// The field delimiter for `sales.csv`, as a byte
    pub fn csv_delimiter(&self) -> u8 {
        // Only ASCII characters pass validation
        self.csv_delimiter as u8
    }

    /// Validate parameters after reading in file
    fn validate(&self) -> Result<()> {
        check_opening_stock(self.opening_stock)?;
        for (product_id, stock) in &self.opening_stock_by_product {
            check_opening_stock(*stock)
                .with_context(|| format!("Invalid opening stock for product {product_id}"))?;
        }
        check_csv_delimiter(self.csv_delimiter)?;

        Ok(())
    }

    /// Check that per-product opening stock only refers to known products
    pub fn check_opening_stock_products(
        &self,
        model_dir: &Path,
        products: &ProductMap,
    ) -> Result<()> {
        for product_id in self.opening_stock_by_product.keys() {
            ensure!(
                products.contains_key(product_id),
                "{}: opening stock given for unknown product {product_id}",
                input_err_msg(model_dir.join(MODEL_PARAMETERS_FILE_NAME))
            );
        }

        Ok(())
    }
}
