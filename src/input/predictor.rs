//! Code for reading the trained demand model.
use super::*;
use crate::error::PlanningError;
use crate::predictor::{DemandPredictor, LinearPredictor};
use crate::product::ProductMap;
use anyhow::{Context, Result};
use indexmap::IndexMap;
use log::{info, warn};
use serde::Deserialize;
use std::path::Path;
use std::time::{Duration, SystemTime};

const PREDICTOR_FILE_NAME: &str = "predictor.toml";

/// Must match the name of the dataset file read by the product reader
const DATASET_FILE_NAME: &str = "sales.csv";

/// Files copied together are not written at exactly the same time, so small differences in
/// modification time are ignored
const STALENESS_TOLERANCE: Duration = Duration::from_secs(10);

/// Represents the contents of the predictor file
#[derive(Debug, Deserialize, PartialEq)]
struct PredictorFile {
    intercept: f64,
    coefficients: IndexMap<String, f64>,
}

/// Read the trained demand model from the model directory.
///
/// The model must have been trained on the current dataset: if the dataset has been modified since
/// the predictor file was written, the predictor is treated as not yet prepared.
///
/// # Arguments
///
/// * `model_dir` - Folder containing model configuration files
/// * `products` - Products in the dataset
pub fn read_predictor(model_dir: &Path, products: &ProductMap) -> Result<LinearPredictor> {
    let file_path = model_dir.join(PREDICTOR_FILE_NAME);
    if !file_path.is_file() {
        Err(PlanningError::not_found(format!(
            "Predictor not yet prepared: {} is missing",
            file_path.display()
        )))?;
    }
    check_not_stale(&file_path, &model_dir.join(DATASET_FILE_NAME))?;

    let predictor_file: PredictorFile = read_toml(&file_path)?;
    let predictor = LinearPredictor::new(predictor_file.intercept, predictor_file.coefficients)
        .with_context(|| input_err_msg(&file_path))?;
    check_product_features(&predictor, products);
    info!(
        "Loaded predictor with {} features",
        predictor.feature_names().len()
    );

    Ok(predictor)
}

/// Check that the predictor was not written before the dataset was last modified
fn check_not_stale(predictor_path: &Path, dataset_path: &Path) -> Result<()> {
    let modified = |path: &Path| -> Result<SystemTime> {
        path.metadata()
            .and_then(|metadata| metadata.modified())
            .with_context(|| input_err_msg(path))
    };

    if modified(predictor_path)? + STALENESS_TOLERANCE < modified(dataset_path)? {
        Err(PlanningError::not_found(format!(
            "Predictor not yet prepared: {} is older than {}. Retrain the model on the current \
            dataset.",
            predictor_path.display(),
            dataset_path.display()
        )))?;
    }

    Ok(())
}

/// Warn about product indicator features which don't match the dataset
fn check_product_features(predictor: &LinearPredictor, products: &ProductMap) {
    let mut any_known = false;
    for product in predictor.iter_product_features() {
        if products.contains_key(product) {
            any_known = true;
        } else {
            warn!("Predictor has a feature for unknown product {product}");
        }
    }

    if !any_known && products.len() > 1 {
        warn!("Predictor has no features for any product in the dataset");
    }
}
