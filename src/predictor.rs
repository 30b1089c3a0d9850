//! The demand predictor: a trained model mapping a vector of named features to a quantity.
use crate::error::PlanningError;
use anyhow::{Result, ensure};
use indexmap::IndexMap;
use itertools::Itertools;

/// The prefix used for one-hot product indicator features (e.g. `product_SKU-001`)
pub const PRODUCT_FEATURE_PREFIX: &str = "product_";

/// A row of model inputs, positionally aligned with [`DemandPredictor::feature_names`]
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector(pub Vec<f64>);

impl FeatureVector {
    /// Build a feature vector by looking up the value of each named feature in turn
    pub fn from_names<'a, I, F>(names: I, mut value_of: F) -> Result<Self>
    where
        I: IntoIterator<Item = &'a str>,
        F: FnMut(&str) -> Result<f64>,
    {
        let values: Vec<f64> = names.into_iter().map(&mut value_of).try_collect()?;
        Ok(Self(values))
    }

    /// The number of features
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no features
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A trained model which predicts base demand.
///
/// Implementations must be immutable once trained so that a single predictor can serve several
/// simulations at once.
pub trait DemandPredictor: Send + Sync {
    /// The names of the features the model expects, in the order in which they appear in each
    /// [`FeatureVector`]
    fn feature_names(&self) -> &[String];

    /// Predict one quantity per row
    fn predict(&self, rows: &[FeatureVector]) -> Result<Vec<f64>>;
}

/// An ordinary least-squares linear model: `y = intercept + Σ coefficient_i × feature_i`
#[derive(Debug, Clone, PartialEq)]
pub struct LinearPredictor {
    intercept: f64,
    feature_names: Vec<String>,
    coefficients: Vec<f64>,
}

impl LinearPredictor {
    /// Create a new [`LinearPredictor`] from an intercept and named coefficients.
    ///
    /// The order of `coefficients` defines the order of the feature vector.
    pub fn new(intercept: f64, coefficients: IndexMap<String, f64>) -> Result<Self> {
        ensure!(intercept.is_finite(), "Intercept must be a finite number");
        ensure!(!coefficients.is_empty(), "Predictor has no features");

        let mut feature_names = Vec::with_capacity(coefficients.len());
        let mut values = Vec::with_capacity(coefficients.len());
        for (name, value) in coefficients {
            ensure!(!name.trim().is_empty(), "Feature names cannot be empty");
            ensure!(
                value.is_finite(),
                "Coefficient for feature {name} must be a finite number"
            );
            feature_names.push(name);
            values.push(value);
        }

        Ok(Self {
            intercept,
            feature_names,
            coefficients: values,
        })
    }

    /// The model's intercept term
    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    /// Iterate over the names of product indicator features this model knows about
    pub fn iter_product_features(&self) -> impl Iterator<Item = &str> {
        self.feature_names
            .iter()
            .filter_map(|name| name.strip_prefix(PRODUCT_FEATURE_PREFIX))
    }
}

impl DemandPredictor for LinearPredictor {
    fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    fn predict(&self, rows: &[FeatureVector]) -> Result<Vec<f64>> {
        rows.iter()
            .map(|row| {
                if row.len() != self.coefficients.len() {
                    Err(PlanningError::computation(format!(
                        "Feature vector has {} values but the model expects {}",
                        row.len(),
                        self.coefficients.len()
                    )))?;
                }

                let prediction = self.intercept
                    + row
                        .0
                        .iter()
                        .zip(&self.coefficients)
                        .map(|(x, coeff)| x * coeff)
                        .sum::<f64>();
                if !prediction.is_finite() {
                    Err(PlanningError::computation(
                        "Model produced a non-finite prediction",
                    ))?;
                }

                Ok(prediction)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ErrorKind, error_kind};
    use float_cmp::assert_approx_eq;
    use indexmap::indexmap;

    fn predictor() -> LinearPredictor {
        LinearPredictor::new(
            10.0,
            indexmap! {
                "sale_price".to_string() => -2.0,
                "month".to_string() => 3.0,
                "product_B".to_string() => 5.0,
            },
        )
        .unwrap()
    }

    #[test]
    fn test_new_invalid() {
        assert!(LinearPredictor::new(f64::NAN, indexmap! {"a".to_string() => 1.0}).is_err());
        assert!(LinearPredictor::new(0.0, IndexMap::new()).is_err());
        assert!(LinearPredictor::new(0.0, indexmap! {"a".to_string() => f64::INFINITY}).is_err());
        assert!(LinearPredictor::new(0.0, indexmap! {" ".to_string() => 1.0}).is_err());
    }

    #[test]
    fn test_predict() {
        let rows = [
            FeatureVector(vec![1.0, 2.0, 0.0]),
            FeatureVector(vec![1.0, 2.0, 1.0]),
        ];
        let predictions = predictor().predict(&rows).unwrap();
        assert_approx_eq!(f64, predictions[0], 14.0);
        assert_approx_eq!(f64, predictions[1], 19.0);
    }

    #[test]
    fn test_predict_wrong_length() {
        let err = predictor()
            .predict(&[FeatureVector(vec![1.0])])
            .unwrap_err();
        assert_eq!(error_kind(&err), Some(ErrorKind::Computation));
    }

    #[test]
    fn test_feature_vector_from_names() {
        let fv = FeatureVector::from_names(["a", "b"], |name| {
            Ok(if name == "a" { 1.0 } else { 0.0 })
        })
        .unwrap();
        assert_eq!(fv, FeatureVector(vec![1.0, 0.0]));
    }

    #[test]
    fn test_iter_product_features() {
        assert_eq!(
            predictor().iter_product_features().collect::<Vec<_>>(),
            ["B"]
        );
    }
}
