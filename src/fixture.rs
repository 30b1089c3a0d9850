//! Fixtures for tests

use crate::predictor::LinearPredictor;
use crate::product::{Product, ProductMap};
use crate::simulation::ProjectedMonth;
use crate::units::{Dimensionless, Money, MoneyPerUnit, Quantity};
use indexmap::{IndexMap, indexmap};
use rstest::fixture;

/// Assert that an error with the given message occurs
macro_rules! assert_error {
    ($result:expr, $msg:expr) => {
        assert_eq!(
            $result.unwrap_err().chain().next().unwrap().to_string(),
            $msg
        );
    };
}
pub(crate) use assert_error;

#[fixture]
pub fn product() -> Product {
    Product {
        id: "A".into(),
        sale_price: MoneyPerUnit(10.0),
        purchase_cost: MoneyPerUnit(6.0),
        lead_time_days: 30,
        min_order_quantity: Quantity(50.0),
        price_sensitivity: Dimensionless(2.0),
    }
}

#[fixture]
pub fn products(product: Product) -> ProductMap {
    let other = Product {
        id: "B".into(),
        sale_price: MoneyPerUnit(20.0),
        purchase_cost: MoneyPerUnit(15.0),
        lead_time_days: 45,
        min_order_quantity: Quantity(30.0),
        price_sensitivity: Dimensionless(1.0),
    };

    indexmap! {
        product.id.clone() => product,
        other.id.clone() => other,
    }
}

/// Predicts `100 + 10 * month`, plus 40 for product B
#[fixture]
pub fn predictor() -> LinearPredictor {
    LinearPredictor::new(
        100.0,
        indexmap! {
            "month".to_string() => 10.0,
            "product_B".to_string() => 40.0,
        },
    )
    .unwrap()
}

/// A projected month for product A with no demand
#[fixture]
pub fn projected_month() -> ProjectedMonth {
    ProjectedMonth {
        month: Some(1),
        product: "A".into(),
        price_change_pct: 0.0,
        organic_growth_pct: 0.0,
        fair: 0.0,
        climate: 0.0,
        base_quantity: Quantity(0.0),
        final_quantity: Quantity(0.0),
        revenue: Money(0.0),
        margin: Money(0.0),
        lead_time_days: 30,
        min_order_quantity: Quantity(50.0),
        purchase_cost: MoneyPerUnit(6.0),
        context: IndexMap::new(),
    }
}
