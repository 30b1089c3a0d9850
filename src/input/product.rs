//! Code for reading static product profiles from the sales dataset.
use super::*;
use crate::product::{Product, ProductID, ProductMap};
use crate::units::{Dimensionless, MoneyPerUnit, Quantity};
use anyhow::{Context, Result, ensure};
use indexmap::map::Entry;
use log::debug;
use serde::Deserialize;
use std::path::Path;

const SALES_FILE_NAME: &str = "sales.csv";

/// A row of the sales dataset. Columns not listed here (e.g. dates and quantities sold) are
/// ignored.
#[derive(Debug, Deserialize, PartialEq)]
struct SalesRow {
    product: String,
    sale_price: f64,
    purchase_cost: f64,
    lead_time_days: u32,
    min_order_quantity: f64,
    price_sensitivity: f64,
}

/// Read static product profiles from the sales dataset.
///
/// # Arguments
///
/// * `model_dir` - Folder containing model configuration files
/// * `delimiter` - The field delimiter for the dataset
///
/// # Returns
///
/// A map of products, in the order in which they first appear in the dataset.
pub fn read_products(model_dir: &Path, delimiter: u8) -> Result<ProductMap> {
    let file_path = model_dir.join(SALES_FILE_NAME);
    let sales_csv = read_csv_with_delimiter(&file_path, delimiter)?;
    read_products_from_iter(sales_csv).with_context(|| input_err_msg(&file_path))
}

fn read_products_from_iter<I>(iter: I) -> Result<ProductMap>
where
    I: Iterator<Item = SalesRow>,
{
    let mut products = ProductMap::new();
    for row in iter {
        let id = row.product.trim();
        ensure!(!id.is_empty(), "Product ID cannot be empty");

        // Profiles are static, so only the first row for each product is used
        if let Entry::Vacant(entry) = products.entry(ProductID::new(id)) {
            let product = product_from_row(entry.key().clone(), &row)?;
            entry.insert(product);
        }
    }
    debug!("Read {} products", products.len());

    Ok(products)
}

fn product_from_row(id: ProductID, row: &SalesRow) -> Result<Product> {
    ensure!(
        row.sale_price.is_finite() && row.sale_price >= 0.0,
        "sale_price for product {id} must be a finite non-negative number"
    );
    ensure!(
        row.purchase_cost.is_finite() && row.purchase_cost >= 0.0,
        "purchase_cost for product {id} must be a finite non-negative number"
    );
    ensure!(
        row.min_order_quantity.is_finite() && row.min_order_quantity > 0.0,
        "min_order_quantity for product {id} must be a finite number greater than zero"
    );
    ensure!(
        row.price_sensitivity.is_finite(),
        "price_sensitivity for product {id} must be a finite number"
    );

    Ok(Product {
        id,
        sale_price: MoneyPerUnit(row.sale_price),
        purchase_cost: MoneyPerUnit(row.purchase_cost),
        lead_time_days: row.lead_time_days,
        min_order_quantity: Quantity(row.min_order_quantity),
        price_sensitivity: Dimensionless(row.price_sensitivity),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::assert_error;
    use itertools::Itertools;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    fn row(product: &str, sale_price: f64, min_order_quantity: f64) -> SalesRow {
        SalesRow {
            product: product.into(),
            sale_price,
            purchase_cost: 6.0,
            lead_time_days: 30,
            min_order_quantity,
            price_sensitivity: 2.0,
        }
    }

    #[test]
    fn test_read_products_from_iter_first_row_wins() {
        let rows = [row("A", 10.0, 50.0), row(" B ", 20.0, 30.0), row("A", 99.0, 1.0)];
        let products = read_products_from_iter(rows.into_iter()).unwrap();
        assert_eq!(products.len(), 2);
        assert_eq!(products["A"].sale_price, MoneyPerUnit(10.0));
        assert_eq!(products["A"].min_order_quantity, Quantity(50.0));
        assert!(products.contains_key("B"));
    }

    #[test]
    fn test_read_products_from_iter_bad_values() {
        assert_error!(
            read_products_from_iter([row("  ", 10.0, 50.0)].into_iter()),
            "Product ID cannot be empty"
        );
        assert_error!(
            read_products_from_iter([row("A", 10.0, 0.0)].into_iter()),
            "min_order_quantity for product A must be a finite number greater than zero"
        );
        assert_error!(
            read_products_from_iter([row("A", -1.0, 50.0)].into_iter()),
            "sale_price for product A must be a finite non-negative number"
        );
    }

    #[test]
    fn test_read_products() {
        let dir = tempdir().unwrap();
        {
            let mut file = File::create(dir.path().join(SALES_FILE_NAME)).unwrap();
            writeln!(
                file,
                "DATE;PRODUCT;QUANTITY;SALE_PRICE;PURCHASE_COST;LEAD_TIME_DAYS;MIN_ORDER_QUANTITY;PRICE_SENSITIVITY
2024-01-15;A;120;10;6;30;50;2
2024-02-15;A;130;10;6;30;50;2
2024-01-15;B;80;20;15;45;30;1"
            )
            .unwrap();
        }

        let products = read_products(dir.path(), b';').unwrap();
        assert_eq!(
            products.keys().map(ToString::to_string).collect_vec(),
            ["A", "B"]
        );
        assert_eq!(products["B"].lead_time_days, 45);
        assert_eq!(products["B"].price_sensitivity, Dimensionless(1.0));
    }
}
