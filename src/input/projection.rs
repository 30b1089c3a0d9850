//! Code for reading externally supplied projections, for planning and comparing scenarios without
//! running the simulation.
use super::*;
use crate::comparison::MarginRecord;
use crate::error::PlanningError;
use crate::simulation::ProjectedMonth;
use crate::units::{Money, MoneyPerUnit, Quantity};
use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::Deserialize;
use std::path::Path;

/// Lead time assumed for projections which don't specify one
const DEFAULT_LEAD_TIME_DAYS: u32 = 60;

/// Minimum order quantity assumed for projections which don't specify one
const DEFAULT_MIN_ORDER_QUANTITY: Quantity = Quantity(100.0);

/// A row of a projections file. Only the product is required.
#[derive(Debug, Deserialize, PartialEq)]
struct ProjectionRaw {
    scenario: Option<String>,
    product: String,
    month: Option<u32>,
    price_change_pct: Option<f64>,
    organic_growth_pct: Option<f64>,
    fair: Option<f64>,
    climate: Option<f64>,
    base_quantity: Option<f64>,
    final_quantity: Option<f64>,
    revenue: Option<f64>,
    margin: Option<f64>,
    lead_time_days: Option<u32>,
    min_order_quantity: Option<f64>,
    purchase_cost: Option<f64>,
}

/// Projected months grouped by the scenario they belong to, in order of first appearance.
///
/// Rows which don't name a scenario are grouped under `None`.
pub type ScenarioProjections = IndexMap<Option<String>, Vec<ProjectedMonth>>;

/// Read projected months from a CSV file.
///
/// The file has the same columns as the projections written by the `run` command. Only `product`
/// is required: missing planning values take their defaults. Months are kept apart by scenario so
/// that each scenario can be planned on its own.
///
/// # Arguments
///
/// * `file_path` - Path to the CSV file
/// * `scenario` - Only read rows for this scenario (rows with no scenario are always read)
/// * `product` - Only read rows for this product
pub fn read_projections(
    file_path: &Path,
    scenario: Option<&str>,
    product: Option<&str>,
) -> Result<ScenarioProjections> {
    let projections_csv = read_csv(file_path)?;
    read_projections_from_iter(projections_csv, scenario, product)
        .with_context(|| input_err_msg(file_path))
}

fn read_projections_from_iter<I>(
    iter: I,
    scenario: Option<&str>,
    product: Option<&str>,
) -> Result<ScenarioProjections>
where
    I: Iterator<Item = ProjectionRaw>,
{
    let mut months = ScenarioProjections::new();
    for (idx, raw) in iter.enumerate() {
        if let (Some(wanted), Some(found)) = (scenario, raw.scenario.as_deref())
            && wanted != found.trim()
        {
            continue;
        }

        let product_id = raw.product.trim();
        if product_id.is_empty() {
            Err(PlanningError::validation(format!(
                "Missing product for projection entry {}",
                idx + 1
            )))?;
        }
        if product.is_some_and(|wanted| wanted.trim() != product_id) {
            continue;
        }

        let scenario_name = raw
            .scenario
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string);
        months.entry(scenario_name).or_default().push(ProjectedMonth {
            month: raw.month,
            product: product_id.into(),
            price_change_pct: raw.price_change_pct.unwrap_or_default(),
            organic_growth_pct: raw.organic_growth_pct.unwrap_or_default(),
            fair: raw.fair.unwrap_or_default(),
            climate: raw.climate.unwrap_or_default(),
            base_quantity: Quantity(raw.base_quantity.unwrap_or_default()),
            final_quantity: Quantity(raw.final_quantity.unwrap_or_default()),
            revenue: Money(raw.revenue.unwrap_or_default()),
            margin: Money(raw.margin.unwrap_or_default()),
            lead_time_days: raw.lead_time_days.unwrap_or(DEFAULT_LEAD_TIME_DAYS),
            min_order_quantity: raw
                .min_order_quantity
                .map_or(DEFAULT_MIN_ORDER_QUANTITY, Quantity),
            purchase_cost: MoneyPerUnit(raw.purchase_cost.unwrap_or_default()),
            context: IndexMap::new(),
        });
    }

    if months.is_empty() {
        Err(PlanningError::validation("No projected months to plan for"))?;
    }

    Ok(months)
}

/// Read the margins of a scenario's months from a CSV file. Missing margins count as zero.
pub fn read_margins(file_path: &Path) -> Result<Vec<MarginRecord>> {
    Ok(read_csv(file_path)?.collect())
}
