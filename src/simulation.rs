//! Functionality for simulating demand, revenue and margin for a scenario.
use crate::comparison::compare_scenarios;
use crate::error::PlanningError;
use crate::model::Model;
use crate::output::DataWriter;
use crate::planning::{PlanSummary, plan_purchases};
use crate::predictor::{DemandPredictor, FeatureVector};
use crate::product::{ProductID, ProductLookup};
use crate::scenario::{ScenarioKind, ScenarioMonth};
use crate::units::{Dimensionless, Money, MoneyPerUnit, Quantity};
use anyhow::{Context, Result};
use indexmap::IndexMap;
use itertools::Itertools;
use log::{debug, info, warn};
use std::path::Path;

pub mod profile;
use profile::MergedProfile;

/// The simulated outcome for one month of a scenario.
///
/// This is also the input to the purchase planner, so it carries the static values the planner
/// needs.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectedMonth {
    /// Month of the year
    pub month: Option<u32>,
    /// The product
    pub product: ProductID,
    /// Change in sale price, in percent
    pub price_change_pct: f64,
    /// Growth in demand independent of price, in percent
    pub organic_growth_pct: f64,
    /// Fair indicator passed through from the scenario
    pub fair: f64,
    /// Climate indicator passed through from the scenario
    pub climate: f64,
    /// The model's prediction, truncated to a whole non-negative number of units
    pub base_quantity: Quantity,
    /// Demand after the price and growth adjustments
    pub final_quantity: Quantity,
    /// Projected revenue (to 2 decimal places)
    pub revenue: Money,
    /// Projected margin (to 2 decimal places)
    pub margin: Money,
    /// Supplier lead time
    pub lead_time_days: u32,
    /// Minimum order quantity
    pub min_order_quantity: Quantity,
    /// Cost of buying one unit
    pub purchase_cost: MoneyPerUnit,
    /// Further values supplied for the month
    pub context: IndexMap<String, String>,
}

/// Run the model: simulate every scenario, plan purchases for each scenario and product, then
/// compare the scenarios.
///
/// # Arguments
///
/// * `model` - The model to run
/// * `output_path` - The folder to which output files will be written
pub fn run(model: &Model, output_path: &Path) -> Result<()> {
    let mut writer = DataWriter::create(output_path, &model.model_path)?;
    let supply_risk = model.parameters.supply_risk;
    info!("Supply risk: {supply_risk}");

    let mut projections = IndexMap::new();
    for (&kind, months) in &model.scenarios {
        info!("Simulating {kind} scenario ({} months)", months.len());
        let projected = simulate_scenario(months, &model.products, &model.predictor)
            .with_context(|| format!("Failed to simulate {kind} scenario"))?;
        writer.write_projections(kind, &projected)?;

        for (product_id, product_months) in group_by_product(&projected) {
            let plan = plan_purchases(
                &product_months,
                model.opening_stock(product_id),
                supply_risk,
            )
            .with_context(|| format!("Failed to plan purchases for {kind} scenario"))?;
            writer.write_purchase_plan(kind, &plan)?;

            if let Some(summary) = PlanSummary::from_plan(&plan) {
                info!(
                    "{kind} scenario, product {product_id}: demand {}, purchases {}, closing \
                    stock {}",
                    summary.total_demand,
                    summary.total_purchases,
                    summary.final_stock
                );
                writer.write_plan_summary(kind, product_id, &summary)?;
            }
        }

        projections.insert(kind, projected);
    }

    if let (Some(worst), Some(conservative), Some(best)) = (
        projections.get(&ScenarioKind::Worst),
        projections.get(&ScenarioKind::Conservative),
        projections.get(&ScenarioKind::Best),
    ) {
        let comparison = compare_scenarios(worst, conservative, best);
        info!("Conservative scenario: {}", comparison.conservative);
        info!("Best scenario: {}", comparison.best);
        info!("Worst scenario: {}", comparison.worst);
        writer.write_recommendations(&comparison)?;
    } else {
        warn!("Scenarios are only compared when worst, conservative and best are all present");
    }

    writer.flush()?;

    Ok(())
}

/// Split projected months by product, keeping months in their original order.
pub fn group_by_product(months: &[ProjectedMonth]) -> IndexMap<&ProductID, Vec<ProjectedMonth>> {
    let mut by_product: IndexMap<&ProductID, Vec<ProjectedMonth>> = IndexMap::new();
    for month in months {
        by_product
            .entry(&month.product)
            .or_default()
            .push(month.clone());
    }

    by_product
}

/// Convert a raw model prediction into the base quantity.
///
/// The prediction is truncated towards zero and negative values become zero.
pub fn base_quantity(prediction: f64) -> Quantity {
    Quantity(prediction.trunc().max(0.0))
}

/// Apply the price elasticity and organic growth adjustments to a base quantity.
///
/// The result is rounded to a whole number of units, with halves rounded to the nearest even
/// number (so 4.5 becomes 4 and 5.5 becomes 6). It is not clamped here, so a large price change
/// combined with a high sensitivity can give a negative value.
pub fn adjust_quantity(
    base: Quantity,
    price_change_pct: f64,
    price_sensitivity: Dimensionless,
    organic_growth_pct: f64,
) -> Quantity {
    let price_impact = Dimensionless::from_percent(price_change_pct) * price_sensitivity;
    let with_price = base * (Dimensionless(1.0) + price_impact);
    let growth = Dimensionless(1.0) + Dimensionless::from_percent(organic_growth_pct);
    let with_growth = with_price * growth;

    Quantity(with_growth.value().round_ties_even())
}

/// Simulate every month of a scenario.
///
/// All months are predicted in a single batch. If any month fails, no results are returned.
///
/// # Arguments
///
/// * `months` - The scenario's months, in order
/// * `products` - Static product profiles
/// * `predictor` - The trained demand model
///
/// # Returns
///
/// One [`ProjectedMonth`] per input month, in the same order.
pub fn simulate_scenario<L, P>(
    months: &[ScenarioMonth],
    products: &L,
    predictor: &P,
) -> Result<Vec<ProjectedMonth>>
where
    L: ProductLookup + ?Sized,
    P: DemandPredictor + ?Sized,
{
    if months.is_empty() {
        Err(PlanningError::validation(
            "A scenario must contain at least one month",
        ))?;
    }

    let profiles: Vec<MergedProfile> = months
        .iter()
        .enumerate()
        .map(|(idx, month)| {
            if month.product_id.trim().is_empty() {
                Err(PlanningError::validation(format!(
                    "Missing product for scenario entry {}",
                    idx + 1
                )))?;
            }

            let product = products.get_product(&month.product_id)?;
            Ok::<_, anyhow::Error>(MergedProfile::new(product, month))
        })
        .try_collect()?;

    let feature_names = predictor.feature_names();
    let rows: Vec<FeatureVector> = profiles
        .iter()
        .map(|profile| profile.feature_vector(feature_names))
        .try_collect()?;

    let predictions = predictor.predict(&rows)?;
    if predictions.len() != rows.len() {
        Err(PlanningError::computation(format!(
            "Model returned {} predictions for {} months",
            predictions.len(),
            rows.len()
        )))?;
    }

    let projected = profiles
        .iter()
        .zip(predictions)
        .map(|(profile, prediction)| project_month(profile, prediction))
        .collect_vec();
    debug!("Simulated {} months", projected.len());

    Ok(projected)
}

/// Calculate demand, revenue and margin for a single month
fn project_month(profile: &MergedProfile, prediction: f64) -> ProjectedMonth {
    let month = profile.month;
    let base = base_quantity(prediction);
    let mut quantity = adjust_quantity(
        base,
        month.price_change_pct,
        profile.price_sensitivity,
        month.organic_growth_pct,
    );
    if quantity < Quantity(0.0) {
        warn!(
            "Adjusted demand for product {} in month {} is negative ({quantity}); using zero instead",
            profile.product_id,
            month.month.map_or_else(|| "N/A".to_string(), |m| m.to_string()),
        );
        quantity = Quantity(0.0);
    }

    let price_factor = Dimensionless(1.0) + Dimensionless::from_percent(month.price_change_pct);
    let final_price = profile.sale_price * price_factor;
    let revenue = quantity * final_price;
    let cost = quantity * profile.purchase_cost;
    let margin = revenue - cost;

    ProjectedMonth {
        month: month.month,
        product: profile.product_id.clone(),
        price_change_pct: month.price_change_pct,
        organic_growth_pct: month.organic_growth_pct,
        fair: month.fair,
        climate: month.climate,
        base_quantity: base,
        final_quantity: quantity,
        revenue: revenue.round_dp(2),
        margin: margin.round_dp(2),
        lead_time_days: profile.lead_time_days,
        min_order_quantity: profile.min_order_quantity,
        purchase_cost: profile.purchase_cost,
        context: month.context.clone(),
    }
}
