//! The module responsible for writing output data to disk.
use crate::comparison::ScenarioComparison;
use crate::planning::{PlanSummary, PurchasePlanEntry};
use crate::product::ProductID;
use crate::scenario::ScenarioKind;
use crate::simulation::ProjectedMonth;
use crate::units::{Money, MoneyPerUnit, Quantity};
use anyhow::{Context, Result, ensure};
use serde::{Deserialize, Serialize};
use std::fs;
use std::fs::File;
use std::path::{Path, PathBuf};

pub mod metadata;
use metadata::write_metadata;

/// The root folder in which model-specific output folders will be created
const OUTPUT_DIRECTORY_ROOT: &str = "stockcast_results";

/// The output file name for projected demand, revenue and margin
const PROJECTIONS_FILE_NAME: &str = "projections.csv";

/// The output file name for purchase plans
const PURCHASE_PLAN_FILE_NAME: &str = "purchase_plan.csv";

/// The output file name for purchase plan totals
const PLAN_SUMMARY_FILE_NAME: &str = "plan_summary.csv";

/// The output file name for scenario recommendations
const RECOMMENDATIONS_FILE_NAME: &str = "recommendations.csv";

/// Get the default output directory for the model specified at `model_dir`
pub fn get_output_dir(model_dir: &Path) -> Result<PathBuf> {
    // Resolve "." and similar to a real folder name
    let model_dir = model_dir
        .canonicalize()
        .context("Could not resolve path to model")?;

    let model_name = model_dir
        .file_name()
        .context("Model cannot be in root folder")?
        .to_str()
        .context("Invalid chars in model dir name")?;

    // Construct path
    Ok([OUTPUT_DIRECTORY_ROOT, model_name].iter().collect())
}

/// Create a new output directory for the model, optionally overwriting existing data.
///
/// # Arguments
///
/// * `output_dir` - The output directory to create/overwrite
/// * `allow_overwrite` - Whether to delete and recreate the folder if it is non-empty
///
/// # Returns
///
/// True if the output dir contained existing data that was deleted, false if not, or an error.
pub fn create_output_directory(output_dir: &Path, allow_overwrite: bool) -> Result<bool> {
    // If the folder already exists, then delete it if the user has allowed it
    let mut overwrite = false;
    if let Ok(mut it) = fs::read_dir(output_dir) {
        if it.next().is_none() {
            // Folder exists and is empty: nothing to do
            return Ok(false);
        }

        ensure!(
            allow_overwrite,
            "Output folder already exists and is not empty. Please delete the folder or pass the \
            --overwrite command-line option."
        );

        fs::remove_dir_all(output_dir)?;
        overwrite = true;
    }

    // Try to create the directory, with parents
    fs::create_dir_all(output_dir)?;

    Ok(overwrite)
}

/// Represents a row of the projections CSV file
#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct ProjectionRow {
    scenario: ScenarioKind,
    month: Option<u32>,
    product: ProductID,
    price_change_pct: f64,
    organic_growth_pct: f64,
    base_quantity: Quantity,
    final_quantity: Quantity,
    revenue: Money,
    margin: Money,
    lead_time_days: u32,
    min_order_quantity: Quantity,
    purchase_cost: MoneyPerUnit,
}

impl ProjectionRow {
    fn new(scenario: ScenarioKind, month: &ProjectedMonth) -> Self {
        Self {
            scenario,
            month: month.month,
            product: month.product.clone(),
            price_change_pct: month.price_change_pct,
            organic_growth_pct: month.organic_growth_pct,
            base_quantity: month.base_quantity,
            final_quantity: month.final_quantity,
            revenue: month.revenue,
            margin: month.margin,
            lead_time_days: month.lead_time_days,
            min_order_quantity: month.min_order_quantity,
            purchase_cost: month.purchase_cost,
        }
    }
}

/// Represents a row of the purchase plan CSV file
#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct PurchasePlanRow {
    scenario: Option<String>,
    month: String,
    product: ProductID,
    demand: Quantity,
    opening_stock: Quantity,
    purchase_quantity: Quantity,
    purchase_cost: Money,
    closing_stock: Quantity,
    lead_time_notice: String,
    recommendation: String,
}

impl PurchasePlanRow {
    fn new(scenario: Option<&str>, entry: &PurchasePlanEntry) -> Self {
        Self {
            scenario: scenario.map(str::to_string),
            month: entry.month_label(),
            product: entry.product.clone(),
            demand: entry.demand,
            opening_stock: entry.opening_stock,
            purchase_quantity: entry.purchase_quantity,
            purchase_cost: entry.purchase_cost,
            closing_stock: entry.closing_stock,
            lead_time_notice: entry.lead_time_notice(),
            recommendation: entry.advice.to_string(),
        }
    }
}

/// Represents a row of the plan summary CSV file
#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct PlanSummaryRow {
    scenario: ScenarioKind,
    product: ProductID,
    total_demand: Quantity,
    total_purchases: Quantity,
    total_purchase_cost: Money,
    final_stock: Quantity,
    stockout_months: usize,
}

/// Represents a row of the recommendations CSV file
#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct RecommendationRow {
    scenario: ScenarioKind,
    total_margin: Money,
    recommendation: String,
}

/// Write purchase plan entries, each labelled with its scenario (if any), to a standalone CSV file
pub fn write_purchase_plan<'a, I>(file_path: &Path, entries: I) -> Result<()>
where
    I: IntoIterator<Item = (Option<&'a str>, &'a PurchasePlanEntry)>,
{
    let mut writer = csv::Writer::from_path(file_path)?;
    for (scenario, entry) in entries {
        writer.serialize(PurchasePlanRow::new(scenario, entry))?;
    }
    writer.flush()?;

    Ok(())
}

/// One row per scenario, worst first
fn recommendation_rows(comparison: &ScenarioComparison) -> [RecommendationRow; 3] {
    [
        RecommendationRow {
            scenario: ScenarioKind::Worst,
            total_margin: comparison.worst_margin,
            recommendation: comparison.worst.to_string(),
        },
        RecommendationRow {
            scenario: ScenarioKind::Conservative,
            total_margin: comparison.conservative.total_margin,
            recommendation: comparison.conservative.to_string(),
        },
        RecommendationRow {
            scenario: ScenarioKind::Best,
            total_margin: comparison.best_margin,
            recommendation: comparison.best.to_string(),
        },
    ]
}

/// Write the recommendation for each scenario to a standalone CSV file
pub fn write_recommendations(file_path: &Path, comparison: &ScenarioComparison) -> Result<()> {
    let mut writer = csv::Writer::from_path(file_path)?;
    for row in recommendation_rows(comparison) {
        writer.serialize(row)?;
    }
    writer.flush()?;

    Ok(())
}

/// An object for writing the results of a model run to file
pub struct DataWriter {
    projections_writer: csv::Writer<File>,
    plan_writer: csv::Writer<File>,
    summary_writer: csv::Writer<File>,
    recommendations_writer: csv::Writer<File>,
}

impl DataWriter {
    /// Open CSV files to write output data to
    ///
    /// # Arguments
    ///
    /// * `output_path` - Folder where files will be saved
    /// * `model_path` - Path to the model being run, which is recorded in the metadata
    pub fn create(output_path: &Path, model_path: &Path) -> Result<Self> {
        write_metadata(output_path, model_path).context("Failed to save metadata")?;

        let new_writer = |file_name| {
            let file_path = output_path.join(file_name);
            csv::Writer::from_path(file_path)
        };

        Ok(Self {
            projections_writer: new_writer(PROJECTIONS_FILE_NAME)?,
            plan_writer: new_writer(PURCHASE_PLAN_FILE_NAME)?,
            summary_writer: new_writer(PLAN_SUMMARY_FILE_NAME)?,
            recommendations_writer: new_writer(RECOMMENDATIONS_FILE_NAME)?,
        })
    }

    /// Write a scenario's projected months to a CSV file
    pub fn write_projections(
        &mut self,
        scenario: ScenarioKind,
        months: &[ProjectedMonth],
    ) -> Result<()> {
        for month in months {
            self.projections_writer
                .serialize(ProjectionRow::new(scenario, month))?;
        }

        Ok(())
    }

    /// Write a purchase plan for one scenario and product to a CSV file
    pub fn write_purchase_plan(
        &mut self,
        scenario: ScenarioKind,
        plan: &[PurchasePlanEntry],
    ) -> Result<()> {
        let label = scenario.to_string();
        for entry in plan {
            self.plan_writer
                .serialize(PurchasePlanRow::new(Some(&label), entry))?;
        }

        Ok(())
    }

    /// Write the totals of a purchase plan to a CSV file
    pub fn write_plan_summary(
        &mut self,
        scenario: ScenarioKind,
        product: &ProductID,
        summary: &PlanSummary,
    ) -> Result<()> {
        let row = PlanSummaryRow {
            scenario,
            product: product.clone(),
            total_demand: summary.total_demand,
            total_purchases: summary.total_purchases,
            total_purchase_cost: summary.total_purchase_cost,
            final_stock: summary.final_stock,
            stockout_months: summary.stockout_months,
        };
        self.summary_writer.serialize(row)?;

        Ok(())
    }

    /// Write the recommendation for each scenario to a CSV file
    pub fn write_recommendations(&mut self, comparison: &ScenarioComparison) -> Result<()> {
        for row in recommendation_rows(comparison) {
            self.recommendations_writer.serialize(row)?;
        }

        Ok(())
    }

    /// Flush the underlying streams
    pub fn flush(&mut self) -> Result<()> {
        self.projections_writer.flush()?;
        self.plan_writer.flush()?;
        self.summary_writer.flush()?;
        self.recommendations_writer.flush()?;

        Ok(())
    }
}
