//! Code for reading scenarios from CSV files.
use super::*;
use crate::error::PlanningError;
use crate::scenario::{ProfileOverrides, ScenarioKind, ScenarioMap, ScenarioMonth};
use crate::units::{Dimensionless, MoneyPerUnit, Quantity};
use anyhow::{Context, Result};
use log::debug;
use std::path::Path;
use std::str::FromStr;
use strum::IntoEnumIterator;

/// The folder within the model directory which contains scenario files
const SCENARIOS_DIR_NAME: &str = "scenarios";

/// Read all the scenario files present in the model directory.
///
/// Each scenario is read from `scenarios/<kind>.csv` (e.g. `scenarios/worst.csv`). At least one
/// must be present.
pub fn read_scenarios(model_dir: &Path) -> Result<ScenarioMap> {
    let scenarios_dir = model_dir.join(SCENARIOS_DIR_NAME);
    let mut scenarios = ScenarioMap::new();
    for kind in ScenarioKind::iter() {
        let file_path = scenarios_dir.join(format!("{kind}.csv"));
        if !file_path.is_file() {
            continue;
        }

        let months = read_scenario_file(&file_path, kind)?;
        debug!("Read {} months for {kind} scenario", months.len());
        scenarios.insert(kind, months);
    }

    if scenarios.is_empty() {
        Err(PlanningError::validation(format!(
            "No scenario files found in {}",
            scenarios_dir.display()
        )))?;
    }

    Ok(scenarios)
}

/// Read the months of a single scenario
fn read_scenario_file(file_path: &Path, kind: ScenarioKind) -> Result<Vec<ScenarioMonth>> {
    let records: Vec<CsvRecord> = read_csv_internal(file_path, DEFAULT_CSV_DELIMITER)?;
    if records.is_empty() {
        let err = PlanningError::validation(format!(
            "The {kind} scenario must contain at least one month"
        ));
        return Err(anyhow::Error::new(err).context(input_err_msg(file_path)));
    }

    records
        .into_iter()
        .enumerate()
        .map(|(idx, record)| scenario_month_from_record(idx + 1, record))
        .collect::<Result<_>>()
        .with_context(|| input_err_msg(file_path))
}

/// Convert a CSV row into a [`ScenarioMonth`]. Entries are numbered from 1.
fn scenario_month_from_record(entry: usize, mut record: CsvRecord) -> Result<ScenarioMonth> {
    let product_id = record.shift_remove("product").unwrap_or_default();
    if product_id.trim().is_empty() {
        Err(PlanningError::validation(format!(
            "Missing product for scenario entry {entry}"
        )))?;
    }

    let mut take = |name: &str| -> Result<Option<f64>> {
        parse_optional(entry, name, record.shift_remove(name).as_deref())
    };
    let month = take("month")?.map(|m| parse_month(entry, m)).transpose()?;
    let price_change_pct = take("price_change_pct")?.unwrap_or_default();
    let organic_growth_pct = take("organic_growth_pct")?.unwrap_or_default();
    let fair = take("fair")?.unwrap_or_default();
    let climate = take("climate")?.unwrap_or_default();
    let overrides = ProfileOverrides {
        sale_price: take("sale_price")?.map(MoneyPerUnit),
        purchase_cost: take("purchase_cost")?.map(MoneyPerUnit),
        lead_time_days: take("lead_time_days")?
            .map(|days| parse_days(entry, days))
            .transpose()?,
        min_order_quantity: take("min_order_quantity")?.map(Quantity),
        price_sensitivity: take("price_sensitivity")?.map(Dimensionless),
    };

    Ok(ScenarioMonth {
        product_id,
        month,
        price_change_pct,
        organic_growth_pct,
        fair,
        climate,
        overrides,
        context: record,
    })
}

/// Parse an optional numeric field. Missing and blank values are `None`.
fn parse_optional(entry: usize, name: &str, raw: Option<&str>) -> Result<Option<f64>> {
    let Some(raw) = raw.map(str::trim).filter(|raw| !raw.is_empty()) else {
        return Ok(None);
    };

    match f64::from_str(raw) {
        Ok(value) if value.is_finite() => Ok(Some(value)),
        _ => Err(PlanningError::computation(format!(
            "Invalid value '{raw}' for {name} in scenario entry {entry}"
        ))
        .into()),
    }
}

fn parse_month(entry: usize, value: f64) -> Result<u32> {
    if value.fract() != 0.0 || !(1.0..=12.0).contains(&value) {
        Err(PlanningError::validation(format!(
            "Month must be a whole number between 1 and 12 in scenario entry {entry}"
        )))?;
    }

    Ok(value as u32)
}

fn parse_days(entry: usize, value: f64) -> Result<u32> {
    if value.fract() != 0.0 || value < 0.0 || value > f64::from(u32::MAX) {
        Err(PlanningError::validation(format!(
            "lead_time_days must be a whole number of days in scenario entry {entry}"
        )))?;
    }

    Ok(value as u32)
}
