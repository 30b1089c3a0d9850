//! Common routines for handling input data.
use crate::model::{Model, ModelParameters};
use anyhow::{Context, Result, bail};
use indexmap::IndexMap;
use itertools::Itertools;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;

mod predictor;
use predictor::read_predictor;
mod product;
use product::read_products;
mod projection;
pub use projection::{ScenarioProjections, read_margins, read_projections};
mod scenario;
use scenario::read_scenarios;

/// The field delimiter used for CSV files other than the sales dataset
const DEFAULT_CSV_DELIMITER: u8 = b',';

/// A row of a CSV file, keyed by (lowercased) column name
pub type CsvRecord = IndexMap<String, String>;

/// Read a series of type `T`s from a CSV file.
///
/// Will raise an error if the file is empty.
///
/// # Arguments
///
/// * `file_path` - Path to the CSV file
pub fn read_csv<'a, T: DeserializeOwned + 'a>(
    file_path: &'a Path,
) -> Result<impl Iterator<Item = T> + 'a> {
    read_csv_with_delimiter(file_path, DEFAULT_CSV_DELIMITER)
}

/// Read a series of type `T`s from a CSV file with the given field delimiter.
///
/// Column names are trimmed and matched case-insensitively. Will raise an error if the file is
/// empty.
pub fn read_csv_with_delimiter<'a, T: DeserializeOwned + 'a>(
    file_path: &'a Path,
    delimiter: u8,
) -> Result<impl Iterator<Item = T> + 'a> {
    let vec = read_csv_internal(file_path, delimiter)?;
    if vec.is_empty() {
        bail!("CSV file {} cannot be empty", file_path.display());
    }

    Ok(vec.into_iter())
}

fn read_csv_internal<T: DeserializeOwned>(file_path: &Path, delimiter: u8) -> Result<Vec<T>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .trim(csv::Trim::All)
        .from_path(file_path)
        .with_context(|| input_err_msg(file_path))?;

    let headers: csv::StringRecord = reader
        .headers()
        .with_context(|| input_err_msg(file_path))?
        .iter()
        .map(|header| header.trim().to_lowercase())
        .collect();
    reader.set_headers(headers);

    let vec = reader
        .into_deserialize()
        .process_results(|iter| iter.collect_vec())
        .with_context(|| input_err_msg(file_path))?;

    Ok(vec)
}

/// Parse a TOML file at the specified path.
///
/// # Arguments
///
/// * `file_path` - Path to the TOML file
///
/// # Returns
///
/// * The deserialised TOML data or an error if the file could not be read or parsed.
pub fn read_toml<T: DeserializeOwned>(file_path: &Path) -> Result<T> {
    let toml_str = fs::read_to_string(file_path).with_context(|| input_err_msg(file_path))?;
    let toml_data = toml::from_str(&toml_str).with_context(|| input_err_msg(file_path))?;
    Ok(toml_data)
}

/// Format an error message to include the file path. To be used with `anyhow::Context`.
pub fn input_err_msg<P: AsRef<Path>>(file_path: P) -> String {
    format!("Error reading {}", file_path.as_ref().display())
}

/// Read a model from the specified directory.
///
/// # Arguments
///
/// * `model_dir` - Folder containing model configuration files
///
/// # Returns
///
/// The static product data, the trained predictor and the scenarios for the model, or an error if
/// any file is missing or invalid.
pub fn load_model<P: AsRef<Path>>(model_dir: P) -> Result<Model> {
    let model_dir = model_dir.as_ref();
    let parameters = ModelParameters::from_path(model_dir)?;
    let products = read_products(model_dir, parameters.csv_delimiter())?;
    parameters.check_opening_stock_products(model_dir, &products)?;
    let predictor = read_predictor(model_dir, &products)?;
    let scenarios = read_scenarios(model_dir)?;

    Ok(Model {
        model_path: model_dir.to_path_buf(),
        parameters,
        products,
        predictor,
        scenarios,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::assert_error;
    use serde::Deserialize;
    use std::fs::File;
    use std::io::Write;
    use std::path::PathBuf;
    use tempfile::tempdir;

    #[derive(Debug, PartialEq, Deserialize)]
    struct Record {
        id: String,
        value: u32,
    }

    /// Create an example CSV file in dir_path
    fn create_csv_file(dir_path: &Path, contents: &str) -> PathBuf {
        let file_path = dir_path.join("test.csv");
        let mut file = File::create(&file_path).unwrap();
        writeln!(file, "{contents}").unwrap();
        file_path
    }

    #[test]
    fn test_read_csv() {
        let dir = tempdir().unwrap();
        let file_path = create_csv_file(dir.path(), "id,value\nhello,1\nworld,2\n");
        let records: Vec<Record> = read_csv(&file_path).unwrap().collect();
        assert_eq!(
            records,
            &[
                Record {
                    id: "hello".to_string(),
                    value: 1,
                },
                Record {
                    id: "world".to_string(),
                    value: 2,
                }
            ]
        );

        // File with no data (only column headers)
        let file_path = create_csv_file(dir.path(), "id,value\n");
        assert!(read_csv::<Record>(&file_path).is_err());
    }

    #[test]
    fn test_read_csv_headers_case_insensitive() {
        let dir = tempdir().unwrap();
        let file_path = create_csv_file(dir.path(), " ID ; Value\n hello ;1\n");
        let records: Vec<Record> = read_csv_with_delimiter(&file_path, b';').unwrap().collect();
        assert_eq!(
            records,
            &[Record {
                id: "hello".to_string(),
                value: 1,
            }]
        );
    }

    #[test]
    fn test_read_csv_as_records() {
        let dir = tempdir().unwrap();
        let file_path = create_csv_file(dir.path(), "Product,Extra\nA,\nB,x\n");
        let records: Vec<CsvRecord> = read_csv(&file_path).unwrap().collect();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["product"], "A");
        assert_eq!(records[0]["extra"], "");
        assert_eq!(records[1]["extra"], "x");
    }

    #[test]
    fn test_read_toml() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("test.toml");
        {
            let mut file = File::create(&file_path).unwrap();
            writeln!(file, "value = 1").unwrap();
        }

        let table: toml::Table = read_toml(&file_path).unwrap();
        assert_eq!(table["value"], toml::Value::Integer(1));

        // Missing file
        let file_path = dir.path().join("missing.toml");
        assert_error!(
            read_toml::<toml::Table>(&file_path),
            input_err_msg(&file_path)
        );
    }
}
