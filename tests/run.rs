//! Integration tests for the `run` command.
use stockcast::cli::{RunOpts, handle_run_command};
use stockcast::input::read_projections;
use stockcast::settings::Settings;
use std::fs;
use std::path::PathBuf;
use tempfile::tempdir;

/// Get the path to the demo model.
fn get_model_dir() -> PathBuf {
    PathBuf::from("demos/simple")
}

/// Run the demo model and check that every results file is written.
#[test]
fn test_handle_run_command() {
    unsafe { std::env::set_var("STOCKCAST_LOG_LEVEL", "off") };

    let tempdir = tempdir().unwrap();
    // Use a directory which doesn't exist yet to check that it is created
    let output_dir = tempdir.path().join("results");
    let opts = RunOpts {
        output_dir: Some(output_dir.clone()),
        overwrite: false,
    };
    handle_run_command(&get_model_dir(), &opts, Some(Settings::default())).unwrap();

    for file_name in [
        "metadata.toml",
        "projections.csv",
        "purchase_plan.csv",
        "plan_summary.csv",
        "recommendations.csv",
        "stockcast_info.log",
        "stockcast_error.log",
    ] {
        assert!(output_dir.join(file_name).is_file(), "{file_name} missing");
    }

    // Each scenario has three months for each of the two products
    let projections = output_dir.join("projections.csv");
    for scenario in ["worst", "conservative", "best"] {
        let projected = read_projections(&projections, Some(scenario), None).unwrap();
        assert_eq!(projected.len(), 1);
        assert_eq!(projected[&Some(scenario.to_string())].len(), 6);
    }
    let projected = read_projections(&projections, Some("best"), Some("SKU-001")).unwrap();
    assert_eq!(
        projected[&Some("best".to_string())]
            .iter()
            .map(|m| m.month)
            .collect::<Vec<_>>(),
        [Some(1), Some(2), Some(3)]
    );

    let recommendations = fs::read_to_string(output_dir.join("recommendations.csv")).unwrap();
    assert!(recommendations.contains("BASELINE"));

    // The logger can only be initialised once
    assert_eq!(
        handle_run_command(
            &get_model_dir(),
            &RunOpts {
                output_dir: Some(tempdir.path().join("again")),
                overwrite: false,
            },
            Some(Settings::default())
        )
        .unwrap_err()
        .chain()
        .next()
        .unwrap()
        .to_string(),
        "Failed to initialise logging."
    );
}
