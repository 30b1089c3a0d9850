//! Integration tests for the `demo run` command.
use stockcast::cli::RunOpts;
use stockcast::cli::demo::handle_demo_run_command;
use stockcast::settings::Settings;
use tempfile::tempdir;

/// Extract the bundled demo to a temporary folder and run it
#[test]
fn test_handle_demo_run_command() {
    unsafe { std::env::set_var("STOCKCAST_LOG_LEVEL", "off") };

    let dir = tempdir().unwrap();
    let opts = RunOpts {
        output_dir: Some(dir.path().to_path_buf()),
        overwrite: false,
    };
    handle_demo_run_command("simple", &opts, Some(Settings::default())).unwrap();

    assert!(dir.path().join("purchase_plan.csv").is_file());
    assert!(dir.path().join("recommendations.csv").is_file());
}
