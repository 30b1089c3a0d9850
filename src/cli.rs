//! The command line interface for stockcast.
use crate::comparison::compare_scenarios;
use crate::input::{load_model, read_margins, read_projections};
use crate::log;
use crate::output::{
    create_output_directory, get_output_dir, write_purchase_plan, write_recommendations,
};
use crate::planning::{PlanSummary, SupplyRisk, plan_purchases};
use crate::settings::Settings;
use crate::simulation::group_by_product;
use crate::units::Quantity;
use ::log::{info, warn};
use anyhow::{Context, Result};
use clap::{Args, CommandFactory, Parser, Subcommand};
use std::path::{Path, PathBuf};

pub mod demo;
use demo::DemoSubcommands;
pub mod settings;
use settings::SettingsSubcommands;

/// The command line interface for stockcast.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// The available commands.
    #[command(subcommand)]
    command: Option<Commands>,
    /// Flag to provide the CLI docs as markdown
    #[arg(long, hide = true)]
    markdown_help: bool,
}

/// Options for the run command
#[derive(Args, Default)]
pub struct RunOpts {
    /// Directory for output files
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,
    /// Whether to overwrite the output directory if it already exists
    #[arg(long)]
    pub overwrite: bool,
}

/// Options for the plan command
#[derive(Args)]
pub struct PlanOpts {
    /// Stock held at the start of the first month
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub opening_stock: f64,
    /// The state of the supply chain (normal or constrained, or 1 or 2)
    #[arg(long, default_value = "normal")]
    pub supply_risk: SupplyRisk,
    /// Only plan for months of this scenario
    #[arg(long)]
    pub scenario: Option<String>,
    /// Only plan for this product
    #[arg(long)]
    pub product: Option<String>,
    /// Write the plan to this CSV file
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// The available commands.
#[derive(Subcommand)]
enum Commands {
    /// Simulate every scenario of a model, plan purchases and compare scenarios.
    Run {
        /// Path to the model directory.
        model_dir: PathBuf,
        /// Other run options
        #[command(flatten)]
        opts: RunOpts,
    },
    /// Validate a model.
    Validate {
        /// The path to the model directory.
        model_dir: PathBuf,
    },
    /// Create a purchase plan from a projections CSV file.
    Plan {
        /// Path to the projections file.
        projections: PathBuf,
        /// Other plan options
        #[command(flatten)]
        opts: PlanOpts,
    },
    /// Compare the margins of three projections CSV files.
    Compare {
        /// Projections for the worst scenario.
        worst: PathBuf,
        /// Projections for the conservative scenario.
        conservative: PathBuf,
        /// Projections for the best scenario.
        best: PathBuf,
        /// Write the recommendations to this CSV file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Manage demo models.
    Demo {
        /// The available subcommands for managing demo models.
        #[command(subcommand)]
        subcommand: DemoSubcommands,
    },
    /// Manage settings file.
    Settings {
        /// The subcommands for managing the settings file.
        #[command(subcommand)]
        subcommand: SettingsSubcommands,
    },
}

impl Commands {
    /// Execute the supplied CLI command
    fn execute(self) -> Result<()> {
        match self {
            Self::Run { model_dir, opts } => handle_run_command(&model_dir, &opts, None),
            Self::Validate { model_dir } => handle_validate_command(&model_dir, None),
            Self::Plan { projections, opts } => handle_plan_command(&projections, &opts, None),
            Self::Compare {
                worst,
                conservative,
                best,
                output,
            } => handle_compare_command(
                &[&worst, &conservative, &best],
                output.as_deref(),
                None,
            ),
            Self::Demo { subcommand } => subcommand.execute(),
            Self::Settings { subcommand } => subcommand.execute(),
        }
    }
}

/// Parse CLI arguments and start stockcast
pub fn run_cli() -> Result<()> {
    let cli = Cli::parse();

    // Invoked as: `$ stockcast --markdown-help`
    if cli.markdown_help {
        clap_markdown::print_help_markdown::<Cli>();
        return Ok(());
    }

    let Some(command) = cli.command else {
        let help_str = Cli::command().render_long_help().to_string();
        println!("{help_str}");
        return Ok(());
    };

    command.execute()
}

/// Load program settings, if not provided
fn load_settings(settings: Option<Settings>) -> Result<Settings> {
    match settings {
        Some(settings) => Ok(settings),
        None => Settings::load().context("Failed to load settings."),
    }
}

/// Handle the `run` command.
pub fn handle_run_command(
    model_path: &Path,
    opts: &RunOpts,
    settings: Option<Settings>,
) -> Result<()> {
    let settings = load_settings(settings)?;

    // Get path to output folder
    let pathbuf: PathBuf;
    let output_path = if let Some(p) = opts.output_dir.as_deref() {
        p
    } else {
        pathbuf = get_output_dir(model_path)?;
        &pathbuf
    };

    let overwrite = create_output_directory(output_path, opts.overwrite || settings.overwrite)
        .with_context(|| {
            format!(
                "Failed to create output directory: {}",
                output_path.display()
            )
        })?;

    // Initialise program logger
    log::init(&settings.log_level, Some(output_path))
        .context("Failed to initialise logging.")?;

    // NB: We have to wait until the logger is initialised to display this warning
    if overwrite {
        warn!("Output folder will be overwritten");
    }

    let model = load_model(model_path).context("Failed to load model.")?;
    info!("Loaded model from {}", model_path.display());
    info!("Output folder: {}", output_path.display());

    crate::simulation::run(&model, output_path)?;
    info!("Simulation complete!");

    Ok(())
}

/// Handle the `validate` command.
pub fn handle_validate_command(model_path: &Path, settings: Option<Settings>) -> Result<()> {
    let settings = load_settings(settings)?;

    // We don't save log files when running the validate command
    log::init(&settings.log_level, None).context("Failed to initialise logging.")?;

    let model = load_model(model_path).context("Failed to validate model.")?;
    info!(
        "Model validation successful! {} products, {} scenarios",
        model.products.len(),
        model.scenarios.len()
    );

    Ok(())
}

/// Handle the `plan` command.
///
/// Each scenario and product in the projections file is planned separately, starting from the
/// same opening stock.
pub fn handle_plan_command(
    projections_path: &Path,
    opts: &PlanOpts,
    settings: Option<Settings>,
) -> Result<()> {
    let settings = load_settings(settings)?;
    log::init(&settings.log_level, None).context("Failed to initialise logging.")?;

    let projections = read_projections(
        projections_path,
        opts.scenario.as_deref(),
        opts.product.as_deref(),
    )?;

    let mut plan = Vec::new();
    for (scenario, months) in &projections {
        let scenario_label = scenario.as_deref().unwrap_or("unnamed");
        for (product_id, product_months) in group_by_product(months) {
            let product_plan =
                plan_purchases(&product_months, Quantity(opts.opening_stock), opts.supply_risk)
                    .with_context(|| {
                        format!(
                            "Failed to plan purchases for product {product_id} in \
                            {scenario_label} scenario"
                        )
                    })?;

            for entry in &product_plan {
                info!(
                    "{scenario_label} scenario, month {}, product {}: buy {} ({}), closing \
                    stock {}. {}",
                    entry.month_label(),
                    entry.product,
                    entry.purchase_quantity,
                    entry.lead_time_notice(),
                    entry.closing_stock,
                    entry.advice
                );
            }
            if let Some(summary) = PlanSummary::from_plan(&product_plan) {
                info!(
                    "{scenario_label} scenario, product {product_id}: total demand {}, total \
                    purchases {}, final stock {}",
                    summary.total_demand, summary.total_purchases, summary.final_stock
                );
            }
            plan.extend(
                product_plan
                    .into_iter()
                    .map(|entry| (scenario.as_deref(), entry)),
            );
        }
    }

    if let Some(output) = &opts.output {
        write_purchase_plan(
            output,
            plan.iter().map(|(scenario, entry)| (*scenario, entry)),
        )
        .with_context(|| format!("Failed to write plan to {}", output.display()))?;
        info!("Purchase plan written to {}", output.display());
    }

    Ok(())
}

/// Handle the `compare` command.
///
/// # Arguments
///
/// * `projection_paths` - Projections for the worst, conservative and best scenarios
/// * `output` - Optional CSV file to write the recommendations to
/// * `settings` - Program settings, loaded from file if `None`
pub fn handle_compare_command(
    projection_paths: &[&Path; 3],
    output: Option<&Path>,
    settings: Option<Settings>,
) -> Result<()> {
    let settings = load_settings(settings)?;
    log::init(&settings.log_level, None).context("Failed to initialise logging.")?;

    let [worst_path, conservative_path, best_path] = projection_paths;
    let comparison = compare_scenarios(
        &read_margins(worst_path)?,
        &read_margins(conservative_path)?,
        &read_margins(best_path)?,
    );
    info!("Conservative: {}", comparison.conservative);
    info!("Best: {}", comparison.best);
    info!("Worst: {}", comparison.worst);

    if let Some(output) = output {
        write_recommendations(output, &comparison)
            .with_context(|| format!("Failed to write recommendations to {}", output.display()))?;
        info!("Recommendations written to {}", output.display());
    }

    Ok(())
}
