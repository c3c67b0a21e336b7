//! Command-line front end for the offline job and single predictions.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use obesity_ml::persist::SERVING_BUNDLE_FILE;
use obesity_ml::{
    CarePlan, InferenceService, ObesityClass, PatientInput, Pipeline, PipelineConfig, PredictError, Verbosity,
};

#[derive(Debug, Parser)]
#[command(
    name = "obesity",
    version,
    about = "Train the obesity category ensemble and predict from six inputs"
)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace). RUST_LOG takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Clean, encode, split and scale the dataset, then write the report
    Preprocess(JobArgs),

    /// Run the full training job and save every artifact
    Train(JobArgs),

    /// Predict the obesity category for one person
    Predict(PredictArgs),

    /// Print the nutrition and exercise plan for a category
    Plan {
        /// Category key, e.g. Obesity_Type_I
        class: String,
    },
}

#[derive(Debug, Args)]
struct JobArgs {
    /// Raw CSV dataset
    #[arg(long, value_name = "FILE", default_value = "data/ObesityDataSet.csv")]
    data: PathBuf,

    /// Directory for model artifacts
    #[arg(long, value_name = "DIR", default_value = "models")]
    model_dir: PathBuf,

    /// Directory for JSON reports
    #[arg(long, value_name = "DIR", default_value = "outputs")]
    output_dir: PathBuf,

    /// Fraction of rows held out for evaluation
    #[arg(long, default_value_t = 0.2)]
    test_size: f64,

    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Worker threads (0 = all cores)
    #[arg(long, default_value_t = 0)]
    threads: usize,
}

#[derive(Debug, Args)]
struct PredictArgs {
    #[arg(long)]
    age: u32,

    /// As recorded in the dataset: Female or Male
    #[arg(long)]
    gender: String,

    #[arg(long, value_name = "CM")]
    height: f64,

    #[arg(long, value_name = "KG")]
    weight: f64,

    /// Sedentary, Light, Moderate, Active or Very Active
    #[arg(long, default_value = "Moderate")]
    activity: String,

    /// Yes or No
    #[arg(long, default_value = "No")]
    family_history: String,

    /// Directory holding the serving bundle
    #[arg(long, value_name = "DIR", default_value = "models")]
    model_dir: PathBuf,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(format!("obesity_ml={level},warn")));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();
}

impl JobArgs {
    fn into_config(self, verbose: u8) -> Result<PipelineConfig, Box<dyn std::error::Error>> {
        let verbosity = if verbose > 0 { Verbosity::Debug } else { Verbosity::Info };
        let config = PipelineConfig::builder()
            .data_path(self.data)
            .model_dir(self.model_dir)
            .output_dir(self.output_dir)
            .test_size(self.test_size)
            .seed(self.seed)
            .n_threads(self.threads)
            .verbosity(verbosity)
            .build()?;
        Ok(config)
    }
}

fn print_json(value: &impl serde::Serialize) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Command::Preprocess(args) => {
            let pipeline = Pipeline::new(args.into_config(cli.verbose)?);
            let (prepared, path) = pipeline.run_preprocess()?;
            print_json(&prepared.report)?;
            tracing::info!(path = %path.display(), "preprocessing report written");
        }
        Command::Train(args) => {
            let summary = Pipeline::new(args.into_config(cli.verbose)?).run()?;
            print_json(&summary.stats)?;
        }
        Command::Predict(args) => {
            let service = InferenceService::load(args.model_dir.join(SERVING_BUNDLE_FILE))?;
            let input = PatientInput::new(
                args.age,
                args.gender,
                args.height,
                args.weight,
                args.activity,
                args.family_history,
            );
            let prediction = service.predict(&input)?;
            let plan = CarePlan::lookup(&prediction.class_label);
            print_json(&serde_json::json!({
                "prediction": prediction,
                "nutrition_plan": plan.nutrition,
                "exercise_plan": plan.exercise,
            }))?;
        }
        Command::Plan { class } => {
            if class.parse::<ObesityClass>().is_err() {
                tracing::warn!(%class, "unknown category, showing Normal_Weight plans");
            }
            print_json(&CarePlan::lookup(&class))?;
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if let Some(PredictError::MissingModel(_)) = err.downcast_ref::<PredictError>() {
                eprintln!("{err}");
            } else {
                tracing::error!("{err}");
            }
            ExitCode::FAILURE
        }
    }
}
