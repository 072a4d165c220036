//! Command-line interface: prediction form, evaluation and data report

mod interactive;
mod render;

use clap::{Args, Parser, Subcommand};
use colored::*;
use std::io::Write;
use std::path::PathBuf;
use std::time::Instant;

use crate::config::{AppConfig, DataSources};
use crate::data::input::{AGE, BODY_TEMP, DURATION, HEART_RATE, HEIGHT, WEIGHT};
use crate::data::{DataCache, ExerciseInput, FieldBounds, Gender};
use crate::error::CalorieError;
use crate::pipeline::PipelineContext;

pub use interactive::cmd_interactive;

// ─── Styling helpers ───────────────────────────────────────────────────────────

fn dim(s: &str) -> ColoredString    { s.truecolor(100, 100, 100) }
fn accent(s: &str) -> ColoredString { s.truecolor(255, 110, 90) }
fn muted(s: &str) -> ColoredString  { s.truecolor(140, 140, 140) }
fn ok(s: &str) -> ColoredString     { s.truecolor(100, 210, 120) }

fn step_run(msg: &str) {
    let _ = write_step(&mut std::io::stdout(), msg);
}

/// Write an unterminated progress line and flush it so it shows while the step runs
fn write_step(out: &mut impl Write, msg: &str) -> std::io::Result<()> {
    write!(out, "  {} {}... ", accent("›"), msg)?;
    out.flush()
}

fn step_done(detail: &str) {
    println!("{} {}", ok("done"), dim(detail));
}

fn section(title: &str) {
    println!();
    println!("  {}", title.white().bold());
    println!("  {}", dim(&"─".repeat(56)));
}

// ─── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "calorie-burn")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Predict calories burned during exercise with gradient-boosted trees")]
#[command(long_about = None)]
pub struct Cli {
    /// JSON configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Exercise table (CSV)
    #[arg(long, global = true)]
    pub exercise: Option<PathBuf>,

    /// Calories table (CSV), row-aligned with the exercise table
    #[arg(long, global = true)]
    pub calories: Option<PathBuf>,

    /// Train/test split seed
    #[arg(long, global = true)]
    pub seed: Option<u64>,

    /// Fraction of rows held out for evaluation
    #[arg(long, global = true)]
    pub test_fraction: Option<f64>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Estimate calories burned for one exercise session
    Predict(PredictArgs),

    /// Show R² and mean absolute error on the held-out split
    Evaluate {
        /// Print metrics as JSON
        #[arg(long)]
        json: bool,
    },

    /// Preview, describe and plot the merged dataset
    Describe(ReportArgs),

    /// Dataset report followed by model performance
    Report(ReportArgs),
}

/// Parser for a bounded form field
fn bounded(
    bounds: FieldBounds,
) -> impl Fn(&str) -> Result<f64, String> + Clone + Send + Sync + 'static {
    move |s: &str| {
        let value: f64 = s.parse().map_err(|_| format!("{s:?} is not a number"))?;
        if bounds.contains(value) {
            Ok(value)
        } else {
            Err(format!("must be within [{}, {}]", bounds.min, bounds.max))
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct PredictArgs {
    #[arg(long, value_enum, default_value_t = Gender::Male)]
    pub gender: Gender,

    /// Age in years [10, 80]
    #[arg(long, default_value_t = AGE.default, value_parser = bounded(AGE))]
    pub age: f64,

    /// Height in cm [100, 220]
    #[arg(long, default_value_t = HEIGHT.default, value_parser = bounded(HEIGHT))]
    pub height: f64,

    /// Weight in kg [30, 150]
    #[arg(long, default_value_t = WEIGHT.default, value_parser = bounded(WEIGHT))]
    pub weight: f64,

    /// Exercise duration in minutes [5, 180]
    #[arg(long, default_value_t = DURATION.default, value_parser = bounded(DURATION))]
    pub duration: f64,

    /// Heart rate in bpm [60, 200]
    #[arg(long, default_value_t = HEART_RATE.default, value_parser = bounded(HEART_RATE))]
    pub heart_rate: f64,

    /// Body temperature in °C [35, 42]
    #[arg(long, default_value_t = BODY_TEMP.default, value_parser = bounded(BODY_TEMP))]
    pub body_temp: f64,
}

impl From<&PredictArgs> for ExerciseInput {
    fn from(args: &PredictArgs) -> Self {
        Self {
            gender: args.gender,
            age: args.age,
            height: args.height,
            weight: args.weight,
            duration: args.duration,
            heart_rate: args.heart_rate,
            body_temp: args.body_temp,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct ReportArgs {
    /// Rows shown in the dataset preview
    #[arg(short, long, default_value = "5")]
    pub rows: usize,

    /// Histogram bins
    #[arg(long, default_value = "12")]
    pub bins: usize,
}

// ─── Session ───────────────────────────────────────────────────────────────────

/// Resolved configuration plus the per-process dataset cache
pub struct Session {
    pub config: AppConfig,
    pub cache: DataCache,
}

impl Session {
    pub fn from_cli(cli: &Cli) -> anyhow::Result<Self> {
        let mut config = match &cli.config {
            Some(path) => AppConfig::from_file(path)?,
            None => AppConfig::default(),
        };

        if cli.exercise.is_some() || cli.calories.is_some() {
            let defaults = config.data.clone();
            config = config.with_sources(DataSources::new(
                cli.exercise.clone().unwrap_or(defaults.exercise),
                cli.calories.clone().unwrap_or(defaults.calories),
            ));
        }
        if let Some(seed) = cli.seed {
            config = config.with_seed(seed);
        }
        if let Some(fraction) = cli.test_fraction {
            config = config.with_test_fraction(fraction);
        }
        config.validate()?;

        Ok(Self {
            config,
            cache: DataCache::default(),
        })
    }

    /// Load, split, train and evaluate, printing progress unless `quiet`
    pub fn build(&self, quiet: bool) -> anyhow::Result<PipelineContext> {
        if quiet {
            return Ok(PipelineContext::build(&self.config, &self.cache)?);
        }

        step_run("Loading data");
        let start = Instant::now();
        let dataset = self.cache.get_or_load(&self.config.data)?;
        step_done(&format!(
            "{} rows × {} cols in {:?}",
            dataset.len(),
            dataset.column_names().len(),
            start.elapsed()
        ));

        step_run("Training gradient-boosted trees");
        let start = Instant::now();
        let regressor = crate::training::XGBoostRegressor::new(self.config.model.clone());
        let context = PipelineContext::from_dataset(dataset, &self.config, regressor)?;
        step_done(&format!(
            "{} train / {} test rows in {:?}",
            context.split.train_indices.len(),
            context.split.test_indices.len(),
            start.elapsed()
        ));

        Ok(context)
    }
}

/// Pipeline stage named in a top-level error message
pub fn error_stage(err: &anyhow::Error) -> &'static str {
    err.downcast_ref::<CalorieError>()
        .map(CalorieError::stage)
        .unwrap_or("interface")
}

/// Print a top-level error with the stage it came from
pub fn report_error(err: &anyhow::Error) {
    eprintln!();
    eprintln!("  {} {}", format!("error ({}):", error_stage(err)).red().bold(), err);
    eprintln!();
}

// ─── Commands ──────────────────────────────────────────────────────────────────

pub fn run(cli: Cli) -> anyhow::Result<()> {
    let session = Session::from_cli(&cli)?;

    match &cli.command {
        Some(Commands::Predict(args)) => cmd_predict(&session, args),
        Some(Commands::Evaluate { json }) => cmd_evaluate(&session, *json),
        Some(Commands::Describe(args)) => cmd_describe(&session, args),
        Some(Commands::Report(args)) => cmd_report(&session, args),
        None => cmd_interactive(&session),
    }
}

pub fn cmd_predict(session: &Session, args: &PredictArgs) -> anyhow::Result<()> {
    section("Predict");
    let context = session.build(false)?;

    let input = ExerciseInput::from(args);
    let estimate = context.predict_input(&input)?;
    render::estimate(&input, estimate);
    Ok(())
}

pub fn cmd_evaluate(session: &Session, json: bool) -> anyhow::Result<()> {
    if json {
        let context = session.build(true)?;
        let json = serde_json::to_string_pretty(&context.metrics).map_err(CalorieError::from)?;
        println!("{json}");
        return Ok(());
    }

    section("Model Performance");
    let context = session.build(false)?;
    render::metrics(&context.metrics);
    Ok(())
}

pub fn cmd_describe(session: &Session, args: &ReportArgs) -> anyhow::Result<()> {
    section("Data");
    step_run("Loading data");
    let dataset = session.cache.get_or_load(&session.config.data)?;
    step_done(&format!("{} rows", dataset.len()));

    render::dataset_report(&dataset, args.rows, args.bins)?;
    Ok(())
}

pub fn cmd_report(session: &Session, args: &ReportArgs) -> anyhow::Result<()> {
    section("Report");
    let context = session.build(false)?;
    render::dataset_report(&context.dataset, args.rows, args.bins)?;

    section("Model Performance");
    render::metrics(&context.metrics);
    Ok(())
}
