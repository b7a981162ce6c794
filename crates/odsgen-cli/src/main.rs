mod atomic;
mod logging;
mod settings;
mod size;

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};
use odsgen_core::{Dataset, Error as CoreError, TableSchema, load_table_schema, table_json_schema};
use odsgen_eval::{AuditEngine, AuditOptions, EvalError};
use odsgen_generate::{GenerateOptions, GenerationEngine, GenerationError, LocaleKey, TargetSize};
use odsgen_pipeline::{PipelineDefinition, PipelineError, PipelineRunner};
use thiserror::Error;
use tracing::{error, info};

use atomic::write_json_atomic;
use logging::init_logging;
use settings::load_settings;
use size::SizePreset;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("schema error: {0}")]
    Core(#[from] CoreError),
    #[error("generation error: {0}")]
    Generation(#[from] GenerationError),
    #[error("audit error: {0}")]
    Eval(#[from] EvalError),
    #[error("pipeline error: {0}")]
    Pipeline(#[from] PipelineError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("logging error: {0}")]
    Logging(String),
    #[error("audit found {0} violation(s)")]
    AuditFailed(u64),
    #[error("pipeline run failed at task '{0}'")]
    PipelineFailed(String),
}

#[derive(Parser, Debug)]
#[command(
    name = "odsgen",
    version,
    about = "Synthetic ODS CSV generator and simulated ingestion pipeline"
)]
struct Cli {
    /// Config file (defaults to ./odsgen.toml when present).
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Also write JSON logs to this file.
    #[arg(long, global = true, value_name = "FILE")]
    log_file: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a CSV file of the given size.
    Generate(GenerateArgs),
    /// Check a generated CSV file against its schema.
    Audit(AuditArgs),
    /// Run the simulated ingestion pipeline.
    Pipeline(PipelineArgs),
    /// Print a built-in table schema or the schema file format.
    Schema(SchemaArgs),
}

#[derive(Args, Debug)]
struct GenerateArgs {
    /// Target size: 1 (1 GB), 5 (5 GB) or 5MB.
    #[arg(value_enum, ignore_case = true, value_name = "SIZE")]
    size: SizePreset,
    /// Built-in dataset to generate.
    #[arg(long, default_value = "employees", conflicts_with = "schema")]
    dataset: Dataset,
    /// Custom table schema (JSON or TOML).
    #[arg(long, value_name = "FILE")]
    schema: Option<PathBuf>,
    /// Output directory.
    #[arg(long, value_name = "DIR")]
    out_dir: Option<PathBuf>,
    /// Seed for reproducible output.
    #[arg(long)]
    seed: Option<u64>,
    /// Rows written between two size measurements.
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    batch_size: Option<u64>,
    /// Rows between two progress log lines.
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    progress_every: Option<u64>,
    /// Faker locale.
    #[arg(long, value_enum)]
    locale: Option<LocaleArg>,
    /// Do not write the JSON run report next to the CSV.
    #[arg(long, default_value_t = false)]
    no_report: bool,
    /// Override the preset size in bytes.
    #[arg(long, hide = true)]
    target_bytes: Option<u64>,
}

#[derive(Args, Debug)]
struct AuditArgs {
    /// CSV file to audit.
    file: PathBuf,
    /// Built-in dataset the file was generated from (guessed from the file
    /// name when omitted).
    #[arg(long, conflicts_with = "schema")]
    dataset: Option<Dataset>,
    /// Custom table schema (JSON or TOML).
    #[arg(long, value_name = "FILE")]
    schema: Option<PathBuf>,
    /// Write `<stem>.audit.json` and `<stem>.audit.md` here.
    #[arg(long, value_name = "DIR")]
    out_dir: Option<PathBuf>,
    /// Maximum sample violations kept in the report.
    #[arg(long, default_value_t = odsgen_eval::model::DEFAULT_MAX_SAMPLES)]
    max_samples: usize,
}

#[derive(Args, Debug)]
struct PipelineArgs {
    /// Print the pipeline documentation instead of running it.
    #[arg(long, default_value_t = false)]
    doc: bool,
    /// Print the run report as JSON.
    #[arg(long, default_value_t = false)]
    json: bool,
    /// Source object in the bucket.
    #[arg(long, value_name = "OBJECT")]
    gcs_object: Option<String>,
    /// Override the delay between task retries.
    #[arg(long, value_name = "SECONDS")]
    retry_delay_secs: Option<u64>,
}

#[derive(Args, Debug)]
struct SchemaArgs {
    /// Built-in dataset to print.
    #[arg(long, default_value = "employees", conflicts_with = "json_schema")]
    dataset: Dataset,
    /// Print the JSON Schema of table schema files instead.
    #[arg(long, default_value_t = false)]
    json_schema: bool,
    /// Output format for the table schema.
    #[arg(long, value_enum, default_value_t = SchemaFormat::Json)]
    format: SchemaFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum SchemaFormat {
    Json,
    Toml,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LocaleArg {
    #[value(name = "fr_FR")]
    FrFr,
    #[value(name = "en_US")]
    EnUs,
}

impl From<LocaleArg> for LocaleKey {
    fn from(value: LocaleArg) -> Self {
        match value {
            LocaleArg::FrFr => LocaleKey::FrFr,
            LocaleArg::EnUs => LocaleKey::EnUs,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(err) = init_logging(cli.log_file.as_deref()) {
        eprintln!("error: {err}");
        return ExitCode::FAILURE;
    }

    let config = cli.config.as_deref();
    let result = match cli.command {
        Command::Generate(args) => run_generate(args, config),
        Command::Audit(args) => run_audit(args),
        Command::Pipeline(args) => run_pipeline(args),
        Command::Schema(args) => run_schema(args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "command failed");
            ExitCode::FAILURE
        }
    }
}

fn run_generate(args: GenerateArgs, config: Option<&Path>) -> Result<(), CliError> {
    let settings = load_settings(config)?;

    let (schema, prefix) = match &args.schema {
        Some(path) => {
            let schema = load_table_schema(path)?;
            let prefix = schema.name.clone();
            (schema, prefix)
        }
        None => (args.dataset.schema(), args.dataset.file_prefix().to_string()),
    };

    let mut options = GenerateOptions::default();
    if let Some(batch_size) = args
        .batch_size
        .map(|value| value as usize)
        .or(settings.batch_size)
    {
        options.batch_size = batch_size;
    }
    if let Some(progress_every) = args.progress_every.or(settings.progress_every) {
        options.progress_every = progress_every;
    }
    options.seed = args.seed.or(settings.seed);
    if let Some(locale) = args.locale.map(LocaleKey::from).or(settings.locale) {
        options.locale = locale;
    }

    let out_dir = args.out_dir.unwrap_or_else(|| settings.out_dir());
    let path = out_dir.join(format!("{prefix}_{}.csv", args.size.file_token()));
    let target = args
        .target_bytes
        .map(TargetSize::bytes)
        .unwrap_or_else(|| args.size.target());

    info!(
        out_dir = %out_dir.display(),
        table = %schema.name,
        columns = schema.columns.len(),
        "output directory"
    );

    let result = GenerationEngine::new(options).run(&schema, &path, target)?;

    if !args.no_report {
        let report_path = report_path(&path);
        write_json_atomic(&report_path, &result.report)?;
        info!(path = %report_path.display(), "run report written");
    }

    println!("{}", result.path.display());
    Ok(())
}

fn run_audit(args: AuditArgs) -> Result<(), CliError> {
    let schema = audit_schema(&args)?;
    let options = AuditOptions {
        strict: false,
        max_samples: args.max_samples,
        out_dir: args.out_dir,
    };
    let result = AuditEngine::new(options).run(&schema, &args.file)?;

    println!("{}", odsgen_eval::render_report(&result.report));
    if result.report.is_clean() {
        Ok(())
    } else {
        Err(CliError::AuditFailed(result.report.violations_total))
    }
}

fn audit_schema(args: &AuditArgs) -> Result<TableSchema, CliError> {
    if let Some(path) = &args.schema {
        return Ok(load_table_schema(path)?);
    }
    let dataset = match args.dataset {
        Some(dataset) => dataset,
        None => guess_dataset(&args.file),
    };
    Ok(dataset.schema())
}

/// `contract_5mb.csv` → contracts, anything else → employees.
fn guess_dataset(file: &Path) -> Dataset {
    let stem = file
        .file_stem()
        .map(|stem| stem.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    Dataset::ALL
        .into_iter()
        .find(|dataset| stem.starts_with(dataset.file_prefix()))
        .unwrap_or(Dataset::Employees)
}

fn run_pipeline(args: PipelineArgs) -> Result<(), CliError> {
    let mut definition = PipelineDefinition::employees_ingestion();
    if let Some(object) = args.gcs_object {
        definition.params.gcs_object = object;
    }

    if args.doc {
        print!("{}", definition.render_doc());
        return Ok(());
    }

    let mut runner = PipelineRunner::new(definition);
    if let Some(secs) = args.retry_delay_secs {
        runner = runner.with_retry_delay(Duration::from_secs(secs));
    }
    let report = runner.run()?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }
    match report.failed_task() {
        Some(task) => Err(CliError::PipelineFailed(task.task_id.clone())),
        None => Ok(()),
    }
}

fn run_schema(args: SchemaArgs) -> Result<(), CliError> {
    if args.json_schema {
        println!("{}", serde_json::to_string_pretty(&table_json_schema())?);
        return Ok(());
    }

    let schema = args.dataset.schema();
    match args.format {
        SchemaFormat::Json => println!("{}", serde_json::to_string_pretty(&schema)?),
        SchemaFormat::Toml => {
            let encoded =
                toml::to_string_pretty(&schema).map_err(|err| CliError::Config(err.to_string()))?;
            print!("{encoded}");
        }
    }
    Ok(())
}

/// `data/employees_5mb.csv` → `data/employees_5mb.report.json`.
fn report_path(csv_path: &Path) -> PathBuf {
    let stem = csv_path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "odsgen".to_string());
    csv_path.with_file_name(format!("{stem}.report.json"))
}
