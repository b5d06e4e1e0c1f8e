mod config;
mod logging;

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use schemars::schema_for;
use thiserror::Error;

use config::SampleConfig;
use fieldfuzz_core::{Error as CoreError, FieldType, FieldValue, RecordType};
use fieldfuzz_generate::generators::{Constant, FloatRange, IntRange, from_fn};
use fieldfuzz_generate::{
    ApplyFailure, ConfigOp, FuzzError, GeneratorError, ProduceFailure, Session,
};
use logging::init_logging;

#[derive(Debug, Error)]
enum CliError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("core error: {0}")]
    Core(#[from] CoreError),
    #[error("{0}")]
    Fuzz(#[from] FuzzError),
    #[error("{0}")]
    Apply(#[from] ApplyFailure),
    #[error("{0}")]
    Produce(#[from] ProduceFailure),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("logging error: {0}")]
    Logging(String),
}

#[derive(Parser, Debug)]
#[command(name = "fieldfuzz", version, about = "Random record values from a record shape")]
struct Cli {
    /// Emit logs as JSON on stderr.
    #[arg(long, global = true, default_value_t = false)]
    log_json: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Produce records and print them as JSON lines.
    Sample(SampleArgs),
    /// Print the JSON schema of the record shape file format.
    ShapeSchema,
}

#[derive(Args, Debug)]
struct SampleArgs {
    /// Record shape file (.toml or .json).
    #[arg(long, value_name = "FILE")]
    record: PathBuf,
    /// Sampling configuration (TOML).
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Seed for the random source; a random seed is logged when omitted.
    #[arg(long)]
    seed: Option<u64>,
    /// Number of records to produce.
    #[arg(long)]
    count: Option<usize>,
    /// Size hint passed to generators.
    #[arg(long)]
    size: Option<usize>,
    /// Leave unbound fields at their zero value.
    #[arg(long, default_value_t = false)]
    zero_fallthrough: bool,
    /// Bind a field to a constant, as `field=<json>`.
    #[arg(long = "bind", value_name = "FIELD=JSON")]
    bindings: Vec<String>,
    /// Bind a numeric field to an inclusive range, as `field=min..max`.
    #[arg(long = "range", value_name = "FIELD=MIN..MAX")]
    ranges: Vec<String>,
}

fn main() -> Result<(), CliError> {
    let cli = Cli::parse();
    init_logging(cli.log_json)?;

    match cli.command {
        Command::Sample(args) => run_sample(args),
        Command::ShapeSchema => {
            let schema = schema_for!(RecordType);
            println!("{}", serde_json::to_string_pretty(&schema)?);
            Ok(())
        }
    }
}

fn run_sample(args: SampleArgs) -> Result<(), CliError> {
    let record = load_record(&args.record)?;
    let config = merge_config(&args)?;

    let ty = FieldType::Record(record);
    let mut session = Session::with_options(Some(&ty), &config.session_options())?;
    let ops = build_ops(&session, &config)?;
    session.apply(ops)?;

    let seed = config.seed.unwrap_or_else(rand::random);
    tracing::info!(
        event = "sample_started",
        record = %session.record_type().name,
        seed,
        count = config.count,
        size = config.size,
        bindings = session.bindings().len()
    );

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let stdout = io::stdout();
    let mut out = stdout.lock();
    for _ in 0..config.count {
        let value = session.produce(&mut rng, config.size)?;
        serde_json::to_writer(&mut out, &value)?;
        writeln!(out)?;
    }
    out.flush()?;

    tracing::info!(event = "sample_finished", produced = config.count);
    Ok(())
}

fn load_record(path: &Path) -> Result<RecordType, CliError> {
    let raw = fs::read_to_string(path)?;
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let record = if is_json {
        serde_json::from_str(&raw)?
    } else {
        toml::from_str(&raw)?
    };
    Ok(record)
}

fn merge_config(args: &SampleArgs) -> Result<SampleConfig, CliError> {
    let mut config = match &args.config {
        Some(path) => SampleConfig::load(path)?,
        None => SampleConfig::default(),
    };

    if let Some(seed) = args.seed {
        config.seed = Some(seed);
    }
    if let Some(count) = args.count {
        config.count = count;
    }
    if let Some(size) = args.size {
        config.size = size;
    }
    if args.zero_fallthrough {
        config.zero_value_fallthrough = true;
    }
    for raw in &args.bindings {
        let (field, value) = split_assignment(raw)?;
        let value = serde_json::from_str(value)
            .unwrap_or_else(|_| serde_json::Value::String(value.to_string()));
        config.bindings.insert(field.to_string(), value);
    }
    for raw in &args.ranges {
        let (field, range) = split_assignment(raw)?;
        config.ranges.insert(field.to_string(), range.to_string());
    }
    Ok(config)
}

fn split_assignment(raw: &str) -> Result<(&str, &str), CliError> {
    raw.split_once('=')
        .filter(|(field, _)| !field.is_empty())
        .ok_or_else(|| CliError::InvalidArgument(format!("expected field=value, got '{raw}'")))
}

fn build_ops(session: &Session, config: &SampleConfig) -> Result<Vec<ConfigOp>, CliError> {
    let mut ops = Vec::new();
    for (field, value) in &config.bindings {
        // Unknown fields still get an op so the session reports the unmatched binding.
        let constant = match session.field(field) {
            Some(descriptor) => FieldValue::from_json(value, &descriptor.ty)?,
            None => FieldValue::Null,
        };
        ops.push(ConfigOp::bind_field(field.as_str(), Constant(constant)));
    }
    for (field, range) in &config.ranges {
        let Some(descriptor) = session.field(field) else {
            return Err(FuzzError::UnmatchedBinding(field.clone()).into());
        };
        ops.push(range_op(field, &descriptor.ty, range)?);
    }
    Ok(ops)
}

fn range_op(field: &str, ty: &FieldType, raw: &str) -> Result<ConfigOp, CliError> {
    let (min, max) = raw
        .split_once("..")
        .map(|(min, max)| (min.trim(), max.trim_start_matches('=').trim()))
        .ok_or_else(|| CliError::InvalidArgument(format!("expected min..max, got '{raw}'")))?;
    let invalid = || CliError::InvalidArgument(format!("range '{raw}' does not fit {ty}"));

    let op = match ty {
        FieldType::Int { .. } => {
            let min = min.parse().map_err(|_| invalid())?;
            let max = max.parse().map_err(|_| invalid())?;
            ConfigOp::bind_field(field, IntRange::new(min, max))
        }
        FieldType::UInt { .. } => {
            let min: u64 = min.parse().map_err(|_| invalid())?;
            let max: u64 = max.parse().map_err(|_| invalid())?;
            ConfigOp::bind_field(
                field,
                from_fn("cli.uint.range", move |rng, _size| {
                    if min > max {
                        return Err(GeneratorError::new("cli.uint.range min must be <= max"));
                    }
                    Ok(FieldValue::UInt(rng.random_range(min..=max)))
                }),
            )
        }
        FieldType::Float => {
            let min = min.parse().map_err(|_| invalid())?;
            let max = max.parse().map_err(|_| invalid())?;
            ConfigOp::bind_field(field, FloatRange::new(min, max))
        }
        _ => return Err(invalid()),
    };
    Ok(op)
}
