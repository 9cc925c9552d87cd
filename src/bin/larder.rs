//! Command-line front end for loading, querying and exporting record files.
#![forbid(unsafe_code)]

use std::error::Error;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};
use larder::storage::IndexStatsSnapshot;
use larder::{Dataset, DatasetOptions, Indexed, Meal, QueryBuilder, Record};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "larder",
    version,
    about = "Query attribute-tagged records through in-memory B+ tree indexes",
    disable_help_subcommand = true
)]
struct Cli {
    #[command(flatten)]
    options: OptionArgs,

    #[arg(
        long,
        global = true,
        value_enum,
        default_value_t = OutputFormat::Text,
        help = "Output format for results"
    )]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct OptionArgs {
    #[arg(long, global = true, value_name = "FILE", env = "LARDER_CONFIG", help = "TOML dataset options")]
    config: Option<PathBuf>,

    #[arg(long, global = true, value_name = "N", help = "Override the index branching factor")]
    branching_factor: Option<usize>,
}

#[derive(Subcommand, Debug)]
enum Command {
    #[command(about = "Filter records by name and attribute rules")]
    Query(QueryCmd),

    #[command(about = "Print the level-by-level layout of one attribute index")]
    Dump {
        #[arg(value_name = "FILE")]
        file: PathBuf,
        #[arg(long, value_name = "NAME")]
        attribute: String,
    },

    #[command(about = "Show per-attribute index statistics")]
    Stats {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    #[command(about = "Load a file and write it back normalized and sorted")]
    Export {
        #[arg(value_name = "FILE")]
        file: PathBuf,
        #[arg(value_name = "OUT")]
        out: PathBuf,
    },

    #[command(about = "Total the configured attributes over selected records")]
    Meal {
        #[arg(value_name = "FILE")]
        file: PathBuf,
        #[arg(long = "id", value_name = "ID", required = true)]
        ids: Vec<String>,
    },
}

#[derive(Args, Debug)]
struct QueryCmd {
    #[arg(value_name = "FILE")]
    file: PathBuf,

    #[arg(long, value_name = "SUBSTR", help = "Case-sensitive name substring")]
    name: Option<String>,

    #[arg(
        long = "rule",
        value_name = "RULE",
        help = "Attribute rule such as 'protein >= 10' (repeatable)"
    )]
    rules: Vec<String>,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Serialize)]
struct IndexReport {
    attribute: String,
    entries: usize,
    height: usize,
    stats: IndexStatsSnapshot,
}

fn main() {
    init_tracing();
    if let Err(err) = run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("larder=info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .try_init();
}

fn run() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    let options = build_options(&cli.options)?;

    match cli.command {
        Command::Query(cmd) => {
            let dataset = open(options, &cmd.file)?;
            let mut builder = QueryBuilder::new();
            if let Some(name) = cmd.name {
                builder = builder.name_contains(name);
            }
            for rule in &cmd.rules {
                builder = builder.rule(rule);
            }
            let results = dataset.query(&builder.build()?)?;
            let records: Vec<&Record> = results.iter().map(|r| r.as_ref()).collect();
            emit(cli.format, &records, || {
                for record in &records {
                    println!("{}", format_record(record));
                }
            })?;
        }
        Command::Dump { file, attribute } => {
            let dataset = open(options, &file)?;
            let attribute = attribute.trim().to_lowercase();
            let index = dataset
                .registry()
                .index(&attribute)
                .ok_or_else(|| format!("attribute '{attribute}' is not indexed"))?;
            print!("{}", index.debug_string());
        }
        Command::Stats { file } => {
            let dataset = open(options, &file)?;
            let registry = dataset.registry();
            registry.emit_stats();
            let reports: Vec<IndexReport> = registry
                .attributes()
                .iter()
                .filter_map(|name| {
                    registry.index(name).map(|index| IndexReport {
                        attribute: name.clone(),
                        entries: index.len(),
                        height: index.height(),
                        stats: index.stats_snapshot(),
                    })
                })
                .collect();
            emit(cli.format, &reports, || {
                println!("records={}", dataset.len());
                for report in &reports {
                    println!(
                        "{} entries={} height={} leaf_splits={} internal_splits={} root_splits={}",
                        report.attribute,
                        report.entries,
                        report.height,
                        report.stats.leaf_splits,
                        report.stats.internal_splits,
                        report.stats.root_splits
                    );
                }
            })?;
        }
        Command::Export { file, out } => {
            let dataset = open(options, &file)?;
            let written = dataset.save(&out)?;
            emit(cli.format, &serde_json::json!({ "written": written }), || {
                println!("wrote {written} records to {}", out.display());
            })?;
        }
        Command::Meal { file, ids } => {
            let dataset = open(options, &file)?;
            let mut meal = Meal::new();
            for id in &ids {
                let record = dataset
                    .find(id)
                    .ok_or_else(|| format!("no record with id '{id}'"))?;
                meal.add(record.clone());
            }
            let summary = meal.summary(&dataset.options().attributes);
            emit(cli.format, &summary, || {
                println!("items={}", summary.items);
                for (attribute, total) in &summary.totals {
                    println!("{attribute}={total}");
                }
            })?;
        }
    }
    Ok(())
}

fn build_options(args: &OptionArgs) -> Result<DatasetOptions, Box<dyn Error>> {
    let mut options = match &args.config {
        Some(path) => DatasetOptions::from_toml_file(path)?,
        None => DatasetOptions::default(),
    };
    if let Some(branching_factor) = args.branching_factor {
        options = options.with_branching_factor(branching_factor);
    }
    Ok(options)
}

fn open(options: DatasetOptions, file: &Path) -> Result<Dataset, Box<dyn Error>> {
    let mut dataset = Dataset::new(options)?;
    dataset.load(file)?;
    Ok(dataset)
}

fn format_record(record: &Record) -> String {
    let attrs: Vec<String> = record
        .attributes()
        .iter()
        .map(|attr| format!("{}={}", attr.name, attr.value))
        .collect();
    format!("{}\t{}\t{}", record.id(), record.name(), attrs.join(" "))
}

fn emit<T, F>(format: OutputFormat, value: &T, printer: F) -> Result<(), Box<dyn Error>>
where
    T: Serialize,
    F: FnOnce(),
{
    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(value)?;
            println!("{json}");
        }
        OutputFormat::Text => printer(),
    }
    Ok(())
}
