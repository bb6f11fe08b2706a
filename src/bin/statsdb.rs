//! statsdb CLI
//!
//! Loads a CSV of named quantities and answers dimension queries:
//! - `list`: print every loaded (non-generated) quantity
//! - `query`: find products of quantities with a target dimension
//! - `export`: write the database back out as CSV

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use log::warn;

use statsdb::{LoadOptions, QueryOutcome, SearchOptions, StatsDb, io};

#[derive(Parser)]
#[command(name = "statsdb")]
#[command(
    author,
    version,
    about = "Find products of known quantities that match a target dimension"
)]
struct Cli {
    /// CSV file with `Name, Dim, Value, Tags` columns.
    database: PathBuf,

    /// Skip records that fail to load instead of stopping.
    #[arg(long, global = true)]
    lenient: bool,

    /// Increase log output (-v debug, -vv trace). `RUST_LOG` overrides.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print every quantity loaded from the database.
    List,

    /// Search for products whose dimensions equal DIMENSION (e.g. `Op/J/s`).
    Query {
        dimension: String,

        /// Restrict the search to quantities carrying any of these tags,
        /// written as an annotation such as `#CX#TX`.
        #[arg(long)]
        tags: Option<String>,

        /// Largest number of quantities combined in one product.
        #[arg(long)]
        max_size: Option<usize>,

        /// Do not add the `Total` line summing all matches.
        #[arg(long)]
        no_total: bool,

        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Write the database to a CSV file.
    Export { output: PathBuf },
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let options = LoadOptions {
        lenient: cli.lenient,
    };
    let mut db = StatsDb::new();
    let summary = io::load_path(&mut db, &cli.database, &options)
        .with_context(|| format!("failed to load {}", cli.database.display()))?;
    if !summary.skipped.is_empty() {
        warn!(
            "{} record(s) skipped while loading {}",
            summary.skipped.len(),
            cli.database.display()
        );
    }

    match cli.command {
        Commands::List => list(&db),
        Commands::Query {
            dimension,
            tags,
            max_size,
            no_total,
            format,
        } => {
            let search = SearchOptions {
                max_combination_size: max_size,
                accumulate: !no_total,
            };
            let outcome = db
                .query(&dimension, tags.as_deref(), &search)
                .with_context(|| format!("query for '{}' failed", dimension))?;
            print_outcome(&outcome, format)?;
        }
        Commands::Export { output } => {
            io::write_records_to_path(&output, &db)
                .with_context(|| format!("failed to export to {}", output.display()))?;
            println!("Wrote {} record(s) to {}", db.records().len(), output.display());
        }
    }

    Ok(())
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn list(db: &StatsDb) {
    println!("{}", "=".repeat(80));
    println!("Printing all database variables");
    println!("{}", "-".repeat(80));
    for (id, quantity) in db.quantities().filter(|(_, q)| !q.is_generated()) {
        let tags = db
            .tags_of(id)
            .map(|tags| statsdb::tags::format_tags(tags))
            .unwrap_or_default();
        println!("{}  {}", quantity, tags);
    }
    println!("{}", "=".repeat(80));
}

fn print_outcome(outcome: &QueryOutcome, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => print!("{}", outcome),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(outcome)?),
    }
    Ok(())
}
