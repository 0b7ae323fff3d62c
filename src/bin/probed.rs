//! probed - Probed Store driver
//!
//! Command-line driver for exercising the store:
//! - Generated insert/remove/lookup workloads
//! - Bulk fills with an optional slot dump
//! - A single-entry round trip
//! - Effective configuration output
//!
//! # Examples
//!
//! ```bash
//! # Run 10k mixed operations and print the report as JSON
//! probed run --ops 10000 --seed 7 --json
//!
//! # Fill a store and dump both generations
//! probed --config store.toml fill --count 60 --dump
//!
//! # Insert, look up and remove one entry
//! probed demo --key python --id 4242
//! ```

use clap::{Args, Parser, Subcommand};
use probed_store::workload::{self, OpMix, Workload};
use probed_store::{Entry, ProbedStore, StoreConfig};
use std::io::{self, Write};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// probed - quadratic-probing store with incremental rehashing
#[derive(Parser, Debug)]
#[command(name = "probed")]
#[command(version = probed_store::VERSION)]
#[command(about = "Drive a probed store with generated workloads", long_about = None)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Store configuration file (TOML)
    #[arg(long, global = true, env = "PROBED_CONFIG")]
    config: Option<PathBuf>,

    /// Log directory path
    #[arg(long, global = true, default_value = "logs", env = "PROBED_LOG_DIR")]
    log_dir: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "info", env = "RUST_LOG")]
    log_level: String,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a generated mix of inserts, removes and lookups
    Run(RunArgs),

    /// Insert generated entries
    Fill(FillArgs),

    /// Insert one entry, look it up, remove it and look it up again
    Demo(DemoArgs),

    /// Print the effective store configuration as TOML
    Config,

    /// Show version
    Version,
}

/// Workload arguments
#[derive(Args, Debug)]
struct RunArgs {
    /// Number of operations
    #[arg(long, default_value = "10000")]
    ops: usize,

    /// Generator seed
    #[arg(long, default_value = "10")]
    seed: u64,

    /// Insert weight
    #[arg(long, default_value = "60")]
    insert_weight: u32,

    /// Remove weight
    #[arg(long, default_value = "20")]
    remove_weight: u32,

    /// Lookup weight
    #[arg(long, default_value = "20")]
    lookup_weight: u32,

    /// Print report and statistics as JSON
    #[arg(long)]
    json: bool,
}

/// Fill arguments
#[derive(Args, Debug)]
struct FillArgs {
    /// Number of distinct entries to insert
    #[arg(long, default_value = "60")]
    count: usize,

    /// Generator seed
    #[arg(long, default_value = "10")]
    seed: u64,

    /// Dump both generations afterwards
    #[arg(long)]
    dump: bool,
}

/// Demo arguments
#[derive(Args, Debug)]
struct DemoArgs {
    #[arg(long, default_value = "python")]
    key: String,

    #[arg(long, default_value = "4242")]
    id: u32,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    setup_logging(&cli)?;

    let config = StoreConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Run(args) => run_command(&config, args),
        Commands::Fill(args) => fill_command(&config, args),
        Commands::Demo(args) => demo_command(&config, args),
        Commands::Config => {
            print!("{}", config.to_toml_string()?);
            Ok(())
        }
        Commands::Version => {
            println!("probed {}", probed_store::VERSION);
            Ok(())
        }
    }
}

/// Setup logging with rolling files and console output
fn setup_logging(cli: &Cli) -> anyhow::Result<()> {
    std::fs::create_dir_all(&cli.log_dir)?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, &cli.log_dir, "probed.log");

    let log_level = cli
        .log_level
        .parse::<tracing::Level>()
        .unwrap_or(tracing::Level::INFO);

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(!cli.no_color)
                .compact(),
        )
        .with(fmt::layer().with_writer(file_appender).with_ansi(false))
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .init();

    Ok(())
}

/// Run command - apply a generated workload
fn run_command(config: &StoreConfig, args: RunArgs) -> anyhow::Result<()> {
    let mix = OpMix {
        insert: args.insert_weight,
        remove: args.remove_weight,
        lookup: args.lookup_weight,
    };
    if mix.insert + mix.remove + mix.lookup == 0 {
        warn!("All operation weights are zero; every operation will be an insert");
    }

    info!(ops = args.ops, seed = args.seed, hash = %config.hash, "Generating workload");
    let ops = Workload::new(args.seed).operations(args.ops, mix);

    let mut store = ProbedStore::from_config(config);
    let report = workload::run(&mut store, &ops);
    let stats = store.stats();

    if args.json {
        let out = serde_json::json!({ "report": report, "stats": stats });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!("Workload ({} operations, seed {})", report.operations, args.seed);
    println!("───────────────────────────────");
    println!("  inserted          {}", report.inserted);
    println!("  insert rejected   {}", report.insert_rejected);
    println!("  removed           {}", report.removed);
    println!("  remove missed     {}", report.remove_missed);
    println!("  lookup hits       {}", report.lookup_hits);
    println!("  lookup misses     {}", report.lookup_misses);
    println!("  ops while migrating {}", report.ops_while_migrating);
    println!();
    println!("Store");
    println!("───────────────────────────────");
    println!("  capacity          {}", stats.capacity);
    println!("  size / deleted    {} / {}", stats.size, stats.deleted);
    println!("  live entries      {}", stats.live);
    println!("  load factor       {:.4}", stats.load_factor);
    println!("  deleted ratio     {:.4}", stats.deleted_ratio);
    println!("  rehashes          {}", stats.rehashes);
    println!("  entries migrated  {}", stats.entries_migrated);
    if stats.migrating {
        println!(
            "  old generation    cap {} size {} deleted {}",
            stats.old_capacity, stats.old_size, stats.old_deleted
        );
    }
    Ok(())
}

/// Fill command - insert distinct generated entries
fn fill_command(config: &StoreConfig, args: FillArgs) -> anyhow::Result<()> {
    let mut store = ProbedStore::from_config(config);
    let entries = Workload::new(args.seed).unique_entries(args.count);

    let mut rejected = 0;
    for entry in entries {
        if !store.insert(entry) {
            rejected += 1;
        }
    }
    if rejected > 0 {
        warn!(rejected, "Some inserts were rejected");
    }

    let stats = store.stats();
    println!(
        "Inserted {} entries: capacity {}, size {}, lambda {:.4}, migrating {}",
        args.count - rejected,
        stats.capacity,
        stats.size,
        stats.load_factor,
        stats.migrating
    );

    if args.dump {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        store.dump_to(&mut out)?;
        out.flush()?;
    }
    Ok(())
}

/// Demo command - one entry through its whole lifecycle
fn demo_command(config: &StoreConfig, args: DemoArgs) -> anyhow::Result<()> {
    let mut store = ProbedStore::from_config(config);
    let entry = Entry::new(args.key, args.id);

    println!("insert {:<20} -> {}", entry.to_string(), store.insert(entry.clone()));
    println!("get    {:<20} -> {:?}", entry.to_string(), store.get_person(&entry.key, entry.id));
    println!("remove {:<20} -> {}", entry.to_string(), store.remove(&entry));
    println!("get    {:<20} -> {:?}", entry.to_string(), store.get_person(&entry.key, entry.id));
    Ok(())
}
