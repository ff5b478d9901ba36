//! CLI application for purchase-bill OCR and Tally sync.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use commands::{auth, confirm, config, grid, patients, patterns, scan, tally};

/// Purchase-bill OCR - scan bills, confirm records, and sync them to Tally
#[derive(Parser)]
#[command(name = "purctally")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Data directory holding config, patterns, and records
    #[arg(short, long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// OCR bill images and extract their fields
    Scan(scan::ScanArgs),

    /// Save confirmed fields as a record
    Confirm(confirm::ConfirmArgs),

    /// List all saved records
    Grid(grid::GridArgs),

    /// Sync records to Tally
    Tally(tally::TallyArgs),

    /// Manage supplier pattern overrides
    Patterns(patterns::PatternsArgs),

    /// Manage configuration
    Config(config::ConfigArgs),

    /// Check login credentials
    Login(auth::LoginArgs),

    /// Browse the patient dataset
    Patients(patients::PatientsArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let data = commands::resolve_data_dir(cli.data_dir.as_deref());

    match cli.command {
        Commands::Scan(args) => scan::run(args, &data).await,
        Commands::Confirm(args) => confirm::run(args, &data).await,
        Commands::Grid(args) => grid::run(args, &data).await,
        Commands::Tally(args) => tally::run(args, &data).await,
        Commands::Patterns(args) => patterns::run(args, &data).await,
        Commands::Config(args) => config::run(args, &data).await,
        Commands::Login(args) => auth::run(args, &data).await,
        Commands::Patients(args) => patients::run(args).await,
    }
}
