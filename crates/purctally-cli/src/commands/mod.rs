//! Subcommand implementations.

pub mod auth;
pub mod confirm;
pub mod config;
pub mod grid;
pub mod patients;
pub mod patterns;
pub mod scan;
pub mod tally;

use std::fs;
use std::path::{Path, PathBuf};

use console::style;

use purctally_core::DataDir;

/// Output format for scan results and record listings.
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
}

/// Data directory from `--data-dir`, or the platform data directory.
pub fn resolve_data_dir(arg: Option<&Path>) -> DataDir {
    let root = arg.map(Path::to_path_buf).unwrap_or_else(|| {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("purctally")
    });
    DataDir::new(root)
}

/// Print to stdout, or write to `output` when given.
pub fn emit(content: &str, output: Option<&Path>) -> anyhow::Result<()> {
    match output {
        Some(path) => {
            fs::write(path, content)?;
            println!(
                "{} Output written to {}",
                style("✓").green(),
                path.display()
            );
        }
        None => println!("{}", content),
    }
    Ok(())
}
