//! Patterns command - inspect and edit supplier pattern overrides.

use clap::{Args, Subcommand};
use console::style;

use purctally_core::{DataDir, PatternUpdate};

/// Arguments for the patterns command.
#[derive(Args)]
pub struct PatternsArgs {
    #[command(subcommand)]
    command: PatternsCommand,
}

#[derive(Subcommand)]
enum PatternsCommand {
    /// Show every supplier's overrides
    List,

    /// Show one supplier's overrides
    Get {
        /// Supplier name as extracted from bills
        supplier: String,
    },

    /// Create or update a supplier's overrides; omitted patterns are kept
    Set(SetArgs),
}

#[derive(Args)]
struct SetArgs {
    /// Supplier name as extracted from bills
    supplier: String,

    /// Invoice number pattern
    #[arg(long)]
    invno: Option<String>,

    /// Invoice date pattern
    #[arg(long)]
    invdt: Option<String>,

    /// Invoice amount pattern
    #[arg(long)]
    invamt: Option<String>,
}

pub async fn run(args: PatternsArgs, data: &DataDir) -> anyhow::Result<()> {
    let store = data.pattern_store();

    match args.command {
        PatternsCommand::List => {
            println!("{}", serde_json::to_string_pretty(&store.load()?)?);
        }
        PatternsCommand::Get { supplier } => {
            let entry = store
                .get(&supplier)?
                .ok_or_else(|| anyhow::anyhow!("No patterns for supplier: {}", supplier))?;
            println!("{}", serde_json::to_string_pretty(&entry)?);
        }
        PatternsCommand::Set(set) => {
            let update = PatternUpdate {
                invno: set.invno,
                invdt: set.invdt,
                invamt: set.invamt,
            };
            let entry = store.upsert(&set.supplier, &update)?;
            println!(
                "{} Updated patterns for {}",
                style("✓").green(),
                set.supplier.trim()
            );
            println!("{}", serde_json::to_string_pretty(&entry)?);
        }
    }

    Ok(())
}
