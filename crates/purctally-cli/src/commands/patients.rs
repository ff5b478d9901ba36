//! Patients command - browse the read-only patient dataset.

use std::path::PathBuf;

use clap::{Args, Subcommand};

use purctally_core::{PatientDirectory, SortOrder};

/// Arguments for the patients command.
#[derive(Args)]
pub struct PatientsArgs {
    /// Patient dataset file
    #[arg(long, default_value = "patients.json")]
    file: PathBuf,

    #[command(subcommand)]
    command: PatientsCommand,
}

#[derive(Subcommand)]
enum PatientsCommand {
    /// Show every patient
    View,

    /// Show one patient
    Show {
        /// Patient id, e.g. P003
        id: String,
    },

    /// List patients sorted by height, weight, or bmi
    Sort {
        /// Attribute to sort by
        #[arg(long)]
        by: String,

        /// asc or desc
        #[arg(long, default_value = "asc")]
        order: String,
    },
}

pub async fn run(args: PatientsArgs) -> anyhow::Result<()> {
    let patients = PatientDirectory::from_file(&args.file)?;

    let output = match args.command {
        PatientsCommand::View => serde_json::to_string_pretty(patients.all())?,
        PatientsCommand::Show { id } => serde_json::to_string_pretty(patients.get(&id)?)?,
        PatientsCommand::Sort { by, order } => {
            let order: SortOrder = order.parse()?;
            serde_json::to_string_pretty(&patients.sorted_by(&by, order)?)?
        }
    };
    println!("{}", output);

    Ok(())
}
