//! Tally command - mocked sync of confirmed records.

use clap::{Args, Subcommand};

use purctally_core::{DataDir, TallyClient};

/// Arguments for the tally command.
#[derive(Args)]
pub struct TallyArgs {
    #[command(subcommand)]
    command: TallyCommand,
}

#[derive(Subcommand)]
enum TallyCommand {
    /// Mark every unsent record from today as sent
    SendAll,

    /// Count sent and unsent records across all days
    Status,
}

pub async fn run(args: TallyArgs, data: &DataDir) -> anyhow::Result<()> {
    let config = data.config_store().load()?;
    let client = TallyClient::new(config.tally);
    let store = data.record_store();

    let output = match args.command {
        TallyCommand::SendAll => serde_json::to_string(&client.send_all(&store)?)?,
        TallyCommand::Status => serde_json::to_string(&client.status(&store)?)?,
    };
    println!("{}", output);

    Ok(())
}
