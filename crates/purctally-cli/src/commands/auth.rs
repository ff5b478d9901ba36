//! Login command - check credentials against the config.

use clap::Args;
use console::style;

use purctally_core::DataDir;

/// Arguments for the login command.
#[derive(Args)]
pub struct LoginArgs {
    username: String,
    password: String,
}

pub async fn run(args: LoginArgs, data: &DataDir) -> anyhow::Result<()> {
    let config = data.config_store().load()?;

    if !config.auth.verify(&args.username, &args.password) {
        anyhow::bail!("Invalid credentials");
    }

    println!("{} Logged in as {}", style("✓").green(), args.username);
    Ok(())
}
