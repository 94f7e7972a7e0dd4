// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

use anyhow::Result;
use noc_cli::{print_config, run, Cli, Commands, Parser, COMPONENT};
use noc_core::NocContext;
use tracing::error;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    cli.logging.clone().init(COMPONENT)?;

    let ctx = NocContext::load()?;
    if matches!(cli.command, Commands::Config) {
        return print_config(&ctx);
    }
    let mux = noc_mux::default_multiplexer()?;

    if let Err(e) = run(cli.command, &ctx, mux.as_ref()).await {
        error!(error = %format!("{e:#}"), "Command failed");
        return Err(e);
    }
    Ok(())
}
