//! List command implementation.

use anyhow::{Context, Result};
use clap::Args;

use crate::output;
use crate::settings::Settings;

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Print a table instead of JSON lines
    #[arg(long)]
    pub pretty: bool,
}

pub async fn run(settings: Settings, args: ListArgs) -> Result<()> {
    let (list, _) = super::start(settings)?;

    let result = list.refresh().await;
    // A failed refresh still shows what arrived before the failure.
    let records = match &result {
        Ok(records) => records.clone(),
        Err(_) => list.records(),
    };

    if args.pretty {
        output::table(&records);
    } else {
        for summary in &records {
            output::json(summary)?;
        }
    }

    result.context("Failed to refresh record list")?;

    if records.is_empty() {
        output::note("No records found.");
    }

    Ok(())
}
