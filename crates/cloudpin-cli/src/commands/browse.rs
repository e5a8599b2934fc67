//! Browse command implementation.
//!
//! Mirrors a list screen: refresh, then every visible row asks for its
//! thumbnail at once. A second pass shows rows served from the cache.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use futures_util::future::try_join_all;
use serde::Serialize;

use cloudpin_sync::{RecordList, RecordSummary, Thumbnail, ThumbnailResolver};

use crate::output;
use crate::settings::Settings;

#[derive(Args, Debug)]
pub struct BrowseArgs {
    /// Output one JSON object per row
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
enum Status {
    Cached,
    Fetched,
    Placeholder,
}

#[derive(Debug, Serialize)]
struct Row<'a> {
    pass: u8,
    id: &'a str,
    name: &'a str,
    status: Status,
    bytes: usize,
}

pub async fn run(settings: Settings, args: BrowseArgs) -> Result<()> {
    let (list, thumbnails) = super::start(settings)?;

    let records = list.refresh().await.context("Failed to refresh record list")?;
    if records.is_empty() {
        output::note("No records found.");
        return Ok(());
    }

    for pass in 1..=2 {
        let results = resolve_all(&thumbnails, &records).await?;

        for (summary, (status, bytes)) in records.iter().zip(&results) {
            let row = Row {
                pass,
                id: summary.id.as_str(),
                name: &summary.name,
                status: *status,
                bytes: *bytes,
            };
            if args.json {
                output::json(&row)?;
            } else {
                print_row(&row);
            }
        }

        if !args.json {
            let cached = results.iter().filter(|(s, _)| *s == Status::Cached).count();
            output::field(
                &format!("Pass {pass}"),
                &format!("{cached}/{} from cache", results.len()),
            );
        }
    }

    Ok(())
}

async fn resolve_all(
    thumbnails: &ThumbnailResolver,
    records: &RecordList,
) -> Result<Vec<(Status, usize)>> {
    try_join_all(records.iter().map(|summary| resolve(thumbnails, summary))).await
}

async fn resolve(thumbnails: &ThumbnailResolver, summary: &RecordSummary) -> Result<(Status, usize)> {
    let cached = thumbnails
        .cached_location(summary.id.clone())
        .await?
        .is_some();

    Ok(match thumbnails.thumbnail(summary.id.clone()).await {
        Thumbnail::Placeholder => (Status::Placeholder, 0),
        Thumbnail::Image(bytes) if cached => (Status::Cached, bytes.len()),
        Thumbnail::Image(bytes) => (Status::Fetched, bytes.len()),
    })
}

fn print_row(row: &Row<'_>) {
    let status = match row.status {
        Status::Cached => "cached".green(),
        Status::Fetched => "fetched".cyan(),
        Status::Placeholder => "placeholder".dimmed(),
    };
    println!("{:<12} {}  {}", status, row.id, row.name);
}
