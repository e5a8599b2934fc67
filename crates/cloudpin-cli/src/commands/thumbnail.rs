//! Thumbnail command implementation.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use cloudpin_core::RecordId;
use cloudpin_sync::Thumbnail;

use crate::output;
use crate::settings::Settings;

#[derive(Args, Debug)]
pub struct ThumbnailArgs {
    /// Record identifier
    pub id: String,

    /// Write the image bytes to this file
    #[arg(long)]
    pub out: Option<PathBuf>,
}

pub async fn run(settings: Settings, args: ThumbnailArgs) -> Result<()> {
    let id = RecordId::new(&args.id).context("Invalid record id")?;
    let (_, thumbnails) = super::start(settings)?;

    let bytes = match thumbnails.thumbnail(id.clone()).await {
        Thumbnail::Image(bytes) => bytes,
        Thumbnail::Placeholder => {
            output::note(&format!("No image available for {id}; showing placeholder."));
            return Ok(());
        }
    };

    if let Some(out) = &args.out {
        std::fs::write(out, &bytes)
            .with_context(|| format!("Failed to write {}", out.display()))?;
        output::success(&format!("Wrote {} bytes to {}", bytes.len(), out.display()));
    } else {
        output::field("Record", id.as_str());
        output::field("Bytes", &bytes.len().to_string());
    }

    if let Some(location) = thumbnails.cached_location(id).await? {
        output::field("Cached at", &location.display().to_string());
    }

    Ok(())
}
