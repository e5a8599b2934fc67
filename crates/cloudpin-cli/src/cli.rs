//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::commands::{browse::BrowseArgs, list::ListArgs, thumbnail::ThumbnailArgs};
use crate::settings::Overrides;

/// Browse a remote record list and its thumbnails.
#[derive(Parser, Debug)]
#[command(name = "cloudpin")]
#[command(author, version = env!("CLOUDPIN_VERSION"), about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Record store URL (https://, http://localhost or file://)
    #[arg(long, global = true)]
    pub store: Option<String>,

    /// Directory for downloaded assets
    #[arg(long, global = true)]
    pub asset_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            store: self.store.clone(),
            asset_dir: self.asset_dir.clone(),
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Refresh the record list and print it
    List(ListArgs),

    /// Resolve one record's thumbnail
    Thumbnail(ThumbnailArgs),

    /// Refresh, then resolve every row's thumbnail
    Browse(BrowseArgs),
}
