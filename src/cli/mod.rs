pub mod commands;

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};

use crate::domain::ViewMode;

#[derive(Parser)]
#[command(name = "freshet")]
#[command(about = "Track new uploads from YouTube channels via their public feeds", long_about = None)]
pub struct Cli {
    /// With no subcommand, shows the listing picked with `view`.
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Track a channel (handle, URL, or raw channel id)
    Add {
        /// Handle, channel URL, or canonical channel id
        input: String,
    },
    /// Re-resolve a tracked channel from new input
    Edit {
        /// Id of the tracked channel to edit
        id: String,
        /// New handle, URL, or channel id to resolve
        input: String,
    },
    /// Stop tracking a channel and drop its cached videos
    Remove {
        /// Id of the tracked channel
        id: String,
    },
    /// List tracked channels with unread counts
    List,
    /// List unread videos, newest first
    Videos {
        /// Only videos from this channel id
        #[arg(long)]
        channel: Option<String>,
        /// Include videos already marked as seen
        #[arg(long)]
        all: bool,
    },
    /// Fetch fresh uploads for every tracked channel
    Refresh,
    /// Mark videos as seen
    Seen {
        /// Video ids to mark
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Mark every currently unread video as seen
    SeenAll,
    /// Open a video in the browser
    Open {
        /// Video id
        id: String,
    },
    /// Show or change the date floor of the unread view
    Filter {
        #[command(subcommand)]
        action: Option<FilterAction>,
    },
    /// Show or set which listing a bare invocation shows
    View {
        mode: Option<ViewModeArg>,
    },
}

#[derive(Subcommand)]
pub enum FilterAction {
    /// Show the current date floor
    Show,
    /// Only show videos published on or after this date (YYYY-MM-DD)
    Set { date: NaiveDate },
    /// Move the floor to today
    Today,
    /// Remove the date floor
    Clear,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ViewModeArg {
    Videos,
    Channels,
}

impl From<ViewModeArg> for ViewMode {
    fn from(mode: ViewModeArg) -> Self {
        match mode {
            ViewModeArg::Videos => ViewMode::Videos,
            ViewModeArg::Channels => ViewMode::Channels,
        }
    }
}
