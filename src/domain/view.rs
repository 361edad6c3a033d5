use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::Video;

/// Persisted display preference for the default listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Videos,
    Channels,
}

impl std::fmt::Display for ViewMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ViewMode::Videos => write!(f, "videos"),
            ViewMode::Channels => write!(f, "channels"),
        }
    }
}

/// Filters applied on top of the seen-set when building the unread view.
#[derive(Debug, Clone, Default)]
pub struct VideoFilter {
    /// Only videos published on or after this date pass.
    pub start_date: Option<NaiveDate>,
    /// Only videos from this channel pass.
    pub channel_id: Option<String>,
}

impl VideoFilter {
    fn passes(&self, video: &Video) -> bool {
        if let Some(start) = self.start_date {
            if video.published_at.date_naive() < start {
                return false;
            }
        }
        if let Some(ref channel_id) = self.channel_id {
            if video.channel_id != *channel_id {
                return false;
            }
        }
        true
    }
}

/// The unread view: cached videos minus the seen set, narrowed by the
/// filter. Input order (most-recent-first after a refresh) is preserved.
pub fn unread_videos<'a>(
    videos: &'a [Video],
    seen: &HashSet<String>,
    filter: &VideoFilter,
) -> Vec<&'a Video> {
    videos
        .iter()
        .filter(|v| !seen.contains(&v.id) && filter.passes(v))
        .collect()
}

/// Unread count per channel id, for the channel listing.
pub fn unread_count_by_channel(
    videos: &[Video],
    seen: &HashSet<String>,
    filter: &VideoFilter,
) -> HashMap<String, usize> {
    let mut counts = HashMap::new();
    for video in unread_videos(videos, seen, filter) {
        *counts.entry(video.channel_id.clone()).or_insert(0) += 1;
    }
    counts
}
