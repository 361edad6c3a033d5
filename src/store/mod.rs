pub mod json;

use std::collections::HashSet;

use chrono::NaiveDate;

use crate::app::Result;
use crate::domain::{Channel, Video, ViewMode};

pub use json::JsonStore;

/// Persistence seam. Every logical state mutation has exactly one entry
/// point here; callers never reach into the records themselves.
pub trait Store {
    // Channel operations
    fn channels(&self) -> Result<Vec<Channel>>;
    fn get_channel(&self, id: &str) -> Result<Option<Channel>>;
    /// Append a channel; returns false (and changes nothing) when a
    /// channel with the same id is already tracked.
    fn add_channel(&self, channel: Channel) -> Result<bool>;
    /// Replace a tracked channel in place. When the replacement carries
    /// a different id, cached videos of the old id are purged; an id
    /// already held by another tracked channel is rejected.
    fn update_channel(&self, id: &str, replacement: Channel) -> Result<()>;
    /// Remove a channel and every cached video that references it.
    fn delete_channel(&self, id: &str) -> Result<Channel>;
    fn set_channel_thumbnail(&self, id: &str, thumbnail: &str) -> Result<()>;

    // Video cache operations
    fn videos(&self) -> Result<Vec<Video>>;
    /// A refresh fully replaces the cache; there is no incremental merge.
    fn replace_videos(&self, videos: Vec<Video>) -> Result<()>;

    // Seen-set operations
    fn seen(&self) -> Result<HashSet<String>>;
    fn is_unseen(&self, video_id: &str) -> Result<bool>;
    /// Idempotent; returns whether the id was newly marked.
    fn mark_seen(&self, video_id: &str) -> Result<bool>;
    fn mark_all_seen(&self, video_ids: &[String]) -> Result<usize>;

    // Display preferences
    fn start_date(&self) -> Result<Option<NaiveDate>>;
    fn set_start_date(&self, date: Option<NaiveDate>) -> Result<()>;
    fn view_mode(&self) -> Result<ViewMode>;
    fn set_view_mode(&self, mode: ViewMode) -> Result<()>;
}
