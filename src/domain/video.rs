use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::Channel;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Video {
    /// Platform-unique video id.
    pub id: String,
    pub title: String,
    pub thumbnail: String,
    /// Back-reference to the tracked channel. Non-owning.
    pub channel_id: String,
    /// Snapshot of the channel at ingestion time. May go stale relative
    /// to the live Channel record; that is intentional.
    pub channel_name: String,
    #[serde(default)]
    pub channel_thumbnail: String,
    pub published_at: DateTime<Utc>,
    /// The feed source does not carry durations; kept for display parity.
    #[serde(default)]
    pub duration: String,
}

impl Video {
    pub fn new(id: String, title: String, channel: &Channel, published_at: DateTime<Utc>) -> Self {
        let thumbnail = Self::default_thumbnail(&id);
        Self {
            id,
            title,
            thumbnail,
            channel_id: channel.id.clone(),
            channel_name: channel.name.clone(),
            channel_thumbnail: channel.thumbnail.clone(),
            published_at,
            duration: String::new(),
        }
    }

    /// Deterministic thumbnail derived from the video id, used when the
    /// feed entry carries none.
    pub fn default_thumbnail(video_id: &str) -> String {
        format!("https://i.ytimg.com/vi/{}/hqdefault.jpg", video_id)
    }

    pub fn watch_url(&self) -> String {
        format!("https://youtube.com/watch?v={}", self.id)
    }
}
