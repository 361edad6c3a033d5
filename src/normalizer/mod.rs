use chrono::Utc;
use feed_rs::model::Entry;
use feed_rs::parser;
use html_escape::decode_html_entities;

use crate::app::{FreshetError, Result};
use crate::domain::{Channel, Video};

/// Atom entry ids in upload feeds carry this prefix before the video id.
const VIDEO_ID_PREFIX: &str = "yt:video:";

/// Converts a raw upload feed into `Video` records for one channel.
#[derive(Clone, Default)]
pub struct Normalizer;

impl Normalizer {
    pub fn new() -> Self {
        Self
    }

    /// Parse a feed document into videos, in document order.
    ///
    /// Entries missing a video id or a title are silently dropped.
    /// A missing publish timestamp defaults to now; a missing thumbnail
    /// falls back to the deterministic URL derived from the video id.
    pub fn normalize(&self, channel: &Channel, body: &[u8]) -> Result<Vec<Video>> {
        let feed = parser::parse(body).map_err(|e| FreshetError::FeedParse(e.to_string()))?;

        let videos = feed
            .entries
            .into_iter()
            .filter_map(|entry| {
                let video_id = extract_video_id(&entry)?;
                let title = entry
                    .title
                    .as_ref()
                    .map(|t| decode_html_entities(&t.content).to_string())
                    .filter(|t| !t.is_empty())?;

                let published_at = entry
                    .published
                    .or(entry.updated)
                    .map(|dt| dt.with_timezone(&Utc))
                    .unwrap_or_else(Utc::now);

                let mut video = Video::new(video_id, title, channel, published_at);
                if let Some(url) = media_thumbnail(&entry) {
                    video.thumbnail = url;
                }
                Some(video)
            })
            .collect();

        Ok(videos)
    }

    /// The feed-level author name, used when resolving a raw channel id
    /// to a display name.
    pub fn author_name(&self, body: &[u8]) -> Option<String> {
        let feed = parser::parse(body).ok()?;
        feed.authors
            .first()
            .map(|a| a.name.clone())
            .or_else(|| feed.title.map(|t| t.content))
            .map(|name| decode_html_entities(&name).to_string())
            .filter(|name| !name.is_empty())
    }
}

/// Video id from the entry id's `yt:video:` prefix, else from a
/// `watch?v=` link. Entries with neither have no usable identity.
fn extract_video_id(entry: &Entry) -> Option<String> {
    if let Some(id) = entry.id.strip_prefix(VIDEO_ID_PREFIX) {
        if !id.is_empty() {
            return Some(id.to_string());
        }
    }

    entry.links.iter().find_map(|link| {
        let (_, rest) = link.href.split_once("watch?v=")?;
        let id = rest.split('&').next().unwrap_or(rest);
        (!id.is_empty()).then(|| id.to_string())
    })
}

/// Thumbnail URL nested under the entry's media group, if any.
fn media_thumbnail(entry: &Entry) -> Option<String> {
    entry
        .media
        .iter()
        .flat_map(|group| group.thumbnails.iter())
        .map(|thumb| thumb.image.uri.clone())
        .find(|uri| !uri.is_empty())
}
