//! Channel resolution.
//!
//! Turns raw user input into a stable channel identity through a
//! cascade of fallback strategies: a direct-id short-circuit, the
//! lookup-API mirrors (by handle, then free-text search), and finally a
//! scrape of the channel page through the relay proxies. The first
//! strategy to produce a valid non-empty id wins.

pub mod patterns;

use std::sync::Arc;

use html_escape::decode_html_entities;
use serde::Deserialize;

use crate::app::{FreshetError, Result};
use crate::config::Config;
use crate::domain::channel::CHANNEL_ID_LEN;
use crate::domain::Channel;
use crate::fetcher::proxy::encode_component;
use crate::fetcher::{Fetcher, ProxyClient, RotationCursor};
use crate::normalizer::Normalizer;

/// Channel detail payload from a lookup mirror.
#[derive(Debug, Deserialize)]
struct ChannelLookup {
    id: Option<String>,
    name: Option<String>,
    #[serde(rename = "avatarUrl")]
    avatar_url: Option<String>,
}

/// Search payload from a lookup mirror, filtered to channel results.
#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    name: Option<String>,
    url: Option<String>,
    thumbnail: Option<String>,
}

pub struct Resolver {
    fetcher: Arc<dyn Fetcher>,
    proxy: ProxyClient,
    rotation: Arc<RotationCursor>,
    normalizer: Normalizer,
    mirrors: Vec<String>,
    feed_url: String,
    channel_page_url: String,
}

impl Resolver {
    pub fn new(
        fetcher: Arc<dyn Fetcher>,
        proxy: ProxyClient,
        rotation: Arc<RotationCursor>,
        normalizer: Normalizer,
        config: &Config,
    ) -> Self {
        Self {
            fetcher,
            proxy,
            rotation,
            normalizer,
            mirrors: config.mirrors.clone(),
            feed_url: config.feed_url.clone(),
            channel_page_url: config.channel_page_url.clone(),
        }
    }

    /// Resolve raw input to a channel identity, or `ChannelNotFound`
    /// once every strategy is exhausted.
    pub async fn resolve(&self, raw_input: &str) -> Result<Channel> {
        let handle = patterns::normalize_input(raw_input)?;

        // Already a canonical id: skip the mirror cascade entirely.
        if Channel::is_canonical_id(&handle) {
            return Ok(self.resolve_direct_id(&handle).await);
        }

        if let Some(channel) = self.lookup_cascade(&handle).await {
            return Ok(channel);
        }

        if let Some(channel) = self.scrape_channel_page(&handle).await {
            return Ok(channel);
        }

        Err(FreshetError::ChannelNotFound(handle))
    }

    /// The input is already a canonical id. Fetch the upload feed for a
    /// display name (id string if that fails) and enrich with an avatar
    /// best-effort.
    async fn resolve_direct_id(&self, id: &str) -> Channel {
        let feed_url = format!("{}{}", self.feed_url, id);
        let name = match self.proxy.fetch_via_proxies(&feed_url).await {
            Ok(body) => self
                .normalizer
                .author_name(body.as_bytes())
                .unwrap_or_else(|| id.to_string()),
            Err(e) => {
                tracing::debug!("Could not fetch feed name for {}: {}", id, e);
                id.to_string()
            }
        };

        let thumbnail = self.fetch_avatar(id).await.unwrap_or_default();
        Channel::new(id.to_string(), id.to_string(), name, thumbnail)
    }

    /// Mirror cascade, starting at the rotation cursor and wrapping
    /// once. Per mirror: direct-by-handle lookup, then free-text search.
    async fn lookup_cascade(&self, handle: &str) -> Option<Channel> {
        if self.mirrors.is_empty() {
            return None;
        }

        for offset in self.rotation.offsets(self.mirrors.len()) {
            let mirror = &self.mirrors[offset];

            match self.lookup_by_handle(mirror, handle).await {
                Ok(Some(channel)) => {
                    self.rotation.record_success(offset);
                    return Some(channel);
                }
                Ok(None) => {}
                Err(e) => tracing::debug!("Mirror {} handle lookup failed: {}", mirror, e),
            }

            match self.search_by_name(mirror, handle).await {
                Ok(Some(channel)) => {
                    self.rotation.record_success(offset);
                    return Some(channel);
                }
                Ok(None) => {}
                Err(e) => tracing::debug!("Mirror {} search failed: {}", mirror, e),
            }
        }

        None
    }

    async fn lookup_by_handle(&self, mirror: &str, handle: &str) -> Result<Option<Channel>> {
        let url = format!("{}/c/{}", mirror, handle);
        let body = self.fetcher.get_text(&url).await?;
        let data: ChannelLookup = serde_json::from_str(&body)?;

        Ok(data.id.filter(|id| !id.is_empty()).map(|id| {
            Channel::new(
                id,
                handle.to_string(),
                data.name.unwrap_or_else(|| handle.to_string()),
                data.avatar_url.unwrap_or_default(),
            )
        }))
    }

    async fn search_by_name(&self, mirror: &str, handle: &str) -> Result<Option<Channel>> {
        let url = format!(
            "{}/search?q={}&filter=channels",
            mirror,
            encode_component(handle)
        );
        let body = self.fetcher.get_text(&url).await?;
        let data: SearchResponse = serde_json::from_str(&body)?;

        let Some(item) = pick_search_result(&data.items, handle) else {
            return Ok(None);
        };

        let id = item
            .url
            .as_deref()
            .and_then(|u| u.strip_prefix("/channel/"))
            .unwrap_or_default();
        if id.is_empty() {
            return Ok(None);
        }

        Ok(Some(Channel::new(
            id.to_string(),
            handle.to_string(),
            item.name.clone().unwrap_or_else(|| handle.to_string()),
            item.thumbnail.clone().unwrap_or_default(),
        )))
    }

    /// Last resort: fetch the channel page through the proxies and pull
    /// the id out of embedded page metadata.
    async fn scrape_channel_page(&self, handle: &str) -> Option<Channel> {
        let page_url = format!("{}{}", self.channel_page_url, handle);
        let html = match self.proxy.fetch_via_proxies(&page_url).await {
            Ok(html) => html,
            Err(e) => {
                tracing::debug!("Channel page fetch failed for {}: {}", handle, e);
                return None;
            }
        };

        extract_identity_from_page(&html, handle)
    }

    /// Channel detail by id across the mirrors, for the avatar URL.
    /// Starts at the rotation cursor and records success like the
    /// lookup cascade.
    pub async fn fetch_avatar(&self, channel_id: &str) -> Option<String> {
        if self.mirrors.is_empty() {
            return None;
        }

        for offset in self.rotation.offsets(self.mirrors.len()) {
            let mirror = &self.mirrors[offset];
            let url = format!("{}/channel/{}", mirror, channel_id);

            let lookup = match self.fetcher.get_text(&url).await {
                Ok(body) => serde_json::from_str::<ChannelLookup>(&body),
                Err(e) => {
                    tracing::debug!("Mirror {} avatar lookup failed: {}", mirror, e);
                    continue;
                }
            };

            match lookup {
                Ok(data) => {
                    if let Some(avatar) = data.avatar_url.filter(|a| !a.is_empty()) {
                        self.rotation.record_success(offset);
                        return Some(avatar);
                    }
                }
                Err(e) => tracing::debug!("Mirror {} avatar payload invalid: {}", mirror, e),
            }
        }

        None
    }

    /// Best-effort sweep for channels still missing an avatar. Returns
    /// the (channel id, avatar URL) pairs that were found; per-channel
    /// failures are isolated and never abort the sweep.
    pub async fn fill_missing_avatars(&self, channels: &[Channel]) -> Vec<(String, String)> {
        let mut found = Vec::new();

        for channel in channels.iter().filter(|c| c.thumbnail.is_empty()) {
            match self.fetch_avatar(&channel.id).await {
                Some(avatar) => found.push((channel.id.clone(), avatar)),
                None => {
                    tracing::debug!("No avatar found for {}", channel.display_name());
                }
            }
        }

        found
    }
}

/// Tie-break for search results: a case-insensitive exact name match
/// beats a substring-contains match beats the first result.
fn pick_search_result<'a>(items: &'a [SearchItem], query: &str) -> Option<&'a SearchItem> {
    let query = query.to_lowercase();

    let name_matches = |item: &&SearchItem, f: &dyn Fn(&str) -> bool| {
        item.name
            .as_deref()
            .map(|n| f(&n.to_lowercase()))
            .unwrap_or(false)
    };

    items
        .iter()
        .find(|item| name_matches(item, &|n| n == query))
        .or_else(|| items.iter().find(|item| name_matches(item, &|n| n.contains(&query))))
        .or_else(|| items.first())
}

const CANONICAL_MARKER: &str =
    r#"<link rel="canonical" href="https://www.youtube.com/channel/"#;
const EXTERNAL_ID_MARKER: &str = r#""externalId":""#;
const OG_TITLE_MARKER: &str = r#"<meta property="og:title" content=""#;

/// Two alternative extraction patterns in priority order: the canonical
/// link tag, then the raw embedded-id marker.
fn extract_identity_from_page(html: &str, handle: &str) -> Option<Channel> {
    if let Some(id) = extract_channel_id(html, CANONICAL_MARKER) {
        let name = extract_between(html, OG_TITLE_MARKER, "\"")
            .map(|n| decode_html_entities(n).to_string())
            .unwrap_or_else(|| handle.to_string());
        return Some(Channel::new(
            id.to_string(),
            handle.to_string(),
            name,
            String::new(),
        ));
    }

    if let Some(id) = extract_channel_id(html, EXTERNAL_ID_MARKER) {
        let name = extract_between(html, "<title>", "</title>")
            .map(|t| {
                decode_html_entities(t.trim_end_matches(" - YouTube"))
                    .to_string()
            })
            .unwrap_or_else(|| handle.to_string());
        return Some(Channel::new(
            id.to_string(),
            handle.to_string(),
            name,
            String::new(),
        ));
    }

    None
}

/// The fixed-length id immediately following `marker`, if it has the
/// canonical shape.
fn extract_channel_id<'a>(html: &'a str, marker: &str) -> Option<&'a str> {
    let start = html.find(marker)? + marker.len();
    let id = html.get(start..start + CHANNEL_ID_LEN)?;
    Channel::is_canonical_id(id).then_some(id)
}

fn extract_between<'a>(html: &'a str, prefix: &str, terminator: &str) -> Option<&'a str> {
    let start = html.find(prefix)? + prefix.len();
    let rest = &html[start..];
    let end = rest.find(terminator)?;
    Some(&rest[..end])
}
