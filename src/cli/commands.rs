use std::collections::HashSet;

use chrono::Local;

use crate::app::{AppContext, FreshetError, Result};
use crate::cli::{FilterAction, ViewModeArg};
use crate::domain::{unread_count_by_channel, unread_videos, VideoFilter, ViewMode};
use crate::store::Store;

pub async fn add_channel(ctx: &AppContext, input: &str) -> Result<()> {
    println!("Resolving channel...");

    let channel = match ctx.resolver.resolve(input).await {
        Ok(channel) => channel,
        Err(e @ FreshetError::ChannelNotFound(_)) => {
            print_channel_id_help();
            return Err(e);
        }
        Err(e) => return Err(e),
    };

    let name = channel.display_name().to_string();
    let id = channel.id.clone();

    if ctx.store.add_channel(channel)? {
        println!("Added {} ({})", name, id);
        sweep_missing_avatars(ctx).await?;
    } else {
        println!("Already tracking {} ({})", name, id);
    }

    Ok(())
}

pub async fn edit_channel(ctx: &AppContext, id: &str, input: &str) -> Result<()> {
    let existing = ctx
        .store
        .get_channel(id)?
        .ok_or_else(|| FreshetError::ChannelNotFound(id.to_string()))?;

    let replacement = match ctx.resolver.resolve(input).await {
        Ok(channel) => channel,
        Err(e @ FreshetError::ChannelNotFound(_)) => {
            print_channel_id_help();
            return Err(e);
        }
        Err(e) => return Err(e),
    };

    let new_name = replacement.display_name().to_string();
    let new_id = replacement.id.clone();
    let changed_identity = new_id != existing.id;

    ctx.store.update_channel(id, replacement)?;

    println!(
        "Updated {} to {} ({})",
        existing.display_name(),
        new_name,
        new_id
    );
    if changed_identity {
        println!("Dropped cached videos of the previous identity");
    }
    Ok(())
}

pub fn remove_channel(ctx: &AppContext, id: &str) -> Result<()> {
    let removed = ctx.store.delete_channel(id)?;
    println!("Removed {} and its cached videos", removed.display_name());
    Ok(())
}

pub fn list_channels(ctx: &AppContext) -> Result<()> {
    let channels = ctx.store.channels()?;

    if channels.is_empty() {
        println!("No channels");
        return Ok(());
    }

    let videos = ctx.store.videos()?;
    let seen = ctx.store.seen()?;
    let filter = VideoFilter {
        start_date: ctx.store.start_date()?,
        channel_id: None,
    };
    let counts = unread_count_by_channel(&videos, &seen, &filter);

    for channel in channels {
        let unread = counts.get(&channel.id).copied().unwrap_or(0);
        println!(
            "{} (@{}, {} unread)\n  {}",
            channel.display_name(),
            channel.handle,
            unread,
            channel.id
        );
    }

    Ok(())
}

pub fn list_videos(ctx: &AppContext, channel: Option<&str>, all: bool) -> Result<()> {
    let videos = ctx.store.videos()?;
    let seen = ctx.store.seen()?;
    let filter = VideoFilter {
        start_date: ctx.store.start_date()?,
        channel_id: channel.map(String::from),
    };

    // With --all the seen-set is ignored for filtering but still drives
    // the read marker.
    let filter_seen = if all { HashSet::new() } else { seen.clone() };
    let listed = unread_videos(&videos, &filter_seen, &filter);

    if listed.is_empty() {
        println!("No new videos");
        return Ok(());
    }

    for video in listed {
        let marker = if seen.contains(&video.id) { " " } else { "●" };
        let date = video.published_at.format("%Y-%m-%d");
        println!(
            "{} {} {}  [{}] ({})",
            marker, date, video.title, video.channel_name, video.id
        );
    }

    Ok(())
}

pub async fn refresh(ctx: &AppContext) -> Result<()> {
    let channels = ctx.store.channels()?;
    if channels.is_empty() {
        println!("No channels tracked yet. Add one first.");
        return Ok(());
    }

    let _guard = ctx
        .refresh_lock
        .try_lock()
        .map_err(|_| FreshetError::RefreshInProgress)?;

    println!("Refreshing {} channels...", channels.len());

    let outcome = match ctx.aggregator.refresh_all(&channels).await {
        Ok(outcome) => outcome,
        Err(e @ FreshetError::RefreshFailed) => {
            eprintln!("Every channel failed to refresh; keeping the cached list.");
            return Err(e);
        }
        Err(e) => return Err(e),
    };

    let count = outcome.videos.len();
    ctx.store.replace_videos(outcome.videos)?;
    println!(
        "Loaded {} videos from {}/{} channels",
        count, outcome.succeeded, outcome.attempted
    );

    sweep_missing_avatars(ctx).await
}

/// Best-effort avatar pass for channels still missing one. Never fails
/// the surrounding command.
async fn sweep_missing_avatars(ctx: &AppContext) -> Result<()> {
    let channels = ctx.store.channels()?;
    let found = ctx.resolver.fill_missing_avatars(&channels).await;

    let count = found.len();
    for (id, avatar) in found {
        ctx.store.set_channel_thumbnail(&id, &avatar)?;
    }
    if count > 0 {
        println!("Updated {} channel avatars", count);
    }

    Ok(())
}

pub fn mark_seen(ctx: &AppContext, ids: &[String]) -> Result<()> {
    let mut newly = 0;
    for id in ids {
        if ctx.store.mark_seen(id)? {
            newly += 1;
        }
    }

    if newly == ids.len() {
        println!("Marked {} videos as seen", newly);
    } else {
        println!(
            "Marked {} videos as seen ({} already were)",
            newly,
            ids.len() - newly
        );
    }
    Ok(())
}

pub fn mark_all_seen(ctx: &AppContext) -> Result<()> {
    let videos = ctx.store.videos()?;
    let seen = ctx.store.seen()?;

    let unread: Vec<String> = videos
        .iter()
        .filter(|v| !seen.contains(&v.id))
        .map(|v| v.id.clone())
        .collect();

    if unread.is_empty() {
        println!("No unseen videos");
        return Ok(());
    }

    let added = ctx.store.mark_all_seen(&unread)?;
    println!("Marked {} videos as seen", added);
    Ok(())
}

pub fn open_video(ctx: &AppContext, id: &str) -> Result<()> {
    let videos = ctx.store.videos()?;
    let video = videos
        .iter()
        .find(|v| v.id == id)
        .ok_or_else(|| FreshetError::VideoNotFound(id.to_string()))?;

    open::that(video.watch_url())?;
    println!("Opened {}", video.title);
    Ok(())
}

pub fn filter(ctx: &AppContext, action: Option<FilterAction>) -> Result<()> {
    match action {
        None | Some(FilterAction::Show) => match ctx.store.start_date()? {
            Some(date) => println!("Showing videos published on or after {}", date),
            None => println!("No date floor set; all videos are shown"),
        },
        Some(FilterAction::Set { date }) => {
            ctx.store.set_start_date(Some(date))?;
            println!("Only videos from {} on will be shown", date);
        }
        Some(FilterAction::Today) => {
            let today = Local::now().date_naive();
            ctx.store.set_start_date(Some(today))?;
            println!("Only videos from today ({}) on will be shown", today);
        }
        Some(FilterAction::Clear) => {
            ctx.store.set_start_date(None)?;
            println!("Date floor removed");
        }
    }
    Ok(())
}

/// A bare invocation with no subcommand: the persisted view preference
/// decides which listing is shown.
pub fn default_listing(ctx: &AppContext) -> Result<()> {
    match ctx.store.view_mode()? {
        ViewMode::Videos => list_videos(ctx, None, false),
        ViewMode::Channels => list_channels(ctx),
    }
}

pub fn view(ctx: &AppContext, mode: Option<ViewModeArg>) -> Result<()> {
    match mode {
        None => println!("Default view: {}", ctx.store.view_mode()?),
        Some(mode) => {
            let mode: ViewMode = mode.into();
            ctx.store.set_view_mode(mode)?;
            println!("Default view set to {}", mode);
        }
    }
    Ok(())
}

fn print_channel_id_help() {
    eprintln!(
        "\nAutomatic channel lookup is unavailable right now.\n\
         You can enter the channel id manually:\n\
           1. Open the channel page and its \"About\" section\n\
           2. Choose \"Share channel\", then \"Copy channel ID\"\n\
           3. The id starts with \"UC\" (e.g. UCXuqSBlHAE6Xw-yeJA0Tunw)\n\
         Run the command again with that id.\n"
    );
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::config::Config;
    use crate::domain::{Channel, Video};
    use crate::fetcher::proxy::encode_component;
    use crate::fetcher::testing::StubFetcher;
    use crate::store::JsonStore;
    use chrono::{TimeZone, Utc};

    fn test_config() -> Config {
        Config {
            proxies: vec!["https://p1.example/?".into()],
            mirrors: vec!["https://m1.example".into()],
            feed_url: "https://feeds.example/videos.xml?channel_id=".into(),
            channel_page_url: "https://pages.example/@".into(),
            fetch_timeout_secs: 10,
            workers: 2,
        }
    }

    fn context(fetcher: Arc<StubFetcher>) -> (tempfile::TempDir, AppContext) {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(JsonStore::open(dir.path().join("state.json")).unwrap());
        let ctx = AppContext::assemble(test_config(), store, fetcher);
        (dir, ctx)
    }

    fn channel(id: &str) -> Channel {
        Channel::new(id.into(), "h".into(), "Name".into(), "x".into())
    }

    fn video(id: &str, channel_id: &str) -> Video {
        Video::new(
            id.into(),
            format!("Video {}", id),
            &channel(channel_id),
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        )
    }

    #[tokio::test]
    async fn test_failed_refresh_leaves_cache_untouched() {
        let fetcher = Arc::new(StubFetcher::new());
        let (_dir, ctx) = context(fetcher);

        ctx.store.add_channel(channel("UCaaaaaaaaaaaaaaaaaaaaaa")).unwrap();
        ctx.store
            .replace_videos(vec![video("old", "UCaaaaaaaaaaaaaaaaaaaaaa")])
            .unwrap();

        // No feed stubbed: the one channel fails, so the batch fails.
        let err = refresh(&ctx).await.unwrap_err();
        assert!(matches!(err, FreshetError::RefreshFailed));

        let cached = ctx.store.videos().unwrap();
        assert_eq!(cached.len(), 1);
        assert_eq!(cached[0].id, "old");
    }

    #[tokio::test]
    async fn test_successful_refresh_replaces_cache() {
        let fetcher = Arc::new(StubFetcher::new());
        let feed = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom"><title>t</title>
<entry><id>yt:video:new-1</id><title>New Upload</title>
<published>2024-06-01T00:00:00+00:00</published></entry></feed>"#;
        let target = "https://feeds.example/videos.xml?channel_id=UCaaaaaaaaaaaaaaaaaaaaaa";
        fetcher.respond(
            &format!("https://p1.example/?{}", encode_component(target)),
            feed,
        );

        let (_dir, ctx) = context(fetcher);
        ctx.store.add_channel(channel("UCaaaaaaaaaaaaaaaaaaaaaa")).unwrap();
        ctx.store
            .replace_videos(vec![video("old", "UCaaaaaaaaaaaaaaaaaaaaaa")])
            .unwrap();

        refresh(&ctx).await.unwrap();

        let cached = ctx.store.videos().unwrap();
        assert_eq!(cached.len(), 1);
        assert_eq!(cached[0].id, "new-1");
    }

    #[tokio::test]
    async fn test_refresh_with_no_channels_is_a_no_op() {
        let fetcher = Arc::new(StubFetcher::new());
        let (_dir, ctx) = context(fetcher.clone());

        refresh(&ctx).await.unwrap();
        assert!(fetcher.calls().is_empty());
    }

    #[tokio::test]
    async fn test_add_resolved_channel_persists_it() {
        let fetcher = Arc::new(StubFetcher::new());
        fetcher.respond(
            "https://m1.example/c/somehandle",
            r#"{"id":"UCXuqSBlHAE6Xw-yeJA0Tunw","name":"Display Name"}"#,
        );

        let (_dir, ctx) = context(fetcher);
        add_channel(&ctx, "@somehandle").await.unwrap();

        let channels = ctx.store.channels().unwrap();
        assert_eq!(channels.len(), 1);
        assert_eq!(channels[0].id, "UCXuqSBlHAE6Xw-yeJA0Tunw");

        // Adding the same identity again changes nothing.
        add_channel(&ctx, "@somehandle").await.unwrap();
        assert_eq!(ctx.store.channels().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_edit_to_an_already_tracked_identity_fails_cleanly() {
        let fetcher = Arc::new(StubFetcher::new());
        fetcher.respond(
            "https://m1.example/c/otherhandle",
            r#"{"id":"UCbbbbbbbbbbbbbbbbbbbbbb","name":"Other"}"#,
        );

        let (_dir, ctx) = context(fetcher);
        ctx.store.add_channel(channel("UCaaaaaaaaaaaaaaaaaaaaaa")).unwrap();
        ctx.store.add_channel(channel("UCbbbbbbbbbbbbbbbbbbbbbb")).unwrap();

        let err = edit_channel(&ctx, "UCaaaaaaaaaaaaaaaaaaaaaa", "@otherhandle")
            .await
            .unwrap_err();
        assert!(matches!(err, FreshetError::ChannelAlreadyTracked(_)));

        // Both identities are still tracked exactly once.
        let channels = ctx.store.channels().unwrap();
        assert_eq!(channels.len(), 2);
        assert_eq!(
            channels
                .iter()
                .filter(|c| c.id == "UCbbbbbbbbbbbbbbbbbbbbbb")
                .count(),
            1
        );
    }

    #[tokio::test]
    async fn test_default_listing_follows_the_view_preference() {
        let fetcher = Arc::new(StubFetcher::new());
        let (_dir, ctx) = context(fetcher);
        ctx.store.add_channel(channel("UCaaaaaaaaaaaaaaaaaaaaaa")).unwrap();
        ctx.store
            .replace_videos(vec![video("v1", "UCaaaaaaaaaaaaaaaaaaaaaa")])
            .unwrap();

        // Both stored preferences drive a working listing.
        for mode in [ViewMode::Videos, ViewMode::Channels] {
            ctx.store.set_view_mode(mode).unwrap();
            default_listing(&ctx).unwrap();
        }
    }

    #[tokio::test]
    async fn test_add_unresolvable_channel_is_not_found() {
        let fetcher = Arc::new(StubFetcher::new());
        let (_dir, ctx) = context(fetcher);

        let err = add_channel(&ctx, "@nosuchhandle").await.unwrap_err();
        assert!(matches!(err, FreshetError::ChannelNotFound(_)));
        assert!(ctx.store.channels().unwrap().is_empty());
    }
}
