use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::app::{FreshetError, Result};
use crate::domain::{Channel, Video, ViewMode};
use crate::store::Store;

/// The on-disk state file. Field names are the persisted record keys;
/// missing fields default so older files keep loading.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct AppState {
    /// Tracked channels, in display/tracking order.
    channels: Vec<Channel>,
    /// Seen set, serialized as an id array.
    seen_videos: Vec<String>,
    /// Cached videos, most-recent-first.
    videos_cache: Vec<Video>,
    start_date: Option<NaiveDate>,
    view_mode: ViewMode,
}

/// JSON-file-backed store. The whole state is held in memory behind a
/// mutex and written back on every mutation.
pub struct JsonStore {
    path: PathBuf,
    state: Mutex<AppState>,
}

impl JsonStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let state = if path.exists() {
            serde_json::from_str(&fs::read_to_string(&path)?)?
        } else {
            AppState::default()
        };

        Ok(Self {
            path,
            state: Mutex::new(state),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, AppState>> {
        self.state
            .lock()
            .map_err(|e| FreshetError::Other(format!("State lock poisoned: {}", e)))
    }

    fn persist(&self, state: &AppState) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(state)?)?;
        Ok(())
    }
}

impl Store for JsonStore {
    fn channels(&self) -> Result<Vec<Channel>> {
        Ok(self.lock()?.channels.clone())
    }

    fn get_channel(&self, id: &str) -> Result<Option<Channel>> {
        Ok(self.lock()?.channels.iter().find(|c| c.id == id).cloned())
    }

    fn add_channel(&self, channel: Channel) -> Result<bool> {
        let mut state = self.lock()?;
        if state.channels.iter().any(|c| c.id == channel.id) {
            return Ok(false);
        }

        state.channels.push(channel);
        self.persist(&state)?;
        Ok(true)
    }

    fn update_channel(&self, id: &str, replacement: Channel) -> Result<()> {
        let mut state = self.lock()?;
        let index = state
            .channels
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| FreshetError::ChannelNotFound(id.to_string()))?;

        if replacement.id != id {
            // The new identity must not collide with another tracked
            // channel; ids are unique across the list.
            if state.channels.iter().any(|c| c.id == replacement.id) {
                return Err(FreshetError::ChannelAlreadyTracked(replacement.id));
            }
            // A re-resolve to a different identity: cached videos of the
            // old id would be orphans, so they go with it.
            state.videos_cache.retain(|v| v.channel_id != id);
        }
        state.channels[index] = replacement;
        self.persist(&state)?;
        Ok(())
    }

    fn delete_channel(&self, id: &str) -> Result<Channel> {
        let mut state = self.lock()?;
        let index = state
            .channels
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| FreshetError::ChannelNotFound(id.to_string()))?;

        let removed = state.channels.remove(index);
        state.videos_cache.retain(|v| v.channel_id != id);
        self.persist(&state)?;
        Ok(removed)
    }

    fn set_channel_thumbnail(&self, id: &str, thumbnail: &str) -> Result<()> {
        let mut state = self.lock()?;
        let channel = state
            .channels
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| FreshetError::ChannelNotFound(id.to_string()))?;

        channel.thumbnail = thumbnail.to_string();
        self.persist(&state)?;
        Ok(())
    }

    fn videos(&self) -> Result<Vec<Video>> {
        Ok(self.lock()?.videos_cache.clone())
    }

    fn replace_videos(&self, videos: Vec<Video>) -> Result<()> {
        let mut state = self.lock()?;
        state.videos_cache = videos;
        self.persist(&state)?;
        Ok(())
    }

    fn seen(&self) -> Result<HashSet<String>> {
        Ok(self.lock()?.seen_videos.iter().cloned().collect())
    }

    fn is_unseen(&self, video_id: &str) -> Result<bool> {
        Ok(!self.lock()?.seen_videos.iter().any(|id| id == video_id))
    }

    fn mark_seen(&self, video_id: &str) -> Result<bool> {
        let mut state = self.lock()?;
        if state.seen_videos.iter().any(|id| id == video_id) {
            return Ok(false);
        }

        state.seen_videos.push(video_id.to_string());
        self.persist(&state)?;
        Ok(true)
    }

    fn mark_all_seen(&self, video_ids: &[String]) -> Result<usize> {
        let mut state = self.lock()?;
        let mut added = 0;

        for id in video_ids {
            if !state.seen_videos.contains(id) {
                state.seen_videos.push(id.clone());
                added += 1;
            }
        }

        if added > 0 {
            self.persist(&state)?;
        }
        Ok(added)
    }

    fn start_date(&self) -> Result<Option<NaiveDate>> {
        Ok(self.lock()?.start_date)
    }

    fn set_start_date(&self, date: Option<NaiveDate>) -> Result<()> {
        let mut state = self.lock()?;
        state.start_date = date;
        self.persist(&state)?;
        Ok(())
    }

    fn view_mode(&self) -> Result<ViewMode> {
        Ok(self.lock()?.view_mode)
    }

    fn set_view_mode(&self, mode: ViewMode) -> Result<()> {
        let mut state = self.lock()?;
        state.view_mode = mode;
        self.persist(&state)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn channel(id: &str) -> Channel {
        Channel::new(id.into(), "handle".into(), format!("Channel {}", id), String::new())
    }

    fn video(id: &str, channel_id: &str) -> Video {
        Video::new(
            id.into(),
            format!("Video {}", id),
            &channel(channel_id),
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        )
    }

    fn temp_store() -> (tempfile::TempDir, JsonStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::open(dir.path().join("state.json")).unwrap();
        (dir, store)
    }

    #[test]
    fn test_add_and_list_channels_in_insertion_order() {
        let (_dir, store) = temp_store();
        assert!(store.add_channel(channel("UCbbbbbbbbbbbbbbbbbbbbbb")).unwrap());
        assert!(store.add_channel(channel("UCaaaaaaaaaaaaaaaaaaaaaa")).unwrap());

        let channels = store.channels().unwrap();
        assert_eq!(channels[0].id, "UCbbbbbbbbbbbbbbbbbbbbbb");
        assert_eq!(channels[1].id, "UCaaaaaaaaaaaaaaaaaaaaaa");
    }

    #[test]
    fn test_duplicate_channel_id_rejected() {
        let (_dir, store) = temp_store();
        assert!(store.add_channel(channel("UCaaaaaaaaaaaaaaaaaaaaaa")).unwrap());
        assert!(!store.add_channel(channel("UCaaaaaaaaaaaaaaaaaaaaaa")).unwrap());
        assert_eq!(store.channels().unwrap().len(), 1);
    }

    #[test]
    fn test_state_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");

        {
            let store = JsonStore::open(&path).unwrap();
            store.add_channel(channel("UCaaaaaaaaaaaaaaaaaaaaaa")).unwrap();
            store.mark_seen("v1").unwrap();
            store.mark_seen("v2").unwrap();
            store
                .set_start_date(NaiveDate::from_ymd_opt(2024, 3, 1))
                .unwrap();
        }

        let store = JsonStore::open(&path).unwrap();
        assert_eq!(store.channels().unwrap().len(), 1);
        assert_eq!(store.start_date().unwrap(), NaiveDate::from_ymd_opt(2024, 3, 1));

        // Seen-set round-trip: identical membership, order-independent.
        let seen = store.seen().unwrap();
        assert_eq!(seen.len(), 2);
        assert!(seen.contains("v1") && seen.contains("v2"));
    }

    #[test]
    fn test_mark_seen_is_idempotent() {
        let (_dir, store) = temp_store();
        assert!(store.mark_seen("v1").unwrap());
        assert!(!store.mark_seen("v1").unwrap());

        assert_eq!(store.seen().unwrap().len(), 1);
        assert!(!store.is_unseen("v1").unwrap());
        assert!(store.is_unseen("v2").unwrap());
    }

    #[test]
    fn test_mark_all_seen_counts_new_ids_only() {
        let (_dir, store) = temp_store();
        store.mark_seen("v1").unwrap();

        let added = store
            .mark_all_seen(&["v1".into(), "v2".into(), "v3".into()])
            .unwrap();
        assert_eq!(added, 2);
        assert_eq!(store.seen().unwrap().len(), 3);
    }

    #[test]
    fn test_replace_videos_is_a_full_swap() {
        let (_dir, store) = temp_store();
        store
            .replace_videos(vec![video("v1", "UCaaaaaaaaaaaaaaaaaaaaaa")])
            .unwrap();
        store
            .replace_videos(vec![video("v2", "UCaaaaaaaaaaaaaaaaaaaaaa")])
            .unwrap();

        let videos = store.videos().unwrap();
        assert_eq!(videos.len(), 1);
        assert_eq!(videos[0].id, "v2");
    }

    #[test]
    fn test_delete_channel_cascades_to_its_videos_only() {
        let (_dir, store) = temp_store();
        store.add_channel(channel("UCaaaaaaaaaaaaaaaaaaaaaa")).unwrap();
        store.add_channel(channel("UCbbbbbbbbbbbbbbbbbbbbbb")).unwrap();
        store
            .replace_videos(vec![
                video("v1", "UCaaaaaaaaaaaaaaaaaaaaaa"),
                video("v2", "UCbbbbbbbbbbbbbbbbbbbbbb"),
                video("v3", "UCaaaaaaaaaaaaaaaaaaaaaa"),
            ])
            .unwrap();

        let removed = store.delete_channel("UCaaaaaaaaaaaaaaaaaaaaaa").unwrap();
        assert_eq!(removed.id, "UCaaaaaaaaaaaaaaaaaaaaaa");

        assert_eq!(store.channels().unwrap().len(), 1);
        let videos = store.videos().unwrap();
        assert_eq!(videos.len(), 1);
        assert_eq!(videos[0].id, "v2");
    }

    #[test]
    fn test_delete_missing_channel_is_an_error() {
        let (_dir, store) = temp_store();
        assert!(matches!(
            store.delete_channel("UCaaaaaaaaaaaaaaaaaaaaaa"),
            Err(FreshetError::ChannelNotFound(_))
        ));
    }

    #[test]
    fn test_update_channel_same_id_keeps_videos() {
        let (_dir, store) = temp_store();
        store.add_channel(channel("UCaaaaaaaaaaaaaaaaaaaaaa")).unwrap();
        store
            .replace_videos(vec![video("v1", "UCaaaaaaaaaaaaaaaaaaaaaa")])
            .unwrap();

        let mut renamed = channel("UCaaaaaaaaaaaaaaaaaaaaaa");
        renamed.name = "New Name".into();
        store
            .update_channel("UCaaaaaaaaaaaaaaaaaaaaaa", renamed)
            .unwrap();

        assert_eq!(store.channels().unwrap()[0].name, "New Name");
        assert_eq!(store.videos().unwrap().len(), 1);
    }

    #[test]
    fn test_update_channel_new_id_purges_old_videos() {
        let (_dir, store) = temp_store();
        store.add_channel(channel("UCaaaaaaaaaaaaaaaaaaaaaa")).unwrap();
        store
            .replace_videos(vec![
                video("v1", "UCaaaaaaaaaaaaaaaaaaaaaa"),
                video("v2", "UCbbbbbbbbbbbbbbbbbbbbbb"),
            ])
            .unwrap();

        store
            .update_channel(
                "UCaaaaaaaaaaaaaaaaaaaaaa",
                channel("UCcccccccccccccccccccccc"),
            )
            .unwrap();

        let channels = store.channels().unwrap();
        assert_eq!(channels.len(), 1);
        assert_eq!(channels[0].id, "UCcccccccccccccccccccccc");

        // Old id's videos are gone; other channels are untouched.
        let videos = store.videos().unwrap();
        assert_eq!(videos.len(), 1);
        assert_eq!(videos[0].id, "v2");
    }

    #[test]
    fn test_update_channel_to_an_already_tracked_id_rejected() {
        let (_dir, store) = temp_store();
        store.add_channel(channel("UCaaaaaaaaaaaaaaaaaaaaaa")).unwrap();
        store.add_channel(channel("UCbbbbbbbbbbbbbbbbbbbbbb")).unwrap();
        store
            .replace_videos(vec![video("v1", "UCaaaaaaaaaaaaaaaaaaaaaa")])
            .unwrap();

        let err = store
            .update_channel(
                "UCaaaaaaaaaaaaaaaaaaaaaa",
                channel("UCbbbbbbbbbbbbbbbbbbbbbb"),
            )
            .unwrap_err();
        assert!(matches!(err, FreshetError::ChannelAlreadyTracked(_)));

        // Nothing changed: each id is tracked exactly once and the old
        // id's videos survive.
        let channels = store.channels().unwrap();
        let ids: Vec<&str> = channels.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["UCaaaaaaaaaaaaaaaaaaaaaa", "UCbbbbbbbbbbbbbbbbbbbbbb"]);
        assert_eq!(store.videos().unwrap().len(), 1);
    }

    #[test]
    fn test_set_channel_thumbnail() {
        let (_dir, store) = temp_store();
        store.add_channel(channel("UCaaaaaaaaaaaaaaaaaaaaaa")).unwrap();
        store
            .set_channel_thumbnail("UCaaaaaaaaaaaaaaaaaaaaaa", "https://a.example/x.jpg")
            .unwrap();

        assert_eq!(
            store.channels().unwrap()[0].thumbnail,
            "https://a.example/x.jpg"
        );
    }

    #[test]
    fn test_view_mode_defaults_to_videos_and_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");

        let store = JsonStore::open(&path).unwrap();
        assert_eq!(store.view_mode().unwrap(), ViewMode::Videos);
        store.set_view_mode(ViewMode::Channels).unwrap();
        drop(store);

        let store = JsonStore::open(&path).unwrap();
        assert_eq!(store.view_mode().unwrap(), ViewMode::Channels);
    }

    #[test]
    fn test_missing_fields_in_state_file_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        fs::write(&path, r#"{"seen_videos":["v1"]}"#).unwrap();

        let store = JsonStore::open(&path).unwrap();
        assert!(store.channels().unwrap().is_empty());
        assert!(store.seen().unwrap().contains("v1"));
        assert_eq!(store.view_mode().unwrap(), ViewMode::Videos);
    }
}
