//! In-memory snapshot of every saved ("liked") track, per identity.
//!
//! A snapshot is either absent or complete: it is built off to the side and
//! swapped in with a single insert once every page has been fetched. A failed
//! page leaves the previous snapshot and its timestamp untouched.

use std::{collections::HashMap, sync::Arc};

use chrono::{DateTime, TimeDelta, Utc};
use tokio::sync::RwLock;

use crate::{
    Res,
    management::pagination::{self, Page},
    spotify::SpotifyApi,
    types::{FullTrack, LikedTrack},
    utils,
};

pub const LIKED_PAGE_SIZE: u32 = 50;
pub const DEFAULT_TTL_SECS: i64 = 300;
pub const DEFAULT_SEARCH_LIMIT: usize = 20;

/// Source of the current time for TTL checks.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub ttl: TimeDelta,
    pub page_size: u32,
    pub max_pages: u32,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: TimeDelta::seconds(DEFAULT_TTL_SECS),
            page_size: LIKED_PAGE_SIZE,
            max_pages: pagination::MAX_PAGES,
        }
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    tracks: Arc<Vec<LikedTrack>>,
    refreshed_at: DateTime<Utc>,
}

pub struct LikedTracksCache {
    config: CacheConfig,
    clock: Arc<dyn Clock>,
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl LikedTracksCache {
    pub fn new(config: CacheConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: CacheConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            config,
            clock,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Returns every saved track of `identity`.
    ///
    /// Served from the snapshot while it is younger than the TTL; otherwise
    /// the whole collection is fetched again and replaces the snapshot. The
    /// lock is not held during the fetch: two stale readers may both fetch,
    /// and the last one to finish wins.
    pub async fn get_all<C>(&self, client: &C, identity: &str) -> Res<Arc<Vec<LikedTrack>>>
    where
        C: SpotifyApi + ?Sized,
    {
        if let Some(tracks) = self.fresh(identity).await {
            tracing::debug!(identity, count = tracks.len(), "liked tracks served from cache");
            return Ok(tracks);
        }

        let tracks = Arc::new(
            fetch_all_liked_tracks(client, self.config.page_size, self.config.max_pages).await?,
        );
        let entry = CacheEntry {
            tracks: Arc::clone(&tracks),
            refreshed_at: self.clock.now(),
        };
        self.entries.write().await.insert(identity.to_string(), entry);

        tracing::info!(identity, count = tracks.len(), "liked tracks snapshot refreshed");
        Ok(tracks)
    }

    async fn fresh(&self, identity: &str) -> Option<Arc<Vec<LikedTrack>>> {
        let now = self.clock.now();
        let entries = self.entries.read().await;
        let entry = entries.get(identity)?;
        (now.signed_duration_since(entry.refreshed_at) < self.config.ttl)
            .then(|| Arc::clone(&entry.tracks))
    }

    /// Drops the snapshot of `identity`; the next read fetches again.
    pub async fn invalidate(&self, identity: &str) -> bool {
        self.entries.write().await.remove(identity).is_some()
    }

    /// Number of identities holding a snapshot.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

/// Fetches the complete saved-tracks collection, page by page.
pub async fn fetch_all_liked_tracks<C>(
    client: &C,
    page_size: u32,
    max_pages: u32,
) -> Res<Vec<LikedTrack>>
where
    C: SpotifyApi + ?Sized,
{
    let items = pagination::collect_pages(page_size, max_pages, move |offset| async move {
        let page = client.saved_tracks(page_size, offset).await?;
        Ok(Page {
            items: page.items,
            total: page.total,
        })
    })
    .await?;

    Ok(items
        .into_iter()
        .filter_map(|item| item.track)
        .filter_map(to_liked_track)
        .collect())
}

/// Maps a track object to a snapshot record.
///
/// Tracks without an id (local files) are dropped. An album without images
/// yields `coverart: None`.
pub fn to_liked_track(track: FullTrack) -> Option<LikedTrack> {
    let id = track.id?;
    let coverart = track
        .album
        .and_then(|album| album.images.into_iter().next())
        .map(|image| image.url);

    Some(LikedTrack {
        id,
        artist: utils::join_artist_names(&track.artists),
        name: track.name,
        coverart,
    })
}

/// Case-insensitive substring search over a snapshot, then offset/limit.
///
/// A record matches when its lower-cased name or artist contains the
/// lower-cased query. Matches keep their snapshot order.
pub fn search_tracks(
    tracks: &[LikedTrack],
    query: &str,
    offset: usize,
    limit: usize,
) -> Vec<LikedTrack> {
    let query = query.to_lowercase();
    tracks
        .iter()
        .filter(|t| {
            t.name.to_lowercase().contains(&query) || t.artist.to_lowercase().contains(&query)
        })
        .skip(offset)
        .take(limit)
        .cloned()
        .collect()
}
