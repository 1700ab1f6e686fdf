#![allow(dead_code)]

use std::sync::{
    Arc, Mutex,
    atomic::{AtomicI64, Ordering},
};

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use playlist_bridge::{
    AppError, Res,
    management::Clock,
    spotify::SpotifyApi,
    types::{
        AlbumRef, ArtistRef, FullTrack, Image, PlaylistUriItem, PlaylistUrisPage,
        SavedTrackItem, SavedTracksPage, TrackUri,
    },
};
use serde_json::{Value, json};

/// Clock that only moves when told to.
pub struct ManualClock {
    secs: AtomicI64,
}

impl ManualClock {
    pub fn new() -> Arc<Self> {
        Arc::new(ManualClock {
            secs: AtomicI64::new(1_700_000_000),
        })
    }

    pub fn advance(&self, by: TimeDelta) {
        self.secs.fetch_add(by.num_seconds(), Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.secs.load(Ordering::SeqCst), 0)
            .single()
            .unwrap_or_default()
    }
}

#[derive(Default)]
pub struct FakeState {
    pub saved: Vec<SavedTrackItem>,
    pub playlist: Vec<PlaylistUriItem>,
    /// Reported instead of the real length when set.
    pub saved_total: Option<u64>,
    /// Saved-tracks requests at this offset fail with a 500.
    pub fail_saved_at: Option<u32>,
    pub saved_calls: usize,
    pub playlist_calls: usize,
    pub add_calls: Vec<(String, Vec<String>)>,
}

/// In-memory stand-in for the Spotify Web API.
#[derive(Default)]
pub struct FakeSpotify {
    pub state: Mutex<FakeState>,
}

impl FakeSpotify {
    pub fn with_saved(tracks: Vec<FullTrack>) -> Self {
        let fake = FakeSpotify::default();
        fake.set_saved(tracks);
        fake
    }

    pub fn with_playlist(uris: &[&str]) -> Self {
        let fake = FakeSpotify::default();
        fake.state.lock().unwrap().playlist = uris
            .iter()
            .map(|uri| PlaylistUriItem {
                track: Some(TrackUri {
                    uri: Some(uri.to_string()),
                }),
            })
            .collect();
        fake
    }

    pub fn set_saved(&self, tracks: Vec<FullTrack>) {
        self.state.lock().unwrap().saved = tracks
            .into_iter()
            .map(|track| SavedTrackItem { track: Some(track) })
            .collect();
    }

    pub fn saved_calls(&self) -> usize {
        self.state.lock().unwrap().saved_calls
    }

    pub fn playlist_calls(&self) -> usize {
        self.state.lock().unwrap().playlist_calls
    }

    pub fn add_calls(&self) -> Vec<(String, Vec<String>)> {
        self.state.lock().unwrap().add_calls.clone()
    }
}

fn page_of<T: Clone>(items: &[T], limit: u32, offset: u32) -> Vec<T> {
    items
        .iter()
        .skip(offset as usize)
        .take(limit as usize)
        .cloned()
        .collect()
}

#[async_trait]
impl SpotifyApi for FakeSpotify {
    async fn saved_tracks(&self, limit: u32, offset: u32) -> Res<SavedTracksPage> {
        let mut state = self.state.lock().unwrap();
        state.saved_calls += 1;
        if state.fail_saved_at == Some(offset) {
            return Err(AppError::Upstream {
                status: 500,
                message: "boom".to_string(),
            });
        }
        Ok(SavedTracksPage {
            items: page_of(&state.saved, limit, offset),
            total: state.saved_total.unwrap_or(state.saved.len() as u64),
        })
    }

    async fn playlist_track_uris(
        &self,
        _playlist_id: &str,
        limit: u32,
        offset: u32,
    ) -> Res<PlaylistUrisPage> {
        let mut state = self.state.lock().unwrap();
        state.playlist_calls += 1;
        Ok(PlaylistUrisPage {
            items: page_of(&state.playlist, limit, offset),
            total: state.playlist.len() as u64,
        })
    }

    async fn add_items(&self, playlist_id: &str, uris: &[String]) -> Res<Value> {
        let mut state = self.state.lock().unwrap();
        state
            .add_calls
            .push((playlist_id.to_string(), uris.to_vec()));
        for uri in uris {
            state.playlist.push(PlaylistUriItem {
                track: Some(TrackUri {
                    uri: Some(uri.clone()),
                }),
            });
        }
        Ok(json!({ "snapshot_id": format!("snap-{}", state.add_calls.len()) }))
    }
}

pub fn track(id: &str, name: &str, artists: &[&str]) -> FullTrack {
    FullTrack {
        id: Some(id.to_string()),
        name: name.to_string(),
        artists: artists
            .iter()
            .map(|a| ArtistRef {
                name: a.to_string(),
            })
            .collect(),
        album: Some(AlbumRef {
            images: vec![Image {
                url: format!("https://img.example/{id}.jpg"),
            }],
        }),
    }
}

/// `count` distinct tracks named "Song N" by "Artist N".
pub fn numbered_tracks(count: usize) -> Vec<FullTrack> {
    (0..count)
        .map(|n| track(&format!("t{n}"), &format!("Song {n}"), &[&format!("Artist {n}")]))
        .collect()
}

pub fn ids(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}
