//! Duplicate-safe insertion of tracks into a playlist.
//!
//! Spotify happily stores the same track twice in a playlist, so before
//! adding anything the guard reads the playlist's full track list and refuses
//! the whole request if any requested track is already there.

use std::collections::HashSet;

use serde_json::Value;

use crate::{
    AppError, Res,
    management::pagination::{self, Page},
    spotify::SpotifyApi,
    utils,
};

pub const PLAYLIST_PAGE_SIZE: u32 = 100;

/// Most URIs Spotify accepts in one add-items call.
pub const MAX_URIS_PER_REQUEST: usize = 100;

/// Checks the request shape and maps the ids to track URIs.
///
/// Runs before any remote call, so a malformed request never reaches Spotify.
pub fn requested_uris(playlist_id: &str, track_ids: &[String]) -> Res<Vec<String>> {
    if playlist_id.trim().is_empty() || track_ids.is_empty() {
        return Err(AppError::malformed("missing playlist_id or track_ids"));
    }
    if track_ids.iter().any(|id| id.trim().is_empty()) {
        return Err(AppError::malformed("track_ids must not contain empty ids"));
    }
    if track_ids.len() > MAX_URIS_PER_REQUEST {
        return Err(AppError::malformed(format!(
            "at most {MAX_URIS_PER_REQUEST} track_ids per request"
        )));
    }

    Ok(utils::track_uris(track_ids))
}

/// Adds `track_ids` to the playlist unless any of them is already present.
///
/// All or nothing: either every track is new and all of them are sent in a
/// single add-items call, or nothing is added and
/// [`AppError::DuplicateTracks`] lists the conflicting URIs in request order.
/// On success the service response is returned unchanged.
pub async fn add_tracks_safely<C>(client: &C, playlist_id: &str, track_ids: &[String]) -> Res<Value>
where
    C: SpotifyApi + ?Sized,
{
    let uris_to_add = requested_uris(playlist_id, track_ids)?;

    let existing = existing_track_uris(client, playlist_id).await?;
    let duplicate_uris = find_duplicates(&uris_to_add, &existing);
    if !duplicate_uris.is_empty() {
        tracing::info!(playlist_id, duplicates = duplicate_uris.len(), "rejected duplicate tracks");
        return Err(AppError::DuplicateTracks { duplicate_uris });
    }

    let response = client.add_items(playlist_id, &uris_to_add).await?;
    tracing::info!(playlist_id, added = uris_to_add.len(), "tracks added to playlist");
    Ok(response)
}

/// Every non-null track URI currently in the playlist.
pub async fn existing_track_uris<C>(client: &C, playlist_id: &str) -> Res<Vec<String>>
where
    C: SpotifyApi + ?Sized,
{
    let items = pagination::collect_pages(
        PLAYLIST_PAGE_SIZE,
        pagination::MAX_PAGES,
        move |offset| async move {
            let page = client
                .playlist_track_uris(playlist_id, PLAYLIST_PAGE_SIZE, offset)
                .await?;
            Ok(Page {
                items: page.items,
                total: page.total,
            })
        },
    )
    .await?;

    Ok(items
        .into_iter()
        .filter_map(|item| item.track.and_then(|t| t.uri))
        .collect())
}

/// URIs of `to_add` that also appear in `existing`, in `to_add` order.
pub fn find_duplicates(to_add: &[String], existing: &[String]) -> Vec<String> {
    let existing: HashSet<&str> = existing.iter().map(String::as_str).collect();
    to_add
        .iter()
        .filter(|uri| existing.contains(uri.as_str()))
        .cloned()
        .collect()
}
