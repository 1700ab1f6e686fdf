use axum::{Json, extract::Path};
use futures::{StreamExt, stream};
use serde_json::{Value, json};

use crate::{
    AppError, Res,
    api::{Authorized, JsonBody},
    spotify::SpotifyClient,
    types::{
        ChangePlaylistDetailsRequest, CreatePlaylistRequest, NewPlaylistBody, PlaylistDetails,
        PlaylistSummary, PlaylistTrackRow, PlaylistView, RenameBody, SimplePlaylist,
        UpdatePlaylistBody,
    },
    utils,
};

pub const PLAYLISTS_LIMIT: u32 = 50;

/// First-item lookups in flight at once while listing playlists.
pub const ENRICH_CONCURRENCY: usize = 4;

/// The user's first playlists, each with the `added_at` of its first item as
/// an indicative creation date.
pub async fn playlists(auth: Authorized) -> Res<Json<Vec<PlaylistSummary>>> {
    let client = auth.client().await?;
    let listed = client.current_user_playlists(PLAYLISTS_LIMIT).await?;

    let summaries = stream::iter(listed.items)
        .map(move |playlist| {
            let client = client.clone();
            async move {
                let created_at = first_added_at(&client, &playlist.id).await;
                summarize(playlist, created_at)
            }
        })
        .buffered(ENRICH_CONCURRENCY)
        .collect::<Vec<_>>()
        .await;

    Ok(Json(summaries))
}

/// Best effort: any failure leaves the date out instead of failing the list.
async fn first_added_at(client: &SpotifyClient, playlist_id: &str) -> Option<String> {
    match client.first_item_added_at(playlist_id).await {
        Ok(added_at) => added_at,
        Err(e) => {
            tracing::debug!(playlist_id, error = %e, "no creation date for playlist");
            None
        }
    }
}

pub fn summarize(playlist: SimplePlaylist, created_at: Option<String>) -> PlaylistSummary {
    PlaylistSummary {
        id: playlist.id,
        name: playlist.name,
        tracks_total: playlist.tracks.total,
        created_at,
    }
}

pub async fn playlist_info(
    auth: Authorized,
    Path(playlist_id): Path<String>,
) -> Res<Json<PlaylistView>> {
    let client = auth.client().await?;
    let details = client.playlist(&playlist_id).await?;
    Ok(Json(to_view(details)))
}

pub fn to_view(details: PlaylistDetails) -> PlaylistView {
    let tracks = details
        .tracks
        .items
        .into_iter()
        .filter_map(|item| item.track)
        .map(|track| PlaylistTrackRow {
            artist: utils::join_artist_names(&track.artists),
            id: track.id,
            name: track.name,
        })
        .collect();

    PlaylistView {
        name: details.name,
        public: details.public,
        tracks,
    }
}

pub async fn create_playlist(
    auth: Authorized,
    JsonBody(body): JsonBody<NewPlaylistBody>,
) -> Res<Json<Value>> {
    let name = non_blank(body.name).ok_or_else(|| AppError::malformed("missing name"))?;

    let client = auth.client().await?;
    let user_id = auth.state.user_id(&auth.session_id, &client).await?;
    let request = CreatePlaylistRequest {
        name,
        description: body.description,
        public: body.public,
    };

    Ok(Json(client.create_playlist(&user_id, &request).await?))
}

pub async fn update_playlist(
    auth: Authorized,
    JsonBody(body): JsonBody<UpdatePlaylistBody>,
) -> Res<Json<Value>> {
    let playlist_id =
        non_blank(body.playlist_id).ok_or_else(|| AppError::malformed("missing playlist_id"))?;
    let changes = ChangePlaylistDetailsRequest {
        name: non_blank(body.name),
        public: body.public,
    };
    if changes.name.is_none() && changes.public.is_none() {
        return Err(AppError::malformed("nothing to update"));
    }

    let client = auth.client().await?;
    client.change_details(&playlist_id, &changes).await?;
    Ok(Json(json!({ "status": "ok" })))
}

pub async fn rename_playlist(
    auth: Authorized,
    Path(playlist_id): Path<String>,
    JsonBody(body): JsonBody<RenameBody>,
) -> Res<Json<Value>> {
    let name =
        non_blank(body.name).ok_or_else(|| AppError::malformed("missing_track_name"))?;

    let client = auth.client().await?;
    let changes = ChangePlaylistDetailsRequest {
        name: Some(name.clone()),
        public: None,
    };
    client.change_details(&playlist_id, &changes).await?;
    Ok(Json(json!({ "status": "ok", "name": name })))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
