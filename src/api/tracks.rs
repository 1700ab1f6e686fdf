use axum::Json;
use serde_json::{Value, json};

use crate::{
    Res,
    api::{Authorized, JsonBody},
    management::guard,
    types::TrackSelectionBody,
};

/// Adds tracks to a playlist, refusing the whole request if any of them is
/// already in it.
pub async fn add_tracks(
    auth: Authorized,
    JsonBody(body): JsonBody<TrackSelectionBody>,
) -> Res<Json<Value>> {
    let playlist_id = body.playlist_id.unwrap_or_default();
    let track_ids = body.track_ids.unwrap_or_default();
    guard::requested_uris(&playlist_id, &track_ids)?;

    let client = auth.client().await?;
    let response = guard::add_tracks_safely(&client, &playlist_id, &track_ids).await?;
    Ok(Json(response))
}

/// Removes every occurrence of the given tracks from a playlist.
pub async fn remove_tracks(
    auth: Authorized,
    JsonBody(body): JsonBody<TrackSelectionBody>,
) -> Res<Json<Value>> {
    let playlist_id = body.playlist_id.unwrap_or_default();
    let track_ids = body.track_ids.unwrap_or_default();
    let uris = guard::requested_uris(&playlist_id, &track_ids)?;

    let client = auth.client().await?;
    client.remove_all_occurrences(&playlist_id, &uris).await?;
    Ok(Json(json!({ "status": "ok" })))
}
