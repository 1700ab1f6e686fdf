use axum::Json;

use crate::{
    Res,
    api::{Authorized, QueryParams},
    management::liked::{self, DEFAULT_SEARCH_LIMIT},
    types::{LikedTrack, LikedTracksParams},
};

/// Saved tracks, 20 at a time.
///
/// Without `q` the page comes straight from Spotify at `offset`. With `q` the
/// whole collection is searched through the liked-tracks cache and `offset`
/// applies to the matches.
pub async fn liked_tracks(
    auth: Authorized,
    QueryParams(params): QueryParams<LikedTracksParams>,
) -> Res<Json<Vec<LikedTrack>>> {
    let offset = params.offset.unwrap_or(0);
    let query = params.q.unwrap_or_default().to_lowercase();
    let client = auth.client().await?;

    if query.is_empty() {
        let offset = u32::try_from(offset).unwrap_or(u32::MAX);
        let page = client
            .saved_tracks(DEFAULT_SEARCH_LIMIT as u32, offset)
            .await?;
        let tracks = page
            .items
            .into_iter()
            .filter_map(|item| item.track)
            .filter_map(liked::to_liked_track)
            .collect();
        return Ok(Json(tracks));
    }

    let identity = auth.state.user_id(&auth.session_id, &client).await?;
    let all = auth.state.liked_cache.get_all(&client, &identity).await?;
    Ok(Json(liked::search_tracks(
        &all,
        &query,
        offset,
        DEFAULT_SEARCH_LIMIT,
    )))
}
