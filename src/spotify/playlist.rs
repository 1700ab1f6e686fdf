use serde_json::Value;

use crate::{
    AppError, Res,
    spotify::SpotifyClient,
    types::{
        AddTrackToPlaylistRequest, AddedAtPage, ChangePlaylistDetailsRequest,
        CreatePlaylistRequest, GetUserPlaylistsResponse, PlaylistDetails, PlaylistUrisPage,
        RemoveTracksRequest, UriRef,
    },
};

pub const PLAYLIST_DETAIL_FIELDS: &str = "name,public,tracks.items(track(name,artists(name),id))";
pub const PLAYLIST_URI_FIELDS: &str = "items.track.uri,total";

/// Builds `playlists/{id}{suffix}`, rejecting ids that are not plain base62.
fn playlist_path(playlist_id: &str, suffix: &str) -> Res<String> {
    if playlist_id.is_empty() || !playlist_id.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(AppError::malformed("invalid playlist_id"));
    }
    Ok(format!("playlists/{playlist_id}{suffix}"))
}

impl SpotifyClient {
    /// `GET /me/playlists`
    pub async fn current_user_playlists(&self, limit: u32) -> Res<GetUserPlaylistsResponse> {
        self.get_json("me/playlists", &[("limit", limit.to_string())])
            .await
    }

    /// `GET /playlists/{id}` restricted to name, visibility and track rows.
    pub async fn playlist(&self, playlist_id: &str) -> Res<PlaylistDetails> {
        let path = playlist_path(playlist_id, "")?;
        self.get_json(&path, &[("fields", PLAYLIST_DETAIL_FIELDS.to_string())])
            .await
    }

    /// `added_at` of the first item, `None` for an empty playlist.
    pub async fn first_item_added_at(&self, playlist_id: &str) -> Res<Option<String>> {
        let path = playlist_path(playlist_id, "/tracks")?;
        let page: AddedAtPage = self
            .get_json(
                &path,
                &[
                    ("limit", "1".to_string()),
                    ("fields", "items(added_at)".to_string()),
                ],
            )
            .await?;

        Ok(page.items.into_iter().next().and_then(|i| i.added_at))
    }

    pub async fn playlist_track_uris(
        &self,
        playlist_id: &str,
        limit: u32,
        offset: u32,
    ) -> Res<PlaylistUrisPage> {
        let path = playlist_path(playlist_id, "/tracks")?;
        self.get_json(
            &path,
            &[
                ("fields", PLAYLIST_URI_FIELDS.to_string()),
                ("offset", offset.to_string()),
                ("limit", limit.to_string()),
            ],
        )
        .await
    }

    /// `POST /users/{user_id}/playlists`, returned as the raw playlist object.
    pub async fn create_playlist(
        &self,
        user_id: &str,
        request: &CreatePlaylistRequest,
    ) -> Res<Value> {
        let url = self.url(&format!("users/{user_id}/playlists"));
        let response = self.send(|http| http.post(&url).json(request)).await?;
        Ok(response.json::<Value>().await?)
    }

    /// `POST /playlists/{id}/tracks`
    pub async fn add_items(&self, playlist_id: &str, uris: &[String]) -> Res<Value> {
        let url = self.url(&playlist_path(playlist_id, "/tracks")?);
        let body = AddTrackToPlaylistRequest {
            uris: uris.to_vec(),
        };
        let response = self.send(|http| http.post(&url).json(&body)).await?;
        Ok(response.json::<Value>().await?)
    }

    /// `DELETE /playlists/{id}/tracks`: drops every occurrence of each URI.
    pub async fn remove_all_occurrences(&self, playlist_id: &str, uris: &[String]) -> Res<Value> {
        let url = self.url(&playlist_path(playlist_id, "/tracks")?);
        let body = RemoveTracksRequest {
            tracks: uris.iter().map(|uri| UriRef { uri: uri.clone() }).collect(),
        };
        let response = self.send(|http| http.delete(&url).json(&body)).await?;
        Ok(response.json::<Value>().await?)
    }

    /// `PUT /playlists/{id}`; fields left as `None` are not changed.
    pub async fn change_details(
        &self,
        playlist_id: &str,
        changes: &ChangePlaylistDetailsRequest,
    ) -> Res<()> {
        let url = self.url(&playlist_path(playlist_id, "")?);
        self.send(|http| http.put(&url).json(changes)).await?;
        Ok(())
    }
}
