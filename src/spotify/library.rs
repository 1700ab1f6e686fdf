use crate::{Res, spotify::SpotifyClient, types::SavedTracksPage};

/// Largest page `/me/tracks` accepts.
pub const SAVED_TRACKS_MAX_LIMIT: u32 = 50;

impl SpotifyClient {
    /// `GET /me/tracks`: one page of the user's saved tracks, newest first.
    pub async fn saved_tracks(&self, limit: u32, offset: u32) -> Res<SavedTracksPage> {
        let limit = limit.clamp(1, SAVED_TRACKS_MAX_LIMIT);
        self.get_json(
            "me/tracks",
            &[("limit", limit.to_string()), ("offset", offset.to_string())],
        )
        .await
    }
}
