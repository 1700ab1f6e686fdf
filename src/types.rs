use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    pub refresh_token: String,
    pub scope: String,
    pub expires_in: u64,
    pub obtained_at: u64,
}

/// Raw body of the accounts service token endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub scope: Option<String>,
    pub expires_in: Option<u64>,
}

/// One entry of the liked-tracks snapshot, also the shape returned by
/// `/api/liked_tracks`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LikedTrack {
    pub id: String,
    pub name: String,
    pub artist: String,
    pub coverart: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SavedTracksPage {
    #[serde(default)]
    pub items: Vec<SavedTrackItem>,
    #[serde(default)]
    pub total: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedTrackItem {
    pub track: Option<FullTrack>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FullTrack {
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub artists: Vec<ArtistRef>,
    pub album: Option<AlbumRef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtistRef {
    pub name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AlbumRef {
    #[serde(default)]
    pub images: Vec<Image>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Image {
    pub url: String,
}

/// Playlist items page requested with `fields=items.track.uri,total`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlaylistUrisPage {
    #[serde(default)]
    pub items: Vec<PlaylistUriItem>,
    #[serde(default)]
    pub total: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistUriItem {
    pub track: Option<TrackUri>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackUri {
    pub uri: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserProfile {
    pub id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GetUserPlaylistsResponse {
    #[serde(default)]
    pub items: Vec<SimplePlaylist>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SimplePlaylist {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub tracks: PlaylistTracksRef,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlaylistTracksRef {
    #[serde(default)]
    pub total: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AddedAtPage {
    #[serde(default)]
    pub items: Vec<AddedAtItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AddedAtItem {
    pub added_at: Option<String>,
}

/// Playlist requested with `fields=name,public,tracks.items(track(name,artists(name),id))`.
#[derive(Debug, Clone, Deserialize)]
pub struct PlaylistDetails {
    pub name: String,
    pub public: Option<bool>,
    #[serde(default)]
    pub tracks: PlaylistDetailTracks,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlaylistDetailTracks {
    #[serde(default)]
    pub items: Vec<PlaylistDetailItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlaylistDetailItem {
    pub track: Option<FullTrack>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePlaylistRequest {
    pub name: String,
    pub description: String,
    pub public: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddTrackToPlaylistRequest {
    pub uris: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RemoveTracksRequest {
    pub tracks: Vec<UriRef>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UriRef {
    pub uri: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ChangePlaylistDetailsRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public: Option<bool>,
}

// Incoming request bodies and query strings. Every field is optional so that
// missing values are reported as malformed requests rather than rejections.

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LikedTracksParams {
    pub offset: Option<usize>,
    pub q: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewPlaylistBody {
    pub name: Option<String>,
    #[serde(default)]
    pub public: bool,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TrackSelectionBody {
    pub playlist_id: Option<String>,
    pub track_ids: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdatePlaylistBody {
    pub playlist_id: Option<String>,
    pub name: Option<String>,
    pub public: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RenameBody {
    pub name: Option<String>,
}

// Response shapes of the JSON API.

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlaylistSummary {
    pub id: String,
    pub name: String,
    pub tracks_total: u64,
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlaylistView {
    pub name: String,
    pub public: Option<bool>,
    pub tracks: Vec<PlaylistTrackRow>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlaylistTrackRow {
    pub id: Option<String>,
    pub name: String,
    pub artist: String,
}
