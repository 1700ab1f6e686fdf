//! # API Module
//!
//! HTTP handlers of the playlist bridge.
//!
//! ## Endpoints
//!
//! ### Authentication
//!
//! - [`login`] - starts the OAuth authorization code flow (PKCE)
//! - [`callback`] - exchanges the returned code for a token
//! - [`logout`] - drops the browser's session
//!
//! ### JSON API
//!
//! Every handler below needs an authenticated session and answers
//! `401 {"error":"not_authenticated"}` otherwise.
//!
//! - [`me`] / [`search`] - profile and catalog search passthrough
//! - [`playlists`] / [`playlist_info`] - playlist listing and details
//! - [`create_playlist`] / [`update_playlist`] / [`rename_playlist`]
//! - [`add_tracks`] - duplicate-safe insertion
//! - [`remove_tracks`]
//! - [`liked_tracks`] - saved tracks, searchable through the cache
//!
//! ### Monitoring
//!
//! - [`health`] - status and version

mod callback;
mod extract;
mod health;
mod liked;
mod me;
mod playlists;
mod tracks;

pub use callback::{callback, login, logout};
pub use extract::{Authorized, JsonBody, QueryParams};
pub use health::health;
pub use liked::liked_tracks;
pub use me::{me, search};
pub use playlists::{
    create_playlist, playlist_info, playlists, rename_playlist, summarize, to_view,
    update_playlist,
};
pub use tracks::{add_tracks, remove_tracks};
