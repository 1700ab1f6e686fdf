//! Server-side state: sessions, tokens, the liked-tracks cache and the
//! duplicate-safe playlist insertion.

pub mod guard;
pub mod liked;
pub mod pagination;
pub mod session;

mod auth;
mod state;

pub use auth::TokenManager;
pub use liked::{CacheConfig, Clock, LikedTracksCache, SystemClock};
pub use session::{Session, SessionStore};
pub use state::AppState;
