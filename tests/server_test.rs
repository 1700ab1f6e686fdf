//! Drives the bridge over HTTP against a local stand-in for the Spotify
//! accounts service and Web API.

use std::{
    collections::HashMap,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};

use axum::{
    Extension, Json, Router,
    extract::{Path, Query},
    http::{StatusCode, header},
    routing::{get, post},
};
use playlist_bridge::{
    config::AppConfig,
    management::{AppState, LikedTracksCache},
    server, spotify,
};
use reqwest::{Client, redirect::Policy};
use serde_json::{Value, json};
use tokio::net::TcpListener;

/// Saved tracks in the mock library: "Song N" by "Artist N".
const LIBRARY_SIZE: usize = 45;

#[derive(Default)]
struct Upstream {
    added: Mutex<Vec<(String, Vec<String>)>>,
    saved_requests: AtomicUsize,
}

async fn token() -> Json<Value> {
    Json(json!({
        "access_token": "access-1",
        "refresh_token": "refresh-1",
        "scope": "playlist-modify-private",
        "expires_in": 3600
    }))
}

async fn me() -> Json<Value> {
    Json(json!({ "id": "alice", "display_name": "Alice" }))
}

fn query_number(query: &HashMap<String, String>, name: &str, default: usize) -> usize {
    query
        .get(name)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

async fn saved_tracks(
    Extension(upstream): Extension<Arc<Upstream>>,
    Query(query): Query<HashMap<String, String>>,
) -> Json<Value> {
    upstream.saved_requests.fetch_add(1, Ordering::SeqCst);
    let limit = query_number(&query, "limit", 20);
    let offset = query_number(&query, "offset", 0);
    let items: Vec<Value> = (offset..LIBRARY_SIZE.min(offset + limit))
        .map(|n| {
            json!({ "track": {
                "id": format!("t{n}"),
                "name": format!("Song {n}"),
                "artists": [{ "name": format!("Artist {n}") }],
                "album": { "images": [{ "url": format!("https://img.example/{n}.jpg") }] }
            }})
        })
        .collect();
    Json(json!({ "items": items, "total": LIBRARY_SIZE }))
}

async fn my_playlists() -> Json<Value> {
    Json(json!({ "items": [
        { "id": "good", "name": "Good", "tracks": { "total": 3 } },
        { "id": "broken", "name": "Broken", "tracks": { "total": 7 } },
        { "id": "empty", "name": "Empty", "tracks": { "total": 0 } }
    ]}))
}

async fn playlist_tracks(
    Path(playlist_id): Path<String>,
    Query(query): Query<HashMap<String, String>>,
) -> (StatusCode, Json<Value>) {
    if query.get("fields").map(String::as_str) == Some("items(added_at)") {
        return match playlist_id.as_str() {
            "broken" => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": { "status": 500 } })),
            ),
            "empty" => (StatusCode::OK, Json(json!({ "items": [] }))),
            _ => (
                StatusCode::OK,
                Json(json!({ "items": [{ "added_at": "2024-03-01T10:00:00Z" }] })),
            ),
        };
    }

    (
        StatusCode::OK,
        Json(json!({
            "items": [{ "track": { "uri": "spotify:track:A" } }, { "track": null }],
            "total": 2
        })),
    )
}

async fn add_items(
    Extension(upstream): Extension<Arc<Upstream>>,
    Path(playlist_id): Path<String>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let uris = body["uris"]
        .as_array()
        .map(|uris| {
            uris.iter()
                .filter_map(|u| u.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default();
    upstream.added.lock().unwrap().push((playlist_id, uris));
    (StatusCode::CREATED, Json(json!({ "snapshot_id": "snap-1" })))
}

async fn spawn(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

struct Harness {
    base: String,
    upstream: Arc<Upstream>,
    http: Client,
}

async fn harness() -> Harness {
    let upstream = Arc::new(Upstream::default());
    let mock = Router::new()
        .route("/token", post(token))
        .route("/v1/me", get(me))
        .route("/v1/me/tracks", get(saved_tracks))
        .route("/v1/me/playlists", get(my_playlists))
        .route(
            "/v1/playlists/{playlist_id}/tracks",
            get(playlist_tracks).post(add_items),
        )
        .layer(Extension(upstream.clone()));
    let mock_url = spawn(mock).await;

    let config = AppConfig::from_lookup(|name| match name {
        "SPOTIFY_API_AUTH_CLIENT_ID" => Some("client".to_string()),
        "SPOTIFY_API_REDIRECT_URI" => Some("http://127.0.0.1/callback".to_string()),
        "SPOTIFY_API_TOKEN_URL" => Some(format!("{mock_url}/token")),
        "SPOTIFY_API_URL" => Some(format!("{mock_url}/v1")),
        _ => None,
    })
    .unwrap();
    let http = spotify::build_http_client(config.http_timeout).unwrap();
    let cache = LikedTracksCache::new(config.cache.clone());
    let state = Arc::new(AppState::with_parts(config, http, cache));

    let listener = server::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        server::start_api_server(listener, state).await.unwrap();
    });

    Harness {
        base: format!("http://{addr}"),
        upstream,
        http: Client::builder().redirect(Policy::none()).build().unwrap(),
    }
}

impl Harness {
    /// Runs `/login` and `/callback`, returning the session cookie.
    async fn log_in(&self) -> String {
        let login = self
            .http
            .get(format!("{}/login", self.base))
            .send()
            .await
            .unwrap();
        assert!(login.status().is_redirection());
        let location = login.headers()[header::LOCATION].to_str().unwrap();
        assert!(location.starts_with("https://accounts.spotify.com/authorize?"));
        assert!(location.contains("code_challenge_method=S256"));
        let cookie = login.headers()[header::SET_COOKIE]
            .to_str()
            .unwrap()
            .split(';')
            .next()
            .unwrap()
            .to_string();

        let callback = self
            .http
            .get(format!("{}/callback?code=abc", self.base))
            .header(header::COOKIE, &cookie)
            .send()
            .await
            .unwrap();
        assert!(callback.status().is_redirection());
        assert_eq!(callback.headers()[header::LOCATION], "/");

        cookie
    }

    async fn get_json(&self, cookie: &str, path: &str) -> (StatusCode, Value) {
        let response = self
            .http
            .get(format!("{}{path}", self.base))
            .header(header::COOKIE, cookie)
            .send()
            .await
            .unwrap();
        let status = response.status();
        (status, response.json().await.unwrap())
    }

    async fn add_tracks(&self, cookie: &str, body: Value) -> (StatusCode, Value) {
        let response = self
            .http
            .post(format!("{}/api/add_tracks", self.base))
            .header(header::COOKIE, cookie)
            .json(&body)
            .send()
            .await
            .unwrap();
        let status = response.status();
        (status, response.json().await.unwrap())
    }
}

#[tokio::test]
async fn test_health() {
    let h = harness().await;
    let body: Value = h
        .http
        .get(format!("{}/health", h.base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["status"], "ok");
    assert_eq!(body["name"], "playlist-bridge");
    assert_eq!(body["sessions"], 0);
    assert_eq!(body["liked_snapshots"], 0);
}

#[tokio::test]
async fn test_api_requires_a_session() {
    let h = harness().await;

    let response = h
        .http
        .get(format!("{}/api/me", h.base))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({ "error": "not_authenticated" }));

    let (status, _) = h
        .add_tracks(
            "playlist_bridge_session=unknown",
            json!({ "playlist_id": "p1", "track_ids": ["B"] }),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_callback_without_code() {
    let h = harness().await;
    let response = h
        .http
        .get(format!("{}/callback", h.base))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(response.text().await.unwrap(), "No code provided");
}

#[tokio::test]
async fn test_login_then_profile() {
    let h = harness().await;
    let cookie = h.log_in().await;

    let body: Value = h
        .http
        .get(format!("{}/api/me", h.base))
        .header(header::COOKIE, &cookie)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["id"], "alice");
}

#[tokio::test]
async fn test_add_tracks_end_to_end() {
    let h = harness().await;
    let cookie = h.log_in().await;

    let (status, body) = h
        .add_tracks(&cookie, json!({ "playlist_id": "p1", "track_ids": ["B", "A"] }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({ "error": "duplicate_tracks", "duplicate_uris": ["spotify:track:A"] })
    );
    assert!(h.upstream.added.lock().unwrap().is_empty());

    let (status, body) = h
        .add_tracks(&cookie, json!({ "playlist_id": "p1", "track_ids": ["B", "C"] }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["snapshot_id"], "snap-1");
    assert_eq!(
        *h.upstream.added.lock().unwrap(),
        vec![(
            "p1".to_string(),
            vec!["spotify:track:B".to_string(), "spotify:track:C".to_string()]
        )]
    );
}

#[tokio::test]
async fn test_add_tracks_rejects_malformed_body() {
    let h = harness().await;
    let cookie = h.log_in().await;

    let (status, body) = h
        .add_tracks(&cookie, json!({ "playlist_id": "p1", "track_ids": [] }))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "missing playlist_id or track_ids");
}

#[tokio::test]
async fn test_logout_forgets_the_session() {
    let h = harness().await;
    let cookie = h.log_in().await;

    let logout = h
        .http
        .get(format!("{}/logout", h.base))
        .header(header::COOKIE, &cookie)
        .send()
        .await
        .unwrap();
    assert!(logout.status().is_redirection());

    let response = h
        .http
        .get(format!("{}/api/me", h.base))
        .header(header::COOKIE, &cookie)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

fn track_ids(body: &Value) -> Vec<&str> {
    body.as_array()
        .unwrap()
        .iter()
        .map(|t| t["id"].as_str().unwrap())
        .collect()
}

#[tokio::test]
async fn test_liked_tracks_native_page() {
    let h = harness().await;
    let cookie = h.log_in().await;

    let (status, body) = h.get_json(&cookie, "/api/liked_tracks").await;
    assert_eq!(status, StatusCode::OK);
    let tracks = body.as_array().unwrap();
    assert_eq!(tracks.len(), 20);
    assert_eq!(
        tracks[0],
        json!({
            "id": "t0",
            "name": "Song 0",
            "artist": "Artist 0",
            "coverart": "https://img.example/0.jpg"
        })
    );

    let (_, body) = h.get_json(&cookie, "/api/liked_tracks?offset=40").await;
    assert_eq!(track_ids(&body), vec!["t40", "t41", "t42", "t43", "t44"]);

    // Pages without a query never build a snapshot
    let (_, health) = h.get_json(&cookie, "/health").await;
    assert_eq!(health["liked_snapshots"], 0);
}

#[tokio::test]
async fn test_liked_tracks_search_uses_the_cache() {
    let h = harness().await;
    let cookie = h.log_in().await;

    let (status, body) = h.get_json(&cookie, "/api/liked_tracks?q=SONG%201").await;
    assert_eq!(status, StatusCode::OK);
    // "Song 1" and "Song 10" through "Song 19"
    assert_eq!(body.as_array().unwrap().len(), 11);
    assert_eq!(body[0]["id"], "t1");
    let fetches = h.upstream.saved_requests.load(Ordering::SeqCst);
    assert_eq!(fetches, 1);

    // offset applies to the matches, served from the same snapshot
    let (_, body) = h
        .get_json(&cookie, "/api/liked_tracks?q=song%201&offset=10")
        .await;
    assert_eq!(track_ids(&body), vec!["t19"]);
    assert_eq!(h.upstream.saved_requests.load(Ordering::SeqCst), fetches);

    let (_, body) = h.get_json(&cookie, "/api/liked_tracks?q=artist%204").await;
    assert_eq!(track_ids(&body), vec!["t4", "t40", "t41", "t42", "t43", "t44"]);

    let (_, health) = h.get_json(&cookie, "/health").await;
    assert_eq!(health["liked_snapshots"], 1);
}

#[tokio::test]
async fn test_playlists_survive_failed_date_lookups() {
    let h = harness().await;
    let cookie = h.log_in().await;

    let (status, body) = h.get_json(&cookie, "/api/playlists").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!([
            { "id": "good", "name": "Good", "tracks_total": 3, "created_at": "2024-03-01T10:00:00Z" },
            { "id": "broken", "name": "Broken", "tracks_total": 7, "created_at": null },
            { "id": "empty", "name": "Empty", "tracks_total": 0, "created_at": null }
        ])
    );
}

#[tokio::test]
async fn test_rename_without_name() {
    let h = harness().await;
    let cookie = h.log_in().await;

    let response = h
        .http
        .post(format!("{}/api/playlist/good/rename", h.base))
        .header(header::COOKIE, &cookie)
        .json(&json!({ "name": "  " }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({ "error": "missing_track_name" }));
}

#[tokio::test]
async fn test_rejected_inputs_answer_json_errors() {
    let h = harness().await;
    let cookie = h.log_in().await;

    let response = h
        .http
        .post(format!("{}/api/add_tracks", h.base))
        .header(header::COOKIE, &cookie)
        .header(header::CONTENT_TYPE, "text/plain")
        .body("playlist_id=p1")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert!(body["error"].is_string());

    let (status, body) = h.get_json(&cookie, "/api/liked_tracks?offset=-1").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let response = h
        .http
        .post(format!("{}/api/add_tracks", h.base))
        .header(header::COOKIE, &cookie)
        .header(header::CONTENT_TYPE, "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert!(body["error"].is_string());
}
