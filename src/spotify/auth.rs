use reqwest::{Client, Url};

use crate::{
    AppError, Res,
    config::SpotifyConfig,
    types::{Token, TokenResponse},
    utils,
};

/// Builds the accounts-service URL the browser is redirected to on `/login`.
///
/// The request uses the authorization code flow with an S256 PKCE challenge.
/// `show_dialog` forces the consent screen so a different account can be
/// picked after a logout.
pub fn authorize_url(cfg: &SpotifyConfig, code_challenge: &str) -> Res<String> {
    let url = Url::parse_with_params(
        &cfg.auth_url,
        &[
            ("client_id", cfg.client_id.as_str()),
            ("response_type", "code"),
            ("redirect_uri", cfg.redirect_uri.as_str()),
            ("code_challenge", code_challenge),
            ("code_challenge_method", "S256"),
            ("scope", cfg.scope.as_str()),
            ("show_dialog", "true"),
        ],
    )
    .map_err(|e| AppError::Config(format!("SPOTIFY_API_AUTH_URL is invalid: {e}")))?;

    Ok(url.into())
}

/// Exchanges the authorization code from `/callback` for a token.
///
/// The verifier must be the one whose challenge was sent in
/// [`authorize_url`] for the same session.
pub async fn exchange_code_pkce(
    http: &Client,
    cfg: &SpotifyConfig,
    code: &str,
    verifier: &str,
) -> Res<Token> {
    let mut form = vec![
        ("grant_type", "authorization_code"),
        ("client_id", cfg.client_id.as_str()),
        ("code", code),
        ("code_verifier", verifier),
        ("redirect_uri", cfg.redirect_uri.as_str()),
    ];
    if let Some(secret) = &cfg.client_secret {
        form.push(("client_secret", secret.as_str()));
    }

    let token = request_token(http, cfg, &form).await?;
    into_token(token, None)
}

/// Exchanges a refresh token for a fresh access token.
///
/// Spotify may omit the refresh token in the answer; the previous one is kept
/// in that case.
pub async fn refresh_token(http: &Client, cfg: &SpotifyConfig, refresh_token: &str) -> Res<Token> {
    let mut form = vec![
        ("grant_type", "refresh_token"),
        ("refresh_token", refresh_token),
        ("client_id", cfg.client_id.as_str()),
    ];
    if let Some(secret) = &cfg.client_secret {
        form.push(("client_secret", secret.as_str()));
    }

    let token = request_token(http, cfg, &form).await?;
    into_token(token, Some(refresh_token))
}

async fn request_token(
    http: &Client,
    cfg: &SpotifyConfig,
    form: &[(&str, &str)],
) -> Res<TokenResponse> {
    let response = http.post(&cfg.token_url).form(form).send().await?;
    let status = response.status();
    if !status.is_success() {
        let message = response.text().await.unwrap_or_default();
        return Err(AppError::Upstream {
            status: status.as_u16(),
            message,
        });
    }

    Ok(response.json::<TokenResponse>().await?)
}

/// Converts the raw token endpoint body into a stored [`Token`].
pub fn into_token(res: TokenResponse, previous_refresh: Option<&str>) -> Res<Token> {
    let access_token = res.access_token.ok_or_else(|| AppError::Upstream {
        status: 200,
        message: "token response without access_token".to_string(),
    })?;

    Ok(Token {
        access_token,
        refresh_token: res
            .refresh_token
            .or_else(|| previous_refresh.map(str::to_string))
            .unwrap_or_default(),
        scope: res.scope.unwrap_or_default(),
        expires_in: res.expires_in.unwrap_or(3600),
        obtained_at: utils::unix_now(),
    })
}
