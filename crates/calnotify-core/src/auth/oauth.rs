//! Lightweight OAuth2 Authorization Code flow for desktop apps.
//!
//! 1. Opens browser to authorization URL
//! 2. Starts a tiny localhost HTTP server to receive the callback
//! 3. Exchanges the code for an access token (+ refresh token)
//! 4. Stores tokens in OS keyring

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};
use std::net::TcpListener;

use super::{keyring_store, GOOGLE_CLIENT_KEY, GOOGLE_TOKENS_KEY};
use crate::error::OAuthError;

const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
/// Read-only scope; this application never writes to the calendar.
const CALENDAR_SCOPE: &str = "https://www.googleapis.com/auth/calendar.readonly";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuthTokens {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_at: Option<i64>, // Unix timestamp
    pub token_type: String,
    pub scope: Option<String>,
}

/// OAuth client credentials, stored in the OS keyring.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientCredentials {
    pub client_id: String,
    pub client_secret: String,
}

#[derive(Debug, Clone)]
pub struct OAuthConfig {
    pub client_id: String,
    pub client_secret: String,
    pub auth_url: String,
    pub token_url: String,
    pub scopes: Vec<String>,
    pub redirect_port: u16,
}

impl OAuthConfig {
    /// Google config using the stored client credentials.
    pub fn google() -> Result<Self, OAuthError> {
        let credentials = load_client_credentials()?.ok_or(OAuthError::ClientNotConfigured)?;
        Ok(Self {
            client_id: credentials.client_id,
            client_secret: credentials.client_secret,
            auth_url: GOOGLE_AUTH_URL.to_string(),
            token_url: GOOGLE_TOKEN_URL.to_string(),
            scopes: vec![CALENDAR_SCOPE.to_string()],
            redirect_port: 18923,
        })
    }

    pub fn redirect_uri(&self) -> String {
        format!("http://localhost:{}/callback", self.redirect_port)
    }

    pub fn auth_url_full(&self) -> String {
        let scopes = self.scopes.join(" ");
        format!(
            "{}?client_id={}&redirect_uri={}&response_type=code&scope={}&access_type=offline&prompt=consent",
            self.auth_url,
            urlencoding::encode(&self.client_id),
            urlencoding::encode(&self.redirect_uri()),
            urlencoding::encode(&scopes),
        )
    }
}

/// Run the full OAuth2 flow: open browser -> listen for callback -> exchange code.
pub async fn authorize(config: &OAuthConfig) -> Result<OAuthTokens, OAuthError> {
    let auth_url = config.auth_url_full();
    open::that(&auth_url).map_err(|e| OAuthError::Browser(e.to_string()))?;

    let listener = TcpListener::bind(format!("127.0.0.1:{}", config.redirect_port))?;
    listener.set_nonblocking(false)?;

    let (mut stream, _) = listener.accept()?;
    let mut buf = [0u8; 4096];
    let n = stream.read(&mut buf)?;
    let request = String::from_utf8_lossy(&buf[..n]);

    let code = extract_code(&request).ok_or(OAuthError::MissingCode)?;

    // Send success response to browser
    let response = "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\n\r\n<html><body><h2>Authentication successful!</h2><p>You can close this tab.</p><script>window.close()</script></body></html>";
    stream.write_all(response.as_bytes())?;
    drop(stream);
    drop(listener);

    let redirect_uri = config.redirect_uri();
    let tokens = request_tokens(
        config,
        &[
            ("code", code.as_str()),
            ("grant_type", "authorization_code"),
            ("redirect_uri", redirect_uri.as_str()),
        ],
        None,
    )
    .await?;

    store_tokens(&tokens)?;
    Ok(tokens)
}

/// Refresh an access token using a refresh token.
pub async fn refresh(config: &OAuthConfig, refresh_token: &str) -> Result<OAuthTokens, OAuthError> {
    let tokens = request_tokens(
        config,
        &[
            ("refresh_token", refresh_token),
            ("grant_type", "refresh_token"),
        ],
        Some(refresh_token),
    )
    .await?;

    store_tokens(&tokens)?;
    Ok(tokens)
}

/// POST to the token endpoint and parse the response. Providers omit the
/// refresh token on refresh grants, so `prior_refresh` is kept in that case.
async fn request_tokens(
    config: &OAuthConfig,
    grant: &[(&str, &str)],
    prior_refresh: Option<&str>,
) -> Result<OAuthTokens, OAuthError> {
    let client = Client::new();
    let mut params: Vec<(&str, &str)> = vec![
        ("client_id", config.client_id.as_str()),
        ("client_secret", config.client_secret.as_str()),
    ];
    params.extend_from_slice(grant);

    let resp = client.post(&config.token_url).form(&params).send().await?;
    let body: serde_json::Value = resp.json().await?;

    if let Some(error) = body.get("error") {
        return Err(OAuthError::TokenRejected(error.to_string()));
    }

    let expires_in = body.get("expires_in").and_then(|v| v.as_i64());
    let expires_at = expires_in.map(|ei| chrono::Utc::now().timestamp() + ei);

    Ok(OAuthTokens {
        access_token: body["access_token"]
            .as_str()
            .unwrap_or_default()
            .to_string(),
        refresh_token: body
            .get("refresh_token")
            .and_then(|v| v.as_str())
            .map(String::from)
            .or_else(|| prior_refresh.map(String::from)),
        expires_at,
        token_type: body["token_type"].as_str().unwrap_or("Bearer").to_string(),
        scope: body.get("scope").and_then(|v| v.as_str()).map(String::from),
    })
}

/// Persist tokens to the keyring.
pub fn store_tokens(tokens: &OAuthTokens) -> Result<(), OAuthError> {
    let json = serde_json::to_string(tokens)?;
    keyring_store::set(GOOGLE_TOKENS_KEY, &json)
}

/// Load stored tokens from keyring. Unreadable entries read as absent.
pub fn load_tokens() -> Option<OAuthTokens> {
    keyring_store::get(GOOGLE_TOKENS_KEY)
        .ok()
        .flatten()
        .and_then(|json| serde_json::from_str(&json).ok())
}

/// Persist OAuth client credentials to the keyring.
pub fn store_client_credentials(credentials: &ClientCredentials) -> Result<(), OAuthError> {
    let json = serde_json::to_string(credentials)?;
    keyring_store::set(GOOGLE_CLIENT_KEY, &json)
}

/// Load stored client credentials from the keyring.
pub fn load_client_credentials() -> Result<Option<ClientCredentials>, OAuthError> {
    match keyring_store::get(GOOGLE_CLIENT_KEY)? {
        Some(json) => Ok(Some(serde_json::from_str(&json)?)),
        None => Ok(None),
    }
}

/// Check if stored tokens are expired (with 60s buffer).
pub fn is_expired(tokens: &OAuthTokens) -> bool {
    match tokens.expires_at {
        Some(exp) => chrono::Utc::now().timestamp() > exp - 60,
        None => false,
    }
}

/// Return a valid access token, refreshing first when the stored one has
/// expired.
pub async fn access_token() -> Result<String, OAuthError> {
    let tokens = load_tokens().ok_or(OAuthError::NotAuthenticated)?;

    if !is_expired(&tokens) {
        return Ok(tokens.access_token);
    }

    let refresh_token = tokens
        .refresh_token
        .as_deref()
        .ok_or(OAuthError::NoRefreshToken)?;

    let config = OAuthConfig::google()?;
    let refreshed = refresh(&config, refresh_token).await?;
    Ok(refreshed.access_token)
}

/// Remove stored tokens. Client credentials are kept so the account can be
/// reconnected without another setup step.
pub fn clear_tokens() -> Result<(), OAuthError> {
    keyring_store::delete(GOOGLE_TOKENS_KEY)
}

fn extract_code(request: &str) -> Option<String> {
    let first_line = request.lines().next()?;
    let path = first_line.split_whitespace().nth(1)?;
    let url = url::Url::parse(&format!("http://localhost{path}")).ok()?;
    url.query_pairs()
        .find(|(k, _)| k == "code")
        .map(|(_, v)| v.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(token_url: String) -> OAuthConfig {
        OAuthConfig {
            client_id: "client-1".to_string(),
            client_secret: "secret-1".to_string(),
            auth_url: "https://example.com/auth".to_string(),
            token_url,
            scopes: vec![CALENDAR_SCOPE.to_string()],
            redirect_port: 18923,
        }
    }

    #[test]
    fn extract_code_parses_callback_request() {
        let request = "GET /callback?code=abc123&scope=calendar HTTP/1.1\r\nHost: localhost\r\n\r\n";
        assert_eq!(extract_code(request).as_deref(), Some("abc123"));
    }

    #[test]
    fn extract_code_without_code_returns_none() {
        let request = "GET /callback?error=access_denied HTTP/1.1\r\n\r\n";
        assert_eq!(extract_code(request), None);
    }

    #[test]
    fn is_expired_applies_sixty_second_buffer() {
        let mut tokens = OAuthTokens {
            access_token: "a".to_string(),
            refresh_token: None,
            expires_at: Some(chrono::Utc::now().timestamp() + 30),
            token_type: "Bearer".to_string(),
            scope: None,
        };
        assert!(is_expired(&tokens));

        tokens.expires_at = Some(chrono::Utc::now().timestamp() + 300);
        assert!(!is_expired(&tokens));

        tokens.expires_at = None;
        assert!(!is_expired(&tokens));
    }

    #[test]
    fn auth_url_carries_scope_and_redirect() {
        let config = config("https://example.com/token".to_string());
        let url = config.auth_url_full();
        assert!(url.starts_with("https://example.com/auth?client_id=client-1"));
        assert!(url.contains("access_type=offline"));
        assert!(url.contains(&urlencoding::encode(CALENDAR_SCOPE).into_owned()));
        assert!(url.contains(&urlencoding::encode("http://localhost:18923/callback").into_owned()));
    }

    #[tokio::test]
    async fn token_request_parses_response_and_keeps_prior_refresh() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/token")
            .match_body(mockito::Matcher::UrlEncoded(
                "grant_type".into(),
                "refresh_token".into(),
            ))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"access_token": "fresh", "expires_in": 3600, "token_type": "Bearer"}"#)
            .create_async()
            .await;

        let config = config(format!("{}/token", server.url()));
        let tokens = request_tokens(
            &config,
            &[("refresh_token", "prior"), ("grant_type", "refresh_token")],
            Some("prior"),
        )
        .await
        .unwrap();

        mock.assert_async().await;
        assert_eq!(tokens.access_token, "fresh");
        assert_eq!(tokens.refresh_token.as_deref(), Some("prior"));
        assert!(tokens.expires_at.is_some());
    }

    #[tokio::test]
    async fn token_request_surfaces_provider_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/token")
            .with_status(400)
            .with_header("content-type", "application/json")
            .with_body(r#"{"error": "invalid_grant"}"#)
            .create_async()
            .await;

        let config = config(format!("{}/token", server.url()));
        let result = request_tokens(
            &config,
            &[("refresh_token", "stale"), ("grant_type", "refresh_token")],
            Some("stale"),
        )
        .await;

        match result {
            Err(OAuthError::TokenRejected(message)) => assert!(message.contains("invalid_grant")),
            other => panic!("expected TokenRejected, got {other:?}"),
        }
    }
}
