//! Access-token handling for HTTPS remotes
//!
//! The token is passed per invocation as an `http.<url>.extraHeader` scoped to
//! one forge, so it never lands in `.git/config` or the remote URL of the
//! checkout, and remotes on other hosts never receive it.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::env;

/// Read a non-empty token from the given environment variable
pub fn token_from_env(var: &str) -> Option<String> {
    match env::var(var) {
        Ok(token) if !token.trim().is_empty() => {
            tracing::info!("Using git access token from {}", var);
            Some(token.trim().to_string())
        }
        _ => {
            tracing::debug!("{} not set, git will run unauthenticated", var);
            None
        }
    }
}

/// Value for `http.extraHeader` carrying the token as basic credentials
pub fn auth_header(token: &str) -> String {
    let credentials = STANDARD.encode(format!("x-access-token:{}", token));
    format!("Authorization: Basic {}", credentials)
}

/// `-c` value that attaches the token only to requests under `auth_url`.
///
/// Returns `None` for an empty URL: an unscoped header would go to every
/// remote.
pub fn scoped_auth_config(auth_url: &str, token: &str) -> Option<String> {
    let auth_url = auth_url.trim();
    if auth_url.is_empty() {
        tracing::warn!("git.auth_host is empty, not sending the access token");
        return None;
    }
    Some(format!("http.{}.extraHeader={}", auth_url, auth_header(token)))
}
