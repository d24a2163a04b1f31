//! API key lookup

use mend_core::{MendError, Result};
use std::env;

/// Get the API key from the named environment variable
pub fn get_api_key(var: &str) -> Result<String> {
    match env::var(var) {
        Ok(key) if !key.trim().is_empty() => {
            tracing::info!("Using API key from {}", var);
            Ok(key.trim().to_string())
        }
        _ => Err(MendError::Auth(format!(
            "No API key found. Set {}=sk-... to enable code improvement",
            var
        ))),
    }
}
