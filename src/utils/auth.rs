//! Authentication utilities for API requests
//!
//! This module builds the provider-specific authentication headers that are
//! attached to every request a provider client sends.

use reqwest::header::{HeaderMap, HeaderValue, InvalidHeaderValue, AUTHORIZATION};

use crate::api::anthropic::ANTHROPIC_VERSION;

/// How a provider expects its API key to be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    /// `Authorization: Bearer <key>`
    Bearer,
    /// `x-api-key: <key>` plus the `anthropic-version` header
    Anthropic,
}

/// Build the authentication headers for a provider.
///
/// Fails when the key cannot be carried in an HTTP header, which is how a
/// malformed credential (stray newline, control characters) shows up.
pub fn auth_headers(mode: AuthMode, api_key: &str) -> Result<HeaderMap, InvalidHeaderValue> {
    let mut headers = HeaderMap::new();
    match mode {
        AuthMode::Anthropic => {
            let mut key = HeaderValue::from_str(api_key)?;
            key.set_sensitive(true);
            headers.insert("x-api-key", key);
            headers.insert(
                "anthropic-version",
                HeaderValue::from_static(ANTHROPIC_VERSION),
            );
        }
        AuthMode::Bearer => {
            let mut value = HeaderValue::from_str(&format!("Bearer {api_key}"))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }
    }
    Ok(headers)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anthropic_auth_headers() {
        let headers = auth_headers(AuthMode::Anthropic, "test-key").unwrap();

        assert_eq!(headers.get("x-api-key").unwrap(), "test-key");
        assert_eq!(headers.get("anthropic-version").unwrap(), "2023-06-01");
        assert!(headers.get(AUTHORIZATION).is_none());
    }

    #[test]
    fn test_bearer_auth_headers() {
        let headers = auth_headers(AuthMode::Bearer, "test-key").unwrap();

        assert_eq!(headers.get(AUTHORIZATION).unwrap(), "Bearer test-key");
        assert!(headers.get(AUTHORIZATION).unwrap().is_sensitive());
        assert!(headers.get("x-api-key").is_none());
    }

    #[test]
    fn test_malformed_key_is_rejected() {
        assert!(auth_headers(AuthMode::Bearer, "sk-abc\ndef").is_err());
        assert!(auth_headers(AuthMode::Anthropic, "key\r\n").is_err());
    }
}
