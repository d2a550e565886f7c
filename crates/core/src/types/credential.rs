//! Bearer credential handling.
//!
//! The sign-in flow (not part of this workspace) stores its token payload in
//! the `token` slot. Depending on which form wrote it, the slot holds the full
//! sign-up response tokens (`{"tokens": {"accessToken": ...}}`), a bare token
//! object (`{"accessToken": ...}`), or the raw token string.

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

/// Opaque bearer token used for basket requests.
///
/// `Debug` output is redacted by `SecretString`.
#[derive(Debug, Clone)]
pub struct AccessToken(SecretString);

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenPair {
    access_token: Option<String>,
}

#[derive(Deserialize)]
struct StoredTokens {
    tokens: Option<TokenPair>,
    #[serde(rename = "accessToken")]
    access_token: Option<String>,
}

impl AccessToken {
    /// Wrap a raw token.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(SecretString::from(token.into()))
    }

    /// Extract the access token from a stored token payload.
    ///
    /// Returns `None` when the payload is blank or names an empty token.
    #[must_use]
    pub fn from_stored(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }

        let token = match serde_json::from_str::<serde_json::Value>(raw) {
            Ok(serde_json::Value::String(inner)) => inner,
            Ok(value @ serde_json::Value::Object(_)) => {
                let stored: StoredTokens = serde_json::from_value(value).ok()?;
                stored
                    .tokens
                    .and_then(|pair| pair.access_token)
                    .or(stored.access_token)?
            }
            _ => raw.to_string(),
        };

        if token.trim().is_empty() {
            None
        } else {
            Some(Self::new(token))
        }
    }

    /// Value for an `Authorization` header.
    #[must_use]
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.0.expose_secret())
    }

    /// The raw token.
    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_tokens() {
        let token =
            AccessToken::from_stored(r#"{"tokens":{"accessToken":"abc","refreshToken":"r"}}"#)
                .unwrap();
        assert_eq!(token.expose(), "abc");
    }

    #[test]
    fn test_flat_token_object() {
        let token = AccessToken::from_stored(r#"{"accessToken":"xyz"}"#).unwrap();
        assert_eq!(token.bearer(), "Bearer xyz");
    }

    #[test]
    fn test_raw_token_string() {
        let token = AccessToken::from_stored("eyJhbGciOi.payload.sig").unwrap();
        assert_eq!(token.expose(), "eyJhbGciOi.payload.sig");

        let quoted = AccessToken::from_stored("\"quoted\"").unwrap();
        assert_eq!(quoted.expose(), "quoted");
    }

    #[test]
    fn test_empty_payloads() {
        assert!(AccessToken::from_stored("").is_none());
        assert!(AccessToken::from_stored(r#"{"tokens":{}}"#).is_none());
        assert!(AccessToken::from_stored(r#"{"accessToken":""}"#).is_none());
    }

    #[test]
    fn test_debug_redacts() {
        let token = AccessToken::new("super-secret-token");
        assert!(!format!("{token:?}").contains("super-secret-token"));
    }
}
