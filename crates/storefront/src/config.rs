//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional:
//! - `SENTROBUV_API_URL` - Catalog/basket API origin (default: <https://api.sentrobuv.uz>)
//! - `SENTROBUV_DATA_DIR` - Directory for the local key-value store (default: `.sentrobuv`)
//! - `SENTROBUV_CART_KEY` - Storage key of the cart slot (default: `cart`)
//! - `SENTROBUV_TOKEN_KEY` - Storage key of the credential slot (default: `token`)
//! - `SENTROBUV_CART_BACKEND` - `local` or `server` (default: `local`)
//! - `SENTROBUV_BASKET_POLL_SECS` - Basket refresh interval (default: 5)
//! - `SENTROBUV_HTTP_TIMEOUT_SECS` - HTTP request timeout (default: 10)
//! - `SENTROBUV_IMAGE_PLACEHOLDER` - Image used when a product has none
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use sentrobuv_core::ProductSnapshot;
use thiserror::Error;
use url::Url;

/// Default API origin.
pub const DEFAULT_API_URL: &str = "https://api.sentrobuv.uz";

/// Default image reference for products without images.
pub const DEFAULT_IMAGE_PLACEHOLDER: &str = "https://via.placeholder.com/150";

/// Default storage key for the cart slot.
pub const DEFAULT_CART_KEY: &str = "cart";

/// Default storage key for the credential slot.
pub const DEFAULT_TOKEN_KEY: &str = "token";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Which model is authoritative for the user's cart.
///
/// Exactly one is active per process; the two are never merged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CartBackend {
    /// Lines live in the local key-value store.
    #[default]
    Local,
    /// Lines live in the server basket and are polled.
    Server,
}

impl FromStr for CartBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "server" => Ok(Self::Server),
            other => Err(format!("expected `local` or `server`, got `{other}`")),
        }
    }
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// API origin for catalog and basket requests
    pub api_url: Url,
    /// Directory holding the file-backed key-value store
    pub data_dir: PathBuf,
    /// Cart store settings
    pub cart: CartSettings,
    /// Storage key of the credential slot
    pub token_key: String,
    /// Authoritative cart model
    pub backend: CartBackend,
    /// Basket refresh interval for the server backend
    pub basket_poll_interval: Duration,
    /// Timeout applied to every HTTP request
    pub http_timeout: Duration,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

/// Settings the cart store needs at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartSettings {
    /// Storage key of the cart slot
    pub storage_key: String,
    /// Image reference used when a product has no first image
    pub image_placeholder: String,
    /// Origin that relative product image paths are resolved against
    pub image_base: Option<Url>,
}

impl Default for CartSettings {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_CART_KEY.to_string(),
            image_placeholder: DEFAULT_IMAGE_PLACEHOLDER.to_string(),
            image_base: None,
        }
    }
}

impl CartSettings {
    /// Display image for a product: its first image resolved against
    /// `image_base`, or the placeholder.
    #[must_use]
    pub fn image_for(&self, product: &ProductSnapshot) -> String {
        product.first_image().map_or_else(
            || self.image_placeholder.clone(),
            |path| resolve_image(self.image_base.as_ref(), path),
        )
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let api_url = parse_env("SENTROBUV_API_URL", DEFAULT_API_URL, |v| {
            Url::parse(v).map_err(|e| e.to_string())
        })?;
        let data_dir = PathBuf::from(get_env_or_default("SENTROBUV_DATA_DIR", ".sentrobuv"));
        let backend = parse_env("SENTROBUV_CART_BACKEND", "local", CartBackend::from_str)?;
        let basket_poll_interval = parse_env("SENTROBUV_BASKET_POLL_SECS", "5", parse_seconds)?;
        let http_timeout = parse_env("SENTROBUV_HTTP_TIMEOUT_SECS", "10", parse_seconds)?;

        let cart = CartSettings {
            storage_key: get_env_or_default("SENTROBUV_CART_KEY", DEFAULT_CART_KEY),
            image_placeholder: get_env_or_default(
                "SENTROBUV_IMAGE_PLACEHOLDER",
                DEFAULT_IMAGE_PLACEHOLDER,
            ),
            image_base: Some(api_url.clone()),
        };

        Ok(Self {
            api_url,
            data_dir,
            cart,
            token_key: get_env_or_default("SENTROBUV_TOKEN_KEY", DEFAULT_TOKEN_KEY),
            backend,
            basket_poll_interval,
            http_timeout,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

/// Read a variable (or its default) and run it through `parse`.
fn parse_env<T>(
    key: &str,
    default: &str,
    parse: impl FnOnce(&str) -> Result<T, String>,
) -> Result<T, ConfigError> {
    let raw = get_env_or_default(key, default);
    parse(&raw).map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e))
}

/// Parse a strictly positive number of seconds.
fn parse_seconds(raw: &str) -> Result<Duration, String> {
    let secs = raw.trim().parse::<u64>().map_err(|e| e.to_string())?;
    if secs == 0 {
        return Err("must be greater than zero".to_string());
    }
    Ok(Duration::from_secs(secs))
}

/// Resolve an image path against the API origin. Absolute URLs pass through.
fn resolve_image(base: Option<&Url>, path: &str) -> String {
    let Some(base) = base else {
        return path.to_string();
    };
    let mut base = base.clone();
    // Url::join replaces the last segment unless the base ends with '/'
    if !base.path().ends_with('/') {
        let dir = format!("{}/", base.path());
        base.set_path(&dir);
    }
    base.join(path.trim_start_matches('/'))
        .map_or_else(|_| path.to_string(), String::from)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_cart_backend_parse() {
        assert_eq!("local".parse::<CartBackend>().unwrap(), CartBackend::Local);
        assert_eq!(" Server ".parse::<CartBackend>().unwrap(), CartBackend::Server);
        assert!("both".parse::<CartBackend>().is_err());
    }

    #[test]
    fn test_parse_seconds() {
        assert_eq!(parse_seconds("5").unwrap(), Duration::from_secs(5));
        assert!(parse_seconds("0").is_err());
        assert!(parse_seconds("-1").is_err());
        assert!(parse_seconds("soon").is_err());
    }

    #[test]
    fn test_parse_env_uses_default() {
        let value = parse_env("SENTROBUV_TEST_UNSET_VARIABLE", "42", |v| {
            v.parse::<u32>().map_err(|e| e.to_string())
        })
        .unwrap();
        assert_eq!(value, 42);
    }

    #[test]
    fn test_parse_env_reports_key() {
        let err = parse_env("SENTROBUV_TEST_UNSET_VARIABLE", "nope", parse_seconds).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidEnvVar(ref key, _) if key == "SENTROBUV_TEST_UNSET_VARIABLE"
        ));
    }

    #[test]
    fn test_cart_settings_default() {
        let settings = CartSettings::default();
        assert_eq!(settings.storage_key, "cart");
        assert_eq!(settings.image_placeholder, DEFAULT_IMAGE_PLACEHOLDER);
        assert!(settings.image_base.is_none());
    }

    #[test]
    fn test_resolve_image() {
        let base = Url::parse("https://api.sentrobuv.uz").unwrap();
        assert_eq!(
            resolve_image(Some(&base), "/uploads/a.jpg"),
            "https://api.sentrobuv.uz/uploads/a.jpg"
        );
        assert_eq!(
            resolve_image(Some(&base), "https://cdn.example.com/a.jpg"),
            "https://cdn.example.com/a.jpg"
        );
        assert_eq!(resolve_image(None, "uploads/a.jpg"), "uploads/a.jpg");
    }

    #[test]
    fn test_resolve_image_keeps_base_path() {
        let base = Url::parse("https://host/v1").unwrap();
        assert_eq!(
            resolve_image(Some(&base), "uploads/a.jpg"),
            "https://host/v1/uploads/a.jpg"
        );
        let base = Url::parse("https://host/v1/").unwrap();
        assert_eq!(
            resolve_image(Some(&base), "/uploads/a.jpg"),
            "https://host/v1/uploads/a.jpg"
        );
    }
}
