//! Signed-in user profile command.

use std::sync::Arc;

use sentrobuv_storefront::api::{ApiClient, ApiError};
use sentrobuv_storefront::basket::CredentialStore;
use sentrobuv_storefront::config::StorefrontConfig;
use sentrobuv_storefront::storage::FileStore;
use tracing::{info, warn};

/// Fetch and show the profile of the stored credential's user.
///
/// # Errors
///
/// Returns an error if the data directory cannot be opened or the profile
/// request fails for a reason other than a missing or expired session.
pub async fn show(config: &StorefrontConfig) -> Result<(), Box<dyn std::error::Error>> {
    let storage = Arc::new(FileStore::open(&config.data_dir)?);
    let credentials = CredentialStore::new(storage, config.token_key.clone());
    let api = ApiClient::from_config(config)?;

    match api.profile().fetch_signed_in(&credentials).await {
        Ok(user) => {
            info!("{} ({})", user.full_name(), user.role);
            info!("  email: {}", user.email);
            info!("  phone: {}", user.phone_number);
            if let Some(created) = user.created_at {
                info!("  member since {}", created.format("%Y-%m-%d"));
            }
        }
        Err(ApiError::MissingCredential) => info!("Not signed in"),
        Err(ApiError::SessionExpired) => warn!("Session expired, sign in again"),
        Err(e) => return Err(e.into()),
    }
    Ok(())
}
