//! Server basket commands.

use std::sync::Arc;

use sentrobuv_storefront::api::ApiClient;
use sentrobuv_storefront::basket::{
    BasketPoller, BasketStatus, BasketSync, BasketView, CredentialStore,
};
use sentrobuv_storefront::config::{CartBackend, StorefrontConfig};
use sentrobuv_storefront::storage::FileStore;
use sentrobuv_storefront::views::CartView;
use tracing::{info, warn};

use super::render_cart;

fn basket_sync(config: &StorefrontConfig) -> Result<BasketSync, Box<dyn std::error::Error>> {
    if config.backend != CartBackend::Server {
        return Err(
            "basket commands need SENTROBUV_CART_BACKEND=server; use `sentro cart` instead".into(),
        );
    }

    let storage = Arc::new(FileStore::open(&config.data_dir)?);
    let credentials = CredentialStore::new(storage, config.token_key.clone());
    let api = ApiClient::from_config(config)?;
    Ok(BasketSync::new(api.basket(), credentials))
}

fn render(view: &BasketView, config: &StorefrontConfig) {
    match view.status {
        BasketStatus::Pending => info!("Basket not fetched yet"),
        BasketStatus::SignedOut => info!("Not signed in"),
        BasketStatus::ReauthenticationRequired => warn!("Session expired, sign in again"),
        BasketStatus::Stale => {
            warn!("Basket refresh failed, showing last known contents");
            render_cart(&CartView::from_basket(view, &config.cart));
        }
        BasketStatus::Ready => render_cart(&CartView::from_basket(view, &config.cart)),
    }
}

/// Fetch the basket once.
///
/// # Errors
///
/// Returns an error if the server basket is not the configured backend.
pub async fn show(config: &StorefrontConfig) -> Result<(), Box<dyn std::error::Error>> {
    let sync = basket_sync(config)?;
    let view = sync.refresh(&BasketView::default()).await;
    render(&view, config);
    Ok(())
}

/// Poll the basket and print every update until `ticks` updates or Ctrl-C.
///
/// # Errors
///
/// Returns an error if the server basket is not the configured backend.
pub async fn watch(
    config: &StorefrontConfig,
    ticks: Option<u32>,
) -> Result<(), Box<dyn std::error::Error>> {
    let sync = basket_sync(config)?;
    let poller = BasketPoller::spawn(sync, config.basket_poll_interval);
    let mut views = poller.subscribe();
    let mut seen = 0_u32;

    loop {
        tokio::select! {
            changed = views.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted");
                break;
            }
        }

        let view = views.borrow_and_update().clone();
        render(&view, config);

        seen += 1;
        if ticks.is_some_and(|limit| seen >= limit) {
            break;
        }
    }

    poller.stop().await;
    Ok(())
}
