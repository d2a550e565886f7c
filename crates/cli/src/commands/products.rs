//! Catalog commands.

use sentrobuv_core::ProductSelection;
use sentrobuv_storefront::api::ApiClient;
use sentrobuv_storefront::config::StorefrontConfig;
use sentrobuv_storefront::views::{ProductCardView, product_cards};
use tracing::info;

use super::parse_product_id;

/// List products.
///
/// An unreachable catalog lists nothing rather than failing.
///
/// # Errors
///
/// Returns an error if the HTTP client cannot be built.
pub async fn list(
    config: &StorefrontConfig,
    limit: Option<usize>,
) -> Result<(), Box<dyn std::error::Error>> {
    let api = ApiClient::from_config(config)?;
    let products = api.catalog().products_or_empty().await;

    let cards = product_cards(&products, &config.cart, limit);
    if cards.is_empty() {
        info!("No products");
    }
    for card in &cards {
        info!("  [{}] {}", card.id, describe(card));
    }
    Ok(())
}

/// Show one product with its default selection.
///
/// # Errors
///
/// Returns an error if the product cannot be fetched.
pub async fn show(
    config: &StorefrontConfig,
    product_id: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let api = ApiClient::from_config(config)?;
    let product = api
        .catalog()
        .get_product(&parse_product_id(product_id))
        .await?;

    let card = ProductCardView::new(&product, &config.cart);
    let selection = ProductSelection::defaults(&product);

    info!("{}", describe(&card));
    info!("  Image: {}", card.image);
    if let Some(description) = &product.description {
        info!("  {description}");
    }
    info!("  Sizes: {}", product.sizes.join(", "));
    info!("  Colors: {}", product.colors.join(", "));
    info!(
        "  Default selection: size {:?}, color {:?}, quantity {}",
        selection.size, selection.color, selection.quantity
    );
    Ok(())
}

fn describe(card: &ProductCardView) -> String {
    let price = card.price.as_deref().unwrap_or("price unavailable");
    match &card.brand {
        Some(brand) => format!("{} ({brand}) - {price}", card.name),
        None => format!("{} - {price}", card.name),
    }
}
