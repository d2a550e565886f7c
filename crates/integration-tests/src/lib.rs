//! Integration tests for Sentrobuv.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p sentrobuv-integration-tests
//! ```
//!
//! No external services are needed: the Sentrobuv API is stood in for by a
//! `wiremock` server and file-backed storage lives in a temp directory.
//!
//! # Test Categories
//!
//! - `cart_persistence` - cart snapshots surviving reopen, storage faults
//! - `catalog_cart` - catalog products flowing into the cart and views
//! - `basket_sync` - server basket refresh, session expiry, polling

use std::time::Duration;

use sentrobuv_storefront::api::ApiClient;
use sentrobuv_storefront::config::CartSettings;
use serde_json::{Value, json};
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// A catalog product payload shaped like the live API's.
#[must_use]
pub fn product_payload(id: Value, name: &str, price: Value) -> Value {
    json!({
        "id": id,
        "name": name,
        "price": price,
        "brand": "Sentro",
        "colors": ["black", "white"],
        "size": ["40", "41", "42"],
        "productImages": [{"id": 1, "image": format!("uploads/{name}.jpg")}]
    })
}

/// Start a mock API serving `products` at `/products` and each product at
/// `/products/{id}`.
///
/// # Panics
///
/// Panics if a product payload has no `id`.
pub async fn mock_catalog(products: &[Value]) -> MockServer {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/products"))
        .respond_with(ResponseTemplate::new(200).set_body_json(Value::Array(products.to_vec())))
        .mount(&server)
        .await;

    for product in products {
        let id = match product.get("id") {
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => panic!("product payload without id"),
        };
        Mock::given(method("GET"))
            .and(path(format!("/products/{id}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(product))
            .mount(&server)
            .await;
    }

    server
}

/// API client pointed at a mock server.
///
/// # Panics
///
/// Panics if the mock server URI is not a valid URL.
#[must_use]
pub fn api_for(server: &MockServer) -> ApiClient {
    match ApiClient::new(origin(server), Duration::from_secs(5)) {
        Ok(api) => api,
        Err(e) => panic!("failed to build API client: {e}"),
    }
}

/// Cart settings resolving images against a mock server.
#[must_use]
pub fn settings_for(server: &MockServer) -> CartSettings {
    CartSettings {
        image_base: Some(origin(server)),
        ..CartSettings::default()
    }
}

fn origin(server: &MockServer) -> Url {
    match Url::parse(&server.uri()) {
        Ok(url) => url,
        Err(e) => panic!("mock server URI is not a URL: {e}"),
    }
}
