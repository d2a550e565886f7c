//! Sentrobuv CLI - cart, catalog and basket from the terminal.
//!
//! # Usage
//!
//! ```bash
//! # Browse the catalog
//! sentro products list --limit 8
//! sentro products show 42
//!
//! # Local cart (SENTROBUV_CART_BACKEND=local, the default)
//! sentro cart add 42 --size 41 --color black --qty 2
//! sentro cart inc 42 --size 41 --color black
//! sentro cart show
//! sentro cart checkout
//!
//! # Server basket (SENTROBUV_CART_BACKEND=server)
//! sentro basket show
//! sentro basket watch --ticks 3
//!
//! # Signed-in account
//! sentro profile
//! ```
//!
//! # Commands
//!
//! - `cart` - Local cart kept in `SENTROBUV_DATA_DIR`
//! - `products` - Catalog listing and product details
//! - `basket` - Read-only view of the signed-in user's server basket
//! - `profile` - Account details of the signed-in user

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use sentrobuv_storefront::StorefrontConfig;
use sentrobuv_storefront::cart::CartProvider;
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "sentro")]
#[command(author, version, about = "Sentrobuv storefront CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage the local cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Browse the catalog
    Products {
        #[command(subcommand)]
        action: ProductsAction,
    },
    /// View the server basket
    Basket {
        #[command(subcommand)]
        action: BasketAction,
    },
    /// Show the signed-in user's profile
    Profile,
}

#[derive(Subcommand)]
enum CartAction {
    /// Show cart contents
    Show,
    /// Add a product (size and color default to the first offered)
    Add {
        /// Product id (integers are numeric ids)
        product_id: String,

        /// Quantity to add
        #[arg(short, long)]
        qty: Option<i64>,

        /// Size to add
        #[arg(short, long)]
        size: Option<String>,

        /// Color to add
        #[arg(short, long)]
        color: Option<String>,
    },
    /// Increase a line's quantity by one
    Inc(LineArgs),
    /// Decrease a line's quantity by one (never below one)
    Dec(LineArgs),
    /// Remove a line
    Remove(LineArgs),
    /// Remove every line
    Clear,
    /// Place the order and empty the cart
    Checkout,
}

/// Identifies one cart line.
#[derive(clap::Args)]
struct LineArgs {
    /// Product id (integers are numeric ids)
    product_id: String,

    /// Selected size
    #[arg(short, long, default_value = "")]
    size: String,

    /// Selected color
    #[arg(short, long, default_value = "")]
    color: String,
}

#[derive(Subcommand)]
enum ProductsAction {
    /// List products
    List {
        /// Show at most this many products
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Show one product
    Show {
        /// Product id (integers are numeric ids)
        product_id: String,
    },
}

#[derive(Subcommand)]
enum BasketAction {
    /// Fetch the basket once
    Show,
    /// Poll the basket and print every update
    Watch {
        /// Stop after this many updates (default: until Ctrl-C)
        #[arg(short, long)]
        ticks: Option<u32>,
    },
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &StorefrontConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Load configuration from environment (needed for Sentry init)
    let config = match StorefrontConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing_subscriber::fmt::init();
            tracing::error!("Failed to load configuration: {e}");
            std::process::exit(2);
        }
    };

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = init_sentry(&config);

    // Defaults to info level for our crates if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "sentrobuv_storefront=info,sentrobuv_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli, config).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: StorefrontConfig) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Cart { action } => {
            let cart = commands::cart::open(&config)?;
            CartProvider::scope(cart, run_cart(&config, action)).await?;
        }
        Commands::Products { action } => match action {
            ProductsAction::List { limit } => commands::products::list(&config, limit).await?,
            ProductsAction::Show { product_id } => {
                commands::products::show(&config, &product_id).await?;
            }
        },
        Commands::Basket { action } => match action {
            BasketAction::Show => commands::basket::show(&config).await?,
            BasketAction::Watch { ticks } => commands::basket::watch(&config, ticks).await?,
        },
        Commands::Profile => commands::profile::show(&config).await?,
    }
    Ok(())
}

async fn run_cart(
    config: &StorefrontConfig,
    action: CartAction,
) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        CartAction::Show => commands::cart::show(),
        CartAction::Add {
            product_id,
            qty,
            size,
            color,
        } => commands::cart::add(config, &product_id, qty, size, color).await?,
        CartAction::Inc(line) => commands::cart::increment(&line.product_id, &line.size, &line.color),
        CartAction::Dec(line) => commands::cart::decrement(&line.product_id, &line.size, &line.color),
        CartAction::Remove(line) => commands::cart::remove(&line.product_id, &line.size, &line.color),
        CartAction::Clear => commands::cart::clear(),
        CartAction::Checkout => commands::cart::checkout(),
    }
    Ok(())
}
