//! `stockroom-dashboard` -- headless inventory dashboard.
//!
//! Loads every list from the inventory API, then prints the home-screen
//! counts and the low-stock table.
//!
//! # Environment variables
//!
//! | Variable               | Required | Default                 |
//! |------------------------|----------|-------------------------|
//! | `INVENTORY_API_URL`    | no       | `http://localhost:5000` |
//! | `REQUEST_TIMEOUT_SECS` | no       | `30`                    |
//! | `LOW_STOCK_THRESHOLD`  | no       | `10`                    |

use stockroom_client::config::ClientConfig;
use stockroom_client::dashboard::Dashboard;
use stockroom_core::product::Product;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stockroom_dashboard=info,stockroom_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ClientConfig::from_env();
    tracing::info!(
        api_url = %config.api_url,
        threshold = config.low_stock_threshold,
        "Starting stockroom dashboard",
    );

    let dashboard = match Dashboard::from_config(&config) {
        Ok(dashboard) => dashboard,
        Err(e) => {
            tracing::error!(error = %e, "Failed to build HTTP client");
            std::process::exit(1);
        }
    };

    let report = dashboard.refresh_all().await;
    for banner in report.failures() {
        tracing::error!(banner, "List failed to load");
    }

    let summary = dashboard.summary().await;
    println!("Products     {:>6}", summary.products);
    println!("Low stock    {:>6}  (< {})", summary.low_stock, summary.threshold);
    println!("Stock in     {:>6}", summary.stock_ins);
    println!("Stock out    {:>6}", summary.stock_outs);

    let low = dashboard.low_stock().await;
    if low.is_empty() {
        println!("\nAll items are well-stocked.");
    } else {
        println!(
            "\n{:<4} {:<28} {:>8} {:>10}  {:<11} {}",
            "#", "Product", "Items", "Price", "Expiry", "Owner"
        );
        for (index, product) in low.iter().enumerate() {
            print_row(index + 1, product);
        }
    }

    if !report.failures().is_empty() {
        std::process::exit(2);
    }
}

fn print_row(position: usize, product: &Product) {
    println!(
        "{:<4} {:<28} {:>8} {:>10.2}  {:<11} {}",
        position,
        product.name,
        product.product_quantity,
        product.price,
        expiry_label(product),
        product.owner_name,
    );
}

fn expiry_label(product: &Product) -> String {
    product
        .expiry
        .map(|expiry| expiry.date_naive().to_string())
        .unwrap_or_else(|| "N/A".to_string())
}
