//! # Seed Data Generator
//!
//! Populates the database with a demo catalog for development.
//!
//! ## Usage
//! ```bash
//! # Seed ./kiosko.db (or KIOSKO_DB_PATH)
//! cargo run -p kiosko-db --bin seed
//!
//! # Specify database path
//! cargo run -p kiosko-db --bin seed -- --db ./data/kiosko.db
//!
//! # Also record a few demo sales
//! cargo run -p kiosko-db --bin seed -- --sales
//! ```
//!
//! ## Generated Catalog
//! - Materials: fabric, thread, ink, resin...
//! - Products built from them (components set their cost)
//! - Some products with colour variants

use std::env;

use kiosko_core::{MaterialDraft, ProductDraft, SaleLineRequest, VariantDraft, DEFAULT_TOP_N};
use kiosko_db::{Database, DbConfig};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// (name, cost cents per unit, unit, stock)
const MATERIALS: &[(&str, i64, &str, f64)] = &[
    ("Tela algodón", 1000, "m", 100.0),
    ("Hilo", 5, "m", 5000.0),
    ("Tinta serigrafía", 120, "ml", 2000.0),
    ("Resina", 800, "kg", 25.0),
    ("Cordón", 30, "m", 400.0),
];

/// (name, price cents, stock, components as (material index, quantity), variants)
const PRODUCTS: &[(&str, i64, i64, &[(usize, f64)], &[(&str, i64)])] = &[
    (
        "Remera estampada",
        5000,
        20,
        &[(0, 1.5), (1, 40.0), (2, 10.0)],
        &[("Rojo", 5), ("Negro", 8), ("Blanco", 7)],
    ),
    ("Bolsa de tela", 2500, 15, &[(0, 0.8), (1, 20.0), (4, 1.2)], &[]),
    ("Llavero de resina", 1200, 40, &[(3, 0.05), (4, 0.2)], &[]),
    (
        "Gorra",
        4000,
        10,
        &[(0, 0.6), (1, 30.0), (2, 10.0)],
        &[("Azul", 4), ("Verde", 6)],
    ),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let args: Vec<String> = env::args().collect();
    let mut config = DbConfig::from_env()?;
    let mut with_sales = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    config.database_path = args[i + 1].clone().into();
                    i += 1;
                }
            }
            "--sales" | "-s" => with_sales = true,
            "--help" | "-h" => {
                println!("Kiosko Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: $KIOSKO_DB_PATH or ./kiosko.db)");
                println!("  -s, --sales        Record a few demo sales");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    info!(path = %config.database_path.display(), "Seeding database");
    let db = Database::new(config).await?;
    let catalog = db.catalog();

    if !catalog.list_products().await?.is_empty() {
        warn!("Database already has products; skipping seed. Delete the file to regenerate.");
        return Ok(());
    }

    let mut material_ids = Vec::with_capacity(MATERIALS.len());
    for (name, cost_cents, unit, stock) in MATERIALS {
        let saved = catalog
            .upsert_material(MaterialDraft {
                id: None,
                name: name.to_string(),
                cost_cents: *cost_cents,
                unit: unit.to_string(),
                stock: *stock,
            })
            .await?;
        material_ids.push(saved.id);
    }
    info!(count = material_ids.len(), "Materials created");

    let mut sellable = Vec::new();
    for (name, price_cents, stock, components, variants) in PRODUCTS {
        let product = catalog
            .upsert_product(ProductDraft {
                id: None,
                name: name.to_string(),
                cost_cents: 0,
                price_cents: *price_cents,
                stock: *stock,
            })
            .await?;

        for (material_idx, quantity) in components.iter() {
            catalog
                .add_component(&product.id, &material_ids[*material_idx], *quantity)
                .await?;
        }

        let mut first_variant = None;
        for (variant_name, variant_stock) in variants.iter() {
            let variant = catalog
                .upsert_variant(VariantDraft {
                    id: None,
                    product_id: product.id.clone(),
                    name: variant_name.to_string(),
                    stock: *variant_stock,
                })
                .await?;
            if first_variant.is_none() {
                first_variant = Some(variant.id);
            }
        }

        let product = catalog.get_product(&product.id).await?;
        info!(
            name = %product.name,
            cost = %product.cost(),
            price = %product.price(),
            variants = product.variants.len(),
            "Product created"
        );
        sellable.push((product.id, first_variant));
    }

    if with_sales {
        let checkout = db.checkout();
        for (round, (product_id, variant_id)) in sellable.iter().enumerate() {
            let sale = checkout
                .record_sale(&[SaleLineRequest {
                    product_id: product_id.clone(),
                    variant_id: variant_id.clone(),
                    quantity: 1 + (round as i64 % 2),
                }])
                .await?;
            info!(sale_id = %sale.id, total = %sale.total(), profit = %sale.profit(), "Demo sale");
        }
    }

    let stats = db.reports().get_statistics(Default::default(), DEFAULT_TOP_N).await?;
    info!(
        sales = stats.total_sales,
        units = stats.total_units_sold,
        profit_cents = stats.total_profit_cents,
        "Seed complete"
    );

    db.close().await;
    Ok(())
}

/// `RUST_LOG` overrides the default filter.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,kiosko=debug,sqlx=warn"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}
