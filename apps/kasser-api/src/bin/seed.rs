//! # Seed Data Generator
//!
//! Populates the database with a demo store for development.
//!
//! ## Usage
//! ```bash
//! # Seed ./kasser.db (default)
//! cargo run -p kasser-api --bin seed
//!
//! # Specify database path
//! cargo run -p kasser-api --bin seed -- --db ./data/kasser.db
//! ```
//!
//! ## Generated Data
//! - One store with an owner and a cashier
//! - Three categories with a handful of products each
//! - Default settings (tax on, 14 %)
//! - A development token for each user, printed to stdout
//!
//! Tokens are signed with `JWT_SECRET` / `JWT_ISSUER` from the environment,
//! the same values the server reads.

use anyhow::Context;
use std::env;

use kasser_api::{ApiConfig, JwtManager};
use kasser_core::{Money, NewCategory, NewProduct, Role};
use kasser_db::{Database, DbConfig};

/// Demo catalog: category, colour, products (name, price in cents, stock)
const CATALOG: &[(&str, &str, &[(&str, i64, i64)])] = &[
    (
        "Sandwiches",
        "#e53935",
        &[
            ("Falafel Sandwich", 1500, 120),
            ("Foul Sandwich", 1200, 120),
            ("Shawarma Sandwich", 6500, 40),
            ("Liver Sandwich", 4500, 30),
        ],
    ),
    (
        "Plates",
        "#fb8c00",
        &[
            ("Koshary Small", 3000, 60),
            ("Koshary Large", 4500, 60),
            ("Mixed Grill", 22000, 10),
        ],
    ),
    (
        "Drinks",
        "#1e88e5",
        &[
            ("Cola", 1500, 200),
            ("Mineral Water", 800, 200),
            ("Sugarcane Juice", 2000, 0),
        ],
    ),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command line arguments
    let args: Vec<String> = env::args().collect();
    let config = ApiConfig::load().context("loading configuration")?;

    let mut db_path = config.database_path.clone();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone().into();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Kasser POS Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: $DATABASE_PATH or ./kasser.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("Kasser POS Seed Data Generator");
    println!("==============================");
    println!("Database: {}", db_path.display());
    println!();

    let db = Database::new(DbConfig::new(db_path))
        .await
        .context("opening database")?;
    println!("✓ Connected to database, migrations applied");

    if db.stores().get_user_by_username("owner").await?.is_some() {
        println!("⚠ Database already has a demo owner");
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let store = db.stores().create_store("KasserPro Demo").await?;
    let owner = db
        .stores()
        .create_user(Some(store.id), "owner", "Demo Owner", Role::Owner)
        .await?;
    let cashier = db
        .stores()
        .create_user(Some(store.id), "cashier", "Demo Cashier", Role::Cashier)
        .await?;
    println!("✓ Store {} with owner and cashier", store.id);

    let mut generated = 0;
    for (category_name, color, products) in CATALOG {
        let category = db
            .categories()
            .create(
                store.id,
                &NewCategory {
                    name: category_name.to_string(),
                    color: Some(color.to_string()),
                    icon: None,
                },
            )
            .await?;

        for (name, price_cents, stock) in products.iter() {
            db.products()
                .create(
                    store.id,
                    &NewProduct {
                        name: name.to_string(),
                        price: Money::from_cents(*price_cents),
                        stock: *stock,
                        category_id: Some(category.id),
                        image_url: None,
                        is_available: true,
                    },
                )
                .await?;
            generated += 1;
        }
    }
    println!("✓ Generated {} products in {} categories", generated, CATALOG.len());

    db.settings().get_or_create(store.id).await?;
    println!("✓ Default settings created");

    let jwt = JwtManager::new(
        &config.jwt_secret,
        config.jwt_issuer.clone(),
        config.jwt_access_lifetime_secs,
    );
    println!();
    println!("Owner token:");
    println!("{}", jwt.issue(owner.id, Some(store.id), Role::Owner)?);
    println!();
    println!("Cashier token:");
    println!("{}", jwt.issue(cashier.id, Some(store.id), Role::Cashier)?);

    db.close().await;
    println!();
    println!("✓ Seed complete!");
    Ok(())
}
