//! # Seed Data Generator
//!
//! Populates a database with demo catalog data for development.
//!
//! ## Usage
//! ```bash
//! # Seed the default database path
//! cargo run -p dukaan-db --bin seed
//!
//! # Specify database path and tenant
//! cargo run -p dukaan-db --bin seed -- --db ./data/dukaan.db --tenant shop-01
//! ```
//!
//! Creates a handful of categories, a kiryana-store product range with
//! realistic prices and stock levels, one customer, and one supplier, so
//! the ledger and the dashboard have something to chew on immediately.

use std::env;

use tracing::info;
use tracing_subscriber::EnvFilter;

use dukaan_core::{Money, NewProduct, TenantId};
use dukaan_db::{Database, DbConfig};

/// (category, [(name, barcode, sale rupees, cost rupees, stock)])
const CATALOG: &[(&str, &[(&str, &str, i64, i64, i64)])] = &[
    (
        "Beverages",
        &[
            ("Coca-Cola 1.5L", "8964000100011", 180, 150, 48),
            ("Pepsi 1.5L", "8964000100028", 180, 150, 36),
            ("Nestle Water 1.5L", "8964000100035", 80, 55, 120),
            ("Rooh Afza 800ml", "8964000100042", 420, 350, 12),
            ("Tang Orange 750g", "8964000100059", 850, 720, 8),
        ],
    ),
    (
        "Grocery",
        &[
            ("Basmati Rice 5kg", "8964000200015", 1750, 1520, 20),
            ("Fine Flour 10kg", "8964000200022", 1150, 1030, 25),
            ("White Sugar 1kg", "8964000200039", 150, 132, 80),
            ("Dalda Ghee 1kg", "8964000200046", 580, 510, 30),
            ("Tapal Danedar 950g", "8964000200053", 900, 790, 15),
            ("Red Lentils 1kg", "8964000200060", 320, 270, 40),
        ],
    ),
    (
        "Personal Care",
        &[
            ("Lux Soap 145g", "8964000300019", 95, 70, 60),
            ("Lifebuoy Shampoo 375ml", "8964000300026", 350, 280, 18),
            ("Colgate Toothpaste 125g", "8964000300033", 230, 180, 24),
        ],
    ),
    (
        "Snacks",
        &[
            ("Lays Masala 40g", "8964000400013", 50, 38, 100),
            ("Kurkure Chutney 62g", "8964000400020", 50, 38, 90),
            ("Sooper Biscuits Family", "8964000400037", 120, 95, 45),
            ("Prince Biscuits Half Roll", "8964000400044", 35, 26, 150),
        ],
    ),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args: Vec<String> = env::args().collect();
    let db_path = arg_value(&args, "--db").unwrap_or_else(|| "./dukaan.db".to_string());
    let tenant = TenantId::new(arg_value(&args, "--tenant").unwrap_or_else(|| "demo-shop".to_string()));

    info!(db = %db_path, tenant = %tenant, "Seeding demo data");

    let db = Database::new(DbConfig::new(&db_path)).await?;

    let mut product_count = 0usize;
    for (category_name, products) in CATALOG {
        let category = db.categories().create(&tenant, category_name).await?;

        for (name, barcode, sale, cost, stock) in products.iter() {
            db.products()
                .create(
                    &tenant,
                    NewProduct {
                        name: (*name).to_string(),
                        barcode: (*barcode).to_string(),
                        sku: None,
                        sale_price: Money::from_rupees(*sale),
                        cost_price: Money::from_rupees(*cost),
                        stock_quantity: *stock,
                        low_stock_alert: NewProduct::DEFAULT_LOW_STOCK_ALERT,
                        category_id: category.id.clone(),
                    },
                )
                .await?;
            product_count += 1;
        }
    }

    db.customers()
        .create(&tenant, "Bilal Ahmed", "0300-1234567", Money::from_rupees(50_000))
        .await?;
    db.suppliers()
        .create(&tenant, "Karachi Traders", "Imran Siddiqui", "021-34567890")
        .await?;

    info!(
        products = product_count,
        categories = CATALOG.len(),
        "Seed complete"
    );

    db.close().await;
    Ok(())
}

/// Pulls `--flag value` out of argv.
fn arg_value(args: &[String], flag: &str) -> Option<String> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .cloned()
}
