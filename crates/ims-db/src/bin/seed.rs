//! # Development Seeder
//!
//! Populates a development database with products, their initial receipts,
//! and a few restocks.
//!
//! ```bash
//! cargo run -p ims-db --bin seed                              # 200 products, ./ims_dev.db
//! cargo run -p ims-db --bin seed -- --count 40 --db ./ims.db
//! ```
//!
//! Each product gets:
//! - A name built from a hardware family and a size: `Hex Bolt M8`
//! - Price: 0.50 - 40.49
//! - Stock: 0 - 120, recorded as its ingest receipt
//! - Every third product also gets a manual restock receipt

use std::env;

use ims_core::NewProduct;
use ims_db::{Database, DbConfig};

/// (category id, family names) for generated products.
const FAMILIES: &[(i64, &[&str])] = &[
    (1, &["Hex Bolt", "Carriage Bolt", "Wood Screw", "Machine Screw", "Lag Screw"]),
    (2, &["Hex Nut", "Lock Nut", "Wing Nut", "Flat Washer", "Spring Washer"]),
    (3, &["Cable Tie", "Hose Clamp", "Wall Anchor", "Rivet", "Cotter Pin"]),
    (4, &["Drill Bit", "Hole Saw", "Countersink", "Tap", "Die"]),
];

const SIZES: &[&str] = &["M4", "M5", "M6", "M8", "M10", "M12", "M16", "M20"];

const TAX_RATES: &[f64] = &[0.0, 0.05, 0.0825, 0.1];

/// Command line options.
struct SeedArgs {
    count: usize,
    db_path: String,
}

const USAGE: &str = "\
seed: fill a development database with hardware products

usage: seed [--count N] [--db PATH]

  -c, --count N    products to create (default 200)
  -d, --db PATH    SQLite file (default ./ims_dev.db)
  -h, --help       print this text";

impl SeedArgs {
    /// Parses `env::args()`. Returns `None` when help was requested.
    fn parse() -> Option<Self> {
        let mut parsed = SeedArgs {
            count: 200,
            db_path: "./ims_dev.db".to_string(),
        };

        let mut args = env::args().skip(1);
        while let Some(flag) = args.next() {
            match flag.as_str() {
                "-c" | "--count" => {
                    if let Some(n) = args.next().and_then(|v| v.parse().ok()) {
                        parsed.count = n;
                    }
                }
                "-d" | "--db" => {
                    if let Some(path) = args.next() {
                        parsed.db_path = path;
                    }
                }
                "-h" | "--help" => return None,
                other => eprintln!("ignoring unknown argument {other:?}"),
            }
        }

        Some(parsed)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let Some(args) = SeedArgs::parse() else {
        println!("{USAGE}");
        return Ok(());
    };

    println!("seeding {} products into {}", args.count, args.db_path);

    let db = Database::new(DbConfig::new(&args.db_path)).await?;

    let existing = db.products().count().await?;
    if existing > 0 {
        println!("{existing} products already present, nothing to do (remove the file to reseed)");
        return Ok(());
    }

    let started = std::time::Instant::now();
    let mut created_count = 0;
    let mut restocks = 0;

    let catalog = FAMILIES.iter().flat_map(|(category_id, families)| {
        families.iter().enumerate().flat_map(move |(family_idx, family)| {
            SIZES
                .iter()
                .enumerate()
                .map(move |(size_idx, size)| (*category_id, family_idx, *family, size_idx, *size))
        })
    });

    for (category_id, family_idx, family, size_idx, size) in catalog.take(args.count) {
        let seed = (category_id as usize) * 1000 + family_idx * 20 + size_idx;
        let product = generate_product(category_id, family, size, seed);

        let created = match db.products().create_with_receipt(&product).await {
            Ok(created) => created,
            Err(e) => {
                eprintln!("skipped {}: {e}", product.name);
                continue;
            }
        };

        if seed % 3 == 0 {
            db.purchases()
                .insert_manual(created.product_id, product.supplier, 25)
                .await?;
            restocks += 1;
        }

        created_count += 1;
        if created_count % 50 == 0 {
            println!("  {created_count} products");
        }
    }

    let report = db
        .inventory()
        .snapshot(ims_core::StartingInventory::CurrentStock)
        .await?;
    let on_hand: i64 = report.iter().map(|row| row.inventory_on_hand).sum();

    println!(
        "created {created_count} products and {restocks} restocks in {:?}; {on_hand} units on hand",
        started.elapsed()
    );

    db.close().await;
    Ok(())
}

/// Generates a single product payload with deterministic pseudo-random data.
fn generate_product(category_id: i64, family: &str, size: &str, seed: usize) -> NewProduct {
    let base_price = 0.5 + ((seed * 17) % 4000) as f64 / 100.0;

    NewProduct {
        category_id,
        brand_id: 1 + (seed % 5) as i64,
        name: format!("{} {}", family, size),
        model: format!("{}-{:04}", size, seed),
        description: format!("{} ({}), zinc plated", family, size),
        quantity: (seed % 121) as i64,
        unit: "ea".to_string(),
        base_price,
        tax: TAX_RATES[seed % TAX_RATES.len()],
        min_order: 1 + (seed % 10) as i64,
        supplier: 1 + (seed % 3) as i64,
        status: "active".to_string(),
    }
}
