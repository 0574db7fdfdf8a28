//! # Seed Data Generator
//!
//! Populates the database with sample customers and purchase orders for
//! development.
//!
//! ## Usage
//! ```bash
//! # 20 orders (default) into ./wako_dev.db
//! cargo run -p wako-db --bin seed
//!
//! # Custom amount and path
//! cargo run -p wako-db --bin seed -- --orders 100 --db ./data/wako.db
//! ```
//!
//! Everything goes through the repositories, so seeded orders get real
//! po_numbers and correct stored totals. Every third order is invoiced.

use std::env;
use wako_core::{Consignment, Money, NewCustomer, NewTransaction, NewTransactionItem};
use wako_db::{Database, DbConfig};

/// Sample customers: (company, contact, phone)
const CUSTOMERS: &[(Option<&str>, &str, Option<&str>)] = &[
    (Some("PT Sinar Jaya"), "Budi Santoso", Some("0812-1111-2222")),
    (Some("CV Maju Bersama"), "Siti Rahma", Some("0813-3333-4444")),
    (None, "Andi Wijaya", Some("0857-5555-6666")),
    (Some("Toko Berkah"), "Dewi Lestari", None),
    (Some("Yayasan Harapan"), "Rudi Hartono", Some("0821-7777-8888")),
];

/// Sample products: (name, unit price in rupiah)
const PRODUCTS: &[(&str, i64)] = &[
    ("Banner 3x1 m", 75_000),
    ("Spanduk 5x1 m", 120_000),
    ("Brosur A5", 750),
    ("Kartu Nama (box)", 35_000),
    ("Stiker Vinyl A3", 12_500),
    ("Nota 2 ply (buku)", 18_000),
    ("Undangan", 4_500),
    ("X-Banner", 95_000),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut orders: usize = 20;
    let mut db_path = String::from("./wako_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--orders" | "-n" => {
                if i + 1 < args.len() {
                    orders = args[i + 1].parse().unwrap_or(20);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Wako Back Office Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -n, --orders <N>   Number of purchase orders to create (default: 20)");
                println!("  -d, --db <PATH>    Database file path (default: ./wako_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("Wako Back Office Seed Data Generator");
    println!("====================================");
    println!("Database: {}", db_path);
    println!("Orders:   {}", orders);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("✓ Connected to database, migrations applied");

    let existing = db.transactions().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} purchase orders", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let mut customer_ids = Vec::with_capacity(CUSTOMERS.len());
    for (company, contact, phone) in CUSTOMERS {
        let customer = db
            .customers()
            .create(&NewCustomer {
                company_name: company.map(str::to_string),
                contact_name: contact.to_string(),
                phone: phone.map(str::to_string),
            })
            .await?;
        customer_ids.push(customer.id);
    }
    println!("✓ Created {} customers", customer_ids.len());

    let start = std::time::Instant::now();
    let mut invoiced = 0;

    for n in 0..orders {
        let order = generate_order(customer_ids[n % customer_ids.len()], n);
        let created = match db.transactions().create(&order).await {
            Ok(created) => created,
            Err(e) => {
                eprintln!("Failed to create order {}: {}", n, e);
                continue;
            }
        };

        if n % 3 == 0 {
            db.transactions().issue_invoice(&created.po_number).await?;
            invoiced += 1;
        }
    }

    println!(
        "✓ Created {} orders ({} invoiced) in {:?}",
        orders,
        invoiced,
        start.elapsed()
    );
    println!();
    println!("✓ Seed complete!");

    Ok(())
}

/// Builds a deterministic 1-3 item order from the seed index.
fn generate_order(customer_id: i64, seed: usize) -> NewTransaction {
    let item_count = 1 + seed % 3;

    let items = (0..item_count)
        .map(|k| {
            let (name, rupiah) = PRODUCTS[(seed * 7 + k * 3) % PRODUCTS.len()];
            let quantity = 1 + ((seed + k) * 13 % 50) as i64;

            // Small-ticket items sometimes carry a consignment batch.
            let consignment = (rupiah < 20_000 && (seed + k) % 4 == 0).then(|| Consignment {
                name: format!("{} (titip)", name),
                quantity: 10 * (1 + (seed % 5) as i64),
            });

            NewTransactionItem {
                item_name: name.to_string(),
                unit_price: Money::from_rupiah(rupiah),
                quantity,
                consignment,
            }
        })
        .collect();

    NewTransaction { customer_id, items }
}
