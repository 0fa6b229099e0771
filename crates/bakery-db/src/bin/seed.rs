//! # Seed Data Generator
//!
//! Populates a development database with pickup locations, products and a
//! spread of orders around today, then prints the resulting dashboard.
//!
//! ## Usage
//! ```bash
//! # 200 orders (default) into $BAKERY_DB_PATH or ./bakery_dev.db
//! cargo run -p bakery-db --bin seed
//!
//! # Custom amount and database
//! cargo run -p bakery-db --bin seed -- --orders 1000 --db ./data/bakery.db
//! ```
//!
//! ## Generated Orders
//! Due dates range from 60 days ago to a week ahead. Past orders are mostly
//! delivered, with the odd cancellation; today's orders are spread over every
//! state; future orders are new or confirmed. Each order has one to three
//! lines. Values are derived from the order index, so runs are repeatable.

use std::env;

use bakery_core::{
    FilterableCrudService, Money, OrderService, OrderState, PickupLocation,
    PickupLocationService, Product, ProductService, Role, User,
};
use bakery_db::{DashboardConfig, Database, DbConfig};
use chrono::{Days, Local, NaiveDate, NaiveTime};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const PICKUP_LOCATIONS: &[&str] = &["Store", "Bakery", "Central", "North Hub"];

/// Products with prices in cents.
const PRODUCTS: &[(&str, i64)] = &[
    ("Strawberry Bun", 300),
    ("Vanilla Cracker", 150),
    ("Blueberry Cheese Cake", 1250),
    ("Apple Pie", 900),
    ("Cinnamon Roll", 350),
    ("Sourdough Loaf", 600),
    ("Chocolate Croissant", 325),
    ("Raspberry Tart", 475),
    ("Carrot Cake", 1100),
    ("Lemon Muffin", 275),
];

const FIRST_NAMES: &[&str] = &["Ida", "Nils", "Maja", "Oskar", "Elsa", "Hugo", "Alva", "Leo"];
const LAST_NAMES: &[&str] = &["Lund", "Berg", "Holm", "Strand", "Ek", "Dahl"];

const DEFAULT_ORDERS: usize = 200;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let args: Vec<String> = env::args().collect();

    let mut orders: usize = DEFAULT_ORDERS;
    let mut config = DbConfig::from_env();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--orders" | "-o" => {
                if i + 1 < args.len() {
                    orders = args[i + 1].parse().unwrap_or(DEFAULT_ORDERS);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    config = DbConfig::new(&args[i + 1]);
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Bakery Admin Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -o, --orders <N>   Number of orders to generate (default: {DEFAULT_ORDERS})");
                println!("  -d, --db <PATH>    Database file path (default: $BAKERY_DB_PATH or ./bakery_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            other => warn!(argument = other, "Ignoring unknown argument"),
        }
        i += 1;
    }

    info!(path = %config.database_path.display(), orders, "Seeding database");

    let db = Database::new(config).await?;
    let actor = seed_user();

    let locations = PickupLocationService::new(db.pickup_locations());
    let products = ProductService::new(db.products());
    let order_service = OrderService::new(db.orders());

    if order_service.count().await? > 0 {
        warn!("Database already has orders; delete the file to regenerate");
        return Ok(());
    }

    let mut location_ids = Vec::with_capacity(PICKUP_LOCATIONS.len());
    for name in PICKUP_LOCATIONS {
        let saved = locations.save(&actor, PickupLocation::named(*name)).await?;
        location_ids.extend(saved.id);
    }

    let mut product_ids = Vec::with_capacity(PRODUCTS.len());
    for (name, cents) in PRODUCTS {
        let saved = products
            .save(&actor, Product::new(*name, Money::from_cents(*cents)))
            .await?;
        product_ids.extend(saved.id);
    }

    info!(
        locations = location_ids.len(),
        products = product_ids.len(),
        "Catalogue created"
    );

    let today = Local::now().date_naive();
    let start = std::time::Instant::now();

    for n in 0..orders {
        let (due, state) = schedule(today, n);

        let mut order = order_service.create_new(&actor);
        order.customer_name = format!(
            "{} {}",
            FIRST_NAMES[n % FIRST_NAMES.len()],
            LAST_NAMES[(n / FIRST_NAMES.len()) % LAST_NAMES.len()]
        );
        order.customer_phone = format!("555-{:04}", n % 10_000);
        order.due_date = due;
        order.due_time = NaiveTime::from_hms_opt(8 + (n % 10) as u32, (n % 4) as u32 * 15, 0);
        order.pickup_location_id = location_ids.get(n % location_ids.len().max(1)).copied();

        let saved = order_service.save(&actor, order).await?;
        let Some(order_id) = saved.id else {
            continue;
        };

        for line in 0..(1 + n % 3) {
            let Some(product_id) = product_ids.get((n * 7 + line * 3) % product_ids.len().max(1))
            else {
                break;
            };
            let quantity = 1 + ((n + line) % 4) as i64;
            db.orders()
                .add_item(order_id, *product_id, quantity, None)
                .await?;
        }

        if state != OrderState::New {
            db.orders().set_state(order_id, state).await?;
        }

        if (n + 1) % 50 == 0 {
            info!(generated = n + 1, "Orders generated");
        }
    }

    info!(orders, elapsed = ?start.elapsed(), "Orders created");

    let dashboard = db
        .dashboard(DashboardConfig::default())
        .load_dashboard(today)
        .await?;

    let stats = dashboard.delivery_stats();
    println!("Dashboard for {today}");
    println!("  Delivered today:     {}", stats.delivered_today);
    println!("  Due today:           {}", stats.due_today);
    println!("  Due tomorrow:        {}", stats.due_tomorrow);
    println!("  Not available today: {}", stats.not_available_today);
    println!("  New orders:          {}", stats.new_orders);
    println!();
    println!("Top products this month:");
    for (product, count) in dashboard.product_deliveries().iter() {
        println!("  {:<24} {}", product.name, count);
    }

    if env::var("SEED_PRINT_JSON").is_ok() {
        println!("{}", serde_json::to_string_pretty(&dashboard)?);
    }

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,bakery=debug,sqlx=warn"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// The back-office user all seed data is created by.
fn seed_user() -> User {
    User {
        id: 1,
        email: "admin@bakery.test".to_string(),
        first_name: "Seed".to_string(),
        last_name: "Admin".to_string(),
        role: Role::Admin,
    }
}

/// Due date and final state for the `n`th order.
fn schedule(today: NaiveDate, n: usize) -> (NaiveDate, OrderState) {
    // -60 ..= +7 days around today
    let offset = (n * 13) % 68;
    let due = if offset <= 60 {
        today.checked_sub_days(Days::new((60 - offset) as u64))
    } else {
        today.checked_add_days(Days::new((offset - 60) as u64))
    }
    .unwrap_or(today);

    let state = match due.cmp(&today) {
        std::cmp::Ordering::Less if n % 17 == 0 => OrderState::Cancelled,
        std::cmp::Ordering::Less => OrderState::Delivered,
        std::cmp::Ordering::Equal => match n % 5 {
            0 => OrderState::Delivered,
            1 => OrderState::Ready,
            2 => OrderState::Problem,
            3 => OrderState::Confirmed,
            _ => OrderState::New,
        },
        std::cmp::Ordering::Greater if n % 2 == 0 => OrderState::Confirmed,
        std::cmp::Ordering::Greater => OrderState::New,
    };

    (due, state)
}
