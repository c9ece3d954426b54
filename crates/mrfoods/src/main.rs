//! mrfoods - restaurant ordering from the command line
//!
//! Wires together:
//! - Configuration loading
//! - Store initialization (SQLite file or memory)
//! - The storefront (identity, cart, orders)
//! - The promotion task, for `serve`

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use mrfoods_config::{Settings, StorageBackend, load_config_or_default};
use mrfoods_core::Storefront;
use mrfoods_store::{MemoryStore, SqliteStore, Store};
use mrfoods_util::{
    MOCK_TIME_ENV_VAR, MRFOODS_CONFIG_ENV, MRFOODS_DATA_DIR_ENV, MenuItemId, OrderId,
    default_config_path, is_mock_time_active,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

mod commands;

/// mrfoods - order food from the MR Foods menu
#[derive(Parser, Debug)]
#[command(name = "mrfoods", version)]
#[command(about = "Browse the menu, fill a cart, place and track orders", long_about = None)]
struct Args {
    /// Configuration file path (default: ~/.config/mrfoods/config.toml)
    #[arg(short, long, env = MRFOODS_CONFIG_ENV, default_value_os_t = default_config_path())]
    config: PathBuf,

    /// Data directory override (or set MRFOODS_DATA_DIR env var)
    #[arg(short, long, env = MRFOODS_DATA_DIR_ENV)]
    data_dir: Option<PathBuf>,

    /// Keep all state in memory for this run only
    #[arg(long)]
    ephemeral: bool,

    /// Log level
    #[arg(short, long, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the menu
    Menu {
        /// Only show one category (id or name)
        #[arg(long)]
        category: Option<String>,
    },

    /// Register an account and sign in
    Signup {
        #[arg(short, long)]
        username: String,
        #[arg(short, long, env = "MRFOODS_PASSWORD", hide_env_values = true)]
        password: String,
        #[arg(short, long)]
        email: String,
        #[arg(short, long)]
        full_name: String,
    },

    /// Sign in to an existing account
    Signin {
        username: String,
        #[arg(short, long, env = "MRFOODS_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Sign out
    Logout,

    /// Show the signed-in account
    Whoami,

    /// Inspect or change the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },

    /// Place an order from the cart, or for a single dish
    Checkout {
        /// Name the order is placed for
        #[arg(short, long)]
        name: String,

        /// Order one plate of this dish instead of the cart
        #[arg(long)]
        dish: Option<u32>,
    },

    /// Order history
    Orders {
        #[command(subcommand)]
        action: OrdersAction,
    },

    /// Complete pending orders that are old enough, once
    Sweep,

    /// Keep completing orders until interrupted
    Serve,

    /// Show recent activity
    Audit {
        #[arg(short = 'n', long, default_value_t = 20)]
        limit: usize,
    },

    /// Report what each persisted slot holds
    Inspect,
}

#[derive(Subcommand, Debug)]
enum CartAction {
    /// Show the cart
    Show,
    /// Add one plate of a dish
    Add { dish: u32 },
    /// Remove a dish entirely
    Remove { dish: u32 },
    /// Set the number of plates of a dish (0 or less removes it)
    Set {
        dish: u32,
        #[arg(allow_hyphen_values = true)]
        quantity: i64,
    },
    /// Empty the cart
    Clear,
    /// Flip the open flag
    Toggle,
    /// Mark the cart open
    Open,
    /// Mark the cart closed
    Close,
}

#[derive(Subcommand, Debug)]
enum OrdersAction {
    /// List orders of the signed-in user
    List {
        /// Show every order in the ledger
        #[arg(long)]
        all: bool,
    },
    /// Cancel a pending order
    Cancel { id: String },
    /// Delete every order
    Clear,
}

fn load_settings(args: &Args) -> Result<Settings> {
    let mut settings = load_config_or_default(&args.config)
        .with_context(|| format!("Failed to load config from {:?}", args.config))?;

    if let Some(data_dir) = &args.data_dir {
        settings.storage.data_dir = data_dir.clone();
    }

    info!(
        config_path = %args.config.display(),
        dishes = settings.catalog.len(),
        backend = ?settings.storage.backend,
        "Configuration loaded"
    );
    Ok(settings)
}

fn open_store(settings: &Settings, ephemeral: bool) -> Result<Arc<dyn Store>> {
    if ephemeral || settings.storage.backend == StorageBackend::Memory {
        warn!("Using in-memory store, nothing will be persisted");
        return Ok(Arc::new(MemoryStore::new()));
    }

    let data_dir = &settings.storage.data_dir;
    std::fs::create_dir_all(data_dir)
        .with_context(|| format!("Failed to create data directory {:?}", data_dir))?;

    let db_path = settings.storage.database_path();
    let store = SqliteStore::open(&db_path)
        .with_context(|| format!("Failed to open database {:?}", db_path))?;

    debug!(db_path = %db_path.display(), "Store initialized");
    Ok(Arc::new(store))
}

async fn run(args: Args) -> Result<()> {
    let settings = load_settings(&args)?;
    let store = open_store(&settings, args.ephemeral)?;

    // Inspect looks at the slots before rehydration can discard anything
    if let Command::Inspect = args.command {
        return commands::inspect(&*store);
    }

    let mut storefront = Storefront::new(store, &settings);
    storefront
        .start()
        .context("Failed to load persisted state")?;

    match args.command {
        Command::Menu { category } => commands::menu(&storefront, category.as_deref()),
        Command::Signup {
            username,
            password,
            email,
            full_name,
        } => commands::sign_up(&mut storefront, username, password, email, full_name),
        Command::Signin { username, password } => {
            commands::sign_in(&mut storefront, &username, &password)
        }
        Command::Logout => commands::logout(&mut storefront),
        Command::Whoami => commands::whoami(&storefront),
        Command::Cart { action } => match action {
            CartAction::Show => commands::cart_show(&storefront),
            CartAction::Add { dish } => commands::cart_add(&mut storefront, MenuItemId::new(dish)),
            CartAction::Remove { dish } => {
                commands::cart_remove(&mut storefront, MenuItemId::new(dish))
            }
            CartAction::Set { dish, quantity } => {
                commands::cart_set(&mut storefront, MenuItemId::new(dish), quantity)
            }
            CartAction::Clear => commands::cart_clear(&mut storefront),
            CartAction::Toggle => commands::cart_toggle(&mut storefront),
            CartAction::Open => commands::cart_set_open(&mut storefront, true),
            CartAction::Close => commands::cart_set_open(&mut storefront, false),
        },
        Command::Checkout { name, dish } => {
            commands::checkout(&mut storefront, &name, dish.map(MenuItemId::new))
        }
        Command::Orders { action } => match action {
            OrdersAction::List { all } => commands::orders_list(&storefront, all),
            OrdersAction::Cancel { id } => {
                commands::orders_cancel(&mut storefront, &OrderId::new(id))
            }
            OrdersAction::Clear => commands::orders_clear(&mut storefront),
        },
        Command::Sweep => commands::sweep(&mut storefront),
        Command::Serve => commands::serve(storefront, settings.orders.sweep_interval).await,
        Command::Audit { limit } => commands::audit(&storefront, limit),
        Command::Inspect => commands::inspect(&**storefront.store()),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    debug!(version = env!("CARGO_PKG_VERSION"), "mrfoods starting");
    if is_mock_time_active() {
        warn!(
            env = MOCK_TIME_ENV_VAR,
            now = %mrfoods_util::now(),
            "Mock time active, order ages use the shifted clock"
        );
    }

    run(args).await
}
