//! Command implementations

use anyhow::{Context, Result, bail};
use mrfoods_api::{Account, CartState, Order, OrdersState};
use mrfoods_config::DisplayConfig;
use mrfoods_core::{
    CheckoutRequest, CoreEvent, PromotionTask, SessionView, SignUpRequest, Storefront,
};
use mrfoods_store::{AuditEvent, AuditEventType, Slot, Store};
use mrfoods_util::{MenuItemId, OrderId, format_datetime_full, format_duration};
use std::sync::Arc;
use std::time::Duration;
use tokio::signal::unix::{SignalKind, signal};
use tokio::sync::{Mutex, mpsc};
use tracing::{info, warn};

pub fn menu(storefront: &Storefront, category: Option<&str>) -> Result<()> {
    let display = storefront.display();
    let catalog = storefront.catalog();

    let Some(key) = category else {
        for category in catalog.categories() {
            println!("{} [{}]", category.title, category.id);
            for item in &category.items {
                print_dish(item.id, &item.name, &display.format_price(item.price));
            }
            println!();
        }
        return Ok(());
    };

    let dishes = catalog.in_category(key);
    let Some(first) = dishes.first() else {
        bail!("No menu category '{key}'");
    };
    println!("{}", first.category);
    for dish in &dishes {
        print_dish(dish.id, &dish.name, &display.format_price(dish.price));
    }
    Ok(())
}

fn print_dish(id: MenuItemId, name: &str, price: &str) {
    println!("  {:>3}  {:<28} {:>8}", id.get(), name, price);
}

pub fn sign_up(
    storefront: &mut Storefront,
    username: String,
    password: String,
    email: String,
    full_name: String,
) -> Result<()> {
    let request = SignUpRequest::new(username, password, email, full_name);
    let account = storefront.identity_mut().sign_up(request)?;
    println!(
        "Welcome, {}! Signed in as {} [{}]",
        display_name(account),
        account.username,
        account.badge()
    );
    Ok(())
}

pub fn sign_in(storefront: &mut Storefront, username: &str, password: &str) -> Result<()> {
    let account = storefront.identity_mut().sign_in(username, password)?;
    println!("Welcome back, {}!", display_name(account));
    Ok(())
}

pub fn logout(storefront: &mut Storefront) -> Result<()> {
    match storefront.identity_mut().logout()? {
        Some(username) => println!("Signed out {username}"),
        None => println!("Not signed in"),
    }
    Ok(())
}

pub fn whoami(storefront: &Storefront) -> Result<()> {
    match storefront.identity().current() {
        Some(account) => {
            println!("[{}] {}", account.badge(), account.username);
            if !account.full_name.is_empty() {
                println!("  Name:  {}", account.full_name);
            }
            if !account.email.is_empty() {
                println!("  Email: {}", account.email);
            }
        }
        None => println!("Not signed in"),
    }
    Ok(())
}

fn display_name(account: &Account) -> &str {
    if account.full_name.trim().is_empty() {
        account.username.as_str()
    } else {
        &account.full_name
    }
}

pub fn cart_show(storefront: &Storefront) -> Result<()> {
    let display = storefront.display();
    let cart = storefront.cart().state();

    if cart.is_empty() {
        println!("Your cart is empty");
        return Ok(());
    }

    for item in &cart.items {
        println!(
            "  {:>3}  {:<28} {:>3} x {:>8} = {:>8}",
            item.id,
            item.name,
            item.quantity,
            display.format_price(item.price),
            display.format_price(item.line_total())
        );
    }
    println!(
        "{} plates, total {}{}",
        cart.item_count(),
        display.format_price(cart.total),
        if cart.is_open { " (open)" } else { "" }
    );
    Ok(())
}

pub fn cart_add(storefront: &mut Storefront, dish: MenuItemId) -> Result<()> {
    let item = storefront.add_dish_to_cart(dish)?;
    println!("Added {} to your cart", item.name);
    Ok(())
}

pub fn cart_remove(storefront: &mut Storefront, dish: MenuItemId) -> Result<()> {
    if storefront.cart_mut().remove_item(&dish.to_string())? {
        println!("Removed dish {dish} from your cart");
    } else {
        println!("Dish {dish} is not in your cart");
    }
    Ok(())
}

pub fn cart_set(storefront: &mut Storefront, dish: MenuItemId, quantity: i64) -> Result<()> {
    if !storefront
        .cart_mut()
        .update_quantity(&dish.to_string(), quantity)?
    {
        println!("Dish {dish} is not in your cart");
        return Ok(());
    }
    cart_show(storefront)
}

pub fn cart_clear(storefront: &mut Storefront) -> Result<()> {
    let removed = storefront.cart_mut().clear_cart()?;
    println!("Removed {removed} entries from your cart");
    Ok(())
}

pub fn cart_toggle(storefront: &mut Storefront) -> Result<()> {
    let open = storefront.cart_mut().toggle_open()?;
    println!("Cart is now {}", if open { "open" } else { "closed" });
    Ok(())
}

pub fn cart_set_open(storefront: &mut Storefront, open: bool) -> Result<()> {
    storefront.cart_mut().set_open(open)?;
    println!("Cart is now {}", if open { "open" } else { "closed" });
    Ok(())
}

pub fn checkout(storefront: &mut Storefront, name: &str, dish: Option<MenuItemId>) -> Result<()> {
    let request = match dish {
        Some(id) => CheckoutRequest::dish(id, name),
        None => CheckoutRequest::cart(name),
    };
    let order = storefront.checkout(&request)?;

    println!(
        "Thank you, {}! Order {} placed: {} plates, total {}",
        order.customer_name.as_deref().unwrap_or(name),
        order.id,
        order.plate_count(),
        storefront.display().format_price(order.total)
    );
    println!(
        "It will be ready in about {}",
        format_duration(storefront.orders().completion_after())
    );
    Ok(())
}

pub fn orders_list(storefront: &Storefront, all: bool) -> Result<()> {
    let orders: Vec<&Order> = if all {
        storefront.orders().all().iter().collect()
    } else {
        if storefront.identity().session_view() == SessionView::SignedOut {
            println!("Sign in to see your orders");
            return Ok(());
        }
        storefront.visible_orders()
    };

    if orders.is_empty() {
        println!("No orders yet");
        return Ok(());
    }

    let display = storefront.display();
    for order in orders {
        print_order(display, order);
    }
    Ok(())
}

fn print_order(display: &DisplayConfig, order: &Order) {
    println!(
        "{}  {:<9}  {}  {:>8}  {} plates{}",
        order.id,
        order.status.as_str(),
        format_datetime_full(&order.date),
        display.format_price(order.total),
        order.plate_count(),
        order
            .customer_name
            .as_deref()
            .map(|name| format!("  for {name}"))
            .unwrap_or_default()
    );
    for item in &order.items {
        println!(
            "    {:>3} x {:<28} {:>8}",
            item.quantity,
            item.name,
            display.format_price(item.line_total())
        );
    }
}

pub fn orders_cancel(storefront: &mut Storefront, id: &OrderId) -> Result<()> {
    storefront.cancel_order(id)?;
    println!("Order {id} cancelled");
    Ok(())
}

pub fn orders_clear(storefront: &mut Storefront) -> Result<()> {
    if let CoreEvent::OrdersCleared { count } = storefront.orders_mut().clear_orders()? {
        println!("Deleted {count} orders");
    }
    Ok(())
}

pub fn sweep(storefront: &mut Storefront) -> Result<()> {
    let events = storefront.sweep(&mrfoods_util::now())?;
    if events.is_empty() {
        println!("No orders due for completion");
    }
    for event in &events {
        println!("{}", describe_event(storefront.display(), event));
    }
    Ok(())
}

fn describe_event(display: &DisplayConfig, event: &CoreEvent) -> String {
    match event {
        CoreEvent::OrderPlaced {
            order_id, total, ..
        } => format!("Order {order_id} placed ({})", display.format_price(*total)),
        CoreEvent::OrderStatusChanged { order_id, from, to } => {
            format!("Order {order_id}: {from} -> {to}")
        }
        CoreEvent::OrderCompleted {
            order_id, waited, ..
        } => format!("Order {order_id} completed after {}", format_duration(*waited)),
        CoreEvent::OrdersCleared { count } => format!("{count} orders cleared"),
    }
}

pub async fn serve(storefront: Storefront, interval: Duration) -> Result<()> {
    let store = storefront.store().clone();
    let display = storefront.display().clone();
    store.append_audit(AuditEvent::new(AuditEventType::ServiceStarted))?;

    let shared = Arc::new(Mutex::new(storefront));
    let (events_tx, mut events) = mpsc::unbounded_channel();
    let task = PromotionTask::spawn(shared, interval, events_tx);

    // Set up signal handlers
    let mut sigterm =
        signal(SignalKind::terminate()).context("Failed to create SIGTERM handler")?;
    let mut sigint = signal(SignalKind::interrupt()).context("Failed to create SIGINT handler")?;
    let mut sighup = signal(SignalKind::hangup()).context("Failed to create SIGHUP handler")?;

    println!(
        "Completing pending orders every {}; press Ctrl-C to stop",
        format_duration(interval)
    );

    loop {
        tokio::select! {
            _ = sigterm.recv() => {
                info!("Received SIGTERM, shutting down gracefully");
                break;
            }
            _ = sigint.recv() => {
                info!("Received SIGINT, shutting down gracefully");
                break;
            }
            _ = sighup.recv() => {
                info!("Received SIGHUP, shutting down gracefully");
                break;
            }

            event = events.recv() => match event {
                Some(event) => println!("{}", describe_event(&display, &event)),
                None => {
                    warn!("Promotion task ended unexpectedly");
                    break;
                }
            }
        }
    }

    task.stop().await;
    store.append_audit(AuditEvent::new(AuditEventType::ServiceStopped))?;
    info!("Shutdown complete");
    Ok(())
}

pub fn audit(storefront: &Storefront, limit: usize) -> Result<()> {
    let events = storefront.store().get_recent_audits(limit)?;
    if events.is_empty() {
        println!("No activity recorded");
    }
    for event in events {
        let details = serde_json::to_string(&event.event)?;
        println!(
            "{:>5}  {}  {}",
            event.id,
            format_datetime_full(&event.timestamp),
            details
        );
    }
    Ok(())
}

/// Per-slot presence and parse status
pub fn inspect(store: &dyn Store) -> Result<()> {
    println!("store healthy: {}", store.is_healthy());

    for slot in Slot::ALL {
        let Some(raw) = store.read_slot(slot)? else {
            println!("{:<12} absent", slot.key());
            continue;
        };

        let status = match slot {
            Slot::User => serde_json::from_str::<Account>(&raw)
                .map(|a| format!("session for {}", a.username)),
            Slot::Users => {
                serde_json::from_str::<Vec<Account>>(&raw).map(|a| format!("{} accounts", a.len()))
            }
            Slot::Cart => serde_json::from_str::<CartState>(&raw).map(|c| {
                format!(
                    "{} entries, {} plates, total {}",
                    c.items.len(),
                    c.item_count(),
                    c.total
                )
            }),
            Slot::Orders => serde_json::from_str::<OrdersState>(&raw)
                .map(|o| format!("{} orders", o.orders.len())),
        };

        match status {
            Ok(summary) => println!("{:<12} ok ({} bytes): {}", slot.key(), raw.len(), summary),
            Err(e) => println!("{:<12} unparseable ({} bytes): {}", slot.key(), raw.len(), e),
        }
    }
    Ok(())
}
