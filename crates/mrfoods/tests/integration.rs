//! Integration tests for mrfoods
//!
//! These drive the storefront end to end over a SQLite file and reopen it
//! to check what survives a restart.

use mrfoods_api::{Account, CartState, OrderStatus, OrdersState};
use mrfoods_config::{PasswordStorage, Settings, parse_config};
use mrfoods_core::{
    AccountError, CheckoutRequest, CoreEvent, PromotionTask, SignUpRequest, Storefront,
};
use mrfoods_store::{AuditEventType, Slot, SqliteStore, Store, StoreExt};
use mrfoods_util::MenuItemId;
use rust_decimal::Decimal;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, mpsc};

fn make_test_settings(data_dir: &Path) -> Settings {
    let config = format!(
        r#"
        config_version = 1

        [storage]
        backend = "sqlite"
        data_dir = "{}"

        [orders]
        completion_after_minutes = 15
        sweep_interval_seconds = 1

        [accounts]
        password_storage = "plain"
        "#,
        data_dir.display()
    );
    parse_config(&config).unwrap()
}

fn open_storefront(settings: &Settings) -> Storefront {
    let store: Arc<dyn Store> =
        Arc::new(SqliteStore::open(settings.storage.database_path()).unwrap());
    let mut storefront = Storefront::new(store, settings);
    storefront.start().unwrap();
    storefront
}

fn alice() -> SignUpRequest {
    SignUpRequest::new("alice1", "pass123", "a@b.com", "Alice Smith")
}

#[test]
fn test_full_ordering_flow() {
    let dir = tempfile::tempdir().unwrap();
    let settings = make_test_settings(dir.path());
    let mut storefront = open_storefront(&settings);

    // Sign up derives initials and activates the session
    let account = storefront.identity_mut().sign_up(alice()).unwrap().clone();
    assert_eq!(account.initials, "AS");

    // Re-sign-in works, wrong password does not
    storefront.identity_mut().logout().unwrap();
    assert!(storefront.identity_mut().sign_in("alice1", "pass123").is_ok());
    storefront.identity_mut().logout().unwrap();
    assert!(matches!(
        storefront.identity_mut().sign_in("alice1", "nope!"),
        Err(AccountError::InvalidCredentials)
    ));
    storefront.identity_mut().sign_in("alice1", "pass123").unwrap();

    // Classic Burger twice
    storefront.add_dish_to_cart(MenuItemId::new(7)).unwrap();
    storefront.add_dish_to_cart(MenuItemId::new(7)).unwrap();
    assert_eq!(storefront.cart().items()[0].quantity, 2);
    assert_eq!(storefront.cart().total(), Decimal::from(298));

    let order = storefront
        .checkout(&CheckoutRequest::cart("Alice"))
        .unwrap();
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.username.as_ref().map(|u| u.as_str()), Some("alice1"));
    assert_eq!(order.total, Decimal::from(298));
    assert!(storefront.cart().is_empty());
    assert_eq!(storefront.visible_orders().len(), 1);
}

#[test]
fn test_state_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let settings = make_test_settings(dir.path());

    let order_id = {
        let mut storefront = open_storefront(&settings);
        storefront.identity_mut().sign_up(alice()).unwrap();
        storefront.add_dish_to_cart(MenuItemId::new(1)).unwrap();
        let order = storefront
            .checkout(&CheckoutRequest::cart("Alice"))
            .unwrap();
        storefront.add_dish_to_cart(MenuItemId::new(12)).unwrap();
        storefront.cart_mut().set_open(true).unwrap();
        order.id
    };

    let storefront = open_storefront(&settings);

    // Session rehydrated
    assert_eq!(
        storefront
            .identity()
            .current()
            .map(|a| a.username.as_str()),
        Some("alice1")
    );
    assert_eq!(storefront.identity().accounts().len(), 1);

    // Cart kept its contents and open flag
    assert_eq!(storefront.cart().items().len(), 1);
    assert_eq!(storefront.cart().items()[0].id, "12");
    assert!(storefront.cart().is_open());

    // Order ledger intact
    let visible = storefront.visible_orders();
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].id, order_id);
}

#[test]
fn test_persisted_layout_uses_original_slot_names() {
    let dir = tempfile::tempdir().unwrap();
    let settings = make_test_settings(dir.path());
    let mut storefront = open_storefront(&settings);
    storefront.identity_mut().sign_up(alice()).unwrap();
    storefront.add_dish_to_cart(MenuItemId::new(7)).unwrap();
    storefront
        .checkout(&CheckoutRequest::dish(MenuItemId::new(3), "Alice"))
        .unwrap();

    let store = storefront.store();
    let user: serde_json::Value =
        serde_json::from_str(&store.read_slot(Slot::User).unwrap().unwrap()).unwrap();
    assert_eq!(user["username"], "alice1");
    assert_eq!(user["fullName"], "Alice Smith");
    assert_eq!(user["initials"], "AS");

    let cart: serde_json::Value =
        serde_json::from_str(&store.read_slot(Slot::Cart).unwrap().unwrap()).unwrap();
    assert_eq!(cart["items"][0]["id"], "7");
    assert_eq!(cart["isOpen"], false);

    let orders: serde_json::Value =
        serde_json::from_str(&store.read_slot(Slot::Orders).unwrap().unwrap()).unwrap();
    let first = &orders["orders"][0];
    assert_eq!(first["status"], "pending");
    assert_eq!(first["customerName"], "Alice");
    assert!(first["orderTime"].is_i64());
    assert!(first["id"].as_str().unwrap().starts_with("ORD-"));
}

#[test]
fn test_reads_records_written_by_the_browser_layout() {
    let dir = tempfile::tempdir().unwrap();
    let settings = make_test_settings(dir.path());
    {
        let store = SqliteStore::open(settings.storage.database_path()).unwrap();
        store
            .write_slot(
                Slot::Users,
                r#"[{"username":"legacy1","password":"oldpass","email":"old@example.com","fullName":"Old Timer","initials":"OT"}]"#,
            )
            .unwrap();
        store
            .write_slot(
                Slot::Orders,
                r#"{"orders":[{"id":"ORD-1700000000000","date":"2023-11-14T22:13:20.000Z","items":[{"id":"7","name":"Classic Burger","price":149,"quantity":1,"image":"/images/classic-burger.png","category":"Fast Food"}],"total":149,"status":"pending","orderTime":1700000000000,"username":"legacy1","customerName":"Old"}]}"#,
            )
            .unwrap();
    }

    let mut storefront = open_storefront(&settings);
    storefront
        .identity_mut()
        .sign_in("legacy1", "oldpass")
        .unwrap();
    assert_eq!(storefront.visible_orders().len(), 1);

    // Long past its completion time
    let events = storefront.sweep(&mrfoods_util::now()).unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(storefront.visible_orders()[0].status, OrderStatus::Completed);
}

#[test]
fn test_corrupt_slots_are_discarded_on_start() {
    let dir = tempfile::tempdir().unwrap();
    let settings = make_test_settings(dir.path());
    {
        let store = SqliteStore::open(settings.storage.database_path()).unwrap();
        store.write_slot(Slot::User, "{\"username\":").unwrap();
        store.write_slot(Slot::Cart, "42").unwrap();
        store.write_slot(Slot::Orders, "null").unwrap();
    }

    let storefront = open_storefront(&settings);
    assert!(storefront.identity().current().is_none());
    assert!(storefront.cart().is_empty());
    assert!(storefront.orders().all().is_empty());

    let store = storefront.store();
    assert_eq!(store.read_slot(Slot::User).unwrap(), None);
    let audits = store.get_recent_audits(10).unwrap();
    let discarded = audits
        .iter()
        .filter(|a| matches!(a.event, AuditEventType::CorruptStateDiscarded { .. }))
        .count();
    assert_eq!(discarded, 3);
}

#[test]
fn test_accounts_and_orders_are_per_user() {
    let dir = tempfile::tempdir().unwrap();
    let settings = make_test_settings(dir.path());
    let mut storefront = open_storefront(&settings);

    storefront.identity_mut().sign_up(alice()).unwrap();
    storefront
        .checkout(&CheckoutRequest::dish(MenuItemId::new(1), "Alice"))
        .unwrap();
    storefront.identity_mut().logout().unwrap();
    assert!(storefront.visible_orders().is_empty());

    storefront
        .identity_mut()
        .sign_up(SignUpRequest::new(
            "bobby1",
            "secret1",
            "bob@example.com",
            "Bob Jones",
        ))
        .unwrap();
    storefront
        .checkout(&CheckoutRequest::dish(MenuItemId::new(2), "Bob"))
        .unwrap();
    storefront
        .checkout(&CheckoutRequest::dish(MenuItemId::new(3), "Bob"))
        .unwrap();

    assert_eq!(storefront.visible_orders().len(), 2);
    assert_eq!(storefront.orders().all().len(), 3);

    let accounts: Vec<Account> = storefront.store().load(Slot::Users).unwrap().unwrap();
    assert_eq!(accounts.len(), 2);
    let ledger: OrdersState = storefront.store().load(Slot::Orders).unwrap().unwrap();
    assert_eq!(ledger.orders.len(), 3);
    assert!(storefront.cart().is_empty());
    assert_eq!(
        storefront.store().load::<CartState>(Slot::Cart).unwrap(),
        None
    );
}

#[tokio::test]
async fn test_promotion_task_over_sqlite() {
    let dir = tempfile::tempdir().unwrap();
    let settings = make_test_settings(dir.path());
    let mut storefront = open_storefront(&settings);
    storefront.identity_mut().sign_up(alice()).unwrap();

    let placed = mrfoods_util::now() - chrono::Duration::minutes(16);
    let old = storefront
        .checkout_at(&CheckoutRequest::dish(MenuItemId::new(5), "Alice"), placed)
        .unwrap();
    let fresh = storefront
        .checkout(&CheckoutRequest::dish(MenuItemId::new(6), "Alice"))
        .unwrap();

    let shared = Arc::new(Mutex::new(storefront));
    let (tx, mut rx) = mpsc::unbounded_channel();
    let task = PromotionTask::spawn(shared.clone(), Duration::from_millis(25), tx);

    let event = tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .unwrap()
        .unwrap();
    assert!(matches!(
        event,
        CoreEvent::OrderCompleted { ref order_id, .. } if order_id == &old.id
    ));
    task.stop().await;

    drop(shared);
    let reopened = open_storefront(&settings);
    assert_eq!(
        reopened.orders().get(&old.id).unwrap().status,
        OrderStatus::Completed
    );
    assert_eq!(
        reopened.orders().get(&fresh.id).unwrap().status,
        OrderStatus::Pending
    );
}

#[test]
fn test_sweep_keeps_orders_placed_by_another_process() {
    let dir = tempfile::tempdir().unwrap();
    let settings = make_test_settings(dir.path());

    let mut shop = open_storefront(&settings);
    shop.identity_mut().sign_up(alice()).unwrap();
    let old = shop
        .checkout_at(
            &CheckoutRequest::dish(MenuItemId::new(5), "Alice"),
            mrfoods_util::now() - chrono::Duration::minutes(20),
        )
        .unwrap();

    // `serve` opens the database, then a separate `checkout` run writes to it
    let mut server = open_storefront(&settings);
    let mut shop = open_storefront(&settings);
    let newer = shop
        .checkout(&CheckoutRequest::dish(MenuItemId::new(6), "Alice"))
        .unwrap();
    let also_due = shop
        .checkout_at(
            &CheckoutRequest::dish(MenuItemId::new(7), "Alice"),
            mrfoods_util::now() - chrono::Duration::minutes(30),
        )
        .unwrap();

    let events = server.sweep(&mrfoods_util::now()).unwrap();
    assert_eq!(events.len(), 2);
    assert_eq!(server.orders().all().len(), 3);

    let reopened = open_storefront(&settings);
    assert_eq!(reopened.orders().all().len(), 3);
    assert_eq!(
        reopened.orders().get(&old.id).unwrap().status,
        OrderStatus::Completed
    );
    assert_eq!(
        reopened.orders().get(&also_due.id).unwrap().status,
        OrderStatus::Completed
    );
    assert_eq!(
        reopened.orders().get(&newer.id).unwrap().status,
        OrderStatus::Pending
    );
}

#[test]
fn test_memory_backend_config() {
    let settings = parse_config(
        r#"
        config_version = 1
        [storage]
        backend = "memory"
        [accounts]
        password_storage = "argon2"
        "#,
    )
    .unwrap();

    assert_eq!(
        settings.storage.backend,
        mrfoods_config::StorageBackend::Memory
    );
    assert_eq!(settings.accounts.password_storage, PasswordStorage::Argon2);
}
