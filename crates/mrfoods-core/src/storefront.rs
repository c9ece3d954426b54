//! Storefront: the three stores, the menu, and checkout

use chrono::{DateTime, Utc};
use mrfoods_api::{Catalog, CatalogItem, Order, OrderStatus};
use mrfoods_config::{DisplayConfig, Settings};
use mrfoods_store::{AuditEventType, Store, StoreResult};
use mrfoods_util::{MenuItemId, OrderId};
use std::sync::Arc;
use tracing::info;

use crate::{
    CartStore, CheckoutError, CheckoutResult, CoreEvent, IdentityStore, OrderError, OrderResult,
    OrdersStore, record,
};

/// What is being ordered at checkout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutSource {
    /// Everything in the cart, with its quantities; the cart is cleared
    Cart,
    /// One plate of a single dish; the cart is left alone
    Dish(MenuItemId),
}

/// A checkout submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutRequest {
    pub source: CheckoutSource,
    pub customer_name: String,
}

impl CheckoutRequest {
    pub fn cart(customer_name: impl Into<String>) -> Self {
        Self {
            source: CheckoutSource::Cart,
            customer_name: customer_name.into(),
        }
    }

    pub fn dish(id: MenuItemId, customer_name: impl Into<String>) -> Self {
        Self {
            source: CheckoutSource::Dish(id),
            customer_name: customer_name.into(),
        }
    }
}

/// Composes identity, cart and orders over one store
pub struct Storefront {
    store: Arc<dyn Store>,
    catalog: Catalog,
    display: DisplayConfig,
    identity: IdentityStore,
    cart: CartStore,
    orders: OrdersStore,
}

impl Storefront {
    /// Build the stores. Nothing is read until [`Storefront::start`].
    pub fn new(store: Arc<dyn Store>, settings: &Settings) -> Self {
        info!(
            dishes = settings.catalog.len(),
            completion_after_secs = settings.orders.completion_after.as_secs(),
            password_storage = ?settings.accounts.password_storage,
            "Storefront created"
        );

        Self {
            identity: IdentityStore::new(store.clone(), settings.accounts.password_storage),
            cart: CartStore::new(store.clone()),
            orders: OrdersStore::new(store.clone(), settings.orders.completion_after),
            catalog: settings.catalog.clone(),
            display: settings.display.clone(),
            store,
        }
    }

    /// Rehydrate every store from persisted state
    pub fn start(&mut self) -> StoreResult<()> {
        self.identity.rehydrate()?;
        self.cart.load()?;
        self.orders.load()?;

        info!(
            signed_in = ?self.identity.current().map(|a| a.username.as_str()),
            cart_entries = self.cart.items().len(),
            orders = self.orders.all().len(),
            "Storefront started"
        );
        Ok(())
    }

    pub fn store(&self) -> &Arc<dyn Store> {
        &self.store
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn display(&self) -> &DisplayConfig {
        &self.display
    }

    pub fn identity(&self) -> &IdentityStore {
        &self.identity
    }

    pub fn identity_mut(&mut self) -> &mut IdentityStore {
        &mut self.identity
    }

    pub fn cart(&self) -> &CartStore {
        &self.cart
    }

    pub fn cart_mut(&mut self) -> &mut CartStore {
        &mut self.cart
    }

    pub fn orders(&self) -> &OrdersStore {
        &self.orders
    }

    pub fn orders_mut(&mut self) -> &mut OrdersStore {
        &mut self.orders
    }

    /// Put one plate of a menu dish in the cart
    pub fn add_dish_to_cart(&mut self, id: MenuItemId) -> CheckoutResult<CatalogItem> {
        let dish = self
            .catalog
            .find(id)
            .ok_or(CheckoutError::UnknownMenuItem(id))?;
        self.cart.add_item(dish.to_cart_item())?;
        Ok(dish)
    }

    /// Orders of the active session
    pub fn visible_orders(&self) -> Vec<&Order> {
        self.orders.visible(self.identity.session_view())
    }

    /// Place an order at the current time
    pub fn checkout(&mut self, request: &CheckoutRequest) -> CheckoutResult<Order> {
        self.checkout_at(request, mrfoods_util::now())
    }

    /// Place an order as of `now`: one pending order for the signed-in
    /// user, prepended to the ledger. Cart checkouts then empty the cart.
    pub fn checkout_at(
        &mut self,
        request: &CheckoutRequest,
        now: DateTime<Utc>,
    ) -> CheckoutResult<Order> {
        self.identity.ensure_ready()?;
        let username = self
            .identity
            .current()
            .map(|a| a.username.clone())
            .ok_or(CheckoutError::NotSignedIn)?;

        let customer_name = request.customer_name.trim();
        if customer_name.is_empty() {
            return Err(CheckoutError::MissingCustomerName);
        }

        let items = match request.source {
            CheckoutSource::Cart => {
                if self.cart.is_empty() {
                    return Err(CheckoutError::EmptyCart);
                }
                self.cart.items().to_vec()
            }
            CheckoutSource::Dish(id) => {
                let dish = self
                    .catalog
                    .find(id)
                    .ok_or(CheckoutError::UnknownMenuItem(id))?;
                vec![dish.to_cart_item()]
            }
        };

        let order = Order::pending(
            self.orders.next_id(&now),
            now,
            items,
            username,
            customer_name,
        );
        self.orders.add_order(order.clone())?;

        if request.source == CheckoutSource::Cart {
            let items = self.cart.clear_cart()?;
            record(
                &*self.store,
                AuditEventType::CartCleared {
                    order_id: order.id.clone(),
                    items,
                },
            );
        }

        Ok(order)
    }

    /// Cancel a pending order of the signed-in user
    pub fn cancel_order(&mut self, id: &OrderId) -> OrderResult<CoreEvent> {
        self.identity.ensure_ready()?;
        let username = self
            .identity
            .current()
            .map(|a| a.username.clone())
            .ok_or(OrderError::NotSignedIn)?;

        let status = match self.orders.get(id) {
            Some(order) if order.belongs_to(&username) => order.status,
            _ => return Err(OrderError::UnknownOrder(id.clone())),
        };
        if status.is_terminal() {
            return Err(OrderError::AlreadyFinal {
                id: id.clone(),
                status,
            });
        }

        self.orders
            .update_order_status(id, OrderStatus::Cancelled)?
            .ok_or_else(|| OrderError::UnknownOrder(id.clone()))
    }

    /// Run one promotion sweep over the whole ledger
    pub fn sweep(&mut self, now: &DateTime<Utc>) -> StoreResult<Vec<CoreEvent>> {
        self.orders.promote_due(now)
    }
}
