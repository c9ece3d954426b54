//! Orders store: the ledger, its visibility rules and time-driven completion

use chrono::{DateTime, Utc};
use mrfoods_api::{Order, OrderStatus, OrdersState};
use mrfoods_store::{AuditEventType, Slot, Store, StoreExt, StoreResult};
use mrfoods_util::{OrderId, elapsed_since_millis, unix_millis};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::{CoreEvent, SessionView, record};

/// Order ledger, most recent first
pub struct OrdersStore {
    store: Arc<dyn Store>,
    state: OrdersState,
    completion_after: Duration,
}

impl OrdersStore {
    pub fn new(store: Arc<dyn Store>, completion_after: Duration) -> Self {
        Self {
            store,
            state: OrdersState::default(),
            completion_after,
        }
    }

    pub fn load(&mut self) -> StoreResult<()> {
        self.refresh()?;
        info!(orders = self.state.orders.len(), "Orders loaded");
        Ok(())
    }

    /// Re-read the ledger before changing it. Other processes append to
    /// the same slot, so the in-memory copy may be stale.
    fn refresh(&mut self) -> StoreResult<()> {
        self.state = self
            .store
            .load_or_discard::<OrdersState>(Slot::Orders)?
            .unwrap_or_default();
        debug!(orders = self.state.orders.len(), "Orders refreshed");
        Ok(())
    }

    /// Age at which a pending order is completed by [`OrdersStore::promote_due`]
    pub fn completion_after(&self) -> Duration {
        self.completion_after
    }

    /// The whole ledger, regardless of who is signed in
    pub fn all(&self) -> &[Order] {
        &self.state.orders
    }

    pub fn get(&self, id: &OrderId) -> Option<&Order> {
        self.state.orders.iter().find(|o| &o.id == id)
    }

    /// Orders the given session may see. While identity is still loading
    /// the ledger is unfiltered.
    pub fn visible(&self, view: SessionView<'_>) -> Vec<&Order> {
        match view {
            SessionView::Loading => self.state.orders.iter().collect(),
            SessionView::SignedOut => Vec::new(),
            SessionView::SignedIn(username) => self
                .state
                .orders
                .iter()
                .filter(|o| o.belongs_to(username))
                .collect(),
        }
    }

    /// A fresh `ORD-<millis>` id, bumped past any id already in the ledger
    pub fn next_id(&self, now: &DateTime<Utc>) -> OrderId {
        let mut millis = unix_millis(now);
        loop {
            let id = OrderId::from_millis(millis);
            if self.get(&id).is_none() {
                return id;
            }
            millis += 1;
        }
    }

    /// Prepend an order to the ledger
    pub fn add_order(&mut self, order: Order) -> StoreResult<CoreEvent> {
        let order_id = order.id.clone();
        let username = order.username.clone();
        let total = order.total;
        let plates = order.plate_count();

        self.refresh()?;
        self.state.orders.insert(0, order);
        self.save()?;

        info!(
            order_id = %order_id,
            username = ?username.as_ref().map(|u| u.as_str()),
            total = %total,
            plates,
            "Order placed"
        );
        record(
            &*self.store,
            AuditEventType::OrderPlaced {
                order_id: order_id.clone(),
                username: username.clone(),
                total,
                plates,
            },
        );

        Ok(CoreEvent::OrderPlaced {
            order_id,
            username,
            total,
            plates,
        })
    }

    /// Move an order to `status`. Unknown ids, requests that keep the
    /// current status, and requests to leave a terminal status change
    /// nothing and return `None`.
    pub fn update_order_status(
        &mut self,
        id: &OrderId,
        status: OrderStatus,
    ) -> StoreResult<Option<CoreEvent>> {
        self.refresh()?;
        let Some(order) = self.state.orders.iter_mut().find(|o| &o.id == id) else {
            debug!(order_id = %id, "Status update for unknown order ignored");
            return Ok(None);
        };

        let from = order.status;
        if from == status {
            return Ok(None);
        }
        if !from.can_transition_to(status) {
            warn!(
                order_id = %id,
                from = %from,
                to = %status,
                "Rejected status change out of a final state"
            );
            return Ok(None);
        }

        order.status = status;
        self.save()?;

        info!(order_id = %id, from = %from, to = %status, "Order status changed");
        record(
            &*self.store,
            AuditEventType::OrderStatusChanged {
                order_id: id.clone(),
                from,
                to: status,
            },
        );

        Ok(Some(CoreEvent::OrderStatusChanged {
            order_id: id.clone(),
            from,
            to: status,
        }))
    }

    /// Empty the ledger
    pub fn clear_orders(&mut self) -> StoreResult<CoreEvent> {
        self.refresh()?;
        let count = self.state.orders.len();
        self.state.orders.clear();
        self.save()?;

        info!(count, "Orders cleared");
        record(&*self.store, AuditEventType::OrdersCleared { count });

        Ok(CoreEvent::OrdersCleared { count })
    }

    /// Complete every pending order old enough, whoever placed it
    pub fn promote_due(&mut self, now: &DateTime<Utc>) -> StoreResult<Vec<CoreEvent>> {
        self.refresh()?;
        let mut completed = Vec::new();

        for order in &mut self.state.orders {
            if !order.is_due_for_completion(now, self.completion_after) {
                continue;
            }
            order.status = OrderStatus::Completed;

            let waited = order
                .order_time
                .map(|t| elapsed_since_millis(t, now))
                .unwrap_or_default();
            completed.push((order.id.clone(), order.username.clone(), waited));
        }

        if completed.is_empty() {
            return Ok(Vec::new());
        }
        self.save()?;

        let mut events = Vec::with_capacity(completed.len());
        for (order_id, username, waited) in completed {
            info!(
                order_id = %order_id,
                waited_secs = waited.as_secs(),
                "Order completed"
            );
            record(
                &*self.store,
                AuditEventType::OrderStatusChanged {
                    order_id: order_id.clone(),
                    from: OrderStatus::Pending,
                    to: OrderStatus::Completed,
                },
            );
            events.push(CoreEvent::OrderCompleted {
                order_id,
                username,
                waited,
            });
        }

        Ok(events)
    }

    fn save(&self) -> StoreResult<()> {
        self.store.save(Slot::Orders, &self.state)
    }
}
