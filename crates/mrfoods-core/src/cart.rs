//! Cart store

use mrfoods_api::{CartItem, CartState};
use mrfoods_store::{Slot, Store, StoreExt, StoreResult};
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{debug, info};

use crate::{CartError, CartResult};

/// Pending purchase set. Every mutation recomputes the total and writes
/// the whole cart through to the `cartState` slot.
pub struct CartStore {
    store: Arc<dyn Store>,
    state: CartState,
}

impl CartStore {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            store,
            state: CartState::default(),
        }
    }

    /// Load the persisted cart, dropping empty entries and merging
    /// duplicate ids.
    pub fn load(&mut self) -> StoreResult<()> {
        let loaded = self
            .store
            .load_or_discard::<CartState>(Slot::Cart)?
            .unwrap_or_default();
        let normalized = normalize(loaded.clone());

        if normalized != loaded {
            debug!(
                entries_before = loaded.items.len(),
                entries_after = normalized.items.len(),
                "Normalized persisted cart"
            );
            self.state = normalized;
            self.commit()?;
        } else {
            self.state = normalized;
        }

        info!(
            entries = self.state.items.len(),
            total = %self.state.total,
            "Cart loaded"
        );
        Ok(())
    }

    pub fn state(&self) -> &CartState {
        &self.state
    }

    pub fn items(&self) -> &[CartItem] {
        &self.state.items
    }

    pub fn total(&self) -> Decimal {
        self.state.total
    }

    pub fn is_open(&self) -> bool {
        self.state.is_open
    }

    pub fn is_empty(&self) -> bool {
        self.state.is_empty()
    }

    /// Add one plate: bumps an existing entry or inserts with quantity 1
    pub fn add_item(&mut self, item: CartItem) -> CartResult<()> {
        match self.state.items.iter_mut().find(|i| i.id == item.id) {
            Some(existing) => {
                let Some(quantity) = existing.quantity.checked_add(1) else {
                    return Err(CartError::QuantityTooLarge {
                        id: item.id,
                        requested: i64::from(existing.quantity) + 1,
                        max: u32::MAX,
                    });
                };
                existing.quantity = quantity;
            }
            None => self.state.items.push(CartItem { quantity: 1, ..item }),
        }
        Ok(self.commit()?)
    }

    /// Remove an entry whatever its quantity. Returns whether it existed.
    pub fn remove_item(&mut self, id: &str) -> StoreResult<bool> {
        let before = self.state.items.len();
        self.state.items.retain(|i| i.id != id);
        if self.state.items.len() == before {
            return Ok(false);
        }
        self.commit()?;
        Ok(true)
    }

    /// Set an entry's quantity; anything below 1 removes it. Returns
    /// whether the entry existed.
    pub fn update_quantity(&mut self, id: &str, quantity: i64) -> CartResult<bool> {
        if quantity < 1 {
            return Ok(self.remove_item(id)?);
        }
        let requested = quantity;
        let quantity = u32::try_from(quantity).map_err(|_| CartError::QuantityTooLarge {
            id: id.to_string(),
            requested,
            max: u32::MAX,
        })?;

        let Some(entry) = self.state.items.iter_mut().find(|i| i.id == id) else {
            return Ok(false);
        };
        entry.quantity = quantity;
        self.commit()?;
        Ok(true)
    }

    /// Empty the cart. The open flag is kept.
    pub fn clear_cart(&mut self) -> StoreResult<usize> {
        let removed = self.state.items.len();
        self.state.items.clear();
        self.commit()?;
        Ok(removed)
    }

    /// Flip the open flag, returning the new value
    pub fn toggle_open(&mut self) -> StoreResult<bool> {
        self.state.is_open = !self.state.is_open;
        self.commit()?;
        Ok(self.state.is_open)
    }

    pub fn set_open(&mut self, open: bool) -> StoreResult<()> {
        self.state.is_open = open;
        self.commit()
    }

    fn commit(&mut self) -> StoreResult<()> {
        self.state.total = self.state.computed_total();
        self.store.save(Slot::Cart, &self.state)?;
        debug!(
            entries = self.state.items.len(),
            plates = self.state.item_count(),
            total = %self.state.total,
            "Cart saved"
        );
        Ok(())
    }
}

fn normalize(state: CartState) -> CartState {
    let mut items: Vec<CartItem> = Vec::with_capacity(state.items.len());
    for item in state.items.into_iter().filter(|i| i.quantity >= 1) {
        match items.iter_mut().find(|i| i.id == item.id) {
            Some(existing) => {
                existing.quantity = existing.quantity.saturating_add(item.quantity);
            }
            None => items.push(item),
        }
    }

    let mut normalized = CartState {
        items,
        total: Decimal::ZERO,
        is_open: state.is_open,
    };
    normalized.total = normalized.computed_total();
    normalized
}
