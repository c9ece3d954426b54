//! Store trait definitions

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::{AuditEvent, AuditEventType, Slot, StoreError, StoreResult};

/// Main store trait
pub trait Store: Send + Sync {
    // State slots

    /// Read the raw text of a slot, `None` when absent
    fn read_slot(&self, slot: Slot) -> StoreResult<Option<String>>;

    /// Replace the raw text of a slot
    fn write_slot(&self, slot: Slot, value: &str) -> StoreResult<()>;

    /// Delete a slot; deleting an absent slot is not an error
    fn remove_slot(&self, slot: Slot) -> StoreResult<()>;

    // Audit log

    /// Append an audit event
    fn append_audit(&self, event: AuditEvent) -> StoreResult<()>;

    /// Get recent audit events, newest first
    fn get_recent_audits(&self, limit: usize) -> StoreResult<Vec<AuditEvent>>;

    // Health

    /// Check if store is healthy
    fn is_healthy(&self) -> bool;
}

/// Typed access to slots for any [`Store`]
pub trait StoreExt: Store {
    /// Parse a slot as JSON. A present but unparseable slot is
    /// [`StoreError::Corrupt`].
    fn load<T: DeserializeOwned>(&self, slot: Slot) -> StoreResult<Option<T>> {
        let Some(raw) = self.read_slot(slot)? else {
            return Ok(None);
        };

        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| StoreError::Corrupt {
                slot,
                message: e.to_string(),
            })
    }

    /// Serialize a value into a slot
    fn save<T: Serialize>(&self, slot: Slot, value: &T) -> StoreResult<()> {
        let json = serde_json::to_string(value)?;
        self.write_slot(slot, &json)?;
        debug!(slot = %slot, bytes = json.len(), "Slot saved");
        Ok(())
    }

    /// Like [`StoreExt::load`], but a corrupt slot is removed and reported
    /// as absent so callers start from their empty default.
    fn load_or_discard<T: DeserializeOwned>(&self, slot: Slot) -> StoreResult<Option<T>> {
        match self.load(slot) {
            Err(StoreError::Corrupt { slot, message }) => {
                warn!(slot = %slot, error = %message, "Discarding corrupt persisted state");
                self.remove_slot(slot)?;
                if let Err(e) = self.append_audit(AuditEvent::new(
                    AuditEventType::CorruptStateDiscarded {
                        slot: slot.key().to_string(),
                        error: message,
                    },
                )) {
                    warn!(error = %e, "Failed to record discarded slot");
                }
                Ok(None)
            }
            other => other,
        }
    }
}

impl<S: Store + ?Sized> StoreExt for S {}
