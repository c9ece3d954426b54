//! In-memory store, for tests and `--ephemeral` runs

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::{Mutex, MutexGuard};

use crate::{AuditEvent, Slot, Store, StoreError, StoreResult};

/// Store keeping every slot in process memory
pub struct MemoryStore {
    slots: Mutex<HashMap<Slot, String>>,
    audits: Mutex<Vec<AuditEvent>>,
    next_audit_id: AtomicI64,

    /// Configure slot writes to fail
    fail_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
            audits: Mutex::new(Vec::new()),
            next_audit_id: AtomicI64::new(1),
            fail_writes: AtomicBool::new(false),
        }
    }

    /// Make every subsequent `write_slot` fail until switched back
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn slots(&self) -> StoreResult<MutexGuard<'_, HashMap<Slot, String>>> {
        self.slots.lock().map_err(|_| StoreError::Poisoned)
    }

    fn audits(&self) -> StoreResult<MutexGuard<'_, Vec<AuditEvent>>> {
        self.audits.lock().map_err(|_| StoreError::Poisoned)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Store for MemoryStore {
    fn read_slot(&self, slot: Slot) -> StoreResult<Option<String>> {
        Ok(self.slots()?.get(&slot).cloned())
    }

    fn write_slot(&self, slot: Slot, value: &str) -> StoreResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Database(format!(
                "write to slot '{slot}' rejected"
            )));
        }
        self.slots()?.insert(slot, value.to_string());
        Ok(())
    }

    fn remove_slot(&self, slot: Slot) -> StoreResult<()> {
        self.slots()?.remove(&slot);
        Ok(())
    }

    fn append_audit(&self, mut event: AuditEvent) -> StoreResult<()> {
        event.id = self.next_audit_id.fetch_add(1, Ordering::SeqCst);
        self.audits()?.push(event);
        Ok(())
    }

    fn get_recent_audits(&self, limit: usize) -> StoreResult<Vec<AuditEvent>> {
        Ok(self.audits()?.iter().rev().take(limit).cloned().collect())
    }

    fn is_healthy(&self) -> bool {
        !self.slots.is_poisoned() && !self.audits.is_poisoned()
    }
}
