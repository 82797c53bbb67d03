//! In-process implementation of the durable storage.

use super::{StorageError, StorageEvent};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::broadcast;
use tracing::{trace, warn};

const EVENT_BUFFER: usize = 64;

#[derive(Debug, Default)]
struct Slots {
    values: HashMap<String, String>,
    quota: Option<usize>,
}

impl Slots {
    fn used_excluding(&self, key: &str) -> usize {
        self.values
            .iter()
            .filter(|(k, _)| k.as_str() != key)
            .map(|(k, v)| k.len() + v.len())
            .sum()
    }
}

#[derive(Debug)]
struct Inner {
    slots: Mutex<Slots>,
    events: broadcast::Sender<StorageEvent>,
    next_view: AtomicU64,
    available: AtomicBool,
}

/// Storage shared between views. Cloning yields another handle to the same slots.
#[derive(Debug, Clone)]
pub struct SharedStorage {
    inner: Arc<Inner>,
}

impl Default for SharedStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl SharedStorage {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_BUFFER);
        Self {
            inner: Arc::new(Inner {
                slots: Mutex::new(Slots::default()),
                events,
                next_view: AtomicU64::new(1),
                available: AtomicBool::new(true),
            }),
        }
    }

    /// Storage that rejects writes once keys and values together exceed `bytes`.
    pub fn with_quota(bytes: usize) -> Self {
        let storage = Self::new();
        storage.set_quota(Some(bytes));
        storage
    }

    pub fn set_quota(&self, bytes: Option<usize>) {
        self.slots().quota = bytes;
    }

    /// Make every write fail with [`StorageError::Unavailable`] (or succeed again).
    pub fn set_available(&self, available: bool) {
        self.inner.available.store(available, Ordering::SeqCst);
    }

    /// A new view onto this storage, with its own identity for change notifications.
    pub fn view(&self) -> StorageView {
        StorageView {
            id: self.inner.next_view.fetch_add(1, Ordering::Relaxed),
            storage: self.clone(),
        }
    }

    fn slots(&self) -> MutexGuard<'_, Slots> {
        self.inner.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// One view's handle on the shared storage.
#[derive(Debug, Clone)]
pub struct StorageView {
    id: u64,
    storage: SharedStorage,
}

impl StorageView {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.storage.slots().values.get(key).cloned()
    }

    /// Write `value` under `key`.
    ///
    /// Other views are notified only when the stored value actually changes.
    pub fn set(&self, key: &str, value: String) -> Result<(), StorageError> {
        if !self.storage.inner.available.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable(format!("write to {key} refused")));
        }

        {
            let mut slots = self.storage.slots();
            if slots.values.get(key) == Some(&value) {
                return Ok(());
            }
            if let Some(quota) = slots.quota {
                let available = quota.saturating_sub(slots.used_excluding(key));
                let needed = key.len() + value.len();
                if needed > available {
                    return Err(StorageError::QuotaExceeded {
                        key: key.to_string(),
                        needed,
                        available,
                    });
                }
            }
            slots.values.insert(key.to_string(), value.clone());
        }

        self.notify(key, Some(value));
        Ok(())
    }

    pub fn remove(&self, key: &str) {
        let removed = self.storage.slots().values.remove(key).is_some();
        if removed {
            self.notify(key, None);
        }
    }

    /// Changes made by other views, starting now.
    pub fn subscribe(&self) -> ViewEvents {
        ViewEvents {
            view: self.id,
            receiver: self.storage.inner.events.subscribe(),
        }
    }

    fn notify(&self, key: &str, new_value: Option<String>) {
        trace!(view = self.id, key, "Storage changed");
        // No subscribers is fine; nobody else is looking.
        let _ = self.storage.inner.events.send(StorageEvent {
            key: key.to_string(),
            new_value,
            origin: self.id,
        });
    }
}

/// Change notifications for one view; its own writes are filtered out.
#[derive(Debug)]
pub struct ViewEvents {
    view: u64,
    receiver: broadcast::Receiver<StorageEvent>,
}

impl ViewEvents {
    /// Next change made elsewhere, or `None` once the storage is gone.
    pub async fn recv(&mut self) -> Option<StorageEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) if event.origin == self.view => continue,
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(view = self.view, skipped, "Storage events lagged");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_views_share_values() {
        let storage = SharedStorage::new();
        let a = storage.view();
        let b = storage.view();

        a.set("k", "v".into()).unwrap();
        assert_eq!(b.get("k").as_deref(), Some("v"));

        b.remove("k");
        assert_eq!(a.get("k"), None);
    }

    #[test]
    fn test_quota_rejects_oversized_write_and_keeps_old_value() {
        let storage = SharedStorage::with_quota(8);
        let view = storage.view();

        view.set("k", "1234".into()).unwrap();
        let err = view.set("k", "123456789".into()).unwrap_err();
        assert!(matches!(err, StorageError::QuotaExceeded { needed: 10, available: 8, .. }));
        assert_eq!(view.get("k").as_deref(), Some("1234"));
    }

    #[test]
    fn test_unavailable_storage_refuses_writes() {
        let storage = SharedStorage::new();
        let view = storage.view();
        storage.set_available(false);

        assert!(matches!(
            view.set("k", "v".into()),
            Err(StorageError::Unavailable(_))
        ));
        assert_eq!(view.get("k"), None);
    }

    #[tokio::test]
    async fn test_events_skip_own_writes_and_unchanged_values() {
        let storage = SharedStorage::new();
        let a = storage.view();
        let b = storage.view();
        let mut a_events = a.subscribe();
        let mut b_events = b.subscribe();

        a.set("k", "v".into()).unwrap();
        a.set("k", "v".into()).unwrap();
        b.remove("k");

        let seen_by_b = b_events.recv().await.unwrap();
        assert_eq!(seen_by_b.key, "k");
        assert_eq!(seen_by_b.new_value.as_deref(), Some("v"));

        // a only hears about b's removal
        let seen_by_a = a_events.recv().await.unwrap();
        assert_eq!(seen_by_a.new_value, None);
    }
}
