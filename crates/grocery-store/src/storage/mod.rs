//! # Durable Storage
//!
//! A string key-value store shared by every view of the storefront, with change
//! notifications delivered to the views that did *not* make the change.
//!
//! Stores persist through a [`StorageView`]; the sync listeners in [`sync`] turn the
//! notifications into `ApplyExternal` commands.

pub mod memory;
pub mod sync;

pub use memory::{SharedStorage, StorageView, ViewEvents};
pub use sync::forward_changes;

use thiserror::Error;

/// Durable slot holding the serialized cart.
pub const CART_KEY: &str = "rks-grocery-cart";

/// Durable slot holding the signed-in identity.
pub const IDENTITY_KEY: &str = "user";

#[derive(Debug, Clone, Error, PartialEq)]
pub enum StorageError {
    #[error("Storage quota exceeded writing {key}: needs {needed} bytes, {available} available")]
    QuotaExceeded {
        key: String,
        needed: usize,
        available: usize,
    },

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// A write or removal made by another view.
#[derive(Debug, Clone, PartialEq)]
pub struct StorageEvent {
    pub key: String,
    /// `None` when the key was removed.
    pub new_value: Option<String>,
    pub(crate) origin: u64,
}
