//! Starting and stopping a storefront view.

pub mod storefront;

pub use storefront::Storefront;
