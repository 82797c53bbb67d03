//! # Grocery Storefront Core
//!
//! The state behind a neighbourhood grocery storefront: a cart persisted across views, a
//! simulated order lifecycle with live courier tracking, a nearby-shop finder and
//! role-based sign-in.
//!
//! ## Core Components
//!
//! - **[cart_actor]**: the persisted cart, reconciled with writes from other views.
//! - **[order_actor]**: the order desk, which advances orders on timers and moves the courier.
//! - **[session_actor]**: the signed-in identity and route gating.
//! - **[geo]**: distances and the nearby-shop selector.
//! - **[clients]**: type-safe wrappers such as [`CartClient`](clients::CartClient); checkout
//!   lives on [`OrderClient`](clients::OrderClient).
//! - **[storage]**: the durable slots shared by views and their change notifications.
//! - **[lifecycle]**: [`Storefront`](lifecycle::Storefront) wires one view together.
//!
//! Each store is a [`grocery_actor::StateActor`]: one task owns the state and applies
//! commands in the order they arrive.
//!
//! ## Testing
//!
//! Timers use the Tokio clock, so tests run with `#[tokio::test(start_paused = true)]` and
//! observe a ten-second order lifecycle instantly. See [`grocery_actor::mock`] for testing
//! code that talks to a store without starting it.

pub mod cart_actor;
pub mod catalog;
pub mod clients;
pub mod config;
pub mod geo;
pub mod ids;
pub mod lifecycle;
pub mod model;
pub mod order_actor;
pub mod payment;
pub mod session_actor;
pub mod storage;
