//! # Observability & Tracing
//!
//! [`setup_tracing`] initializes structured logging with the `tracing` crate for the whole
//! storefront.
//!
//! ## Configuration
//!
//! Compact format without the crate/module prefix (`with_target(false)`); the stores log a
//! `state_type` field instead. Verbosity comes from `RUST_LOG`.
//!
//! ```bash
//! # Lifecycle only: actor start/stop, order status changes, sign in/out
//! RUST_LOG=info cargo run
//!
//! # Every command with its payload
//! RUST_LOG=debug cargo run
//!
//! # Timer fire/tick/cancel events as well
//! RUST_LOG=trace cargo run
//! ```
//!
//! ## What Gets Traced
//!
//! - **Actor lifecycle**: `Actor started`, `Shutdown`
//! - **Commands**: `Command` (debug, with payload), `Command failed` (warn)
//! - **Recoverable problems**: rejected cart input and failed storage writes log at `warn`
//!   and never reach the user
//! - **Order lifecycle**: status transitions and courier ticks
//!
//! Example at `RUST_LOG=info`:
//!
//! ```text
//! INFO Actor started state_type="CartStore"
//! INFO Order placed order_id=ORDk3j2h1g0f total=1040.0
//! INFO checkout{amount=1040.0}: Checkout complete order_id=ORDk3j2h1g0f total=1040.0
//! INFO Order status changed order_id=ORDk3j2h1g0f status=preparing
//! ```
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();
}
