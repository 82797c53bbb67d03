//! The processing step every checkout goes through before an order exists.

use super::OrderError;
use crate::model::OrderDraft;
use crate::payment::PaymentConfirmation;
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, instrument};

/// Accepts or refuses an order before it is committed.
///
/// A refusal aborts checkout with no side effects: no order is created and the cart keeps
/// its contents.
#[async_trait]
pub trait OrderBackend: Send + Sync {
    async fn submit(
        &self,
        draft: &OrderDraft,
        payment: &PaymentConfirmation,
    ) -> Result<(), OrderError>;
}

/// Accepts every order after a fixed processing delay.
#[derive(Debug, Clone)]
pub struct SimulatedBackend {
    delay: Duration,
}

impl SimulatedBackend {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl OrderBackend for SimulatedBackend {
    #[instrument(skip_all, fields(lines = draft.lines.len()))]
    async fn submit(
        &self,
        draft: &OrderDraft,
        _payment: &PaymentConfirmation,
    ) -> Result<(), OrderError> {
        debug!(delay_ms = self.delay.as_millis() as u64, "Processing order");
        tokio::time::sleep(self.delay).await;
        Ok(())
    }
}
