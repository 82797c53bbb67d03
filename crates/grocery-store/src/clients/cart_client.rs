use crate::cart_actor::{CartCommand, CartError, CartStore};
use crate::model::{CartLine, CartState, Product, ProductId};
use async_trait::async_trait;
use grocery_actor::{ActorClient, FrameworkError, StateClient};
use tracing::instrument;

/// Client for the cart store. Every mutation replies with the cart as it now is.
#[derive(Debug, Clone)]
pub struct CartClient {
    inner: StateClient<CartStore>,
}

impl CartClient {
    pub fn new(inner: StateClient<CartStore>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl ActorClient<CartStore> for CartClient {
    type Error = CartError;

    fn inner(&self) -> &StateClient<CartStore> {
        &self.inner
    }

    fn map_error(e: FrameworkError) -> Self::Error {
        e.downcast_state::<CartError>()
            .unwrap_or_else(|e| CartError::ActorCommunicationError(e.to_string()))
    }
}

impl CartClient {
    #[instrument(skip(self), fields(product_id = %product.id))]
    pub async fn add_item(&self, product: Product) -> Result<CartState, CartError> {
        self.send(CartCommand::Add(product)).await
    }

    #[instrument(skip(self))]
    pub async fn remove_item(&self, product_id: ProductId) -> Result<CartState, CartError> {
        self.send(CartCommand::Remove(product_id)).await
    }

    /// Set the quantity of a line already in the cart; zero or below removes it.
    #[instrument(skip(self))]
    pub async fn update_quantity(
        &self,
        product_id: ProductId,
        quantity: i64,
    ) -> Result<CartState, CartError> {
        self.send(CartCommand::SetQuantity {
            product_id,
            quantity,
        })
        .await
    }

    #[instrument(skip(self))]
    pub async fn clear(&self) -> Result<CartState, CartError> {
        self.send(CartCommand::Clear).await
    }

    /// Empty the cart in one step, returning what it held.
    #[instrument(skip(self))]
    pub async fn take(&self) -> Result<CartState, CartError> {
        self.send(CartCommand::Take).await
    }

    /// Remove exactly `lines` in one step, leaving anything else in the cart.
    #[instrument(skip(self, lines), fields(lines = lines.len()))]
    pub async fn take_lines(&self, lines: Vec<CartLine>) -> Result<CartState, CartError> {
        self.send(CartCommand::TakeLines(lines)).await
    }

    #[instrument(skip(self, lines), fields(lines = lines.len()))]
    pub async fn restore(&self, lines: Vec<CartLine>) -> Result<CartState, CartError> {
        self.send(CartCommand::Restore(lines)).await
    }

    #[instrument(skip(self, value))]
    pub async fn apply_external(&self, value: Option<String>) -> Result<CartState, CartError> {
        self.send(CartCommand::ApplyExternal(value)).await
    }

    pub async fn state(&self) -> Result<CartState, CartError> {
        self.snapshot().await
    }
}
