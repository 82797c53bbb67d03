use crate::cart_actor::{self, CartCommand};
use crate::catalog;
use crate::clients::{CartClient, OrderClient, SessionClient};
use crate::config::{ConfigError, StoreConfig};
use crate::geo::ShopSelector;
use crate::order_actor::{self, OrderBackend, OrderContext, SimulatedBackend};
use crate::session_actor::{self, SessionCommand};
use crate::storage::{forward_changes, SharedStorage, StorageView, CART_KEY, IDENTITY_KEY};
use grocery_actor::ActorClient;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{error, info};

/// One running view of the storefront.
///
/// `Storefront` is responsible for:
/// - **Lifecycle Management**: starting the cart, session and order stores and stopping them
/// - **Dependency Wiring**: checkout gets the cart client, the order desk gets a weak
///   client to itself, every store gets this view's storage handle
/// - **Cross-view Sync**: a listener per persisted store forwards other views' writes
///
/// Several storefronts started on the same [`SharedStorage`] behave like several browser
/// tabs: carts and sign-ins converge, orders stay local to the view that placed them.
///
/// # Example
///
/// ```ignore
/// let storage = SharedStorage::new();
/// let view = Storefront::start(&storage, &StoreConfig::default())?;
///
/// view.session.login("customer@rks.com", "customer123").await?;
/// view.cart.add_item(catalog::product(1).unwrap()).await?;
///
/// view.shutdown().await?;
/// ```
pub struct Storefront {
    pub cart: CartClient,
    pub orders: OrderClient,
    pub session: SessionClient,
    view: StorageView,
    shop_radius_km: f64,
    handles: Vec<JoinHandle<()>>,
    listeners: Vec<JoinHandle<()>>,
}

impl Storefront {
    /// Start a view whose orders go through the simulated backend.
    pub fn start(storage: &SharedStorage, config: &StoreConfig) -> Result<Self, ConfigError> {
        let backend = Arc::new(SimulatedBackend::new(config.processing_delay));
        Self::with_backend(storage, config, backend)
    }

    /// Start a view with a custom order backend. The config is validated first, since its
    /// fields are public and a hand-built one may not have gone through
    /// [`StoreConfig::from_env`].
    pub fn with_backend(
        storage: &SharedStorage,
        config: &StoreConfig,
        backend: Arc<dyn OrderBackend>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let view = storage.view();
        let mut rng = config
            .rng_seed
            .map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);

        // 1. Create actors
        let (cart_actor, cart) = cart_actor::new(config.actor_buffer);
        let (session_actor, session) = session_actor::new(
            StdRng::seed_from_u64(rng.gen()),
            config.actor_buffer,
        );
        let (order_actor, orders) = order_actor::new(
            config.orders.clone(),
            StdRng::seed_from_u64(rng.gen()),
            cart.clone(),
            backend,
            config.actor_buffer,
        );

        // 2. Listen before the stores load, so no write slips between load and subscribe
        let listeners = vec![
            forward_changes(
                view.subscribe(),
                CART_KEY,
                cart.inner().downgrade(),
                CartCommand::ApplyExternal,
            ),
            forward_changes(
                view.subscribe(),
                IDENTITY_KEY,
                session.inner().downgrade(),
                SessionCommand::ApplyExternal,
            ),
        ];

        // 3. Start actors with injected context
        let handles = vec![
            tokio::spawn(cart_actor.run(view.clone())),
            tokio::spawn(session_actor.run(view.clone())),
            tokio::spawn(order_actor.run(OrderContext {
                desk: orders.inner().downgrade(),
            })),
        ];

        info!(view = view.id(), "Storefront started");
        Ok(Self {
            cart,
            orders,
            session,
            view,
            shop_radius_km: config.shop_radius_km,
            handles,
            listeners,
        })
    }

    pub fn view_id(&self) -> u64 {
        self.view.id()
    }

    /// A shop finder over the shop directory, using the configured search radius.
    pub fn shop_selector(&self) -> ShopSelector {
        ShopSelector::new(catalog::shops(), self.shop_radius_km)
    }

    /// Stop every store of this view.
    ///
    /// Clients handed out earlier keep their store alive, so drop them first. Every store
    /// is awaited even if one failed; the first failure is returned.
    pub async fn shutdown(self) -> Result<(), String> {
        info!(view = self.view.id(), "Shutting down storefront...");

        for listener in &self.listeners {
            listener.abort();
        }

        drop(self.orders);
        drop(self.session);
        drop(self.cart);

        join_all(self.handles).await?;
        info!("Storefront shutdown complete.");
        Ok(())
    }
}

/// Await every handle, then report the first failure.
async fn join_all(handles: Vec<JoinHandle<()>>) -> Result<(), String> {
    let mut first_failure = None;
    for handle in handles {
        if let Err(e) = handle.await {
            error!("Actor task failed: {:?}", e);
            first_failure.get_or_insert_with(|| format!("Actor task failed: {:?}", e));
        }
    }
    first_failure.map_or(Ok(()), Err)
}
