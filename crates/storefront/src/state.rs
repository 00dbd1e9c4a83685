//! Shared application state.

use std::sync::Arc;

use crate::cart::CartStore;
use crate::catalog::Catalog;
use crate::checkout::{CheckoutError, CheckoutOrchestrator};
use crate::config::StorefrontConfig;
use crate::currency::CurrencySelector;
use crate::error::Result;
use crate::services::payments::{PaymentGateway, StripeClient};
use crate::services::upsell::{ClaudeRecommender, Recommender, UpsellService};
use crate::storage::{FileStorage, KvStorage};

/// Everything a storefront session needs, wired together.
pub struct AppState {
    pub catalog: Catalog,
    pub cart: CartStore,
    pub currency: CurrencySelector,
    pub checkout: CheckoutOrchestrator,
    pub upsell: UpsellService,
}

impl AppState {
    /// Wire up production collaborators from configuration: file-backed
    /// storage, the Stripe gateway, and the Claude recommender.
    ///
    /// # Errors
    ///
    /// Returns an error if the data directory cannot be created or an
    /// HTTP client fails to build.
    pub fn from_config(config: &StorefrontConfig) -> Result<Self> {
        let storage = Arc::new(FileStorage::new(&config.data_dir)?);
        let gateway = StripeClient::new(&config.stripe, config.external_timeout)
            .map_err(CheckoutError::from)?;
        let recommender = ClaudeRecommender::new(&config.upsell, config.external_timeout)?;

        Ok(Self::with_collaborators(
            Catalog::default(),
            storage,
            Arc::new(gateway),
            Arc::new(recommender),
        ))
    }

    /// Wire up explicit collaborators; used by tests with in-memory
    /// storage and fakes.
    #[must_use]
    pub fn with_collaborators(
        catalog: Catalog,
        storage: Arc<dyn KvStorage>,
        gateway: Arc<dyn PaymentGateway>,
        recommender: Arc<dyn Recommender>,
    ) -> Self {
        Self {
            catalog,
            cart: CartStore::new(Arc::clone(&storage)),
            currency: CurrencySelector::new(storage),
            checkout: CheckoutOrchestrator::new(gateway),
            upsell: UpsellService::new(recommender),
        }
    }

    /// Load persisted cart and currency state. Call once at session
    /// start; absent or unreadable state falls back to defaults.
    pub fn restore(&mut self) {
        self.cart.restore();
        self.currency.restore();
    }
}
