//! Integration tests for Verdant Shop.
//!
//! Wires the full application state together with in-memory storage and
//! fake external collaborators, then exercises whole shopper flows:
//! cart persistence across sessions, checkout from form to confirmation,
//! and upsell suggestions.
//!
//! # Test Categories
//!
//! - `cart_persistence` - Cart and currency survival across sessions
//! - `checkout_flow` - Validation, cash and card checkout, stale intents
//! - `upsell_suggestions` - Recommendation matching and staleness

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::{Arc, Mutex, Once};

use async_trait::async_trait;

use verdant_core::CurrencyCode;
use verdant_storefront::catalog::Catalog;
use verdant_storefront::services::payments::{PaymentError, PaymentGateway, PaymentIntent};
use verdant_storefront::services::upsell::{Recommender, UpsellError};
use verdant_storefront::state::AppState;
use verdant_storefront::storage::{KvStorage, MemoryStorage};

/// Install a test log subscriber once per process; honors `RUST_LOG`.
pub fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .init();
    });
}

/// Payment gateway fake that records requests and mints predictable
/// client secrets.
#[derive(Default)]
pub struct FakePaymentGateway {
    requests: Mutex<Vec<(i64, CurrencyCode)>>,
    fail: Mutex<bool>,
}

impl FakePaymentGateway {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail(&self, fail: bool) {
        *self.fail.lock().unwrap_or_else(std::sync::PoisonError::into_inner) = fail;
    }

    #[must_use]
    pub fn requests(&self) -> Vec<(i64, CurrencyCode)> {
        self.requests
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl PaymentGateway for FakePaymentGateway {
    async fn create_payment_intent(
        &self,
        amount_minor_units: i64,
        currency: CurrencyCode,
    ) -> Result<PaymentIntent, PaymentError> {
        if *self.fail.lock().unwrap_or_else(std::sync::PoisonError::into_inner) {
            return Err(PaymentError::Api {
                status: 503,
                message: "service unavailable".to_string(),
            });
        }
        self.requests
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push((amount_minor_units, currency));
        Ok(PaymentIntent {
            client_secret: format!("pi_test_secret_{amount_minor_units}"),
        })
    }
}

/// Recommender fake returning a canned list of names, or an error.
pub struct FakeRecommender {
    names: Mutex<Vec<String>>,
    fail: Mutex<bool>,
}

impl FakeRecommender {
    #[must_use]
    pub fn returning(names: &[&str]) -> Self {
        Self {
            names: Mutex::new(names.iter().map(ToString::to_string).collect()),
            fail: Mutex::new(false),
        }
    }

    #[must_use]
    pub fn failing() -> Self {
        Self {
            names: Mutex::new(Vec::new()),
            fail: Mutex::new(true),
        }
    }

    pub fn set_names(&self, names: &[&str]) {
        *self
            .names
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner) =
            names.iter().map(ToString::to_string).collect();
    }
}

#[async_trait]
impl Recommender for FakeRecommender {
    async fn recommend(&self, _cart_item_names: &[String]) -> Result<Vec<String>, UpsellError> {
        if *self.fail.lock().unwrap_or_else(std::sync::PoisonError::into_inner) {
            return Err(UpsellError::Parse("model reply was prose".to_string()));
        }
        Ok(self
            .names
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone())
    }
}

/// A fully wired application with fake collaborators and shared
/// in-memory storage, so a second "session" can be started over the
/// same storage.
pub struct TestContext {
    pub state: AppState,
    pub storage: Arc<MemoryStorage>,
    pub gateway: Arc<FakePaymentGateway>,
    pub recommender: Arc<FakeRecommender>,
}

impl TestContext {
    #[must_use]
    pub fn new() -> Self {
        Self::with_recommender(Arc::new(FakeRecommender::returning(&[])))
    }

    #[must_use]
    pub fn with_recommender(recommender: Arc<FakeRecommender>) -> Self {
        init_tracing();
        let storage = Arc::new(MemoryStorage::new());
        let gateway = Arc::new(FakePaymentGateway::new());

        let mut state = AppState::with_collaborators(
            Catalog::default(),
            Arc::clone(&storage) as Arc<dyn KvStorage>,
            Arc::clone(&gateway) as Arc<dyn PaymentGateway>,
            Arc::clone(&recommender) as Arc<dyn Recommender>,
        );
        state.restore();

        Self {
            state,
            storage,
            gateway,
            recommender,
        }
    }

    /// Start a fresh session over this context's storage, as if the
    /// shopper closed and reopened the store.
    #[must_use]
    pub fn reopen(&self) -> Self {
        let gateway = Arc::new(FakePaymentGateway::new());
        let recommender = Arc::new(FakeRecommender::returning(&[]));

        let mut state = AppState::with_collaborators(
            Catalog::default(),
            Arc::clone(&self.storage) as Arc<dyn KvStorage>,
            Arc::clone(&gateway) as Arc<dyn PaymentGateway>,
            Arc::clone(&recommender) as Arc<dyn Recommender>,
        );
        state.restore();

        Self {
            state,
            storage: Arc::clone(&self.storage),
            gateway,
            recommender,
        }
    }

    /// Look up a seed product by name and panic if it is missing.
    #[must_use]
    pub fn product(&self, name: &str) -> verdant_storefront::catalog::Product {
        self.state
            .catalog
            .find_by_name(name)
            .unwrap_or_else(|| panic!("seed catalog is missing {name:?}"))
            .clone()
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}
