//! Currency selection and price formatting.
//!
//! Catalog prices are authored in the base currency (USD, rate 1.0). The
//! selector holds the active display currency, persists the choice, and
//! formats converted amounts. Conversion rates are a fixed static table.

use std::sync::Arc;

use rust_decimal::Decimal;

use verdant_core::{CurrencyCode, Price};

use crate::storage::{KvStorage, keys};

/// Conversion rate from the base currency into `code`.
///
/// Total over the closed [`CurrencyCode`] enum: an unknown code is
/// unrepresentable, so there is no fallback arm.
#[must_use]
pub fn rate(code: CurrencyCode) -> Decimal {
    match code {
        CurrencyCode::USD => Decimal::ONE,
        CurrencyCode::EUR => Decimal::new(92, 2),
        CurrencyCode::GBP => Decimal::new(79, 2),
        CurrencyCode::JPY => Decimal::new(15_774, 2),
        CurrencyCode::AUD => Decimal::new(152, 2),
        CurrencyCode::SLL => Decimal::new(22_500, 0),
    }
}

/// Currencies offered to the user, in display order.
#[must_use]
pub const fn available_currencies() -> [CurrencyCode; 6] {
    CurrencyCode::ALL
}

/// The active display currency.
///
/// Defaults to the base currency, restores a persisted selection at
/// startup, and persists every explicit change. Until restoration
/// completes, formatting deterministically uses the base currency so the
/// user never sees a flash of a wrong currency.
pub struct CurrencySelector {
    active: CurrencyCode,
    initialized: bool,
    storage: Arc<dyn KvStorage>,
}

impl CurrencySelector {
    /// Create a selector defaulting to the base currency, not yet restored.
    #[must_use]
    pub fn new(storage: Arc<dyn KvStorage>) -> Self {
        Self {
            active: CurrencyCode::default(),
            initialized: false,
            storage,
        }
    }

    /// Restore the persisted selection, if any, and mark the selector
    /// initialized. Absent, unreadable, or unknown stored codes keep the
    /// default; restoration never fails.
    pub fn restore(&mut self) {
        match self.storage.get(keys::CURRENCY) {
            Ok(Some(bytes)) => match std::str::from_utf8(&bytes) {
                Ok(stored) => {
                    if let Ok(code) = stored.trim().parse::<CurrencyCode>() {
                        self.active = code;
                    } else {
                        tracing::warn!("ignoring unknown persisted currency: {stored}");
                    }
                }
                Err(e) => tracing::warn!("ignoring non-UTF-8 persisted currency: {e}"),
            },
            Ok(None) => {}
            Err(e) => tracing::warn!("failed to read persisted currency: {e}"),
        }
        self.initialized = true;
        self.persist();
    }

    /// Select a currency by code. Unknown codes are silently ignored: no
    /// error, no state change.
    pub fn set_currency(&mut self, code: &str) {
        let Ok(code) = code.parse::<CurrencyCode>() else {
            tracing::debug!("ignoring unknown currency selection: {code}");
            return;
        };
        self.active = code;
        if self.initialized {
            self.persist();
        }
    }

    fn persist(&self) {
        if let Err(e) = self
            .storage
            .set(keys::CURRENCY, self.active.code().as_bytes())
        {
            tracing::warn!("failed to persist currency selection: {e}");
        }
    }

    /// The currency used for display right now: the active selection once
    /// initialized, the base currency before that (anti-flicker).
    #[must_use]
    pub fn effective_code(&self) -> CurrencyCode {
        if self.initialized {
            self.active
        } else {
            CurrencyCode::default()
        }
    }

    /// The explicitly selected currency, regardless of initialization.
    #[must_use]
    pub fn active(&self) -> CurrencyCode {
        self.active
    }

    /// Whether [`CurrencySelector::restore`] has completed.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Convert a base-currency amount into the effective display currency.
    #[must_use]
    pub fn convert(&self, amount: Decimal) -> Decimal {
        amount * rate(self.effective_code())
    }

    /// Convert and render a base-currency amount, e.g. `€9.20`.
    #[must_use]
    pub fn format_price(&self, amount: Decimal) -> String {
        let code = self.effective_code();
        Price::new(amount * rate(code), code).to_string()
    }
}
