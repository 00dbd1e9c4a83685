//! Checkout orchestration.
//!
//! Drives a submitted form through validation and payment. Card payments
//! are two-step: a payment intent is requested up front and the charge is
//! confirmed separately, with the intent re-requested whenever the cart
//! total changes in between.

pub mod validation;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::instrument;
use uuid::Uuid;

use verdant_core::{CurrencyCode, Price};

use crate::cart::CartStore;
use crate::currency::CurrencySelector;
use crate::services::payments::{PaymentError, PaymentGateway};

pub use validation::{
    CardDetails, CheckoutForm, PaymentMethod, UnknownPaymentMethod, ValidationErrors,
};

/// Errors that can occur during checkout.
#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("cart is empty")]
    EmptyCart,

    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    #[error("payment failed: {0}")]
    Payment(#[from] PaymentError),

    /// The cart total changed after the payment intent was requested.
    #[error("payment intent no longer matches the cart total")]
    StaleIntent,

    /// Confirmation was attempted without a pending card payment.
    #[error("no card payment is pending confirmation")]
    NoPendingPayment,
}

/// Where a checkout attempt currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CheckoutPhase {
    /// Shopper is filling in the form.
    Editing,
    /// Submitted form is being validated.
    Validating,
    /// Payment intent obtained; awaiting the provider's confirmation UI.
    CardPaymentPending,
    /// Provider confirmation in progress.
    CardPaymentConfirming,
    /// Cash-on-delivery order being recorded.
    CashConfirming,
    /// Order placed.
    Succeeded,
}

/// A payment intent held between submit and confirm, tagged with the
/// charge it was requested for.
#[derive(Debug, Clone, PartialEq, Eq)]
struct PendingIntent {
    client_secret: String,
    amount_minor_units: i64,
    currency: CurrencyCode,
}

/// Record of a placed order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderConfirmation {
    pub order_id: Uuid,
    pub placed_at: DateTime<Utc>,
    pub total: Price,
    pub payment_method: PaymentMethod,
}

/// What `submit` produced: either an order, or a card payment waiting on
/// the provider's confirmation step.
#[derive(Debug, PartialEq)]
pub enum SubmitOutcome {
    /// Hand this secret to the provider's confirmation UI, then call
    /// [`CheckoutOrchestrator::confirm_card_payment`].
    CardPaymentPending { client_secret: String },
    Completed(OrderConfirmation),
}

/// Drives checkout from form submission to order confirmation.
pub struct CheckoutOrchestrator {
    gateway: Arc<dyn PaymentGateway>,
    phase: CheckoutPhase,
    pending: Option<PendingIntent>,
}

impl CheckoutOrchestrator {
    #[must_use]
    pub fn new(gateway: Arc<dyn PaymentGateway>) -> Self {
        Self {
            gateway,
            phase: CheckoutPhase::Editing,
            pending: None,
        }
    }

    #[must_use]
    pub fn phase(&self) -> CheckoutPhase {
        self.phase
    }

    /// Abandon the current attempt and return to editing. The cart is
    /// left untouched.
    pub fn reset(&mut self) {
        self.phase = CheckoutPhase::Editing;
        self.pending = None;
    }

    /// Submit the checkout form.
    ///
    /// Cash orders complete immediately. Card orders obtain a payment
    /// intent and park in [`CheckoutPhase::CardPaymentPending`] until
    /// [`Self::confirm_card_payment`] is called.
    ///
    /// # Errors
    ///
    /// Fails on an empty cart, an invalid form, or a payment intent
    /// request failure; in every case the phase returns to editing and
    /// the cart is untouched.
    #[instrument(skip(self, form, cart, currency), fields(method = %form.payment_method))]
    pub async fn submit(
        &mut self,
        form: &CheckoutForm,
        cart: &mut CartStore,
        currency: &CurrencySelector,
    ) -> Result<SubmitOutcome, CheckoutError> {
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        self.phase = CheckoutPhase::Validating;
        if let Err(errors) = form.validate() {
            self.phase = CheckoutPhase::Editing;
            return Err(errors.into());
        }

        match form.payment_method {
            PaymentMethod::Cash => {
                self.phase = CheckoutPhase::CashConfirming;
                let confirmation = self.complete(cart, currency, PaymentMethod::Cash);
                Ok(SubmitOutcome::Completed(confirmation))
            }
            PaymentMethod::Card => {
                match self.ensure_fresh_intent(cart, currency).await {
                    Ok(client_secret) => {
                        self.phase = CheckoutPhase::CardPaymentPending;
                        Ok(SubmitOutcome::CardPaymentPending { client_secret })
                    }
                    Err(error) => {
                        self.phase = CheckoutPhase::Editing;
                        Err(error)
                    }
                }
            }
        }
    }

    /// Obtain a payment intent for the current cart total, reusing the
    /// held one when the charge amount has not changed.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider request fails.
    pub async fn ensure_fresh_intent(
        &mut self,
        cart: &CartStore,
        currency: &CurrencySelector,
    ) -> Result<String, CheckoutError> {
        let amount = charge_amount(cart);

        if let Some(pending) = &self.pending {
            if pending.amount_minor_units == amount && pending.currency == currency.effective_code()
            {
                return Ok(pending.client_secret.clone());
            }
            tracing::debug!(
                held = pending.amount_minor_units,
                current = amount,
                "charge changed, re-requesting payment intent"
            );
        }

        let intent = self
            .gateway
            .create_payment_intent(amount, currency.effective_code())
            .await?;

        self.pending = Some(PendingIntent {
            client_secret: intent.client_secret.clone(),
            amount_minor_units: amount,
            currency: currency.effective_code(),
        });

        Ok(intent.client_secret)
    }

    /// Finish a card checkout after the provider's confirmation UI
    /// reports success.
    ///
    /// # Errors
    ///
    /// Fails if no card payment is pending, or if the cart total no
    /// longer matches the held intent (the shopper must resubmit).
    pub fn confirm_card_payment(
        &mut self,
        cart: &mut CartStore,
        currency: &CurrencySelector,
    ) -> Result<OrderConfirmation, CheckoutError> {
        if self.phase != CheckoutPhase::CardPaymentPending {
            return Err(CheckoutError::NoPendingPayment);
        }
        let Some(pending) = &self.pending else {
            return Err(CheckoutError::NoPendingPayment);
        };

        if pending.amount_minor_units != charge_amount(cart)
            || pending.currency != currency.effective_code()
        {
            tracing::warn!("refusing to confirm against a changed charge");
            return Err(CheckoutError::StaleIntent);
        }

        self.phase = CheckoutPhase::CardPaymentConfirming;
        Ok(self.complete(cart, currency, PaymentMethod::Card))
    }

    /// Record the order, clear the cart, and drop any held intent.
    fn complete(
        &mut self,
        cart: &mut CartStore,
        currency: &CurrencySelector,
        payment_method: PaymentMethod,
    ) -> OrderConfirmation {
        let total = Price::new(
            currency.convert(cart.total_price()),
            currency.effective_code(),
        );

        let confirmation = OrderConfirmation {
            order_id: Uuid::new_v4(),
            placed_at: Utc::now(),
            total,
            payment_method,
        };

        cart.clear();
        self.pending = None;
        self.phase = CheckoutPhase::Succeeded;
        tracing::info!(order_id = %confirmation.order_id, %payment_method, "order placed");

        confirmation
    }
}

/// Charge amount for the current cart: the base-currency total in minor
/// units.
fn charge_amount(cart: &CartStore) -> i64 {
    Price::new(cart.total_price(), CurrencyCode::default()).to_minor_units()
}
