//! Payment-intent collaborator.
//!
//! The card path delegates all sensitive card handling to the payment
//! provider: the storefront only requests a payment intent for a charge
//! amount and hands the opaque client secret to the provider's external
//! confirmation UI.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::Deserialize;
use thiserror::Error;
use tracing::instrument;

use verdant_core::CurrencyCode;

use crate::config::StripeConfig;

const STRIPE_API_URL: &str = "https://api.stripe.com/v1/payment_intents";

/// Errors that can occur when requesting a payment intent.
///
/// All of these are surfaced as a blocking, user-retryable notice; the
/// cash path remains available as a fallback.
#[derive(Debug, Error)]
pub enum PaymentError {
    /// HTTP request failed (includes timeouts).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider returned an error response.
    #[error("API error: {status} - {message}")]
    Api {
        status: u16,
        message: String,
    },

    /// The provider response did not contain a client secret.
    #[error("payment intent response missing client secret")]
    MissingClientSecret,

    /// The charge amount must be positive.
    #[error("invalid charge amount: {0}")]
    InvalidAmount(i64),
}

impl PaymentError {
    /// Whether the failure was a timeout; timeouts are treated exactly
    /// like any other external failure, this only refines the notice.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Http(e) if e.is_timeout())
    }
}

/// An authorized, not-yet-captured charge, identified by an opaque client
/// secret consumed by the provider's confirmation UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentIntent {
    pub client_secret: String,
}

/// Capability interface for requesting payment intents.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Request a payment intent for `amount_minor_units` (e.g. cents) in
    /// `currency`.
    ///
    /// # Errors
    ///
    /// Returns an error if the amount is not positive or the provider
    /// request fails or times out.
    async fn create_payment_intent(
        &self,
        amount_minor_units: i64,
        currency: CurrencyCode,
    ) -> Result<PaymentIntent, PaymentError>;
}

/// Stripe-backed [`PaymentGateway`].
#[derive(Clone)]
pub struct StripeClient {
    client: reqwest::Client,
}

impl StripeClient {
    /// Create a new client with bearer authentication and a bounded
    /// request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the secret key is not a valid header value or
    /// the HTTP client fails to build.
    pub fn new(config: &StripeConfig, timeout: Duration) -> Result<Self, PaymentError> {
        let mut headers = HeaderMap::new();
        let auth_value = format!("Bearer {}", config.secret_key.expose_secret());
        let mut auth_header = HeaderValue::from_str(&auth_value).map_err(|_| PaymentError::Api {
            status: 0,
            message: "secret key is not a valid header value".to_string(),
        })?;
        auth_header.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth_header);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl PaymentGateway for StripeClient {
    #[instrument(skip(self), fields(amount = amount_minor_units, currency = %currency))]
    async fn create_payment_intent(
        &self,
        amount_minor_units: i64,
        currency: CurrencyCode,
    ) -> Result<PaymentIntent, PaymentError> {
        if amount_minor_units <= 0 {
            return Err(PaymentError::InvalidAmount(amount_minor_units));
        }

        let params = [
            ("amount", amount_minor_units.to_string()),
            ("currency", currency.code().to_lowercase()),
            ("automatic_payment_methods[enabled]", "true".to_string()),
        ];

        let response = self.client.post(STRIPE_API_URL).form(&params).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorResponse>(&body)
                .map_or(body, |e| e.error.message);
            tracing::error!(status = %status, %message, "payment intent request failed");
            return Err(PaymentError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let intent: PaymentIntentResponse = response.json().await?;
        let client_secret = intent
            .client_secret
            .ok_or(PaymentError::MissingClientSecret)?;

        Ok(PaymentIntent { client_secret })
    }
}

/// Successful payment-intent response body (fields we consume).
#[derive(Debug, Deserialize)]
struct PaymentIntentResponse {
    client_secret: Option<String>,
}

/// Error response body from the provider.
#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}
