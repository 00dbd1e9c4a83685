//! AI-backed "you might also like" suggestions.
//!
//! Suggestions are advisory: every failure mode collapses to the same
//! "No suggestions" presentation, and a response computed against an
//! older cart snapshot is discarded rather than shown.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;
use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::instrument;

use crate::cart::CartStore;
use crate::catalog::{Catalog, Product};
use crate::config::UpsellConfig;

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 512;
const CACHE_TTL: Duration = Duration::from_secs(300);
const CACHE_CAPACITY: u64 = 100;

/// Errors that can occur when fetching suggestions.
#[derive(Debug, Error)]
pub enum UpsellError {
    /// HTTP request failed (includes timeouts).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API returned an error response.
    #[error("API error: {status} - {message}")]
    Api {
        status: u16,
        message: String,
    },

    /// The model reply could not be parsed as a list of names.
    #[error("failed to parse suggestions: {0}")]
    Parse(String),
}

/// Capability interface for name-based recommendations.
///
/// Implementations take the names of items already in the cart and return
/// names of complementary items. Matching the returned names against the
/// catalog is the caller's concern.
#[async_trait]
pub trait Recommender: Send + Sync {
    async fn recommend(&self, cart_item_names: &[String]) -> Result<Vec<String>, UpsellError>;
}

/// Claude-backed [`Recommender`] with a short-lived response cache keyed
/// on the (sorted) cart item names.
pub struct ClaudeRecommender {
    client: reqwest::Client,
    model: String,
    cache: Cache<String, Vec<String>>,
}

impl ClaudeRecommender {
    /// Create a new recommender client.
    ///
    /// # Errors
    ///
    /// Returns an error if the API key is not a valid header value or the
    /// HTTP client fails to build.
    pub fn new(config: &UpsellConfig, timeout: Duration) -> Result<Self, UpsellError> {
        let mut headers = HeaderMap::new();
        let mut api_key = HeaderValue::from_str(config.api_key.expose_secret()).map_err(|_| {
            UpsellError::Api {
                status: 0,
                message: "API key is not a valid header value".to_string(),
            }
        })?;
        api_key.set_sensitive(true);
        headers.insert("x-api-key", api_key);
        headers.insert(
            "anthropic-version",
            HeaderValue::from_static(ANTHROPIC_VERSION),
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            model: config.model.clone(),
            cache: Cache::builder()
                .max_capacity(CACHE_CAPACITY)
                .time_to_live(CACHE_TTL)
                .build(),
        })
    }

    async fn fetch(&self, cart_item_names: &[String]) -> Result<Vec<String>, UpsellError> {
        let prompt = format!(
            "A shopper's cart contains: {}. Suggest up to 3 complementary \
             products a general store might carry. Reply with only a JSON \
             array of product name strings, nothing else.",
            cart_item_names.join(", ")
        );

        let request = MessagesRequest {
            model: &self.model,
            max_tokens: MAX_TOKENS,
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .client
            .post(ANTHROPIC_API_URL)
            .json(&request)
            .send()
            .await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorResponse>(&body)
                .map_or(body, |e| e.error.message);
            tracing::error!(status = %status, %message, "suggestion request failed");
            return Err(UpsellError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let reply: MessagesResponse = response.json().await?;
        let text = reply
            .content
            .iter()
            .filter_map(|block| block.text.as_deref())
            .collect::<Vec<_>>()
            .join("");

        parse_name_list(&text)
    }
}

#[async_trait]
impl Recommender for ClaudeRecommender {
    #[instrument(skip(self), fields(item_count = cart_item_names.len()))]
    async fn recommend(&self, cart_item_names: &[String]) -> Result<Vec<String>, UpsellError> {
        let mut sorted = cart_item_names.to_vec();
        sorted.sort();
        let key = sorted.join("\u{1f}");

        if let Some(names) = self.cache.get(&key).await {
            tracing::debug!("suggestion cache hit");
            return Ok(names);
        }

        let names = self.fetch(cart_item_names).await?;
        self.cache.insert(key, names.clone()).await;
        Ok(names)
    }
}

/// Extract a JSON array of strings from model output, tolerating prose
/// around the array.
fn parse_name_list(text: &str) -> Result<Vec<String>, UpsellError> {
    let start = text.find('[');
    let end = text.rfind(']');

    let (Some(start), Some(end)) = (start, end) else {
        return Err(UpsellError::Parse(format!(
            "no JSON array in reply: {text:.80}"
        )));
    };
    if end < start {
        return Err(UpsellError::Parse("malformed JSON array".to_string()));
    }

    serde_json::from_str(&text[start..=end]).map_err(|e| UpsellError::Parse(e.to_string()))
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<Message<'a>>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'a str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

/// Snapshot of the cart taken when a suggestion request starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpsellRequest {
    revision: u64,
    item_names: Vec<String>,
}

impl UpsellRequest {
    /// Capture the current cart contents, or `None` when the cart is
    /// empty (an empty cart never triggers a request).
    #[must_use]
    pub fn from_cart(cart: &CartStore) -> Option<Self> {
        if cart.is_empty() {
            return None;
        }
        Some(Self {
            revision: cart.revision(),
            item_names: cart.item_names(),
        })
    }

    #[must_use]
    pub fn item_names(&self) -> &[String] {
        &self.item_names
    }
}

/// A completed suggestion fetch, still tagged with the cart revision it
/// was computed against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpsellResponse {
    revision: u64,
    names: Vec<String>,
}

/// Result of resolving a response against the current cart and catalog.
#[derive(Debug, PartialEq, Eq)]
pub enum Upsell<'a> {
    /// Suggested products found in the catalog, in suggestion order.
    Suggestions(Vec<&'a Product>),
    /// Nothing to show (model had no ideas, names matched nothing, or the
    /// fetch failed).
    NoSuggestions,
    /// The cart changed while the fetch was in flight; discard.
    Stale,
}

/// Coordinates suggestion fetches and staleness checks.
pub struct UpsellService {
    recommender: Arc<dyn Recommender>,
}

impl UpsellService {
    #[must_use]
    pub fn new(recommender: Arc<dyn Recommender>) -> Self {
        Self { recommender }
    }

    /// Fetch suggestions for a cart snapshot. Failures are logged and
    /// collapse to an empty name list.
    pub async fn fetch(&self, request: &UpsellRequest) -> UpsellResponse {
        let names = match self.recommender.recommend(&request.item_names).await {
            Ok(names) => names,
            Err(error) => {
                tracing::warn!(%error, "suggestion fetch failed");
                Vec::new()
            }
        };

        UpsellResponse {
            revision: request.revision,
            names,
        }
    }

    /// Resolve a response against the current cart and catalog.
    ///
    /// A response computed against an older cart revision is reported as
    /// [`Upsell::Stale`]; suggested names with no catalog match are
    /// dropped, and items already in the cart are never suggested.
    #[must_use]
    pub fn resolve<'a>(
        &self,
        response: &UpsellResponse,
        cart: &CartStore,
        catalog: &'a Catalog,
    ) -> Upsell<'a> {
        if response.revision != cart.revision() {
            tracing::debug!(
                response_revision = response.revision,
                cart_revision = cart.revision(),
                "discarding stale suggestions"
            );
            return Upsell::Stale;
        }

        let in_cart = cart.item_names();
        let products: Vec<&Product> = response
            .names
            .iter()
            .filter(|name| !in_cart.contains(name))
            .filter_map(|name| catalog.find_by_name(name))
            .collect();

        if products.is_empty() {
            Upsell::NoSuggestions
        } else {
            Upsell::Suggestions(products)
        }
    }
}
