//! Pure cart state transitions.
//!
//! The reducer is a pure function `(state, action) -> state` with no I/O,
//! so every transition is testable without a storage medium or rendering
//! layer. The [`super::CartStore`] dispatcher owns persistence.

use serde::{Deserialize, Serialize};

use verdant_core::ProductId;

use crate::catalog::Product;

/// A cart entry pairing one product with a quantity.
///
/// Invariant: `quantity >= 1` and at most one line exists per product id.
/// The product record is flattened into the persisted JSON, so a stored
/// line looks like the product object with a `quantity` field appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLineItem {
    #[serde(flatten)]
    pub product: Product,
    pub quantity: u32,
}

impl CartLineItem {
    /// Line total: unit price times quantity, in the base currency.
    #[must_use]
    pub fn line_price(&self) -> rust_decimal::Decimal {
        self.product.price * rust_decimal::Decimal::from(self.quantity)
    }
}

/// The cart: an ordered sequence of line items plus an initialization flag
/// distinguishing "not yet restored from storage" from "restored, possibly
/// empty".
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CartState {
    pub items: Vec<CartLineItem>,
    pub initialized: bool,
}

/// A cart transition.
#[derive(Debug, Clone)]
pub enum CartAction {
    /// Set the restored line sequence and mark the cart initialized.
    /// Dispatched exactly once at startup. Zero-quantity lines are dropped
    /// and lines sharing a product id are merged, so a tampered or
    /// out-of-date persisted payload cannot break the line invariants.
    Initialize(Vec<CartLineItem>),
    /// Add one unit of a product; increments the existing line if present,
    /// otherwise appends a new line with quantity 1.
    Add(Product),
    /// Delete the line for a product id; no-op if absent.
    Remove(ProductId),
    /// Set a line's quantity to an exact value; `quantity <= 0` removes the
    /// line, and an absent id is a no-op.
    UpdateQuantity {
        id: ProductId,
        quantity: i64,
    },
    /// Empty the line sequence.
    Clear,
}

/// Apply an action to a cart state, returning the next state.
#[must_use]
pub fn reduce(state: &CartState, action: CartAction) -> CartState {
    match action {
        CartAction::Initialize(items) => {
            let mut normalized: Vec<CartLineItem> = Vec::with_capacity(items.len());
            for line in items {
                if line.quantity == 0 {
                    continue;
                }
                if let Some(existing) = normalized
                    .iter_mut()
                    .find(|l| l.product.id == line.product.id)
                {
                    existing.quantity = existing.quantity.saturating_add(line.quantity);
                } else {
                    normalized.push(line);
                }
            }
            CartState {
                items: normalized,
                initialized: true,
            }
        }
        CartAction::Add(product) => {
            let mut items = state.items.clone();
            if let Some(line) = items.iter_mut().find(|l| l.product.id == product.id) {
                line.quantity = line.quantity.saturating_add(1);
            } else {
                items.push(CartLineItem {
                    product,
                    quantity: 1,
                });
            }
            CartState {
                items,
                initialized: state.initialized,
            }
        }
        CartAction::Remove(id) => CartState {
            items: state
                .items
                .iter()
                .filter(|l| l.product.id != id)
                .cloned()
                .collect(),
            initialized: state.initialized,
        },
        CartAction::UpdateQuantity { id, quantity } => {
            if quantity <= 0 {
                return reduce(state, CartAction::Remove(id));
            }
            let quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
            CartState {
                items: state
                    .items
                    .iter()
                    .map(|l| {
                        if l.product.id == id {
                            CartLineItem {
                                product: l.product.clone(),
                                quantity,
                            }
                        } else {
                            l.clone()
                        }
                    })
                    .collect(),
                initialized: state.initialized,
            }
        }
        CartAction::Clear => CartState {
            items: Vec::new(),
            initialized: state.initialized,
        },
    }
}
