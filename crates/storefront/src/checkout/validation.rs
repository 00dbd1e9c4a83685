//! Checkout form validation.
//!
//! Validation is all-at-once: every rule runs and every failing field
//! gets a message, so a shopper sees the full picture in one pass.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use verdant_core::Email;

/// How the shopper wants to pay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Card,
    Cash,
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Card => write!(f, "card"),
            Self::Cash => write!(f, "cash"),
        }
    }
}

#[derive(Debug, Error)]
#[error("unknown payment method: {0}")]
pub struct UnknownPaymentMethod(String);

impl FromStr for PaymentMethod {
    type Err = UnknownPaymentMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "card" => Ok(Self::Card),
            "cash" => Ok(Self::Cash),
            other => Err(UnknownPaymentMethod(other.to_string())),
        }
    }
}

/// Card fields a shopper may fill in. These are only ever grammar-checked
/// locally; the actual charge goes through the payment provider and the
/// values are never transmitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardDetails {
    pub number: String,
    pub expiry: String,
    pub cvc: String,
}

/// The shopper's checkout form as submitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutForm {
    pub name: String,
    pub email: String,
    pub address: String,
    pub city: String,
    pub postal_code: String,
    pub payment_method: PaymentMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card: Option<CardDetails>,
}

/// Per-field validation messages, keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    fields: BTreeMap<&'static str, String>,
}

impl std::error::Error for ValidationErrors {}

impl ValidationErrors {
    fn insert(&mut self, field: &'static str, message: impl Into<String>) {
        self.fields.insert(field, message.into());
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Message for a single field, if it failed.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// Iterate over `(field, message)` pairs in field-name order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.fields.iter().map(|(field, message)| (*field, message.as_str()))
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid checkout form: ")?;
        let mut first = true;
        for (field, message) in &self.fields {
            if !first {
                write!(f, "; ")?;
            }
            write!(f, "{field}: {message}")?;
            first = false;
        }
        Ok(())
    }
}

impl CheckoutForm {
    /// Validate every field, collecting all failures.
    ///
    /// Card fields are checked only when paying by card and details were
    /// provided; they are optional because the charge itself is delegated
    /// to the payment provider.
    ///
    /// # Errors
    ///
    /// Returns the full set of per-field messages if any rule fails.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();

        if self.name.trim().chars().count() < 2 {
            errors.insert("name", "Name must be at least 2 characters.");
        }
        if Email::parse(self.email.trim()).is_err() {
            errors.insert("email", "Please enter a valid email address.");
        }
        if self.address.trim().chars().count() < 5 {
            errors.insert("address", "Address must be at least 5 characters.");
        }
        if self.city.trim().chars().count() < 2 {
            errors.insert("city", "City must be at least 2 characters.");
        }
        if !is_valid_postal_code(self.postal_code.trim()) {
            errors.insert("postal_code", "ZIP code must be exactly 5 digits.");
        }

        if self.payment_method == PaymentMethod::Card {
            if let Some(card) = &self.card {
                if !is_valid_card_number(&card.number) {
                    errors.insert("card_number", "Card number must be 16 digits.");
                }
                if !is_valid_expiry(&card.expiry) {
                    errors.insert("card_expiry", "Expiry must be in MM/YY format.");
                }
                if !is_valid_cvc(&card.cvc) {
                    errors.insert("card_cvc", "CVC must be 3 or 4 digits.");
                }
            }
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

/// Exactly five ASCII digits.
fn is_valid_postal_code(value: &str) -> bool {
    value.len() == 5 && value.bytes().all(|b| b.is_ascii_digit())
}

/// Sixteen digits once whitespace is stripped.
fn is_valid_card_number(value: &str) -> bool {
    let digits: String = value.chars().filter(|c| !c.is_whitespace()).collect();
    digits.len() == 16 && digits.bytes().all(|b| b.is_ascii_digit())
}

/// `MM/YY` with month 01-12; spaces around the slash are tolerated.
fn is_valid_expiry(value: &str) -> bool {
    let Some((month, year)) = value.split_once('/') else {
        return false;
    };
    let month = month.trim();
    let year = year.trim();

    let month_ok = month.len() == 2
        && month.bytes().all(|b| b.is_ascii_digit())
        && matches!(month.parse::<u8>(), Ok(1..=12));
    let year_ok = year.len() == 2 && year.bytes().all(|b| b.is_ascii_digit());

    month_ok && year_ok
}

/// Three or four ASCII digits.
fn is_valid_cvc(value: &str) -> bool {
    (value.len() == 3 || value.len() == 4) && value.bytes().all(|b| b.is_ascii_digit())
}
