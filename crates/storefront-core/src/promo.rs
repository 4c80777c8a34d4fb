//! # Promo Codes
//!
//! The promo service is an external collaborator. This module defines the
//! seam ([`PromoValidator`]) and two implementations:
//!
//! - [`NoPromotions`] rejects every code (stores without promotions)
//! - [`InMemoryPromoValidator`] evaluates a rule table loaded at startup
//!
//! ## Validation Flow
//! ```text
//! "welcome10 " ──► normalize_code ──► "WELCOME10"
//!                                          │
//!                                          ▼
//!                               rule lookup ── missing ──► Unknown
//!                                          │
//!                        window / currency / minimum checks ──► rejection
//!                                          │
//!                                          ▼
//!                               PromoResult { discount }
//! ```
//!
//! The validator may return a discount larger than the subtotal. Capping is
//! the pricing engine's job, not the validator's.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use tracing::warn;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::{Currency, Money, BPS_SCALE};
use crate::types::PromoResult;

/// Longest accepted promo code after trimming.
pub const MAX_PROMO_CODE_LEN: usize = 64;

// =============================================================================
// Validator Seam
// =============================================================================

/// Why a promo code was not accepted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PromoRejection {
    #[error("unknown code")]
    Unknown,

    #[error("code has expired")]
    Expired,

    #[error("code is not active yet")]
    NotYetActive,

    #[error("order subtotal must be at least {minimum}")]
    MinimumNotMet { minimum: Money },

    #[error("code is only valid for {expected} orders")]
    WrongCurrency { expected: Currency },
}

/// Decides whether a promo code applies to an order and what it is worth.
///
/// Implementations must be pure with respect to the pricing call: the same
/// code, subtotal and currency give the same answer within one request.
pub trait PromoValidator {
    fn validate(
        &self,
        code: &str,
        subtotal: Money,
        currency: &Currency,
    ) -> Result<PromoResult, PromoRejection>;
}

/// Validator for stores that run no promotions.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPromotions;

impl PromoValidator for NoPromotions {
    fn validate(&self, _: &str, _: Money, _: &Currency) -> Result<PromoResult, PromoRejection> {
        Err(PromoRejection::Unknown)
    }
}

/// Trims and uppercases a promo code.
///
/// ```rust
/// use storefront_core::promo::normalize_code;
///
/// assert_eq!(normalize_code(" welcome10 ").unwrap(), "WELCOME10");
/// assert!(normalize_code("   ").is_err());
/// ```
pub fn normalize_code(code: &str) -> Result<String, ValidationError> {
    let code = code.trim();

    if code.is_empty() {
        return Err(ValidationError::Required {
            field: "promoCode".to_string(),
        });
    }

    if code.len() > MAX_PROMO_CODE_LEN {
        return Err(ValidationError::TooLong {
            field: "promoCode".to_string(),
            max: MAX_PROMO_CODE_LEN,
        });
    }

    Ok(code.to_uppercase())
}

// =============================================================================
// Promo Rules
// =============================================================================

/// What a rule takes off the order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PromoKind {
    /// A flat amount in minor units.
    FixedAmount {
        #[serde(rename = "amountMinorUnits")]
        amount: Money,
    },
    /// A share of the subtotal in basis points, rounded half up.
    Percentage { bps: u32 },
}

/// One redeemable code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PromoRule {
    pub code: String,

    pub kind: PromoKind,

    /// Subtotal the order must reach before the code applies.
    #[serde(default, rename = "minimumSubtotalMinorUnits")]
    pub minimum_subtotal: Money,

    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub valid_from: Option<DateTime<Utc>>,

    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub valid_until: Option<DateTime<Utc>>,

    /// Restricts the code to one currency. Percentage codes usually leave
    /// this empty; fixed-amount codes should set it.
    #[serde(default)]
    pub currency: Option<Currency>,
}

impl PromoRule {
    /// Evaluates the rule at `now`.
    pub fn evaluate(
        &self,
        subtotal: Money,
        currency: &Currency,
        now: DateTime<Utc>,
    ) -> Result<PromoResult, PromoRejection> {
        if let Some(from) = self.valid_from {
            if now < from {
                return Err(PromoRejection::NotYetActive);
            }
        }
        if let Some(until) = self.valid_until {
            if now >= until {
                return Err(PromoRejection::Expired);
            }
        }
        if let Some(expected) = &self.currency {
            if expected != currency {
                return Err(PromoRejection::WrongCurrency {
                    expected: expected.clone(),
                });
            }
        }
        if subtotal < self.minimum_subtotal {
            return Err(PromoRejection::MinimumNotMet {
                minimum: self.minimum_subtotal,
            });
        }

        let discount = match self.kind {
            PromoKind::FixedAmount { amount } => amount,
            PromoKind::Percentage { bps } => subtotal.apply_bps(bps.min(BPS_SCALE as u32)),
        };

        Ok(PromoResult::new(discount))
    }
}

// =============================================================================
// In-Memory Validator
// =============================================================================

/// Rule table keyed by normalised code.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPromoValidator {
    rules: HashMap<String, PromoRule>,
}

impl InMemoryPromoValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a table from rules, skipping entries with an unusable code or
    /// a negative amount. A later rule with the same code replaces an
    /// earlier one.
    pub fn from_rules(rules: impl IntoIterator<Item = PromoRule>) -> Self {
        let mut validator = Self::new();
        for rule in rules {
            if let Err(e) = validator.insert(rule.clone()) {
                warn!(code = %rule.code, error = %e, "Ignoring promo rule");
            }
        }
        validator
    }

    /// Parses a JSON array of rules.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let rules: Vec<PromoRule> = serde_json::from_str(json)?;
        Ok(Self::from_rules(rules))
    }

    /// Adds or replaces a rule.
    pub fn insert(&mut self, mut rule: PromoRule) -> Result<(), ValidationError> {
        rule.code = normalize_code(&rule.code)?;

        match rule.kind {
            PromoKind::FixedAmount { amount } if amount.is_negative() => {
                return Err(ValidationError::MustBePositive {
                    field: "amountMinorUnits".to_string(),
                });
            }
            PromoKind::Percentage { bps } if bps as i128 > BPS_SCALE => {
                return Err(ValidationError::OutOfRange {
                    field: "bps".to_string(),
                    min: 0,
                    max: BPS_SCALE as i64,
                });
            }
            _ => {}
        }

        self.rules.insert(rule.code.clone(), rule);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Validates with an explicit clock.
    pub fn validate_at(
        &self,
        code: &str,
        subtotal: Money,
        currency: &Currency,
        now: DateTime<Utc>,
    ) -> Result<PromoResult, PromoRejection> {
        let code = normalize_code(code).map_err(|_| PromoRejection::Unknown)?;
        let rule = self.rules.get(&code).ok_or(PromoRejection::Unknown)?;
        rule.evaluate(subtotal, currency, now)
    }
}

impl PromoValidator for InMemoryPromoValidator {
    fn validate(
        &self,
        code: &str,
        subtotal: Money,
        currency: &Currency,
    ) -> Result<PromoResult, PromoRejection> {
        self.validate_at(code, subtotal, currency, Utc::now())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
