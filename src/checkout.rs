//! Checkout page detection
//!
//! Decides whether a page looks like a checkout and whether the pay prompt
//! should be offered on it. The "recently shown" gate is an injected
//! [`Cooldown`], so the decision itself stays a pure function.

use chrono::{DateTime, Utc};
use log::debug;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::fields::{locate, FieldSet, InputDescriptor};

const URL_KEYWORDS: &[&str] = &[
    "checkout", "payment", "pay", "billing", "card", "purchase", "order",
];

const BODY_INDICATORS: &[&str] = &[
    "payment method",
    "billing information",
    "card information",
    "credit card",
    "card number",
    "expiration",
    "cvv",
    "cvc",
    "place order",
    "complete purchase",
    "payment details",
];

/// Snapshot of the page the detector runs against
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PageContext {
    pub url: String,
    pub title: String,
    pub body_text: String,
    pub inputs: Vec<InputDescriptor>,
}

/// Suppresses the pay prompt for a while after it was last shown
pub trait Cooldown {
    fn is_cooling_down(&self, now: DateTime<Utc>) -> bool;
}

/// Never suppresses
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCooldown;

impl Cooldown for NoCooldown {
    fn is_cooling_down(&self, _now: DateTime<Utc>) -> bool {
        false
    }
}

/// Suppresses for `window` after `last_shown`
#[derive(Debug, Clone, Copy)]
pub struct WindowCooldown {
    pub last_shown: Option<DateTime<Utc>>,
    pub window: Duration,
}

impl WindowCooldown {
    pub fn new(last_shown: Option<DateTime<Utc>>, window: Duration) -> Self {
        Self { last_shown, window }
    }
}

impl Cooldown for WindowCooldown {
    fn is_cooling_down(&self, now: DateTime<Utc>) -> bool {
        match self.last_shown {
            // A timestamp in the future counts as just shown
            Some(shown) => (now - shown)
                .to_std()
                .map_or(true, |elapsed| elapsed < self.window),
            None => false,
        }
    }
}

/// What the page layer should do with the pay prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum OfferDecision {
    /// Show the prompt; fill these fields if the user accepts
    Offer { fields: FieldSet },
    NotCheckout,
    CoolingDown,
    /// Looks like a checkout but no card number field yet; run again once
    /// the page has loaded more of its form
    RetryLater,
}

pub fn is_checkout_page(page: &PageContext) -> bool {
    let url = page.url.to_lowercase();
    let title = page.title.to_lowercase();
    if URL_KEYWORDS
        .iter()
        .any(|kw| url.contains(kw) || title.contains(kw))
    {
        return true;
    }

    let body = page.body_text.to_lowercase();
    if BODY_INDICATORS.iter().any(|ind| body.contains(ind)) {
        return true;
    }

    page.inputs.iter().any(|input| {
        let text_type = input
            .input_type
            .as_deref()
            .is_some_and(|t| t.eq_ignore_ascii_case("text"));
        let card_length = matches!(input.max_length, Some(16) | Some(19));
        let cc_autocomplete = input
            .autocomplete
            .split_whitespace()
            .any(|token| token.to_ascii_lowercase().starts_with("cc-"));
        (text_type && card_length) || cc_autocomplete
    })
}

pub fn offer_decision(
    page: &PageContext,
    cooldown: &dyn Cooldown,
    now: DateTime<Utc>,
) -> OfferDecision {
    let fields = locate(&page.inputs);

    if fields.number.is_none() && !is_checkout_page(page) {
        return OfferDecision::NotCheckout;
    }
    if cooldown.is_cooling_down(now) {
        debug!("Pay prompt suppressed by cooldown");
        return OfferDecision::CoolingDown;
    }
    if fields.number.is_none() {
        return OfferDecision::RetryLater;
    }
    OfferDecision::Offer { fields }
}
