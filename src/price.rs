//! Checkout amount detection
//!
//! Reads the order total off a checkout page. Elements whose class or id
//! mentions a total, price or amount are scanned in selector priority order,
//! and the first plausible dollar amount in their text wins.

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static AMOUNT_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$?\s*(\d{1,3}(?:,\d{3})*(?:\.\d{2})?)").unwrap());

/// Amounts at or above this are treated as noise (order ids, phone numbers)
const MAX_PRICE: f64 = 100_000.0;

/// Attribute and text view of a page element that may show a price
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PriceElement {
    pub class_name: String,
    pub id: String,
    pub text: String,
}

enum Attr {
    Class,
    Id,
}

/// Selector order: class total, class price, class amount, id total, id price
const SELECTORS: &[(Attr, &str)] = &[
    (Attr::Class, "total"),
    (Attr::Class, "price"),
    (Attr::Class, "amount"),
    (Attr::Id, "total"),
    (Attr::Id, "price"),
];

impl PriceElement {
    fn matches(&self, attr: &Attr, keyword: &str) -> bool {
        let value = match attr {
            Attr::Class => &self.class_name,
            Attr::Id => &self.id,
        };
        value.to_lowercase().contains(keyword)
    }
}

/// First dollar amount in `text`, if it parses and is in `(0, 100000)`
pub fn parse_amount(text: &str) -> Option<f64> {
    let captures = AMOUNT_PATTERN.captures(text)?;
    let price: f64 = captures[1].replace(',', "").parse().ok()?;
    (price > 0.0 && price < MAX_PRICE).then_some(price)
}

/// First plausible amount across `texts`, in order
pub fn detect_price<S: AsRef<str>>(texts: &[S]) -> Option<f64> {
    texts.iter().find_map(|text| parse_amount(text.as_ref()))
}

/// Scan `elements` in selector priority order; an element matching several
/// selectors is visited once per selector
pub fn detect_price_in_elements(elements: &[PriceElement]) -> Option<f64> {
    let price = SELECTORS.iter().find_map(|(attr, keyword)| {
        elements
            .iter()
            .filter(|el| el.matches(attr, keyword))
            .find_map(|el| parse_amount(&el.text))
    });
    debug!("Detected checkout amount: {:?}", price);
    price
}

/// Same as [`detect_price_in_elements`], with 0 for "not found"
pub fn detect_price_or_zero(elements: &[PriceElement]) -> f64 {
    detect_price_in_elements(elements).unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element(class_name: &str, id: &str, text: &str) -> PriceElement {
        PriceElement {
            class_name: class_name.to_string(),
            id: id.to_string(),
            text: text.to_string(),
        }
    }

    #[test]
    fn test_comma_grouping() {
        assert_eq!(parse_amount("Order total: $1,234.56"), Some(1234.56));
        assert_eq!(parse_amount("$ 99,999.99"), Some(99999.99));
        assert_eq!(parse_amount("582.99 USD"), Some(582.99));
    }

    #[test]
    fn test_out_of_range() {
        assert_eq!(parse_amount("$0.00"), None);
        assert_eq!(parse_amount("$100,000.00"), None);
        assert_eq!(parse_amount("$250,000"), None);
    }

    #[test]
    fn test_no_match() {
        assert_eq!(parse_amount("Free shipping"), None);
        assert_eq!(parse_amount(""), None);
        assert_eq!(detect_price::<&str>(&[]), None);
    }

    #[test]
    fn test_detect_price_skips_implausible_texts() {
        let texts = ["Free", "$0.00", "$100,000.00", "$582.99", "$10.00"];
        assert_eq!(detect_price(&texts), Some(582.99));
    }

    #[test]
    fn test_selector_priority() {
        let elements = vec![
            element("item-price", "", "$19.99"),
            element("", "order-total", "$45.00"),
            element("Cart-Total", "", "$582.99"),
        ];
        assert_eq!(detect_price_in_elements(&elements), Some(582.99));
    }

    #[test]
    fn test_falls_through_to_id_selectors() {
        let elements = vec![
            element("subtotal", "", "calculating..."),
            element("header", "price-summary", "$12.50"),
        ];
        assert_eq!(detect_price_in_elements(&elements), Some(12.5));
    }

    #[test]
    fn test_unrelated_elements_yield_zero() {
        let elements = vec![element("banner", "promo", "Save $5.00 today")];
        assert_eq!(detect_price_in_elements(&elements), None);
        assert_eq!(detect_price_or_zero(&elements), 0.0);
    }
}
