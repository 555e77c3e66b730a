//! Card field detection
//!
//! Classifies a page's form inputs into payment roles (card number, expiry,
//! CVV, cardholder name). Inputs arrive as attribute-only descriptors so the
//! heuristics stay independent of any live DOM.
//!
//! Each role is resolved by an ordered list of matchers. Every matcher scans
//! the candidates in document order and the first hit wins. Once a candidate
//! is bound to a role it is excluded from the roles that follow.

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

static NUMBER_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"card.?number|cardnum|ccnum|credit.?card|card.?no").unwrap());
static EXPIRY_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"expir|exp.?date|expdate|mm\s*/?\s*yy(yy)?").unwrap());
static CVV_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"cvv|cvc|security.?code|card.?code").unwrap());
static NAME_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"cardholder|name.?on.?card|card.?name").unwrap());
/// `cc` as its own token, so `cc_num` matches but `account` does not
static CC_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(^|[^a-z])cc([^a-z]|$)").unwrap());

/// Input types that can never hold a card value
const NON_FILLABLE_TYPES: &[&str] = &[
    "hidden", "checkbox", "radio", "submit", "button", "reset", "image", "file",
];

/// Attribute view of a single form input or select element
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InputDescriptor {
    pub name: String,
    pub id: String,
    pub placeholder: String,
    pub aria_label: String,
    pub autocomplete: String,
    pub max_length: Option<u32>,
    #[serde(rename = "type")]
    pub input_type: Option<String>,
    /// Text of the first associated `<label>`
    pub label: Option<String>,
}

impl InputDescriptor {
    /// Lowercased `name id placeholder label aria-label`
    pub fn match_text(&self) -> String {
        format!(
            "{} {} {} {} {}",
            self.name,
            self.id,
            self.placeholder,
            self.label.as_deref().unwrap_or(""),
            self.aria_label
        )
        .to_lowercase()
    }

    /// Lowercased `name id placeholder`, without label or aria-label
    pub fn attribute_text(&self) -> String {
        format!("{} {} {}", self.name, self.id, self.placeholder).to_lowercase()
    }

    /// True if any whitespace-separated autocomplete token equals one of `values`
    pub fn has_autocomplete(&self, values: &[&str]) -> bool {
        self.autocomplete
            .split_whitespace()
            .any(|token| values.iter().any(|v| token.eq_ignore_ascii_case(v)))
    }

    pub fn is_fillable(&self) -> bool {
        match &self.input_type {
            Some(t) => !NON_FILLABLE_TYPES
                .iter()
                .any(|blocked| t.trim().eq_ignore_ascii_case(blocked)),
            None => true,
        }
    }

    fn max_length_in(&self, low: u32, high: u32) -> bool {
        self.max_length.is_some_and(|len| (low..=high).contains(&len))
    }
}

/// Payment role a form field can be bound to, in resolution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldRole {
    Number,
    Expiry,
    Cvv,
    Name,
}

impl FieldRole {
    pub const ALL: [FieldRole; 4] = [
        FieldRole::Number,
        FieldRole::Expiry,
        FieldRole::Cvv,
        FieldRole::Name,
    ];
}

impl fmt::Display for FieldRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FieldRole::Number => "number",
            FieldRole::Expiry => "expiry",
            FieldRole::Cvv => "cvv",
            FieldRole::Name => "name",
        };
        f.write_str(s)
    }
}

/// Role bindings as indices into the candidate list given to [`locate`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSet {
    pub number: Option<usize>,
    pub expiry: Option<usize>,
    pub cvv: Option<usize>,
    pub name: Option<usize>,
}

impl FieldSet {
    pub fn get(&self, role: FieldRole) -> Option<usize> {
        match role {
            FieldRole::Number => self.number,
            FieldRole::Expiry => self.expiry,
            FieldRole::Cvv => self.cvv,
            FieldRole::Name => self.name,
        }
    }

    fn set(&mut self, role: FieldRole, index: usize) {
        let slot = match role {
            FieldRole::Number => &mut self.number,
            FieldRole::Expiry => &mut self.expiry,
            FieldRole::Cvv => &mut self.cvv,
            FieldRole::Name => &mut self.name,
        };
        *slot = Some(index);
    }

    /// Bound roles in resolution order
    pub fn iter(&self) -> impl Iterator<Item = (FieldRole, usize)> + '_ {
        FieldRole::ALL
            .into_iter()
            .filter_map(move |role| self.get(role).map(|index| (role, index)))
    }

    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }

    fn is_bound(&self, index: usize) -> bool {
        self.iter().any(|(_, bound)| bound == index)
    }
}

/// A candidate paired with its precomputed match texts
struct Candidate<'a> {
    input: &'a InputDescriptor,
    /// Full match text, labels included
    text: String,
    /// Attribute-only text used by the length and last-resort number matchers
    attrs: String,
}

impl Candidate<'_> {
    fn text_contains_any(&self, needles: &[&str]) -> bool {
        needles.iter().any(|needle| self.text.contains(needle))
    }

    fn attrs_contain_any(&self, needles: &[&str]) -> bool {
        needles.iter().any(|needle| self.attrs.contains(needle))
    }

    fn attrs_are_blank(&self) -> bool {
        self.attrs.trim().is_empty()
    }
}

type Matcher = fn(&Candidate<'_>) -> bool;

fn number_matchers() -> [Matcher; 5] {
    [
        |c| c.input.has_autocomplete(&["cc-number", "ccn"]),
        |c| NUMBER_PATTERN.is_match(&c.text),
        |c| {
            c.input.max_length_in(16, 19)
                && (c.attrs_contain_any(&["card", "number", "credit"]) || c.attrs_are_blank())
        },
        |c| c.input.max_length_in(16, 19),
        |c| c.attrs_contain_any(&["card"]) || CC_TOKEN.is_match(&c.input.name.to_lowercase()),
    ]
}

fn expiry_matchers() -> [Matcher; 3] {
    [
        |c| c.input.has_autocomplete(&["cc-exp", "cc-exp-month"]),
        |c| EXPIRY_PATTERN.is_match(&c.text),
        |c| c.input.max_length_in(4, 5) && c.text_contains_any(&["exp", "date"]),
    ]
}

fn cvv_matchers() -> [Matcher; 3] {
    [
        |c| c.input.has_autocomplete(&["cc-csc", "csc"]),
        |c| CVV_PATTERN.is_match(&c.text),
        |c| c.input.max_length_in(3, 4) && c.text_contains_any(&["cvv", "cvc", "security"]),
    ]
}

fn name_matchers() -> [Matcher; 2] {
    [
        |c| c.input.has_autocomplete(&["cc-name"]),
        |c| NAME_PATTERN.is_match(&c.text),
    ]
}

fn resolve(
    role: FieldRole,
    matchers: &[Matcher],
    candidates: &[Candidate<'_>],
    fields: &mut FieldSet,
) {
    for (rank, matcher) in matchers.iter().enumerate() {
        let hit = candidates
            .iter()
            .enumerate()
            .filter(|(index, c)| c.input.is_fillable() && !fields.is_bound(*index))
            .find(|(_, c)| matcher(*c));
        if let Some((index, _)) = hit {
            debug!("Bound {} field to candidate {} (matcher {})", role, index, rank);
            fields.set(role, index);
            return;
        }
    }
    debug!("No candidate found for {} field", role);
}

/// Classify `candidates` into card payment roles
///
/// Pure and idempotent. An empty or unrelated candidate list yields an empty
/// [`FieldSet`]; callers skip absent roles when filling.
pub fn locate(candidates: &[InputDescriptor]) -> FieldSet {
    let prepared: Vec<Candidate<'_>> = candidates
        .iter()
        .map(|input| Candidate {
            input,
            text: input.match_text(),
            attrs: input.attribute_text(),
        })
        .collect();

    let mut fields = FieldSet::default();
    resolve(FieldRole::Number, &number_matchers(), &prepared, &mut fields);
    resolve(FieldRole::Expiry, &expiry_matchers(), &prepared, &mut fields);
    resolve(FieldRole::Cvv, &cvv_matchers(), &prepared, &mut fields);
    resolve(FieldRole::Name, &name_matchers(), &prepared, &mut fields);
    fields
}
