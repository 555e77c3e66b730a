//! Synthetic card generation
//!
//! Derives a Luhn-valid, Visa-prefixed card from an arbitrary wallet address.
//! The digits come from a 32-bit rolling string hash, so the same address
//! always yields the same card within a calendar year. Nothing here is a real
//! payment instrument.

use chrono::Datelike;
use log::debug;
use serde::{Deserialize, Serialize};

/// Holder name written into every synthetic card
pub const HOLDER_NAME: &str = "CRYPTO CARD";

/// Cosmetic Visa-range prefix
const CARD_PREFIX: char = '4';

/// Digits of the hash-derived body between prefix and check digit
const BODY_DIGITS: usize = 14;

const BODY_MODULUS: u64 = 1_000_000_000_000;

/// Card data derived from a wallet address
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SyntheticCard {
    /// 16 ASCII digits, Luhn-valid
    pub number: String,
    /// 1..=12
    pub expiry_month: u32,
    /// Calendar year of generation plus one
    pub expiry_year: i32,
    /// 3 ASCII digits
    pub cvv: String,
    pub holder_name: String,
}

impl SyntheticCard {
    /// Card number in groups of four, e.g. `4000 0010 7634 3094`
    pub fn formatted_number(&self) -> String {
        self.number
            .as_bytes()
            .chunks(4)
            .map(|chunk| String::from_utf8_lossy(chunk).into_owned())
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn expiry_month_padded(&self) -> String {
        format!("{:02}", self.expiry_month)
    }

    fn expiry_year_short(&self) -> String {
        format!("{:02}", self.expiry_year.rem_euclid(100))
    }

    /// `MM/YY`
    pub fn expiry_mm_yy(&self) -> String {
        format!("{}/{}", self.expiry_month_padded(), self.expiry_year_short())
    }

    /// `MMYY`, for expiry inputs limited to four characters
    pub fn expiry_compact(&self) -> String {
        format!("{}{}", self.expiry_month_padded(), self.expiry_year_short())
    }
}

/// Rolling `h * 31 + c` string hash over UTF-16 code units with 32-bit
/// two's-complement wraparound. The empty string hashes to 0.
pub fn address_hash(address: &str) -> i32 {
    address.encode_utf16().fold(0i32, |acc, unit| {
        acc.wrapping_shl(5)
            .wrapping_sub(acc)
            .wrapping_add(i32::from(unit))
    })
}

/// Build the synthetic card for `address` as of `now`
///
/// Total over every input: an empty address simply hashes to zero.
pub fn synthesize<D: Datelike>(address: &str, now: D) -> SyntheticCard {
    let hash = address_hash(address);
    // Widen before abs so i32::MIN stays positive
    let magnitude = i64::from(hash).unsigned_abs();

    let body = magnitude % BODY_MODULUS;
    let partial = format!("{CARD_PREFIX}{body:0width$}", width = BODY_DIGITS);
    // The partial is ASCII digits by construction
    let check = luhn_check_digit(&partial).unwrap_or(0);
    let number = format!("{partial}{check}");

    let expiry_month = (magnitude % 12) as u32 + 1;
    let expiry_year = now.year() + 1;
    let cvv = format!("{:03}", magnitude % 1000);

    debug!(
        "Synthesized card for address of {} chars (hash {})",
        address.chars().count(),
        hash
    );

    SyntheticCard {
        number,
        expiry_month,
        expiry_year,
        cvv,
        holder_name: HOLDER_NAME.to_string(),
    }
}

/// Luhn check digit to append to `partial`
///
/// Doubles digits at even index from the left, which is the correct
/// position parity when `partial` has odd length (15 for a 16-digit card).
/// Returns `None` if `partial` contains a non-digit.
pub fn luhn_check_digit(partial: &str) -> Option<u8> {
    let mut sum = 0u32;
    for (i, ch) in partial.chars().enumerate() {
        let mut digit = ch.to_digit(10)?;
        if i % 2 == 0 {
            digit *= 2;
            if digit > 9 {
                digit -= 9;
            }
        }
        sum += digit;
    }
    Some(((10 - sum % 10) % 10) as u8)
}

/// Standard Luhn validation, doubling every second digit from the right
pub fn luhn_valid(number: &str) -> bool {
    if number.is_empty() {
        return false;
    }
    let mut sum = 0u32;
    for (i, ch) in number.chars().rev().enumerate() {
        let Some(mut digit) = ch.to_digit(10) else {
            return false;
        };
        if i % 2 == 1 {
            digit *= 2;
            if digit > 9 {
                digit -= 9;
            }
        }
        sum += digit;
    }
    sum % 10 == 0
}
