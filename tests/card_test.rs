use chrono::{NaiveDate, TimeZone, Utc};
use solami::card::{luhn_valid, synthesize, HOLDER_NAME};

const DEMO_ADDRESS: &str = "Eho5sAfpYE3n1o54X6QJhe6rAA3ezyg32DGavzbxary5";

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

#[test]
fn test_golden_demo_address() {
    let card = synthesize(DEMO_ADDRESS, date(2025, 1, 1));
    assert_eq!(card.number, "4000001076343094");
    assert_eq!(card.expiry_month, 10);
    assert_eq!(card.expiry_year, 2026);
    assert_eq!(card.cvv, "309");
    assert_eq!(card.holder_name, HOLDER_NAME);
}

#[test]
fn test_number_shape_for_many_addresses() {
    let long = "z".repeat(1000);
    let addresses = [
        "a",
        "abc",
        "hello",
        "polygon",
        "wallet-address-0001",
        "4Nd1mBQtrMJVYVfKf2PJy9NZUZdTAsp7D4xWLs4gDB4T",
        "Eho5sAfpYE3n1o54X6QJhe6rAA3ezyg32DGavzbxary",
        "0x52908400098527886E0F7030069857D2E4169EE7",
        "ünïcödé 🚀 address",
        long.as_str(),
    ];
    for address in addresses {
        let card = synthesize(address, date(2025, 7, 4));
        assert_eq!(card.number.len(), 16, "length for {address:?}");
        assert!(card.number.bytes().all(|b| b.is_ascii_digit()));
        assert!(card.number.starts_with('4'));
        assert!(luhn_valid(&card.number), "luhn for {address:?}");
        assert!((1..=12).contains(&card.expiry_month));
        assert_eq!(card.cvv.len(), 3);
        assert!(card.cvv.bytes().all(|b| b.is_ascii_digit()));
    }
}

#[test]
fn test_empty_address_is_well_defined() {
    let card = synthesize("", date(2025, 1, 1));
    assert_eq!(card.number, "4000000000000002");
    assert!(luhn_valid(&card.number));
    assert_eq!(card, synthesize("", date(2025, 1, 1)));
}

#[test]
fn test_only_expiry_year_depends_on_date() {
    let earlier = synthesize(DEMO_ADDRESS, date(2025, 12, 31));
    let later = synthesize(DEMO_ADDRESS, date(2026, 1, 1));
    assert_eq!(earlier.expiry_year, 2026);
    assert_eq!(later.expiry_year, 2027);
    assert_eq!(earlier.number, later.number);
    assert_eq!(earlier.expiry_month, later.expiry_month);
    assert_eq!(earlier.cvv, later.cvv);
    assert_eq!(earlier.holder_name, later.holder_name);
}

#[test]
fn test_deterministic() {
    let now = Utc.with_ymd_and_hms(2025, 5, 20, 8, 30, 0).unwrap();
    assert_eq!(synthesize(DEMO_ADDRESS, now), synthesize(DEMO_ADDRESS, now));
    // Same calendar day through a different date type
    assert_eq!(
        synthesize(DEMO_ADDRESS, now),
        synthesize(DEMO_ADDRESS, date(2025, 5, 20))
    );
}

#[test]
fn test_different_addresses_differ() {
    let a = synthesize("address-one", date(2025, 1, 1));
    let b = synthesize("address-two", date(2025, 1, 1));
    assert_ne!(a.number, b.number);
}
