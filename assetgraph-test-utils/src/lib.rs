//! AssetGraph Test Utilities
//!
//! Shared test infrastructure for the workspace:
//! - Proptest generators for request text and entities
//! - Fixtures for common requests and assets

pub use assetgraph_core::{Asset, Decimal, StorageError, ValidationError, MAX_TOKEN_LENGTH};
pub use assetgraph_query::{CreateAssetRequest, LinkRequest};

use chrono::{NaiveDate, NaiveDateTime};

fn timestamp(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> Option<NaiveDateTime> {
    NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(hour, minute, 0)
}

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    //! Proptest strategies. Text generators yield the raw request text
    //! together with the value it must parse to.

    use super::*;
    use proptest::prelude::*;
    use std::str::FromStr;

    /// A non-blank asset name.
    pub fn arb_asset_name() -> impl Strategy<Value = String> {
        "[A-Za-z][A-Za-z0-9 _-]{0,30}"
    }

    /// Decimal text with up to 9 integer and 4 fraction digits, and its value.
    pub fn arb_price() -> impl Strategy<Value = (String, Decimal)> {
        ("-?[1-9][0-9]{0,8}", proptest::option::of("[0-9]{1,4}")).prop_filter_map(
            "unrepresentable amount",
            |(int, frac)| {
                let text = match frac {
                    Some(frac) => format!("{}.{}", int, frac),
                    None => int,
                };
                let value = Decimal::from_str(&text).ok()?;
                Some((text, value))
            },
        )
    }

    /// `dd/MM/yyyy HH:mm` text and the timestamp it denotes.
    pub fn arb_purchase_date() -> impl Strategy<Value = (String, NaiveDateTime)> {
        (1970i32..2100, 1u32..=12, 1u32..=28, 0u32..24, 0u32..60).prop_filter_map(
            "invalid calendar date",
            |(year, month, day, hour, minute)| {
                let value = timestamp(year, month, day, hour, minute)?;
                let text = format!(
                    "{:02}/{:02}/{:04} {:02}:{:02}",
                    day, month, year, hour, minute
                );
                Some((text, value))
            },
        )
    }

    /// A relationship type token that passes validation.
    pub fn arb_valid_token() -> impl Strategy<Value = String> {
        "[A-Za-z0-9_]{1,19}"
    }

    /// A token of allowed characters that is too long.
    pub fn arb_overlong_token() -> impl Strategy<Value = String> {
        "[A-Za-z0-9_]{20,40}"
    }

    /// A short, non-blank token with exactly one disallowed character.
    pub fn arb_illegal_token() -> impl Strategy<Value = String> {
        ("[A-Za-z0-9_]{1,8}", "[ '`;(){}\\-.:$!]", "[A-Za-z0-9_]{0,8}")
            .prop_map(|(head, bad, tail)| format!("{}{}{}", head, bad, tail))
    }

    /// A valid create request plus the price and date it must produce.
    pub fn arb_create_request() -> impl Strategy<Value = (CreateAssetRequest, Decimal, NaiveDateTime)>
    {
        (arb_asset_name(), arb_price(), arb_purchase_date()).prop_map(
            |(name, (price_text, price), (date_text, date))| {
                (
                    CreateAssetRequest::new(name, price_text, date_text),
                    price,
                    date,
                )
            },
        )
    }
}

// ============================================================================
// TEST FIXTURES
// ============================================================================

pub mod fixtures {
    //! Pre-built requests and assets.

    use super::*;

    pub fn laptop_request() -> CreateAssetRequest {
        CreateAssetRequest::new("ThinkPad Laptop", "1249.99", "15/03/2022 09:30")
    }

    pub fn desk_request() -> CreateAssetRequest {
        CreateAssetRequest::new("Standing Desk", "420", "01/07/2021")
    }

    pub fn owns(from: &Asset, to: &Asset) -> LinkRequest {
        LinkRequest::new(from.id.clone(), to.id.clone(), "OWNS")
    }

    /// An asset with a fixed id, for row-shaping tests.
    pub fn asset_with_id(id: &str) -> Asset {
        Asset {
            id: id.to_string(),
            name: format!("Asset {}", id),
            price: Decimal::new(1000, 2),
            purchase_date: timestamp(2020, 1, 1, 0, 0).unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::generators::*;
    use super::*;
    use assetgraph_core::{parse_amount, parse_timestamp, require_token};
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn generated_prices_parse_to_their_value((text, value) in arb_price()) {
            prop_assert_eq!(parse_amount(&text, "price"), Ok(value));
        }

        #[test]
        fn generated_dates_parse_to_their_value((text, value) in arb_purchase_date()) {
            prop_assert_eq!(parse_timestamp(&text, "date"), Ok(value));
        }

        #[test]
        fn generated_illegal_tokens_are_rejected(token in arb_illegal_token()) {
            let result = require_token(Some(&token), "type", MAX_TOKEN_LENGTH);
            let is_illegal = matches!(result, Err(ValidationError::IllegalCharacters { .. }));
            prop_assert!(is_illegal);
        }
    }

    #[test]
    fn test_fixture_requests_are_complete() {
        let req = fixtures::laptop_request();
        assert!(req.name.is_some() && req.price.is_some() && req.date.is_some());
        assert_eq!(fixtures::asset_with_id("x").id, "x");
    }
}
