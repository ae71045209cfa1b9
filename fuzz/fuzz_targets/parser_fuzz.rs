//! Fuzz test for the amount and timestamp parsers
//!
//! Neither parser may panic. A parsed amount must print back to text that
//! parses to the same value.
//!
//! Run with: cargo +nightly fuzz run parser_fuzz -- -max_total_time=60

#![no_main]

use assetgraph_core::{parse_amount, parse_timestamp};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };

    if let Ok(amount) = parse_amount(input, "price") {
        let reparsed = parse_amount(&amount.to_string(), "price");
        assert_eq!(reparsed, Ok(amount));
    }

    let _ = parse_timestamp(input, "date");
});
