//! Fuzz test for relationship type validation
//!
//! Any string that passes validation must render as a backticked fragment
//! made only of uppercase token characters.
//!
//! Run with: cargo +nightly fuzz run token_fuzz -- -max_total_time=60

#![no_main]

use assetgraph_core::{require_token, MAX_TOKEN_LENGTH};
use assetgraph_query::{relationship_type_fragment, RelationshipType};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };

    let accepted = require_token(Some(input), "type", MAX_TOKEN_LENGTH).is_ok();
    let parsed = RelationshipType::parse(Some(input));
    assert_eq!(accepted, parsed.is_ok());

    if let Ok(rel_type) = parsed {
        let fragment = relationship_type_fragment(&rel_type);
        let inner = &fragment[1..fragment.len() - 1];
        assert!(fragment.starts_with('`') && fragment.ends_with('`'));
        assert!(inner.len() < MAX_TOKEN_LENGTH);
        assert!(inner
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_'));
    }
});
