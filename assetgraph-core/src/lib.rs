//! AssetGraph Core - Entity Types, Validators and Parsers
//!
//! Pure data structures and pure functions. All other crates depend on this.
//! Nothing here touches query text or the store.

pub mod entities;
pub mod error;
pub mod parse;
pub mod validation;

pub use entities::{new_asset_id, Asset, AssetId, GraphValue, Link, Row, ASSET_LABEL};
pub use error::{AssetGraphError, AssetGraphResult, StorageError, ValidationError};
pub use parse::{parse_amount, parse_timestamp, AMOUNT_FORMAT, TIMESTAMP_FORMAT};
pub use validation::{optional_filter, require_non_empty, require_token, MAX_TOKEN_LENGTH};

/// Exact decimal type used for prices.
pub use rust_decimal::Decimal;
