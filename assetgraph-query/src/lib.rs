//! AssetGraph Query - Catalog, Builder and Shaper
//!
//! Turns caller input into parameterized Cypher and raw rows back into
//! payloads. Pure: no I/O, no store handle.

pub mod builder;
pub mod catalog;
pub mod request;
pub mod search;
pub mod shape;
pub mod statement;

pub use builder::{
    create_asset, create_link, delete_link, find_assets, relationship_type_fragment,
    RelationshipType, SearchQuery,
};
pub use catalog::{Comparison, PredicateRow, Property, SearchField, ValueKind, ASSET_VAR, CATALOG};
pub use request::{CreateAssetRequest, LinkRequest};
pub use search::{AssetSearch, LinkSelector, SearchCriterion};
pub use shape::{shape_created_asset, shape_link_outcome, shape_rows, shape_search_rows, LinkOutcome};
pub use statement::{AccessMode, Column, ColumnKind, CypherQuery, ParamValue, Statement};
