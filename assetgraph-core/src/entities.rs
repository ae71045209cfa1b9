//! Graph entities and result cells

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque asset identifier. Server-generated on create, free-form on lookup.
pub type AssetId = String;

/// Generate a new asset identifier.
///
/// UUIDv7 keeps identifiers collision-resistant and sortable by creation time.
/// Uniqueness itself is enforced by the store.
pub fn new_asset_id() -> AssetId {
    Uuid::now_v7().to_string()
}

/// Node label used for assets in the graph.
pub const ASSET_LABEL: &str = "Asset";

/// The primary stored entity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    /// Immutable identifier
    pub id: AssetId,
    /// Free-text name
    pub name: String,
    /// Exact decimal price, serialized as a string
    pub price: Decimal,
    /// Purchase date and time, no timezone
    pub purchase_date: NaiveDateTime,
}

impl Asset {
    /// Build a new asset with a freshly generated identifier.
    ///
    /// The price is normalized (no trailing zeros), which is the form every
    /// store persists and returns.
    pub fn new(name: impl Into<String>, price: Decimal, purchase_date: NaiveDateTime) -> Self {
        Self {
            id: new_asset_id(),
            name: name.into(),
            price: price.normalize(),
            purchase_date,
        }
    }
}

/// A directed, typed relationship between two assets.
///
/// Identity is the (from, to, type) triplet; there are no attributes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Link {
    pub from: AssetId,
    pub to: AssetId,
    #[serde(rename = "type")]
    pub rel_type: String,
}

impl Link {
    pub fn new(from: impl Into<AssetId>, to: impl Into<AssetId>, rel_type: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            rel_type: rel_type.into(),
        }
    }
}

/// One cell of a result row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GraphValue {
    Null,
    Asset(Asset),
    Link(Link),
    List(Vec<GraphValue>),
}

impl GraphValue {
    pub fn as_asset(&self) -> Option<&Asset> {
        match self {
            GraphValue::Asset(a) => Some(a),
            _ => None,
        }
    }
}

/// A result row: cells in projection order.
pub type Row = Vec<GraphValue>;

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::collections::HashSet;

    fn sample_date() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2023, 1, 31)
            .unwrap()
            .and_hms_opt(10, 15, 0)
            .unwrap()
    }

    #[test]
    fn test_new_asset_ids_are_unique() {
        let ids: HashSet<AssetId> = (0..1000).map(|_| new_asset_id()).collect();
        assert_eq!(ids.len(), 1000);
    }

    #[test]
    fn test_asset_serializes_camel_case() {
        let asset = Asset {
            id: "a-1".to_string(),
            name: "Laptop".to_string(),
            price: Decimal::new(1247, 2),
            purchase_date: sample_date(),
        };
        let json = serde_json::to_value(&asset).unwrap();
        assert_eq!(json["id"], "a-1");
        assert_eq!(json["price"], "12.47");
        assert_eq!(json["purchaseDate"], "2023-01-31T10:15:00");
    }

    #[test]
    fn test_new_asset_price_is_normalized() {
        let asset = Asset::new("Desk", Decimal::new(12470, 3), sample_date());
        assert_eq!(asset.price.to_string(), "12.47");
        assert_eq!(serde_json::to_value(&asset).unwrap()["price"], "12.47");
    }

    #[test]
    fn test_link_serializes_type_key() {
        let link = Link::new("a", "b", "OWNS");
        let json = serde_json::to_value(&link).unwrap();
        assert_eq!(json["type"], "OWNS");
        assert_eq!(json["from"], "a");
    }

    #[test]
    fn test_graph_value_null_serializes_as_null() {
        assert_eq!(serde_json::to_value(GraphValue::Null).unwrap(), serde_json::Value::Null);
    }
}
