//! Loosely-typed mutation requests.
//!
//! Every field is an `Option<String>` so that a missing value becomes a
//! `MissingField` validation error instead of a deserialization failure.

use serde::{Deserialize, Serialize};

/// Parameters for creating an asset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAssetRequest {
    pub name: Option<String>,
    /// Exact decimal text, e.g. "12.47"
    pub price: Option<String>,
    /// Purchase date as `dd/MM/yyyy[ HH:mm]`
    pub date: Option<String>,
}

impl CreateAssetRequest {
    pub fn new(name: impl Into<String>, price: impl Into<String>, date: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            price: Some(price.into()),
            date: Some(date.into()),
        }
    }
}

/// Parameters for creating or deleting a link.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkRequest {
    pub id_from: Option<String>,
    pub id_to: Option<String>,
    #[serde(rename = "type")]
    pub rel_type: Option<String>,
}

impl LinkRequest {
    pub fn new(
        id_from: impl Into<String>,
        id_to: impl Into<String>,
        rel_type: impl Into<String>,
    ) -> Self {
        Self {
            id_from: Some(id_from.into()),
            id_to: Some(id_to.into()),
            rel_type: Some(rel_type.into()),
        }
    }
}
