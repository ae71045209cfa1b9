//! Search requests, criteria and the link selector.

use assetgraph_core::{
    optional_filter, parse_amount, parse_timestamp, Asset, ValidationError,
};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::catalog::{Comparison, Property, SearchField, ValueKind};
use crate::statement::ParamValue;

/// Raw search parameters as they arrive from the caller.
///
/// Every field is optional. Absent, empty and whitespace-only values are all
/// treated as "not supplied".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetSearch {
    pub id: Option<String>,
    pub name: Option<String>,
    pub price_equal: Option<String>,
    #[serde(rename = "priceGT")]
    pub price_gt: Option<String>,
    #[serde(rename = "priceLT")]
    pub price_lt: Option<String>,
    pub date_on: Option<String>,
    pub date_after: Option<String>,
    pub date_before: Option<String>,
    pub which_links: Option<String>,
}

impl AssetSearch {
    /// Raw text for a search field. Closed lookup, no string dispatch.
    pub fn raw(&self, field: SearchField) -> Option<&str> {
        let value = match field {
            SearchField::Id => &self.id,
            SearchField::Name => &self.name,
            SearchField::PriceEqual => &self.price_equal,
            SearchField::PriceGreater => &self.price_gt,
            SearchField::PriceLess => &self.price_lt,
            SearchField::DateOn => &self.date_on,
            SearchField::DateAfter => &self.date_after,
            SearchField::DateBefore => &self.date_before,
        };
        value.as_deref()
    }

    /// Set a field by enum. Handy for tests and generators.
    pub fn with(mut self, field: SearchField, value: impl Into<String>) -> Self {
        let slot = match field {
            SearchField::Id => &mut self.id,
            SearchField::Name => &mut self.name,
            SearchField::PriceEqual => &mut self.price_equal,
            SearchField::PriceGreater => &mut self.price_gt,
            SearchField::PriceLess => &mut self.price_lt,
            SearchField::DateOn => &mut self.date_on,
            SearchField::DateAfter => &mut self.date_after,
            SearchField::DateBefore => &mut self.date_before,
        };
        *slot = Some(value.into());
        self
    }

    pub fn with_links(mut self, which_links: impl Into<String>) -> Self {
        self.which_links = Some(which_links.into());
        self
    }

    /// Parse every supplied field into a criterion, in catalog order.
    ///
    /// # Errors
    /// - `BadFormat` if a supplied amount or timestamp does not parse
    /// - `NoSearchCriteria` if nothing was supplied
    pub fn criteria(&self) -> Result<Vec<SearchCriterion>, ValidationError> {
        let mut criteria = Vec::new();
        for field in SearchField::ALL {
            let Some(raw) = optional_filter(self.raw(field)) else {
                continue;
            };
            criteria.push(SearchCriterion::parse(field, raw)?);
        }

        if criteria.is_empty() {
            return Err(ValidationError::NoSearchCriteria);
        }
        Ok(criteria)
    }
}

/// Which neighbouring assets to fetch alongside each match.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkSelector {
    #[default]
    None,
    In,
    Out,
    Both,
}

impl LinkSelector {
    /// Parse the `whichLinks` parameter. Blank means `None`.
    ///
    /// # Errors
    /// `BadFormat` for anything other than `in`, `out` or `both` (any case).
    pub fn parse(value: Option<&str>) -> Result<Self, ValidationError> {
        let Some(raw) = optional_filter(value) else {
            return Ok(LinkSelector::None);
        };
        match raw.trim().to_ascii_lowercase().as_str() {
            "in" => Ok(LinkSelector::In),
            "out" => Ok(LinkSelector::Out),
            "both" => Ok(LinkSelector::Both),
            _ => Err(ValidationError::bad_format("whichLinks", "one of in, out, both")),
        }
    }

    pub fn includes_inbound(self) -> bool {
        matches!(self, LinkSelector::In | LinkSelector::Both)
    }

    pub fn includes_outbound(self) -> bool {
        matches!(self, LinkSelector::Out | LinkSelector::Both)
    }

    /// Number of cells in each result row.
    pub fn row_width(self) -> usize {
        1 + usize::from(self.includes_inbound()) + usize::from(self.includes_outbound())
    }
}

/// One parsed search constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchCriterion {
    pub field: SearchField,
    pub value: ParamValue,
}

impl SearchCriterion {
    /// Parse raw text with the parser the catalog assigns to `field`.
    pub fn parse(field: SearchField, raw: &str) -> Result<Self, ValidationError> {
        let row = field.predicate();
        let value = match row.kind {
            ValueKind::Text => ParamValue::Text(raw.to_string()),
            ValueKind::Amount => ParamValue::Amount(parse_amount(raw, row.request_key)?),
            ValueKind::Timestamp => ParamValue::Timestamp(parse_timestamp(raw, row.request_key)?),
        };
        Ok(Self { field, value })
    }

    /// Evaluate this criterion against an asset with the catalog's comparison.
    pub fn matches(&self, asset: &Asset) -> bool {
        let row = self.field.predicate();
        match (row.property, &self.value) {
            (Property::Id, ParamValue::Text(v)) => compare_text(&asset.id, v, row.comparison),
            (Property::Name, ParamValue::Text(v)) => compare_text(&asset.name, v, row.comparison),
            (Property::Price, ParamValue::Amount(v)) => {
                compare_ordered(asset.price.cmp(v), row.comparison)
            }
            (Property::PurchaseDate, ParamValue::Timestamp(v)) => {
                compare_ordered(asset.purchase_date.cmp(v), row.comparison)
            }
            _ => false,
        }
    }
}

fn compare_text(property: &str, value: &str, comparison: Comparison) -> bool {
    match comparison {
        Comparison::Equals => property == value,
        Comparison::ContainsIgnoreCase => property.to_lowercase().contains(&value.to_lowercase()),
        Comparison::Greater => property > value,
        Comparison::Less => property < value,
    }
}

fn compare_ordered(ordering: Ordering, comparison: Comparison) -> bool {
    match comparison {
        Comparison::Equals | Comparison::ContainsIgnoreCase => ordering == Ordering::Equal,
        Comparison::Greater => ordering == Ordering::Greater,
        Comparison::Less => ordering == Ordering::Less,
    }
}
