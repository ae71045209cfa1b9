//! Predicate Catalog
//!
//! The single table mapping each optional search field to its WHERE fragment,
//! bound-parameter name and value kind. The builder never spells out a
//! predicate itself: it looks up the row for a `SearchField` and uses it.
//! Adding a searchable field means one new variant and one new row.

use serde::{Deserialize, Serialize};

/// Variable the matched asset is bound to in search queries.
pub const ASSET_VAR: &str = "a";

/// Optional search fields, in the order their predicates are emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SearchField {
    Id,
    Name,
    PriceEqual,
    PriceGreater,
    PriceLess,
    DateOn,
    DateAfter,
    DateBefore,
}

impl SearchField {
    /// Every field, in catalog order.
    pub const ALL: [SearchField; 8] = [
        SearchField::Id,
        SearchField::Name,
        SearchField::PriceEqual,
        SearchField::PriceGreater,
        SearchField::PriceLess,
        SearchField::DateOn,
        SearchField::DateAfter,
        SearchField::DateBefore,
    ];

    /// Catalog row for this field.
    pub fn predicate(self) -> &'static PredicateRow {
        &CATALOG[self as usize]
    }
}

/// Which parser a field's raw text goes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValueKind {
    Text,
    Amount,
    Timestamp,
}

/// Stored asset property a predicate reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Property {
    Id,
    Name,
    Price,
    PurchaseDate,
}

impl Property {
    /// Property key on the graph node.
    pub fn key(self) -> &'static str {
        match self {
            Property::Id => "id",
            Property::Name => "name",
            Property::Price => "price",
            Property::PurchaseDate => "purchaseDate",
        }
    }
}

/// Comparison a predicate applies between the property and the bound value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Comparison {
    Equals,
    ContainsIgnoreCase,
    Greater,
    Less,
}

/// One catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PredicateRow {
    pub field: SearchField,
    /// Name of the request parameter that supplies the value
    pub request_key: &'static str,
    /// Bound parameter name used in `template` (without the `$`)
    pub param: &'static str,
    /// WHERE fragment; only ever references `param` as `$param`
    pub template: &'static str,
    pub property: Property,
    pub comparison: Comparison,
    pub kind: ValueKind,
    /// False when `template` only narrows the candidates and each returned
    /// asset must be re-checked with [`crate::SearchCriterion::matches`].
    pub exact: bool,
}

/// Indexed by `SearchField as usize`.
pub static CATALOG: [PredicateRow; 8] = [
    PredicateRow {
        field: SearchField::Id,
        request_key: "id",
        param: "id",
        template: "a.id = $id",
        property: Property::Id,
        comparison: Comparison::Equals,
        kind: ValueKind::Text,
        exact: true,
    },
    PredicateRow {
        field: SearchField::Name,
        request_key: "name",
        param: "name",
        template: "toLower(a.name) CONTAINS toLower($name)",
        property: Property::Name,
        comparison: Comparison::ContainsIgnoreCase,
        kind: ValueKind::Text,
        exact: true,
    },
    PredicateRow {
        field: SearchField::PriceEqual,
        request_key: "priceEqual",
        param: "priceEqual",
        template: "a.price = $priceEqual",
        property: Property::Price,
        comparison: Comparison::Equals,
        kind: ValueKind::Amount,
        exact: true,
    },
    PredicateRow {
        field: SearchField::PriceGreater,
        request_key: "priceGT",
        param: "priceGT",
        template: "toFloat(a.price) >= toFloat($priceGT)",
        property: Property::Price,
        comparison: Comparison::Greater,
        kind: ValueKind::Amount,
        exact: false,
    },
    PredicateRow {
        field: SearchField::PriceLess,
        request_key: "priceLT",
        param: "priceLT",
        template: "toFloat(a.price) <= toFloat($priceLT)",
        property: Property::Price,
        comparison: Comparison::Less,
        kind: ValueKind::Amount,
        exact: false,
    },
    PredicateRow {
        field: SearchField::DateOn,
        request_key: "dateOn",
        param: "dateOn",
        template: "a.purchaseDate = $dateOn",
        property: Property::PurchaseDate,
        comparison: Comparison::Equals,
        kind: ValueKind::Timestamp,
        exact: true,
    },
    PredicateRow {
        field: SearchField::DateAfter,
        request_key: "dateAfter",
        param: "dateAfter",
        template: "a.purchaseDate > $dateAfter",
        property: Property::PurchaseDate,
        comparison: Comparison::Greater,
        kind: ValueKind::Timestamp,
        exact: true,
    },
    PredicateRow {
        field: SearchField::DateBefore,
        request_key: "dateBefore",
        param: "dateBefore",
        template: "a.purchaseDate < $dateBefore",
        property: Property::PurchaseDate,
        comparison: Comparison::Less,
        kind: ValueKind::Timestamp,
        exact: true,
    },
];
