//! Built queries
//!
//! A `CypherQuery` is what the builder hands to the execution adapter: the
//! query text, its bound parameters, the access mode, the column layout of
//! its result, and the typed `Statement` the text was rendered from. Stores
//! that speak Cypher use the text and parameters; the in-memory store
//! evaluates the statement directly.

use assetgraph_core::{Asset, Link};
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

use crate::search::{LinkSelector, SearchCriterion};

/// A value bound out-of-band from the query text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    Text(String),
    Amount(Decimal),
    Timestamp(NaiveDateTime),
}

impl ParamValue {
    /// Amounts travel to the store in canonical string form so no precision is lost.
    pub fn amount_text(amount: &Decimal) -> String {
        amount.normalize().to_string()
    }
}

/// Transaction mode a query must run under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessMode {
    Read,
    Write,
}

/// What a result column holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Asset,
    AssetList,
    Link,
}

/// One projected result column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub name: &'static str,
    pub kind: ColumnKind,
}

impl Column {
    pub const fn new(name: &'static str, kind: ColumnKind) -> Self {
        Self { name, kind }
    }
}

/// The typed form of a built query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    CreateAsset(Asset),
    FindAssets {
        criteria: Vec<SearchCriterion>,
        links: LinkSelector,
    },
    /// Relationship type is already validated and uppercased.
    MergeLink(Link),
    /// Relationship type is already validated and uppercased.
    DeleteLink(Link),
}

/// A fully built, parameterized query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CypherQuery {
    text: String,
    params: BTreeMap<String, ParamValue>,
    mode: AccessMode,
    columns: Vec<Column>,
    statement: Statement,
}

impl CypherQuery {
    pub(crate) fn new(
        text: String,
        params: BTreeMap<String, ParamValue>,
        mode: AccessMode,
        columns: Vec<Column>,
        statement: Statement,
    ) -> Self {
        Self {
            text,
            params,
            mode,
            columns,
            statement,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn params(&self) -> &BTreeMap<String, ParamValue> {
        &self.params
    }

    pub fn param(&self, name: &str) -> Option<&ParamValue> {
        self.params.get(name)
    }

    pub fn mode(&self) -> AccessMode {
        self.mode
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn statement(&self) -> &Statement {
        &self.statement
    }

    /// Parameter names, for logging without leaking values.
    pub fn param_names(&self) -> Vec<&str> {
        self.params.keys().map(String::as_str).collect()
    }
}
