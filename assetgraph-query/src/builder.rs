//! Cypher Query Builder
//!
//! Turns validated, typed inputs into `CypherQuery` values. Every caller
//! value is a bound parameter, with exactly one exception: relationship type
//! names, which Cypher cannot parameterize. Those go through
//! [`RelationshipType::parse`] (the strictest validator in the crate) and are
//! written into text only by [`relationship_type_fragment`].

use assetgraph_core::{
    parse_amount, parse_timestamp, require_non_empty, require_token, Asset, Link,
    ValidationError, ASSET_LABEL, MAX_TOKEN_LENGTH,
};
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

use crate::catalog::ASSET_VAR;
use crate::request::{CreateAssetRequest, LinkRequest};
use crate::search::{AssetSearch, LinkSelector, SearchCriterion};
use crate::statement::{AccessMode, Column, ColumnKind, CypherQuery, ParamValue, Statement};

const SOURCE_VAR: &str = "source";
const TARGET_VAR: &str = "target";
const LINK_VAR: &str = "link";
const INBOUND_VAR: &str = "inbound";
const OUTBOUND_VAR: &str = "outbound";

const PARAM_ID_FROM: &str = "idFrom";
const PARAM_ID_TO: &str = "idTo";

/// Columns returned by link create/delete.
const LINK_COLUMNS: [Column; 3] = [
    Column::new(SOURCE_VAR, ColumnKind::Asset),
    Column::new(TARGET_VAR, ColumnKind::Asset),
    Column::new(LINK_VAR, ColumnKind::Link),
];

// ============================================================================
// RELATIONSHIP TYPES
// ============================================================================

/// A relationship type that passed `require_token`, uppercased.
///
/// The only way to obtain one is [`RelationshipType::parse`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RelationshipType(String);

impl RelationshipType {
    /// Validate and uppercase a relationship type token.
    ///
    /// # Errors
    /// `MissingField`, `TooLong` or `IllegalCharacters` from `require_token`.
    pub fn parse(value: Option<&str>) -> Result<Self, ValidationError> {
        let token = require_token(value, "type", MAX_TOKEN_LENGTH)?;
        Ok(Self(token.to_ascii_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RelationshipType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Render a relationship type for direct inclusion in query text.
///
/// This is the single place where caller-derived text becomes Cypher syntax.
/// Its input is restricted to `[A-Z0-9_]{1,19}`; the backticks make keywords
/// and leading digits parse as plain type names. Any change to
/// `require_token` must be reviewed against this function.
pub fn relationship_type_fragment(rel_type: &RelationshipType) -> String {
    format!("`{}`", rel_type.0)
}

/// Log a freshly built query. Parameter values are never logged.
fn built(query: CypherQuery) -> CypherQuery {
    debug!(
        text = %query.text(),
        params = ?query.param_names(),
        mode = ?query.mode(),
        "Built query"
    );
    query
}

// ============================================================================
// CREATE ASSET
// ============================================================================

/// Build the insert for a new asset with a server-generated id.
///
/// # Errors
/// - `MissingField` for a blank name, price or date
/// - `BadFormat` for an unparseable price or date
pub fn create_asset(req: &CreateAssetRequest) -> Result<CypherQuery, ValidationError> {
    let name = require_non_empty(req.name.as_deref(), "name")?;
    let price_text = require_non_empty(req.price.as_deref(), "price")?;
    let date_text = require_non_empty(req.date.as_deref(), "date")?;

    let price = parse_amount(price_text, "price")?;
    let purchase_date = parse_timestamp(date_text, "date")?;
    let asset = Asset::new(name, price, purchase_date);

    let mut params = BTreeMap::new();
    params.insert("id".to_string(), ParamValue::Text(asset.id.clone()));
    params.insert("name".to_string(), ParamValue::Text(asset.name.clone()));
    params.insert("price".to_string(), ParamValue::Amount(asset.price));
    params.insert(
        "purchaseDate".to_string(),
        ParamValue::Timestamp(asset.purchase_date),
    );

    let text = format!(
        "CREATE ({v}:{label} {{id: $id, name: $name, price: $price, purchaseDate: $purchaseDate}})\n\
         RETURN {v}",
        v = ASSET_VAR,
        label = ASSET_LABEL,
    );

    Ok(built(CypherQuery::new(
        text,
        params,
        AccessMode::Write,
        vec![Column::new(ASSET_VAR, ColumnKind::Asset)],
        Statement::CreateAsset(asset),
    )))
}

// ============================================================================
// FIND ASSETS
// ============================================================================

/// A built search together with what its rows are shaped by.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    query: CypherQuery,
    criteria: Vec<SearchCriterion>,
    links: LinkSelector,
}

impl SearchQuery {
    pub fn query(&self) -> &CypherQuery {
        &self.query
    }

    pub fn into_query(self) -> CypherQuery {
        self.query
    }

    pub fn links(&self) -> LinkSelector {
        self.links
    }

    /// Criteria whose WHERE fragment only narrows the candidates.
    pub fn inexact_criteria(&self) -> impl Iterator<Item = &SearchCriterion> {
        self.criteria.iter().filter(|c| !c.field.predicate().exact)
    }
}

/// Build a search over every supplied criterion, joined with AND.
///
/// # Errors
/// - `NoSearchCriteria` when no filter was supplied
/// - `BadFormat` for an unparseable amount, timestamp or link selector
pub fn find_assets(search: &AssetSearch) -> Result<SearchQuery, ValidationError> {
    let criteria = search.criteria()?;
    let links = LinkSelector::parse(search.which_links.as_deref())?;
    Ok(search_query(criteria, links))
}

/// `criteria` is never empty here: `AssetSearch::criteria` rejects that.
fn search_query(criteria: Vec<SearchCriterion>, links: LinkSelector) -> SearchQuery {
    let mut params = BTreeMap::new();
    let mut predicates = Vec::with_capacity(criteria.len());
    for criterion in &criteria {
        let row = criterion.field.predicate();
        predicates.push(row.template);
        params.insert(row.param.to_string(), criterion.value.clone());
    }

    let mut lines = vec![format!("MATCH ({}:{})", ASSET_VAR, ASSET_LABEL)];
    if !predicates.is_empty() {
        lines.push(format!("WHERE {}", predicates.join(" AND ")));
    }

    let mut columns = vec![Column::new(ASSET_VAR, ColumnKind::Asset)];
    let mut projection = vec![ASSET_VAR.to_string()];

    if links.includes_inbound() {
        lines.push(format!(
            "OPTIONAL MATCH ({}:{})-->({})",
            INBOUND_VAR, ASSET_LABEL, ASSET_VAR
        ));
        let collected = format!("collect(DISTINCT {0}) AS {0}", INBOUND_VAR);
        if links.includes_outbound() {
            // Aggregate before the second traversal so the two lists don't multiply.
            lines.push(format!("WITH {}, {}", ASSET_VAR, collected));
            projection.push(INBOUND_VAR.to_string());
        } else {
            projection.push(collected);
        }
        columns.push(Column::new(INBOUND_VAR, ColumnKind::AssetList));
    }

    if links.includes_outbound() {
        lines.push(format!(
            "OPTIONAL MATCH ({})-->({}:{})",
            ASSET_VAR, OUTBOUND_VAR, ASSET_LABEL
        ));
        projection.push(format!("collect(DISTINCT {0}) AS {0}", OUTBOUND_VAR));
        columns.push(Column::new(OUTBOUND_VAR, ColumnKind::AssetList));
    }

    lines.push(format!("RETURN {}", projection.join(", ")));
    lines.push(format!("ORDER BY {}.id", ASSET_VAR));

    let query = built(CypherQuery::new(
        lines.join("\n"),
        params,
        AccessMode::Read,
        columns,
        Statement::FindAssets {
            criteria: criteria.clone(),
            links,
        },
    ));
    SearchQuery {
        query,
        criteria,
        links,
    }
}

// ============================================================================
// LINKS
// ============================================================================

/// Validated link endpoints and type.
fn validated_link(req: &LinkRequest) -> Result<(Link, RelationshipType), ValidationError> {
    let id_from = require_non_empty(req.id_from.as_deref(), PARAM_ID_FROM)?;
    let id_to = require_non_empty(req.id_to.as_deref(), PARAM_ID_TO)?;
    let rel_type = RelationshipType::parse(req.rel_type.as_deref())?;
    let link = Link::new(id_from, id_to, rel_type.as_str());
    Ok((link, rel_type))
}

fn endpoint_params(link: &Link) -> BTreeMap<String, ParamValue> {
    let mut params = BTreeMap::new();
    params.insert(PARAM_ID_FROM.to_string(), ParamValue::Text(link.from.clone()));
    params.insert(PARAM_ID_TO.to_string(), ParamValue::Text(link.to.clone()));
    params
}

/// Map literal describing the link in result rows.
fn link_projection() -> String {
    format!(
        "{{from: {s}.id, to: {t}.id, type: type({l})}}",
        s = SOURCE_VAR,
        t = TARGET_VAR,
        l = LINK_VAR
    )
}

/// Build the link creation. Matching nothing yields zero rows.
///
/// # Errors
/// `MissingField` for a blank endpoint; `MissingField`, `TooLong` or
/// `IllegalCharacters` for the type.
pub fn create_link(req: &LinkRequest) -> Result<CypherQuery, ValidationError> {
    let (link, rel_type) = validated_link(req)?;

    let text = [
        format!(
            "MATCH ({s}:{label} {{id: ${from}}}), ({t}:{label} {{id: ${to}}})",
            s = SOURCE_VAR,
            t = TARGET_VAR,
            label = ASSET_LABEL,
            from = PARAM_ID_FROM,
            to = PARAM_ID_TO,
        ),
        format!(
            "MERGE ({s})-[{l}:{rel}]->({t})",
            s = SOURCE_VAR,
            t = TARGET_VAR,
            l = LINK_VAR,
            rel = relationship_type_fragment(&rel_type),
        ),
        format!(
            "RETURN {s}, {t}, {proj} AS {l}",
            s = SOURCE_VAR,
            t = TARGET_VAR,
            proj = link_projection(),
            l = LINK_VAR,
        ),
    ]
    .join("\n");

    Ok(built(CypherQuery::new(
        text,
        endpoint_params(&link),
        AccessMode::Write,
        LINK_COLUMNS.to_vec(),
        Statement::MergeLink(link),
    )))
}

/// Build the link deletion. Matching nothing yields zero rows.
///
/// # Errors
/// Same as [`create_link`].
pub fn delete_link(req: &LinkRequest) -> Result<CypherQuery, ValidationError> {
    let (link, rel_type) = validated_link(req)?;

    let text = [
        format!(
            "MATCH ({s}:{label} {{id: ${from}}})-[{l}:{rel}]->({t}:{label} {{id: ${to}}})",
            s = SOURCE_VAR,
            t = TARGET_VAR,
            l = LINK_VAR,
            label = ASSET_LABEL,
            rel = relationship_type_fragment(&rel_type),
            from = PARAM_ID_FROM,
            to = PARAM_ID_TO,
        ),
        format!(
            "WITH {s}, {t}, {l}, {proj} AS removed",
            s = SOURCE_VAR,
            t = TARGET_VAR,
            l = LINK_VAR,
            proj = link_projection(),
        ),
        format!("DELETE {}", LINK_VAR),
        format!(
            "RETURN {s}, {t}, removed AS {l}",
            s = SOURCE_VAR,
            t = TARGET_VAR,
            l = LINK_VAR,
        ),
    ]
    .join("\n");

    Ok(built(CypherQuery::new(
        text,
        endpoint_params(&link),
        AccessMode::Write,
        LINK_COLUMNS.to_vec(),
        Statement::DeleteLink(link),
    )))
}
