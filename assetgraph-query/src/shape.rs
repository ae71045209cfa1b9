//! Result shaping
//!
//! Maps raw rows from a run into response payloads. Search results stay
//! positional (`[a, inbound?, outbound?]`); link operations collapse into a
//! `LinkOutcome` so a no-op is distinguishable from a failure.

use assetgraph_core::{Asset, GraphValue, Link, Row, StorageError};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::builder::SearchQuery;
use crate::catalog::ASSET_VAR;

/// Result of a link create or delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum LinkOutcome {
    /// Both endpoints matched; the link now exists (create) or no longer does (delete).
    Applied {
        source: Asset,
        target: Asset,
        link: Link,
    },
    /// Nothing matched. Not an error.
    NoMatch { message: String },
}

/// Check search rows against the layout the selector asked for, and drop
/// rows whose asset fails a criterion the query could only approximate.
///
/// # Errors
/// `DecodeFailed` if a row has the wrong number of cells or does not start
/// with an asset.
pub fn shape_search_rows(rows: Vec<Row>, search: &SearchQuery) -> Result<Vec<Row>, StorageError> {
    let width = search.links().row_width();
    let mut shaped = Vec::with_capacity(rows.len());

    for (index, row) in rows.into_iter().enumerate() {
        if row.len() != width {
            return Err(StorageError::DecodeFailed {
                column: format!("row {}", index),
                reason: format!("expected {} cells, got {}", width, row.len()),
            });
        }
        let asset = row
            .first()
            .and_then(GraphValue::as_asset)
            .ok_or_else(|| StorageError::DecodeFailed {
                column: ASSET_VAR.to_string(),
                reason: format!("row {} does not start with an asset", index),
            })?;
        if search.inexact_criteria().all(|c| c.matches(asset)) {
            shaped.push(row);
        }
    }
    Ok(shaped)
}

/// Render rows as plain JSON arrays.
///
/// # Errors
/// `DecodeFailed` if a cell cannot be serialized.
pub fn shape_rows(rows: &[Row]) -> Result<Vec<Value>, StorageError> {
    rows.iter()
        .map(|row| {
            serde_json::to_value(row).map_err(|e| StorageError::DecodeFailed {
                column: "row".to_string(),
                reason: e.to_string(),
            })
        })
        .collect()
}

/// Collapse the rows of a link create/delete into an outcome.
///
/// Zero rows means an endpoint (or, for delete, the link) was missing.
///
/// # Errors
/// `DecodeFailed` if the first row is not `[Asset, Asset, Link]`.
pub fn shape_link_outcome(rows: Vec<Row>, requested: &Link) -> Result<LinkOutcome, StorageError> {
    let Some(row) = rows.into_iter().next() else {
        return Ok(LinkOutcome::NoMatch {
            message: format!(
                "No {} link matched from {} to {}; nothing changed",
                requested.rel_type, requested.from, requested.to
            ),
        });
    };

    let mut cells = row.into_iter();
    let source = expect_asset(cells.next(), "source")?;
    let target = expect_asset(cells.next(), "target")?;
    let link = match cells.next() {
        Some(GraphValue::Link(link)) => link,
        other => return Err(unexpected_cell("link", other.as_ref())),
    };

    Ok(LinkOutcome::Applied {
        source,
        target,
        link,
    })
}

/// The single record a create returned.
///
/// # Errors
/// `QueryFailed` if the store acknowledged the write but returned no row;
/// `DecodeFailed` if the row does not hold an asset.
pub fn shape_created_asset(rows: Vec<Row>) -> Result<Asset, StorageError> {
    let Some(row) = rows.into_iter().next() else {
        return Err(StorageError::QueryFailed {
            reason: "create returned no record".to_string(),
        });
    };
    expect_asset(row.into_iter().next(), "a")
}

fn expect_asset(cell: Option<GraphValue>, column: &str) -> Result<Asset, StorageError> {
    match cell {
        Some(GraphValue::Asset(asset)) => Ok(asset),
        other => Err(unexpected_cell(column, other.as_ref())),
    }
}

fn unexpected_cell(column: &str, cell: Option<&GraphValue>) -> StorageError {
    let reason = match cell {
        None => "missing cell".to_string(),
        Some(GraphValue::Null) => "null".to_string(),
        Some(GraphValue::Asset(_)) => "unexpected asset".to_string(),
        Some(GraphValue::Link(_)) => "unexpected link".to_string(),
        Some(GraphValue::List(_)) => "unexpected list".to_string(),
    };
    StorageError::DecodeFailed {
        column: column.to_string(),
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::find_assets;
    use crate::catalog::SearchField;
    use crate::search::AssetSearch;
    use assetgraph_core::{parse_timestamp, Decimal};
    use std::str::FromStr;

    fn asset(id: &str) -> Asset {
        Asset {
            id: id.to_string(),
            name: format!("asset {}", id),
            price: Decimal::new(999, 2),
            purchase_date: parse_timestamp("01/02/2021", "date").unwrap(),
        }
    }

    fn applied_row() -> Row {
        vec![
            GraphValue::Asset(asset("a")),
            GraphValue::Asset(asset("b")),
            GraphValue::Link(Link::new("a", "b", "OWNS")),
        ]
    }

    #[test]
    fn test_link_outcome_applied() {
        let outcome = shape_link_outcome(vec![applied_row()], &Link::new("a", "b", "OWNS")).unwrap();
        assert_eq!(
            outcome,
            LinkOutcome::Applied {
                source: asset("a"),
                target: asset("b"),
                link: Link::new("a", "b", "OWNS"),
            }
        );
    }

    #[test]
    fn test_link_outcome_no_match() {
        let outcome = shape_link_outcome(Vec::new(), &Link::new("x", "y", "OWNS")).unwrap();
        match &outcome {
            LinkOutcome::NoMatch { message } => {
                assert!(message.contains("OWNS"));
                assert!(message.contains("x"));
            }
            other => panic!("expected NoMatch, got {:?}", other),
        }
    }

    #[test]
    fn test_link_outcome_rejects_malformed_row() {
        let row = vec![GraphValue::Asset(asset("a")), GraphValue::Null];
        let err = shape_link_outcome(vec![row], &Link::new("a", "b", "OWNS")).unwrap_err();
        assert!(matches!(err, StorageError::DecodeFailed { column, .. } if column == "target"));
    }

    fn search(field: SearchField, value: &str, links: &str) -> SearchQuery {
        find_assets(&AssetSearch::default().with(field, value).with_links(links)).unwrap()
    }

    fn priced(id: &str, price: &str) -> Asset {
        Asset {
            price: Decimal::from_str(price).unwrap(),
            ..asset(id)
        }
    }

    #[test]
    fn test_search_rows_width_checked() {
        let one = vec![vec![GraphValue::Asset(asset("a"))]];
        let plain = search(SearchField::Id, "a", "");
        let both = search(SearchField::Id, "a", "both");
        assert_eq!(shape_search_rows(one.clone(), &plain), Ok(one.clone()));
        assert!(shape_search_rows(one, &both).is_err());
        assert_eq!(shape_search_rows(Vec::new(), &both), Ok(Vec::new()));
    }

    #[test]
    fn test_search_rows_must_start_with_asset() {
        let rows = vec![vec![GraphValue::Null]];
        let err = shape_search_rows(rows, &search(SearchField::Id, "a", "")).unwrap_err();
        assert!(matches!(err, StorageError::DecodeFailed { column, .. } if column == "a"));
    }

    #[test]
    fn test_price_ranges_are_exact_at_float_boundary() {
        // Both prices round to the same double as 0.3.
        let rows = vec![
            vec![GraphValue::Asset(priced("above", "0.30000000000000001"))],
            vec![GraphValue::Asset(priced("equal", "0.3"))],
            vec![GraphValue::Asset(priced("below", "0.29999999999999999"))],
        ];

        let greater = shape_search_rows(rows.clone(), &search(SearchField::PriceGreater, "0.3", ""));
        let ids = |rows: Vec<Row>| -> Vec<String> {
            rows.iter()
                .filter_map(|r| r[0].as_asset().map(|a| a.id.clone()))
                .collect()
        };
        assert_eq!(ids(greater.unwrap()), vec!["above"]);

        let less = shape_search_rows(rows, &search(SearchField::PriceLess, "0.3", ""));
        assert_eq!(ids(less.unwrap()), vec!["below"]);
    }

    #[test]
    fn test_rows_render_as_arrays() {
        let rows = vec![vec![
            GraphValue::Asset(asset("a")),
            GraphValue::List(vec![GraphValue::Asset(asset("b"))]),
        ]];
        let json = shape_rows(&rows).unwrap();
        assert_eq!(json.len(), 1);
        let cells = json[0].as_array().unwrap();
        assert_eq!(cells.len(), 2);
        assert_eq!(cells[0]["id"], "a");
        assert_eq!(cells[1][0]["id"], "b");
    }

    #[test]
    fn test_created_asset() {
        let created = shape_created_asset(vec![vec![GraphValue::Asset(asset("a"))]]).unwrap();
        assert_eq!(created.id, "a");
        assert!(matches!(
            shape_created_asset(Vec::new()),
            Err(StorageError::QueryFailed { .. })
        ));
    }

    #[test]
    fn test_outcome_serializes_with_tag() {
        let outcome = LinkOutcome::NoMatch {
            message: "nothing".to_string(),
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["outcome"], "no_match");
        assert_eq!(json["message"], "nothing");
    }
}
