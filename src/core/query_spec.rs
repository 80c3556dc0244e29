use serde::Serialize;

use crate::filtering::{FilterSpec, IncludeMap, OrderBy, Selection};

/// The fully composed query handed to a [`DataSource`](super::DataSource).
///
/// Serializes to the familiar `findMany` argument shape:
/// `{"where": ..., "orderBy": [...], "skip": 0, "take": 10, "select": ..., "include": ...}`
/// with unset parts omitted.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuerySpec {
    #[serde(rename = "where", skip_serializing_if = "FilterSpec::is_empty")]
    pub where_clause: FilterSpec,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_by: Option<Vec<OrderBy>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub take: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub select: Option<Selection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include: Option<IncludeMap>,
}
