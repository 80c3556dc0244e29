//! Bounded comparisons read from request parameters.
//!
//! A [`RangeFilter`] reads two parameters (`minPrice`, `maxPrice`) and emits
//! `{field: {gte: min, lte: max}}` with only the bounds that are present. A
//! [`ComparisonFilter`] reads a single parameter and emits one bound.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::Deserialize;

use super::conditions::{ConditionTree, LeafPredicate, Operator, build_nested_condition, split_path};
use crate::models::{ConditionValue, ParamMap, ParamValue};

/// Declared type of a bound; controls how the raw parameter is cast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    #[default]
    String,
    Number,
    Date,
}

/// Cast a parameter by declared type.
///
/// `number` text that does not parse becomes NaN and is kept. `date` accepts
/// RFC 3339, `YYYY-MM-DDTHH:MM:SS` (read as UTC), `YYYY-MM-DD` (midnight UTC)
/// and numbers as epoch milliseconds. Anything else is kept as given, for the
/// data source to reject.
#[must_use]
pub fn cast_value(data_type: DataType, value: &ParamValue) -> ConditionValue {
    match data_type {
        DataType::String => ConditionValue::from(value.clone()),
        DataType::Number => ConditionValue::Number(value.as_number().unwrap_or(f64::NAN)),
        DataType::Date => parse_date(value).map_or_else(
            || {
                tracing::warn!(value = %value, "Passing through date that could not be parsed");
                ConditionValue::from(value.clone())
            },
            ConditionValue::Date,
        ),
    }
}

#[allow(clippy::cast_possible_truncation)]
fn parse_date(value: &ParamValue) -> Option<DateTime<Utc>> {
    match value {
        ParamValue::Number(millis) if millis.is_finite() => {
            Utc.timestamp_millis_opt(millis.trunc() as i64).single()
        }
        ParamValue::Number(_) => None,
        ParamValue::Text(text) => {
            let text = text.trim();
            if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
                return Some(parsed.with_timezone(&Utc));
            }
            if let Ok(naive) = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f") {
                return Some(naive.and_utc());
            }
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
                .map(|naive| naive.and_utc())
        }
    }
}

/// Read one bound, treating absent and blank parameters alike.
fn read_bound(params: &ParamMap, key: &str, data_type: DataType) -> Option<ConditionValue> {
    let raw = params.get(key).filter(|value| !value.is_blank())?;
    Some(cast_value(data_type, raw))
}

fn wrap(field: &str, nested_path: Option<&str>, leaf: LeafPredicate) -> ConditionTree {
    let condition = ConditionTree::field(field, leaf);
    match nested_path {
        Some(path) => build_nested_condition(&split_path(path), condition),
        None => condition,
    }
}

/// Two-sided range on a field.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RangeFilter {
    pub field: String,
    /// Dotted relation path the field lives under
    #[serde(default)]
    pub nested_path: Option<String>,
    /// Parameter holding the upper (inclusive) bound
    pub max_key: String,
    /// Parameter holding the lower (inclusive) bound
    pub min_key: String,
    #[serde(default)]
    pub data_type: DataType,
}

impl RangeFilter {
    pub fn new(
        field: impl Into<String>,
        min_key: impl Into<String>,
        max_key: impl Into<String>,
        data_type: DataType,
    ) -> Self {
        Self {
            field: field.into(),
            nested_path: None,
            max_key: max_key.into(),
            min_key: min_key.into(),
            data_type,
        }
    }

    #[must_use]
    pub fn nested(mut self, path: impl Into<String>) -> Self {
        self.nested_path = Some(path.into());
        self
    }

    /// `{field: {gte?, lte?}}`, wrapped in the nested path when one is set.
    /// `None` when neither bound is present.
    #[must_use]
    pub fn build_condition(&self, params: &ParamMap) -> Option<ConditionTree> {
        let min = read_bound(params, &self.min_key, self.data_type);
        let max = read_bound(params, &self.max_key, self.data_type);

        let mut leaf = LeafPredicate::new();
        if let Some(min) = min {
            leaf = leaf.with(Operator::Gte, min);
        }
        if let Some(max) = max {
            leaf = leaf.with(Operator::Lte, max);
        }
        if leaf.is_empty() {
            return None;
        }
        Some(wrap(&self.field, self.nested_path.as_deref(), leaf))
    }
}

/// Single-sided comparison of one parameter against a field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComparisonFilter {
    pub field: String,
    pub nested_path: Option<String>,
    pub key: String,
    pub operator: Operator,
    pub data_type: DataType,
}

impl ComparisonFilter {
    pub fn new(
        field: impl Into<String>,
        key: impl Into<String>,
        operator: Operator,
        data_type: DataType,
    ) -> Self {
        Self {
            field: field.into(),
            nested_path: None,
            key: key.into(),
            operator,
            data_type,
        }
    }

    #[must_use]
    pub fn nested(mut self, path: impl Into<String>) -> Self {
        self.nested_path = Some(path.into());
        self
    }

    #[must_use]
    pub fn build_condition(&self, params: &ParamMap) -> Option<ConditionTree> {
        let value = read_bound(params, &self.key, self.data_type)?;
        let leaf = LeafPredicate::new().with(self.operator, value);
        Some(wrap(&self.field, self.nested_path.as_deref(), leaf))
    }
}
