use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

use crate::errors::QueryError;

/// A single request parameter value.
///
/// Query strings only ever carry text, JSON bodies may carry numbers. Anything
/// else is rejected when the [`ParamMap`] is built.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Number(f64),
    Text(String),
}

impl ParamValue {
    /// Numeric reading of the value. Surrounding whitespace is ignored and
    /// blank or non-numeric text yields `None`.
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    trimmed.parse::<f64>().ok()
                }
            }
        }
    }

    /// Text reading of the value; numbers are rendered without a trailing `.0`.
    #[must_use]
    pub fn as_text(&self) -> String {
        self.to_string()
    }

    /// `true` for empty text. Numbers are never blank.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        matches!(self, Self::Text(s) if s.is_empty())
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i64> for ParamValue {
    #[allow(clippy::cast_precision_loss)]
    fn from(value: i64) -> Self {
        Self::Number(value as f64)
    }
}

/// The flat request parameters a query is composed from.
///
/// Built once per request and never mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct ParamMap {
    values: BTreeMap<String, ParamValue>,
}

impl ParamMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a JSON object, rejecting every value that is not a string
    /// or a number.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::NotAnObject`] when the root is not an object and
    /// [`QueryError::UnsupportedParam`] for the first non-scalar value.
    pub fn from_json(value: &serde_json::Value) -> Result<Self, QueryError> {
        let object = value.as_object().ok_or(QueryError::NotAnObject)?;
        let mut values = BTreeMap::new();
        for (key, raw) in object {
            let param = match raw {
                serde_json::Value::String(s) => ParamValue::Text(s.clone()),
                serde_json::Value::Number(n) => match n.as_f64() {
                    Some(n) => ParamValue::Number(n),
                    None => return Err(QueryError::unsupported(key, "number")),
                },
                serde_json::Value::Bool(_) => return Err(QueryError::unsupported(key, "boolean")),
                serde_json::Value::Null => return Err(QueryError::unsupported(key, "null")),
                serde_json::Value::Array(_) => return Err(QueryError::unsupported(key, "array")),
                serde_json::Value::Object(_) => return Err(QueryError::unsupported(key, "object")),
            };
            values.insert(key.clone(), param);
        }
        Ok(Self { values })
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.values.get(key)
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Select the requested keys that are present, in the order they were
    /// requested. Values are returned unchanged; duplicates are dropped.
    #[must_use]
    pub fn pick<S: AsRef<str>>(&self, keys: &[S]) -> Vec<(String, ParamValue)> {
        let mut picked: Vec<(String, ParamValue)> = Vec::new();
        for key in keys {
            let key = key.as_ref();
            if picked.iter().any(|(k, _)| k == key) {
                continue;
            }
            if let Some(value) = self.values.get(key) {
                picked.push((key.to_string(), value.clone()));
            }
        }
        picked
    }
}

impl<K, V> FromIterator<(K, V)> for ParamMap
where
    K: Into<String>,
    V: Into<ParamValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl From<HashMap<String, String>> for ParamMap {
    fn from(query: HashMap<String, String>) -> Self {
        query.into_iter().collect()
    }
}

/// A typed leaf value inside a predicate.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ConditionValue {
    String(String),
    Number(f64),
    Date(DateTime<Utc>),
    Boolean(bool),
}

impl ConditionValue {
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }
}

impl From<ParamValue> for ConditionValue {
    fn from(value: ParamValue) -> Self {
        match value {
            ParamValue::Number(n) => Self::Number(n),
            ParamValue::Text(s) => Self::String(s),
        }
    }
}

impl From<&str> for ConditionValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for ConditionValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<f64> for ConditionValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i64> for ConditionValue {
    #[allow(clippy::cast_precision_loss)]
    fn from(value: i64) -> Self {
        Self::Number(value as f64)
    }
}

impl From<bool> for ConditionValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<DateTime<Utc>> for ConditionValue {
    fn from(value: DateTime<Utc>) -> Self {
        Self::Date(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_pick_returns_only_present_keys_in_requested_order() {
        let params: ParamMap = [("b", "2"), ("a", "1"), ("c", "3")].into_iter().collect();
        let picked = params.pick(&["c", "missing", "a"]);
        assert_eq!(
            picked,
            vec![
                ("c".to_string(), ParamValue::from("3")),
                ("a".to_string(), ParamValue::from("1")),
            ]
        );
    }

    #[test]
    fn test_pick_keeps_values_unchanged() {
        let params: ParamMap = [("limit", ParamValue::Number(5.0)), ("q", ParamValue::from(" x "))]
            .into_iter()
            .collect();
        let picked = params.pick(&["q", "limit"]);
        assert_eq!(picked[0].1, ParamValue::from(" x "));
        assert_eq!(picked[1].1, ParamValue::Number(5.0));
    }

    #[test]
    fn test_pick_ignores_duplicate_keys() {
        let params: ParamMap = [("a", "1")].into_iter().collect();
        assert_eq!(params.pick(&["a", "a"]).len(), 1);
    }

    #[test]
    fn test_as_number_reads_text_and_numbers() {
        assert_eq!(ParamValue::from("2").as_number(), Some(2.0));
        assert_eq!(ParamValue::from(" 7 ").as_number(), Some(7.0));
        assert_eq!(ParamValue::Number(3.5).as_number(), Some(3.5));
        assert_eq!(ParamValue::from("abc").as_number(), None);
        assert_eq!(ParamValue::from("").as_number(), None);
    }

    #[test]
    fn test_display_drops_trailing_zero() {
        assert_eq!(ParamValue::Number(10.0).to_string(), "10");
        assert_eq!(ParamValue::Number(2.5).to_string(), "2.5");
    }

    #[test]
    fn test_from_json_accepts_strings_and_numbers() {
        let params = ParamMap::from_json(&json!({"page": 2, "searchTerm": "ann"})).unwrap();
        assert_eq!(params.get("page"), Some(&ParamValue::Number(2.0)));
        assert_eq!(params.get("searchTerm"), Some(&ParamValue::from("ann")));
    }

    #[test]
    fn test_from_json_rejects_non_scalars() {
        let err = ParamMap::from_json(&json!({"ids": [1, 2]})).unwrap_err();
        assert_eq!(
            err,
            QueryError::UnsupportedParam {
                key: "ids".to_string(),
                kind: "array"
            }
        );
        assert_eq!(
            ParamMap::from_json(&json!({"flag": true})).unwrap_err(),
            QueryError::unsupported("flag", "boolean")
        );
        assert_eq!(ParamMap::from_json(&json!([1])).unwrap_err(), QueryError::NotAnObject);
    }

    #[test]
    fn test_deserialize_from_query_style_map() {
        let params: ParamMap = serde_json::from_value(json!({"page": "3", "limit": 20})).unwrap();
        assert_eq!(params.get("page"), Some(&ParamValue::from("3")));
        assert_eq!(params.get("limit"), Some(&ParamValue::Number(20.0)));
    }

    #[test]
    fn test_from_hashmap() {
        let mut query = HashMap::new();
        query.insert("sort".to_string(), "-name".to_string());
        let params = ParamMap::from(query);
        assert_eq!(params.len(), 1);
        assert!(params.contains_key("sort"));
    }

    #[test]
    fn test_condition_value_serializes_untagged() {
        let date = DateTime::parse_from_rfc3339("2024-01-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(serde_json::to_value(ConditionValue::from("x")).unwrap(), json!("x"));
        assert_eq!(serde_json::to_value(ConditionValue::from(3.0)).unwrap(), json!(3.0));
        assert_eq!(serde_json::to_value(ConditionValue::from(true)).unwrap(), json!(true));
        assert_eq!(
            serde_json::to_value(ConditionValue::from(date)).unwrap(),
            json!("2024-01-01T00:00:00Z")
        );
    }
}
