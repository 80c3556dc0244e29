use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::BTreeMap;

use crate::models::ParamValue;

/// `field -> true` projection map.
pub type Selection = BTreeMap<String, bool>;

/// Related entities to load alongside each record.
pub type IncludeMap = BTreeMap<String, Inclusion>;

/// Either a plain on/off switch for a relation, or the relations to load
/// beneath it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inclusion {
    Enabled(bool),
    Nested(IncludeMap),
}

impl Inclusion {
    pub fn nested<I, K>(relations: I) -> Self
    where
        I: IntoIterator<Item = (K, Inclusion)>,
        K: Into<String>,
    {
        Self::Nested(relations.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

impl From<bool> for Inclusion {
    fn from(enabled: bool) -> Self {
        Self::Enabled(enabled)
    }
}

impl Serialize for Inclusion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Enabled(enabled) => serializer.serialize_bool(*enabled),
            Self::Nested(relations) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("include", relations)?;
                map.end()
            }
        }
    }
}

/// Projection for a comma-separated `fields` parameter. `None` when the
/// parameter is absent or lists no field.
#[must_use]
pub fn parse_fields(fields: Option<&ParamValue>) -> Option<Selection> {
    let text = fields?.as_text();
    let selection: Selection = text
        .split(',')
        .map(str::trim)
        .filter(|field| !field.is_empty())
        .map(|field| (field.to_string(), true))
        .collect();
    if selection.is_empty() {
        None
    } else {
        Some(selection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_fields() {
        let selection = parse_fields(Some(&ParamValue::from("id, name,email"))).unwrap();
        assert_eq!(
            serde_json::to_value(&selection).unwrap(),
            json!({"id": true, "name": true, "email": true})
        );
    }

    #[test]
    fn test_absent_or_empty_fields() {
        assert_eq!(parse_fields(None), None);
        assert_eq!(parse_fields(Some(&ParamValue::from(""))), None);
        assert_eq!(parse_fields(Some(&ParamValue::from(" , "))), None);
    }

    #[test]
    fn test_inclusion_shapes() {
        let include: IncludeMap = [
            ("author".to_string(), Inclusion::from(true)),
            (
                "comments".to_string(),
                Inclusion::nested([("user", Inclusion::from(true))]),
            ),
        ]
        .into_iter()
        .collect();
        assert_eq!(
            serde_json::to_value(&include).unwrap(),
            json!({"author": true, "comments": {"include": {"user": true}}})
        );
    }
}
