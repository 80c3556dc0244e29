use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::models::ConditionValue;

/// Comparison operators a leaf predicate can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Operator {
    Equals,
    Not,
    Contains,
    StartsWith,
    EndsWith,
    Lt,
    Lte,
    Gt,
    Gte,
}

impl Operator {
    /// Wire name of the operator (`equals`, `gte`, ...)
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Equals => "equals",
            Self::Not => "not",
            Self::Contains => "contains",
            Self::StartsWith => "startsWith",
            Self::EndsWith => "endsWith",
            Self::Lt => "lt",
            Self::Lte => "lte",
            Self::Gt => "gt",
            Self::Gte => "gte",
        }
    }

    /// Operators that match by substring rather than by value.
    #[must_use]
    pub fn is_pattern(&self) -> bool {
        matches!(self, Self::Contains | Self::StartsWith | Self::EndsWith)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown operator name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownOperator(pub String);

impl FromStr for Operator {
    type Err = UnknownOperator;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "equals" => Ok(Self::Equals),
            "not" => Ok(Self::Not),
            "contains" => Ok(Self::Contains),
            "startsWith" => Ok(Self::StartsWith),
            "endsWith" => Ok(Self::EndsWith),
            "lt" => Ok(Self::Lt),
            "lte" => Ok(Self::Lte),
            "gt" => Ok(Self::Gt),
            "gte" => Ok(Self::Gte),
            other => Err(UnknownOperator(other.to_string())),
        }
    }
}

/// One comparison against one field: an operator to value map plus an
/// optional case-insensitivity flag.
///
/// Serializes as `{"contains": "ann", "mode": "insensitive"}`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LeafPredicate {
    comparisons: BTreeMap<Operator, ConditionValue>,
    case_insensitive: bool,
}

impl LeafPredicate {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn equals(value: impl Into<ConditionValue>) -> Self {
        Self::new().with(Operator::Equals, value)
    }

    #[must_use]
    pub fn contains(value: impl Into<ConditionValue>) -> Self {
        Self::new().with(Operator::Contains, value)
    }

    /// Add (or replace) one comparison.
    #[must_use]
    pub fn with(mut self, operator: Operator, value: impl Into<ConditionValue>) -> Self {
        self.comparisons.insert(operator, value.into());
        self
    }

    #[must_use]
    pub fn insensitive(mut self) -> Self {
        self.case_insensitive = true;
        self
    }

    #[must_use]
    pub fn get(&self, operator: Operator) -> Option<&ConditionValue> {
        self.comparisons.get(&operator)
    }

    pub fn comparisons(&self) -> impl Iterator<Item = (Operator, &ConditionValue)> {
        self.comparisons.iter().map(|(op, value)| (*op, value))
    }

    #[must_use]
    pub fn is_case_insensitive(&self) -> bool {
        self.case_insensitive
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.comparisons.is_empty()
    }
}

impl Serialize for LeafPredicate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = self.comparisons.len() + usize::from(self.case_insensitive);
        let mut map = serializer.serialize_map(Some(len))?;
        for (operator, value) in &self.comparisons {
            map.serialize_entry(operator.as_str(), value)?;
        }
        if self.case_insensitive {
            map.serialize_entry("mode", "insensitive")?;
        }
        map.end()
    }
}

/// A leaf predicate, or a single field name wrapping another tree.
///
/// `{author: {profile: {name: {contains: "x"}}}}` is three `Field` levels
/// around one `Leaf`.
#[derive(Debug, Clone, PartialEq)]
pub enum ConditionTree {
    Leaf(LeafPredicate),
    Field {
        name: String,
        child: Box<ConditionTree>,
    },
}

impl ConditionTree {
    /// `{name: child}`
    #[must_use]
    pub fn field(name: impl Into<String>, child: impl Into<ConditionTree>) -> Self {
        Self::Field {
            name: name.into(),
            child: Box::new(child.into()),
        }
    }

    /// Field names from the root down to the leaf, and the leaf itself.
    #[must_use]
    pub fn path(&self) -> (Vec<&str>, &LeafPredicate) {
        let mut segments = Vec::new();
        let mut node = self;
        loop {
            match node {
                Self::Leaf(leaf) => return (segments, leaf),
                Self::Field { name, child } => {
                    segments.push(name.as_str());
                    node = child.as_ref();
                }
            }
        }
    }

    /// Depth of the field path; a bare leaf has depth 0.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.path().0.len()
    }

    #[must_use]
    pub fn as_leaf(&self) -> Option<&LeafPredicate> {
        match self {
            Self::Leaf(leaf) => Some(leaf),
            Self::Field { .. } => None,
        }
    }
}

impl From<LeafPredicate> for ConditionTree {
    fn from(leaf: LeafPredicate) -> Self {
        Self::Leaf(leaf)
    }
}

impl Serialize for ConditionTree {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Leaf(leaf) => leaf.serialize(serializer),
            Self::Field { name, child } => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry(name, child)?;
                map.end()
            }
        }
    }
}

/// Wrap `condition` in one field level per path segment, outermost first.
///
/// `["a", "b", "c"]` around `L` yields `{a: {b: {c: L}}}`; `["a"]` yields
/// `{a: L}`. An empty path returns `condition` unchanged.
#[must_use]
pub fn build_nested_condition<S: AsRef<str>>(
    path: &[S],
    condition: impl Into<ConditionTree>,
) -> ConditionTree {
    path.iter()
        .rev()
        .fold(condition.into(), |child, segment| {
            ConditionTree::field(segment.as_ref(), child)
        })
}

/// Split a dotted relation path (`author.profile`) into its segments.
/// Blank segments are dropped.
#[must_use]
pub fn split_path(path: &str) -> Vec<&str> {
    path.split('.')
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .collect()
}

/// A filter key carrying an explicit comparison, e.g. `price[gte]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldFilter {
    pub field: String,
    pub operator: Operator,
}

/// Classification of a filter parameter name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterKey {
    /// No operator suffix; the value is used for equality
    Plain(String),
    /// `field[op]` with a known operator
    Compare(FieldFilter),
    /// `field[op]` with an operator name that is not supported
    Unsupported { field: String, operator: String },
}

impl FilterKey {
    /// Parse a parameter name. Only a well-formed `field[op]` (non-empty field,
    /// closing bracket at the end) is treated as an operator key; anything
    /// else, including `field[op` without the closing bracket, is plain.
    #[must_use]
    pub fn parse(key: &str) -> Self {
        if let Some(inner) = key.strip_suffix(']')
            && let Some((field, operator)) = inner.split_once('[')
            && !field.is_empty()
        {
            return match operator.parse::<Operator>() {
                Ok(operator) => Self::Compare(FieldFilter {
                    field: field.to_string(),
                    operator,
                }),
                Err(UnknownOperator(operator)) => Self::Unsupported {
                    field: field.to_string(),
                    operator,
                },
            };
        }
        Self::Plain(key.to_string())
    }
}
