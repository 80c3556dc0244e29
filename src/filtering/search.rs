use serde::Deserialize;

use super::conditions::{ConditionTree, LeafPredicate, Operator};
use crate::models::ConditionValue;

/// How the fields of a [`NestedFilter`] are matched.
///
/// | mode       | operator   | case-insensitive | combined with |
/// |------------|------------|------------------|---------------|
/// | `exact`    | `equals`   | yes              | AND           |
/// | `enum`     | `equals`   | no               | AND           |
/// | `partial`  | `contains` | yes              | OR            |
/// | `search`   | `contains` | yes              | OR            |
/// | `contains` | `contains` | yes              | AND           |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    Exact,
    Partial,
    Enum,
    /// Ignore per-field values and match the shared search term instead
    Search,
    /// Used when no mode is given
    #[default]
    Contains,
}

impl SearchMode {
    /// `true` when the per-field predicates join the `OR` list instead of
    /// forming an `AND` group.
    #[must_use]
    pub fn combines_with_or(self) -> bool {
        matches!(self, Self::Search | Self::Partial)
    }
}

/// Leaf comparison for one value under the given mode.
#[must_use]
pub fn resolve_predicate(mode: SearchMode, value: impl Into<ConditionValue>) -> LeafPredicate {
    match mode {
        SearchMode::Exact => LeafPredicate::new().with(Operator::Equals, value).insensitive(),
        SearchMode::Enum => LeafPredicate::new().with(Operator::Equals, value),
        SearchMode::Partial | SearchMode::Search | SearchMode::Contains => {
            LeafPredicate::new().with(Operator::Contains, value).insensitive()
        }
    }
}

/// `{field: <resolved predicate>}`
#[must_use]
pub fn resolve_condition(
    mode: SearchMode,
    field: impl Into<String>,
    value: impl Into<ConditionValue>,
) -> ConditionTree {
    ConditionTree::field(field, resolve_predicate(mode, value))
}

/// Filter on fields of a related entity reached through a dotted path.
///
/// ```rust
/// use crudquery::{NestedFilter, SearchMode};
///
/// let filter = NestedFilter::new("author.profile", ["country", "city"]).mode(SearchMode::Exact);
/// assert_eq!(filter.path, "author.profile");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NestedFilter {
    /// Dotted relation path the predicates are wrapped in
    pub path: String,
    #[serde(default)]
    pub mode: SearchMode,
    /// Parameter names, each also used as the field name on the related entity
    pub fields: Vec<String>,
}

impl NestedFilter {
    pub fn new<I, S>(path: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            path: path.into(),
            mode: SearchMode::default(),
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    #[must_use]
    pub fn mode(mut self, mode: SearchMode) -> Self {
        self.mode = mode;
        self
    }
}
