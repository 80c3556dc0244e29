use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::BTreeMap;

use super::conditions::ConditionTree;

/// The accumulated `where` clause.
///
/// Top-level field predicates are last-write-wins. The `OR` list and the
/// `AND` groups only ever grow: nothing appended to them is discarded.
///
/// Each `AND` entry is one group of per-field conditions contributed by a
/// single nested filter, kept together rather than spread into the list.
/// Use [`FilterSpec::and_flattened`] to read the individual conditions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSpec {
    fields: BTreeMap<String, ConditionTree>,
    or: Vec<ConditionTree>,
    and: Vec<Vec<ConditionTree>>,
}

impl FilterSpec {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Shallow merge into the top-level fields; later keys overwrite earlier ones.
    /// `OR` and `AND` are combinator keys and are skipped as field names.
    pub fn merge_fields<I, K>(&mut self, fields: I)
    where
        I: IntoIterator<Item = (K, ConditionTree)>,
        K: Into<String>,
    {
        for (field, condition) in fields {
            let field = field.into();
            if matches!(field.as_str(), "OR" | "AND") {
                tracing::warn!(field, "Skipping field named like a combinator key");
                continue;
            }
            self.fields.insert(field, condition);
        }
    }

    /// Append to the `OR` list, keeping every prior entry.
    pub fn append_or<I>(&mut self, conditions: I)
    where
        I: IntoIterator<Item = ConditionTree>,
    {
        self.or.extend(conditions);
    }

    /// Append one condition to the `OR` list.
    pub fn apply_condition(&mut self, condition: ConditionTree) {
        self.or.push(condition);
    }

    /// Append a whole group as a single `AND` entry. Empty groups are ignored.
    pub fn append_and_group(&mut self, group: Vec<ConditionTree>) {
        if !group.is_empty() {
            self.and.push(group);
        }
    }

    #[must_use]
    pub fn field(&self, name: &str) -> Option<&ConditionTree> {
        self.fields.get(name)
    }

    #[must_use]
    pub fn fields(&self) -> &BTreeMap<String, ConditionTree> {
        &self.fields
    }

    #[must_use]
    pub fn or(&self) -> &[ConditionTree] {
        &self.or
    }

    #[must_use]
    pub fn and(&self) -> &[Vec<ConditionTree>] {
        &self.and
    }

    pub fn and_flattened(&self) -> impl Iterator<Item = &ConditionTree> {
        self.and.iter().flatten()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.or.is_empty() && self.and.is_empty()
    }
}

impl Serialize for FilterSpec {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len =
            self.fields.len() + usize::from(!self.or.is_empty()) + usize::from(!self.and.is_empty());
        let mut map = serializer.serialize_map(Some(len))?;
        for (field, condition) in &self.fields {
            map.serialize_entry(field, condition)?;
        }
        if !self.or.is_empty() {
            map.serialize_entry("OR", &self.or)?;
        }
        if !self.and.is_empty() {
            map.serialize_entry("AND", &self.and)?;
        }
        map.end()
    }
}
