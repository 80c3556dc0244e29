use serde::ser::{Serialize, SerializeMap, Serializer};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

/// One `{field: direction}` entry of `orderBy`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub field: String,
    pub direction: SortDirection,
}

impl OrderBy {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Desc,
        }
    }
}

impl Serialize for OrderBy {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.field, self.direction.as_str())?;
        map.end()
    }
}

/// Parse a comma-separated sort list where a leading `-` means descending.
/// Blank entries are skipped.
fn parse_sort_list(sort: &str) -> Vec<OrderBy> {
    sort.split(',')
        .map(str::trim)
        .filter_map(|entry| match entry.strip_prefix('-') {
            Some(field) if !field.is_empty() => Some(OrderBy::desc(field)),
            Some(_) => None,
            None if entry.is_empty() => None,
            None => Some(OrderBy::asc(entry)),
        })
        .collect()
}

/// Ordering for the given `sort` parameter, falling back to `default_sort`
/// when the parameter is absent or has no usable entries. Entry order is
/// preserved; later entries break ties of earlier ones.
#[must_use]
pub fn parse_sorting(sort: Option<&str>, default_sort: &str) -> Vec<OrderBy> {
    let order_by = sort.map(parse_sort_list).unwrap_or_default();
    if order_by.is_empty() {
        parse_sort_list(default_sort)
    } else {
        order_by
    }
}
