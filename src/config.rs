use serde::Deserialize;

const DEFAULT_SEARCH_TERM_KEY: &str = "searchTerm";
const DEFAULT_SORT_KEY: &str = "sort";
const DEFAULT_PAGE_KEY: &str = "page";
const DEFAULT_LIMIT_KEY: &str = "limit";
const DEFAULT_FIELDS_KEY: &str = "fields";
const DEFAULT_SORT: &str = "-createdAt";
const DEFAULT_PAGE: i64 = 1;
const DEFAULT_LIMIT: i64 = 10;

/// Parameter names and fallbacks used while composing a query.
///
/// Every field is optional when deserializing, so a partial configuration
/// (for example only `default_limit`) keeps the remaining defaults.
///
/// ```rust
/// use crudquery::QueryConfig;
///
/// let config: QueryConfig = serde_json::from_str(r#"{"default_limit": 25}"#).unwrap();
/// assert_eq!(config.default_limit, 25);
/// assert_eq!(config.page_key, "page");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    /// Parameter holding the shared free-text search term
    pub search_term_key: String,
    /// Parameter holding the comma-separated sort list
    pub sort_key: String,
    /// Parameter holding the 1-based page number
    pub page_key: String,
    /// Parameter holding the page size
    pub limit_key: String,
    /// Parameter holding the comma-separated projection list
    pub fields_key: String,
    /// Sort list applied when the sort parameter is absent
    pub default_sort: String,
    pub default_page: i64,
    pub default_limit: i64,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            search_term_key: DEFAULT_SEARCH_TERM_KEY.to_string(),
            sort_key: DEFAULT_SORT_KEY.to_string(),
            page_key: DEFAULT_PAGE_KEY.to_string(),
            limit_key: DEFAULT_LIMIT_KEY.to_string(),
            fields_key: DEFAULT_FIELDS_KEY.to_string(),
            default_sort: DEFAULT_SORT.to_string(),
            default_page: DEFAULT_PAGE,
            default_limit: DEFAULT_LIMIT,
        }
    }
}
