//! # Query Builder
//!
//! One [`QueryBuilder`] is created per request from its [`ParamMap`], chained
//! through the filter, sort, pagination and projection steps it needs, then
//! handed a [`DataSource`] to run against.
//!
//! ```rust
//! use crudquery::{DataType, ParamMap, QueryBuilder, RangeFilter};
//! use serde_json::json;
//!
//! let params: ParamMap = [
//!     ("searchTerm", "ann"),
//!     ("status", "ACTIVE"),
//!     ("minAge", "18"),
//!     ("sort", "-createdAt,name"),
//!     ("page", "2"),
//!     ("limit", "5"),
//! ]
//! .into_iter()
//! .collect();
//!
//! let query = QueryBuilder::new(params)
//!     .search(&["name", "email"])
//!     .filter(&["status"])
//!     .filter_by_range(&[RangeFilter::new("age", "minAge", "maxAge", DataType::Number)])
//!     .sort()
//!     .paginate()
//!     .into_spec();
//!
//! assert_eq!(query.skip, Some(5));
//! assert_eq!(query.where_clause.or().len(), 3);
//! assert_eq!(
//!     serde_json::to_value(&query.order_by).unwrap(),
//!     json!([{"createdAt": "desc"}, {"name": "asc"}])
//! );
//! ```
//!
//! Each step consumes and returns the builder, so the composed query has a
//! single owner for its whole life. The builder is not meant to be shared
//! between requests.

use super::{DataSource, QuerySpec};
use crate::config::QueryConfig;
use crate::filtering::{
    ComparisonFilter, ConditionTree, FieldFilter, FilterKey, IncludeMap, Inclusion,
    LeafPredicate, NestedFilter, PageInfo, Pagination, RangeFilter, SearchMode,
    build_nested_condition, parse_fields, parse_sorting, resolve_condition, split_path,
};
use crate::models::{ParamMap, ParamValue};

#[derive(Debug, Clone)]
pub struct QueryBuilder {
    params: ParamMap,
    config: QueryConfig,
    query: QuerySpec,
}

impl QueryBuilder {
    #[must_use]
    pub fn new(params: ParamMap) -> Self {
        Self::with_config(params, QueryConfig::default())
    }

    #[must_use]
    pub fn with_config(params: ParamMap, config: QueryConfig) -> Self {
        Self {
            params,
            config,
            query: QuerySpec::default(),
        }
    }

    #[must_use]
    pub fn params(&self) -> &ParamMap {
        &self.params
    }

    #[must_use]
    pub fn config(&self) -> &QueryConfig {
        &self.config
    }

    /// Shared search term; blank text counts as absent.
    fn search_term(&self) -> Option<String> {
        self.params
            .get(&self.config.search_term_key)
            .filter(|term| !term.is_blank())
            .map(ParamValue::as_text)
    }

    /// Case-insensitive `contains` on every listed field with the shared
    /// search term, appended to `OR`. No-op without a search term.
    #[must_use]
    pub fn search<S: AsRef<str>>(mut self, searchable_fields: &[S]) -> Self {
        let Some(term) = self.search_term() else {
            return self;
        };
        let conditions: Vec<ConditionTree> = searchable_fields
            .iter()
            .map(|field| resolve_condition(SearchMode::Search, field.as_ref(), term.as_str()))
            .collect();
        tracing::debug!(fields = conditions.len(), "Appending search conditions");
        self.query.where_clause.append_or(conditions);
        self
    }

    /// Top-level field filters for the listed parameters.
    ///
    /// `field[op]` parameters become `{field: {op: <number>}}`; text that is
    /// not numeric becomes NaN. Other parameters become equality on their
    /// value as supplied. Later keys overwrite earlier ones.
    #[must_use]
    pub fn filter<S: AsRef<str>>(mut self, include_fields: &[S]) -> Self {
        let picked = self.params.pick(include_fields);
        if picked.is_empty() {
            return self;
        }

        let mut formatted: Vec<(String, ConditionTree)> = Vec::with_capacity(picked.len());
        for (key, value) in picked {
            match FilterKey::parse(&key) {
                FilterKey::Plain(field) => {
                    formatted.push((field, LeafPredicate::equals(value).into()));
                }
                FilterKey::Compare(FieldFilter { field, operator }) => {
                    let number = value.as_number().unwrap_or(f64::NAN);
                    if number.is_nan() {
                        tracing::warn!(key = %key, value = %value, "Non-numeric comparison value");
                    }
                    formatted.push((field, LeafPredicate::new().with(operator, number).into()));
                }
                FilterKey::Unsupported { field, operator } => {
                    tracing::warn!(field = %field, operator = %operator, "Skipping filter with unsupported operator");
                }
            }
        }

        tracing::debug!(fields = formatted.len(), "Merging field filters");
        self.query.where_clause.merge_fields(formatted);
        self
    }

    /// Filters on related-entity fields.
    ///
    /// A descriptor only applies when at least one of its fields is present
    /// in the parameters. `search` and `partial` append each field's
    /// condition to `OR`; every other mode appends all of the descriptor's
    /// conditions together as one `AND` group.
    #[must_use]
    pub fn nested_filter(mut self, nested_filters: &[NestedFilter]) -> Self {
        for nested in nested_filters {
            let path = split_path(&nested.path);
            let picked = self.params.pick(&nested.fields);
            if picked.is_empty() {
                continue;
            }

            match nested.mode {
                SearchMode::Search => {
                    let Some(term) = self.search_term() else {
                        continue;
                    };
                    let conditions: Vec<ConditionTree> = nested
                        .fields
                        .iter()
                        .map(|field| {
                            build_nested_condition(
                                &path,
                                resolve_condition(SearchMode::Search, field, term.as_str()),
                            )
                        })
                        .collect();
                    tracing::debug!(path = %nested.path, fields = conditions.len(), "Appending nested search conditions");
                    self.query.where_clause.append_or(conditions);
                }
                mode => {
                    let conditions: Vec<ConditionTree> = picked
                        .into_iter()
                        .map(|(field, value)| {
                            build_nested_condition(&path, resolve_condition(mode, field, value))
                        })
                        .collect();
                    tracing::debug!(path = %nested.path, ?mode, fields = conditions.len(), "Appending nested filter conditions");
                    if mode.combines_with_or() {
                        self.query.where_clause.append_or(conditions);
                    } else {
                        self.query.where_clause.append_and_group(conditions);
                    }
                }
            }
        }
        self
    }

    /// Merge caller-built conditions into the top-level fields as given.
    #[must_use]
    pub fn raw_filter<I, K>(mut self, filters: I) -> Self
    where
        I: IntoIterator<Item = (K, ConditionTree)>,
        K: Into<String>,
    {
        self.query.where_clause.merge_fields(filters);
        tracing::debug!(where_clause = ?self.query.where_clause, "Merged raw filter");
        self
    }

    /// Bounded `gte`/`lte` conditions, each appended to `OR`.
    #[must_use]
    pub fn filter_by_range(mut self, range_filters: &[RangeFilter]) -> Self {
        for range in range_filters {
            if let Some(condition) = range.build_condition(&self.params) {
                tracing::debug!(field = %range.field, "Appending range condition");
                self.query.where_clause.apply_condition(condition);
            }
        }
        self
    }

    /// Single-bound comparisons, each appended to `OR`.
    #[must_use]
    pub fn filter_by_comparison(mut self, comparisons: &[ComparisonFilter]) -> Self {
        for comparison in comparisons {
            if let Some(condition) = comparison.build_condition(&self.params) {
                tracing::debug!(field = %comparison.field, operator = %comparison.operator, "Appending comparison condition");
                self.query.where_clause.apply_condition(condition);
            }
        }
        self
    }

    #[must_use]
    pub fn sort(mut self) -> Self {
        let sort = self.params.get(&self.config.sort_key).map(ParamValue::as_text);
        self.query.order_by = Some(parse_sorting(sort.as_deref(), &self.config.default_sort));
        self
    }

    #[must_use]
    pub fn paginate(mut self) -> Self {
        let pagination = self.pagination();
        self.query.skip = Some(pagination.skip());
        self.query.take = Some(pagination.take());
        self
    }

    /// Projection from the `fields` parameter; an absent or empty parameter
    /// leaves any previous projection in place.
    #[must_use]
    pub fn fields(mut self) -> Self {
        if let Some(selection) = parse_fields(self.params.get(&self.config.fields_key)) {
            self.query.select = Some(selection);
        }
        self
    }

    /// Shallow merge into the related-entity inclusion map.
    #[must_use]
    pub fn include<I, K>(mut self, includable: I) -> Self
    where
        I: IntoIterator<Item = (K, Inclusion)>,
        K: Into<String>,
    {
        self.query
            .include
            .get_or_insert_with(IncludeMap::new)
            .extend(includable.into_iter().map(|(k, v)| (k.into(), v)));
        self
    }

    /// Page and limit as read from the parameters, with defaults applied.
    #[must_use]
    pub fn pagination(&self) -> Pagination {
        Pagination::from_params(&self.params, &self.config)
    }

    /// The composed query, for inspection.
    #[must_use]
    pub fn get_all_queries(&self) -> &QuerySpec {
        &self.query
    }

    #[must_use]
    pub fn into_spec(self) -> QuerySpec {
        self.query
    }

    /// Run the composed query.
    ///
    /// # Errors
    ///
    /// Whatever the data source returns, unchanged.
    pub async fn execute<S: DataSource>(&self, source: &S) -> Result<Vec<S::Record>, S::Error> {
        tracing::trace!(query = ?self.query, "Executing query");
        source.find_many(&self.query).await
    }

    /// Count the records matching the `where` clause and derive page metadata.
    ///
    /// # Errors
    ///
    /// Whatever the data source returns, unchanged.
    pub async fn count_total<S: DataSource>(&self, source: &S) -> Result<PageInfo, S::Error> {
        let total = source.count(&self.query.where_clause).await?;
        let info = PageInfo::new(self.pagination(), total);
        tracing::trace!(total, total_page = info.total_page, "Counted matching records");
        Ok(info)
    }
}
