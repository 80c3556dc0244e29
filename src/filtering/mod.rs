//! # Filtering, Sorting & Pagination
//!
//! Building blocks that turn request parameters into the pieces of a query
//! specification. The [`QueryBuilder`](crate::QueryBuilder) chains them; each
//! is usable on its own.
//!
//! ## Query Parameter Examples
//!
//! ```rust,ignore
//! // Free-text search over the configured fields (OR)
//! GET /users?searchTerm=ann
//!
//! // Equality and bracket comparisons on top-level fields
//! GET /products?status=ACTIVE&price[gte]=100
//!
//! // Range on a nested relation field
//! GET /orders?minAmount=10&maxAmount=50
//!
//! // Sorting (comma-separated, `-` for descending)
//! GET /users?sort=-createdAt,name
//!
//! // Pagination and projection
//! GET /users?page=2&limit=5&fields=id,name
//! ```
//!
//! ## Main Components
//!
//! - [`build_nested_condition`]: wrap a predicate in a dotted relation path
//! - [`resolve_predicate`]: pick the comparison for a [`SearchMode`]
//! - [`FilterSpec`]: the accumulated `where` clause and its merge rules
//! - [`RangeFilter`] / [`ComparisonFilter`]: typed bounds from parameters
//! - [`parse_sorting`], [`Pagination`], [`parse_fields`]: straight-line transforms

pub mod conditions;
pub mod pagination;
pub mod projection;
pub mod range;
pub mod search;
pub mod sort;
pub mod where_clause;

pub use conditions::{
    ConditionTree, FieldFilter, FilterKey, LeafPredicate, Operator, UnknownOperator,
    build_nested_condition, split_path,
};
pub use pagination::{PageInfo, Pagination};
pub use projection::{IncludeMap, Inclusion, Selection, parse_fields};
pub use range::{ComparisonFilter, DataType, RangeFilter, cast_value};
pub use search::{NestedFilter, SearchMode, resolve_condition, resolve_predicate};
pub use sort::{OrderBy, SortDirection, parse_sorting};
pub use where_clause::FilterSpec;
