//! Compose database-agnostic `findMany` query specifications from request
//! parameters, and run them against any [`DataSource`].
//!
//! ```rust
//! use crudquery::{ParamMap, QueryBuilder};
//!
//! let params: ParamMap = [("searchTerm", "lamp"), ("sort", "price"), ("limit", "20")]
//!     .into_iter()
//!     .collect();
//!
//! let query = QueryBuilder::new(params)
//!     .search(&["name", "category"])
//!     .sort()
//!     .paginate()
//!     .into_spec();
//!
//! assert_eq!(query.take, Some(20));
//! ```

pub mod config;
pub mod core;
pub mod database;
pub mod errors;
pub mod filtering;
pub mod models;

pub use config::QueryConfig;
pub use crate::core::{DataSource, QueryBuilder, QuerySpec};
pub use database::EntitySource;
pub use errors::QueryError;
pub use filtering::{
    ComparisonFilter, ConditionTree, DataType, FilterSpec, IncludeMap, Inclusion, LeafPredicate,
    NestedFilter, Operator, OrderBy, PageInfo, Pagination, RangeFilter, SearchMode, Selection,
    SortDirection, build_nested_condition,
};
pub use models::{ConditionValue, ParamMap, ParamValue};
