// Query composition and execution

pub mod query_builder;
pub mod query_spec;
pub mod traits;

pub use query_builder::QueryBuilder;
pub use query_spec::QuerySpec;
pub use traits::DataSource;
