use async_trait::async_trait;

use super::QuerySpec;
use crate::filtering::FilterSpec;

/// The data-access capability a composed query runs against.
///
/// Only `find_many` and `count` are required, so any store can sit behind
/// it. Errors are returned to the caller exactly as the store produced them.
#[async_trait]
pub trait DataSource: Send + Sync {
    type Record: Send;
    type Error: std::error::Error + Send + Sync + 'static;

    /// Records matching the full specification
    async fn find_many(&self, query: &QuerySpec) -> Result<Vec<Self::Record>, Self::Error>;

    /// Number of records matching the `where` clause alone
    async fn count(&self, filter: &FilterSpec) -> Result<u64, Self::Error>;
}
