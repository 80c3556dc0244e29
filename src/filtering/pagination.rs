use serde::Serialize;

use crate::config::QueryConfig;
use crate::models::{ParamMap, ParamValue};

/// Page number and page size read from the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
}

/// Integer reading of a parameter. Absent, non-numeric and zero values fall
/// back to `default`; fractions are truncated. Negative values are kept.
#[allow(clippy::cast_possible_truncation)]
fn coerce(value: Option<&ParamValue>, default: i64) -> i64 {
    match value.and_then(ParamValue::as_number) {
        Some(n) if n.is_finite() && n.trunc() != 0.0 => n.trunc() as i64,
        _ => default,
    }
}

impl Pagination {
    #[must_use]
    pub fn from_params(params: &ParamMap, config: &QueryConfig) -> Self {
        Self {
            page: coerce(params.get(&config.page_key), config.default_page),
            limit: coerce(params.get(&config.limit_key), config.default_limit),
        }
    }

    /// `(page - 1) * limit`. Not clamped: a negative page gives a negative skip.
    #[must_use]
    pub fn skip(&self) -> i64 {
        self.page.saturating_sub(1).saturating_mul(self.limit)
    }

    #[must_use]
    pub fn take(&self) -> i64 {
        self.limit
    }
}

/// Pagination metadata returned alongside a page of records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub page: i64,
    pub limit: i64,
    pub total: u64,
    pub total_page: i64,
}

impl PageInfo {
    /// `total_page = ceil(total / limit)`
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    pub fn new(pagination: Pagination, total: u64) -> Self {
        let total_page = (total as f64 / pagination.limit as f64).ceil() as i64;
        Self {
            page: pagination.page,
            limit: pagination.limit,
            total,
            total_page,
        }
    }
}
