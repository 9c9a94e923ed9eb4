//! Shared query parameter types for API handlers.

use serde::Deserialize;

/// Gallery page selection (`?page=`). Missing means page 1; out-of-range
/// values are clamped by the paginator.
#[derive(Debug, Deserialize)]
pub struct PageParams {
    pub page: Option<i64>,
}
