use thiserror::Error;

use crate::query::QueryError;
use crate::region::InvalidRegionError;

/// Why an occlusion check could not reach a verdict
#[derive(Debug, Error)]
pub enum OcclusionError {
    #[error("compositor query failed: {0}")]
    Query(#[from] QueryError),

    #[error("invalid region: {0}")]
    InvalidRegion(#[from] InvalidRegionError),
}
