use lpg_common::Points;
use serde::{Deserialize, Serialize};

/// The accrual authority's view of a single order.
///
/// `status` is kept as the raw string the authority sent. The authority is free to introduce new intermediate
/// states, and interpreting them is the caller's job.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct AccrualOrder {
    pub order: String,
    pub status: String,
    /// Only present once the authority has finished calculating the reward.
    #[serde(default)]
    pub accrual: Option<Points>,
}
