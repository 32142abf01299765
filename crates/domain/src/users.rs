use serde::{Deserialize, Serialize};

/// Mirror of an externally-owned user. `points` is the running total derived
/// from the activity ledger and is only ever mutated by atomic increments.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub user_id: String,
    pub name: String,
    pub points: i64,
}
