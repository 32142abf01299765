use std::collections::HashMap;

use crate::activity::{ActivityCategory, ActivityEntry};
use crate::ports::BoxFuture;
use crate::DomainResult;

pub trait ActivityRepository: Send + Sync {
    fn append(&self, entry: &ActivityEntry) -> BoxFuture<'_, DomainResult<ActivityEntry>>;

    fn list_for_user(
        &self,
        user_id: &str,
        limit: usize,
    ) -> BoxFuture<'_, DomainResult<Vec<ActivityEntry>>>;

    /// Counts a user's entries in `category`, optionally restricted to rows
    /// whose `details.category` equals `detail_category`. Feeds achievement
    /// thresholds; repeated identical activities all count.
    fn count_qualifying(
        &self,
        user_id: &str,
        category: ActivityCategory,
        detail_category: Option<&str>,
    ) -> BoxFuture<'_, DomainResult<u64>>;

    fn sum_points_by_category(
        &self,
        user_id: &str,
    ) -> BoxFuture<'_, DomainResult<HashMap<ActivityCategory, i64>>>;
}
