use std::collections::HashMap;

use crate::interactions::{Comment, Like};
use crate::items::ItemRef;
use crate::ports::BoxFuture;
use crate::DomainResult;

pub trait InteractionRepository: Send + Sync {
    /// Inserts under the (user, item) uniqueness constraint. Returns `false`
    /// when the like already exists; implementations may also surface the
    /// constraint as `DomainError::Conflict`, which callers treat as the
    /// same outcome.
    fn insert_like(&self, like: &Like) -> BoxFuture<'_, DomainResult<bool>>;

    /// Returns `false` when there was nothing to delete.
    fn delete_like(&self, user_id: &str, item: &ItemRef) -> BoxFuture<'_, DomainResult<bool>>;

    fn count_likes(&self, item: &ItemRef) -> BoxFuture<'_, DomainResult<u64>>;

    fn user_has_liked(&self, user_id: &str, item: &ItemRef) -> BoxFuture<'_, DomainResult<bool>>;

    fn insert_comment(&self, comment: &Comment) -> BoxFuture<'_, DomainResult<Comment>>;

    fn list_comments(
        &self,
        item: &ItemRef,
        offset: usize,
        limit: usize,
    ) -> BoxFuture<'_, DomainResult<Vec<Comment>>>;

    fn count_comments(&self, item: &ItemRef) -> BoxFuture<'_, DomainResult<u64>>;

    /// One grouped count per call; absent items simply have no entry.
    fn count_likes_for_items(
        &self,
        items: &[ItemRef],
    ) -> BoxFuture<'_, DomainResult<HashMap<ItemRef, u64>>>;

    fn count_comments_for_items(
        &self,
        items: &[ItemRef],
    ) -> BoxFuture<'_, DomainResult<HashMap<ItemRef, u64>>>;
}
