use crate::ports::BoxFuture;
use crate::users::UserRecord;
use crate::DomainResult;

pub trait UserRepository: Send + Sync {
    fn get(&self, user_id: &str) -> BoxFuture<'_, DomainResult<Option<UserRecord>>>;

    fn upsert(&self, user: &UserRecord) -> BoxFuture<'_, DomainResult<UserRecord>>;

    /// Atomic `points += delta` on the stored record. Returns `false` when no
    /// record exists for `user_id`; never read-modify-write.
    fn increment_points(&self, user_id: &str, delta: i64) -> BoxFuture<'_, DomainResult<bool>>;

    fn list_all(&self) -> BoxFuture<'_, DomainResult<Vec<UserRecord>>>;
}
