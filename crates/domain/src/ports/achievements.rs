use crate::achievements::{AchievementAward, AchievementDefinition, TriggerAction};
use crate::ports::BoxFuture;
use crate::DomainResult;

pub trait AchievementRepository: Send + Sync {
    fn list_definitions(&self) -> BoxFuture<'_, DomainResult<Vec<AchievementDefinition>>>;

    fn list_by_trigger(
        &self,
        action: TriggerAction,
    ) -> BoxFuture<'_, DomainResult<Vec<AchievementDefinition>>>;

    fn get_definition(
        &self,
        medal_id: &str,
    ) -> BoxFuture<'_, DomainResult<Option<AchievementDefinition>>>;

    /// Inserts under the (user, medal) uniqueness constraint. Returns `false`
    /// when the award already exists; implementations may also surface the
    /// constraint as `DomainError::Conflict`. Either way the caller reports
    /// "already awarded", never an error.
    fn insert_award(&self, award: &AchievementAward) -> BoxFuture<'_, DomainResult<bool>>;

    fn list_awards_for_user(
        &self,
        user_id: &str,
    ) -> BoxFuture<'_, DomainResult<Vec<AchievementAward>>>;
}
