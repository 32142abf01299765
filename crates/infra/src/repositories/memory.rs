use std::collections::HashMap;
use std::sync::Arc;

use metrics::counter;
use serde_json::Value;
use tokio::sync::RwLock;
use vigia_domain::achievements::{AchievementAward, AchievementDefinition, TriggerAction};
use vigia_domain::activity::{ActivityCategory, ActivityEntry};
use vigia_domain::interactions::{Comment, Like};
use vigia_domain::items::{ContentItem, ItemRef, ItemType};
use vigia_domain::ports::achievements::AchievementRepository;
use vigia_domain::ports::activity::ActivityRepository;
use vigia_domain::ports::interactions::InteractionRepository;
use vigia_domain::ports::items::ItemSource;
use vigia_domain::ports::users::UserRepository;
use vigia_domain::ports::BoxFuture;
use vigia_domain::users::UserRecord;
use vigia_domain::DomainResult;

const DUPLICATE_LIKES_TOTAL: &str = "vigia_engine_duplicate_likes_total";
const AWARD_REPLAYS_TOTAL: &str = "vigia_engine_award_replays_total";

#[derive(Clone, Default)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<HashMap<String, UserRecord>>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl UserRepository for InMemoryUserRepository {
    fn get(&self, user_id: &str) -> BoxFuture<'_, DomainResult<Option<UserRecord>>> {
        let user_id = user_id.to_string();
        let users = self.users.clone();
        Box::pin(async move { Ok(users.read().await.get(&user_id).cloned()) })
    }

    fn upsert(&self, user: &UserRecord) -> BoxFuture<'_, DomainResult<UserRecord>> {
        let user = user.clone();
        let users = self.users.clone();
        Box::pin(async move {
            users.write().await.insert(user.user_id.clone(), user.clone());
            Ok(user)
        })
    }

    fn increment_points(&self, user_id: &str, delta: i64) -> BoxFuture<'_, DomainResult<bool>> {
        let user_id = user_id.to_string();
        let users = self.users.clone();
        Box::pin(async move {
            let mut users = users.write().await;
            match users.get_mut(&user_id) {
                Some(user) => {
                    user.points += delta;
                    Ok(true)
                }
                None => Ok(false),
            }
        })
    }

    fn list_all(&self) -> BoxFuture<'_, DomainResult<Vec<UserRecord>>> {
        let users = self.users.clone();
        Box::pin(async move { Ok(users.read().await.values().cloned().collect()) })
    }
}

#[derive(Clone, Default)]
pub struct InMemoryActivityRepository {
    entries: Arc<RwLock<Vec<ActivityEntry>>>,
}

impl InMemoryActivityRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn detail_category_matches(entry: &ActivityEntry, scope: &str) -> bool {
    entry
        .details
        .get("category")
        .and_then(Value::as_str)
        .map(|category| category == scope)
        .unwrap_or(false)
}

impl ActivityRepository for InMemoryActivityRepository {
    fn append(&self, entry: &ActivityEntry) -> BoxFuture<'_, DomainResult<ActivityEntry>> {
        let entry = entry.clone();
        let entries = self.entries.clone();
        Box::pin(async move {
            entries.write().await.push(entry.clone());
            Ok(entry)
        })
    }

    fn list_for_user(
        &self,
        user_id: &str,
        limit: usize,
    ) -> BoxFuture<'_, DomainResult<Vec<ActivityEntry>>> {
        let user_id = user_id.to_string();
        let entries = self.entries.clone();
        Box::pin(async move {
            let mut rows: Vec<ActivityEntry> = entries
                .read()
                .await
                .iter()
                .filter(|entry| entry.user_id == user_id)
                .cloned()
                .collect();
            rows.sort_by(|left, right| {
                right
                    .created_at_ms
                    .cmp(&left.created_at_ms)
                    .then_with(|| right.entry_id.cmp(&left.entry_id))
            });
            rows.truncate(limit);
            Ok(rows)
        })
    }

    fn count_qualifying(
        &self,
        user_id: &str,
        category: ActivityCategory,
        detail_category: Option<&str>,
    ) -> BoxFuture<'_, DomainResult<u64>> {
        let user_id = user_id.to_string();
        let detail_category = detail_category.map(str::to_string);
        let entries = self.entries.clone();
        Box::pin(async move {
            let count = entries
                .read()
                .await
                .iter()
                .filter(|entry| entry.user_id == user_id && entry.category == category)
                .filter(|entry| match detail_category.as_deref() {
                    Some(scope) => detail_category_matches(entry, scope),
                    None => true,
                })
                .count();
            Ok(count as u64)
        })
    }

    fn sum_points_by_category(
        &self,
        user_id: &str,
    ) -> BoxFuture<'_, DomainResult<HashMap<ActivityCategory, i64>>> {
        let user_id = user_id.to_string();
        let entries = self.entries.clone();
        Box::pin(async move {
            let mut sums: HashMap<ActivityCategory, i64> = HashMap::new();
            for entry in entries.read().await.iter() {
                if entry.user_id == user_id {
                    *sums.entry(entry.category).or_default() += entry.points;
                }
            }
            Ok(sums)
        })
    }
}

#[derive(Clone, Default)]
pub struct InMemoryInteractionRepository {
    likes: Arc<RwLock<HashMap<(String, ItemRef), Like>>>,
    comments: Arc<RwLock<Vec<Comment>>>,
}

impl InMemoryInteractionRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl InteractionRepository for InMemoryInteractionRepository {
    fn insert_like(&self, like: &Like) -> BoxFuture<'_, DomainResult<bool>> {
        let like = like.clone();
        let likes = self.likes.clone();
        Box::pin(async move {
            let key = (like.user_id.clone(), like.item.clone());
            let mut likes = likes.write().await;
            if likes.contains_key(&key) {
                counter!(DUPLICATE_LIKES_TOTAL).increment(1);
                return Ok(false);
            }
            likes.insert(key, like);
            Ok(true)
        })
    }

    fn delete_like(&self, user_id: &str, item: &ItemRef) -> BoxFuture<'_, DomainResult<bool>> {
        let key = (user_id.to_string(), item.clone());
        let likes = self.likes.clone();
        Box::pin(async move { Ok(likes.write().await.remove(&key).is_some()) })
    }

    fn count_likes(&self, item: &ItemRef) -> BoxFuture<'_, DomainResult<u64>> {
        let item = item.clone();
        let likes = self.likes.clone();
        Box::pin(async move {
            let count = likes
                .read()
                .await
                .keys()
                .filter(|(_, liked)| *liked == item)
                .count();
            Ok(count as u64)
        })
    }

    fn user_has_liked(&self, user_id: &str, item: &ItemRef) -> BoxFuture<'_, DomainResult<bool>> {
        let key = (user_id.to_string(), item.clone());
        let likes = self.likes.clone();
        Box::pin(async move { Ok(likes.read().await.contains_key(&key)) })
    }

    fn insert_comment(&self, comment: &Comment) -> BoxFuture<'_, DomainResult<Comment>> {
        let comment = comment.clone();
        let comments = self.comments.clone();
        Box::pin(async move {
            comments.write().await.push(comment.clone());
            Ok(comment)
        })
    }

    fn list_comments(
        &self,
        item: &ItemRef,
        offset: usize,
        limit: usize,
    ) -> BoxFuture<'_, DomainResult<Vec<Comment>>> {
        let item = item.clone();
        let comments = self.comments.clone();
        Box::pin(async move {
            let mut rows: Vec<Comment> = comments
                .read()
                .await
                .iter()
                .filter(|comment| comment.item == item)
                .cloned()
                .collect();
            rows.sort_by(|left, right| {
                right
                    .created_at_ms
                    .cmp(&left.created_at_ms)
                    .then_with(|| right.comment_id.cmp(&left.comment_id))
            });
            Ok(rows.into_iter().skip(offset).take(limit).collect())
        })
    }

    fn count_comments(&self, item: &ItemRef) -> BoxFuture<'_, DomainResult<u64>> {
        let item = item.clone();
        let comments = self.comments.clone();
        Box::pin(async move {
            let count = comments
                .read()
                .await
                .iter()
                .filter(|comment| comment.item == item)
                .count();
            Ok(count as u64)
        })
    }

    fn count_likes_for_items(
        &self,
        items: &[ItemRef],
    ) -> BoxFuture<'_, DomainResult<HashMap<ItemRef, u64>>> {
        let wanted: Vec<ItemRef> = items.to_vec();
        let likes = self.likes.clone();
        Box::pin(async move {
            let likes = likes.read().await;
            let mut counts = HashMap::new();
            for (_, item) in likes.keys() {
                if wanted.contains(item) {
                    *counts.entry(item.clone()).or_default() += 1;
                }
            }
            Ok(counts)
        })
    }

    fn count_comments_for_items(
        &self,
        items: &[ItemRef],
    ) -> BoxFuture<'_, DomainResult<HashMap<ItemRef, u64>>> {
        let wanted: Vec<ItemRef> = items.to_vec();
        let comments = self.comments.clone();
        Box::pin(async move {
            let comments = comments.read().await;
            let mut counts = HashMap::new();
            for comment in comments.iter() {
                if wanted.contains(&comment.item) {
                    *counts.entry(comment.item.clone()).or_default() += 1;
                }
            }
            Ok(counts)
        })
    }
}

#[derive(Clone, Default)]
pub struct InMemoryAchievementRepository {
    definitions: Arc<RwLock<HashMap<String, AchievementDefinition>>>,
    awards: Arc<RwLock<HashMap<(String, String), AchievementAward>>>,
}

impl InMemoryAchievementRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_definitions(catalog: Vec<AchievementDefinition>) -> Self {
        let definitions = catalog
            .into_iter()
            .map(|definition| (definition.medal_id.clone(), definition))
            .collect();
        Self {
            definitions: Arc::new(RwLock::new(definitions)),
            awards: Arc::default(),
        }
    }

    pub async fn put_definition(&self, definition: AchievementDefinition) {
        self.definitions
            .write()
            .await
            .insert(definition.medal_id.clone(), definition);
    }
}

impl AchievementRepository for InMemoryAchievementRepository {
    fn list_definitions(&self) -> BoxFuture<'_, DomainResult<Vec<AchievementDefinition>>> {
        let definitions = self.definitions.clone();
        Box::pin(async move { Ok(definitions.read().await.values().cloned().collect()) })
    }

    fn list_by_trigger(
        &self,
        action: TriggerAction,
    ) -> BoxFuture<'_, DomainResult<Vec<AchievementDefinition>>> {
        let definitions = self.definitions.clone();
        Box::pin(async move {
            Ok(definitions
                .read()
                .await
                .values()
                .filter(|definition| definition.trigger_action == action)
                .cloned()
                .collect())
        })
    }

    fn get_definition(
        &self,
        medal_id: &str,
    ) -> BoxFuture<'_, DomainResult<Option<AchievementDefinition>>> {
        let medal_id = medal_id.to_string();
        let definitions = self.definitions.clone();
        Box::pin(async move { Ok(definitions.read().await.get(&medal_id).cloned()) })
    }

    fn insert_award(&self, award: &AchievementAward) -> BoxFuture<'_, DomainResult<bool>> {
        let award = award.clone();
        let awards = self.awards.clone();
        Box::pin(async move {
            let key = (award.user_id.clone(), award.medal_id.clone());
            let mut awards = awards.write().await;
            if awards.contains_key(&key) {
                counter!(AWARD_REPLAYS_TOTAL).increment(1);
                return Ok(false);
            }
            awards.insert(key, award);
            Ok(true)
        })
    }

    fn list_awards_for_user(
        &self,
        user_id: &str,
    ) -> BoxFuture<'_, DomainResult<Vec<AchievementAward>>> {
        let user_id = user_id.to_string();
        let awards = self.awards.clone();
        Box::pin(async move {
            Ok(awards
                .read()
                .await
                .values()
                .filter(|award| award.user_id == user_id)
                .cloned()
                .collect())
        })
    }
}

/// Stand-in for an external content collection: pre-sorted, capped reads.
#[derive(Clone)]
pub struct InMemoryItemSource {
    item_type: ItemType,
    items: Arc<RwLock<Vec<ContentItem>>>,
}

impl InMemoryItemSource {
    pub fn new(item_type: ItemType) -> Self {
        Self {
            item_type,
            items: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub async fn push(&self, item: ContentItem) {
        self.items.write().await.push(item);
    }
}

impl ItemSource for InMemoryItemSource {
    fn item_type(&self) -> ItemType {
        self.item_type
    }

    fn list_recent(&self, limit: usize) -> BoxFuture<'_, DomainResult<Vec<ContentItem>>> {
        let items = self.items.clone();
        Box::pin(async move {
            let mut rows: Vec<ContentItem> = items.read().await.clone();
            rows.sort_by(|left, right| right.created_at_ms.cmp(&left.created_at_ms));
            rows.truncate(limit);
            Ok(rows)
        })
    }
}




#[cfg(test)]
mod item_source_tests {
    use super::*;

    #[tokio::test]
    async fn recent_items_are_sorted_and_capped() {
        let source = InMemoryItemSource::new(ItemType::Qa);
        for index in 0..5 {
            source
                .push(ContentItem {
                    item_id: format!("qa-{index}"),
                    title: format!("report {index}"),
                    created_at_ms: index,
                })
                .await;
        }
        let items = source.list_recent(3).await.unwrap();
        assert_eq!(items.len(), 3);
        assert_eq!(items[0].item_id, "qa-4");
        assert_eq!(items[2].item_id, "qa-2");
    }
}
