use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::items::{ItemRef, ItemType};
use crate::ports::interactions::InteractionRepository;
use crate::ports::items::ItemSource;
use crate::util::format_ms_rfc3339;
use crate::DomainResult;

pub const DEFAULT_FEED_LIMIT: usize = 20;
pub const MAX_FEED_LIMIT: usize = 50;

/// Read-time projection over the content collections; never persisted.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FeedItem {
    pub id: String,
    #[serde(rename = "type")]
    pub item_type: ItemType,
    pub title: String,
    pub timestamp: String,
    pub like_count: u64,
    pub comment_count: u64,
}

#[derive(Clone)]
pub struct FeedService {
    sources: Vec<Arc<dyn ItemSource>>,
    interactions: Arc<dyn InteractionRepository>,
}

impl FeedService {
    pub fn new(
        sources: Vec<Arc<dyn ItemSource>>,
        interactions: Arc<dyn InteractionRepository>,
    ) -> Self {
        Self {
            sources,
            interactions,
        }
    }

    /// Merges the per-source recent lists, sorts by timestamp descending, and
    /// truncates to `limit` before any count lookup so cost is bounded by
    /// `limit` rather than the union size. Exactly one batched count call per
    /// interaction type. An unreachable source is skipped, not fatal.
    pub async fn build_feed(&self, limit: Option<usize>) -> DomainResult<Vec<FeedItem>> {
        let limit = limit.unwrap_or(DEFAULT_FEED_LIMIT);
        if limit == 0 {
            return Err(DomainError::Validation(
                "limit must be a positive integer".into(),
            ));
        }
        let limit = limit.min(MAX_FEED_LIMIT);

        let mut merged = Vec::new();
        for source in &self.sources {
            let item_type = source.item_type();
            match source.list_recent(limit).await {
                Ok(items) => merged.extend(items.into_iter().map(|item| (item_type, item))),
                Err(err) => {
                    tracing::warn!(
                        source = %item_type,
                        error = %err,
                        "feed source unavailable; excluding its items"
                    );
                }
            }
        }

        merged.sort_by(|(_, left), (_, right)| {
            right
                .created_at_ms
                .cmp(&left.created_at_ms)
                .then_with(|| right.item_id.cmp(&left.item_id))
        });
        merged.truncate(limit);

        let refs: Vec<ItemRef> = merged
            .iter()
            .map(|(item_type, item)| ItemRef::new(*item_type, item.item_id.clone()))
            .collect();
        let like_counts = self.interactions.count_likes_for_items(&refs).await?;
        let comment_counts = self.interactions.count_comments_for_items(&refs).await?;

        Ok(merged
            .into_iter()
            .zip(refs)
            .map(|((item_type, item), item_ref)| FeedItem {
                id: item.item_id,
                item_type,
                title: item.title,
                timestamp: format_ms_rfc3339(item.created_at_ms),
                like_count: like_counts.get(&item_ref).copied().unwrap_or(0),
                comment_count: comment_counts.get(&item_ref).copied().unwrap_or(0),
            })
            .collect())
    }
}
