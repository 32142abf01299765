use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::activity::{ActivityAppend, ActivityCategory, ActivityService};
use crate::error::DomainError;
use crate::identity::ActorIdentity;
use crate::items::ItemRef;
use crate::ports::interactions::InteractionRepository;
use crate::util::{now_ms, uuid_v7_without_dashes};
use crate::DomainResult;

pub const MAX_COMMENT_LENGTH: usize = 500;
pub const INTERACTION_POINTS: i64 = 1;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Like {
    pub user_id: String,
    #[serde(flatten)]
    pub item: ItemRef,
    pub created_at_ms: i64,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub comment_id: String,
    pub user_id: String,
    pub user_name: String,
    #[serde(flatten)]
    pub item: ItemRef,
    pub text: String,
    pub created_at_ms: i64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LikeOutcome {
    Created,
    AlreadyLiked,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LikeInfo {
    pub like_count: u64,
    pub user_has_liked: bool,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CommentPage {
    pub comments: Vec<Comment>,
    pub current_page: usize,
    pub total_pages: usize,
    pub total_comments: u64,
}

#[derive(Clone)]
pub struct InteractionService {
    repository: Arc<dyn InteractionRepository>,
    activity: ActivityService,
}

impl InteractionService {
    pub fn new(repository: Arc<dyn InteractionRepository>, activity: ActivityService) -> Self {
        Self {
            repository,
            activity,
        }
    }

    /// Idempotent: a repeat (or racing) like of the same item reads as
    /// `AlreadyLiked`, never as an error. Only the first creation earns the
    /// interaction point.
    pub async fn add_like(&self, actor: &ActorIdentity, item: ItemRef) -> DomainResult<LikeOutcome> {
        validate_item(&item)?;
        let like = Like {
            user_id: actor.user_id.clone(),
            item: item.clone(),
            created_at_ms: now_ms(),
        };
        let created = match self.repository.insert_like(&like).await {
            Ok(created) => created,
            Err(DomainError::Conflict) => false,
            Err(err) => return Err(err),
        };
        if !created {
            return Ok(LikeOutcome::AlreadyLiked);
        }

        self.record_interaction(
            actor,
            &item,
            json!({
                "action": "like",
                "itemType": item.item_type.as_str(),
            }),
        )
        .await;
        Ok(LikeOutcome::Created)
    }

    /// Removing a like never reverses points or awards; they are sticky.
    pub async fn remove_like(&self, actor: &ActorIdentity, item: ItemRef) -> DomainResult<()> {
        validate_item(&item)?;
        let removed = self.repository.delete_like(&actor.user_id, &item).await?;
        if removed {
            Ok(())
        } else {
            Err(DomainError::NotFound)
        }
    }

    pub async fn like_info(
        &self,
        item: ItemRef,
        caller: Option<&ActorIdentity>,
    ) -> DomainResult<LikeInfo> {
        validate_item(&item)?;
        let like_count = self.repository.count_likes(&item).await?;
        let user_has_liked = match caller {
            Some(actor) => self.repository.user_has_liked(&actor.user_id, &item).await?,
            None => false,
        };
        Ok(LikeInfo {
            like_count,
            user_has_liked,
        })
    }

    pub async fn add_comment(
        &self,
        actor: &ActorIdentity,
        item: ItemRef,
        text: &str,
    ) -> DomainResult<Comment> {
        validate_item(&item)?;
        let text = validate_comment_text(text)?;
        let comment = Comment {
            comment_id: uuid_v7_without_dashes(),
            user_id: actor.user_id.clone(),
            user_name: actor.username.clone(),
            item: item.clone(),
            text: text.clone(),
            created_at_ms: now_ms(),
        };
        let comment = self.repository.insert_comment(&comment).await?;

        self.record_interaction(
            actor,
            &item,
            json!({
                "action": "comment",
                "itemType": item.item_type.as_str(),
                "commentText": text,
            }),
        )
        .await;
        Ok(comment)
    }

    pub async fn list_comments(
        &self,
        item: ItemRef,
        page: usize,
        page_size: usize,
    ) -> DomainResult<CommentPage> {
        validate_item(&item)?;
        if page == 0 || page_size == 0 {
            return Err(DomainError::Validation(
                "page and limit must be positive integers".into(),
            ));
        }
        let total_comments = self.repository.count_comments(&item).await?;
        let total_pages = (total_comments as usize).div_ceil(page_size);
        // An offset past what usize can address is just a page past the end.
        let comments = match page_offset(page, page_size) {
            Some(offset) => self.repository.list_comments(&item, offset, page_size).await?,
            None => Vec::new(),
        };
        Ok(CommentPage {
            comments,
            current_page: page,
            total_pages,
            total_comments,
        })
    }

    /// Ledger write for an interaction. The like/comment row is already
    /// durable at this point; a ledger failure here is logged and tolerated
    /// rather than unwinding the user action (documented inconsistency, no
    /// two-phase commit).
    async fn record_interaction(
        &self,
        actor: &ActorIdentity,
        item: &ItemRef,
        details: serde_json::Value,
    ) {
        let append = ActivityAppend {
            user_id: actor.user_id.clone(),
            category: ActivityCategory::Interaction,
            activity_id: item.item_id.clone(),
            points: INTERACTION_POINTS,
            details,
        };
        if let Err(err) = self.activity.append(append).await {
            tracing::error!(
                user_id = %actor.user_id,
                item_id = %item.item_id,
                error = %err,
                "failed to record interaction ledger entry"
            );
        }
    }
}

fn page_offset(page: usize, page_size: usize) -> Option<usize> {
    page.checked_sub(1)?.checked_mul(page_size)
}

fn validate_item(item: &ItemRef) -> Result<(), DomainError> {
    if item.item_id.trim().is_empty() {
        return Err(DomainError::Validation("item_id is required".into()));
    }
    Ok(())
}

fn validate_comment_text(text: &str) -> Result<String, DomainError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(DomainError::Validation("comment text is required".into()));
    }
    if trimmed.chars().count() > MAX_COMMENT_LENGTH {
        return Err(DomainError::Validation(format!(
            "comment text exceeds max length of {MAX_COMMENT_LENGTH}"
        )));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::items::ItemType;

    #[test]
    fn page_offsets_are_zero_based_and_checked() {
        assert_eq!(page_offset(1, 10), Some(0));
        assert_eq!(page_offset(3, 10), Some(20));
        assert_eq!(page_offset(usize::MAX, 10), None);
        assert_eq!(page_offset(usize::MAX, usize::MAX), None);
    }

    #[test]
    fn comment_text_is_trimmed() {
        assert_eq!(
            validate_comment_text("  hello there  ").unwrap(),
            "hello there"
        );
    }

    #[test]
    fn comment_text_at_the_limit_is_accepted() {
        let text = "a".repeat(MAX_COMMENT_LENGTH);
        assert_eq!(validate_comment_text(&text).unwrap(), text);
    }

    #[test]
    fn comment_text_over_the_limit_is_rejected() {
        let text = "a".repeat(MAX_COMMENT_LENGTH + 1);
        assert!(validate_comment_text(&text).is_err());
    }

    #[test]
    fn whitespace_only_comment_is_rejected() {
        assert!(validate_comment_text("   \n ").is_err());
    }

    #[test]
    fn blank_item_id_is_rejected() {
        let item = ItemRef::new(ItemType::Qa, "  ");
        assert!(validate_item(&item).is_err());
    }
}
