use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::achievements::{AchievementDefinition, AchievementEngine, TriggerAction};
use crate::error::DomainError;
use crate::ports::activity::ActivityRepository;
use crate::ports::users::UserRepository;
use crate::util::{format_ms_rfc3339, now_ms, uuid_v7_without_dashes};
use crate::DomainResult;

pub const DEFAULT_LIST_LIMIT: usize = 20;
pub const MAX_LIST_LIMIT: usize = 100;
const MAX_ID_LENGTH: usize = 128;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ActivityCategory {
    Video,
    Incident,
    Training,
    Medal,
    Interaction,
}

impl ActivityCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityCategory::Video => "video",
            ActivityCategory::Incident => "incident",
            ActivityCategory::Training => "training",
            ActivityCategory::Medal => "medal",
            ActivityCategory::Interaction => "interaction",
        }
    }

    /// Achievement trigger this category feeds. `medal` and `interaction`
    /// never trigger evaluation, which is what keeps award-entry writes from
    /// recursing back into the rule engine.
    pub fn trigger_action(&self) -> Option<TriggerAction> {
        match self {
            ActivityCategory::Incident => Some(TriggerAction::ItemReported),
            ActivityCategory::Video => Some(TriggerAction::ItemWatched),
            ActivityCategory::Training => Some(TriggerAction::TrainingCompleted),
            ActivityCategory::Medal | ActivityCategory::Interaction => None,
        }
    }
}

impl fmt::Display for ActivityCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActivityCategory {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "video" => Ok(ActivityCategory::Video),
            "incident" => Ok(ActivityCategory::Incident),
            "training" => Ok(ActivityCategory::Training),
            "medal" => Ok(ActivityCategory::Medal),
            "interaction" => Ok(ActivityCategory::Interaction),
            other => Err(DomainError::Validation(format!(
                "unknown activity category '{other}'"
            ))),
        }
    }
}

/// One row of the append-only point ledger. Immutable once written; the sole
/// source of truth for point totals and achievement counts.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ActivityEntry {
    pub entry_id: String,
    pub user_id: String,
    pub category: ActivityCategory,
    pub activity_id: String,
    pub points: i64,
    pub details: Value,
    pub created_at_ms: i64,
}

#[derive(Clone, Debug)]
pub struct ActivityAppend {
    pub user_id: String,
    pub category: ActivityCategory,
    pub activity_id: String,
    pub points: i64,
    pub details: Value,
}

#[derive(Clone, Debug)]
pub struct AppendOutcome {
    pub entry: ActivityEntry,
    pub new_medals: Vec<AchievementDefinition>,
}

/// Ledger row enriched for display.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ActivityView {
    pub id: String,
    pub user_id: String,
    pub category: ActivityCategory,
    pub activity_id: String,
    pub points: i64,
    pub details: Value,
    pub timestamp: String,
    pub description: String,
}

impl ActivityView {
    pub fn from_entry(entry: ActivityEntry) -> Self {
        let description = describe(entry.category, &entry.details);
        Self {
            id: entry.entry_id,
            user_id: entry.user_id,
            category: entry.category,
            activity_id: entry.activity_id,
            points: entry.points,
            details: entry.details,
            timestamp: format_ms_rfc3339(entry.created_at_ms),
            description,
        }
    }
}

/// Typed view over the open `details` bag, decoded per category. Non-object
/// payloads (including null when the field was omitted) decode as an empty
/// bag, so the category-specific fallback still applies.
#[derive(Clone, Debug, PartialEq)]
pub enum ActivityDetails {
    Video {
        title: Option<String>,
        category: Option<String>,
    },
    Incident {
        title: Option<String>,
    },
    Training {
        title: Option<String>,
        is_full_course: bool,
    },
    Medal {
        name: Option<String>,
        description: Option<String>,
    },
    Interaction {
        action: Option<String>,
        comment_text: Option<String>,
    },
}

impl ActivityDetails {
    pub fn from_value(category: ActivityCategory, value: &Value) -> Self {
        let empty = serde_json::Map::new();
        let map = value.as_object().unwrap_or(&empty);
        let text = |key: &str| map.get(key).and_then(Value::as_str).map(str::to_string);
        match category {
            ActivityCategory::Video => ActivityDetails::Video {
                title: text("title"),
                category: text("category"),
            },
            ActivityCategory::Incident => ActivityDetails::Incident {
                title: text("title"),
            },
            ActivityCategory::Training => ActivityDetails::Training {
                title: text("title"),
                is_full_course: map
                    .get("isFullCourse")
                    .and_then(Value::as_bool)
                    .unwrap_or(false),
            },
            ActivityCategory::Medal => ActivityDetails::Medal {
                name: text("name"),
                description: text("description"),
            },
            ActivityCategory::Interaction => ActivityDetails::Interaction {
                action: text("action"),
                comment_text: text("commentText"),
            },
        }
    }
}

/// Deterministic display description. Pure function over category + details;
/// preferred detail first, generic fallback otherwise.
pub fn describe(category: ActivityCategory, details: &Value) -> String {
    match ActivityDetails::from_value(category, details) {
        ActivityDetails::Video { title: Some(t), .. } => format!("Watched safety video \"{t}\""),
        ActivityDetails::Video { .. } => "Watched a safety video".to_string(),
        ActivityDetails::Incident { title: Some(t) } => format!("Reported \"{t}\""),
        ActivityDetails::Incident { .. } => "Reported a near-miss".to_string(),
        ActivityDetails::Training { title: Some(t), .. } => format!("Completed training \"{t}\""),
        ActivityDetails::Training {
            is_full_course: true,
            ..
        } => "Completed a full training course".to_string(),
        ActivityDetails::Training { .. } => "Completed a training module".to_string(),
        ActivityDetails::Medal { name: Some(n), .. } => format!("Unlocked achievement \"{n}\""),
        ActivityDetails::Medal { .. } => "Unlocked an achievement".to_string(),
        ActivityDetails::Interaction {
            action: Some(action),
            ..
        } => match action.as_str() {
            "like" => "Liked an item".to_string(),
            "comment" => "Commented on an item".to_string(),
            _ => "Engaged with an item".to_string(),
        },
        ActivityDetails::Interaction { .. } => "Engaged with an item".to_string(),
    }
}

#[derive(Clone)]
pub struct ActivityService {
    activities: Arc<dyn ActivityRepository>,
    users: Arc<dyn UserRepository>,
    engine: AchievementEngine,
}

impl ActivityService {
    pub fn new(
        activities: Arc<dyn ActivityRepository>,
        users: Arc<dyn UserRepository>,
        engine: AchievementEngine,
    ) -> Self {
        Self {
            activities,
            users,
            engine,
        }
    }

    /// Records the entry, credits points atomically, and runs achievement
    /// evaluation for trigger-mapped categories. The append is durable once
    /// the repository write returns; evaluation failures are logged and
    /// swallowed so the user-facing action still succeeds.
    pub async fn append(&self, input: ActivityAppend) -> DomainResult<AppendOutcome> {
        let input = validate_append(&input)?;
        let entry = ActivityEntry {
            entry_id: uuid_v7_without_dashes(),
            user_id: input.user_id,
            category: input.category,
            activity_id: input.activity_id,
            points: input.points,
            details: input.details,
            created_at_ms: now_ms(),
        };
        let entry = self.activities.append(&entry).await?;

        let credited = self
            .users
            .increment_points(&entry.user_id, entry.points)
            .await?;
        if !credited {
            tracing::warn!(
                user_id = %entry.user_id,
                points = entry.points,
                "points increment skipped; no user record for ledger entry"
            );
        }

        let new_medals = match entry.category.trigger_action() {
            Some(action) => match self
                .engine
                .evaluate(&entry.user_id, action, &entry.details)
                .await
            {
                Ok(definitions) => definitions,
                Err(err) => {
                    tracing::error!(
                        user_id = %entry.user_id,
                        error = %err,
                        "achievement evaluation failed; activity entry kept"
                    );
                    Vec::new()
                }
            },
            None => Vec::new(),
        };

        Ok(AppendOutcome { entry, new_medals })
    }

    pub async fn list_for_user(
        &self,
        user_id: &str,
        limit: Option<usize>,
    ) -> DomainResult<Vec<ActivityView>> {
        let user_id = user_id.trim();
        if user_id.is_empty() {
            return Err(DomainError::Validation("user_id is required".into()));
        }
        let limit = limit.unwrap_or(DEFAULT_LIST_LIMIT).min(MAX_LIST_LIMIT);
        let entries = self.activities.list_for_user(user_id, limit).await?;
        Ok(entries.into_iter().map(ActivityView::from_entry).collect())
    }
}

fn validate_append(input: &ActivityAppend) -> Result<ActivityAppend, DomainError> {
    let user_id = input.user_id.trim();
    if user_id.is_empty() {
        return Err(DomainError::Validation("user_id is required".into()));
    }
    if user_id.chars().count() > MAX_ID_LENGTH {
        return Err(DomainError::Validation(format!(
            "user_id exceeds max length of {MAX_ID_LENGTH}"
        )));
    }
    let activity_id = input.activity_id.trim();
    if activity_id.is_empty() {
        return Err(DomainError::Validation("activity_id is required".into()));
    }
    if activity_id.chars().count() > MAX_ID_LENGTH {
        return Err(DomainError::Validation(format!(
            "activity_id exceeds max length of {MAX_ID_LENGTH}"
        )));
    }
    if input.points < 0 {
        return Err(DomainError::Validation(
            "points must be a non-negative integer".into(),
        ));
    }
    Ok(ActivityAppend {
        user_id: user_id.to_string(),
        category: input.category,
        activity_id: activity_id.to_string(),
        points: input.points,
        details: input.details.clone(),
    })
}
