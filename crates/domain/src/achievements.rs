use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::activity::{ActivityCategory, ActivityEntry};
use crate::error::DomainError;
use crate::ports::achievements::AchievementRepository;
use crate::ports::activity::ActivityRepository;
use crate::util::{now_ms, uuid_v7_without_dashes};
use crate::DomainResult;

/// Coarse action category an achievement listens for.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum TriggerAction {
    ItemReported,
    ItemWatched,
    TrainingCompleted,
}

impl TriggerAction {
    /// Ledger category whose entries count toward this trigger.
    pub fn ledger_category(&self) -> ActivityCategory {
        match self {
            TriggerAction::ItemReported => ActivityCategory::Incident,
            TriggerAction::ItemWatched => ActivityCategory::Video,
            TriggerAction::TrainingCompleted => ActivityCategory::Training,
        }
    }

    /// Whether definitions for this action may carry a `trigger_category`
    /// restricting which activities count.
    pub fn is_category_scoped(&self) -> bool {
        matches!(
            self,
            TriggerAction::ItemWatched | TriggerAction::TrainingCompleted
        )
    }
}

/// Reference data describing one medal. Read-mostly.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AchievementDefinition {
    pub medal_id: String,
    pub name: String,
    pub description: String,
    pub trigger_action: TriggerAction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger_category: Option<String>,
    pub required_count: u64,
}

impl AchievementDefinition {
    fn scope(&self) -> Option<&str> {
        self.trigger_category
            .as_deref()
            .filter(|scope| !scope.is_empty())
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AchievementAward {
    pub user_id: String,
    pub medal_id: String,
    pub earned_at_ms: i64,
}

#[derive(Clone, Debug)]
pub struct AssignOutcome {
    pub definition: AchievementDefinition,
    pub newly_awarded: bool,
}

#[derive(Clone)]
pub struct AchievementEngine {
    definitions: Arc<dyn AchievementRepository>,
    activities: Arc<dyn ActivityRepository>,
}

impl AchievementEngine {
    pub fn new(
        definitions: Arc<dyn AchievementRepository>,
        activities: Arc<dyn ActivityRepository>,
    ) -> Self {
        Self {
            definitions,
            activities,
        }
    }

    /// Runs after a trigger-mapped ledger append and returns the definitions
    /// newly awarded to `user_id`. Concurrent evaluations for the same user
    /// may both reach the insert; the (user, medal) uniqueness constraint is
    /// the correctness mechanism, and a constraint hit reads as "already
    /// awarded", not an error.
    pub async fn evaluate(
        &self,
        user_id: &str,
        action: TriggerAction,
        details: &Value,
    ) -> DomainResult<Vec<AchievementDefinition>> {
        let candidates = self.definitions.list_by_trigger(action).await?;
        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        let held: HashSet<String> = self
            .definitions
            .list_awards_for_user(user_id)
            .await?
            .into_iter()
            .map(|award| award.medal_id)
            .collect();
        let mut remaining: Vec<AchievementDefinition> = candidates
            .into_iter()
            .filter(|definition| !held.contains(&definition.medal_id))
            .collect();
        if remaining.is_empty() {
            return Ok(Vec::new());
        }

        let detail_category = details.get("category").and_then(Value::as_str);
        if action.is_category_scoped() {
            remaining.retain(|definition| match definition.scope() {
                Some(scope) => Some(scope) == detail_category,
                None => true,
            });
        }

        let category = action.ledger_category();
        let mut unscoped_count: Option<u64> = None;
        let mut newly_awarded = Vec::new();
        for definition in remaining {
            let count = match definition.scope().filter(|_| action.is_category_scoped()) {
                Some(scope) => {
                    self.activities
                        .count_qualifying(user_id, category, Some(scope))
                        .await?
                }
                None => match unscoped_count {
                    Some(count) => count,
                    None => {
                        let count = self
                            .activities
                            .count_qualifying(user_id, category, None)
                            .await?;
                        unscoped_count = Some(count);
                        count
                    }
                },
            };

            if count < definition.required_count {
                continue;
            }
            if self.try_award(user_id, &definition).await? {
                newly_awarded.push(definition);
            }
        }

        Ok(newly_awarded)
    }

    /// Manual award path. Skips the counting steps but keeps the uniqueness
    /// invariant and the ledger entry for the award.
    pub async fn assign_directly(
        &self,
        user_id: &str,
        medal_id: &str,
    ) -> DomainResult<AssignOutcome> {
        let user_id = user_id.trim();
        if user_id.is_empty() {
            return Err(DomainError::Validation("user_id is required".into()));
        }
        let definition = self
            .definitions
            .get_definition(medal_id)
            .await?
            .ok_or(DomainError::NotFound)?;
        let newly_awarded = self.try_award(user_id, &definition).await?;
        Ok(AssignOutcome {
            definition,
            newly_awarded,
        })
    }

    async fn try_award(
        &self,
        user_id: &str,
        definition: &AchievementDefinition,
    ) -> DomainResult<bool> {
        let award = AchievementAward {
            user_id: user_id.to_string(),
            medal_id: definition.medal_id.clone(),
            earned_at_ms: now_ms(),
        };
        let created = match self.definitions.insert_award(&award).await {
            Ok(created) => created,
            Err(DomainError::Conflict) => false,
            Err(err) => return Err(err),
        };
        if !created {
            return Ok(false);
        }

        // Written straight to the ledger repository: category `medal` never
        // triggers evaluation, so the award entry cannot recurse.
        let entry = ActivityEntry {
            entry_id: uuid_v7_without_dashes(),
            user_id: user_id.to_string(),
            category: ActivityCategory::Medal,
            activity_id: definition.medal_id.clone(),
            points: 0,
            details: json!({
                "name": definition.name,
                "description": definition.description,
            }),
            created_at_ms: now_ms(),
        };
        if let Err(err) = self.activities.append(&entry).await {
            tracing::error!(
                user_id = %user_id,
                medal_id = %definition.medal_id,
                error = %err,
                "failed to record ledger entry for awarded medal"
            );
        }
        tracing::info!(
            user_id = %user_id,
            medal_id = %definition.medal_id,
            "achievement awarded"
        );
        Ok(true)
    }
}

/// Seed catalog matching the medals the platform ships with. Replaceable at
/// repository construction time.
pub fn default_catalog() -> Vec<AchievementDefinition> {
    vec![
        AchievementDefinition {
            medal_id: "first-report".to_string(),
            name: "First Report".to_string(),
            description: "Reported your first near-miss".to_string(),
            trigger_action: TriggerAction::ItemReported,
            trigger_category: None,
            required_count: 1,
        },
        AchievementDefinition {
            medal_id: "vigilant-reporter".to_string(),
            name: "Vigilant Reporter".to_string(),
            description: "Reported five near-misses".to_string(),
            trigger_action: TriggerAction::ItemReported,
            trigger_category: None,
            required_count: 5,
        },
        AchievementDefinition {
            medal_id: "safety-student".to_string(),
            name: "Safety Student".to_string(),
            description: "Watched five safety videos".to_string(),
            trigger_action: TriggerAction::ItemWatched,
            trigger_category: None,
            required_count: 5,
        },
        AchievementDefinition {
            medal_id: "video-veteran".to_string(),
            name: "Video Veteran".to_string(),
            description: "Watched ten safety videos".to_string(),
            trigger_action: TriggerAction::ItemWatched,
            trigger_category: None,
            required_count: 10,
        },
        AchievementDefinition {
            medal_id: "first-training".to_string(),
            name: "First Training".to_string(),
            description: "Completed your first training module".to_string(),
            trigger_action: TriggerAction::TrainingCompleted,
            trigger_category: None,
            required_count: 1,
        },
    ]
}
