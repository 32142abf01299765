use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::achievements::{AchievementAward, AchievementDefinition};
use crate::activity::ActivityCategory;
use crate::error::DomainError;
use crate::ports::achievements::AchievementRepository;
use crate::ports::activity::ActivityRepository;
use crate::ports::users::UserRepository;
use crate::users::UserRecord;
use crate::util::format_ms_rfc3339;
use crate::DomainResult;

pub const TOP_MEDALS_PER_USER: usize = 3;

/// Chart colours for the per-category points breakdown.
const CATEGORY_COLORS: &[(ActivityCategory, &str)] = &[
    (ActivityCategory::Video, "#3b82f6"),
    (ActivityCategory::Incident, "#ef4444"),
    (ActivityCategory::Training, "#10b981"),
    (ActivityCategory::Medal, "#f59e0b"),
    (ActivityCategory::Interaction, "#8b5cf6"),
];

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RankingView {
    pub position: usize,
    pub total_users: usize,
    pub points: i64,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MedalSummary {
    pub medal_id: String,
    pub name: String,
    pub required_count: u64,
    pub date_earned: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardRow {
    pub user_id: String,
    pub name: String,
    pub points: i64,
    pub medal_count: usize,
    pub top_medals: Vec<MedalSummary>,
    pub rank: usize,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CategoryPoints {
    pub category: ActivityCategory,
    pub points: i64,
    pub color: String,
}

#[derive(Clone)]
pub struct RankingService {
    users: Arc<dyn UserRepository>,
    achievements: Arc<dyn AchievementRepository>,
    activities: Arc<dyn ActivityRepository>,
}

impl RankingService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        achievements: Arc<dyn AchievementRepository>,
        activities: Arc<dyn ActivityRepository>,
    ) -> Self {
        Self {
            users,
            achievements,
            activities,
        }
    }

    /// O(N) over all users; acceptable for the bounded populations this
    /// serves. Equal points tie-break on user id ascending so positions are
    /// stable across calls.
    pub async fn ranking(&self, user_id: &str) -> DomainResult<RankingView> {
        let mut users = self.users.list_all().await?;
        users.sort_by(ranking_order);
        let position = users
            .iter()
            .position(|user| user.user_id == user_id)
            .ok_or(DomainError::NotFound)?;
        Ok(RankingView {
            position: position + 1,
            total_users: users.len(),
            points: users[position].points,
        })
    }

    pub async fn leaderboard(&self) -> DomainResult<Vec<LeaderboardRow>> {
        let users = self.users.list_all().await?;
        let definitions: HashMap<String, AchievementDefinition> = self
            .achievements
            .list_definitions()
            .await?
            .into_iter()
            .map(|definition| (definition.medal_id.clone(), definition))
            .collect();

        let mut rows = Vec::with_capacity(users.len());
        for user in users {
            let awards = self.achievements.list_awards_for_user(&user.user_id).await?;
            let medal_count = awards.len();
            let top_medals = top_medals(&awards, &definitions);
            rows.push(LeaderboardRow {
                user_id: user.user_id,
                name: user.name,
                points: user.points,
                medal_count,
                top_medals,
                rank: 0,
            });
        }

        rows.sort_by(leaderboard_order);
        for (index, row) in rows.iter_mut().enumerate() {
            row.rank = index + 1;
        }
        Ok(rows)
    }

    pub async fn points_breakdown(&self, user_id: &str) -> DomainResult<Vec<CategoryPoints>> {
        let user_id = user_id.trim();
        if user_id.is_empty() {
            return Err(DomainError::Validation("user_id is required".into()));
        }
        let sums = self.activities.sum_points_by_category(user_id).await?;
        Ok(CATEGORY_COLORS
            .iter()
            .map(|(category, color)| CategoryPoints {
                category: *category,
                points: sums.get(category).copied().unwrap_or(0),
                color: (*color).to_string(),
            })
            .collect())
    }
}

fn ranking_order(left: &UserRecord, right: &UserRecord) -> Ordering {
    right
        .points
        .cmp(&left.points)
        .then_with(|| left.user_id.cmp(&right.user_id))
}

fn leaderboard_order(left: &LeaderboardRow, right: &LeaderboardRow) -> Ordering {
    right
        .points
        .cmp(&left.points)
        .then_with(|| right.medal_count.cmp(&left.medal_count))
        .then_with(|| left.name.cmp(&right.name))
}

/// Up to three medals per user: hardest achievement first (highest
/// `required_count` on the earned definition), most recently earned as the
/// tie-break. Awards whose definition has been retired are skipped.
fn top_medals(
    awards: &[AchievementAward],
    definitions: &HashMap<String, AchievementDefinition>,
) -> Vec<MedalSummary> {
    let mut earned: Vec<(&AchievementAward, &AchievementDefinition)> = awards
        .iter()
        .filter_map(|award| {
            definitions
                .get(&award.medal_id)
                .map(|definition| (award, definition))
        })
        .collect();
    earned.sort_by(|(award_a, def_a), (award_b, def_b)| {
        def_b
            .required_count
            .cmp(&def_a.required_count)
            .then_with(|| award_b.earned_at_ms.cmp(&award_a.earned_at_ms))
    });
    earned
        .into_iter()
        .take(TOP_MEDALS_PER_USER)
        .map(|(award, definition)| MedalSummary {
            medal_id: definition.medal_id.clone(),
            name: definition.name.clone(),
            required_count: definition.required_count,
            date_earned: format_ms_rfc3339(award.earned_at_ms),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::achievements::TriggerAction;

    fn user(id: &str, points: i64) -> UserRecord {
        UserRecord {
            user_id: id.to_string(),
            name: format!("{id}-name"),
            points,
        }
    }

    fn row(name: &str, points: i64, medal_count: usize) -> LeaderboardRow {
        LeaderboardRow {
            user_id: name.to_string(),
            name: name.to_string(),
            points,
            medal_count,
            top_medals: Vec::new(),
            rank: 0,
        }
    }

    fn definition(medal_id: &str, required_count: u64) -> AchievementDefinition {
        AchievementDefinition {
            medal_id: medal_id.to_string(),
            name: medal_id.to_string(),
            description: String::new(),
            trigger_action: TriggerAction::ItemReported,
            trigger_category: None,
            required_count,
        }
    }

    fn award(medal_id: &str, earned_at_ms: i64) -> AchievementAward {
        AchievementAward {
            user_id: "user-1".to_string(),
            medal_id: medal_id.to_string(),
            earned_at_ms,
        }
    }

    #[test]
    fn ranking_ties_break_on_user_id_ascending() {
        let mut users = vec![user("zulu", 50), user("alpha", 50), user("mike", 80)];
        users.sort_by(ranking_order);
        let ids: Vec<&str> = users.iter().map(|u| u.user_id.as_str()).collect();
        assert_eq!(ids, vec!["mike", "alpha", "zulu"]);
    }

    #[test]
    fn leaderboard_orders_by_points_then_medals_then_name() {
        let mut rows = vec![row("carol", 30, 0), row("bob", 50, 2), row("alice", 50, 1)];
        rows.sort_by(leaderboard_order);
        let names: Vec<&str> = rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["bob", "alice", "carol"]);
    }

    #[test]
    fn top_medals_prefer_highest_threshold_then_recency() {
        let definitions: HashMap<String, AchievementDefinition> =
            [("a", 1), ("b", 10), ("c", 5), ("d", 5)]
                .into_iter()
                .map(|(id, count)| (id.to_string(), definition(id, count)))
                .collect();
        let awards = vec![
            award("a", 400),
            award("b", 100),
            award("c", 200),
            award("d", 300),
        ];
        let top = top_medals(&awards, &definitions);
        let ids: Vec<&str> = top.iter().map(|m| m.medal_id.as_str()).collect();
        assert_eq!(ids, vec!["b", "d", "c"]);
    }

    #[test]
    fn top_medals_skip_retired_definitions() {
        let definitions: HashMap<String, AchievementDefinition> =
            [("known".to_string(), definition("known", 1))].into();
        let awards = vec![award("known", 100), award("retired", 200)];
        let top = top_medals(&awards, &definitions);
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].medal_id, "known");
    }
}
