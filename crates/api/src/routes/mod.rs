use axum::extract::{Extension, Path, Query, State};
use axum::{
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::Validate;

use vigia_domain::achievements::{AchievementAward, AchievementDefinition};
use vigia_domain::activity::{ActivityAppend, ActivityCategory, ActivityView};
use vigia_domain::feed::FeedItem;
use vigia_domain::identity::ActorIdentity;
use vigia_domain::interactions::{Comment, CommentPage, LikeInfo, LikeOutcome};
use vigia_domain::items::{ItemRef, ItemType};
use vigia_domain::ports::db::DbAdapter;
use vigia_domain::ranking::{CategoryPoints, LeaderboardRow, RankingView};
use vigia_domain::util::format_ms_rfc3339;

use crate::error::{map_domain_error, ApiError};
use crate::middleware::AuthContext;
use crate::{middleware as app_middleware, observability, state::AppState, validation};

pub fn router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/activities", post(append_activity))
        .route("/interactions/like", post(add_like))
        .route("/interactions/like", delete(remove_like))
        .route("/interactions/comment", post(add_comment))
        .route("/achievements/:medal_id/assign", post(assign_achievement))
        .route_layer(middleware::from_fn(app_middleware::require_auth_middleware));

    let mut app = Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .route("/activities/user/:user_id", get(list_user_activities))
        .route("/activities/feed", get(activity_feed))
        .route("/interactions/like/:item_type/:item_id", get(like_info))
        .route(
            "/interactions/comment/:item_type/:item_id",
            get(list_comments),
        )
        .route(
            "/stats/user/:user_id/points-breakdown",
            get(points_breakdown),
        )
        .route("/stats/user/:user_id/ranking", get(user_ranking))
        .route("/stats/leaderboard", get(leaderboard))
        .route("/achievements", get(list_achievements))
        .route("/achievements/user/:user_id", get(list_user_achievements))
        .merge(protected)
        .layer(middleware::from_fn(app_middleware::metrics_layer))
        .layer(app_middleware::timeout_layer())
        .layer(app_middleware::trace_layer())
        .layer(app_middleware::set_request_id_layer())
        .layer(app_middleware::propagate_request_id_layer())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            app_middleware::auth_middleware,
        ))
        .layer(middleware::from_fn(
            app_middleware::correlation_id_middleware,
        ));

    if !state.config.app_env.eq_ignore_ascii_case("test") {
        app = app.layer(app_middleware::rate_limit_layer());
    }

    app.with_state(state)
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    environment: String,
    backend: &'static str,
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let backend = match &state.db {
        Some(adapter) => match adapter.health_check().await {
            Ok(()) => "ok",
            Err(err) => {
                tracing::warn!(backend = adapter.name(), error = %err, "backend health check failed");
                "unreachable"
            }
        },
        None => "memory",
    };
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        environment: state.config.app_env.clone(),
        backend,
    })
}

async fn metrics() -> Response {
    match observability::render_metrics() {
        Some(body) => body.into_response(),
        None => (StatusCode::SERVICE_UNAVAILABLE, "recorder not installed").into_response(),
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
struct AppendActivityRequest {
    #[validate(length(min = 1, max = 128))]
    user_id: String,
    category: String,
    #[validate(length(min = 1, max = 128))]
    activity_id: String,
    points: i64,
    #[serde(default)]
    details: Value,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AppendActivityResponse {
    id: String,
    activity_id: String,
    points: i64,
    new_medals: Vec<AchievementDefinition>,
}

async fn append_activity(
    State(state): State<AppState>,
    Json(payload): Json<AppendActivityRequest>,
) -> Result<Response, ApiError> {
    validation::validate(&payload)?;
    let category: ActivityCategory = payload
        .category
        .parse()
        .map_err(map_domain_error)?;

    let outcome = state
        .activity_service()
        .append(ActivityAppend {
            user_id: payload.user_id,
            category,
            activity_id: payload.activity_id,
            points: payload.points,
            details: payload.details,
        })
        .await
        .map_err(map_domain_error)?;

    for medal in &outcome.new_medals {
        observability::register_medal_awarded(&medal.medal_id, "evaluate");
    }

    let body = AppendActivityResponse {
        id: outcome.entry.entry_id,
        activity_id: outcome.entry.activity_id,
        points: outcome.entry.points,
        new_medals: outcome.new_medals,
    };
    Ok((StatusCode::CREATED, Json(body)).into_response())
}

#[derive(Debug, Deserialize)]
struct ListLimitQuery {
    limit: Option<usize>,
}

async fn list_user_activities(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(query): Query<ListLimitQuery>,
) -> Result<Json<Vec<ActivityView>>, ApiError> {
    let views = state
        .activity_service()
        .list_for_user(&user_id, query.limit)
        .await
        .map_err(map_domain_error)?;
    Ok(Json(views))
}

async fn activity_feed(
    State(state): State<AppState>,
    Query(query): Query<ListLimitQuery>,
) -> Result<Json<Vec<FeedItem>>, ApiError> {
    let feed = state
        .feed_service()
        .build_feed(query.limit)
        .await
        .map_err(map_domain_error)?;
    Ok(Json(feed))
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
struct LikeRequest {
    item_type: String,
    #[validate(length(min = 1, max = 128))]
    item_id: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LikeResponse {
    already_liked: bool,
}

async fn add_like(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(payload): Json<LikeRequest>,
) -> Result<Response, ApiError> {
    validation::validate(&payload)?;
    let actor = actor_identity(&auth)?;
    let item = parse_item(&payload.item_type, payload.item_id)?;

    let outcome = state
        .interaction_service()
        .add_like(&actor, item)
        .await
        .map_err(map_domain_error)?;

    let (status, already_liked) = match outcome {
        LikeOutcome::Created => (StatusCode::CREATED, false),
        LikeOutcome::AlreadyLiked => (StatusCode::OK, true),
    };
    Ok((status, Json(LikeResponse { already_liked })).into_response())
}

async fn remove_like(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(payload): Json<LikeRequest>,
) -> Result<Json<LikeResponse>, ApiError> {
    validation::validate(&payload)?;
    let actor = actor_identity(&auth)?;
    let item = parse_item(&payload.item_type, payload.item_id)?;

    state
        .interaction_service()
        .remove_like(&actor, item)
        .await
        .map_err(map_domain_error)?;
    Ok(Json(LikeResponse {
        already_liked: false,
    }))
}

async fn like_info(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path((item_type, item_id)): Path<(String, String)>,
) -> Result<Json<LikeInfo>, ApiError> {
    let item = parse_item(&item_type, item_id)?;
    let caller = actor_identity(&auth).ok();
    let info = state
        .interaction_service()
        .like_info(item, caller.as_ref())
        .await
        .map_err(map_domain_error)?;
    Ok(Json(info))
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
struct CommentRequest {
    item_type: String,
    #[validate(length(min = 1, max = 128))]
    item_id: String,
    text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CommentResponse {
    id: String,
    user: String,
    text: String,
    created_at: String,
}

impl From<Comment> for CommentResponse {
    fn from(comment: Comment) -> Self {
        Self {
            id: comment.comment_id,
            user: comment.user_name,
            text: comment.text,
            created_at: format_ms_rfc3339(comment.created_at_ms),
        }
    }
}

async fn add_comment(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(payload): Json<CommentRequest>,
) -> Result<Response, ApiError> {
    validation::validate(&payload)?;
    let actor = actor_identity(&auth)?;
    let item = parse_item(&payload.item_type, payload.item_id)?;

    let comment = state
        .interaction_service()
        .add_comment(&actor, item, &payload.text)
        .await
        .map_err(map_domain_error)?;
    Ok((StatusCode::CREATED, Json(CommentResponse::from(comment))).into_response())
}

#[derive(Debug, Deserialize)]
struct CommentsQuery {
    page: Option<usize>,
    limit: Option<usize>,
}

const DEFAULT_COMMENT_PAGE_SIZE: usize = 10;

async fn list_comments(
    State(state): State<AppState>,
    Path((item_type, item_id)): Path<(String, String)>,
    Query(query): Query<CommentsQuery>,
) -> Result<Json<CommentPage>, ApiError> {
    let item = parse_item(&item_type, item_id)?;
    let page = query.page.unwrap_or(1);
    let page_size = query.limit.unwrap_or(DEFAULT_COMMENT_PAGE_SIZE);
    let comments = state
        .interaction_service()
        .list_comments(item, page, page_size)
        .await
        .map_err(map_domain_error)?;
    Ok(Json(comments))
}

async fn points_breakdown(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<CategoryPoints>>, ApiError> {
    let breakdown = state
        .ranking_service()
        .points_breakdown(&user_id)
        .await
        .map_err(map_domain_error)?;
    Ok(Json(breakdown))
}

async fn user_ranking(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<RankingView>, ApiError> {
    let ranking = state
        .ranking_service()
        .ranking(&user_id)
        .await
        .map_err(map_domain_error)?;
    Ok(Json(ranking))
}

async fn leaderboard(
    State(state): State<AppState>,
) -> Result<Json<Vec<LeaderboardRow>>, ApiError> {
    let rows = state
        .ranking_service()
        .leaderboard()
        .await
        .map_err(map_domain_error)?;
    Ok(Json(rows))
}

async fn list_achievements(
    State(state): State<AppState>,
) -> Result<Json<Vec<AchievementDefinition>>, ApiError> {
    let definitions = state
        .achievements
        .list_definitions()
        .await
        .map_err(map_domain_error)?;
    Ok(Json(definitions))
}

async fn list_user_achievements(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<AchievementAward>>, ApiError> {
    let awards = state
        .achievements
        .list_awards_for_user(&user_id)
        .await
        .map_err(map_domain_error)?;
    Ok(Json(awards))
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
struct AssignAchievementRequest {
    #[validate(length(min = 1, max = 128))]
    user_id: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AssignAchievementResponse {
    medal_id: String,
    name: String,
    already_earned: bool,
}

async fn assign_achievement(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(medal_id): Path<String>,
    Json(payload): Json<AssignAchievementRequest>,
) -> Result<Json<AssignAchievementResponse>, ApiError> {
    validation::validate(&payload)?;
    if !auth.role.is_admin() {
        return Err(ApiError::Forbidden);
    }

    let outcome = state
        .achievement_engine()
        .assign_directly(&payload.user_id, &medal_id)
        .await
        .map_err(map_domain_error)?;

    if outcome.newly_awarded {
        observability::register_medal_awarded(&outcome.definition.medal_id, "assign");
    }

    Ok(Json(AssignAchievementResponse {
        medal_id: outcome.definition.medal_id,
        name: outcome.definition.name,
        already_earned: !outcome.newly_awarded,
    }))
}

fn parse_item(item_type: &str, item_id: String) -> Result<ItemRef, ApiError> {
    let item_type: ItemType = item_type.parse().map_err(map_domain_error)?;
    Ok(ItemRef {
        item_type,
        item_id,
    })
}

fn actor_identity(auth: &AuthContext) -> Result<ActorIdentity, ApiError> {
    let user_id = auth
        .user_id
        .as_ref()
        .filter(|user_id| !user_id.trim().is_empty())
        .ok_or(ApiError::Unauthorized)?;
    let username = auth
        .username
        .clone()
        .unwrap_or_else(|| user_id.to_string());
    Ok(ActorIdentity {
        user_id: user_id.to_string(),
        username,
    })
}
