use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::Serialize;
use serde_json::{json, Value};
use tower::ServiceExt;

use vigia_domain::achievements::{default_catalog, AchievementAward, AchievementDefinition};
use vigia_domain::activity::{ActivityAppend, ActivityCategory};
use vigia_domain::achievements::TriggerAction;
use vigia_domain::interactions::{Comment, Like};
use vigia_domain::items::{ContentItem, ItemRef, ItemType};
use vigia_domain::users::UserRecord;
use vigia_infra::config::AppConfig;
use vigia_infra::repositories::{
    InMemoryAchievementRepository, InMemoryActivityRepository, InMemoryInteractionRepository,
    InMemoryItemSource, InMemoryUserRepository,
};

use crate::routes;
use crate::state::{AppState, Stores};

#[derive(Serialize)]
struct Claims {
    sub: String,
    role: String,
    exp: usize,
}

fn test_config() -> AppConfig {
    AppConfig {
        app_env: "test".to_string(),
        port: 0,
        log_level: "info".to_string(),
        data_backend: "memory".to_string(),
        surreal_endpoint: "ws://127.0.0.1:8000".to_string(),
        surreal_ns: "vigia".to_string(),
        surreal_db: "engagement".to_string(),
        surreal_user: "root".to_string(),
        surreal_pass: "root".to_string(),
        jwt_secret: "test-secret".to_string(),
    }
}

fn test_token(sub: &str) -> String {
    test_token_with_role(sub, "user")
}

fn test_token_with_role(sub: &str, role: &str) -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("time")
        .as_secs();
    let claims = Claims {
        sub: sub.to_string(),
        role: role.to_string(),
        exp: (now + 3600) as usize,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(test_config().jwt_secret.as_bytes()),
    )
    .expect("token")
}

struct TestContext {
    state: AppState,
    app: Router,
    achievements: InMemoryAchievementRepository,
    qa_source: Arc<InMemoryItemSource>,
    accident_source: Arc<InMemoryItemSource>,
}

fn test_context() -> TestContext {
    let achievements = InMemoryAchievementRepository::with_definitions(default_catalog());
    let qa_source = Arc::new(InMemoryItemSource::new(ItemType::Qa));
    let accident_source = Arc::new(InMemoryItemSource::new(ItemType::Accident));
    let sensibilizacao_source = Arc::new(InMemoryItemSource::new(ItemType::Sensibilizacao));

    let state = AppState::with_stores(
        test_config(),
        Stores {
            users: Arc::new(InMemoryUserRepository::new()),
            activities: Arc::new(InMemoryActivityRepository::new()),
            interactions: Arc::new(InMemoryInteractionRepository::new()),
            achievements: Arc::new(achievements.clone()),
            item_sources: vec![
                qa_source.clone(),
                accident_source.clone(),
                sensibilizacao_source,
            ],
        },
    );
    let app = routes::router(state.clone());
    TestContext {
        state,
        app,
        achievements,
        qa_source,
        accident_source,
    }
}

fn json_request(method: &str, uri: &str, token: Option<&str>, body: Option<&Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("request"),
        None => builder.body(Body::empty()).expect("request"),
    }
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, body)
}

async fn seed_user(state: &AppState, user_id: &str, name: &str) {
    state
        .users
        .upsert(&UserRecord {
            user_id: user_id.to_string(),
            name: name.to_string(),
            points: 0,
        })
        .await
        .expect("seed user");
}

fn video_activity(user_id: &str, activity_id: &str, points: i64) -> Value {
    json!({
        "userId": user_id,
        "category": "video",
        "activityId": activity_id,
        "points": points,
        "details": {"title": "Ladder safety"},
    })
}

#[tokio::test]
async fn health_reports_environment() {
    let ctx = test_context();
    let (status, body) = send(&ctx.app, json_request("GET", "/health", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["environment"], "test");
}

#[tokio::test]
async fn append_activity_requires_auth() {
    let ctx = test_context();
    let (status, _) = send(
        &ctx.app,
        json_request(
            "POST",
            "/activities",
            None,
            Some(&video_activity("user-1", "video-1", 10)),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn append_activity_credits_points_and_lists_entry() {
    let ctx = test_context();
    seed_user(&ctx.state, "user-1", "User One").await;
    let token = test_token("user-1");

    let (status, body) = send(
        &ctx.app,
        json_request(
            "POST",
            "/activities",
            Some(&token),
            Some(&video_activity("user-1", "video-1", 10)),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(!body["id"].as_str().unwrap_or_default().is_empty());
    assert_eq!(body["points"], 10);
    assert_eq!(body["newMedals"].as_array().unwrap().len(), 0);

    let user = ctx.state.users.get("user-1").await.unwrap().unwrap();
    assert_eq!(user.points, 10);

    let (status, body) = send(
        &ctx.app,
        json_request("GET", "/activities/user/user-1", None, None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let entries = body.as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["description"], "Watched safety video \"Ladder safety\"");
    assert!(entries[0]["timestamp"].as_str().unwrap().contains('T'));
}

#[tokio::test]
async fn append_activity_rejects_unknown_category() {
    let ctx = test_context();
    let token = test_token("user-1");
    let body = json!({
        "userId": "user-1",
        "category": "gardening",
        "activityId": "a-1",
        "points": 1,
    });
    let (status, body) = send(
        &ctx.app,
        json_request("POST", "/activities", Some(&token), Some(&body)),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "validation_error");
}

#[tokio::test]
async fn like_flow_is_idempotent_across_unlike() {
    let ctx = test_context();
    seed_user(&ctx.state, "user-1", "User One").await;
    let token = test_token("user-1");
    let like = json!({"itemType": "qa", "itemId": "qa-1"});

    let (status, body) = send(
        &ctx.app,
        json_request("POST", "/interactions/like", Some(&token), Some(&like)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["alreadyLiked"], false);

    let (status, body) = send(
        &ctx.app,
        json_request("POST", "/interactions/like", Some(&token), Some(&like)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["alreadyLiked"], true);

    let (status, body) = send(
        &ctx.app,
        json_request("GET", "/interactions/like/qa/qa-1", Some(&token), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["likeCount"], 1);
    assert_eq!(body["userHasLiked"], true);

    let (status, body) = send(
        &ctx.app,
        json_request("GET", "/interactions/like/qa/qa-1", None, None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["userHasLiked"], false);

    let (status, _) = send(
        &ctx.app,
        json_request("DELETE", "/interactions/like", Some(&token), Some(&like)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &ctx.app,
        json_request("DELETE", "/interactions/like", Some(&token), Some(&like)),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(
        &ctx.app,
        json_request("POST", "/interactions/like", Some(&token), Some(&like)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["alreadyLiked"], false);
}

#[tokio::test]
async fn like_requires_auth_and_known_item_type() {
    let ctx = test_context();
    let like = json!({"itemType": "qa", "itemId": "qa-1"});
    let (status, _) = send(
        &ctx.app,
        json_request("POST", "/interactions/like", None, Some(&like)),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let token = test_token("user-1");
    let bad = json!({"itemType": "video", "itemId": "qa-1"});
    let (status, _) = send(
        &ctx.app,
        json_request("POST", "/interactions/like", Some(&token), Some(&bad)),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn comment_text_is_trimmed_and_bounded() {
    let ctx = test_context();
    seed_user(&ctx.state, "user-1", "User One").await;
    let token = test_token("user-1");

    let too_long = json!({
        "itemType": "accident",
        "itemId": "acc-1",
        "text": "a".repeat(501),
    });
    let (status, _) = send(
        &ctx.app,
        json_request("POST", "/interactions/comment", Some(&token), Some(&too_long)),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let at_limit = json!({
        "itemType": "accident",
        "itemId": "acc-1",
        "text": format!("  {}  ", "a".repeat(500)),
    });
    let (status, body) = send(
        &ctx.app,
        json_request("POST", "/interactions/comment", Some(&token), Some(&at_limit)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["text"].as_str().unwrap().len(), 500);
    assert_eq!(body["user"], "user-1");
    assert!(!body["id"].as_str().unwrap_or_default().is_empty());
    assert!(body["createdAt"].as_str().unwrap().contains('T'));
}

#[tokio::test]
async fn comments_paginate_newest_first() {
    let ctx = test_context();
    let item = ItemRef::new(ItemType::Sensibilizacao, "doc-1");
    for index in 0..3_i64 {
        ctx.state
            .interactions
            .insert_comment(&Comment {
                comment_id: format!("comment-{index}"),
                user_id: "user-1".to_string(),
                user_name: "User One".to_string(),
                item: item.clone(),
                text: format!("text {index}"),
                created_at_ms: 1_000 + index,
            })
            .await
            .unwrap();
    }

    let (status, body) = send(
        &ctx.app,
        json_request(
            "GET",
            "/interactions/comment/sensibilizacao/doc-1?page=1&limit=2",
            None,
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["currentPage"], 1);
    assert_eq!(body["totalPages"], 2);
    assert_eq!(body["totalComments"], 3);
    let comments = body["comments"].as_array().unwrap();
    assert_eq!(comments.len(), 2);
    assert_eq!(comments[0]["commentId"], "comment-2");

    let (status, _) = send(
        &ctx.app,
        json_request(
            "GET",
            "/interactions/comment/sensibilizacao/doc-1?page=0&limit=2",
            None,
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn comment_pagination_tolerates_huge_page_numbers() {
    let ctx = test_context();
    ctx.state
        .interactions
        .insert_comment(&Comment {
            comment_id: "comment-0".to_string(),
            user_id: "user-1".to_string(),
            user_name: "User One".to_string(),
            item: ItemRef::new(ItemType::Qa, "qa-1"),
            text: "text".to_string(),
            created_at_ms: 1_000,
        })
        .await
        .unwrap();

    let uri = format!("/interactions/comment/qa/qa-1?page={}&limit=10", usize::MAX);
    let (status, body) = send(&ctx.app, json_request("GET", &uri, None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["comments"].as_array().unwrap().len(), 0);
    assert_eq!(body["totalComments"], 1);
    assert_eq!(body["totalPages"], 1);
}

#[tokio::test]
async fn feed_merges_sources_newest_first_with_counts() {
    let ctx = test_context();
    ctx.qa_source
        .push(ContentItem {
            item_id: "qa-1".to_string(),
            title: "Loose handrail".to_string(),
            created_at_ms: 1_000,
        })
        .await;
    ctx.qa_source
        .push(ContentItem {
            item_id: "qa-2".to_string(),
            title: "Blocked exit".to_string(),
            created_at_ms: 3_000,
        })
        .await;
    ctx.accident_source
        .push(ContentItem {
            item_id: "acc-1".to_string(),
            title: "Forklift incident".to_string(),
            created_at_ms: 2_000,
        })
        .await;

    ctx.state
        .interactions
        .insert_like(&Like {
            user_id: "user-1".to_string(),
            item: ItemRef::new(ItemType::Qa, "qa-2"),
            created_at_ms: 3_100,
        })
        .await
        .unwrap();

    let (status, body) = send(
        &ctx.app,
        json_request("GET", "/activities/feed?limit=2", None, None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let items = body.as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["id"], "qa-2");
    assert_eq!(items[0]["type"], "qa");
    assert_eq!(items[0]["likeCount"], 1);
    assert_eq!(items[1]["id"], "acc-1");
    assert_eq!(items[1]["commentCount"], 0);

    let (status, _) = send(
        &ctx.app,
        json_request("GET", "/activities/feed?limit=0", None, None),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn five_videos_award_the_medal_exactly_once() {
    let ctx = test_context();
    seed_user(&ctx.state, "user-1", "User One").await;
    let token = test_token("user-1");

    for index in 0..4 {
        let (status, body) = send(
            &ctx.app,
            json_request(
                "POST",
                "/activities",
                Some(&token),
                Some(&video_activity("user-1", &format!("video-{index}"), 10)),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["newMedals"].as_array().unwrap().len(), 0);
    }

    let (status, body) = send(
        &ctx.app,
        json_request(
            "POST",
            "/activities",
            Some(&token),
            Some(&video_activity("user-1", "video-4", 10)),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let medals = body["newMedals"].as_array().unwrap();
    assert_eq!(medals.len(), 1);
    assert_eq!(medals[0]["medalId"], "safety-student");

    let (status, body) = send(
        &ctx.app,
        json_request(
            "POST",
            "/activities",
            Some(&token),
            Some(&video_activity("user-1", "video-5", 10)),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["newMedals"].as_array().unwrap().len(), 0);

    let (status, body) = send(
        &ctx.app,
        json_request("GET", "/achievements/user/user-1", None, None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    // The award writes its own zero-point ledger entry.
    let (_, body) = send(
        &ctx.app,
        json_request("GET", "/activities/user/user-1?limit=50", None, None),
    )
    .await;
    let medal_entries: Vec<&Value> = body
        .as_array()
        .unwrap()
        .iter()
        .filter(|entry| entry["category"] == "medal")
        .collect();
    assert_eq!(medal_entries.len(), 1);
    assert_eq!(
        medal_entries[0]["description"],
        "Unlocked achievement \"Safety Student\""
    );
}

#[tokio::test]
async fn scoped_medals_only_count_matching_detail_category() {
    let ctx = test_context();
    seed_user(&ctx.state, "user-1", "User One").await;
    ctx.achievements
        .put_definition(AchievementDefinition {
            medal_id: "safety-scholar".to_string(),
            name: "Safety Scholar".to_string(),
            description: "Watched two Safety videos".to_string(),
            trigger_action: TriggerAction::ItemWatched,
            trigger_category: Some("Safety".to_string()),
            required_count: 2,
        })
        .await;
    let token = test_token("user-1");

    let watch = |category: &str, id: &str| {
        json!({
            "userId": "user-1",
            "category": "video",
            "activityId": id,
            "points": 10,
            "details": {"title": "Video", "category": category},
        })
    };

    for index in 0..2 {
        let (_, body) = send(
            &ctx.app,
            json_request(
                "POST",
                "/activities",
                Some(&token),
                Some(&watch("Quality", &format!("q-{index}"))),
            ),
        )
        .await;
        let medals = body["newMedals"].as_array().unwrap();
        assert!(medals.iter().all(|m| m["medalId"] != "safety-scholar"));
    }

    let (_, body) = send(
        &ctx.app,
        json_request("POST", "/activities", Some(&token), Some(&watch("Safety", "s-0"))),
    )
    .await;
    assert!(body["newMedals"]
        .as_array()
        .unwrap()
        .iter()
        .all(|m| m["medalId"] != "safety-scholar"));

    let (_, body) = send(
        &ctx.app,
        json_request("POST", "/activities", Some(&token), Some(&watch("Safety", "s-1"))),
    )
    .await;
    let medals = body["newMedals"].as_array().unwrap();
    assert!(medals.iter().any(|m| m["medalId"] == "safety-scholar"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_qualifying_appends_award_at_most_once() {
    let ctx = test_context();
    seed_user(&ctx.state, "user-1", "User One").await;

    let mut handles = Vec::new();
    for index in 0..3 {
        let service = ctx.state.activity_service();
        handles.push(tokio::spawn(async move {
            service
                .append(ActivityAppend {
                    user_id: "user-1".to_string(),
                    category: ActivityCategory::Incident,
                    activity_id: format!("incident-{index}"),
                    points: 25,
                    details: json!({"title": "Near miss"}),
                })
                .await
                .expect("append")
        }));
    }

    let mut first_report_awards = 0;
    for handle in handles {
        let outcome = handle.await.unwrap();
        first_report_awards += outcome
            .new_medals
            .iter()
            .filter(|medal| medal.medal_id == "first-report")
            .count();
    }
    assert_eq!(first_report_awards, 1);

    let user = ctx.state.users.get("user-1").await.unwrap().unwrap();
    assert_eq!(user.points, 75);

    let awards = ctx
        .state
        .achievements
        .list_awards_for_user("user-1")
        .await
        .unwrap();
    assert_eq!(awards.len(), 1);
}

#[tokio::test]
async fn leaderboard_orders_by_points_then_medals_then_name() {
    let ctx = test_context();
    seed_user(&ctx.state, "u-alice", "Alice").await;
    seed_user(&ctx.state, "u-bob", "Bob").await;
    seed_user(&ctx.state, "u-carol", "Carol").await;
    for (user, points) in [("u-alice", 50), ("u-bob", 50), ("u-carol", 30)] {
        ctx.state.users.increment_points(user, points).await.unwrap();
    }
    for (user, medal) in [
        ("u-alice", "first-report"),
        ("u-bob", "first-report"),
        ("u-bob", "vigilant-reporter"),
    ] {
        ctx.state
            .achievements
            .insert_award(&AchievementAward {
                user_id: user.to_string(),
                medal_id: medal.to_string(),
                earned_at_ms: 1_000,
            })
            .await
            .unwrap();
    }

    let (status, body) = send(
        &ctx.app,
        json_request("GET", "/stats/leaderboard", None, None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let rows = body.as_array().unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0]["name"], "Bob");
    assert_eq!(rows[0]["rank"], 1);
    assert_eq!(rows[0]["medalCount"], 2);
    assert_eq!(rows[0]["topMedals"][0]["medalId"], "vigilant-reporter");
    assert_eq!(rows[1]["name"], "Alice");
    assert_eq!(rows[2]["name"], "Carol");
    assert_eq!(rows[2]["rank"], 3);
}

#[tokio::test]
async fn ranking_breaks_point_ties_on_user_id() {
    let ctx = test_context();
    seed_user(&ctx.state, "u-a", "A").await;
    seed_user(&ctx.state, "u-b", "B").await;
    ctx.state.users.increment_points("u-a", 10).await.unwrap();
    ctx.state.users.increment_points("u-b", 10).await.unwrap();

    let (status, body) = send(
        &ctx.app,
        json_request("GET", "/stats/user/u-b/ranking", None, None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["position"], 2);
    assert_eq!(body["totalUsers"], 2);
    assert_eq!(body["points"], 10);

    let (status, _) = send(
        &ctx.app,
        json_request("GET", "/stats/user/ghost/ranking", None, None),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn points_breakdown_zero_fills_every_category() {
    let ctx = test_context();
    seed_user(&ctx.state, "user-1", "User One").await;
    let token = test_token("user-1");
    send(
        &ctx.app,
        json_request(
            "POST",
            "/activities",
            Some(&token),
            Some(&video_activity("user-1", "video-1", 10)),
        ),
    )
    .await;

    let (status, body) = send(
        &ctx.app,
        json_request("GET", "/stats/user/user-1/points-breakdown", None, None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let rows = body.as_array().unwrap();
    assert_eq!(rows.len(), 5);
    let video = rows.iter().find(|row| row["category"] == "video").unwrap();
    assert_eq!(video["points"], 10);
    assert_eq!(video["color"], "#3b82f6");
    let incident = rows.iter().find(|row| row["category"] == "incident").unwrap();
    assert_eq!(incident["points"], 0);
}

#[tokio::test]
async fn assign_achievement_is_admin_only_and_idempotent() {
    let ctx = test_context();
    seed_user(&ctx.state, "user-1", "User One").await;
    let body = json!({"userId": "user-1"});

    let (status, _) = send(
        &ctx.app,
        json_request("POST", "/achievements/first-report/assign", None, Some(&body)),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let user_token = test_token("user-1");
    let (status, _) = send(
        &ctx.app,
        json_request(
            "POST",
            "/achievements/first-report/assign",
            Some(&user_token),
            Some(&body),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let admin_token = test_token_with_role("admin-1", "admin");
    let (status, response) = send(
        &ctx.app,
        json_request(
            "POST",
            "/achievements/first-report/assign",
            Some(&admin_token),
            Some(&body),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["alreadyEarned"], false);
    assert_eq!(response["name"], "First Report");

    let (status, response) = send(
        &ctx.app,
        json_request(
            "POST",
            "/achievements/first-report/assign",
            Some(&admin_token),
            Some(&body),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["alreadyEarned"], true);

    let (status, _) = send(
        &ctx.app,
        json_request(
            "POST",
            "/achievements/unknown-medal/assign",
            Some(&admin_token),
            Some(&body),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn achievement_catalog_is_listed() {
    let ctx = test_context();
    let (status, body) = send(&ctx.app, json_request("GET", "/achievements", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn metrics_endpoint_renders_after_install() {
    crate::observability::init_metrics().ok();
    let ctx = test_context();
    let response = ctx
        .app
        .clone()
        .oneshot(json_request("GET", "/metrics", None, None))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
}
