use std::sync::Arc;

use vigia_domain::achievements::{default_catalog, AchievementEngine};
use vigia_domain::activity::ActivityService;
use vigia_domain::feed::FeedService;
use vigia_domain::interactions::InteractionService;
use vigia_domain::items::ItemType;
use vigia_domain::ports::achievements::AchievementRepository;
use vigia_domain::ports::activity::ActivityRepository;
use vigia_domain::ports::db::DbAdapter;
use vigia_domain::ports::interactions::InteractionRepository;
use vigia_domain::ports::items::ItemSource;
use vigia_domain::ports::users::UserRepository;
use vigia_domain::ranking::RankingService;
use vigia_infra::config::AppConfig;
use vigia_infra::db::{DbConfig, SurrealAdapter};
use vigia_infra::repositories::{
    InMemoryAchievementRepository, InMemoryActivityRepository, InMemoryInteractionRepository,
    InMemoryItemSource, InMemoryUserRepository,
};

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub users: Arc<dyn UserRepository>,
    pub activities: Arc<dyn ActivityRepository>,
    pub interactions: Arc<dyn InteractionRepository>,
    pub achievements: Arc<dyn AchievementRepository>,
    pub item_sources: Vec<Arc<dyn ItemSource>>,
    pub db: Option<Arc<dyn DbAdapter>>,
}

#[allow(dead_code)]
pub struct Stores {
    pub users: Arc<dyn UserRepository>,
    pub activities: Arc<dyn ActivityRepository>,
    pub interactions: Arc<dyn InteractionRepository>,
    pub achievements: Arc<dyn AchievementRepository>,
    pub item_sources: Vec<Arc<dyn ItemSource>>,
}

impl AppState {
    pub async fn new(config: AppConfig) -> anyhow::Result<Self> {
        let db: Option<Arc<dyn DbAdapter>> = if config.data_backend.eq_ignore_ascii_case("surreal")
        {
            let adapter = SurrealAdapter::new(DbConfig::from_app_config(&config));
            if let Err(err) = adapter.health_check().await {
                tracing::warn!(error = %err, "backend unreachable at startup");
            }
            Some(Arc::new(adapter))
        } else {
            None
        };

        let item_sources: Vec<Arc<dyn ItemSource>> = vec![
            Arc::new(InMemoryItemSource::new(ItemType::Qa)),
            Arc::new(InMemoryItemSource::new(ItemType::Accident)),
            Arc::new(InMemoryItemSource::new(ItemType::Sensibilizacao)),
        ];

        Ok(Self {
            config,
            users: Arc::new(InMemoryUserRepository::new()),
            activities: Arc::new(InMemoryActivityRepository::new()),
            interactions: Arc::new(InMemoryInteractionRepository::new()),
            achievements: Arc::new(InMemoryAchievementRepository::with_definitions(
                default_catalog(),
            )),
            item_sources,
            db,
        })
    }

    #[allow(dead_code)]
    pub fn with_stores(config: AppConfig, stores: Stores) -> Self {
        Self {
            config,
            users: stores.users,
            activities: stores.activities,
            interactions: stores.interactions,
            achievements: stores.achievements,
            item_sources: stores.item_sources,
            db: None,
        }
    }

    pub fn achievement_engine(&self) -> AchievementEngine {
        AchievementEngine::new(self.achievements.clone(), self.activities.clone())
    }

    pub fn activity_service(&self) -> ActivityService {
        ActivityService::new(
            self.activities.clone(),
            self.users.clone(),
            self.achievement_engine(),
        )
    }

    pub fn interaction_service(&self) -> InteractionService {
        InteractionService::new(self.interactions.clone(), self.activity_service())
    }

    pub fn feed_service(&self) -> FeedService {
        FeedService::new(self.item_sources.clone(), self.interactions.clone())
    }

    pub fn ranking_service(&self) -> RankingService {
        RankingService::new(
            self.users.clone(),
            self.achievements.clone(),
            self.activities.clone(),
        )
    }
}
