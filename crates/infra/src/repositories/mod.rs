mod memory;

pub use memory::{
    InMemoryAchievementRepository, InMemoryActivityRepository, InMemoryInteractionRepository,
    InMemoryItemSource, InMemoryUserRepository,
};
