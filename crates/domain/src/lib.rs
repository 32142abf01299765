pub mod achievements;
pub mod activity;
pub mod error;
pub mod feed;
pub mod identity;
pub mod interactions;
pub mod items;
pub mod ports;
pub mod ranking;
pub mod users;
pub mod util;

pub type DomainResult<T> = Result<T, error::DomainError>;
