use std::future::Future;
use std::pin::Pin;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub mod achievements;
pub mod activity;
pub mod db;
pub mod interactions;
pub mod items;
pub mod users;
