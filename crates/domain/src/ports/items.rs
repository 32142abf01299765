use crate::items::{ContentItem, ItemType};
use crate::ports::BoxFuture;
use crate::DomainResult;

/// Read side of an external content collection. Each source returns its own
/// most-recent rows, already sorted and capped, so feed fan-out stays bounded.
pub trait ItemSource: Send + Sync {
    fn item_type(&self) -> ItemType;

    fn list_recent(&self, limit: usize) -> BoxFuture<'_, DomainResult<Vec<ContentItem>>>;
}
