use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Content collections that can be liked, commented on, and surfaced in the
/// unified feed. Closed set; anything else is rejected at the boundary.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    Qa,
    Accident,
    Sensibilizacao,
}

impl ItemType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemType::Qa => "qa",
            ItemType::Accident => "accident",
            ItemType::Sensibilizacao => "sensibilizacao",
        }
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemType {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "qa" => Ok(ItemType::Qa),
            "accident" => Ok(ItemType::Accident),
            "sensibilizacao" => Ok(ItemType::Sensibilizacao),
            other => Err(DomainError::Validation(format!(
                "unknown item type '{other}'"
            ))),
        }
    }
}

/// Identifies one row in one content collection.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct ItemRef {
    pub item_type: ItemType,
    pub item_id: String,
}

impl ItemRef {
    pub fn new(item_type: ItemType, item_id: impl Into<String>) -> Self {
        Self {
            item_type,
            item_id: item_id.into(),
        }
    }
}

/// Projection of a content row as served by an external item source.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ContentItem {
    pub item_id: String,
    pub title: String,
    pub created_at_ms: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_type_round_trips_through_wire_strings() {
        for ty in [ItemType::Qa, ItemType::Accident, ItemType::Sensibilizacao] {
            assert_eq!(ty.as_str().parse::<ItemType>().unwrap(), ty);
        }
    }

    #[test]
    fn unknown_item_type_is_a_validation_error() {
        assert!(matches!(
            "video".parse::<ItemType>(),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn item_type_serde_uses_lowercase() {
        let json = serde_json::to_string(&ItemType::Sensibilizacao).unwrap();
        assert_eq!(json, "\"sensibilizacao\"");
    }
}
