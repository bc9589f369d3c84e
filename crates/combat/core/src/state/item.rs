use crate::state::{EntityId, MapId, Position, Timestamp};

/// How a world item came to lie on the floor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ItemDropType {
    Normal,
    /// Dropped by a killed monster; only the listed looters may pick it up.
    MonsterLootPile,
}

/// What a world item holds.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ItemPayload {
    Item { name: String },
    Gold { amount: u32 },
}

/// An item or gold pile lying on a map tile.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WorldItem {
    pub id: EntityId,
    pub payload: ItemPayload,
    pub map: MapId,
    pub position: Position,
    pub drop_type: ItemDropType,
    pub allowed_looters: Vec<EntityId>,
    pub dropped_at: Timestamp,
}

impl WorldItem {
    pub fn gold_amount(&self) -> Option<u32> {
        match self.payload {
            ItemPayload::Gold { amount } => Some(amount),
            ItemPayload::Item { .. } => None,
        }
    }

    pub fn item_name(&self) -> Option<&str> {
        match &self.payload {
            ItemPayload::Item { name } => Some(name),
            ItemPayload::Gold { .. } => None,
        }
    }

    /// Whether `looter` may pick this item up.
    pub fn may_loot(&self, looter: EntityId) -> bool {
        self.drop_type == ItemDropType::Normal || self.allowed_looters.contains(&looter)
    }
}
