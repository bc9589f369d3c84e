//! Threat accounting.

use std::collections::HashMap;

use crate::state::EntityId;

/// Cumulative damage received per attacker.
///
/// Entries are never removed; an attacker that died or left still counts
/// until the ledger itself goes away with the monster.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AggroLedger {
    threat: HashMap<EntityId, u64>,
}

impl AggroLedger {
    /// Adds `amount` to `attacker`'s threat, creating the entry at zero if needed.
    pub fn record_damage(&mut self, attacker: EntityId, amount: u32) {
        let entry = self.threat.entry(attacker).or_insert(0);
        *entry = entry.saturating_add(u64::from(amount));
    }

    pub fn share_of(&self, attacker: EntityId) -> u64 {
        self.threat.get(&attacker).copied().unwrap_or(0)
    }

    /// Attacker with the most cumulative damage. Ties go to the lowest id.
    pub fn top_attacker(&self) -> Option<EntityId> {
        self.threat
            .iter()
            .max_by(|(a_id, a), (b_id, b)| a.cmp(b).then_with(|| b_id.cmp(a_id)))
            .map(|(id, _)| *id)
    }

    pub fn is_empty(&self) -> bool {
        self.threat.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn top_attacker_tracks_cumulative_damage() {
        let mut ledger = AggroLedger::default();
        ledger.record_damage(EntityId(1), 30);
        ledger.record_damage(EntityId(2), 25);
        ledger.record_damage(EntityId(2), 10);
        assert_eq!(ledger.share_of(EntityId(2)), 35);
        assert_eq!(ledger.top_attacker(), Some(EntityId(2)));
    }

    #[test]
    fn zero_damage_still_creates_entry() {
        let mut ledger = AggroLedger::default();
        ledger.record_damage(EntityId(7), 0);
        assert!(!ledger.is_empty());
        assert_eq!(ledger.share_of(EntityId(7)), 0);
        assert_eq!(ledger.top_attacker(), Some(EntityId(7)));
    }

    #[test]
    fn ties_prefer_lowest_id() {
        let mut ledger = AggroLedger::default();
        assert_eq!(ledger.top_attacker(), None);
        ledger.record_damage(EntityId(5), 10);
        ledger.record_damage(EntityId(3), 10);
        assert_eq!(ledger.top_attacker(), Some(EntityId(3)));
    }
}
