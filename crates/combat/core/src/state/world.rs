//! World arena: every creature, floor item, group and map, owned in one place.
//!
//! Entities reference each other by [`EntityId`] only; the arena is the single
//! owner and is mutated by one logical task at a time.

use std::collections::{BTreeMap, HashMap};

use crate::error::CombatError;
use crate::state::{Creature, Direction, EntityId, GroupId, MapId, Position, WorldItem};

/// A rectangular tile grid with per-tile occupancy.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MapState {
    pub id: MapId,
    pub name: String,
    pub width: u32,
    pub height: u32,
    occupancy: HashMap<Position, Vec<EntityId>>,
}

impl MapState {
    pub fn new(id: MapId, name: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            id,
            name: name.into(),
            width,
            height,
            occupancy: HashMap::new(),
        }
    }

    pub fn contains(&self, position: Position) -> bool {
        position.x >= 0
            && position.y >= 0
            && (position.x as u32) < self.width
            && (position.y as u32) < self.height
    }

    /// Entities on `position`, in placement order.
    pub fn entities_at(&self, position: Position) -> &[EntityId] {
        self.occupancy
            .get(&position)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    fn place(&mut self, id: EntityId, position: Position) {
        self.occupancy.entry(position).or_default().push(id);
    }

    fn vacate(&mut self, id: EntityId, position: Position) {
        if let Some(tile) = self.occupancy.get_mut(&position) {
            tile.retain(|e| *e != id);
            if tile.is_empty() {
                self.occupancy.remove(&position);
            }
        }
    }
}

/// A player party.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Group {
    pub id: GroupId,
    pub members: Vec<EntityId>,
}

impl Group {
    pub fn new(id: GroupId, members: impl IntoIterator<Item = EntityId>) -> Self {
        Self {
            id,
            members: members.into_iter().collect(),
        }
    }
}

/// Everything that exists in the simulated world.
#[derive(Clone, Debug, Default)]
pub struct WorldState {
    creatures: BTreeMap<EntityId, Creature>,
    items: BTreeMap<EntityId, WorldItem>,
    groups: BTreeMap<GroupId, Group>,
    maps: BTreeMap<MapId, MapState>,
    next_id: u32,
}

impl WorldState {
    pub fn new() -> Self {
        Self {
            next_id: 1,
            ..Self::default()
        }
    }

    // ===== maps =====

    pub fn add_map(&mut self, map: MapState) {
        self.maps.insert(map.id, map);
    }

    pub fn map(&self, id: MapId) -> Option<&MapState> {
        self.maps.get(&id)
    }

    fn require_slot(&self, map: MapId, position: Position) -> Result<(), CombatError> {
        let state = self.maps.get(&map).ok_or(CombatError::MapNotFound(map))?;
        if !state.contains(position) {
            return Err(CombatError::OutOfBounds { map, position });
        }
        Ok(())
    }

    // ===== identity =====

    /// Hands out a fresh entity id.
    pub fn allocate_id(&mut self) -> EntityId {
        let id = EntityId(self.next_id.max(1));
        self.next_id = id.0.saturating_add(1);
        id
    }

    fn reserve_id(&mut self, id: EntityId) {
        if id.0 >= self.next_id {
            self.next_id = id.0.saturating_add(1);
        }
    }

    // ===== creatures =====

    /// Places a creature on its map.
    pub fn insert_creature(&mut self, creature: Creature) -> Result<EntityId, CombatError> {
        self.require_slot(creature.map, creature.position)?;
        let id = creature.id;
        if let Some(previous) = self.creatures.remove(&id) {
            if let Some(map) = self.maps.get_mut(&previous.map) {
                map.vacate(id, previous.position);
            }
        }
        self.reserve_id(id);
        if let Some(map) = self.maps.get_mut(&creature.map) {
            map.place(id, creature.position);
        }
        if let Some(group) = creature.group.and_then(|g| self.groups.get_mut(&g)) {
            if !group.members.contains(&id) {
                group.members.push(id);
            }
        }
        self.creatures.insert(id, creature);
        Ok(id)
    }

    /// Takes a creature off its map and out of its group.
    pub fn remove_creature(&mut self, id: EntityId) -> Option<Creature> {
        let creature = self.creatures.remove(&id)?;
        if let Some(map) = self.maps.get_mut(&creature.map) {
            map.vacate(id, creature.position);
        }
        if let Some(group) = creature.group.and_then(|g| self.groups.get_mut(&g)) {
            group.members.retain(|m| *m != id);
        }
        Some(creature)
    }

    pub fn creature(&self, id: EntityId) -> Option<&Creature> {
        self.creatures.get(&id)
    }

    pub fn creature_mut(&mut self, id: EntityId) -> Option<&mut Creature> {
        self.creatures.get_mut(&id)
    }

    pub fn require_creature(&self, id: EntityId) -> Result<&Creature, CombatError> {
        self.creatures
            .get(&id)
            .ok_or(CombatError::CreatureNotFound(id))
    }

    pub fn require_creature_mut(&mut self, id: EntityId) -> Result<&mut Creature, CombatError> {
        self.creatures
            .get_mut(&id)
            .ok_or(CombatError::CreatureNotFound(id))
    }

    pub fn contains_creature(&self, id: EntityId) -> bool {
        self.creatures.contains_key(&id)
    }

    /// All creatures in ascending id order.
    pub fn creatures(&self) -> impl Iterator<Item = &Creature> {
        self.creatures.values()
    }

    pub fn creature_ids(&self) -> Vec<EntityId> {
        self.creatures.keys().copied().collect()
    }

    /// Creatures on `map` in ascending id order.
    pub fn creatures_on_map(&self, map: MapId) -> Vec<EntityId> {
        self.creatures
            .values()
            .filter(|c| c.map == map)
            .map(|c| c.id)
            .collect()
    }

    /// First creature standing on `position`.
    pub fn creature_at(&self, map: MapId, position: Position) -> Option<EntityId> {
        self.maps
            .get(&map)?
            .entities_at(position)
            .iter()
            .copied()
            .find(|id| self.creatures.contains_key(id))
    }

    /// In bounds and free of creatures. Items do not block.
    pub fn is_walkable(&self, map: MapId, position: Position) -> bool {
        self.maps.get(&map).is_some_and(|m| m.contains(position))
            && self.creature_at(map, position).is_none()
    }

    /// Moves a creature one or more tiles. Returns false when the destination is blocked.
    pub fn move_creature(&mut self, id: EntityId, to: Position) -> Result<bool, CombatError> {
        let (map, from) = {
            let creature = self.require_creature(id)?;
            (creature.map, creature.position)
        };
        if from == to {
            return Ok(true);
        }
        if !self.is_walkable(map, to) {
            return Ok(false);
        }
        if let Some(state) = self.maps.get_mut(&map) {
            state.vacate(id, from);
            state.place(id, to);
        }
        if let Some(creature) = self.creatures.get_mut(&id) {
            creature.position = to;
        }
        Ok(true)
    }

    // ===== items =====

    /// Drops an item on its map tile.
    pub fn insert_item(&mut self, item: WorldItem) -> Result<EntityId, CombatError> {
        self.require_slot(item.map, item.position)?;
        let id = item.id;
        self.reserve_id(id);
        if let Some(map) = self.maps.get_mut(&item.map) {
            map.place(id, item.position);
        }
        self.items.insert(id, item);
        Ok(id)
    }

    pub fn remove_item(&mut self, id: EntityId) -> Option<WorldItem> {
        let item = self.items.remove(&id)?;
        if let Some(map) = self.maps.get_mut(&item.map) {
            map.vacate(id, item.position);
        }
        Some(item)
    }

    pub fn item(&self, id: EntityId) -> Option<&WorldItem> {
        self.items.get(&id)
    }

    pub fn items(&self) -> impl Iterator<Item = &WorldItem> {
        self.items.values()
    }

    /// Items lying on `position`.
    pub fn items_at(&self, map: MapId, position: Position) -> Vec<&WorldItem> {
        self.maps
            .get(&map)
            .map(|m| m.entities_at(position))
            .unwrap_or(&[])
            .iter()
            .filter_map(|id| self.items.get(id))
            .collect()
    }

    // ===== groups =====

    /// Registers a group and points each member at it.
    pub fn add_group(&mut self, group: Group) {
        for member in &group.members {
            if let Some(creature) = self.creatures.get_mut(member) {
                creature.group = Some(group.id);
            }
        }
        self.groups.insert(group.id, group);
    }

    pub fn group(&self, id: GroupId) -> Option<&Group> {
        self.groups.get(&id)
    }

    /// Members of `id` still present in the world.
    pub fn group_members(&self, id: GroupId) -> Vec<EntityId> {
        self.groups
            .get(&id)
            .map(|g| {
                g.members
                    .iter()
                    .copied()
                    .filter(|m| self.creatures.contains_key(m))
                    .collect()
            })
            .unwrap_or_default()
    }

    // ===== spatial queries =====

    /// Entities on the tiles of the inclusive rectangle `[min, max]`, clipped to
    /// the map, scanned row by row.
    pub fn entities_in_rect(&self, map: MapId, min: Position, max: Position) -> Vec<EntityId> {
        let Some(state) = self.maps.get(&map) else {
            return Vec::new();
        };
        if state.width == 0 || state.height == 0 {
            return Vec::new();
        }
        let x0 = min.x.max(0);
        let y0 = min.y.max(0);
        let x1 = max.x.min(state.width.saturating_sub(1).min(i32::MAX as u32) as i32);
        let y1 = max.y.min(state.height.saturating_sub(1).min(i32::MAX as u32) as i32);
        let mut found = Vec::new();
        for y in y0..=y1 {
            for x in x0..=x1 {
                found.extend_from_slice(state.entities_at(Position::new(x, y)));
            }
        }
        found
    }

    /// Entities on the `length` tiles beyond `origin` in `direction`, nearest first.
    pub fn entities_in_line(
        &self,
        map: MapId,
        origin: Position,
        direction: Direction,
        length: u32,
    ) -> Vec<EntityId> {
        let Some(state) = self.maps.get(&map) else {
            return Vec::new();
        };
        let mut found = Vec::new();
        for distance in 1..=length.min(i32::MAX as u32) as i32 {
            let tile = origin.offset(direction, distance);
            if !state.contains(tile) {
                break;
            }
            found.extend_from_slice(state.entities_at(tile));
        }
        found
    }

    pub fn entities_at(&self, map: MapId, position: Position) -> Vec<EntityId> {
        self.maps
            .get(&map)
            .map(|m| m.entities_at(position).to_vec())
            .unwrap_or_default()
    }
}
