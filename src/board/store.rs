//! Per-turn entity store.
//!
//! Rebuilt from scratch every turn. Factories live in a dense vector indexed
//! by id so lookups are O(1); troops and bombs are kept in snapshot order.

use super::entity::{Bomb, Entity, EntityError, EntityKind, EntityRecord, Factory, FactoryId, Owner, Troop};

/// All entities visible in the current turn.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntityStore {
    factories: Vec<Option<Factory>>,
    troops: Vec<Troop>,
    bombs: Vec<Bomb>,
}

impl EntityStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty store with room for `factory_count` factories.
    pub fn with_factory_capacity(factory_count: usize) -> Self {
        EntityStore {
            factories: Vec::with_capacity(factory_count),
            troops: Vec::new(),
            bombs: Vec::new(),
        }
    }

    /// Discards every entity.
    pub fn clear(&mut self) {
        self.factories.clear();
        self.troops.clear();
        self.bombs.clear();
    }

    /// Parses a record into its typed entity and indexes it.
    pub fn add(&mut self, record: &EntityRecord) -> Result<(), EntityError> {
        let entity = Entity::from_record(record)?;
        self.insert(entity)
    }

    /// Indexes an already-typed entity.
    pub fn insert(&mut self, entity: Entity) -> Result<(), EntityError> {
        match entity {
            Entity::Factory(factory) => {
                if factory.id >= self.factories.len() {
                    self.factories.resize(factory.id + 1, None);
                }
                let slot = &mut self.factories[factory.id];
                if slot.is_some() {
                    return Err(EntityError::DuplicateFactory(factory.id));
                }
                *slot = Some(factory);
            }
            Entity::Troop(troop) => self.push_troop(troop),
            Entity::Bomb(bomb) => self.bombs.push(bomb),
        }
        Ok(())
    }

    /// Appends a troop after the snapshot's own troops.
    pub fn push_troop(&mut self, troop: Troop) {
        self.troops.push(troop);
    }

    /// Clears the store and loads every record of a snapshot.
    pub fn rebuild<'a, I>(&mut self, records: I) -> Result<(), EntityError>
    where
        I: IntoIterator<Item = &'a EntityRecord>,
    {
        self.clear();
        for record in records {
            self.add(record)?;
        }
        Ok(())
    }

    /// Returns the factory with the given id.
    ///
    /// # Panics
    ///
    /// Panics if no factory with that id is in the snapshot. Ids come from
    /// the game and are always valid; a miss means the snapshot is corrupt.
    pub fn factory(&self, id: FactoryId) -> &Factory {
        match self.get_factory(id) {
            Some(f) => f,
            None => panic!("unknown factory id {id}"),
        }
    }

    /// Mutable access to a factory. Panics on unknown ids like `factory`.
    pub fn factory_mut(&mut self, id: FactoryId) -> &mut Factory {
        match self.factories.get_mut(id).and_then(Option::as_mut) {
            Some(f) => f,
            None => panic!("unknown factory id {id}"),
        }
    }

    /// Returns the factory with the given id, if present.
    pub fn get_factory(&self, id: FactoryId) -> Option<&Factory> {
        self.factories.get(id).and_then(Option::as_ref)
    }

    /// All factories in id order.
    pub fn factories(&self) -> impl Iterator<Item = &Factory> + '_ {
        self.factories.iter().flatten()
    }

    /// Factories held by `owner`, in id order.
    pub fn factories_owned_by(&self, owner: Owner) -> impl Iterator<Item = &Factory> + '_ {
        self.factories().filter(move |f| f.owner == owner)
    }

    /// Factories not held by `owner`, in id order.
    pub fn factories_not_owned_by(&self, owner: Owner) -> impl Iterator<Item = &Factory> + '_ {
        self.factories().filter(move |f| f.owner != owner)
    }

    /// All troops in snapshot order, followed by any pending troops.
    pub fn troops(&self) -> impl Iterator<Item = &Troop> + '_ {
        self.troops.iter()
    }

    /// Troops sent by `owner`.
    pub fn troops_owned_by(&self, owner: Owner) -> impl Iterator<Item = &Troop> + '_ {
        self.troops.iter().filter(move |t| t.owner == owner)
    }

    /// All bombs in snapshot order.
    pub fn bombs(&self) -> impl Iterator<Item = &Bomb> + '_ {
        self.bombs.iter()
    }

    /// Bombs sent by `owner`.
    pub fn bombs_owned_by(&self, owner: Owner) -> impl Iterator<Item = &Bomb> + '_ {
        self.bombs.iter().filter(move |b| b.owner == owner)
    }

    /// Number of entities of one kind.
    pub fn len(&self, kind: EntityKind) -> usize {
        match kind {
            EntityKind::Factory => self.factories().count(),
            EntityKind::Troop => self.troops.len(),
            EntityKind::Bomb => self.bombs.len(),
        }
    }

    /// Returns true if the store holds no entities at all.
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty() && self.troops.is_empty() && self.bombs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> Vec<EntityRecord> {
        vec![
            EntityRecord::factory(0, Owner::Me, 10, 1, 0),
            EntityRecord::factory(1, Owner::Enemy, 5, 1, 0),
            EntityRecord::factory(2, Owner::Neutral, 2, 0, 0),
            EntityRecord::troop(7, Owner::Enemy, 1, 0, 3, 2),
            EntityRecord::troop(8, Owner::Me, 0, 2, 4, 1),
            EntityRecord::bomb(9, Owner::Enemy, 1, None, None),
        ]
    }

    fn loaded() -> EntityStore {
        let mut store = EntityStore::new();
        store.rebuild(&snapshot()).unwrap();
        store
    }

    #[test]
    fn new_store_is_empty() {
        let store = EntityStore::new();
        assert!(store.is_empty());
        assert_eq!(store.len(EntityKind::Factory), 0);
    }

    #[test]
    fn rebuild_indexes_by_kind() {
        let store = loaded();
        assert_eq!(store.len(EntityKind::Factory), 3);
        assert_eq!(store.len(EntityKind::Troop), 2);
        assert_eq!(store.len(EntityKind::Bomb), 1);
    }

    #[test]
    fn factory_lookup_by_id() {
        let store = loaded();
        assert_eq!(store.factory(1).owner, Owner::Enemy);
        assert_eq!(store.factory(2).cyborgs, 2);
        assert!(store.get_factory(3).is_none());
    }

    #[test]
    #[should_panic(expected = "unknown factory id 5")]
    fn unknown_factory_panics() {
        loaded().factory(5);
    }

    #[test]
    fn ownership_filters() {
        let store = loaded();
        let mine: Vec<FactoryId> = store.factories_owned_by(Owner::Me).map(|f| f.id).collect();
        assert_eq!(mine, vec![0]);
        let others: Vec<FactoryId> = store.factories_not_owned_by(Owner::Me).map(|f| f.id).collect();
        assert_eq!(others, vec![1, 2]);
        assert_eq!(store.troops_owned_by(Owner::Enemy).count(), 1);
        assert_eq!(store.troops_owned_by(Owner::Me).count(), 1);
        assert_eq!(store.bombs_owned_by(Owner::Enemy).count(), 1);
        assert_eq!(store.bombs_owned_by(Owner::Me).count(), 0);
    }

    #[test]
    fn factories_out_of_order_are_placed_by_id() {
        let mut store = EntityStore::new();
        store.add(&EntityRecord::factory(2, Owner::Me, 1, 1, 0)).unwrap();
        store.add(&EntityRecord::factory(0, Owner::Enemy, 1, 1, 0)).unwrap();
        let ids: Vec<FactoryId> = store.factories().map(|f| f.id).collect();
        assert_eq!(ids, vec![0, 2]);
    }

    #[test]
    fn duplicate_factory_is_rejected() {
        let mut store = EntityStore::new();
        store.add(&EntityRecord::factory(0, Owner::Me, 1, 1, 0)).unwrap();
        assert_eq!(
            store.add(&EntityRecord::factory(0, Owner::Enemy, 1, 1, 0)),
            Err(EntityError::DuplicateFactory(0))
        );
    }

    #[test]
    fn clear_discards_everything() {
        let mut store = loaded();
        store.clear();
        assert!(store.is_empty());
        assert_eq!(store.troops().count(), 0);
    }

    #[test]
    fn rebuild_twice_is_idempotent() {
        let mut store = loaded();
        let first = store.clone();
        store.rebuild(&snapshot()).unwrap();
        assert_eq!(store, first);
    }

    #[test]
    fn rebuild_drops_previous_turn() {
        let mut store = loaded();
        store
            .rebuild(&[EntityRecord::factory(0, Owner::Enemy, 1, 0, 0)])
            .unwrap();
        assert_eq!(store.len(EntityKind::Factory), 1);
        assert_eq!(store.len(EntityKind::Troop), 0);
        assert_eq!(store.factory(0).owner, Owner::Enemy);
    }

    #[test]
    fn factory_mut_updates_in_place() {
        let mut store = loaded();
        store.factory_mut(0).withdraw(4);
        assert_eq!(store.factory(0).cyborgs, 6);
    }
}
