//! Entity types visible in a turn snapshot.
//!
//! Factories, troops, and bombs share one wire shape: an id, a type tag, and
//! five positional integer arguments whose meaning depends on the tag.
//! `Entity::from_record` turns that shape into a typed value.

use thiserror::Error;

/// Dense factory index, `0..factory_count`.
pub type FactoryId = usize;

/// Wire-level entity id. Troops created during planning use `PENDING_TROOP_ID`.
pub type EntityId = i32;

/// Id given to troops the planner has committed but not yet dispatched.
pub const PENDING_TROOP_ID: EntityId = -1;

/// Highest production level a factory can reach.
pub const MAX_PRODUCTION: u8 = 3;

/// Which side controls an entity, relative to the player being planned for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Owner {
    Me,
    Enemy,
    Neutral,
}

impl Owner {
    /// Returns the integer code used on the wire: `1`, `-1`, or `0`.
    pub const fn wire_code(self) -> i32 {
        match self {
            Owner::Me => 1,
            Owner::Enemy => -1,
            Owner::Neutral => 0,
        }
    }

    /// Parses an owner from its wire code.
    pub fn from_wire_code(code: i32) -> Option<Owner> {
        match code {
            1 => Some(Owner::Me),
            -1 => Some(Owner::Enemy),
            0 => Some(Owner::Neutral),
            _ => None,
        }
    }

    /// Returns the same owner seen from the other player's side.
    pub const fn flipped(self) -> Owner {
        match self {
            Owner::Me => Owner::Enemy,
            Owner::Enemy => Owner::Me,
            Owner::Neutral => Owner::Neutral,
        }
    }
}

/// The type tag of an entity record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Factory,
    Troop,
    Bomb,
}

impl EntityKind {
    /// Returns the uppercase tag used on the wire.
    pub const fn wire_name(self) -> &'static str {
        match self {
            EntityKind::Factory => "FACTORY",
            EntityKind::Troop => "TROOP",
            EntityKind::Bomb => "BOMB",
        }
    }

    /// Parses an entity kind from its wire tag.
    pub fn from_wire_name(s: &str) -> Option<EntityKind> {
        match s {
            "FACTORY" => Some(EntityKind::Factory),
            "TROOP" => Some(EntityKind::Troop),
            "BOMB" => Some(EntityKind::Bomb),
            _ => None,
        }
    }
}

/// One untyped entity line from the turn snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityRecord {
    pub id: EntityId,
    pub kind: EntityKind,
    pub args: [i32; 5],
}

impl EntityRecord {
    /// Builds a factory record: owner, cyborgs, production, disabled turns.
    pub fn factory(id: FactoryId, owner: Owner, cyborgs: u32, production: u8, disabled: u32) -> Self {
        EntityRecord {
            id: id as EntityId,
            kind: EntityKind::Factory,
            args: [
                owner.wire_code(),
                cyborgs as i32,
                i32::from(production),
                disabled as i32,
                0,
            ],
        }
    }

    /// Builds a troop record: owner, source, target, cyborgs, remaining turns.
    pub fn troop(
        id: EntityId,
        owner: Owner,
        source: FactoryId,
        target: FactoryId,
        cyborgs: u32,
        remaining_turns: u32,
    ) -> Self {
        EntityRecord {
            id,
            kind: EntityKind::Troop,
            args: [
                owner.wire_code(),
                source as i32,
                target as i32,
                cyborgs as i32,
                remaining_turns as i32,
            ],
        }
    }

    /// Builds a bomb record. Unknown target or timer are encoded as `-1`.
    pub fn bomb(
        id: EntityId,
        owner: Owner,
        source: FactoryId,
        target: Option<FactoryId>,
        remaining_turns: Option<u32>,
    ) -> Self {
        EntityRecord {
            id,
            kind: EntityKind::Bomb,
            args: [
                owner.wire_code(),
                source as i32,
                target.map_or(-1, |t| t as i32),
                remaining_turns.map_or(-1, |r| r as i32),
                0,
            ],
        }
    }
}

/// Errors raised when a record's arguments do not fit its type.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EntityError {
    #[error("entity {id}: invalid owner code {code}")]
    InvalidOwner { id: EntityId, code: i32 },

    #[error("entity {id}: field '{field}' must be non-negative, got {value}")]
    NegativeField {
        id: EntityId,
        field: &'static str,
        value: i32,
    },

    #[error("factory {id}: production {value} outside 0..=3")]
    InvalidProduction { id: EntityId, value: i32 },

    #[error("duplicate factory id {0}")]
    DuplicateFactory(FactoryId),
}

/// A node of the game graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Factory {
    pub id: FactoryId,
    pub owner: Owner,
    pub cyborgs: u32,
    pub production: u8,
    /// Turns left before production resumes; 0 when active.
    pub disabled: u32,
}

impl Factory {
    /// Projects the garrison after `turns` more turns of production.
    ///
    /// Disabled turns yield nothing. Saturates at `u32::MAX`.
    pub fn cyborgs_after_turns(&self, turns: u32) -> u32 {
        let productive = turns.saturating_sub(self.disabled);
        self.cyborgs
            .saturating_add(u32::from(self.production).saturating_mul(productive))
    }

    /// Returns true if the factory is not currently sabotaged.
    pub fn is_active(&self) -> bool {
        self.disabled == 0
    }

    /// Returns true if the factory can still be upgraded.
    pub fn can_upgrade(&self, max_production: u8) -> bool {
        self.production < max_production
    }

    /// Removes up to `amount` cyborgs from the garrison, stopping at zero.
    pub fn withdraw(&mut self, amount: u32) {
        self.cyborgs = self.cyborgs.saturating_sub(amount);
    }
}

/// Cyborgs in flight between two factories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Troop {
    pub id: EntityId,
    pub owner: Owner,
    pub source: FactoryId,
    pub target: FactoryId,
    pub cyborgs: u32,
    pub remaining_turns: u32,
}

impl Troop {
    /// A friendly troop committed this turn but not yet on the board.
    pub fn pending(source: FactoryId, target: FactoryId, cyborgs: u32, remaining_turns: u32) -> Self {
        Troop {
            id: PENDING_TROOP_ID,
            owner: Owner::Me,
            source,
            target,
            cyborgs,
            remaining_turns,
        }
    }

    /// Returns true for troops created during planning.
    pub fn is_pending(&self) -> bool {
        self.id == PENDING_TROOP_ID
    }
}

/// A bomb in flight. Enemy bombs hide their target and timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Bomb {
    pub id: EntityId,
    pub owner: Owner,
    pub source: FactoryId,
    pub target: Option<FactoryId>,
    pub remaining_turns: Option<u32>,
}

/// A typed entity built from a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Entity {
    Factory(Factory),
    Troop(Troop),
    Bomb(Bomb),
}

impl Entity {
    /// Builds the typed entity for a record, keyed on its kind.
    pub fn from_record(record: &EntityRecord) -> Result<Entity, EntityError> {
        let id = record.id;
        let [a1, a2, a3, a4, a5] = record.args;
        let owner = Owner::from_wire_code(a1).ok_or(EntityError::InvalidOwner { id, code: a1 })?;

        match record.kind {
            EntityKind::Factory => {
                if !(0..=i32::from(MAX_PRODUCTION)).contains(&a3) {
                    return Err(EntityError::InvalidProduction { id, value: a3 });
                }
                Ok(Entity::Factory(Factory {
                    id: non_negative(id, "id", id)? as FactoryId,
                    owner,
                    cyborgs: non_negative(id, "cyborgs", a2)?,
                    production: a3 as u8,
                    disabled: non_negative(id, "disabled", a4)?,
                }))
            }
            EntityKind::Troop => Ok(Entity::Troop(Troop {
                id,
                owner,
                source: non_negative(id, "source", a2)? as FactoryId,
                target: non_negative(id, "target", a3)? as FactoryId,
                cyborgs: non_negative(id, "cyborgs", a4)?,
                remaining_turns: non_negative(id, "remaining_turns", a5)?,
            })),
            EntityKind::Bomb => Ok(Entity::Bomb(Bomb {
                id,
                owner,
                source: non_negative(id, "source", a2)? as FactoryId,
                target: optional(id, "target", a3)?.map(|t| t as FactoryId),
                remaining_turns: optional(id, "remaining_turns", a4)?,
            })),
        }
    }

    /// Returns the kind tag of this entity.
    pub fn kind(&self) -> EntityKind {
        match self {
            Entity::Factory(_) => EntityKind::Factory,
            Entity::Troop(_) => EntityKind::Troop,
            Entity::Bomb(_) => EntityKind::Bomb,
        }
    }
}

fn non_negative(id: EntityId, field: &'static str, value: i32) -> Result<u32, EntityError> {
    u32::try_from(value).map_err(|_| EntityError::NegativeField { id, field, value })
}

/// `-1` means unknown; other negatives are malformed.
fn optional(id: EntityId, field: &'static str, value: i32) -> Result<Option<u32>, EntityError> {
    if value == -1 {
        Ok(None)
    } else {
        non_negative(id, field, value).map(Some)
    }
}
