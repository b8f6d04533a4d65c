//! Storage collaborator boundary and the in-memory implementation.

use crate::entity::{Entity, EntityId};
use crate::error::{CoreError, CoreResult};
use attrdb_value::AttributeDocument;
use parking_lot::RwLock;
use std::collections::HashMap;

/// The storage collaborator contract.
///
/// The attribute core never issues storage queries itself; it consumes
/// this narrow interface. Implementations own transactionality: the core
/// assumes a read-merge-write cycle for one entity runs inside a
/// single-writer scope and never attempts to coordinate concurrent
/// writers itself.
pub trait AttributeStorage: Send + Sync {
    /// Returns the entity's own document, or `None` if unset.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::EntityNotFound`] for unknown ids.
    fn fetch_own(&self, id: EntityId) -> CoreResult<Option<AttributeDocument>>;

    /// Returns the entity's direct parent id, if it has one.
    ///
    /// Chains are depth one for view computation: the caller fetches the
    /// parent's own document via [`fetch_own`], never the grandparent's.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::EntityNotFound`] for unknown ids.
    ///
    /// [`fetch_own`]: AttributeStorage::fetch_own
    fn parent_of(&self, id: EntityId) -> CoreResult<Option<EntityId>>;

    /// Replaces the entity's own document. `None` stores the unset state.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::EntityNotFound`] for unknown ids.
    fn write_own(&self, id: EntityId, attributes: Option<AttributeDocument>) -> CoreResult<()>;

    /// Returns every entity id in a stable order.
    ///
    /// The order is the tie-break order for sorted queries; for the
    /// in-memory store it is insertion order.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot enumerate ids.
    fn entity_ids(&self) -> CoreResult<Vec<EntityId>>;
}

#[derive(Debug, Clone)]
struct StoredEntity {
    parent_id: Option<EntityId>,
    attributes: Option<AttributeDocument>,
}

#[derive(Debug, Default)]
struct StoreInner {
    /// Insertion order, the stable enumeration order.
    order: Vec<EntityId>,
    entities: HashMap<EntityId, StoredEntity>,
}

/// An in-memory entity store.
///
/// Suitable for unit tests, integration tests and ephemeral use. A
/// coarse write lock provides the single-writer guarantee the core
/// expects from its storage collaborator.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    inner: RwLock<StoreInner>,
}

impl InMemoryStore {
    /// Creates a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts an entity, replacing any previous row with the same id.
    pub fn insert(&self, entity: Entity) {
        let mut inner = self.inner.write();
        if !inner.entities.contains_key(&entity.id) {
            inner.order.push(entity.id);
        }
        inner.entities.insert(
            entity.id,
            StoredEntity {
                parent_id: entity.parent_id,
                attributes: entity.attributes,
            },
        );
    }

    /// Returns true if the store contains `id`.
    #[must_use]
    pub fn contains(&self, id: EntityId) -> bool {
        self.inner.read().entities.contains_key(&id)
    }

    /// Number of entities in the store.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.read().entities.len()
    }

    /// Returns true if the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl AttributeStorage for InMemoryStore {
    fn fetch_own(&self, id: EntityId) -> CoreResult<Option<AttributeDocument>> {
        let inner = self.inner.read();
        inner
            .entities
            .get(&id)
            .map(|entity| entity.attributes.clone())
            .ok_or_else(|| CoreError::entity_not_found(id))
    }

    fn parent_of(&self, id: EntityId) -> CoreResult<Option<EntityId>> {
        let inner = self.inner.read();
        inner
            .entities
            .get(&id)
            .map(|entity| entity.parent_id)
            .ok_or_else(|| CoreError::entity_not_found(id))
    }

    fn write_own(&self, id: EntityId, attributes: Option<AttributeDocument>) -> CoreResult<()> {
        let mut inner = self.inner.write();
        match inner.entities.get_mut(&id) {
            Some(entity) => {
                entity.attributes = attributes;
                Ok(())
            }
            None => Err(CoreError::entity_not_found(id)),
        }
    }

    fn entity_ids(&self) -> CoreResult<Vec<EntityId>> {
        Ok(self.inner.read().order.clone())
    }
}
