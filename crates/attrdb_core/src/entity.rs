//! Entity identity and the entity record shape.

use attrdb_value::AttributeDocument;
use std::fmt;
use uuid::Uuid;

/// Unique identifier for an entity.
///
/// Entity IDs are UUIDs: globally unique, immutable once assigned,
/// never reused.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntityId(Uuid);

impl EntityId {
    /// Creates a new random entity ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates an entity ID from a UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityId({})", self.0)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for EntityId {
    fn from(uuid: Uuid) -> Self {
        Self::from_uuid(uuid)
    }
}

impl From<EntityId> for Uuid {
    fn from(id: EntityId) -> Self {
        id.0
    }
}

/// An entity row as the attribute subsystem sees it.
///
/// `attributes` is the entity's *own* document; `None` is the unset
/// state, distinct from a present-but-empty document. `parent_id`, when
/// present, references exactly one other entity of the same kind.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    /// Unique identifier.
    pub id: EntityId,
    /// Direct parent, if this entity inherits.
    pub parent_id: Option<EntityId>,
    /// Own attribute document, unset until first written.
    pub attributes: Option<AttributeDocument>,
}

impl Entity {
    /// Creates a root entity with an unset document.
    #[must_use]
    pub fn new(id: EntityId) -> Self {
        Self {
            id,
            parent_id: None,
            attributes: None,
        }
    }

    /// Sets the parent reference.
    #[must_use]
    pub fn with_parent(mut self, parent_id: EntityId) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    /// Sets the own attribute document.
    #[must_use]
    pub fn with_attributes(mut self, attributes: AttributeDocument) -> Self {
        self.attributes = Some(attributes);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_is_unique() {
        assert_ne!(EntityId::new(), EntityId::new());
    }

    #[test]
    fn uuid_conversion() {
        let uuid = Uuid::new_v4();
        let id = EntityId::from_uuid(uuid);
        assert_eq!(id.as_uuid(), uuid);
        assert_eq!(Uuid::from(id), uuid);
        assert_eq!(EntityId::from(uuid), id);
    }

    #[test]
    fn display() {
        let id = EntityId::new();
        assert!(!format!("{id}").is_empty());
    }

    #[test]
    fn builder() {
        let parent = EntityId::new();
        let entity = Entity::new(EntityId::new())
            .with_parent(parent)
            .with_attributes(AttributeDocument::new());

        assert_eq!(entity.parent_id, Some(parent));
        assert_eq!(entity.attributes, Some(AttributeDocument::new()));
    }

    #[test]
    fn new_entity_document_is_unset() {
        let entity = Entity::new(EntityId::new());
        assert_eq!(entity.attributes, None);
    }
}
