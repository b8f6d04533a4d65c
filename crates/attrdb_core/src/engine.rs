//! Engine facade over storage, registry and the pure transformations.

use crate::compare::SortKey;
use crate::entity::EntityId;
use crate::error::CoreResult;
use crate::inherit::resolve_view;
use crate::patch::{merge, AttributePatch};
use crate::query::{Criteria, Direction, QueryTranslator};
use crate::schema::AttributeRegistry;
use crate::store::AttributeStorage;
use attrdb_value::AttributeDocument;
use std::cmp::Ordering;

/// The narrow contract the surrounding repository framework consumes.
///
/// Reads go through [`view`] (inheritance resolved) or [`raw`]
/// (own document untouched); writes go through [`apply`] (merge patch);
/// queries go through [`search`], which evaluates every candidate
/// against its resolved view.
///
/// [`view`]: AttributeEngine::view
/// [`raw`]: AttributeEngine::raw
/// [`apply`]: AttributeEngine::apply
/// [`search`]: AttributeEngine::search
#[derive(Debug)]
pub struct AttributeEngine<S: AttributeStorage> {
    storage: S,
    registry: AttributeRegistry,
}

impl<S: AttributeStorage> AttributeEngine<S> {
    /// Creates an engine over `storage` and `registry`.
    pub fn new(storage: S, registry: AttributeRegistry) -> Self {
        Self { storage, registry }
    }

    /// The attribute registry.
    pub fn registry(&self) -> &AttributeRegistry {
        &self.registry
    }

    /// The underlying storage collaborator.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Returns the entity's own document, bypassing inheritance.
    ///
    /// # Errors
    ///
    /// Propagates storage errors.
    pub fn raw(&self, id: EntityId) -> CoreResult<Option<AttributeDocument>> {
        self.storage.fetch_own(id)
    }

    /// Returns the entity's resolved view document.
    ///
    /// The view folds the direct parent's own document under the
    /// entity's own document; it is computed on every read, so a parent
    /// update is immediately visible to all children.
    ///
    /// # Errors
    ///
    /// Propagates storage errors.
    pub fn view(&self, id: EntityId) -> CoreResult<Option<AttributeDocument>> {
        let own = self.storage.fetch_own(id)?;
        let parent = match self.storage.parent_of(id)? {
            Some(parent_id) => self.storage.fetch_own(parent_id)?,
            None => None,
        };
        Ok(resolve_view(own.as_ref(), parent.as_ref()))
    }

    /// Applies a merge patch to the entity's own document.
    ///
    /// Reads the previous document, merges per the patch semantics and
    /// writes the result back. The storage collaborator is expected to
    /// run this inside a single-writer scope per entity; the merge
    /// itself has no partial-application state. Returns the stored
    /// result.
    ///
    /// # Errors
    ///
    /// Propagates storage errors.
    pub fn apply(
        &self,
        id: EntityId,
        patch: &AttributePatch,
    ) -> CoreResult<Option<AttributeDocument>> {
        let previous = self.storage.fetch_own(id)?;
        let next = merge(previous.as_ref(), patch);
        self.storage.write_own(id, next.clone())?;
        Ok(next)
    }

    /// Runs a criteria search over all entities.
    ///
    /// Filters are AND-combined and evaluated against each candidate's
    /// resolved view, so children match values inherited through their
    /// parent. Sorting is stable: ties keep the storage enumeration
    /// order, and candidates without an ordering position for a key go
    /// last regardless of direction.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::TypeMismatch`] for an uncoercible filter
    /// literal, [`CoreError::UnknownAttribute`] for a sort on an
    /// unregistered name, [`CoreError::InvalidField`] for malformed
    /// fields, and propagates storage errors. Criteria are validated
    /// before any candidate is examined, so these errors do not depend
    /// on store contents.
    ///
    /// [`CoreError::TypeMismatch`]: crate::CoreError::TypeMismatch
    /// [`CoreError::UnknownAttribute`]: crate::CoreError::UnknownAttribute
    /// [`CoreError::InvalidField`]: crate::CoreError::InvalidField
    pub fn search(&self, criteria: &Criteria) -> CoreResult<Vec<EntityId>> {
        let translator = QueryTranslator::new(&self.registry);
        self.validate(&translator, criteria)?;

        let mut rows: Vec<(EntityId, Option<AttributeDocument>)> = Vec::new();
        'candidates: for id in self.storage.entity_ids()? {
            let view = self.view(id)?;
            for filter in &criteria.filters {
                if !translator.matches(filter, view.as_ref())? {
                    continue 'candidates;
                }
            }
            rows.push((id, view));
        }

        if criteria.sortings.is_empty() {
            return Ok(rows.into_iter().map(|(id, _)| id).collect());
        }

        let mut keyed: Vec<(EntityId, Vec<Option<SortKey>>)> = Vec::with_capacity(rows.len());
        for (id, view) in rows {
            let keys = criteria
                .sortings
                .iter()
                .map(|sorting| translator.sort_key(sorting, view.as_ref()))
                .collect::<CoreResult<Vec<_>>>()?;
            keyed.push((id, keys));
        }

        keyed.sort_by(|(_, a), (_, b)| {
            for (index, sorting) in criteria.sortings.iter().enumerate() {
                let ord = compare_positions(&a[index], &b[index], sorting.direction);
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            Ordering::Equal
        });

        Ok(keyed.into_iter().map(|(id, _)| id).collect())
    }

    /// Checks fields, literals and sort attributes up front.
    fn validate(&self, translator: &QueryTranslator<'_>, criteria: &Criteria) -> CoreResult<()> {
        for filter in &criteria.filters {
            // Evaluating against an absent view exercises exactly the
            // field parsing and literal coercion paths.
            translator.matches(filter, None)?;
        }
        for sorting in &criteria.sortings {
            translator.sort_key(sorting, None)?;
        }
        Ok(())
    }
}

/// Orders two optional sort keys. Missing positions go last for both
/// directions; only present pairs honor the direction.
fn compare_positions(
    a: &Option<SortKey>,
    b: &Option<SortKey>,
    direction: Direction,
) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => match direction {
            Direction::Ascending => a.cmp(b),
            Direction::Descending => b.cmp(a),
        },
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Entity;
    use crate::query::EqualsFilter;
    use crate::query::FieldSorting;
    use crate::schema::{AttributeDefinition, AttributeType};
    use crate::store::InMemoryStore;
    use crate::CoreError;
    use attrdb_value::Value;

    fn engine() -> AttributeEngine<InMemoryStore> {
        AttributeEngine::new(InMemoryStore::new(), AttributeRegistry::new())
    }

    fn doc(entries: &[(&str, Value)]) -> AttributeDocument {
        entries
            .iter()
            .map(|(k, v)| ((*k).to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn raw_bypasses_inheritance() {
        let engine = engine();
        let parent = EntityId::new();
        let child = EntityId::new();

        engine
            .storage()
            .insert(Entity::new(parent).with_attributes(doc(&[("foo", Value::from("bar"))])));
        engine.storage().insert(Entity::new(child).with_parent(parent));

        assert_eq!(engine.raw(child).unwrap(), None);
        assert_eq!(
            engine.view(child).unwrap(),
            Some(doc(&[("foo", Value::from("bar"))]))
        );
    }

    #[test]
    fn apply_merges_and_stores() {
        let engine = engine();
        let id = EntityId::new();
        engine
            .storage()
            .insert(Entity::new(id).with_attributes(doc(&[("foo", Value::from("bar"))])));

        let stored = engine
            .apply(id, &AttributePatch::Set(doc(&[("baz", Value::from("asdf"))])))
            .unwrap()
            .unwrap();

        assert_eq!(stored.get("foo"), Some(&Value::from("bar")));
        assert_eq!(stored.get("baz"), Some(&Value::from("asdf")));
        assert_eq!(engine.raw(id).unwrap(), Some(stored));
    }

    #[test]
    fn search_validates_before_scanning() {
        // Empty store: a bad literal still fails the query.
        let engine = engine();
        engine
            .registry()
            .register(AttributeDefinition::new("n", AttributeType::Integer));

        let criteria = Criteria::new().filter(EqualsFilter::new("attributes.n", "ten"));
        assert!(matches!(
            engine.search(&criteria),
            Err(CoreError::TypeMismatch { .. })
        ));

        let criteria =
            Criteria::new().sort(FieldSorting::new("attributes.free", Direction::Ascending));
        assert!(matches!(
            engine.search(&criteria),
            Err(CoreError::UnknownAttribute { .. })
        ));
    }

    #[test]
    fn unfiltered_search_returns_storage_order() {
        let engine = engine();
        let ids: Vec<EntityId> = (0..3).map(|_| EntityId::new()).collect();
        for id in &ids {
            engine.storage().insert(Entity::new(*id));
        }

        assert_eq!(engine.search(&Criteria::new()).unwrap(), ids);
    }

    #[test]
    fn missing_sort_keys_go_last_in_both_directions() {
        let engine = engine();
        engine
            .registry()
            .register(AttributeDefinition::new("n", AttributeType::Integer));

        let keyed = EntityId::new();
        let bare = EntityId::new();
        engine.storage().insert(Entity::new(bare));
        engine
            .storage()
            .insert(Entity::new(keyed).with_attributes(doc(&[("n", Value::Integer(1))])));

        for direction in [Direction::Ascending, Direction::Descending] {
            let criteria = Criteria::new().sort(FieldSorting::new("attributes.n", direction));
            assert_eq!(engine.search(&criteria).unwrap(), vec![keyed, bare]);
        }
    }
}
