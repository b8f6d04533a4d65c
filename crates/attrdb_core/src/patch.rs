//! Document merge-patch semantics for partial updates.

use attrdb_value::AttributeDocument;

/// The attributes portion of a partial entity update.
///
/// The three wire states must stay distinct: a field *omitted* from an
/// update is [`Untouched`], an explicit `null` is [`Wipe`], and a present
/// document, even an empty one, is [`Set`]. Collapsing them into one
/// "falsy" value miscodes the update semantics.
///
/// [`Untouched`]: AttributePatch::Untouched
/// [`Wipe`]: AttributePatch::Wipe
/// [`Set`]: AttributePatch::Set
#[derive(Debug, Clone, PartialEq)]
pub enum AttributePatch {
    /// The update did not touch the attributes field.
    Untouched,
    /// Explicit wipe request: the stored document becomes unset.
    Wipe,
    /// A syntactically present document. Empty resets the stored
    /// document; non-empty merges key-wise into it.
    Set(AttributeDocument),
}

impl AttributePatch {
    /// Builds a `Set` patch from `(name, value)` pairs.
    pub fn set<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (String, attrdb_value::Value)>,
    {
        AttributePatch::Set(entries.into_iter().collect())
    }

    /// Applies this patch to a previous document. See [`merge`].
    #[must_use]
    pub fn apply(&self, previous: Option<&AttributeDocument>) -> Option<AttributeDocument> {
        merge(previous, self)
    }
}

/// Computes the new stored document for an update.
///
/// Total over its domain; `None` is the unset state on both sides.
///
/// - `Untouched` leaves `previous` as it is.
/// - `Wipe` unsets the document.
/// - An explicitly empty `Set` resets to an empty document, discarding
///   every previously stored key. This is a full reset, not a no-op.
/// - A non-empty `Set` is the key-wise union of `previous` and the
///   incoming document; every incoming key replaces the stored key's
///   entire value (structured values included; there is no recursive
///   merge inside a single key), and keys only in `previous` survive
///   unchanged.
#[must_use]
pub fn merge(
    previous: Option<&AttributeDocument>,
    patch: &AttributePatch,
) -> Option<AttributeDocument> {
    match patch {
        AttributePatch::Untouched => previous.cloned(),
        AttributePatch::Wipe => None,
        AttributePatch::Set(incoming) if incoming.is_empty() => Some(AttributeDocument::new()),
        AttributePatch::Set(incoming) => {
            let mut merged = previous.cloned().unwrap_or_default();
            for (name, value) in incoming {
                merged.insert(name.clone(), value.clone());
            }
            Some(merged)
        }
    }
}
