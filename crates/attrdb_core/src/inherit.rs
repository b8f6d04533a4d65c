//! Inheritance resolution: raw documents vs the resolved view.

use attrdb_value::AttributeDocument;

/// Computes the effective document a reader observes for a child entity.
///
/// `own` is the child's raw document, `parent` the direct parent's raw
/// document (not further merged; chains are depth one for view
/// computation). Stored documents are never mutated to bake inherited
/// values in; the view is always recomputed from `(own, parent)`, so a
/// parent update is immediately visible to every child.
///
/// - `own` unset: the view is the parent's document, fully inherited.
/// - `own` present (even empty): the key-wise union of `parent` and
///   `own`, with `own` winning on key conflicts (whole-value
///   replacement, as in a merge patch).
/// - A root entity (`parent` unset) sees its own document unchanged.
#[must_use]
pub fn resolve_view(
    own: Option<&AttributeDocument>,
    parent: Option<&AttributeDocument>,
) -> Option<AttributeDocument> {
    match own {
        None => parent.cloned(),
        Some(own) => {
            let mut view = parent.cloned().unwrap_or_default();
            for (name, value) in own {
                view.insert(name.clone(), value.clone());
            }
            Some(view)
        }
    }
}
