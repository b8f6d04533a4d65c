//! Criteria types and the attribute query translator.
//!
//! The surrounding search framework hands filters and sortings down as
//! `(field, literal)` / `(field, direction)` tuples keyed by
//! `attributes.<name>`. The translator resolves the field to an atomic
//! attribute name, consults the registry for the declared type and
//! evaluates against a candidate's **resolved view**, never the raw
//! document, so a child inheriting a matching value through its parent
//! is matched even when the key is absent from its own document.

use crate::compare::{self, SortKey};
use crate::error::{CoreError, CoreResult};
use crate::schema::AttributeRegistry;
use attrdb_value::{AttributeDocument, Value};

/// Prefix that addresses the attribute document in criteria fields.
pub const ATTRIBUTES_PREFIX: &str = "attributes.";

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Smallest key first.
    Ascending,
    /// Largest key first.
    Descending,
}

/// Equality filter on an attribute field.
#[derive(Debug, Clone, PartialEq)]
pub struct EqualsFilter {
    /// Field reference, e.g. `attributes.color`.
    pub field: String,
    /// Literal to compare against, coerced per the declared type.
    pub value: Value,
}

impl EqualsFilter {
    /// Creates a new equality filter.
    pub fn new(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }
}

/// Sort request on an attribute field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSorting {
    /// Field reference, e.g. `attributes.stock`.
    pub field: String,
    /// Sort direction.
    pub direction: Direction,
}

impl FieldSorting {
    /// Creates a new sorting.
    pub fn new(field: impl Into<String>, direction: Direction) -> Self {
        Self {
            field: field.into(),
            direction,
        }
    }
}

/// A search request: equality filters (AND-combined) plus sortings
/// applied in order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Criteria {
    /// Filters; a candidate must satisfy every one.
    pub filters: Vec<EqualsFilter>,
    /// Sortings, most significant first.
    pub sortings: Vec<FieldSorting>,
}

impl Criteria {
    /// Creates empty criteria.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an equality filter.
    #[must_use]
    pub fn filter(mut self, filter: EqualsFilter) -> Self {
        self.filters.push(filter);
        self
    }

    /// Adds a sorting.
    #[must_use]
    pub fn sort(mut self, sorting: FieldSorting) -> Self {
        self.sortings.push(sorting);
        self
    }
}

/// Resolves a criteria field to an atomic attribute name.
///
/// The field must start with `attributes.`. The remainder is either a
/// plain name, or a quoted name `"..."` when the name itself contains a
/// `.`; the quotes mark the dot as part of the key rather than a path
/// separator. An unquoted remainder containing `.` is rejected: nested
/// paths into attribute values are not addressable.
///
/// # Errors
///
/// Returns [`CoreError::InvalidField`] for a missing prefix, an empty
/// name, unbalanced quotes, or an unquoted dotted name.
pub fn attribute_name(field: &str) -> CoreResult<&str> {
    let Some(rest) = field.strip_prefix(ATTRIBUTES_PREFIX) else {
        return Err(CoreError::invalid_field(
            field,
            format!("expected '{ATTRIBUTES_PREFIX}<name>'"),
        ));
    };

    if let Some(quoted) = rest.strip_prefix('"') {
        let Some(name) = quoted.strip_suffix('"') else {
            return Err(CoreError::invalid_field(field, "unbalanced quotes"));
        };
        if name.is_empty() || name.contains('"') {
            return Err(CoreError::invalid_field(field, "malformed quoted name"));
        }
        return Ok(name);
    }

    if rest.is_empty() {
        return Err(CoreError::invalid_field(field, "empty attribute name"));
    }
    if rest.contains('.') {
        return Err(CoreError::invalid_field(
            field,
            "nested paths are not supported; quote the name if the dot is part of it",
        ));
    }
    if rest.contains('"') {
        return Err(CoreError::invalid_field(field, "stray quote in name"));
    }
    Ok(rest)
}

/// Evaluates attribute filters and sortings against resolved views.
pub struct QueryTranslator<'a> {
    registry: &'a AttributeRegistry,
}

impl<'a> QueryTranslator<'a> {
    /// Creates a translator over `registry`.
    #[must_use]
    pub fn new(registry: &'a AttributeRegistry) -> Self {
        Self { registry }
    }

    /// Tests a candidate's resolved view against an equality filter.
    ///
    /// `view` must be the candidate's resolved document; passing the raw
    /// document here silently under-matches children that inherit the
    /// value from their parent.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidField`] for a malformed field and
    /// [`CoreError::TypeMismatch`] for an uncoercible literal.
    pub fn matches(
        &self,
        filter: &EqualsFilter,
        view: Option<&AttributeDocument>,
    ) -> CoreResult<bool> {
        let name = attribute_name(&filter.field)?;
        let declared = self.registry.type_of(name);
        let stored = view.and_then(|document| document.get(name));
        compare::values_equal(name, declared, stored, &filter.value)
    }

    /// Produces the candidate's comparable key for a sorting.
    ///
    /// `None` means the candidate has no ordering position for this key
    /// (key absent, explicit null, or an uncoercible stored value); the
    /// caller orders such candidates last.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidField`] for a malformed field and
    /// [`CoreError::UnknownAttribute`] when the name has no registry
    /// entry, since no ordering can be defined for an opaque attribute.
    pub fn sort_key(
        &self,
        sorting: &FieldSorting,
        view: Option<&AttributeDocument>,
    ) -> CoreResult<Option<SortKey>> {
        let name = attribute_name(&sorting.field)?;
        let declared = self
            .registry
            .type_of(name)
            .ok_or_else(|| CoreError::unknown_attribute(name))?;
        Ok(view
            .and_then(|document| document.get(name))
            .and_then(|value| compare::sort_key(declared, value)))
    }
}
