//! Error types for AttrDB core.

use crate::entity::EntityId;
use crate::schema::AttributeType;
use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in AttrDB core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Document codec error.
    #[error("value error: {0}")]
    Value(#[from] attrdb_value::ValueError),

    /// A filter or sort literal cannot be coerced to the attribute's
    /// declared type. Aborts the single query that supplied the literal.
    #[error("cannot coerce {literal} to {expected} for attribute '{attribute}'")]
    TypeMismatch {
        /// The attribute being filtered or sorted.
        attribute: String,
        /// The attribute's declared type.
        expected: AttributeType,
        /// Rendering of the offending literal.
        literal: String,
    },

    /// A sort referenced an attribute with no registry entry, so no
    /// ordering can be defined.
    #[error("unknown attribute '{name}' cannot be sorted")]
    UnknownAttribute {
        /// The unregistered attribute name.
        name: String,
    },

    /// A criteria field did not resolve to an attribute name.
    #[error("invalid attribute field '{field}': {message}")]
    InvalidField {
        /// The field string as supplied by the caller.
        field: String,
        /// Why it was rejected.
        message: String,
    },

    /// Entity not found in storage.
    #[error("entity not found: {entity_id}")]
    EntityNotFound {
        /// The entity ID that was not found.
        entity_id: EntityId,
    },
}

impl CoreError {
    /// Creates a type mismatch error.
    pub fn type_mismatch(
        attribute: impl Into<String>,
        expected: AttributeType,
        literal: impl Into<String>,
    ) -> Self {
        Self::TypeMismatch {
            attribute: attribute.into(),
            expected,
            literal: literal.into(),
        }
    }

    /// Creates an unknown attribute error.
    pub fn unknown_attribute(name: impl Into<String>) -> Self {
        Self::UnknownAttribute { name: name.into() }
    }

    /// Creates an invalid field error.
    pub fn invalid_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidField {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Creates an entity not found error.
    pub fn entity_not_found(entity_id: EntityId) -> Self {
        Self::EntityNotFound { entity_id }
    }
}
