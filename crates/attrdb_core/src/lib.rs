//! # AttrDB Core
//!
//! Dynamic-schema attribute subsystem for AttrDB.
//!
//! Callers declare arbitrarily named, typed attributes at runtime; each
//! entity stores them as one semi-structured document, and a criteria
//! query engine sees them as if they were first-class typed columns,
//! including under parent/child inheritance.
//!
//! This crate provides:
//! - [`AttributeRegistry`] mapping attribute names to declared types
//! - Type-aware value coercion and comparison ([`compare`])
//! - Merge-patch semantics for partial document updates ([`AttributePatch`])
//! - Inheritance resolution into a read-side view ([`resolve_view`])
//! - A query translator evaluating filters and sortings against
//!   resolved views ([`QueryTranslator`])
//! - The storage collaborator boundary ([`AttributeStorage`]) with an
//!   in-memory implementation, and the [`AttributeEngine`] facade
//!
//! Everything here is a pure, synchronous transformation over already
//! fetched documents; transactionality and durability belong to the
//! storage collaborator.

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod compare;
mod engine;
mod entity;
mod error;
mod inherit;
mod patch;
pub mod query;
mod schema;
mod store;

pub use engine::AttributeEngine;
pub use entity::{Entity, EntityId};
pub use error::{CoreError, CoreResult};
pub use inherit::resolve_view;
pub use patch::{merge, AttributePatch};
pub use query::{Criteria, Direction, EqualsFilter, FieldSorting, QueryTranslator};
pub use schema::{AttributeDefinition, AttributeRegistry, AttributeType, SchemaProvider};
pub use store::{AttributeStorage, InMemoryStore};

// The document and value types are re-exported so most consumers only
// need this crate.
pub use attrdb_value::{AttributeDocument, Value};
