//! # AttrDB Value
//!
//! Tagged attribute values and documents for AttrDB.
//!
//! This crate provides:
//! - [`Value`], the dynamic value union stored under attribute keys
//! - [`AttributeDocument`], the flat name-to-value mapping persisted as a
//!   single semi-structured column per entity
//! - A canonical JSON codec ([`to_canonical_json`] / [`from_json`]) for
//!   that column
//!
//! ## Canonical JSON rules
//!
//! - Object keys are emitted in sorted order
//! - Timestamps are rendered in one fixed RFC 3339 form (UTC, microseconds)
//! - No insignificant whitespace
//!
//! ## Usage
//!
//! ```
//! use attrdb_value::{from_json, to_canonical_json, AttributeDocument, Value};
//!
//! let mut doc = AttributeDocument::new();
//! doc.insert("color", "red");
//! doc.insert("stock", 42i64);
//!
//! let json = to_canonical_json(&doc).unwrap();
//! assert_eq!(json, r#"{"color":"red","stock":42}"#);
//!
//! let decoded = from_json(&json).unwrap();
//! assert_eq!(decoded, doc);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod document;
mod error;
mod json;
mod value;

pub use document::AttributeDocument;
pub use error::{ValueError, ValueResult};
pub use json::{from_json, to_canonical_json};
pub use value::Value;
