//! Attribute schema: declared types and the process-wide registry.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;

/// Declared type of an attribute.
///
/// The tag governs coercion and comparison for the attribute's top-level
/// value everywhere downstream. Values nested inside a [`Json`] attribute
/// are never interpreted further.
///
/// [`Json`]: AttributeType::Json
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeType {
    /// Text, compared case-insensitively.
    Text,
    /// Signed integer.
    Integer,
    /// Double-precision float.
    Float,
    /// Two-valued boolean.
    Boolean,
    /// An instant in time (date and time of day, sub-second precision).
    DateTime,
    /// Arbitrary structured value, compared structurally.
    Json,
}

impl AttributeType {
    /// Stable lowercase name for this type.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            AttributeType::Text => "text",
            AttributeType::Integer => "int",
            AttributeType::Float => "float",
            AttributeType::Boolean => "bool",
            AttributeType::DateTime => "datetime",
            AttributeType::Json => "json",
        }
    }
}

impl fmt::Display for AttributeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named attribute declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeDefinition {
    /// Attribute name. May contain `.`, which is part of the key.
    pub name: String,
    /// Declared type.
    pub ty: AttributeType,
}

impl AttributeDefinition {
    /// Creates a new definition.
    pub fn new(name: impl Into<String>, ty: AttributeType) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

/// Supplies attribute definitions at startup.
///
/// The registry does not persist schema itself; a provider is the bridge
/// to wherever definitions live (a table, a config file, a test fixture).
pub trait SchemaProvider: Send + Sync {
    /// Returns every known attribute definition.
    fn load(&self) -> Vec<AttributeDefinition>;
}

impl SchemaProvider for Vec<AttributeDefinition> {
    fn load(&self) -> Vec<AttributeDefinition> {
        self.clone()
    }
}

/// Maps attribute names to their declared types.
///
/// The registry is a read-mostly cache: definitions load once from the
/// provider on first use, and [`register`] extends the cache without
/// touching stored data. Readers may query concurrently; registration
/// takes the write lock.
///
/// An unregistered name is *opaque*: `type_of` returns `None` and every
/// downstream consumer falls back to raw structural equality for it.
///
/// [`register`]: AttributeRegistry::register
pub struct AttributeRegistry {
    provider: Option<Box<dyn SchemaProvider>>,
    /// `None` until the first lookup or registration loads the provider.
    cache: RwLock<Option<HashMap<String, AttributeType>>>,
}

impl AttributeRegistry {
    /// Creates an empty registry with no provider.
    #[must_use]
    pub fn new() -> Self {
        Self {
            provider: None,
            cache: RwLock::new(None),
        }
    }

    /// Creates a registry that lazily loads definitions from `provider`.
    #[must_use]
    pub fn with_provider(provider: Box<dyn SchemaProvider>) -> Self {
        Self {
            provider: Some(provider),
            cache: RwLock::new(None),
        }
    }

    /// Registers an attribute, extending the cache.
    ///
    /// Idempotent for a repeated `(name, type)` pair. Re-registering a
    /// name under a *different* type replaces the previous tag (last
    /// registration wins) and leaves stored documents untouched.
    pub fn register(&self, definition: AttributeDefinition) {
        let mut cache = self.cache.write();
        let entries = cache.get_or_insert_with(|| Self::load_from(self.provider.as_deref()));

        if let Some(previous) = entries.get(&definition.name) {
            if *previous != definition.ty {
                tracing::warn!(
                    attribute = %definition.name,
                    previous = %previous,
                    new = %definition.ty,
                    "attribute re-registered under a different type"
                );
            }
        }
        entries.insert(definition.name, definition.ty);
    }

    /// Returns the declared type of `name`, or `None` for opaque names.
    #[must_use]
    pub fn type_of(&self, name: &str) -> Option<AttributeType> {
        self.ensure_loaded();
        self.cache
            .read()
            .as_ref()
            .and_then(|entries| entries.get(name).copied())
    }

    /// Returns true if `name` has a registry entry.
    #[must_use]
    pub fn is_registered(&self, name: &str) -> bool {
        self.type_of(name).is_some()
    }

    /// Returns all current definitions, in name order.
    #[must_use]
    pub fn definitions(&self) -> Vec<AttributeDefinition> {
        self.ensure_loaded();
        let cache = self.cache.read();
        let mut definitions: Vec<AttributeDefinition> = cache
            .as_ref()
            .map(|entries| {
                entries
                    .iter()
                    .map(|(name, ty)| AttributeDefinition::new(name.clone(), *ty))
                    .collect()
            })
            .unwrap_or_default();
        definitions.sort_by(|a, b| a.name.cmp(&b.name));
        definitions
    }

    /// Discards the cache; the next lookup reloads from the provider.
    ///
    /// Registrations made through [`register`] since the last load are
    /// dropped along with the cache.
    ///
    /// [`register`]: AttributeRegistry::register
    pub fn invalidate(&self) {
        *self.cache.write() = None;
    }

    fn ensure_loaded(&self) {
        {
            if self.cache.read().is_some() {
                return;
            }
        }
        let mut cache = self.cache.write();
        if cache.is_none() {
            *cache = Some(Self::load_from(self.provider.as_deref()));
        }
    }

    fn load_from(provider: Option<&dyn SchemaProvider>) -> HashMap<String, AttributeType> {
        let definitions = provider.map(SchemaProvider::load).unwrap_or_default();
        tracing::debug!(count = definitions.len(), "attribute schema loaded");
        definitions
            .into_iter()
            .map(|definition| (definition.name, definition.ty))
            .collect()
    }
}

impl Default for AttributeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for AttributeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttributeRegistry")
            .field("loaded", &self.cache.read().is_some())
            .finish_non_exhaustive()
    }
}
