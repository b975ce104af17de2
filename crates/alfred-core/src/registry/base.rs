//! Base registry trait and implementation.
//!
//! Provides the ordered, lock-guarded storage shared by `AgentRegistry` and
//! `ToolRegistry`.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Trait for items that can be stored in a registry.
///
/// Each registerable item must provide a unique ID.
pub trait Registerable: Send + Sync {
    /// Returns the unique identifier for this item.
    fn registry_id(&self) -> &str;
}

/// Returned when an id is already taken.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlreadyRegistered(pub String);

struct Entries<T: ?Sized> {
    items: HashMap<String, Arc<T>>,
    order: Vec<String>,
}

/// Generic registry for managing items by ID.
///
/// - Registration order is preserved and drives iteration order
/// - Writes take an exclusive lock; reads share it
/// - Registering an existing ID fails without touching the stored item
///
/// # Type Parameters
///
/// * `T` - The trait object type to store (e.g., `dyn Agent`, `dyn Tool`)
pub struct BaseRegistry<T: ?Sized + Registerable> {
    entries: RwLock<Entries<T>>,
}

impl<T: ?Sized + Registerable> BaseRegistry<T> {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(Entries {
                items: HashMap::new(),
                order: Vec::new(),
            }),
        }
    }

    /// Register an item.
    pub fn register(&self, item: Arc<T>) -> Result<(), AlreadyRegistered> {
        let id = item.registry_id().to_string();
        let mut entries = self.entries.write();

        if entries.items.contains_key(&id) {
            return Err(AlreadyRegistered(id));
        }

        entries.order.push(id.clone());
        entries.items.insert(id, item);
        Ok(())
    }

    /// Unregister an item by ID, returning it.
    ///
    /// Holders of the returned `Arc` (e.g. an in-flight dispatch) keep the
    /// item alive.
    pub fn unregister(&self, id: &str) -> Option<Arc<T>> {
        let mut entries = self.entries.write();
        let removed = entries.items.remove(id)?;
        entries.order.retain(|existing| existing != id);
        Some(removed)
    }

    /// Get an item by ID.
    pub fn get(&self, id: &str) -> Option<Arc<T>> {
        self.entries.read().items.get(id).cloned()
    }

    /// Check if an item with the given ID is registered.
    pub fn contains(&self, id: &str) -> bool {
        self.entries.read().items.contains_key(id)
    }

    /// List all registered item IDs in registration order.
    pub fn list_ids(&self) -> Vec<String> {
        self.entries.read().order.clone()
    }

    /// Get the number of registered items.
    pub fn len(&self) -> usize {
        self.entries.read().items.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.read().items.is_empty()
    }

    /// Snapshot of all items in registration order.
    pub fn snapshot(&self) -> Vec<Arc<T>> {
        let entries = self.entries.read();
        entries
            .order
            .iter()
            .filter_map(|id| entries.items.get(id).cloned())
            .collect()
    }
}

impl<T: ?Sized + Registerable> Default for BaseRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}
