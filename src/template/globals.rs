//! Global registry shared by every render of an engine

use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::RwLock;

use crate::value::{Map, Value};

static PROCESS: Lazy<Globals> = Lazy::new(Globals::new);

/// Cloneable handle to a name -> value registry
///
/// Registration is additive and last-write-wins. Renders read a snapshot
/// at render time, so values registered after a [`Template`] was created
/// are still visible to it.
///
/// [`Template`]: super::Template
#[derive(Debug, Clone, Default)]
pub struct Globals {
    values: Arc<RwLock<Map>>,
}

impl Globals {
    /// Fresh, empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide registry behind `Template::add_global`
    pub fn process() -> Self {
        PROCESS.clone()
    }

    pub fn set(
        &self,
        name: &str,
        value: impl Into<Value>,
    ) {
        self.values.write().insert(name.to_string(), value.into());
    }

    pub fn get(
        &self,
        name: &str,
    ) -> Option<Value> {
        self.values.read().get(name).cloned()
    }

    pub fn contains(
        &self,
        name: &str,
    ) -> bool {
        self.values.read().contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.read().is_empty()
    }

    /// Copy of the current entries
    pub fn snapshot(&self) -> Map {
        self.values.read().clone()
    }
}
