//! compression/registry.rs
//! Named codec registry.
//!
//! Registration order is preserved and doubles as the benchmark tie-break
//! order: earlier registrations win equal scores.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::compression::codecs::{DeflateCodec, Lz4Codec, StoreCodec, ZstdCodec};
use crate::compression::constants::codec_names;
use crate::compression::types::Codec;

#[derive(Clone)]
pub struct RegistryEntry {
    pub name: String,
    pub codec: Arc<dyn Codec>,
    /// Admitted to the round-trip-guaranteed set.
    pub guaranteed: bool,
}

#[derive(Clone, Default)]
pub struct AlgorithmRegistry {
    entries: Vec<RegistryEntry>,
    index: HashMap<String, usize>,
}

impl AlgorithmRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// zstd, lz4, deflate, store, in that order.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(codec_names::ZSTD, Arc::new(ZstdCodec::new()));
        registry.register(codec_names::LZ4, Arc::new(Lz4Codec::new()));
        registry.register(codec_names::DEFLATE, Arc::new(DeflateCodec::new()));
        registry.register(codec_names::STORE, Arc::new(StoreCodec::new()));
        registry
    }

    /// Register a codec in the guaranteed set.
    ///
    /// Re-registering a name replaces the codec but keeps its original
    /// position in the tie-break order.
    pub fn register(&mut self, name: impl Into<String>, codec: Arc<dyn Codec>) {
        self.insert(name.into(), codec, true);
    }

    /// Register a codec that does not promise exact round-trips. It is never
    /// benchmarked and only runs when selected by name.
    pub fn register_experimental(&mut self, name: impl Into<String>, codec: Arc<dyn Codec>) {
        self.insert(name.into(), codec, false);
    }

    fn insert(&mut self, name: String, codec: Arc<dyn Codec>, guaranteed: bool) {
        debug!(codec = %name, guaranteed, "registering codec");
        match self.index.get(&name) {
            Some(&i) => {
                self.entries[i].codec = codec;
                self.entries[i].guaranteed = guaranteed;
            }
            None => {
                self.index.insert(name.clone(), self.entries.len());
                self.entries.push(RegistryEntry { name, codec, guaranteed });
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Codec>> {
        self.index.get(name).map(|&i| Arc::clone(&self.entries[i].codec))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn is_guaranteed(&self, name: &str) -> bool {
        self.index.get(name).map(|&i| self.entries[i].guaranteed).unwrap_or(false)
    }

    /// Registration position, used for tie-breaks.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// All names in registration order.
    pub fn list(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.name.clone()).collect()
    }

    /// Guaranteed entries in registration order.
    pub fn guaranteed(&self) -> impl Iterator<Item = &RegistryEntry> {
        self.entries.iter().filter(|e| e.guaranteed)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl std::fmt::Debug for AlgorithmRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.entries.iter().map(|e| (&e.name, e.guaranteed)))
            .finish()
    }
}
