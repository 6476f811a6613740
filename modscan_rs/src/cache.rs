//! Shared dependency cache: module identities mapped to discovered
//! descriptors, living for the scanner instance's lifetime.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// What defines a module on disk.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleKind {
    /// Built from source files named directly in an invocation.
    Source,
    /// Described by a `.mod` interface found in a search path.
    Interface,
    /// Intentionally excluded from resolution; stands in for a real module.
    Placeholder,
    /// Imported but not resolvable in the current search paths.
    External,
}

/// Identity of one module in the cache.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModuleId {
    pub name: String,
    pub kind: ModuleKind,
}

impl ModuleId {
    pub fn new(name: impl Into<String>, kind: ModuleKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

/// Discovered descriptor for one module.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleInfo {
    pub kind: ModuleKind,
    /// Defining file, when one was resolved.
    #[serde(default)]
    pub path: Option<String>,
    /// Direct dependency names, in discovery order.
    #[serde(default)]
    pub dependencies: Vec<String>,
}

/// Hit/miss/insert counters, observable by callers and tests.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub inserts: u64,
}

/// Mapping from module identity to discovered dependency info.
///
/// Owned by the scanner instance: empty at construction, mutated only while a
/// scan runs against it, never reset, and exposing no clear operation. There
/// is no internal locking; two scans against one cache must be serialized by
/// the caller.
#[derive(Debug, Default)]
pub struct DependencyCache {
    entries: HashMap<ModuleId, ModuleInfo>,
    stats: CacheStats,
}

impl DependencyCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look one identity up, counting the hit or miss.
    pub fn lookup(&mut self, id: &ModuleId) -> Option<&ModuleInfo> {
        if self.entries.contains_key(id) {
            self.stats.hits += 1;
            self.entries.get(id)
        } else {
            self.stats.misses += 1;
            None
        }
    }

    /// Look a module up by name alone, whatever kind it was recorded under.
    pub fn find_by_name(&mut self, name: &str) -> Option<&ModuleInfo> {
        const KINDS: [ModuleKind; 4] = [
            ModuleKind::Source,
            ModuleKind::Interface,
            ModuleKind::Placeholder,
            ModuleKind::External,
        ];
        for kind in KINDS {
            let id = ModuleId::new(name, kind);
            if self.entries.contains_key(&id) {
                self.stats.hits += 1;
                return self.entries.get(&id);
            }
        }
        self.stats.misses += 1;
        None
    }

    /// Insert or update one descriptor.
    pub fn record(&mut self, id: ModuleId, info: ModuleInfo) {
        self.stats.inserts += 1;
        self.entries.insert(id, info);
    }

    /// Whether any entry carries this module name. Does not touch the
    /// hit/miss counters.
    pub fn contains_name(&self, name: &str) -> bool {
        self.entries.keys().any(|id| id.name == name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    pub fn entries(&self) -> impl Iterator<Item = (&ModuleId, &ModuleInfo)> {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(kind: ModuleKind, deps: &[&str]) -> ModuleInfo {
        ModuleInfo {
            kind,
            path: None,
            dependencies: deps.iter().map(|d| d.to_string()).collect(),
        }
    }

    #[test]
    fn lookup_counts_hits_and_misses() {
        let mut cache = DependencyCache::new();
        let id = ModuleId::new("Core", ModuleKind::Interface);
        assert!(cache.lookup(&id).is_none());
        cache.record(id.clone(), info(ModuleKind::Interface, &["Base"]));
        assert!(cache.lookup(&id).is_some());
        let stats = cache.stats();
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.inserts, 1);
    }

    #[test]
    fn record_updates_an_existing_descriptor() {
        let mut cache = DependencyCache::new();
        let id = ModuleId::new("Core", ModuleKind::Interface);
        cache.record(id.clone(), info(ModuleKind::Interface, &[]));
        cache.record(id.clone(), info(ModuleKind::Interface, &["Base"]));
        assert_eq!(cache.len(), 1);
        assert_eq!(
            cache.lookup(&id).map(|i| i.dependencies.clone()),
            Some(vec!["Base".to_string()])
        );
    }

    #[test]
    fn find_by_name_matches_any_kind() {
        let mut cache = DependencyCache::new();
        cache.record(
            ModuleId::new("Stub", ModuleKind::Placeholder),
            info(ModuleKind::Placeholder, &[]),
        );
        let found = cache.find_by_name("Stub").cloned();
        assert_eq!(found.map(|i| i.kind), Some(ModuleKind::Placeholder));
        assert!(cache.find_by_name("Missing").is_none());
        assert!(cache.contains_name("Stub"));
        assert!(!cache.contains_name("Missing"));
    }
}
