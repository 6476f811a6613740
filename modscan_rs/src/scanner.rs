//! The scan orchestrator: tokenizer, context factory, cache, and engine
//! composed into the two public scan operations.

use std::collections::HashSet;

use crate::cache::{CacheStats, DependencyCache};
use crate::context::CompilationContext;
use crate::engine::{DiscoveryEngine, ImportWalkEngine};
use crate::interner::StringArena;
use crate::types::{BatchScanInput, ScanError};

/// Scanning orchestrator.
///
/// Each call builds a fresh compilation context, so nothing leaks between
/// scans; the dependency cache and the string arena are the only state
/// shared across calls, and both live as long as the scanner. Purely
/// synchronous: a call blocks until the engine finishes, and there is no
/// internal locking, so concurrent calls on one instance must be serialized
/// by the caller (or use one instance per concurrent scan, trading away
/// cache sharing).
pub struct DependencyScanner {
    cache: DependencyCache,
    arena: StringArena,
    engine: Box<dyn DiscoveryEngine>,
}

impl DependencyScanner {
    /// Scanner wired to the reference import-walk engine.
    pub fn new() -> Self {
        Self::with_engine(Box::new(ImportWalkEngine::new()))
    }

    /// Scanner with an injected discovery engine.
    pub fn with_engine(engine: Box<dyn DiscoveryEngine>) -> Self {
        Self {
            cache: DependencyCache::new(),
            arena: StringArena::new(),
            engine,
        }
    }

    /// Scanner seeded with an existing cache, for callers that carry
    /// descriptors across scanner instances.
    pub fn with_cache(cache: DependencyCache) -> Self {
        Self {
            cache,
            arena: StringArena::new(),
            engine: Box::new(ImportWalkEngine::new()),
        }
    }

    /// Single query: scan one invocation and return the serialized
    /// dependency graph.
    ///
    /// Fails with [`ScanError::InvalidArgument`] before the engine runs when
    /// the command is empty or rejected by the parser; on that path the
    /// cache is untouched. On success the cache keeps every newly discovered
    /// descriptor, visible to all future calls on this instance.
    pub fn scan(
        &mut self,
        command: &[String],
        placeholders: &HashSet<String>,
    ) -> Result<String, ScanError> {
        let mut ctx = CompilationContext::for_command(command, &mut self.arena)?;
        let graph = self
            .engine
            .discover_single(&mut ctx, &mut self.cache, placeholders)?;
        graph
            .to_text()
            .map_err(|err| ScanError::EngineFailure(err.to_string()))
    }

    /// Batch query: one shared context, each input resolved against the
    /// shared cache and written to its own output destination.
    ///
    /// The call succeeds or fails as a whole; per-input failures are not
    /// distinguished in the return value. Input tokens are interned through
    /// the instance arena, so they stay valid for the full batch call and
    /// beyond.
    pub fn scan_batch(
        &mut self,
        command: &[String],
        inputs: &[BatchScanInput],
        placeholders: &HashSet<String>,
    ) -> Result<(), ScanError> {
        let mut ctx = CompilationContext::for_command(command, &mut self.arena)?;
        self.engine.discover_batch(
            &mut ctx,
            &mut self.cache,
            &mut self.arena,
            inputs,
            placeholders,
        )?;
        Ok(())
    }

    /// Read access to the shared cache, for callers that archive or assert
    /// on discovered descriptors.
    pub fn cache(&self) -> &DependencyCache {
        &self.cache
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Number of distinct argument strings interned so far.
    pub fn arena_len(&self) -> usize {
        self.arena.len()
    }
}

impl Default for DependencyScanner {
    fn default() -> Self {
        Self::new()
    }
}
