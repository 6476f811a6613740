//! # modscan
//!
//! Dependency scanner for compiler-style module invocations: feed it one
//! invocation, get back the transitive import graph of the module it
//! describes, serialized as JSON.
//!
//! A [`DependencyScanner`] keeps exactly two pieces of state across calls: a
//! [`DependencyCache`](cache::DependencyCache) memoizing every module
//! descriptor ever discovered through it, and a
//! [`StringArena`](interner::StringArena) owning tokenized argument strings
//! so batch inputs outlive the call that tokenized them. Everything else
//! (the parsed invocation, the diagnostic sink, the compilation context) is
//! rebuilt per call and dropped at its end.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::collections::HashSet;
//! use modscan::DependencyScanner;
//!
//! let mut scanner = DependencyScanner::new();
//! let command = vec![
//!     "-module-name".to_string(),
//!     "App".to_string(),
//!     "-I".to_string(),
//!     "./modules".to_string(),
//! ];
//! let payload = scanner.scan(&command, &HashSet::new()).unwrap();
//! println!("{payload}");
//! ```
//!
//! ## Batch mode
//!
//! [`DependencyScanner::scan_batch`] resolves many named inputs in one pass:
//! one shared context, one shared cache, each result written to the input's
//! own output path. The call succeeds or fails as a whole.

/// Command-line argument parsing for the `modscan` binary.
pub mod args;

/// Shared dependency cache keyed by module identity.
pub mod cache;

/// Per-call compilation context: the isolated state one scan runs against.
pub mod context;

/// Discovery engine seam and the reference import-walk engine.
pub mod engine;

/// Dependency graph structure and payload serialization.
pub mod graph;

/// Append-only string arena for argument tokens.
pub mod interner;

/// Invocation parsing: tokens into a validated record.
pub mod invocation;

/// The scan orchestrator.
pub mod scanner;

/// Shell-style command tokenization.
pub mod tokenizer;

/// Common types: diagnostics, errors, batch inputs.
pub mod types;

pub use cache::{CacheStats, DependencyCache, ModuleId, ModuleInfo, ModuleKind};
pub use context::CompilationContext;
pub use engine::{DiscoveryEngine, ImportWalkEngine, MODULE_INTERFACE_EXT};
pub use graph::{DependencyGraph, GraphMetadata, ModuleNode};
pub use interner::StringArena;
pub use invocation::{ParseError, ParsedInvocation};
pub use scanner::DependencyScanner;
pub use types::{
    BatchScanInput, DiagnosticRecord, DiagnosticSink, EngineError, ScanError, Severity,
};
