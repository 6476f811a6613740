//! Dependency discovery: the walk that turns one module into a graph.

use std::collections::{HashSet, VecDeque};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use regex::Regex;
use walkdir::WalkDir;

use crate::cache::{DependencyCache, ModuleId, ModuleInfo, ModuleKind};
use crate::context::{CompilationContext, absolute_in};
use crate::graph::{DependencyGraph, ModuleNode};
use crate::interner::StringArena;
use crate::tokenizer::{join_command, tokenize};
use crate::types::{BatchScanInput, DiagnosticSink, EngineError};

/// File extension a module interface is resolved by.
pub const MODULE_INTERFACE_EXT: &str = "mod";

/// The algorithm that walks imports to build a dependency graph.
///
/// Injected into the scanner at construction; callers may substitute any
/// implementation.
pub trait DiscoveryEngine {
    /// Discover the graph for the context's main module, reusing and
    /// populating the shared cache.
    fn discover_single(
        &self,
        ctx: &mut CompilationContext,
        cache: &mut DependencyCache,
        placeholders: &HashSet<String>,
    ) -> Result<DependencyGraph, EngineError>;

    /// Resolve every batch input against the shared context, writing each
    /// input's payload to its own output destination. Input tokens are
    /// interned through `arena` so they outlive the input that produced
    /// them.
    fn discover_batch(
        &self,
        ctx: &mut CompilationContext,
        cache: &mut DependencyCache,
        arena: &mut StringArena,
        inputs: &[BatchScanInput],
        placeholders: &HashSet<String>,
    ) -> Result<(), EngineError>;
}

fn import_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?m)^\s*import\s+([A-Za-z_][A-Za-z0-9_.]*)").expect("valid regex literal")
    })
}

/// Per-input commands only contribute deltas on top of the batch context: a
/// module name, extra search paths, extra sources. Everything else is opaque
/// at this layer.
struct InputOverrides {
    module_name: Option<String>,
    search_paths: Vec<PathBuf>,
    source_files: Vec<PathBuf>,
}

fn input_overrides(tokens: &[Arc<str>], working_directory: &Path) -> InputOverrides {
    let mut overrides = InputOverrides {
        module_name: None,
        search_paths: Vec::new(),
        source_files: Vec::new(),
    };
    let mut idx = 0;
    while idx < tokens.len() {
        let token: &str = tokens[idx].as_ref();
        if let Some(attached) = token.strip_prefix("-I").filter(|rest| !rest.is_empty()) {
            overrides
                .search_paths
                .push(absolute_in(working_directory, Path::new(attached)));
            idx += 1;
            continue;
        }
        match token {
            "-module-name" => {
                if let Some(value) = tokens.get(idx + 1) {
                    overrides.module_name = Some(value.as_ref().to_string());
                }
                idx += 2;
            }
            "-I" => {
                if let Some(value) = tokens.get(idx + 1) {
                    overrides
                        .search_paths
                        .push(absolute_in(working_directory, Path::new(value.as_ref())));
                }
                idx += 2;
            }
            // Valued flags we skip over without interpreting.
            "-o" | "-working-directory" => {
                idx += 2;
            }
            flag if flag.starts_with('-') => {
                idx += 1;
            }
            positional => {
                overrides
                    .source_files
                    .push(absolute_in(working_directory, Path::new(positional)));
                idx += 1;
            }
        }
    }
    overrides
}

/// Reference engine: breadth-first walk over module interfaces found in the
/// invocation's search paths.
///
/// A module named `M` is defined by `M.mod`; its text is scanned for
/// `import <Name>` lines. Placeholder-set members become placeholder
/// descriptors without touching the filesystem, and unresolvable imports
/// become external descriptors so repeated scans do not re-probe for them.
#[derive(Clone, Copy, Debug, Default)]
pub struct ImportWalkEngine;

impl ImportWalkEngine {
    pub fn new() -> Self {
        Self
    }

    /// Collect direct import names from one file's text, first occurrence
    /// order, deduplicated.
    fn scan_imports(content: &str) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut imports = Vec::new();
        for cap in import_regex().captures_iter(content) {
            if let Some(name) = cap.get(1) {
                let name = name.as_str().to_string();
                if seen.insert(name.clone()) {
                    imports.push(name);
                }
            }
        }
        imports
    }

    /// Find the interface file defining `module`: `<dir>/<module>.mod` in
    /// flag order first, then a recursive sweep of each search path.
    fn resolve_interface(module: &str, search_paths: &[PathBuf]) -> Option<PathBuf> {
        let file_name = format!("{module}.{MODULE_INTERFACE_EXT}");
        for dir in search_paths {
            let direct = dir.join(&file_name);
            if direct.is_file() {
                return Some(direct);
            }
        }
        for dir in search_paths {
            for entry in WalkDir::new(dir)
                .follow_links(false)
                .into_iter()
                .filter_map(Result::ok)
            {
                if entry.file_type().is_file()
                    && entry.file_name().to_string_lossy() == file_name.as_str()
                {
                    return Some(entry.path().to_path_buf());
                }
            }
        }
        None
    }

    /// Defining path and direct dependencies of the module under query: its
    /// source files when the invocation names any, otherwise its own
    /// interface in the search paths.
    fn main_dependencies(
        module: &str,
        sources: &[PathBuf],
        search_paths: &[PathBuf],
        sink: &mut DiagnosticSink,
    ) -> Result<(Option<PathBuf>, Vec<String>), EngineError> {
        if !sources.is_empty() {
            let mut deps = Vec::new();
            let mut seen = HashSet::new();
            for source in sources {
                let content = fs::read_to_string(source).map_err(|err| {
                    EngineError::new(format!(
                        "cannot read source file {}: {}",
                        source.display(),
                        err
                    ))
                })?;
                for dep in Self::scan_imports(&content) {
                    if seen.insert(dep.clone()) {
                        deps.push(dep);
                    }
                }
            }
            return Ok((sources.first().cloned(), deps));
        }

        match Self::resolve_interface(module, search_paths) {
            Some(path) => {
                let content = fs::read_to_string(&path).map_err(|err| {
                    EngineError::new(format!("cannot read interface {}: {}", path.display(), err))
                })?;
                let deps = Self::scan_imports(&content);
                Ok((Some(path), deps))
            }
            None => {
                sink.note(format!(
                    "module '{module}' has no sources and no interface in the search paths"
                ));
                Ok((None, Vec::new()))
            }
        }
    }

    /// Describe one imported module, consulting the cache before touching
    /// the filesystem.
    fn describe(
        &self,
        name: &str,
        search_paths: &[PathBuf],
        cache: &mut DependencyCache,
        placeholders: &HashSet<String>,
        sink: &mut DiagnosticSink,
    ) -> Result<(ModuleKind, Option<String>, Vec<String>), EngineError> {
        if placeholders.contains(name) {
            let id = ModuleId::new(name, ModuleKind::Placeholder);
            if cache.lookup(&id).is_none() {
                cache.record(
                    id,
                    ModuleInfo {
                        kind: ModuleKind::Placeholder,
                        path: None,
                        dependencies: Vec::new(),
                    },
                );
            }
            return Ok((ModuleKind::Placeholder, None, Vec::new()));
        }

        if let Some(info) = cache.find_by_name(name) {
            return Ok((info.kind, info.path.clone(), info.dependencies.clone()));
        }

        let (kind, path, deps) = match Self::resolve_interface(name, search_paths) {
            Some(path) => {
                let content = fs::read_to_string(&path).map_err(|err| {
                    EngineError::new(format!("cannot read interface {}: {}", path.display(), err))
                })?;
                let deps = Self::scan_imports(&content);
                (
                    ModuleKind::Interface,
                    Some(path.display().to_string()),
                    deps,
                )
            }
            None => {
                sink.warning(format!("module '{name}' not found in search paths"));
                (ModuleKind::External, None, Vec::new())
            }
        };
        cache.record(
            ModuleId::new(name, kind),
            ModuleInfo {
                kind,
                path: path.clone(),
                dependencies: deps.clone(),
            },
        );
        Ok((kind, path, deps))
    }

    /// Walk one module's transitive imports against the shared cache.
    fn walk(
        &self,
        module: &str,
        sources: &[PathBuf],
        search_paths: &[PathBuf],
        cache: &mut DependencyCache,
        placeholders: &HashSet<String>,
        sink: &mut DiagnosticSink,
    ) -> Result<DependencyGraph, EngineError> {
        let mut graph = DependencyGraph::new(module);

        // Main module: reuse a cached descriptor when an earlier scan on
        // this cache already derived it.
        let (main_kind, main_path, main_deps) = if placeholders.contains(module) {
            (ModuleKind::Placeholder, None, Vec::new())
        } else if let Some(info) = cache.find_by_name(module) {
            (info.kind, info.path.clone(), info.dependencies.clone())
        } else {
            let (path, deps) = Self::main_dependencies(module, sources, search_paths, sink)?;
            let kind = if !sources.is_empty() {
                ModuleKind::Source
            } else if path.is_some() {
                ModuleKind::Interface
            } else {
                // Nothing on disk describes it; still the module under scan.
                ModuleKind::Source
            };
            let path = path.map(|p| p.display().to_string());
            cache.record(
                ModuleId::new(module, kind),
                ModuleInfo {
                    kind,
                    path: path.clone(),
                    dependencies: deps.clone(),
                },
            );
            (kind, path, deps)
        };

        graph.add_module(ModuleNode {
            name: module.to_string(),
            kind: main_kind,
            path: main_path,
            dependencies: main_deps.clone(),
        });

        let mut queued: HashSet<String> = HashSet::new();
        queued.insert(module.to_string());
        let mut worklist: VecDeque<String> = VecDeque::new();
        for dep in main_deps {
            if queued.insert(dep.clone()) {
                worklist.push_back(dep);
            }
        }

        while let Some(name) = worklist.pop_front() {
            let (kind, path, deps) =
                self.describe(&name, search_paths, cache, placeholders, sink)?;
            for dep in &deps {
                if queued.insert(dep.clone()) {
                    worklist.push_back(dep.clone());
                }
            }
            graph.add_module(ModuleNode {
                name,
                kind,
                path,
                dependencies: deps,
            });
        }

        graph.finalize();
        Ok(graph)
    }
}

impl DiscoveryEngine for ImportWalkEngine {
    fn discover_single(
        &self,
        ctx: &mut CompilationContext,
        cache: &mut DependencyCache,
        placeholders: &HashSet<String>,
    ) -> Result<DependencyGraph, EngineError> {
        let module = ctx.module_name().to_string();
        let sources = ctx.source_files();
        let search_paths = ctx.search_paths();
        self.walk(
            &module,
            &sources,
            &search_paths,
            cache,
            placeholders,
            ctx.sink_mut(),
        )
    }

    fn discover_batch(
        &self,
        ctx: &mut CompilationContext,
        cache: &mut DependencyCache,
        arena: &mut StringArena,
        inputs: &[BatchScanInput],
        placeholders: &HashSet<String>,
    ) -> Result<(), EngineError> {
        let base_paths = ctx.search_paths();
        let working_directory = ctx.working_directory().to_path_buf();

        for input in inputs {
            let joined = join_command(&input.command);
            let tokens: Vec<Arc<str>> = tokenize(&joined)
                .iter()
                .map(|token| arena.intern(token))
                .collect();
            let overrides = input_overrides(&tokens, &working_directory);

            let module = overrides
                .module_name
                .unwrap_or_else(|| input.name.clone());
            let mut search_paths = base_paths.clone();
            search_paths.extend(overrides.search_paths);

            let graph = self.walk(
                &module,
                &overrides.source_files,
                &search_paths,
                cache,
                placeholders,
                ctx.sink_mut(),
            )?;
            let payload = graph.to_text().map_err(|err| {
                EngineError::new(format!(
                    "cannot serialize graph for '{}': {}",
                    input.name, err
                ))
            })?;

            let destination = absolute_in(&working_directory, &input.output_path);
            if let Some(parent) = destination.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent).map_err(|err| {
                        EngineError::new(format!(
                            "cannot create output directory {}: {}",
                            parent.display(),
                            err
                        ))
                    })?;
                }
            }
            fs::write(&destination, payload).map_err(|err| {
                EngineError::new(format!(
                    "cannot write result for '{}' to {}: {}",
                    input.name,
                    destination.display(),
                    err
                ))
            })?;
        }
        Ok(())
    }
}
