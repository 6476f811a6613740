//! Per-call compilation context: the isolated state one scan runs against.

use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::interner::StringArena;
use crate::invocation::{ParsedInvocation, parse_invocation};
use crate::tokenizer::{join_command, tokenize};
use crate::types::{DiagnosticRecord, DiagnosticSink, ScanError};

/// Ephemeral state for a single scan call.
///
/// Built fresh at the start of every scan and dropped at its end, so no
/// invocation state leaks between unrelated scans. Only the shared cache and
/// the string arena outlive the call.
#[derive(Debug)]
pub struct CompilationContext {
    sink: DiagnosticSink,
    tokens: Vec<Arc<str>>,
    invocation: ParsedInvocation,
    working_directory: PathBuf,
    main_entry: Option<PathBuf>,
}

impl CompilationContext {
    /// Build a context for one raw command.
    ///
    /// The command is joined and re-tokenized under shell quoting rules, its
    /// tokens are interned through `arena` so they outlive the caller's
    /// list, and the tokens are parsed into an invocation. An empty command
    /// is rejected with a single diagnostic before any tokenization.
    /// Construction failures leave no observable state change anywhere else.
    pub fn for_command(command: &[String], arena: &mut StringArena) -> Result<Self, ScanError> {
        if command.is_empty() {
            let mut sink = DiagnosticSink::new();
            sink.error("no invocation arguments");
            return Err(ScanError::invalid_argument(sink.into_records()));
        }

        let joined = join_command(command);
        let tokens: Vec<Arc<str>> = tokenize(&joined)
            .iter()
            .map(|token| arena.intern(token))
            .collect();

        let mut sink = DiagnosticSink::new();
        let invocation = match parse_invocation(&tokens, &mut sink) {
            Ok(invocation) => invocation,
            Err(_) => return Err(ScanError::invalid_argument(sink.into_records())),
        };

        let working_directory = invocation
            .working_directory
            .clone()
            .unwrap_or_else(default_working_directory);
        let main_entry = invocation
            .source_files
            .first()
            .map(|file| absolute_in(&working_directory, file));

        Ok(Self {
            sink,
            tokens,
            invocation,
            working_directory,
            main_entry,
        })
    }

    pub fn invocation(&self) -> &ParsedInvocation {
        &self.invocation
    }

    pub fn module_name(&self) -> &str {
        &self.invocation.module_name
    }

    /// The interned tokens this context was parsed from.
    pub fn tokens(&self) -> &[Arc<str>] {
        &self.tokens
    }

    pub fn working_directory(&self) -> &Path {
        &self.working_directory
    }

    /// Primary module entry point: the first source file, made absolute.
    pub fn main_entry(&self) -> Option<&Path> {
        self.main_entry.as_deref()
    }

    /// Search paths resolved against the working directory, in flag order.
    pub fn search_paths(&self) -> Vec<PathBuf> {
        self.invocation
            .search_paths
            .iter()
            .map(|path| absolute_in(&self.working_directory, path))
            .collect()
    }

    /// Source files resolved against the working directory.
    pub fn source_files(&self) -> Vec<PathBuf> {
        self.invocation
            .source_files
            .iter()
            .map(|path| absolute_in(&self.working_directory, path))
            .collect()
    }

    pub fn diagnostics(&self) -> &[DiagnosticRecord] {
        self.sink.records()
    }

    pub fn sink_mut(&mut self) -> &mut DiagnosticSink {
        &mut self.sink
    }
}

fn default_working_directory() -> PathBuf {
    env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

pub(crate) fn absolute_in(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cmd(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|p| p.to_string()).collect()
    }

    #[test]
    fn empty_command_yields_exactly_one_diagnostic() {
        let mut arena = StringArena::new();
        let err = CompilationContext::for_command(&[], &mut arena)
            .expect_err("empty command must fail");
        let diagnostics = err.diagnostics();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].message, "no invocation arguments");
        // Rejected before tokenization: nothing reached the arena.
        assert!(arena.is_empty());
    }

    #[test]
    fn rejected_parse_propagates_parser_diagnostics() {
        let mut arena = StringArena::new();
        let err = CompilationContext::for_command(&cmd(&["-I", "/deps"]), &mut arena)
            .expect_err("missing module name must fail");
        assert!(
            err.diagnostics()
                .iter()
                .any(|r| r.message.contains("-module-name"))
        );
    }

    #[test]
    fn tokens_are_interned_through_the_arena() {
        let mut arena = StringArena::new();
        let ctx = CompilationContext::for_command(&cmd(&["-module-name", "Foo"]), &mut arena)
            .expect("valid command");
        assert_eq!(ctx.tokens().len(), 2);
        assert_eq!(arena.len(), 2);
        // Re-interning yields the very same allocation.
        assert!(Arc::ptr_eq(&ctx.tokens()[0], &arena.intern("-module-name")));
    }

    #[test]
    fn working_directory_override_anchors_relative_paths() {
        let mut arena = StringArena::new();
        let ctx = CompilationContext::for_command(
            &cmd(&[
                "-module-name",
                "Foo",
                "-working-directory",
                "/work",
                "-I",
                "deps",
                "main.src",
            ]),
            &mut arena,
        )
        .expect("valid command");
        assert_eq!(ctx.working_directory(), Path::new("/work"));
        assert_eq!(ctx.search_paths(), vec![PathBuf::from("/work/deps")]);
        assert_eq!(ctx.main_entry(), Some(Path::new("/work/main.src")));
    }

    #[test]
    fn joined_command_is_retokenized_under_quoting_rules() {
        let mut arena = StringArena::new();
        let ctx = CompilationContext::for_command(
            &cmd(&["-module-name 'My Module'", "-I \"/deps/with space\""]),
            &mut arena,
        )
        .expect("valid command");
        assert_eq!(ctx.module_name(), "My Module");
        assert_eq!(
            ctx.invocation().search_paths,
            vec![PathBuf::from("/deps/with space")]
        );
    }
}
