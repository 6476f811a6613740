//! Parsing tokenized commands into validated invocation records.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use crate::types::DiagnosticSink;

/// Structured, validated form of one scan command.
///
/// Owned by the compilation context that parsed it; never shared between
/// calls.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ParsedInvocation {
    /// Module the invocation describes. Cache entries are keyed on this.
    pub module_name: String,
    /// Search paths from `-I` flags, in command order.
    pub search_paths: Vec<PathBuf>,
    /// Positional arguments: source files of the main module.
    pub source_files: Vec<PathBuf>,
    /// `-o` destination, when given. Opaque to the scanner itself.
    pub output_path: Option<PathBuf>,
    /// `-working-directory` override for relative path resolution.
    pub working_directory: Option<PathBuf>,
    /// Flags this layer does not interpret, preserved in order.
    pub extra_flags: Vec<String>,
}

/// Marker error for a rejected token list. The reasons live in the
/// diagnostic sink the parser wrote to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParseError;

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("invocation arguments rejected")
    }
}

impl std::error::Error for ParseError {}

/// Parse interned tokens into a [`ParsedInvocation`].
///
/// Emits one diagnostic per malformed flag. A missing `-module-name` is an
/// error because the cache is keyed on module identity. Unrecognized
/// dash-flags are preserved verbatim rather than rejected: a real frontend
/// owns hundreds of flags this layer has no business interpreting. Performs
/// no dependency discovery.
pub fn parse_invocation(
    tokens: &[Arc<str>],
    sink: &mut DiagnosticSink,
) -> Result<ParsedInvocation, ParseError> {
    if tokens.is_empty() {
        sink.error("no invocation arguments");
        return Err(ParseError);
    }

    let mut invocation = ParsedInvocation::default();
    let mut rejected = false;
    let mut idx = 0;

    while idx < tokens.len() {
        let token: &str = tokens[idx].as_ref();

        // `-I<dir>` attached form.
        if let Some(attached) = token.strip_prefix("-I").filter(|rest| !rest.is_empty()) {
            invocation.search_paths.push(PathBuf::from(attached));
            idx += 1;
            continue;
        }

        match token {
            "-module-name" | "-I" | "-o" | "-working-directory" => {
                match tokens.get(idx + 1).map(|v| v.as_ref()) {
                    Some(value) if !value.starts_with('-') => {
                        match token {
                            "-module-name" => invocation.module_name = value.to_string(),
                            "-I" => invocation.search_paths.push(PathBuf::from(value)),
                            "-o" => invocation.output_path = Some(PathBuf::from(value)),
                            _ => invocation.working_directory = Some(PathBuf::from(value)),
                        }
                        idx += 2;
                    }
                    _ => {
                        sink.error(format!("flag '{token}' is missing its value"));
                        rejected = true;
                        idx += 1;
                    }
                }
            }
            flag if flag.starts_with('-') => {
                invocation.extra_flags.push(flag.to_string());
                idx += 1;
            }
            positional => {
                invocation.source_files.push(PathBuf::from(positional));
                idx += 1;
            }
        }
    }

    if invocation.module_name.is_empty() {
        sink.error("missing required flag '-module-name'");
        rejected = true;
    }

    if rejected { Err(ParseError) } else { Ok(invocation) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Severity;

    fn toks(parts: &[&str]) -> Vec<Arc<str>> {
        parts.iter().map(|p| Arc::from(*p)).collect()
    }

    #[test]
    fn parses_a_typical_invocation() {
        let mut sink = DiagnosticSink::new();
        let parsed = parse_invocation(
            &toks(&[
                "-module-name",
                "Foo",
                "-I",
                "/deps",
                "-Ilocal",
                "-o",
                "out.bin",
                "-enable-thing",
                "main.src",
            ]),
            &mut sink,
        )
        .expect("valid invocation");
        assert_eq!(parsed.module_name, "Foo");
        assert_eq!(
            parsed.search_paths,
            vec![PathBuf::from("/deps"), PathBuf::from("local")]
        );
        assert_eq!(parsed.output_path, Some(PathBuf::from("out.bin")));
        assert_eq!(parsed.extra_flags, vec!["-enable-thing".to_string()]);
        assert_eq!(parsed.source_files, vec![PathBuf::from("main.src")]);
        assert!(sink.records().is_empty());
    }

    #[test]
    fn missing_flag_value_is_diagnosed() {
        let mut sink = DiagnosticSink::new();
        let err = parse_invocation(&toks(&["-module-name", "Foo", "-I"]), &mut sink);
        assert_eq!(err, Err(ParseError));
        assert_eq!(sink.records().len(), 1);
        assert_eq!(sink.records()[0].severity, Severity::Error);
        assert!(sink.records()[0].message.contains("'-I'"));
    }

    #[test]
    fn missing_module_name_is_diagnosed() {
        let mut sink = DiagnosticSink::new();
        let err = parse_invocation(&toks(&["-I", "/deps"]), &mut sink);
        assert_eq!(err, Err(ParseError));
        assert!(
            sink.records()
                .iter()
                .any(|r| r.message.contains("-module-name"))
        );
    }

    #[test]
    fn every_malformed_flag_gets_its_own_diagnostic() {
        let mut sink = DiagnosticSink::new();
        let err = parse_invocation(&toks(&["-o", "-working-directory"]), &mut sink);
        assert_eq!(err, Err(ParseError));
        // Both flags lack values, and the module name is missing on top.
        assert_eq!(sink.records().len(), 3);
    }

    #[test]
    fn working_directory_override_is_captured() {
        let mut sink = DiagnosticSink::new();
        let parsed = parse_invocation(
            &toks(&["-module-name", "Foo", "-working-directory", "/work"]),
            &mut sink,
        )
        .expect("valid invocation");
        assert_eq!(parsed.working_directory, Some(PathBuf::from("/work")));
    }
}
