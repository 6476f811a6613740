//! Shell-style tokenization for scan commands.
//!
//! Callers hand the scanner an ordered list of raw argument strings, but a
//! single list element may itself contain several logical tokens (for example
//! `"-module-name App"` copied out of a build log). Commands are therefore
//! joined into one line and re-split under quoting rules before parsing.

/// Join an argument list into a single whitespace-separated command line.
///
/// Members are joined verbatim: an element that already carries shell quotes
/// survives re-tokenization intact, while an unquoted element with embedded
/// whitespace splits into several tokens. That split is the point of the
/// join/re-tokenize round trip.
pub fn join_command(parts: &[String]) -> String {
    parts.join(" ")
}

/// Quote a token so [`tokenize`] reproduces it exactly, embedded whitespace
/// included.
pub fn quote_token(token: &str) -> String {
    let needs_quoting = token.is_empty()
        || token
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '"' | '\'' | '\\'));
    if !needs_quoting {
        return token.to_string();
    }
    let mut quoted = String::with_capacity(token.len() + 2);
    quoted.push('"');
    for c in token.chars() {
        if matches!(c, '"' | '\\') {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}

/// Split one command line into tokens using shell-style quoting rules.
///
/// Whitespace separates tokens. Single quotes preserve their contents
/// literally, double quotes preserve everything except `\"` and `\\` escapes,
/// and a backslash outside quotes escapes the next character. An unterminated
/// quote runs to the end of the input instead of failing.
pub fn tokenize(raw: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut chars = raw.chars();

    while let Some(ch) = chars.next() {
        match ch {
            c if c.is_whitespace() => {
                if in_token {
                    tokens.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            '\'' => {
                in_token = true;
                for c in chars.by_ref() {
                    if c == '\'' {
                        break;
                    }
                    current.push(c);
                }
            }
            '"' => {
                in_token = true;
                while let Some(c) = chars.next() {
                    match c {
                        '"' => break,
                        '\\' => match chars.next() {
                            Some(escaped @ ('"' | '\\')) => current.push(escaped),
                            Some(other) => {
                                current.push('\\');
                                current.push(other);
                            }
                            None => current.push('\\'),
                        },
                        other => current.push(other),
                    }
                }
            }
            '\\' => {
                in_token = true;
                if let Some(c) = chars.next() {
                    current.push(c);
                }
            }
            other => {
                in_token = true;
                current.push(other);
            }
        }
    }

    if in_token {
        tokens.push(current);
    }
    tokens
}
