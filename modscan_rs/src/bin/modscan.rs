use std::fs;
use std::process;

use anyhow::Context;

use modscan::args::{Mode, ParsedArgs, parse_args};
use modscan::tokenizer::quote_token;
use modscan::{BatchScanInput, DependencyScanner, ScanError};

const USAGE: &str = "modscan - module dependency scanner\n\n\
Usage: modscan [options] -- <invocation args>\n\n\
Modes:\n  \
  (default)                 Scan one invocation, print the dependency graph as JSON\n  \
  --batch <file.json>       Resolve every entry of a batch request file\n\n\
Options:\n  \
  --placeholder <name>      Treat <name> as a placeholder module (repeatable)\n  \
  --placeholders <list>     Comma-separated placeholder module names\n  \
  -o, --output <file>       Write the payload to <file> instead of stdout\n  \
  --verbose                 Show scan progress on stderr\n  \
  -h, --help                Show this message\n  \
  -V, --version             Show version\n\n\
Invocation args (after --):\n  \
  -module-name <name>       Module the invocation describes (required)\n  \
  -I <dir>                  Module search path (repeatable)\n  \
  -o <file>                 Invocation output path (opaque to the scanner)\n  \
  -working-directory <dir>  Base for relative paths\n  \
  <file...>                 Source files of the main module\n\n\
Batch file format: JSON array of {\"name\", \"command\", \"output_path\"}\n\n\
Examples:\n  \
  modscan -- -module-name App -I ./modules App.mod\n  \
  modscan --placeholders Stub,Mock -- -module-name App -I ./modules\n  \
  modscan --batch requests.json -- -module-name batch -I ./modules\n";

fn main() {
    let argv: Vec<String> = std::env::args().skip(1).collect();
    let parsed = match parse_args(&argv) {
        Ok(parsed) => parsed,
        Err(message) => {
            eprintln!("[modscan][error] {message}");
            eprintln!("Run 'modscan --help' for usage.");
            process::exit(2);
        }
    };

    if parsed.show_help {
        print!("{USAGE}");
        return;
    }
    if parsed.show_version {
        println!("modscan {}", env!("CARGO_PKG_VERSION"));
        return;
    }

    if let Err(err) = run(&parsed) {
        eprintln!("[modscan][error] {err:#}");
        process::exit(1);
    }
}

fn run(parsed: &ParsedArgs) -> anyhow::Result<()> {
    let mut scanner = DependencyScanner::new();

    match &parsed.mode {
        Mode::Scan => {
            if parsed.verbose {
                let echoed: Vec<String> =
                    parsed.command.iter().map(|t| quote_token(t)).collect();
                eprintln!("[modscan] scanning: {}", echoed.join(" "));
            }
            let payload = scanner
                .scan(&parsed.command, &parsed.placeholders)
                .map_err(report_scan_error)?;
            match &parsed.output {
                Some(path) => fs::write(path, payload)
                    .with_context(|| format!("cannot write {}", path.display()))?,
                None => println!("{payload}"),
            }
        }
        Mode::Batch(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("cannot read batch file {}", path.display()))?;
            let inputs: Vec<BatchScanInput> = serde_json::from_str(&raw)
                .with_context(|| format!("cannot parse batch file {}", path.display()))?;
            if parsed.verbose {
                eprintln!("[modscan] resolving {} batch inputs", inputs.len());
            }
            scanner
                .scan_batch(&parsed.command, &inputs, &parsed.placeholders)
                .map_err(report_scan_error)?;
        }
    }

    if parsed.verbose {
        let stats = scanner.cache_stats();
        eprintln!(
            "[modscan] cache: {} hits, {} misses, {} inserts; {} strings interned",
            stats.hits,
            stats.misses,
            stats.inserts,
            scanner.arena_len()
        );
    }
    Ok(())
}

/// Surface the diagnostics attached to a scan failure before handing the
/// error itself up the chain.
fn report_scan_error(err: ScanError) -> anyhow::Error {
    for record in err.diagnostics() {
        eprintln!("[modscan][{}] {}", record.severity, record.message);
    }
    anyhow::Error::new(err)
}
