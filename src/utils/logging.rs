// file: src/utils/logging.rs
// description: Tracing subscriber setup and colored status lines for the cli

use colored::*;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Installs the global subscriber. `RUST_LOG` wins over the verbosity flag.
pub fn init_logger(colored_output: bool, verbose: bool) {
    let default_directive = if verbose {
        "scaffold_helpers=debug,info"
    } else {
        "scaffold_helpers=info,warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(verbose)
        .with_file(verbose)
        .with_line_number(verbose)
        .compact()
        .with_ansi(colored_output);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}

pub fn format_success(msg: &str) -> String {
    format!("{} {}", "✓".green().bold(), msg.green())
}

/// One listing line for a serialized entry: flags column, size, digest, path.
pub fn format_entry(path: &str, size: usize, executable: bool, symlink: bool, digest: &str) -> String {
    let flags = format!(
        "{}{}",
        if symlink { "l" } else { "-" },
        if executable { "x" } else { "-" }
    );
    format!(
        "{} {:>10} {} {}",
        flags.cyan().bold(),
        size,
        digest[..12.min(digest.len())].dimmed(),
        path
    )
}
