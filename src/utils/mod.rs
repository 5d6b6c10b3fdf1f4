//! Utilities: logging setup (verbosity flags -> tracing filter) and small
//! text helpers shared by the client models and command output.
//!
//! Key items:
//!   init_logging / derive_level
//!   text::truncate_ellipsis / text::take_chars

/// Logging helpers.
pub mod logging {
    use tracing::level_filters::LevelFilter;
    use tracing_subscriber::EnvFilter;

    /// Map `-v` / `-q` flags to a level. Quiet wins over verbose.
    pub fn derive_level(verbose: u8, quiet: bool) -> LevelFilter {
        if quiet {
            return LevelFilter::ERROR;
        }
        match verbose {
            0 => LevelFilter::WARN,
            1 => LevelFilter::DEBUG,
            _ => LevelFilter::TRACE,
        }
    }

    /// Install the global subscriber on stderr. `RUST_LOG` overrides `level`.
    pub fn init_logging(level: LevelFilter) {
        let filter = EnvFilter::builder()
            .with_default_directive(level.into())
            .from_env_lossy();
        // A second init (e.g. from tests) is harmless.
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init();
    }
}

pub use logging::{derive_level, init_logging};

/// Character-based (not byte-based) text helpers.
pub mod text {
    /// First `max_chars` characters of `s`.
    pub fn take_chars(s: &str, max_chars: usize) -> &str {
        match s.char_indices().nth(max_chars) {
            Some((idx, _)) => &s[..idx],
            None => s,
        }
    }

    /// `s` unchanged when it fits, else its first `max_chars` characters + `...`.
    pub fn truncate_ellipsis(s: &str, max_chars: usize) -> String {
        let head = take_chars(s, max_chars);
        if head.len() == s.len() {
            s.to_string()
        } else {
            format!("{head}...")
        }
    }
}
