/*!
format.rs

Styling primitives for human output paths (JSON output never uses these).

  - StyleOptions::detect() honours NO_COLOR / NO_EMOJI and disables both
    when stdout is not a terminal.
  - StyleOptions::plain() for captured output (tests, pipes).
  - color(role, text, &style) / emoji(tag, &style)
  - sample(text, max_chars) for document previews

License: MIT (inherits project license)
*/

use std::io::IsTerminal;

use crate::utils::text::take_chars;

/* -------------------------------------------------------------------------- */
/* Style Options                                                              */
/* -------------------------------------------------------------------------- */

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StyleOptions {
    pub use_color: bool,
    pub use_emoji: bool,
}

impl Default for StyleOptions {
    fn default() -> Self {
        Self::detect()
    }
}

impl StyleOptions {
    pub fn detect() -> Self {
        Self::for_output(
            std::io::stdout().is_terminal(),
            std::env::var_os("NO_COLOR").is_some(),
            std::env::var_os("NO_EMOJI").is_some(),
        )
    }

    /// Styling for a terminal (`tty`) or a pipe; piped output is always plain.
    pub const fn for_output(tty: bool, no_color: bool, no_emoji: bool) -> Self {
        StyleOptions {
            use_color: tty && !no_color,
            use_emoji: tty && !no_emoji,
        }
    }

    pub const fn plain() -> Self {
        StyleOptions {
            use_color: false,
            use_emoji: false,
        }
    }
}

/* -------------------------------------------------------------------------- */
/* Color / Emoji                                                              */
/* -------------------------------------------------------------------------- */

#[derive(Debug, Clone, Copy)]
pub enum Role {
    Primary,
    Success,
    Warning,
    Error,
    Dim,
    Bold,
}

pub fn color(role: Role, text: impl AsRef<str>, style: &StyleOptions) -> String {
    if !style.use_color {
        return text.as_ref().to_string();
    }
    let code = match role {
        Role::Primary => "38;5;45",
        Role::Success => "38;5;82",
        Role::Warning => "38;5;214",
        Role::Error => "38;5;196",
        Role::Dim => "2",
        Role::Bold => "1",
    };
    format!("\x1b[{code}m{}\x1b[0m", text.as_ref())
}

/// Emoji for a tag, followed by a space so callers can prefix blindly.
pub fn emoji(tag: &str, style: &StyleOptions) -> &'static str {
    if !style.use_emoji {
        return "";
    }
    match tag {
        "collections" => "📦 ",
        "view" => "🔍 ",
        "inspect" => "🔎 ",
        "document" => "📄 ",
        "vector" => "🧠 ",
        "warn" => "⚠️  ",
        "delete" => "🗑️  ",
        "error" => "❌ ",
        _ => "",
    }
}

/* -------------------------------------------------------------------------- */
/* Text                                                                       */
/* -------------------------------------------------------------------------- */

/// Preview of a chunk: first `max_chars` characters plus `...`, or
/// `(no text)` for an empty chunk.
pub fn sample(text: &str, max_chars: usize) -> String {
    if text.is_empty() {
        return "(no text)".to_string();
    }
    format!("{}...", take_chars(text, max_chars))
}
