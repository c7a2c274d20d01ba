// SPDX-License-Identifier: MIT
//! Context extraction — turns a document snapshot into a prompt payload.
//!
//! Pure and synchronous: no editor mutation, no failure mode. Eligibility
//! filtering lives here too, because it is a property of the snapshot and the
//! trigger configuration, not of engine state.

use crate::config::TriggerConfig;
use crate::editor::{BufferKind, DocumentSnapshot};

/// Everything the dispatcher needs to build a prompt.
#[derive(Debug, Clone)]
pub struct ContextPayload {
    /// Full buffer text (or an aggregated listing for project summaries).
    pub text: String,
    /// 0-based cursor line at snapshot time.
    pub cursor_line: u32,
    /// 0-based cursor column (characters) at snapshot time.
    pub cursor_col: u32,
    /// Language label for the prompt, e.g. "Rust" or "plaintext".
    pub language_tag: &'static str,
}

/// Extract a prompt payload from the active document snapshot.
pub fn extract(snapshot: &DocumentSnapshot) -> ContextPayload {
    ContextPayload {
        text: snapshot.text.clone(),
        cursor_line: snapshot.cursor.line,
        cursor_col: snapshot.cursor.col,
        language_tag: detect_language(snapshot.path.as_deref().unwrap_or("")),
    }
}

/// Whether an edit in this buffer may arm the debounce timer.
///
/// Only normal file buffers qualify, and the file extension / language tag
/// must not be in the disallowed sets. The auto-trigger flag and suppression
/// window are engine state and are checked by the caller.
pub fn is_eligible(snapshot: &DocumentSnapshot, trigger: &TriggerConfig) -> bool {
    if snapshot.kind != BufferKind::File {
        return false;
    }
    if let Some(ext) = snapshot.extension() {
        if trigger.disallowed_extensions.iter().any(|d| d.eq_ignore_ascii_case(&ext)) {
            return false;
        }
    }
    let lang = detect_language(snapshot.path.as_deref().unwrap_or(""));
    if trigger
        .disallowed_languages
        .iter()
        .any(|d| d.eq_ignore_ascii_case(lang))
    {
        return false;
    }
    true
}

/// Split the payload text at the cursor into (prefix, suffix).
///
/// The cursor column is a character offset within its line; lines before the
/// cursor line belong to the prefix, lines after to the suffix.
pub fn split_at_cursor(payload: &ContextPayload) -> (String, String) {
    let mut prefix = String::with_capacity(payload.text.len());
    let mut suffix = String::new();
    for (row, line) in payload.text.split('\n').enumerate() {
        let row = row as u32;
        if row < payload.cursor_line {
            prefix.push_str(line);
            prefix.push('\n');
        } else if row == payload.cursor_line {
            let split = line
                .char_indices()
                .nth(payload.cursor_col as usize)
                .map(|(i, _)| i)
                .unwrap_or(line.len());
            prefix.push_str(&line[..split]);
            suffix.push_str(&line[split..]);
        } else {
            suffix.push('\n');
            suffix.push_str(line);
        }
    }
    (prefix, suffix)
}

/// Detect a language label from a file extension for use in prompts.
///
/// Extensions are matched case-insensitively. Unknown or missing extensions
/// fall back to "plaintext" rather than being an error; the prompt still
/// works, just without a language hint.
pub fn detect_language(file_path: &str) -> &'static str {
    let ext = std::path::Path::new(file_path)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    match ext.as_str() {
        "c" | "h" => "C",
        "cc" | "cpp" | "cxx" | "hpp" | "hxx" => "C++",
        "cs" => "C#",
        "css" | "scss" | "sass" | "less" => "CSS",
        "ex" | "exs" => "Elixir",
        "go" => "Go",
        "hs" => "Haskell",
        "html" | "htm" => "HTML",
        "java" => "Java",
        "js" | "jsx" | "mjs" | "cjs" => "JavaScript",
        "json" | "jsonc" => "JSON",
        "kt" | "kts" => "Kotlin",
        "lua" => "Lua",
        "md" | "mdx" => "Markdown",
        "php" => "PHP",
        "py" | "pyw" => "Python",
        "rb" => "Ruby",
        "rs" => "Rust",
        "sh" | "bash" | "zsh" => "Shell",
        "sql" => "SQL",
        "swift" => "Swift",
        "toml" => "TOML",
        "ts" | "tsx" => "TypeScript",
        "yaml" | "yml" => "YAML",
        "zig" => "Zig",
        _ => "plaintext",
    }
}
