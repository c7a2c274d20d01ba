// SPDX-License-Identifier: MIT
//! Presentation helpers for modal summary views.

/// Split a modal body into display lines, dropping pure-noise lines.
///
/// Local models occasionally emit stray artifact lines made of nothing but
/// digits and separator characters; those are stripped before display. Blank
/// lines are kept as paragraph breaks.
pub fn clean_modal_body(raw: &str) -> Vec<String> {
    raw.lines()
        .filter(|line| !is_noise(line))
        .map(str::to_string)
        .collect()
}

fn is_noise(line: &str) -> bool {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return false;
    }
    trimmed
        .chars()
        .all(|c| c.is_ascii_digit() || c.is_whitespace() || "-=_*~|.·•".contains(c))
}
