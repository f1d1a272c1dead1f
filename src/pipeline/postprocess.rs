//! Post-processing: deterministic cleanup of raw LLM replies.
//!
//! Even well-prompted models wrap answers in ```` ``` ```` fences, echo the
//! `"""` delimiters of the request, or sprinkle zero-width characters. These
//! rules remove that noise without touching the content itself.
//!
//! Rules (applied in order by [`clean_translation`]):
//! 1. Strip outer code fences
//! 2. Normalise line endings (CRLF → LF)
//! 3. Strip echoed `"""` delimiters
//! 4. Strip invisible Unicode (zero-width spaces, BOM, soft hyphens, ...)
//! 5. Trim surrounding whitespace

use once_cell::sync::Lazy;
use regex::Regex;

/// Clean a translation reply before it is attached to an element.
pub fn clean_translation(input: &str) -> String {
    let s = strip_code_fences(input);
    let s = normalise_line_endings(&s);
    let s = strip_triple_quotes(&s);
    let s = remove_invisible_chars(&s);
    s.trim().to_string()
}

// ── Rule 1: Strip outer code fences ──────────────────────────────────────────

static RE_OUTER_FENCES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^```[A-Za-z0-9_-]*\r?\n(.*?)\r?\n```\s*$").unwrap());

/// Remove one pair of fences wrapping the whole reply (` ```json `, ` ```text `, ...).
pub fn strip_code_fences(input: &str) -> String {
    let trimmed = input.trim();
    if let Some(caps) = RE_OUTER_FENCES.captures(trimmed) {
        caps[1].to_string()
    } else {
        trimmed.to_string()
    }
}

// ── Rule 2: Normalise line endings ───────────────────────────────────────────

fn normalise_line_endings(input: &str) -> String {
    input.replace("\r\n", "\n").replace('\r', "\n")
}

// ── Rule 3: Strip echoed delimiters ──────────────────────────────────────────

fn strip_triple_quotes(input: &str) -> String {
    let t = input.trim();
    if t.len() >= 6 && t.starts_with("\"\"\"") && t.ends_with("\"\"\"") {
        t[3..t.len() - 3].to_string()
    } else {
        input.to_string()
    }
}

// ── Rule 4: Remove invisible Unicode characters ─────────────────────────────

fn remove_invisible_chars(input: &str) -> String {
    input.replace(
        [
            '\u{200B}', '\u{FEFF}', '\u{00AD}', '\u{200C}', '\u{200D}', '\u{2060}',
        ],
        "",
    )
}
