//! Whole-line deduplication of extraction output.

use std::collections::HashSet;

/// Deduplicate exact-match lines while preserving first-seen order, dropping
/// blank lines and trimming each survivor.
///
/// PDF extraction in particular merges several sources (text layer, table
/// rows, OCR) that frequently repeat the same content; this pass runs before
/// chunking so duplicates never reach the index.
#[must_use]
pub fn dedupe_lines(text: &str) -> String {
    let mut seen = HashSet::new();
    let mut out: Vec<&str> = Vec::new();

    for line in text.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if seen.insert(trimmed) {
            out.push(trimmed);
        }
    }

    out.join("\n")
}
