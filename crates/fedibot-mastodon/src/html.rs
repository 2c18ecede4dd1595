// SPDX-FileCopyrightText: 2026 Fedibot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTML-to-plain-text conversion for status content.
//!
//! Statuses arrive as sanitized HTML. Servers that support it also send a
//! `text` source field; this module is the fallback for the ones that
//! don't. Tags are dropped, block boundaries become newlines, and the
//! handful of entities Mastodon emits are decoded.

use regex::Regex;
use std::sync::OnceLock;

fn tag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<[^>]*>").unwrap())
}

fn break_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)<br\s*/?>|</p>").unwrap())
}

/// Strip HTML tags from status content, preserving paragraph breaks.
pub fn strip_html(content: &str) -> String {
    let with_breaks = break_re().replace_all(content, "\n");
    let stripped = tag_re().replace_all(&with_breaks, "");
    decode_entities(stripped.trim_end())
}

fn decode_entities(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

/// Truncate to at most `max_chars` characters, respecting char boundaries.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}
