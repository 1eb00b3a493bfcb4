// Reply parsing
// The generator is asked to append quick replies behind a plain-text
// "Suggestions:" marker rather than a structured format. The split, trim,
// length and count rules below are a fixed contract: changing them silently
// changes user-visible output.

use once_cell::sync::Lazy;
use regex::Regex;

/// At most this many quick-reply suggestions are kept.
pub const MAX_SUGGESTIONS: usize = 3;
/// Suggestions at or over this many characters are discarded.
pub const MAX_SUGGESTION_CHARS: usize = 100;

// Case-insensitive, matches the English and Arabic marker followed by an
// ASCII colon only; (?s) so the capture spans the remaining lines.
static SUGGESTION_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?si)(?:suggestions|اقتراحات)\s*:\s*(.*)$")
        .expect("suggestion marker pattern is valid")
});

static SUGGESTION_SEPARATOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\n,|]").expect("suggestion separator pattern is valid"));

/// A raw generator reply split into the user-facing message and the quick
/// replies extracted from its suggestion section, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedReply {
    pub message: String,
    pub suggestions: Option<Vec<String>>,
}

/// Parse a raw generator reply.
///
/// When the marker is found, everything before it (trimmed) becomes the
/// message; the remainder is split on newline/comma/pipe, trimmed, filtered
/// to non-empty entries under 100 characters and capped at 3. Without a
/// marker the whole reply is the message and suggestions are absent.
pub fn parse_reply(raw: &str) -> ParsedReply {
    if let Some(captures) = SUGGESTION_MARKER.captures(raw) {
        let marker = captures.get(0).map(|m| m.start()).unwrap_or(raw.len());
        let message = raw[..marker].trim().to_string();

        let items: Vec<String> = SUGGESTION_SEPARATOR
            .split(captures.get(1).map(|m| m.as_str()).unwrap_or(""))
            .map(str::trim)
            .filter(|s| !s.is_empty() && s.chars().count() < MAX_SUGGESTION_CHARS)
            .take(MAX_SUGGESTIONS)
            .map(str::to_string)
            .collect();

        ParsedReply {
            message,
            suggestions: if items.is_empty() { None } else { Some(items) },
        }
    } else {
        ParsedReply {
            message: raw.trim().to_string(),
            suggestions: None,
        }
    }
}
