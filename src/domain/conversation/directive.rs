//! Directive extraction from settled model text.
//!
//! Directives are `[SUGGESTION]payload[/SUGGESTION]` spans embedded by the
//! model. They are non-nesting: a close marker always closes the nearest
//! preceding open marker. An open marker without a close marker before the end
//! of text is plain text. Close markers with no open marker are dropped from the
//! cleaned text, so a cleaned text never contains a complete span.

pub const SUGGESTION_OPEN: &str = "[SUGGESTION]";
pub const SUGGESTION_CLOSE: &str = "[/SUGGESTION]";

/// Result of scanning a text block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    /// Narrative text with every directive span removed.
    pub text: String,
    /// Trimmed payloads in order of appearance.
    pub suggestions: Vec<String>,
}

impl Extraction {
    pub fn has_suggestions(&self) -> bool {
        !self.suggestions.is_empty()
    }
}

enum ScanState {
    Outside,
    /// Inside a span; holds the byte offset of its open marker.
    Inside { open_at: usize },
}

/// Splits narrative text from suggestion directives.
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectiveExtractor;

impl DirectiveExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Scans `input` left to right.
    ///
    /// Returns the input unchanged with no suggestions when no complete span
    /// is present. Otherwise the cleaned text is trimmed.
    ///
    /// Removing a span can join marker fragments on either side into a new
    /// span, so scanning repeats on the cleaned text until a pass finds
    /// nothing. Payloads from later passes follow earlier ones.
    pub fn extract(&self, input: &str) -> Extraction {
        let mut text = input.to_string();
        let mut suggestions = Vec::new();

        while let Some((cleaned, found)) = scan_once(&text) {
            text = cleaned;
            suggestions.extend(found);
        }

        Extraction { text, suggestions }
    }
}

/// One left-to-right pass. `None` when no complete span is present.
fn scan_once(input: &str) -> Option<(String, Vec<String>)> {
    let mut text = String::with_capacity(input.len());
    let mut suggestions = Vec::new();
    let mut state = ScanState::Outside;
    let mut cursor = 0;

    loop {
        match state {
            ScanState::Outside => match input[cursor..].find(SUGGESTION_OPEN) {
                Some(rel) => {
                    let open_at = cursor + rel;
                    push_plain(&mut text, &input[cursor..open_at]);
                    cursor = open_at + SUGGESTION_OPEN.len();
                    state = ScanState::Inside { open_at };
                }
                None => {
                    push_plain(&mut text, &input[cursor..]);
                    break;
                }
            },
            ScanState::Inside { open_at } => {
                let rest = &input[cursor..];
                let close = rest.find(SUGGESTION_CLOSE);
                let reopen = rest.find(SUGGESTION_OPEN);
                match (close, reopen) {
                    // A later open marker comes first: the earlier one
                    // was never closed and stays as text.
                    (Some(c), Some(o)) if o < c => {
                        let next_open = cursor + o;
                        text.push_str(&input[open_at..next_open]);
                        cursor = next_open + SUGGESTION_OPEN.len();
                        state = ScanState::Inside { open_at: next_open };
                    }
                    (Some(c), _) => {
                        suggestions.push(rest[..c].trim().to_string());
                        cursor += c + SUGGESTION_CLOSE.len();
                        state = ScanState::Outside;
                    }
                    (None, _) => {
                        text.push_str(&input[open_at..]);
                        break;
                    }
                }
            }
        }
    }

    if suggestions.is_empty() {
        return None;
    }
    Some((text.trim().to_string(), suggestions))
}

fn push_plain(text: &mut String, segment: &str) {
    if segment.contains(SUGGESTION_CLOSE) {
        text.push_str(&segment.replace(SUGGESTION_CLOSE, ""));
    } else {
        text.push_str(segment);
    }
}

/// Convenience wrapper around [`DirectiveExtractor::extract`].
pub fn extract_suggestions(input: &str) -> Extraction {
    DirectiveExtractor::new().extract(input)
}
