// WHY: Display representation of raw text with flagged sentences highlighted
// Rendering reads the raw text and the store; it never rewrites the text that gets saved.

use html_escape::{encode_double_quoted_attribute, encode_safe};
use std::collections::HashSet;

use crate::corrections::CorrectionStore;

/// CSS class applied to highlighted sentences
pub const DEFAULT_HIGHLIGHT_CLASS: &str = "fact-error";

/// A run of the document, either verbatim or carrying a correction tooltip
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    Plain(String),
    Flagged { text: String, tooltip: String },
}

impl Fragment {
    pub fn text(&self) -> &str {
        match self {
            Self::Plain(text) | Self::Flagged { text, .. } => text,
        }
    }
}

/// Raw text split into plain and flagged fragments
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderedDocument {
    pub fragments: Vec<Fragment>,
    class: String,
}

impl RenderedDocument {
    /// Concatenation of all fragments; always equal to the rendered raw text
    pub fn plain_text(&self) -> String {
        self.fragments.iter().map(Fragment::text).collect()
    }

    pub fn flagged(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fragments.iter().filter_map(|fragment| match fragment {
            Fragment::Flagged { text, tooltip } => Some((text.as_str(), tooltip.as_str())),
            Fragment::Plain(_) => None,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// HTML with every character of user text escaped
    pub fn to_html(&self) -> String {
        let mut html = String::new();
        for fragment in &self.fragments {
            match fragment {
                Fragment::Plain(text) => html.push_str(&encode_safe(text)),
                Fragment::Flagged { text, tooltip } => {
                    html.push_str("<span class=\"");
                    html.push_str(&encode_double_quoted_attribute(&self.class));
                    html.push_str("\" title=\"");
                    html.push_str(&encode_double_quoted_attribute(tooltip));
                    html.push_str("\">");
                    html.push_str(&encode_safe(text));
                    html.push_str("</span>");
                }
            }
        }
        html
    }
}

/// Merges raw text with the correction store
#[derive(Debug, Clone)]
pub struct HighlightRenderer {
    class: String,
}

impl Default for HighlightRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl HighlightRenderer {
    pub fn new() -> Self {
        Self {
            class: DEFAULT_HIGHLIGHT_CLASS.to_string(),
        }
    }

    pub fn with_class(class: impl Into<String>) -> Self {
        Self { class: class.into() }
    }

    /// Highlight every occurrence of every live sentence with a non-empty correction list
    ///
    /// `live` is the sentence set of `text`; store entries outside it are stale and
    /// never shown. Matching is by exact substring. When matches overlap, the
    /// earliest wins and, among those starting together, the longest.
    pub fn render(&self, text: &str, store: &CorrectionStore, live: &HashSet<&str>) -> RenderedDocument {
        let mut matches: Vec<(usize, usize, String)> = Vec::new();

        for (sentence, corrections) in store.iter_flagged() {
            if !live.contains(sentence) {
                continue;
            }
            let Some(first) = corrections.first() else {
                continue;
            };
            if sentence.is_empty() {
                continue;
            }
            let tooltip = first.tooltip();
            for (start, found) in text.match_indices(sentence) {
                matches.push((start, start + found.len(), tooltip.clone()));
            }
        }

        matches.sort_by(|a, b| a.0.cmp(&b.0).then(b.1.cmp(&a.1)));

        let mut fragments = Vec::new();
        let mut cursor = 0;
        for (start, end, tooltip) in matches {
            if start < cursor {
                continue;
            }
            if start > cursor {
                fragments.push(Fragment::Plain(text[cursor..start].to_string()));
            }
            fragments.push(Fragment::Flagged {
                text: text[start..end].to_string(),
                tooltip,
            });
            cursor = end;
        }
        if cursor < text.len() {
            fragments.push(Fragment::Plain(text[cursor..].to_string()));
        }

        RenderedDocument {
            fragments,
            class: self.class.clone(),
        }
    }
}
