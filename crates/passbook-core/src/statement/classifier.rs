//! Layout family detection from first-page signatures.

use tracing::debug;

use crate::models::{Document, FormatIdentifier};

/// Case-folded text of the scanned page prefix.
pub struct SignatureText {
    /// Lower-cased text.
    pub text: String,
    /// Lower-cased text with all whitespace removed.
    pub compact: String,
}

impl SignatureText {
    pub fn new(raw: &str) -> Self {
        let text = raw.to_lowercase();
        let compact = text.chars().filter(|c| !c.is_whitespace()).collect();
        Self { text, compact }
    }

    fn has(&self, needle: &str) -> bool {
        self.text.contains(needle)
    }

    fn has_compact(&self, needle: &str) -> bool {
        self.compact.contains(needle)
    }
}

type Signature = fn(&SignatureText) -> bool;

/// Ordered signature rules; the first match wins.
const RULES: &[(Signature, FormatIdentifier)] = &[
    (is_kotak, FormatIdentifier::Kotak),
    (is_jk, FormatIdentifier::Jk),
    (is_hdfc, FormatIdentifier::Hdfc),
    (is_axis, FormatIdentifier::Axis),
    (is_yes_bank, FormatIdentifier::YesBank),
];

fn is_kotak(t: &SignatureText) -> bool {
    t.has("cust. reln. no.") || t.has("kotak mahindra bank") || t.has_compact("kkbk")
}

fn is_jk(t: &SignatureText) -> bool {
    t.has("jammu") && t.has("kashmir")
}

fn is_hdfc(t: &SignatureText) -> bool {
    t.has("hdfc bank") || t.has("proc-dl-statement") || t.has_compact("hdfcbank")
}

fn is_axis(t: &SignatureText) -> bool {
    t.has("axis bank") || t.has_compact("axisbank")
}

fn is_yes_bank(t: &SignatureText) -> bool {
    t.has("yes bank") || t.has_compact("yesbank")
}

/// Format classifier over a bounded page prefix.
#[derive(Debug, Clone)]
pub struct FormatClassifier {
    prefix_pages: usize,
}

impl FormatClassifier {
    /// Create a classifier scanning the first `prefix_pages` pages.
    pub fn new(prefix_pages: usize) -> Self {
        Self {
            prefix_pages: prefix_pages.max(1),
        }
    }

    /// Classify a document. Never fails; unknown layouts are `Standard`.
    pub fn classify(&self, document: &Document) -> FormatIdentifier {
        let text = document.prefix_text(self.prefix_pages);
        let format = classify_text(&text);
        debug!(
            "Classified document as {} from {} prefix page(s)",
            format, self.prefix_pages
        );
        format
    }
}

impl Default for FormatClassifier {
    fn default() -> Self {
        Self::new(1)
    }
}

/// Classify raw prefix text.
pub fn classify_text(raw: &str) -> FormatIdentifier {
    let text = SignatureText::new(raw);
    RULES
        .iter()
        .find(|(matches, _)| matches(&text))
        .map(|(_, format)| *format)
        .unwrap_or(FormatIdentifier::Standard)
}
