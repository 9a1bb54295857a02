//! Markup to plain text extraction
//!
//! Pages fetched for research are reduced to the text nodes they contain.
//! Parsing goes through `scraper` (html5ever underneath), which recovers
//! from malformed input the same way a browser does, so extraction never
//! fails: broken markup simply yields whatever text the parser could place.

use scraper::{Html, Node};

/// Strip all markup and return the concatenated text nodes in document order
///
/// Whitespace is left exactly as it appears between and inside text nodes;
/// no normalization is applied. Comments, doctypes and processing
/// instructions are not text and are dropped.
///
/// # Examples
///
/// ```
/// use deskchat::extract::extract_text;
///
/// let text = extract_text("<p>Rust prevents <b>data races</b>.</p>");
/// assert_eq!(text, "Rust prevents data races.");
/// ```
pub fn extract_text(raw_markup: &str) -> String {
    let document = Html::parse_document(raw_markup);

    let mut text = String::with_capacity(raw_markup.len() / 2);
    for node in document.tree.root().descendants() {
        if let Node::Text(chunk) = node.value() {
            text.push_str(chunk);
        }
    }
    text
}
