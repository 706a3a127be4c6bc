use scraper::{ElementRef, Html};

/// Elements whose text never renders.
const HIDDEN_ELEMENTS: &[&str] = &["script", "style", "noscript", "template", "svg", "canvas"];

/// Visible text of an HTML document in document order, whitespace collapsed.
pub fn visible_text(html: &str) -> String {
    if html.trim().is_empty() {
        return String::new();
    }
    let document = Html::parse_document(html);
    collapse_whitespace(&collect_text(document.root_element()).join(" "))
}

/// Text nodes under `root` in document order. Walks with an explicit stack;
/// broken pages nest arbitrarily deep.
fn collect_text(root: ElementRef<'_>) -> Vec<String> {
    let mut parts = Vec::new();
    let mut stack: Vec<_> = root.children().rev().collect();
    while let Some(node) = stack.pop() {
        if let Some(element) = ElementRef::wrap(node) {
            if HIDDEN_ELEMENTS.contains(&element.value().name()) {
                continue;
            }
            stack.extend(node.children().rev());
        } else if let Some(text_node) = node.value().as_text() {
            let t = text_node.text.trim();
            if !t.is_empty() {
                parts.push(t.to_string());
            }
        }
    }
    parts
}

/// Collapse every whitespace run (including non-breaking spaces) to one space.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// First `max_chars` characters of `text`, with an ellipsis when cut.
pub fn preview(text: &str, max_chars: usize) -> String {
    let mut out: String = text.chars().take(max_chars).collect();
    if text.chars().nth(max_chars).is_some() {
        out.push('…');
    }
    out
}
