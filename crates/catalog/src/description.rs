//! `descriptionHtml` = free text + generated detail list.
//!
//! The free text is everything before the first `<ul>`; it is kept verbatim
//! (minus its `<p>` wrapper). The list is always rebuilt from current values.

const LIST_OPEN: &str = "<ul>";

/// Free-text portion of a stored description.
pub fn free_text(description_html: &str) -> String {
    let head = description_html
        .split(LIST_OPEN)
        .next()
        .unwrap_or_default();
    head.trim().replace("<p>", "").replace("</p>", "")
}

/// Render `<p>text</p>` followed by the detail list, blank-line separated.
/// Either part is omitted when empty.
pub fn render(free_text: &str, rows: &[(&'static str, String)]) -> String {
    let mut parts = Vec::with_capacity(2);

    let text = free_text.trim();
    if !text.is_empty() {
        parts.push(format!("<p>{text}</p>"));
    }

    if !rows.is_empty() {
        let items: String = rows
            .iter()
            .map(|(label, value)| format!("<li><strong>{label}:</strong> {value}</li>"))
            .collect();
        parts.push(format!("{LIST_OPEN}{items}</ul>"));
    }

    parts.join("\n\n")
}
