// src/render.rs
//! HTML fragments for the job table and its modal.
//!
//! Everything that originates from the job service passes through
//! [`escape_html`] before it is placed into markup.

use crate::models::Progress;

/// Escapes text for use in HTML element content and double-quoted attributes.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Bootstrap progress bar whose width and label both equal `progress`.
pub fn progress_bar(progress: Progress) -> String {
    format!(
        concat!(
            r#"<div class="progress" style="margin-bottom:0px;">"#,
            r#"<div class="progress-bar" role="progressbar" aria-valuenow="{p}" aria-valuemin="0" aria-valuemax="100" "#,
            r#"style="width: {p}%;">{p}% </div></div>"#
        ),
        p = progress
    )
}

/// Body of the exception modal. The text is shown verbatim but escaped.
pub fn exception_body(exception: &str) -> String {
    format!("<pre>{}</pre>", escape_html(exception))
}
