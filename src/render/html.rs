//! Renders a [`Document`] as HTML.

use std::fmt::Write;

use crate::{
    domain::{Block, Bullet, CheckState, Document, Inline, Item, Style, Text},
    render::Linker,
};

/// Marks the start of the document body in a full page.
pub const CONTENT_MARKER: &str = "<!-- Wiki content -->";

/// Renders the document body as an HTML fragment.
///
/// Link targets are turned into hrefs by `linker`; unresolvable links are
/// rendered as their label.
#[must_use]
pub fn render(document: &Document, linker: &dyn Linker) -> String {
    let mut out = String::new();
    write_blocks(&mut out, document.preamble(), linker);
    for section in document.sections() {
        let level = section.level();
        let _ = writeln!(
            out,
            "<h{level}>{}</h{level}>",
            escape(section.heading())
        );
        write_blocks(&mut out, section.blocks(), linker);
    }
    out
}

/// Renders a complete HTML page around the document body.
#[must_use]
pub fn render_page(document: &Document, title: &str, linker: &dyn Linker) -> String {
    wrap_page(title, &render(document, linker))
}

/// Wraps an HTML fragment in a minimal page.
#[must_use]
pub fn wrap_page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n</head>\n<body>\n{CONTENT_MARKER}\n{body}</body>\n</html>\n",
        escape(title)
    )
}

/// Escapes text for use in HTML content and attribute values.
#[must_use]
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

fn write_blocks(out: &mut String, blocks: &[Block], linker: &dyn Linker) {
    let mut pending: Vec<&Item> = Vec::new();
    for block in blocks {
        if let Block::Item(item) = block {
            pending.push(item);
            continue;
        }
        write_list(out, &pending, linker);
        pending.clear();

        match block {
            Block::Paragraph(paragraph) => {
                let lines: Vec<String> = paragraph
                    .lines()
                    .iter()
                    .map(|line| inline(line, linker))
                    .collect();
                let _ = writeln!(out, "<p>\n{}\n</p>", lines.join("<br>\n"));
            }
            Block::Verbatim(verbatim) => {
                let lines: Vec<String> = verbatim.lines().iter().map(|l| escape(l)).collect();
                let _ = writeln!(out, "<pre>\n{}\n</pre>", lines.join("\n"));
            }
            Block::Item(_) => {}
        }
    }
    write_list(out, &pending, linker);
}

fn write_list(out: &mut String, items: &[&Item], linker: &dyn Linker) {
    let Some(first) = items.first() else {
        return;
    };
    let tag = match first.bullet() {
        Bullet::Numbered(_) => "ol",
        _ => "ul",
    };
    let _ = writeln!(out, "<{tag}>");
    for item in items {
        let class = item
            .check_state()
            .map(|state| format!(" class=\"{}\"", checkbox_class(state)))
            .unwrap_or_default();
        let _ = write!(out, "<li{class}>{}", inline(item.text(), linker));
        if item.children().is_empty() {
            out.push_str("</li>\n");
        } else {
            out.push('\n');
            let children: Vec<&Item> = item.children().iter().collect();
            write_list(out, &children, linker);
            out.push_str("</li>\n");
        }
    }
    let _ = writeln!(out, "</{tag}>");
}

const fn checkbox_class(state: CheckState) -> &'static str {
    match state {
        CheckState::Open => "unchecked-box",
        CheckState::Done => "checked-box",
        CheckState::Cancelled => "xchecked-box",
        CheckState::Migrated => "migrated-box",
    }
}

fn inline(line: &Text, linker: &dyn Linker) -> String {
    let mut out = String::new();
    for span in line.spans() {
        match span {
            Inline::Text(text) => out.push_str(&escape(text)),
            Inline::Styled { style, text } => {
                let tag = match style {
                    Style::Strong => "strong",
                    Style::Italic => "em",
                    Style::Highlight => "mark",
                    Style::Strike => "s",
                };
                let _ = write!(out, "<{tag}>{}</{tag}>", escape(text));
            }
            Inline::Verbatim(text) => {
                let _ = write!(out, "<code>{}</code>", escape(text));
            }
            Inline::Link { target, .. } => {
                let label = escape(span.plain());
                match linker.href(target) {
                    Some(href) => {
                        let _ = write!(
                            out,
                            "<a href=\"{}\" title=\"{}\">{label}</a>",
                            escape(&href),
                            escape(target)
                        );
                    }
                    None => out.push_str(&label),
                }
            }
        }
    }
    out
}
