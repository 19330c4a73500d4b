//! Renders a [`Document`] as plain text with all markup removed.

use std::fmt::Write;

use crate::domain::{Block, Bullet, CheckState, Document, Item, Section};

const INDENT: &str = "  ";

/// Renders a document as plain text.
///
/// Headings of level 1 and 2 are underlined, list items are indented two
/// spaces per level, verbatim blocks are indented four spaces. The header
/// is not rendered.
#[must_use]
pub fn render(document: &Document) -> String {
    let mut out = String::new();

    write_blocks(&mut out, document.preamble());

    for section in document.sections() {
        if !out.is_empty() {
            out.push('\n');
        }
        write_heading(&mut out, section);
        if !section.blocks().is_empty() {
            out.push('\n');
        }
        write_blocks(&mut out, section.blocks());
    }

    out
}

fn write_heading(out: &mut String, section: &Section) {
    let heading = section.heading();
    let _ = writeln!(out, "{heading}");
    let underline = match section.level() {
        1 => Some('='),
        2 => Some('-'),
        _ => None,
    };
    if let Some(ch) = underline {
        let width = heading.chars().count();
        let _ = writeln!(out, "{}", ch.to_string().repeat(width));
    }
}

fn write_blocks(out: &mut String, blocks: &[Block]) {
    let mut previous: Option<&Block> = None;
    for block in blocks {
        let both_items = matches!(
            (previous, block),
            (Some(Block::Item(_)), Block::Item(_))
        );
        if previous.is_some() && !both_items {
            out.push('\n');
        }
        match block {
            Block::Item(item) => write_item(out, item, 0),
            Block::Paragraph(paragraph) => {
                for line in paragraph.lines() {
                    let _ = writeln!(out, "{}", line.plain());
                }
            }
            Block::Verbatim(verbatim) => {
                for line in verbatim.lines() {
                    let _ = writeln!(out, "    {line}");
                }
            }
        }
        previous = Some(block);
    }
}

fn write_item(out: &mut String, item: &Item, depth: usize) {
    let indent = INDENT.repeat(depth);
    let marker = match item.bullet() {
        Bullet::Plain => "-".to_string(),
        Bullet::Checkbox(CheckState::Open) => "[ ]".to_string(),
        Bullet::Checkbox(CheckState::Done) => "[x]".to_string(),
        Bullet::Checkbox(CheckState::Cancelled) => "[-]".to_string(),
        Bullet::Checkbox(CheckState::Migrated) => "[>]".to_string(),
        Bullet::Numbered(label) => format!("{label}."),
    };
    let _ = writeln!(out, "{indent}{marker} {}", item.text().plain());
    for child in item.children() {
        write_item(out, child, depth + 1);
    }
}
