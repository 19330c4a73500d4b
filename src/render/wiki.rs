//! Renders a [`Document`] back to wiki markup.
//!
//! The output is the canonical form of the dialect accepted by
//! [`crate::parser::parse`]: re-parsing it yields a document equal to the
//! one rendered, for any document produced by the parser.

use std::fmt::Write;

use crate::{
    domain::{Block, Document, Item, Section},
    parser::HEADER_START,
};

/// Renders a document as wiki markup.
#[must_use]
pub fn render(document: &Document) -> String {
    let mut out = String::new();

    for field in document.header().fields() {
        if field.value.is_empty() {
            let _ = writeln!(out, "{}:", field.key);
        } else {
            let _ = writeln!(out, "{}: {}", field.key, field.value);
        }
    }
    if !document.header().is_empty() {
        out.push('\n');
    }

    write_blocks(&mut out, document.preamble());
    // A headerless document must not open with a line read as a header.
    if document.header().is_empty() && out.starts_with(HEADER_START) {
        out.insert(0, '\n');
    }

    for section in document.sections() {
        if !out.is_empty() && !out.ends_with("\n\n") {
            out.push('\n');
        }
        let _ = writeln!(out, "{}", heading(section));
        write_blocks(&mut out, section.blocks());
    }

    out
}

/// The heading line of a section, e.g. `====== Title ======`.
#[must_use]
pub fn heading(section: &Section) -> String {
    let delimiter = "=".repeat(7 - usize::from(section.level()));
    format!("{delimiter} {} {delimiter}", section.heading())
}

fn write_blocks(out: &mut String, blocks: &[Block]) {
    let mut previous: Option<&Block> = None;
    for block in blocks {
        // Items run together; everything else is separated by a blank line.
        let both_items = matches!(
            (previous, block),
            (Some(Block::Item(_)), Block::Item(_))
        );
        if previous.is_some() && !both_items {
            out.push('\n');
        }
        write_block(out, block);
        previous = Some(block);
    }
}

fn write_block(out: &mut String, block: &Block) {
    match block {
        Block::Item(item) => write_item(out, item, 0),
        Block::Paragraph(paragraph) => {
            for line in paragraph.lines() {
                let _ = writeln!(out, "{line}");
            }
        }
        Block::Verbatim(verbatim) => {
            out.push_str("'''\n");
            for line in verbatim.lines() {
                let _ = writeln!(out, "{line}");
            }
            out.push_str("'''\n");
        }
    }
}

fn write_item(out: &mut String, item: &Item, depth: usize) {
    let indent = "\t".repeat(depth);
    let marker = item.bullet().marker();
    if item.text().is_empty() {
        let _ = writeln!(out, "{indent}{marker}");
    } else {
        let _ = writeln!(out, "{indent}{marker} {}", item.text());
    }
    for child in item.children() {
        write_item(out, child, depth + 1);
    }
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;
    use crate::parser::parse;

    const CHECKLIST: &str = "Content-Type: text/x-zim-wiki
Wiki-Format: zim 0.4
Creation-Date: 2010-11-27T12:00:00+01:00

====== Release ======
Created Saturday 27 November 2010
See [[+Contrib|contributing]] first.

===== Before =====
* Check **open** bugs
* Merge translations
\t* run ''make po''
\t\t* commit
[ ] Update changelog
[x] Ask for donations

===== Build =====
'''
./setup.py sdist
  indented line
'''

1. Upload to //the// website
2. Announce on http://launchpad.net
";

    #[test]
    fn canonical_input_renders_unchanged() {
        let document = parse(CHECKLIST).unwrap();
        assert_eq!(render(&document), CHECKLIST);
    }

    #[test]
    fn round_trip_is_idempotent() {
        let document = parse(CHECKLIST).unwrap();
        let reparsed = parse(&render(&document)).unwrap();
        assert_eq!(reparsed, document);
    }

    #[test]
    fn non_canonical_input_round_trips() {
        let input = "Some preamble\nspanning lines\n====== Title ======  \n\n\n*   spaced item\n\t\t\t* deep\n\n* after blank\n[*]\nparagraph\n'''\n'''\n== Small ==\n";
        let document = parse(input).unwrap();
        let rendered = render(&document);
        assert_eq!(parse(&rendered).unwrap(), document);
        assert_eq!(render(&parse(&rendered).unwrap()), rendered);
    }

    #[test_case("\nContent-Type: text/x-zim-wiki\n"; "content type line after blank")]
    #[test_case("\n\nContent-Type: a\nWiki-Format: b\n====== T ======\n"; "header lookalike paragraph")]
    #[test_case("Content-Type: text/x-zim-wiki\nhello\n"; "header without blank line")]
    #[test_case("Content-Type: text/x-zim-wiki\n\nNote: kept as prose\n"; "field lookalike after header")]
    #[test_case("Content-Type: text/x-zim-wiki\nX-Tag: a\nX-Tag: b\n\n"; "repeated header field")]
    #[test_case("Content-Type:\n\n====== T ======\n"; "empty header value")]
    #[test_case("Content-Type: text/x-zim-wiki\n* item\n"; "item after header")]
    #[test_case("Intro\n'''\ncode\n'''\n* item\n====== T ======\n"; "mixed preamble")]
    #[test_case("Note: not a header\n\n====== T ======\n"; "prose field lookalike")]
    #[test_case("see http://example.org//path\n"; "url with double slash")]
    fn header_and_preamble_round_trip(input: &str) {
        let document = parse(input).unwrap();
        let rendered = render(&document);
        assert_eq!(parse(&rendered).unwrap(), document);
        assert_eq!(render(&parse(&rendered).unwrap()), rendered);
    }

    #[test]
    fn content_type_paragraph_is_not_promoted_to_header() {
        let document = parse("\nContent-Type: text/x-zim-wiki\n").unwrap();
        assert!(document.header().is_empty());
        assert_eq!(render(&document), "\nContent-Type: text/x-zim-wiki\n");
    }

    #[test]
    fn empty_document_renders_empty() {
        assert_eq!(render(&Document::new()), "");
    }

    #[test]
    fn heading_delimiters_match_level() {
        assert_eq!(heading(&Section::new(1, "Top")), "====== Top ======");
        assert_eq!(heading(&Section::new(5, "Low")), "== Low ==");
    }
}
