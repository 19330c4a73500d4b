//! Wiki markup parser.
//!
//! Turns a text blob into a [`Document`]. Parsing is line based:
//!
//! - an optional header of `Key: value` fields, starting with
//!   `Content-Type:` on the first line and ending at the first blank line
//! - headings: `====== Title ======` (six `=` is level 1, two is level 5)
//! - verbatim blocks fenced by `'''` lines
//! - list items: `*`, `[ ]`, `[*]`, `[x]`, `[>]`, `1.` or `a.`, indented
//!   with tabs for nesting
//! - paragraphs: any other non-blank lines
//!
//! Inline markup within items and paragraphs is handled by [`parse_inline`].

use std::sync::LazyLock;

use chrono::DateTime;
use regex::Regex;

use crate::domain::{
    Block, Bullet, CheckState, Document, Header, Item, Paragraph, Section, Text, Verbatim,
};

mod inline;
pub use inline::parse_inline;

static HEADER_FIELD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z][A-Za-z0-9-]*):\s*(.*)$").expect("this must never fail")
});

static HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(=+)\s+(\S.*?)\s+(=+)$").expect("this must never fail"));

static LIST_ITEM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:\[([ *x>])\]|(\*)|([0-9]+|[a-zA-Z])\.)(?:\s+(.*))?$")
        .expect("this must never fail")
});

const VERBATIM_FENCE: &str = "'''";

/// The first line of a document opens a header only if it starts with this.
pub(crate) const HEADER_START: &str = "Content-Type:";

/// Parses wiki markup into a [`Document`].
///
/// Empty input (or input that is only whitespace) yields an empty document.
///
/// # Errors
///
/// Returns a [`ParseError`] naming the offending line if a heading is
/// malformed, inline markup or a link is not closed on its line, a verbatim
/// block is never closed, or the `Creation-Date` header is not a valid
/// timestamp.
pub fn parse(text: &str) -> Result<Document, ParseError> {
    Parser::new(text).run()
}

struct Parser<'a> {
    lines: Vec<&'a str>,
    position: usize,
    document: Document,
    open_paragraph: bool,
}

impl<'a> Parser<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            lines: text.lines().collect(),
            position: 0,
            document: Document::new(),
            open_paragraph: false,
        }
    }

    /// The 1-based number of the line at `position`.
    const fn line_number(&self) -> usize {
        self.position + 1
    }

    fn run(mut self) -> Result<Document, ParseError> {
        let header = self.header()?;
        self.document.set_header(header);

        while let Some(&raw) = self.lines.get(self.position) {
            let line = raw.trim_end();
            if line.is_empty() {
                self.open_paragraph = false;
            } else if line.trim_start() == VERBATIM_FENCE {
                self.verbatim()?;
                continue;
            } else if line.starts_with("==") {
                let section = heading(line, self.line_number())?;
                self.document.push_section(section);
                self.open_paragraph = false;
            } else if let Some((depth, item)) = list_item(line, self.line_number())? {
                self.push_item(depth, item);
            } else {
                let text = parse_inline(line, self.line_number())?;
                self.push_paragraph_line(text);
            }
            self.position += 1;
        }

        Ok(self.document)
    }

    fn header(&mut self) -> Result<Header, ParseError> {
        let mut header = Header::default();

        let has_header = self
            .lines
            .first()
            .is_some_and(|line| line.starts_with(HEADER_START));
        if !has_header {
            return Ok(header);
        }

        while let Some(line) = self.lines.get(self.position) {
            let Some(captures) = HEADER_FIELD.captures(line.trim_end()) else {
                break;
            };
            let key = &captures[1];
            let value = captures[2].trim();

            if key == "Creation-Date" && DateTime::parse_from_rfc3339(value).is_err() {
                return Err(ParseError::new(
                    self.line_number(),
                    ParseErrorKind::InvalidCreationDate(value.to_string()),
                ));
            }

            header.push(key, value);
            self.position += 1;
        }

        Ok(header)
    }

    /// Consumes a fenced block, from the opening fence to the closing one.
    fn verbatim(&mut self) -> Result<(), ParseError> {
        let opening = self.line_number();
        self.position += 1;

        let mut lines = Vec::new();
        loop {
            let Some(&line) = self.lines.get(self.position) else {
                return Err(ParseError::new(
                    opening,
                    ParseErrorKind::UnterminatedVerbatim,
                ));
            };
            self.position += 1;
            if line.trim() == VERBATIM_FENCE {
                break;
            }
            lines.push(line.to_string());
        }

        self.document
            .blocks_mut()
            .push(Block::Verbatim(Verbatim::new(lines)));
        self.open_paragraph = false;
        Ok(())
    }

    fn push_item(&mut self, depth: usize, item: Item) {
        let blocks = self.document.blocks_mut();
        match blocks.last_mut() {
            Some(Block::Item(parent)) if depth > 0 => parent.nest(depth, item),
            _ => blocks.push(Block::Item(item)),
        }
        self.open_paragraph = false;
    }

    fn push_paragraph_line(&mut self, text: Text) {
        let blocks = self.document.blocks_mut();
        match blocks.last_mut() {
            Some(Block::Paragraph(paragraph)) if self.open_paragraph => paragraph.push(text),
            _ => blocks.push(Block::Paragraph(Paragraph::new(vec![text]))),
        }
        self.open_paragraph = true;
    }
}

/// Parses a line starting with `==` as a heading.
fn heading(line: &str, number: usize) -> Result<Section, ParseError> {
    let malformed = || ParseError::new(number, ParseErrorKind::MalformedHeading(line.to_string()));

    let captures = HEADING.captures(line).ok_or_else(malformed)?;
    let opening = captures[1].len();
    let closing = captures[3].len();
    if opening != closing || !(2..=6).contains(&opening) {
        return Err(malformed());
    }

    let level = u8::try_from(7 - opening).map_err(|_| malformed())?;
    Ok(Section::new(level, &captures[2]))
}

/// Parses a list item line, returning its depth (leading tabs) and the item.
///
/// Returns `Ok(None)` if the line is not a list item.
fn list_item(line: &str, number: usize) -> Result<Option<(usize, Item)>, ParseError> {
    let content = line.trim_start_matches('\t');
    let depth = line.len() - content.len();

    let Some(captures) = LIST_ITEM.captures(content) else {
        return Ok(None);
    };

    let bullet = if let Some(symbol) = captures.get(1) {
        symbol
            .as_str()
            .chars()
            .next()
            .and_then(CheckState::from_symbol)
            .map_or(Bullet::Plain, Bullet::Checkbox)
    } else if let Some(label) = captures.get(3) {
        Bullet::Numbered(label.as_str().to_string())
    } else {
        Bullet::Plain
    };

    let text = match captures.get(4) {
        Some(text) => parse_inline(text.as_str().trim(), number)?,
        None => Text::default(),
    };

    Ok(Some((depth, Item::new(bullet, text))))
}

/// An error raised when input text violates the markup grammar.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("line {line}: {kind}")]
pub struct ParseError {
    line: usize,
    kind: ParseErrorKind,
}

impl ParseError {
    pub(crate) const fn new(line: usize, kind: ParseErrorKind) -> Self {
        Self { line, kind }
    }

    /// The 1-based number of the offending line.
    #[must_use]
    pub const fn line(&self) -> usize {
        self.line
    }

    /// What was wrong with the line.
    #[must_use]
    pub const fn kind(&self) -> &ParseErrorKind {
        &self.kind
    }
}

/// The ways a line can be malformed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseErrorKind {
    /// A heading whose `=` delimiters are missing, unbalanced, or out of
    /// range.
    #[error("malformed heading '{0}'")]
    MalformedHeading(String),

    /// An emphasis or inline verbatim marker with no closing marker on the
    /// same line.
    #[error("unterminated '{0}' markup")]
    UnterminatedInline(&'static str),

    /// A `[[` with no closing `]]` on the same line.
    #[error("unterminated link")]
    UnterminatedLink,

    /// A `'''` fence with no closing fence.
    #[error("unterminated verbatim block")]
    UnterminatedVerbatim,

    /// A `Creation-Date` header that is not an RFC 3339 timestamp.
    #[error("invalid Creation-Date '{0}'")]
    InvalidCreationDate(String),
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;
    use crate::domain::Inline;

    const CHECKLIST: &str = "Content-Type: text/x-zim-wiki
Wiki-Format: zim 0.4
Creation-Date: 2010-11-27T12:00:00+01:00

====== Release ======
Created Saturday 27 November 2010

===== Before =====
* Check **open** bugs
* Merge translations
\t* run ''make po''
\t\t* commit
[ ] Update changelog
[*] Bump version

===== Build =====
'''
./setup.py sdist
'''
1. Upload to [[http://zim-wiki.org|website]]
";

    #[test]
    fn empty_input_has_no_sections() {
        let document = parse("").unwrap();
        assert!(document.sections().is_empty());
        assert!(document.is_empty());
    }

    #[test]
    fn whitespace_only_input_is_empty() {
        let document = parse("  \n\t\n   \n").unwrap();
        assert!(document.is_empty());
    }

    #[test]
    fn single_heading() {
        let document = parse("====== Title ======").unwrap();
        assert_eq!(document.sections().len(), 1);
        assert_eq!(document.sections()[0].heading(), "Title");
        assert_eq!(document.sections()[0].level(), 1);
    }

    #[test_case("====== A ======", 1; "six")]
    #[test_case("===== A =====", 2; "five")]
    #[test_case("==== A ====", 3; "four")]
    #[test_case("=== A ===", 4; "three")]
    #[test_case("== A ==", 5; "two")]
    fn heading_levels(line: &str, level: u8) {
        let document = parse(line).unwrap();
        assert_eq!(document.sections()[0].level(), level);
    }

    #[test_case("== Title"; "missing close")]
    #[test_case("=== Title =="; "unbalanced")]
    #[test_case("======= Title ======="; "too many")]
    #[test_case("==Title=="; "no spaces")]
    #[test_case("====== ======"; "no text")]
    fn malformed_heading(line: &str) {
        let input = format!("* first\n{line}\n");
        let error = parse(&input).unwrap_err();
        assert_eq!(error.line(), 2);
        assert!(matches!(error.kind(), ParseErrorKind::MalformedHeading(_)));
    }

    #[test]
    fn items_under_heading_in_order() {
        let document = parse("====== Title ======\n* one\n* two\n* three\n").unwrap();
        let texts: Vec<_> = document.sections()[0]
            .items()
            .map(|item| item.text().plain())
            .collect();
        assert_eq!(texts, ["one", "two", "three"]);
    }

    #[test]
    fn parses_full_checklist() {
        let document = parse(CHECKLIST).unwrap();

        assert_eq!(document.header().content_type(), Some("text/x-zim-wiki"));
        assert_eq!(document.header().wiki_format(), Some("zim 0.4"));
        assert!(document.header().creation_date().is_some());
        assert_eq!(document.title(), Some("Release"));

        let headings: Vec<_> = document.sections().iter().map(Section::heading).collect();
        assert_eq!(headings, ["Release", "Before", "Build"]);

        let before = &document.sections()[1];
        let items: Vec<_> = before.items().collect();
        assert_eq!(items.len(), 4);
        assert_eq!(items[1].children().len(), 1);
        assert_eq!(items[1].children()[0].children().len(), 1);
        assert_eq!(items[2].check_state(), Some(CheckState::Open));
        assert_eq!(items[3].check_state(), Some(CheckState::Done));
        assert_eq!(
            items[0].text().spans()[1],
            Inline::Styled {
                style: crate::domain::Style::Strong,
                text: "open".to_string()
            }
        );

        let build = &document.sections()[2];
        assert!(matches!(build.blocks()[0], Block::Verbatim(_)));
        let numbered = build.items().next().unwrap();
        assert_eq!(numbered.bullet(), &Bullet::Numbered("1".to_string()));
        assert_eq!(document.links(), ["http://zim-wiki.org"]);
        assert_eq!(document.item_count(), 7);
    }

    #[test]
    fn content_before_heading_is_preamble() {
        let document = parse("Some intro\n\n====== Title ======\n").unwrap();
        assert_eq!(document.preamble().len(), 1);
        assert_eq!(document.sections().len(), 1);
    }

    #[test]
    fn unterminated_verbatim_cites_opening_line() {
        let input = "====== Title ======\n* one\n'''\ncode\nmore code\n";
        let error = parse(input).unwrap_err();
        assert_eq!(error.line(), 3);
        assert_eq!(error.kind(), &ParseErrorKind::UnterminatedVerbatim);
    }

    #[test]
    fn verbatim_keeps_lines_literally() {
        let document = parse("'''\n* not an item\n  **raw**\n'''\n").unwrap();
        let Block::Verbatim(verbatim) = &document.preamble()[0] else {
            panic!("expected verbatim block");
        };
        assert_eq!(verbatim.lines(), ["* not an item", "  **raw**"]);
    }

    #[test]
    fn unterminated_inline_markup_cites_line() {
        let error = parse("====== Title ======\n\n* a **bold start\n").unwrap_err();
        assert_eq!(error.line(), 3);
        assert_eq!(error.kind(), &ParseErrorKind::UnterminatedInline("**"));
    }

    #[test]
    fn trailing_whitespace_is_ignored() {
        let document = parse("====== Title ======   \n* item \t \n\n\n").unwrap();
        let section = &document.sections()[0];
        assert_eq!(section.heading(), "Title");
        assert_eq!(section.items().next().unwrap().text().plain(), "item");
    }

    #[test]
    fn consecutive_lines_form_one_paragraph() {
        let document = parse("one\ntwo\n\nthree\n").unwrap();
        let paragraphs: Vec<_> = document
            .preamble()
            .iter()
            .map(|block| match block {
                Block::Paragraph(paragraph) => paragraph.lines().len(),
                _ => 0,
            })
            .collect();
        assert_eq!(paragraphs, [2, 1]);
    }

    #[test]
    fn deep_indent_is_clamped() {
        let document = parse("* a\n\t\t\t* b\n").unwrap();
        let Block::Item(item) = &document.preamble()[0] else {
            panic!("expected item");
        };
        assert_eq!(item.children().len(), 1);
        assert!(item.children()[0].children().is_empty());
    }

    #[test]
    fn indented_item_without_parent_is_top_level() {
        let document = parse("para\n\t* orphan\n").unwrap();
        assert!(matches!(document.preamble()[1], Block::Item(_)));
    }

    #[test]
    fn empty_bullet_is_an_empty_item() {
        let document = parse("* \n").unwrap();
        let Block::Item(item) = &document.preamble()[0] else {
            panic!("expected item");
        };
        assert!(item.text().is_empty());
    }

    #[test]
    fn bold_line_is_not_a_bullet() {
        let document = parse("**Note** this\n").unwrap();
        assert!(matches!(document.preamble()[0], Block::Paragraph(_)));
    }

    #[test]
    fn invalid_creation_date() {
        let input = "Content-Type: text/x-zim-wiki\nCreation-Date: someday\n\n";
        let error = parse(input).unwrap_err();
        assert_eq!(error.line(), 2);
        assert!(matches!(
            error.kind(),
            ParseErrorKind::InvalidCreationDate(_)
        ));
    }

    #[test]
    fn header_requires_content_type_first() {
        let document = parse("Note: this is prose\n").unwrap();
        assert!(document.header().is_empty());
        assert_eq!(document.preamble().len(), 1);
    }

    #[test]
    fn unknown_header_fields_are_kept() {
        let input = "Content-Type: text/x-zim-wiki\nX-Owner: release team\n\n";
        let document = parse(input).unwrap();
        assert_eq!(document.header().get("X-Owner"), Some("release team"));
    }

    #[test]
    fn repeated_header_fields_are_kept_in_order() {
        let input = "Content-Type: text/x-zim-wiki\nX-Tag: draft\nX-Tag: release\n\n";
        let document = parse(input).unwrap();
        let tags: Vec<_> = document
            .header()
            .fields()
            .iter()
            .filter(|field| field.key == "X-Tag")
            .map(|field| field.value.as_str())
            .collect();
        assert_eq!(tags, ["draft", "release"]);
        assert_eq!(document.header().get("X-Tag"), Some("draft"));
    }

    #[test]
    fn leading_blank_line_means_no_header() {
        let document = parse("\nContent-Type: text/x-zim-wiki\n").unwrap();
        assert!(document.header().is_empty());
        assert_eq!(document.preamble().len(), 1);
    }

    #[test]
    fn error_message_includes_line() {
        let error = parse("== Title").unwrap_err();
        assert_eq!(error.to_string(), "line 1: malformed heading '== Title'");
    }
}
