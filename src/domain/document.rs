use chrono::{DateTime, FixedOffset, SecondsFormat};
use serde::Serialize;

use crate::domain::{PageName, Text};

/// The content type written into the header of new documents.
pub const CONTENT_TYPE: &str = "text/x-zim-wiki";

/// A parsed wiki document.
///
/// A document is an optional header block, an optional preamble (content
/// before the first heading), and an ordered sequence of sections.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Document {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<PageName>,
    header: Header,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    preamble: Vec<Block>,
    sections: Vec<Section>,
}

impl Document {
    /// Creates an empty document.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty document with the given header.
    #[must_use]
    pub fn with_header(header: Header) -> Self {
        Self {
            header,
            ..Self::default()
        }
    }

    /// Attaches a page name to the document.
    #[must_use]
    pub fn named(mut self, name: PageName) -> Self {
        self.name = Some(name);
        self
    }

    /// The page name, if the document belongs to a notebook.
    #[must_use]
    pub const fn name(&self) -> Option<&PageName> {
        self.name.as_ref()
    }

    /// The header fields.
    #[must_use]
    pub const fn header(&self) -> &Header {
        &self.header
    }

    /// Blocks before the first heading.
    #[must_use]
    pub fn preamble(&self) -> &[Block] {
        &self.preamble
    }

    /// The sections in document order.
    #[must_use]
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// Whether the document has no content at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.header.is_empty() && self.preamble.is_empty() && self.sections.is_empty()
    }

    /// The title: the heading of the first level-1 section, if any.
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.sections
            .iter()
            .find(|section| section.level() == 1)
            .map(Section::heading)
    }

    /// Appends a block before the first heading.
    pub fn push_preamble(&mut self, block: Block) {
        self.preamble.push(block);
    }

    /// Appends a section.
    pub fn push_section(&mut self, section: Section) {
        self.sections.push(section);
    }

    /// Every block in document order, preamble first.
    pub fn blocks(&self) -> impl Iterator<Item = &Block> {
        self.preamble
            .iter()
            .chain(self.sections.iter().flat_map(|section| section.blocks.iter()))
    }

    /// Every link target in the document, in order of appearance.
    ///
    /// Links inside nested items are included.
    #[must_use]
    pub fn links(&self) -> Vec<&str> {
        let mut links = Vec::new();
        for block in self.blocks() {
            block.collect_links(&mut links);
        }
        links
    }

    /// Counts the list items in the document, nested items included.
    #[must_use]
    pub fn item_count(&self) -> usize {
        self.blocks()
            .filter_map(Block::as_item)
            .map(Item::count)
            .sum()
    }

    /// The blocks new content is appended to: the last section's, or the
    /// preamble before any heading.
    pub(crate) fn blocks_mut(&mut self) -> &mut Vec<Block> {
        match self.sections.last_mut() {
            Some(section) => &mut section.blocks,
            None => &mut self.preamble,
        }
    }

    pub(crate) fn set_header(&mut self, header: Header) {
        self.header = header;
    }
}

/// A single `Key: value` header field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Field {
    /// The field name, e.g. `Content-Type`.
    pub key: String,
    /// The raw field value.
    pub value: String,
}

/// The header block at the top of a document.
///
/// Fields keep the order they were written in. Parsing keeps repeated keys
/// as separate fields; [`Header::insert`] replaces the first match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Header {
    fields: Vec<Field>,
}

impl Header {
    /// Creates the standard header for a new document.
    #[must_use]
    pub fn new(wiki_format: &str, created: DateTime<FixedOffset>) -> Self {
        let mut header = Self::default();
        header.insert("Content-Type", CONTENT_TYPE);
        header.insert("Wiki-Format", wiki_format);
        header.insert(
            "Creation-Date",
            created.to_rfc3339_opts(SecondsFormat::Secs, false),
        );
        header
    }

    /// Sets a field, replacing any existing value for the same key.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        if let Some(field) = self.fields.iter_mut().find(|field| field.key == key) {
            field.value = value;
        } else {
            self.fields.push(Field { key, value });
        }
    }

    /// Appends a field, keeping any earlier field with the same key.
    pub(crate) fn push(&mut self, key: &str, value: &str) {
        self.fields.push(Field {
            key: key.to_string(),
            value: value.to_string(),
        });
    }

    /// Looks up a field value by key.
    ///
    /// If the key is repeated, the first value is returned.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|field| field.key == key)
            .map(|field| field.value.as_str())
    }

    /// The fields in order.
    #[must_use]
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Whether the header has no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// The `Content-Type` field.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.get("Content-Type")
    }

    /// The `Wiki-Format` field.
    #[must_use]
    pub fn wiki_format(&self) -> Option<&str> {
        self.get("Wiki-Format")
    }

    /// The `Creation-Date` field as a timestamp.
    ///
    /// Returns `None` if the field is absent or not an RFC 3339 timestamp.
    #[must_use]
    pub fn creation_date(&self) -> Option<DateTime<FixedOffset>> {
        self.get("Creation-Date")
            .and_then(|value| DateTime::parse_from_rfc3339(value).ok())
    }
}

/// A heading and the blocks below it, up to the next heading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Section {
    level: u8,
    heading: String,
    blocks: Vec<Block>,
}

impl Section {
    /// The most prominent heading level.
    pub const MIN_LEVEL: u8 = 1;
    /// The least prominent heading level.
    pub const MAX_LEVEL: u8 = 5;

    /// Creates an empty section.
    ///
    /// The level is clamped to `1..=5`.
    #[must_use]
    pub fn new(level: u8, heading: impl Into<String>) -> Self {
        Self {
            level: level.clamp(Self::MIN_LEVEL, Self::MAX_LEVEL),
            heading: heading.into(),
            blocks: Vec::new(),
        }
    }

    /// The heading level, 1 being the most prominent.
    #[must_use]
    pub const fn level(&self) -> u8 {
        self.level
    }

    /// The heading text, without delimiters.
    #[must_use]
    pub fn heading(&self) -> &str {
        &self.heading
    }

    /// The blocks in order.
    #[must_use]
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// The top-level list items in order.
    pub fn items(&self) -> impl Iterator<Item = &Item> {
        self.blocks.iter().filter_map(Block::as_item)
    }

    /// Appends a block.
    pub fn push(&mut self, block: Block) {
        self.blocks.push(block);
    }

    /// Builder form of [`Section::push`].
    #[must_use]
    pub fn with(mut self, block: Block) -> Self {
        self.push(block);
        self
    }
}

/// A unit of content within a section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Block {
    /// A list item, with any nested sub-items.
    Item(Item),
    /// Consecutive lines of text.
    Paragraph(Paragraph),
    /// Lines between `'''` fences, kept literally.
    Verbatim(Verbatim),
}

impl Block {
    /// Returns the item if this block is one.
    #[must_use]
    pub const fn as_item(&self) -> Option<&Item> {
        match self {
            Self::Item(item) => Some(item),
            _ => None,
        }
    }

    fn collect_links<'a>(&'a self, links: &mut Vec<&'a str>) {
        match self {
            Self::Item(item) => item.collect_links(links),
            Self::Paragraph(paragraph) => {
                links.extend(paragraph.lines.iter().flat_map(Text::links));
            }
            Self::Verbatim(_) => {}
        }
    }
}

/// Consecutive non-blank lines of text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Paragraph {
    lines: Vec<Text>,
}

impl Paragraph {
    /// Creates a paragraph from its lines.
    #[must_use]
    pub const fn new(lines: Vec<Text>) -> Self {
        Self { lines }
    }

    /// The lines in order.
    #[must_use]
    pub fn lines(&self) -> &[Text] {
        &self.lines
    }

    pub(crate) fn push(&mut self, line: Text) {
        self.lines.push(line);
    }
}

/// A fenced block of literal lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Verbatim {
    lines: Vec<String>,
}

impl Verbatim {
    /// Creates a verbatim block from its lines.
    #[must_use]
    pub const fn new(lines: Vec<String>) -> Self {
        Self { lines }
    }

    /// The literal lines in order.
    #[must_use]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }
}

/// The state of a checkbox item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckState {
    /// `[ ]`
    Open,
    /// `[*]`
    Done,
    /// `[x]`
    Cancelled,
    /// `[>]`
    Migrated,
}

impl CheckState {
    /// The character between the brackets.
    #[must_use]
    pub const fn symbol(self) -> char {
        match self {
            Self::Open => ' ',
            Self::Done => '*',
            Self::Cancelled => 'x',
            Self::Migrated => '>',
        }
    }

    /// Parses the character between the brackets.
    #[must_use]
    pub const fn from_symbol(symbol: char) -> Option<Self> {
        match symbol {
            ' ' => Some(Self::Open),
            '*' => Some(Self::Done),
            'x' => Some(Self::Cancelled),
            '>' => Some(Self::Migrated),
            _ => None,
        }
    }
}

/// The marker that introduces a list item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Bullet {
    /// `* item`
    Plain,
    /// `[ ] item`, `[*] item`, ...
    Checkbox(CheckState),
    /// `1. item` or `a. item`; holds the label without the dot.
    Numbered(String),
}

impl Bullet {
    /// The bullet as written in wiki markup.
    #[must_use]
    pub fn marker(&self) -> String {
        match self {
            Self::Plain => "*".to_string(),
            Self::Checkbox(state) => format!("[{}]", state.symbol()),
            Self::Numbered(label) => format!("{label}."),
        }
    }
}

/// A list entry of text with optional nested sub-items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Item {
    bullet: Bullet,
    text: Text,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    children: Vec<Item>,
}

impl Item {
    /// Creates an item with no children.
    #[must_use]
    pub const fn new(bullet: Bullet, text: Text) -> Self {
        Self {
            bullet,
            text,
            children: Vec::new(),
        }
    }

    /// Adds a nested sub-item.
    #[must_use]
    pub fn with_child(mut self, child: Self) -> Self {
        self.children.push(child);
        self
    }

    /// The bullet kind.
    #[must_use]
    pub const fn bullet(&self) -> &Bullet {
        &self.bullet
    }

    /// The item text.
    #[must_use]
    pub const fn text(&self) -> &Text {
        &self.text
    }

    /// The nested sub-items in order.
    #[must_use]
    pub fn children(&self) -> &[Self] {
        &self.children
    }

    /// The checkbox state, if this is a checkbox item.
    #[must_use]
    pub const fn check_state(&self) -> Option<CheckState> {
        match self.bullet {
            Bullet::Checkbox(state) => Some(state),
            _ => None,
        }
    }

    /// This item plus all of its descendants.
    #[must_use]
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(Self::count).sum::<usize>()
    }

    /// Attaches `item` at `depth` levels below this item.
    ///
    /// If there is no item to nest under at the requested depth, the item is
    /// attached as deep as the existing tree allows.
    pub(crate) fn nest(&mut self, depth: usize, item: Self) {
        match self.children.last_mut() {
            Some(last) if depth > 1 => last.nest(depth - 1, item),
            _ => self.children.push(item),
        }
    }

    fn collect_links<'a>(&'a self, links: &mut Vec<&'a str>) {
        links.extend(self.text.links());
        for child in &self.children {
            child.collect_links(links);
        }
    }
}
