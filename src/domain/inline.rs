use std::fmt;

use serde::Serialize;

/// Presentational emphasis applied to a span of text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Style {
    /// `**bold**`
    Strong,
    /// `//italic//`
    Italic,
    /// `__highlight__`
    Highlight,
    /// `~~strike~~`
    Strike,
}

impl Style {
    /// All styles, in the order the parser tries their markers.
    pub const ALL: [Self; 4] = [Self::Strong, Self::Italic, Self::Highlight, Self::Strike];

    /// The two-character delimiter that opens and closes the span.
    #[must_use]
    pub const fn marker(self) -> &'static str {
        match self {
            Self::Strong => "**",
            Self::Italic => "//",
            Self::Highlight => "__",
            Self::Strike => "~~",
        }
    }
}

/// A run of inline content within a line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Inline {
    /// Literal text.
    Text(String),
    /// Text with emphasis markup.
    Styled {
        /// The kind of emphasis.
        style: Style,
        /// The text between the markers.
        text: String,
    },
    /// `''inline verbatim''`
    Verbatim(String),
    /// `[[target]]` or `[[target|label]]`
    Link {
        /// The unresolved link target as written.
        target: String,
        /// The display label, if any.
        label: Option<String>,
    },
}

impl Inline {
    /// The text a reader sees, with all markup removed.
    #[must_use]
    pub fn plain(&self) -> &str {
        match self {
            Self::Text(text) | Self::Styled { text, .. } | Self::Verbatim(text) => text.as_str(),
            Self::Link { target, label } => label.as_deref().unwrap_or(target.as_str()),
        }
    }
}

impl fmt::Display for Inline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Styled { style, text } => {
                let marker = style.marker();
                write!(f, "{marker}{text}{marker}")
            }
            Self::Verbatim(text) => write!(f, "''{text}''"),
            Self::Link {
                target,
                label: Some(label),
            } => write!(f, "[[{target}|{label}]]"),
            Self::Link {
                target,
                label: None,
            } => write!(f, "[[{target}]]"),
        }
    }
}

/// A line of inline content.
///
/// Displays as wiki markup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Text(Vec<Inline>);

impl Text {
    /// Creates text from inline spans.
    #[must_use]
    pub const fn new(spans: Vec<Inline>) -> Self {
        Self(spans)
    }

    /// Creates unstyled text.
    #[must_use]
    pub fn plain_text(text: impl Into<String>) -> Self {
        let text = text.into();
        if text.is_empty() {
            Self::default()
        } else {
            Self(vec![Inline::Text(text)])
        }
    }

    /// The inline spans in order.
    #[must_use]
    pub fn spans(&self) -> &[Inline] {
        &self.0
    }

    /// Whether the text has no content.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The text a reader sees, with all markup removed.
    #[must_use]
    pub fn plain(&self) -> String {
        self.0.iter().map(Inline::plain).collect()
    }

    /// Link targets in order of appearance.
    pub fn links(&self) -> impl Iterator<Item = &str> {
        self.0.iter().filter_map(|span| match span {
            Inline::Link { target, .. } => Some(target.as_str()),
            _ => None,
        })
    }
}

impl fmt::Display for Text {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.iter().try_for_each(|span| write!(f, "{span}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Text {
        Text::new(vec![
            Inline::Text("Run ".to_string()),
            Inline::Verbatim("make dist".to_string()),
            Inline::Text(" then see ".to_string()),
            Inline::Link {
                target: "Dev:Release".to_string(),
                label: Some("the checklist".to_string()),
            },
            Inline::Text(", ".to_string()),
            Inline::Styled {
                style: Style::Strong,
                text: "carefully".to_string(),
            },
        ])
    }

    #[test]
    fn display_as_markup() {
        assert_eq!(
            sample().to_string(),
            "Run ''make dist'' then see [[Dev:Release|the checklist]], **carefully**"
        );
    }

    #[test]
    fn plain_strips_markup() {
        assert_eq!(
            sample().plain(),
            "Run make dist then see the checklist, carefully"
        );
    }

    #[test]
    fn links_in_order() {
        assert_eq!(sample().links().collect::<Vec<_>>(), vec!["Dev:Release"]);
    }

    #[test]
    fn unlabelled_link_shows_target() {
        let link = Inline::Link {
            target: "Home".to_string(),
            label: None,
        };
        assert_eq!(link.plain(), "Home");
        assert_eq!(link.to_string(), "[[Home]]");
    }

    #[test]
    fn empty_plain_text() {
        assert!(Text::plain_text("").is_empty());
    }
}
