use crate::{
    domain::{Inline, Style, Text},
    parser::{ParseError, ParseErrorKind},
};

const LINK_OPEN: &str = "[[";
const LINK_CLOSE: &str = "]]";
const VERBATIM: &str = "''";

/// Parses the inline markup of a single line.
///
/// `number` is the 1-based line number reported in errors.
///
/// Adjacent plain characters are merged into a single [`Inline::Text`] run.
/// Span contents are kept literally: markup is not nested.
///
/// # Errors
///
/// Returns a [`ParseError`] if an emphasis or verbatim marker, or a `[[`,
/// has no closing counterpart on the line.
pub fn parse_inline(line: &str, number: usize) -> Result<Text, ParseError> {
    let mut spans = Vec::new();
    let mut plain = String::new();
    let mut rest = line;

    while let Some(ch) = rest.chars().next() {
        if let Some(after) = rest.strip_prefix(LINK_OPEN) {
            let end = after
                .find(LINK_CLOSE)
                .ok_or_else(|| ParseError::new(number, ParseErrorKind::UnterminatedLink))?;
            let (target, label) = match after[..end].split_once('|') {
                Some((target, label)) => (target.trim(), Some(label.trim().to_string())),
                None => (after[..end].trim(), None),
            };
            flush(&mut spans, &mut plain);
            spans.push(Inline::Link {
                target: target.to_string(),
                label,
            });
            rest = &after[end + LINK_CLOSE.len()..];
            continue;
        }

        if let Some(after) = rest.strip_prefix(VERBATIM) {
            let end = after.find(VERBATIM).ok_or_else(|| {
                ParseError::new(number, ParseErrorKind::UnterminatedInline(VERBATIM))
            })?;
            flush(&mut spans, &mut plain);
            spans.push(Inline::Verbatim(after[..end].to_string()));
            rest = &after[end + VERBATIM.len()..];
            continue;
        }

        if let Some(style) = Style::ALL
            .into_iter()
            .find(|style| rest.starts_with(style.marker()))
        {
            let marker = style.marker();
            let after = &rest[marker.len()..];

            if style == Style::Italic && in_url(&plain, after) {
                plain.push_str(marker);
                rest = after;
                continue;
            }

            let end = closing(after, style).ok_or_else(|| {
                ParseError::new(number, ParseErrorKind::UnterminatedInline(marker))
            })?;
            flush(&mut spans, &mut plain);
            spans.push(Inline::Styled {
                style,
                text: after[..end].to_string(),
            });
            rest = &after[end + marker.len()..];
            continue;
        }

        plain.push(ch);
        rest = &rest[ch.len_utf8()..];
    }

    flush(&mut spans, &mut plain);
    Ok(Text::new(spans))
}

/// Finds the closing marker for `style` in `text`.
fn closing(text: &str, style: Style) -> Option<usize> {
    let marker = style.marker();
    text.match_indices(marker)
        .map(|(index, _)| index)
        .find(|&index| {
            style != Style::Italic || !in_url(&text[..index], &text[index + marker.len()..])
        })
}

/// Whether a `//` between `before` and `after` belongs to a URL rather than
/// italic markup.
///
/// That is the case right after a scheme (`http://`), and inside a word that
/// already holds a `://` when the URL carries on past the slashes
/// (`http://example.org//path`).
fn in_url(before: &str, after: &str) -> bool {
    if before.ends_with(':') {
        return true;
    }
    let word = before.rsplit(char::is_whitespace).next().unwrap_or_default();
    word.contains("://") && after.chars().next().is_some_and(|c| !c.is_whitespace())
}

fn flush(spans: &mut Vec<Inline>, plain: &mut String) {
    if !plain.is_empty() {
        spans.push(Inline::Text(std::mem::take(plain)));
    }
}
