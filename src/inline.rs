use std::sync::LazyLock;

use regex::Regex;

use crate::block::{Span, Style};

// Leftmost alternative wins: bold, italic, asterisk-free run, lone asterisk.
static INLINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\*\*(?P<bold>.*?)\*\*|\*(?P<italic>.*?)\*|(?P<plain>[^*]+)|\*")
        .expect("inline pattern is valid")
});

/// Split one line of text into bold, italic and plain spans, left to right.
///
/// Markers that cannot be paired are kept as literal text, so this never fails.
/// A delimiter pair around nothing (`**`, `****`) is also kept literally.
pub fn parse_inline(text: &str) -> Vec<Span> {
    let mut spans = Vec::new();

    for caps in INLINE.captures_iter(text) {
        let span = if let Some(bold) = caps.name("bold") {
            styled(Style::Bold, bold.as_str(), &caps[0])
        } else if let Some(italic) = caps.name("italic") {
            styled(Style::Italic, italic.as_str(), &caps[0])
        } else if let Some(plain) = caps.name("plain") {
            Span::plain(plain.as_str())
        } else {
            Span::plain(&caps[0])
        };
        spans.push(span);
    }

    spans
}

fn styled(style: Style, inner: &str, whole: &str) -> Span {
    if inner.is_empty() {
        return Span::plain(whole);
    }
    Span {
        style,
        text: inner.to_string(),
    }
}

/// Concatenate the text of a span sequence, dropping styles.
pub fn plain_text(spans: &[Span]) -> String {
    spans.iter().map(|span| span.text.as_str()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("hello world")]
    #[case("  leading and trailing  ")]
    #[case("營收 $910億 | 2025")]
    fn text_without_asterisks_is_one_plain_span(#[case] text: &str) {
        assert_eq!(parse_inline(text), vec![Span::plain(text)]);
    }

    #[test]
    fn empty_input_has_no_spans() {
        assert_eq!(parse_inline(""), vec![]);
    }

    #[test]
    fn bold_between_plain() {
        let spans = parse_inline("A**B**C");
        assert_eq!(
            spans,
            vec![Span::plain("A"), Span::bold("B"), Span::plain("C")]
        );
        assert_eq!(plain_text(&spans), "ABC");
    }

    #[test]
    fn italic_between_plain() {
        assert_eq!(
            parse_inline("an *important* note"),
            vec![
                Span::plain("an "),
                Span::italic("important"),
                Span::plain(" note")
            ]
        );
    }

    #[test]
    fn bold_is_shortest_run() {
        assert_eq!(
            parse_inline("**one** and **two**"),
            vec![Span::bold("one"), Span::plain(" and "), Span::bold("two")]
        );
    }

    #[test]
    fn mixed_bold_and_italic() {
        assert_eq!(
            parse_inline("**Risk:** *high*"),
            vec![Span::bold("Risk:"), Span::plain(" "), Span::italic("high")]
        );
    }

    #[test]
    fn unterminated_marker_stays_literal() {
        assert_eq!(
            parse_inline("*dangling"),
            vec![Span::plain("*"), Span::plain("dangling")]
        );
        assert_eq!(plain_text(&parse_inline("5 * 3")), "5 * 3");
    }

    #[test]
    fn empty_delimiters_stay_literal() {
        assert_eq!(
            parse_inline("a ** b"),
            vec![Span::plain("a "), Span::plain("**"), Span::plain(" b")]
        );
    }

    #[test]
    fn triple_asterisks_prefer_bold() {
        assert_eq!(
            parse_inline("***both***"),
            vec![Span::bold("*both"), Span::plain("*")]
        );
    }
}
