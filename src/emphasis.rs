use crate::block::Emphasis;
use crate::config::EmphasisConfig;

/// Peel a leading emphasis marker off a paragraph line.
///
/// The hint comes from the first character. All leading marker characters and
/// the whitespace after them are removed from the returned text.
pub fn extract_hint<'a>(text: &'a str, config: &EmphasisConfig) -> (Option<Emphasis>, &'a str) {
    let hint_for = |c: char| config.markers.iter().find(|m| m.marker == c).map(|m| m.hint);

    let Some(hint) = text.chars().next().and_then(hint_for) else {
        return (None, text);
    };

    let rest = text.trim_start_matches(|c: char| hint_for(c).is_some());
    (Some(hint), rest.trim_start())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("★ Core question: capital efficiency", Some(Emphasis::Highlight), "Core question: capital efficiency")]
    #[case("! Margin pressure", Some(Emphasis::Warning), "Margin pressure")]
    #[case("+ Cloud revenue up", Some(Emphasis::Positive), "Cloud revenue up")]
    #[case("▸ Context", Some(Emphasis::Note), "Context")]
    #[case("#hashtag", Some(Emphasis::Strong), "hashtag")]
    #[case("★! stacked", Some(Emphasis::Highlight), "stacked")]
    #[case("plain sentence", None, "plain sentence")]
    #[case("", None, "")]
    fn hints(#[case] text: &str, #[case] hint: Option<Emphasis>, #[case] rest: &str) {
        assert_eq!(extract_hint(text, &EmphasisConfig::default()), (hint, rest));
    }

    #[test]
    fn only_configured_markers_count() {
        let config = EmphasisConfig {
            enabled: true,
            markers: Vec::new(),
        };
        assert_eq!(extract_hint("★ text", &config), (None, "★ text"));
    }
}
