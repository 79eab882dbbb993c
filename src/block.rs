use serde::{Deserialize, Serialize};

/// Inline formatting applied to a run of text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Style {
    Plain,
    Bold,
    Italic,
}

/// A run of text with a single style. Styles never nest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub style: Style,
    pub text: String,
}

impl Span {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            style: Style::Plain,
            text: text.into(),
        }
    }

    pub fn bold(text: impl Into<String>) -> Self {
        Self {
            style: Style::Bold,
            text: text.into(),
        }
    }

    pub fn italic(text: impl Into<String>) -> Self {
        Self {
            style: Style::Italic,
            text: text.into(),
        }
    }
}

/// How a paragraph is presented in the flow of the document
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListStyle {
    #[default]
    None,
    Bullet,
    Numbered,
}

/// Colour/weight hint taken from a leading marker character on a plain paragraph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Emphasis {
    Highlight,
    Warning,
    Positive,
    Note,
    Strong,
}

/// A pipe table. Rows never have more cells than the header.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Structural command produced by the line classifier, consumed in order by a sink
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Block {
    Heading {
        level: u8,
        text: String,
    },
    Paragraph {
        spans: Vec<Span>,
        list: ListStyle,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        emphasis: Option<Emphasis>,
    },
    Table(Table),
    PageBreak,
    Rule,
}

impl Block {
    pub fn heading(level: u8, text: impl Into<String>) -> Self {
        Block::Heading {
            level,
            text: text.into(),
        }
    }

    pub fn paragraph(spans: Vec<Span>, list: ListStyle) -> Self {
        Block::Paragraph {
            spans,
            list,
            emphasis: None,
        }
    }
}
