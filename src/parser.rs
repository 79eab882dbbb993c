use std::sync::LazyLock;

use regex::Regex;

use crate::block::{Block, Emphasis, ListStyle};
use crate::config::{Config, EmphasisConfig, MarkerConfig};
use crate::emphasis::extract_hint;
use crate::error::RenderError;
use crate::inline::parse_inline;
use crate::sink::DocumentSink;
use crate::table::extract_table;

static NUMBERED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\.\s").expect("numbered list pattern is valid"));

/// What a single line turned out to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind<'a> {
    PageMarker,
    Title,
    Separator,
    Blank,
    /// Opens a new top-level section. Not terminal: the line is classified again.
    SectionStart,
    Heading { level: u8, text: &'a str },
    Bullet(&'a str),
    Numbered(&'a str),
    TableStart,
    Rule,
    Paragraph(&'a str),
}

type Matcher = for<'a> fn(&Converter<'_>, &'a str) -> Option<LineKind<'a>>;

// Priority order, first match wins.
const MATCHERS: &[Matcher] = &[
    page_marker,
    title,
    separator,
    blank,
    section_start,
    heading,
    bullet,
    numbered,
    table_start,
    rule,
    paragraph,
];

/// Counts reported at the end of a conversion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    /// Lines consumed, always the full input.
    pub lines: usize,
    pub commands: usize,
    pub tables: usize,
    pub skipped: usize,
}

/// One conversion pass over a line sequence.
///
/// Holds the only mutable state of the pass, the pending-title flag, so a fresh
/// converter is needed for every document.
pub struct Converter<'c> {
    markers: &'c MarkerConfig,
    emphasis: Option<&'c EmphasisConfig>,
    title_pending: bool,
}

impl<'c> Converter<'c> {
    pub fn new(markers: &'c MarkerConfig) -> Self {
        Self {
            markers,
            emphasis: None,
            title_pending: markers.skip_first_heading,
        }
    }

    pub fn from_config(config: &'c Config) -> Self {
        let converter = Self::new(&config.markers);
        if config.emphasis.enabled {
            converter.with_emphasis(&config.emphasis)
        } else {
            converter
        }
    }

    /// Attach emphasis hints to plain paragraphs that start with a marker character.
    pub fn with_emphasis(mut self, emphasis: &'c EmphasisConfig) -> Self {
        self.emphasis = Some(emphasis);
        self
    }

    /// Classify a line against the full matcher chain.
    pub fn classify<'a>(&self, line: &'a str) -> LineKind<'a> {
        self.classify_from(line, 0).1
    }

    /// Run the matchers starting at position `from` and return the winning
    /// position along with the kind.
    fn classify_from<'a>(&self, line: &'a str, from: usize) -> (usize, LineKind<'a>) {
        MATCHERS
            .iter()
            .enumerate()
            .skip(from)
            .find_map(|(position, matcher)| matcher(self, line).map(|kind| (position, kind)))
            .unwrap_or((MATCHERS.len(), LineKind::Paragraph(line)))
    }

    /// Walk every line once, sending the resulting commands to `sink`.
    pub fn run<L, S>(&mut self, lines: &[L], sink: &mut S) -> Result<Summary, RenderError>
    where
        L: AsRef<str>,
        S: DocumentSink + ?Sized,
    {
        let mut summary = Summary::default();
        let mut cursor = 0;

        while cursor < lines.len() {
            let next = self.step(lines, cursor, sink, &mut summary)?;
            debug_assert!(next > cursor, "cursor must advance");
            cursor = next;
        }

        summary.lines = cursor;
        Ok(summary)
    }

    /// Handle the line at `cursor` and return the index of the next unvisited line.
    fn step<L, S>(
        &mut self,
        lines: &[L],
        cursor: usize,
        sink: &mut S,
        summary: &mut Summary,
    ) -> Result<usize, RenderError>
    where
        L: AsRef<str>,
        S: DocumentSink + ?Sized,
    {
        let line = lines[cursor].as_ref().trim_end();
        let mut from = 0;

        loop {
            let (position, kind) = self.classify_from(line, from);
            from = position + 1;
            log::trace!("line {}: {kind:?}", cursor + 1);

            match kind {
                LineKind::PageMarker | LineKind::Separator | LineKind::Blank => {
                    summary.skipped += 1;
                }
                LineKind::Title => {
                    log::debug!("line {}: treating {line:?} as the document title", cursor + 1);
                    self.title_pending = false;
                    summary.skipped += 1;
                }
                LineKind::SectionStart => {
                    log::debug!("line {}: section start, breaking page", cursor + 1);
                    sink.page_break()?;
                    summary.commands += 1;
                    continue;
                }
                LineKind::Heading { level, text } => {
                    sink.heading(level, text)?;
                    summary.commands += 1;
                }
                LineKind::Bullet(text) => {
                    sink.paragraph(&parse_inline(text), ListStyle::Bullet, None)?;
                    summary.commands += 1;
                }
                LineKind::Numbered(text) => {
                    sink.paragraph(&parse_inline(text), ListStyle::Numbered, None)?;
                    summary.commands += 1;
                }
                LineKind::TableStart => {
                    match extract_table(lines, cursor, self.markers.table) {
                        (Some(table), end) => {
                            log::debug!(
                                "lines {}..{end}: table with {} columns and {} rows",
                                cursor + 1,
                                table.headers.len(),
                                table.rows.len()
                            );
                            sink.table(&table)?;
                            summary.commands += 1;
                            summary.tables += 1;
                            return Ok(end);
                        }
                        (None, end) if end > cursor => {
                            summary.skipped += end - cursor;
                            return Ok(end);
                        }
                        // Not a table, keep classifying the same line.
                        (None, _) => continue,
                    }
                }
                LineKind::Rule => {
                    sink.rule()?;
                    summary.commands += 1;
                }
                LineKind::Paragraph(text) => {
                    let (emphasis, text) = self.emphasis_hint(text);
                    sink.paragraph(&parse_inline(text), ListStyle::None, emphasis)?;
                    summary.commands += 1;
                }
            }

            return Ok(cursor + 1);
        }
    }

    fn emphasis_hint<'a>(&self, text: &'a str) -> (Option<Emphasis>, &'a str) {
        match self.emphasis {
            Some(config) => extract_hint(text, config),
            None => (None, text),
        }
    }

    fn is_page_marker(&self, line: &str) -> bool {
        self.markers
            .page_break
            .iter()
            .any(|marker| !marker.is_empty() && line.starts_with(marker.as_str()))
    }

    fn has_rule_exclusion(&self, line: &str) -> bool {
        self.markers
            .rule_exclude
            .iter()
            .any(|word| !word.is_empty() && line.contains(word.as_str()))
    }

    fn has_section_marker(&self, line: &str) -> bool {
        self.markers
            .sections
            .iter()
            .any(|marker| !marker.is_empty() && line.contains(marker.as_str()))
    }
}

fn page_marker<'a>(converter: &Converter<'_>, line: &'a str) -> Option<LineKind<'a>> {
    converter
        .is_page_marker(line)
        .then_some(LineKind::PageMarker)
}

fn title<'a>(converter: &Converter<'_>, line: &'a str) -> Option<LineKind<'a>> {
    (converter.title_pending && line.starts_with(converter.markers.heading))
        .then_some(LineKind::Title)
}

fn separator<'a>(converter: &Converter<'_>, line: &'a str) -> Option<LineKind<'a>> {
    let separator = converter.markers.separator.as_str();
    (!separator.is_empty() && line.trim() == separator).then_some(LineKind::Separator)
}

fn blank<'a>(_: &Converter<'_>, line: &'a str) -> Option<LineKind<'a>> {
    line.trim().is_empty().then_some(LineKind::Blank)
}

fn section_start<'a>(converter: &Converter<'_>, line: &'a str) -> Option<LineKind<'a>> {
    converter
        .has_section_marker(line)
        .then_some(LineKind::SectionStart)
}

fn heading<'a>(converter: &Converter<'_>, line: &'a str) -> Option<LineKind<'a>> {
    let marker = converter.markers.heading;
    let level = line.chars().take_while(|&c| c == marker).count();
    if !(1..=3).contains(&level) {
        return None;
    }
    let text = line[level * marker.len_utf8()..].strip_prefix(' ')?;
    Some(LineKind::Heading {
        level: level as u8,
        text,
    })
}

fn bullet<'a>(converter: &Converter<'_>, line: &'a str) -> Option<LineKind<'a>> {
    converter
        .markers
        .bullets
        .iter()
        .filter(|marker| !marker.is_empty())
        .find_map(|marker| line.strip_prefix(marker.as_str()))
        .map(|rest| LineKind::Bullet(rest.trim()))
}

fn numbered<'a>(_: &Converter<'_>, line: &'a str) -> Option<LineKind<'a>> {
    NUMBERED
        .find(line)
        .map(|prefix| LineKind::Numbered(&line[prefix.end()..]))
}

fn table_start<'a>(converter: &Converter<'_>, line: &'a str) -> Option<LineKind<'a>> {
    line.trim_start()
        .starts_with(converter.markers.table)
        .then_some(LineKind::TableStart)
}

fn rule<'a>(converter: &Converter<'_>, line: &'a str) -> Option<LineKind<'a>> {
    let marker = converter.markers.rule.as_str();
    let trimmed = line.trim_start();
    let is_rule = !marker.is_empty()
        && trimmed.starts_with(marker)
        && !converter.is_page_marker(trimmed)
        && !converter.has_section_marker(line)
        && !converter.has_rule_exclusion(line);
    is_rule.then_some(LineKind::Rule)
}

fn paragraph<'a>(_: &Converter<'_>, line: &'a str) -> Option<LineKind<'a>> {
    Some(LineKind::Paragraph(line))
}

/// Convert text into commands for `sink` using the markers from `config`.
pub fn convert<S>(text: &str, config: &Config, sink: &mut S) -> Result<Summary, RenderError>
where
    S: DocumentSink + ?Sized,
{
    let lines: Vec<&str> = text.lines().collect();
    let summary = Converter::from_config(config).run(&lines, sink)?;
    log::info!(
        "converted {} lines into {} commands ({} tables, {} lines skipped)",
        summary.lines,
        summary.commands,
        summary.tables,
        summary.skipped
    );
    Ok(summary)
}

/// Parse text into its command stream.
pub fn parse(text: &str, config: &Config) -> Vec<Block> {
    let mut blocks: Vec<Block> = Vec::new();
    // Collecting into a Vec never fails.
    let _ = convert(text, config, &mut blocks);
    blocks
}
