use crate::block::{Emphasis, ListStyle, Span, Style, Table};
use crate::config::Config;
use crate::error::RenderError;
use crate::inline::parse_inline;
use crate::sink::DocumentSink;

/// Builds Typst markup from the command stream.
///
/// Page setup, fonts and front matter are written when the sink is created;
/// every command after that appends to the body.
pub struct TypstSink<'c> {
    config: &'c Config,
    out: String,
    in_list: bool,
}

impl<'c> TypstSink<'c> {
    pub fn new(config: &'c Config) -> Self {
        let mut sink = Self {
            config,
            out: String::new(),
            in_list: false,
        };
        sink.emit_preamble();
        sink.emit_front_matter();
        sink
    }

    /// The finished markup.
    pub fn finish(mut self) -> String {
        self.close_list();
        self.out
    }

    fn emit_preamble(&mut self) {
        let page = &self.config.page;
        let font = &self.config.font;
        let numbering = if page.numbers { "\"1\"" } else { "none" };

        self.out.push_str(&format!(
            "#set page(paper: {}, margin: {}, numbering: {numbering})\n",
            quote(&page.paper),
            page.margin
        ));
        self.out.push_str(&format!(
            "#set text(font: {}, size: {}",
            quote(&font.family),
            font.size
        ));
        if let Some(lang) = &font.lang {
            self.out.push_str(&format!(", lang: {}", quote(lang)));
        }
        self.out.push_str(")\n");

        // Set up paragraph settings to prevent widows/orphans
        self.out.push_str("#set par(linebreaks: \"optimized\")\n");

        for level in 1..=3 {
            if let Some(size) = self.config.headings.size_for_level(level) {
                self.out.push_str(&format!(
                    "#show heading.where(level: {level}): set text(size: {size})\n"
                ));
            }
        }
        self.out.push('\n');
    }

    fn emit_front_matter(&mut self) {
        let front = &self.config.front_matter;

        if let Some(title) = &front.title {
            let mut page = String::from("#align(center)[\n  #v(30%)\n");
            page.push_str("  #text(size: 28pt, weight: \"bold\")[");
            escape_text(title, &mut page);
            page.push_str("]\n");
            if let Some(subtitle) = &front.subtitle {
                page.push_str("  #v(1em)\n  #text(size: 18pt)[");
                escape_text(subtitle, &mut page);
                page.push_str("]\n");
            }
            if let Some(date) = &front.date {
                page.push_str("  #v(2em)\n  #text(size: 14pt)[");
                escape_text(date, &mut page);
                page.push_str("]\n");
            }
            page.push_str("]\n#pagebreak()\n\n");
            self.out.push_str(&page);
        }

        if front.toc {
            self.out.push_str("#outline(title: [");
            escape_text(&front.toc_title, &mut self.out);
            self.out.push_str("])\n");
            if let Some(note) = &front.note {
                self.out.push_str("#v(1em)\n#text(size: 10pt, style: \"italic\")[");
                escape_text(note, &mut self.out);
                self.out.push_str("]\n");
            }
            self.out.push_str("#pagebreak()\n\n");
        }
    }

    /// A blank line ends a run of list items.
    fn close_list(&mut self) {
        if self.in_list {
            self.out.push('\n');
            self.in_list = false;
        }
    }
}

impl DocumentSink for TypstSink<'_> {
    fn heading(&mut self, level: u8, text: &str) -> Result<(), RenderError> {
        if !(1..=6).contains(&level) {
            return Err(RenderError::InvalidHeadingLevel(level));
        }
        self.close_list();
        for _ in 0..level {
            self.out.push('=');
        }
        self.out.push(' ');
        escape_text(text, &mut self.out);
        self.out.push_str("\n\n");
        Ok(())
    }

    fn paragraph(
        &mut self,
        spans: &[Span],
        list: ListStyle,
        emphasis: Option<Emphasis>,
    ) -> Result<(), RenderError> {
        let mut content = String::new();
        spans_to_typst(spans, &mut content);

        match list {
            ListStyle::Bullet | ListStyle::Numbered => {
                self.out
                    .push_str(if list == ListStyle::Bullet { "- " } else { "+ " });
                self.out.push_str(&content);
                self.out.push('\n');
                self.in_list = true;
            }
            ListStyle::None => {
                self.close_list();
                let config = self.config;
                match emphasis.and_then(|hint| config.emphasis.color_for(hint).map(|c| (hint, c))) {
                    Some((hint, color)) => {
                        self.out.push_str(&format!("#text(fill: rgb({})", quote(color)));
                        if matches!(hint, Emphasis::Highlight | Emphasis::Strong) {
                            self.out.push_str(", weight: \"bold\"");
                        }
                        self.out.push_str(")[");
                        self.out.push_str(&content);
                        self.out.push(']');
                    }
                    None => self.out.push_str(&content),
                }
                self.out.push_str("\n\n");
            }
        }
        Ok(())
    }

    fn table(&mut self, table: &Table) -> Result<(), RenderError> {
        let col_count = table.headers.len();
        if col_count == 0 {
            return Err(RenderError::EmptyTable);
        }
        self.close_list();

        let style = &self.config.table;
        let keep_together = style.keep_together;
        if keep_together {
            // Keep tables together when possible
            self.out.push_str("#block(breakable: false)[\n");
        }

        let mut out = String::from("#table(\n");
        out.push_str(&format!("  columns: {col_count},\n"));

        // Header cells (bold)
        out.push_str("  table.header(\n");
        for cell in &table.headers {
            out.push_str(&format!(
                "    [#text(size: {}, weight: \"bold\")[",
                style.header_size
            ));
            spans_to_typst(&parse_inline(cell), &mut out);
            out.push_str("]],\n");
        }
        out.push_str("  ),\n");

        // Data rows, padded to the header width
        for row in &table.rows {
            for index in 0..col_count {
                match row.get(index) {
                    Some(cell) if !cell.is_empty() => {
                        out.push_str(&format!("  [#text(size: {})[", style.cell_size));
                        spans_to_typst(&parse_inline(cell), &mut out);
                        out.push_str("]],\n");
                    }
                    _ => out.push_str("  [],\n"),
                }
            }
        }
        out.push_str(")\n");
        self.out.push_str(&out);

        if keep_together {
            self.out.push_str("]\n");
        }
        self.out.push('\n');
        Ok(())
    }

    fn page_break(&mut self) -> Result<(), RenderError> {
        self.close_list();
        self.out.push_str("#pagebreak(weak: true)\n\n");
        Ok(())
    }

    fn rule(&mut self) -> Result<(), RenderError> {
        self.close_list();
        self.out.push_str("#line(length: 100%)\n\n");
        Ok(())
    }
}

fn spans_to_typst(spans: &[Span], out: &mut String) {
    for (index, span) in spans.iter().enumerate() {
        match span.style {
            Style::Plain => {
                if index == 0 {
                    escape_line_start(&span.text, out);
                } else {
                    escape_text(&span.text, out);
                }
            }
            Style::Bold | Style::Italic => {
                out.push_str(if span.style == Style::Bold {
                    "#strong["
                } else {
                    "#emph["
                });
                escape_text(&span.text, out);
                out.push(']');
                // Stop the embedded call from swallowing a following `.field` or `(args)`
                let next = spans.get(index + 1).and_then(|s| s.text.chars().next());
                if matches!(next, Some('.' | '(')) {
                    out.push(';');
                }
            }
        }
    }
}

/// Escape text that opens a line, where Typst would read list, heading or
/// enum markers. Leading indentation does not stop Typst from seeing them.
fn escape_line_start(text: &str, out: &mut String) {
    let indent = text.len() - text.trim_start().len();
    let (indent, text) = text.split_at(indent);
    out.push_str(indent);

    if text.starts_with(['=', '-', '+']) {
        out.push('\\');
        escape_text(text, out);
        return;
    }

    let digits = text.chars().take_while(char::is_ascii_digit).count();
    if digits > 0 && text[digits..].starts_with('.') {
        out.push_str(&text[..digits]);
        out.push('\\');
        escape_text(&text[digits..], out);
        return;
    }

    escape_text(text, out);
}

fn escape_text(text: &str, out: &mut String) {
    // Escape special Typst characters
    for ch in text.chars() {
        match ch {
            '#' | '*' | '_' | '@' | '$' | '\\' | '`' | '<' | '>' | '[' | ']' | '/' | '~' => {
                out.push('\\');
                out.push(ch);
            }
            _ => out.push(ch),
        }
    }
}

/// Typst string literal.
fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markdown_to_typst;
    use pretty_assertions::assert_eq;

    const PREAMBLE: &str = "#set page(paper: \"a4\", margin: 1in, numbering: \"1\")\n\
        #set text(font: \"Libertinus Serif\", size: 12pt)\n\
        #set par(linebreaks: \"optimized\")\n\
        #show heading.where(level: 1): set text(size: 20pt)\n\
        #show heading.where(level: 2): set text(size: 16pt)\n\
        #show heading.where(level: 3): set text(size: 14pt)\n\n";

    fn body(markdown: &str) -> String {
        let typst = markdown_to_typst(markdown).unwrap();
        typst
            .strip_prefix(PREAMBLE)
            .unwrap_or_else(|| panic!("unexpected preamble in:\n{typst}"))
            .to_string()
    }

    #[test]
    fn empty_document_is_just_the_preamble() {
        assert_eq!(markdown_to_typst("").unwrap(), PREAMBLE);
    }

    #[test]
    fn heading_after_title() {
        assert_eq!(body("# Title\n## Overview"), "== Overview\n\n");
    }

    #[test]
    fn paragraph() {
        assert_eq!(body("Hello world"), "Hello world\n\n");
    }

    #[test]
    fn bold_and_italic() {
        assert_eq!(body("a **bold** b"), "a #strong[bold] b\n\n");
        assert_eq!(body("*italic* text"), "#emph[italic] text\n\n");
        assert_eq!(body("A**B**C"), "A#strong[B]C\n\n");
    }

    #[test]
    fn styled_span_before_dot_is_terminated() {
        assert_eq!(body("**done**."), "#strong[done];.\n\n");
    }

    #[test]
    fn lists_close_with_blank_line() {
        assert_eq!(
            body("- one\n- two\n1. first\n2. second\nafter"),
            "- one\n- two\n+ first\n+ second\n\nafter\n\n"
        );
    }

    #[test]
    fn list_at_end_is_closed_on_finish() {
        assert_eq!(body("- only"), "- only\n\n");
    }

    #[test]
    fn escapes_special_chars() {
        assert_eq!(body("a # b"), "a \\# b\n\n");
        assert_eq!(body("a_b $5 @x"), "a\\_b \\$5 \\@x\n\n");
        assert_eq!(body("see https://example.com"), "see https:\\/\\/example.com\n\n");
    }

    #[test]
    fn escapes_markup_at_line_start() {
        assert_eq!(body("+5% growth"), "\\+5% growth\n\n");
        assert_eq!(body("= sign"), "\\= sign\n\n");
        assert_eq!(body("2025.Q1 results"), "2025\\.Q1 results\n\n");
    }

    #[test]
    fn escapes_markup_after_indentation() {
        assert_eq!(body("intro\n  - x"), "intro\n\n  \\- x\n\n");
        assert_eq!(body("  + 5% growth"), "  \\+ 5% growth\n\n");
        assert_eq!(body("   1. not numbered"), "   1\\. not numbered\n\n");
        assert_eq!(body("\t= not heading"), "\t\\= not heading\n\n");
    }

    #[test]
    fn table() {
        let md = "| A | B |\n|---|---|\n| 1 | **2** |\n| 3 |";
        let expected = "#block(breakable: false)[\n#table(\n  columns: 2,\n  table.header(\n    [#text(size: 11pt, weight: \"bold\")[A]],\n    [#text(size: 11pt, weight: \"bold\")[B]],\n  ),\n  [#text(size: 10pt)[1]],\n  [#text(size: 10pt)[#strong[2]]],\n  [#text(size: 10pt)[3]],\n  [],\n)\n]\n\n";
        assert_eq!(body(md), expected);
    }

    #[test]
    fn table_can_break_across_pages() {
        let mut config = Config::default();
        config.table.keep_together = false;
        let typst = crate::markdown_to_typst_with_config("| A |\n|---|\n| 1 |", &config).unwrap();
        assert!(typst.ends_with(
            "#table(\n  columns: 1,\n  table.header(\n    [#text(size: 11pt, weight: \"bold\")[A]],\n  ),\n  [#text(size: 10pt)[1]],\n)\n\n"
        ));
        assert!(!typst.contains("#block(breakable: false)"));
    }

    #[test]
    fn horizontal_rule() {
        assert_eq!(body("---"), "#line(length: 100%)\n\n");
    }

    #[test]
    fn section_marker_breaks_page() {
        let mut config = Config::default();
        config.markers.sections = vec!["Part Two:".into()];
        let typst =
            crate::markdown_to_typst_with_config("# T\nintro\n## Part Two: AMD", &config).unwrap();
        assert!(typst.ends_with("intro\n\n#pagebreak(weak: true)\n\n== Part Two: AMD\n\n"));
    }

    #[test]
    fn emphasis_colors_paragraph() {
        let mut config = Config::default();
        config.emphasis.enabled = true;
        config.markers.skip_first_heading = false;
        let typst = crate::markdown_to_typst_with_config("! watch out\n★ key", &config).unwrap();
        assert!(typst.ends_with(
            "#text(fill: rgb(\"#c0392b\"))[watch out]\n\n#text(fill: rgb(\"#b8860b\"), weight: \"bold\")[key]\n\n"
        ));
    }

    #[test]
    fn front_matter_and_toc() {
        let mut config = Config::default();
        config.page.numbers = false;
        config.font.lang = Some("zh".into());
        config.front_matter.title = Some("Annual Report".into());
        config.front_matter.date = Some("2026-02-19".into());
        config.front_matter.toc = true;
        config.front_matter.note = Some("Draft".into());

        let typst = TypstSink::new(&config).finish();
        assert!(typst.starts_with("#set page(paper: \"a4\", margin: 1in, numbering: none)\n"));
        assert!(typst.contains("#set text(font: \"Libertinus Serif\", size: 12pt, lang: \"zh\")\n"));
        assert!(typst.contains(
            "#align(center)[\n  #v(30%)\n  #text(size: 28pt, weight: \"bold\")[Annual Report]\n  #v(2em)\n  #text(size: 14pt)[2026-02-19]\n]\n#pagebreak()\n\n"
        ));
        assert!(typst.ends_with(
            "#outline(title: [Table of Contents])\n#v(1em)\n#text(size: 10pt, style: \"italic\")[Draft]\n#pagebreak()\n\n"
        ));
    }

    #[test]
    fn rejects_unsupported_heading_level() {
        let config = Config::default();
        let mut sink = TypstSink::new(&config);
        assert_eq!(sink.heading(0, "x"), Err(RenderError::InvalidHeadingLevel(0)));
        assert_eq!(sink.heading(7, "x"), Err(RenderError::InvalidHeadingLevel(7)));
        assert_eq!(sink.heading(6, "x"), Ok(()));
    }

    #[test]
    fn rejects_table_without_columns() {
        let config = Config::default();
        let mut sink = TypstSink::new(&config);
        assert_eq!(sink.table(&Table::default()), Err(RenderError::EmptyTable));
    }

    #[test]
    fn quotes_strings() {
        assert_eq!(quote("Noto \"Sans\""), "\"Noto \\\"Sans\\\"\"");
    }
}
