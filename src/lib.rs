mod block;
mod config;
mod emphasis;
mod error;
mod inline;
mod parser;
mod sink;
mod table;
mod typst;

pub use block::{Block, Emphasis, ListStyle, Span, Style, Table};
pub use config::{
    Config, ConfigError, EmphasisConfig, EmphasisMarker, FontConfig, FrontMatterConfig,
    HeadingConfig, MarkerConfig, PageConfig, TableConfig,
};
pub use emphasis::extract_hint;
pub use error::RenderError;
pub use inline::{parse_inline, plain_text};
pub use parser::{Converter, LineKind, Summary, convert};
pub use sink::{DocumentSink, replay};
pub use table::extract_table;
pub use typst::TypstSink;

use typst_as_lib::TypstEngine;
use typst_as_lib::typst_kit_options::TypstKitFontOptions;
use typst_pdf::PdfOptions;

/// Parse text into its command stream using default config.
pub fn parse(text: &str) -> Vec<Block> {
    parser::parse(text, &Config::default())
}

/// Parse text into its command stream with custom config.
pub fn parse_with_config(text: &str, config: &Config) -> Vec<Block> {
    parser::parse(text, config)
}

/// Convert text to Typst markup using default config.
pub fn markdown_to_typst(text: &str) -> Result<String, RenderError> {
    markdown_to_typst_with_config(text, &Config::default())
}

/// Convert text to Typst markup with custom config.
pub fn markdown_to_typst_with_config(text: &str, config: &Config) -> Result<String, RenderError> {
    let mut sink = TypstSink::new(config);
    convert(text, config, &mut sink)?;
    Ok(sink.finish())
}

/// Convert text to the JSON form of its command stream using default config.
pub fn markdown_to_json(text: &str) -> Result<String, RenderError> {
    markdown_to_json_with_config(text, &Config::default())
}

/// Convert text to the JSON form of its command stream with custom config.
pub fn markdown_to_json_with_config(text: &str, config: &Config) -> Result<String, RenderError> {
    let blocks = parse_with_config(text, config);
    serde_json::to_string_pretty(&blocks).map_err(|e| RenderError::Export(e.to_string()))
}

/// Convert text to PDF bytes using default config.
pub fn markdown_to_pdf(text: &str) -> Result<Vec<u8>, RenderError> {
    markdown_to_pdf_with_config(text, &Config::default())
}

/// Compile text to a Typst document.
fn compile_document(
    text: &str,
    config: &Config,
) -> Result<typst_library::layout::PagedDocument, RenderError> {
    let typst_content = markdown_to_typst_with_config(text, config)?;

    let font_options = TypstKitFontOptions::new()
        .include_embedded_fonts(true)
        .include_system_fonts(config.font.system_fonts);

    let engine = TypstEngine::builder()
        .main_file(typst_content)
        .search_fonts_with(font_options)
        .build();

    engine
        .compile()
        .output
        .map_err(|e| RenderError::Compile(format!("{e:?}")))
}

/// Convert text to PDF bytes with custom config.
pub fn markdown_to_pdf_with_config(text: &str, config: &Config) -> Result<Vec<u8>, RenderError> {
    let doc = compile_document(text, config)?;
    log::info!("laid out {} pages", doc.pages.len());

    typst_pdf::pdf(&doc, &PdfOptions::default())
        .map_err(|e| RenderError::Export(format!("PDF generation failed: {e:?}")))
}

/// Result of rendering text to SVG pages.
pub struct SvgDocument {
    pub pages: Vec<String>,
    pub width_pt: f64,
    pub height_pt: f64,
}

/// Convert text to SVG pages using default config.
pub fn markdown_to_svg(text: &str) -> Result<SvgDocument, RenderError> {
    markdown_to_svg_with_config(text, &Config::default())
}

/// Convert text to SVG pages with custom config.
pub fn markdown_to_svg_with_config(
    text: &str,
    config: &Config,
) -> Result<SvgDocument, RenderError> {
    let doc = compile_document(text, config)?;

    let pages: Vec<String> = doc.pages.iter().map(|page| typst_svg::svg(page)).collect();

    // Get dimensions from first page (assuming all pages same size)
    let (width_pt, height_pt) = if let Some(first_page) = doc.pages.first() {
        let size = first_page.frame.size();
        (size.x.to_pt(), size.y.to_pt())
    } else {
        (595.0, 842.0) // A4 default
    };

    Ok(SvgDocument {
        pages,
        width_pt,
        height_pt,
    })
}
