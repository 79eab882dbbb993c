use thiserror::Error;

/// A document sink refused a command, or the rendered document could not be built.
///
/// Conversions stop at the first error; a half-written document is not resumable.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RenderError {
    #[error("heading level {0} is not supported")]
    InvalidHeadingLevel(u8),

    #[error("table has no header cells")]
    EmptyTable,

    #[error("typst compilation failed: {0}")]
    Compile(String),

    #[error("export failed: {0}")]
    Export(String),
}
