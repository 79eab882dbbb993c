use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use log::LevelFilter;

use mdreport::Config;

#[derive(Parser)]
#[command(name = "mdreport")]
#[command(about = "Convert line-oriented Markdown reports to PDF")]
struct Cli {
    /// Input Markdown file
    input: PathBuf,

    /// Output file (defaults to input name with the format's extension)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Config file (defaults to mdreport.toml next to the input, if present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Pdf)]
    format: Format,

    /// Substring that starts a new section on a fresh page (repeatable)
    #[arg(long = "section")]
    sections: Vec<String>,

    /// Title for a generated title page
    #[arg(long)]
    title: Option<String>,

    /// Colour paragraphs that start with an emphasis marker
    #[arg(long)]
    emphasis: bool,

    /// More log output (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Pdf,
    Svg,
    Typst,
    Json,
}

impl Format {
    fn extension(self) -> &'static str {
        match self {
            Format::Pdf => "pdf",
            Format::Svg => "svg",
            Format::Typst => "typ",
            Format::Json => "json",
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    // RUST_LOG still wins when set
    let _ = env_logger::Builder::new()
        .filter_module("mdreport", level)
        .parse_default_env()
        .try_init();
}

fn run(cli: Cli) -> Result<()> {
    let mut config = load_config(&cli)?;
    config.markers.sections.extend(cli.sections.iter().cloned());
    if let Some(title) = &cli.title {
        config.front_matter.title = Some(title.clone());
    }
    if cli.emphasis {
        config.emphasis.enabled = true;
    }

    // Read input file
    let markdown = fs::read_to_string(&cli.input)
        .with_context(|| format!("reading {}", cli.input.display()))?;

    let output = match &cli.output {
        Some(path) if path == &cli.input => {
            bail!("output {} would overwrite the input", path.display())
        }
        Some(path) => path.clone(),
        None => default_output(&cli.input, cli.format),
    };

    match cli.format {
        Format::Pdf => {
            let pdf_bytes = mdreport::markdown_to_pdf_with_config(&markdown, &config)?;
            write(&output, pdf_bytes)?;
        }
        Format::Typst => {
            let typst = mdreport::markdown_to_typst_with_config(&markdown, &config)?;
            write(&output, typst)?;
        }
        Format::Json => {
            let json = mdreport::markdown_to_json_with_config(&markdown, &config)?;
            write(&output, json)?;
        }
        Format::Svg => {
            let document = mdreport::markdown_to_svg_with_config(&markdown, &config)?;
            if document.pages.len() == 1 {
                write(&output, &document.pages[0])?;
            } else {
                for (index, page) in document.pages.iter().enumerate() {
                    write(&numbered_page_path(&output, index + 1), page)?;
                }
            }
        }
    }
    Ok(())
}

fn load_config(cli: &Cli) -> Result<Config> {
    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => {
            let beside_input = cli
                .input
                .parent()
                .unwrap_or_else(|| Path::new("."))
                .join("mdreport.toml");
            Config::load_or_default(&beside_input)?
        }
    };
    Ok(config)
}

/// Input name with the format's extension, `notes.out.typ` when that would be
/// the input itself.
fn default_output(input: &Path, format: Format) -> PathBuf {
    let output = input.with_extension(format.extension());
    if output != input {
        return output;
    }
    input.with_extension(format!("out.{}", format.extension()))
}

/// `report.svg` becomes `report-3.svg` for page 3.
fn numbered_page_path(output: &Path, page: usize) -> PathBuf {
    let stem = output
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "page".to_string());
    output.with_file_name(format!("{stem}-{page}.svg"))
}

fn write(path: &Path, contents: impl AsRef<[u8]>) -> Result<()> {
    fs::write(path, contents).with_context(|| format!("writing {}", path.display()))?;
    println!("Created {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn default_output_swaps_extension() {
        assert_eq!(
            default_output(Path::new("docs/report.md"), Format::Pdf),
            PathBuf::from("docs/report.pdf")
        );
        assert_eq!(
            default_output(Path::new("report"), Format::Json),
            PathBuf::from("report.json")
        );
    }

    #[test]
    fn default_output_never_overwrites_input() {
        assert_eq!(
            default_output(Path::new("notes.typ"), Format::Typst),
            PathBuf::from("notes.out.typ")
        );
        assert_eq!(
            default_output(Path::new("stream.json"), Format::Json),
            PathBuf::from("stream.out.json")
        );
    }

    #[test]
    fn numbered_pages_keep_stem() {
        assert_eq!(
            numbered_page_path(Path::new("out/report.svg"), 3),
            PathBuf::from("out/report-3.svg")
        );
    }
}
