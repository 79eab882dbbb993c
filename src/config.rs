use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::block::Emphasis;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file at {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub markers: MarkerConfig,
    pub page: PageConfig,
    pub font: FontConfig,
    pub headings: HeadingConfig,
    pub table: TableConfig,
    pub front_matter: FrontMatterConfig,
    pub emphasis: EmphasisConfig,
}

/// Literal markers the line classifier recognizes.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct MarkerConfig {
    /// Lines starting with any of these are dropped.
    pub page_break: Vec<String>,
    /// A line equal to this (after trimming) is dropped.
    pub separator: String,
    /// Substrings that open a new top-level section on a fresh page.
    pub sections: Vec<String>,
    pub rule: String,
    /// A rule-shaped line containing any of these is a paragraph, not a rule.
    pub rule_exclude: Vec<String>,
    pub bullets: Vec<String>,
    pub table: char,
    pub heading: char,
    /// The first heading-shaped line is a title rendered elsewhere.
    pub skip_first_heading: bool,
}

impl Default for MarkerConfig {
    fn default() -> Self {
        Self {
            page_break: vec!["--- Page".to_string()],
            separator: "=".repeat(64),
            sections: Vec::new(),
            rule: "---".to_string(),
            rule_exclude: vec!["Page".to_string()],
            bullets: vec!["- ".to_string(), "▸ ".to_string()],
            table: '|',
            heading: '#',
            skip_first_heading: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct PageConfig {
    pub paper: String,
    pub margin: String,
    pub numbers: bool,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            paper: "a4".to_string(),
            margin: "1in".to_string(),
            numbers: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct FontConfig {
    pub family: String,
    pub size: String,
    pub lang: Option<String>,
    /// Also search fonts installed on the system, not only the embedded ones.
    pub system_fonts: bool,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            family: "Libertinus Serif".to_string(),
            size: "12pt".to_string(),
            lang: None,
            system_fonts: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct HeadingConfig {
    pub h1_size: String,
    pub h2_size: String,
    pub h3_size: String,
}

impl Default for HeadingConfig {
    fn default() -> Self {
        Self {
            h1_size: "20pt".to_string(),
            h2_size: "16pt".to_string(),
            h3_size: "14pt".to_string(),
        }
    }
}

impl HeadingConfig {
    /// Get the text size for a heading level.
    /// Returns None for levels that keep Typst's own sizing.
    pub fn size_for_level(&self, level: u8) -> Option<&str> {
        match level {
            1 => Some(&self.h1_size),
            2 => Some(&self.h2_size),
            3 => Some(&self.h3_size),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct TableConfig {
    pub header_size: String,
    pub cell_size: String,
    /// Avoid splitting a table across pages when it fits on one.
    pub keep_together: bool,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            header_size: "11pt".to_string(),
            cell_size: "10pt".to_string(),
            keep_together: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct FrontMatterConfig {
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub date: Option<String>,
    pub toc: bool,
    pub toc_title: String,
    pub note: Option<String>,
}

impl Default for FrontMatterConfig {
    fn default() -> Self {
        Self {
            title: None,
            subtitle: None,
            date: None,
            toc: false,
            toc_title: "Table of Contents".to_string(),
            note: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct EmphasisMarker {
    pub marker: char,
    pub hint: Emphasis,
    pub color: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct EmphasisConfig {
    pub enabled: bool,
    pub markers: Vec<EmphasisMarker>,
}

impl Default for EmphasisConfig {
    fn default() -> Self {
        let marker = |marker, hint, color: &str| EmphasisMarker {
            marker,
            hint,
            color: color.to_string(),
        };
        Self {
            enabled: false,
            markers: vec![
                marker('★', Emphasis::Highlight, "#b8860b"),
                marker('!', Emphasis::Warning, "#c0392b"),
                marker('+', Emphasis::Positive, "#27ae60"),
                marker('▸', Emphasis::Note, "#2c6fbb"),
                marker('#', Emphasis::Strong, "#000000"),
            ],
        }
    }
}

impl EmphasisConfig {
    pub fn color_for(&self, hint: Emphasis) -> Option<&str> {
        self.markers
            .iter()
            .find(|m| m.hint == hint)
            .map(|m| m.color.as_str())
    }
}

impl Config {
    /// Load config from a TOML file. Missing keys take their defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load config from a TOML file, or return defaults if it does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            log::debug!("no config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        Self::load(path)
    }

    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}
