use crate::palette::Palette;
use clap::{Args, ValueEnum};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Which edge column picks an edge's color. With `To`, all edges arriving at
/// a node share that node's color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorKey {
    From,
    To,
}

/// Decimal places for edge labels; `none` disables rounding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decimals(pub Option<u32>);

impl FromStr for Decimals {
    type Err = String;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        if text.eq_ignore_ascii_case("none") {
            return Ok(Decimals(None));
        }
        text.parse::<u32>()
            .map(|places| Decimals(Some(places)))
            .map_err(|_| format!("expected a number of decimal places or 'none', got {text:?}"))
    }
}

impl fmt::Display for Decimals {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(places) => write!(f, "{places}"),
            None => write!(f, "none"),
        }
    }
}

/// Style options for one diagram. Every field has a default and doubles as a
/// command line flag, so the struct is the single source of truth for the
/// tunable surface.
#[derive(Debug, Clone, Args)]
pub struct DiagramConfig {
    /// Plot width in pixels
    #[arg(long, default_value_t = 1400.0)]
    pub width: f32,

    /// Plot height in pixels
    #[arg(long, default_value_t = 600.0)]
    pub height: f32,

    /// Edge column that selects edge colors
    #[arg(long = "edge_color_index", value_enum, default_value = "to")]
    pub edge_color_index: ColorKey,

    /// Palette as JSON (color list or name-to-color object), inline or a file path
    #[arg(long, value_parser = parse_palette)]
    pub palette: Option<Palette>,

    /// Decimal places for edge labels, or 'none'
    #[arg(long, default_value_t = Decimals(Some(2)))]
    pub decimals: Decimals,

    /// Unit suffix for edge labels
    #[arg(long, default_value = "")]
    pub unit: String,

    /// Base font size for edge labels
    #[arg(long, default_value_t = 11.0)]
    pub fontsize: f32,

    /// Font size for node labels
    #[arg(long = "label_font_size", default_value_t = 17.0)]
    pub label_font_size: f32,

    /// Node bar width in pixels
    #[arg(long = "node_width", default_value_t = 45.0)]
    pub node_width: f32,

    /// Vertical gap between nodes of one column
    #[arg(long = "node_padding", default_value_t = 10.0)]
    pub node_padding: f32,

    /// Show the title on the png/svg exports
    #[arg(long = "export_title")]
    pub export_title: bool,

    /// Truncate the exported title to this many characters
    #[arg(long = "title_max_chars")]
    pub title_max_chars: Option<usize>,

    /// Keep the toolbar on the interactive page
    #[arg(long)]
    pub toolbar: bool,

    /// Page title override for the html output
    #[arg(long = "title_html", default_value = "")]
    pub title_html: String,

    /// Open written pages in the browser
    #[arg(long = "show_plot")]
    pub show_plot: bool,
}

impl Default for DiagramConfig {
    fn default() -> Self {
        Self {
            width: 1400.0,
            height: 600.0,
            edge_color_index: ColorKey::To,
            palette: None,
            decimals: Decimals(Some(2)),
            unit: String::new(),
            fontsize: 11.0,
            label_font_size: 17.0,
            node_width: 45.0,
            node_padding: 10.0,
            export_title: false,
            title_max_chars: None,
            toolbar: false,
            title_html: String::new(),
            show_plot: false,
        }
    }
}

impl DiagramConfig {
    /// Batch-resolved palette: the configured one, or the built-in sequence.
    pub fn palette(&self) -> Palette {
        self.palette.clone().unwrap_or_default()
    }
}

fn parse_palette(text: &str) -> Result<Palette, String> {
    let path = Path::new(text);
    let json = if path.is_file() {
        std::fs::read_to_string(path).map_err(|err| format!("reading {text}: {err}"))?
    } else {
        text.to_string()
    };
    serde_json::from_str(&json)
        .map_err(|err| format!("palette must be a JSON color list or object: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = DiagramConfig::default();
        assert_eq!(config.width, 1400.0);
        assert_eq!(config.height, 600.0);
        assert_eq!(config.edge_color_index, ColorKey::To);
        assert_eq!(config.decimals, Decimals(Some(2)));
        assert!(!config.export_title);
        assert!(config.title_max_chars.is_none());
    }

    #[test]
    fn decimals_parse_number_or_none() {
        assert_eq!("3".parse::<Decimals>().unwrap(), Decimals(Some(3)));
        assert_eq!("none".parse::<Decimals>().unwrap(), Decimals(None));
        assert!("3.5".parse::<Decimals>().is_err());
    }

    #[test]
    fn inline_palette_parses() {
        let palette = parse_palette(r##"["#111111", "#222222"]"##).unwrap();
        assert!(matches!(palette, Palette::Sequence(ref colors) if colors.len() == 2));
    }
}
