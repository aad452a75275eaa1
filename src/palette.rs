use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Color used for mapping-palette keys that have no entry.
pub const FALLBACK_GREY: &str = "#808080";

static DEFAULT_COLORS: Lazy<Vec<String>> = Lazy::new(|| {
    [
        "#f14124", "#ff8021", "#e8d654", "#5eccf3", "#b4dcfa", "#4e67c8", "#56c7aa", "#24f198",
        "#2160ff", "#c354e8", "#e73384", "#c76b56", "#facdb4",
    ]
    .iter()
    .map(|color| color.to_string())
    .collect()
});

/// A palette is either an ordered color sequence, consumed positionally per
/// distinct color key in first-seen order, or a key-to-color mapping with a
/// grey fallback for unmapped keys.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Palette {
    Sequence(Vec<String>),
    Mapping(HashMap<String, String>),
}

impl Default for Palette {
    fn default() -> Self {
        Palette::Sequence(DEFAULT_COLORS.clone())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PaletteError {
    /// A sequence palette has no defined behavior past its last entry.
    /// Cycling would silently reuse colors, so this is a fatal condition
    /// for the affected sheet.
    #[error("palette exhausted: {keys} distinct color keys but only {len} palette entries")]
    Exhausted { keys: usize, len: usize },
}

/// Assigns colors to keys for one diagram. Sequence palettes hand out colors
/// in first-seen key order; asking twice for the same key returns the same
/// color.
#[derive(Debug)]
pub struct ColorResolver<'a> {
    palette: &'a Palette,
    seen: Vec<String>,
}

impl<'a> ColorResolver<'a> {
    pub fn new(palette: &'a Palette) -> Self {
        Self {
            palette,
            seen: Vec::new(),
        }
    }

    /// Resolves a color-key value. Sequence palettes fail once distinct
    /// keys outnumber entries.
    pub fn resolve(&mut self, key: &str) -> Result<String, PaletteError> {
        match self.palette {
            Palette::Mapping(map) => Ok(map
                .get(key)
                .cloned()
                .unwrap_or_else(|| FALLBACK_GREY.to_string())),
            Palette::Sequence(colors) => {
                let idx = self.seen_index(key);
                colors.get(idx).cloned().ok_or(PaletteError::Exhausted {
                    keys: self.seen.len(),
                    len: colors.len(),
                })
            }
        }
    }

    /// Infallible variant for keys outside the color policy proper, such as
    /// nodes that never appear in the color-key column: a sequence wraps
    /// around past its last entry. Keys already resolved keep their color.
    pub fn resolve_cycling(&mut self, key: &str) -> String {
        match self.palette {
            Palette::Mapping(map) => map
                .get(key)
                .cloned()
                .unwrap_or_else(|| FALLBACK_GREY.to_string()),
            Palette::Sequence(colors) => {
                if colors.is_empty() {
                    return FALLBACK_GREY.to_string();
                }
                let idx = self.seen_index(key);
                colors[idx % colors.len()].clone()
            }
        }
    }

    fn seen_index(&mut self, key: &str) -> usize {
        match self.seen.iter().position(|seen| seen == key) {
            Some(idx) => idx,
            None => {
                self.seen.push(key.to_string());
                self.seen.len() - 1
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mapping_falls_back_to_grey() {
        let palette = Palette::Mapping(HashMap::from([(
            "Heat".to_string(),
            "#f14124".to_string(),
        )]));
        let mut resolver = ColorResolver::new(&palette);
        assert_eq!(resolver.resolve("Heat").unwrap(), "#f14124");
        assert_eq!(resolver.resolve("Unknown").unwrap(), FALLBACK_GREY);
    }

    #[test]
    fn sequence_assigns_by_first_seen_order() {
        let palette = Palette::Sequence(vec!["#111111".to_string(), "#222222".to_string()]);
        let mut resolver = ColorResolver::new(&palette);
        assert_eq!(resolver.resolve("B").unwrap(), "#111111");
        assert_eq!(resolver.resolve("A").unwrap(), "#222222");
        // Repeated keys are stable within one diagram.
        assert_eq!(resolver.resolve("B").unwrap(), "#111111");
    }

    #[test]
    fn sequence_exhaustion_is_an_error() {
        let palette = Palette::Sequence(vec!["#111111".to_string()]);
        let mut resolver = ColorResolver::new(&palette);
        resolver.resolve("A").unwrap();
        assert_eq!(
            resolver.resolve("B"),
            Err(PaletteError::Exhausted { keys: 2, len: 1 })
        );
    }

    #[test]
    fn cycling_wraps_instead_of_failing() {
        let palette = Palette::Sequence(vec!["#111111".to_string(), "#222222".to_string()]);
        let mut resolver = ColorResolver::new(&palette);
        assert_eq!(resolver.resolve("A").unwrap(), "#111111");
        assert_eq!(resolver.resolve_cycling("B"), "#222222");
        assert_eq!(resolver.resolve_cycling("C"), "#111111");
        // Keys resolved strictly keep their color on the cycling path.
        assert_eq!(resolver.resolve_cycling("A"), "#111111");
    }

    #[test]
    fn default_palette_has_thirteen_colors() {
        match Palette::default() {
            Palette::Sequence(colors) => assert_eq!(colors.len(), 13),
            Palette::Mapping(_) => panic!("default palette must be a sequence"),
        }
    }

    #[test]
    fn parses_from_json_list_or_object() {
        let seq: Palette = serde_json::from_str(r##"["#111111", "#222222"]"##).unwrap();
        assert!(matches!(seq, Palette::Sequence(ref colors) if colors.len() == 2));
        let map: Palette = serde_json::from_str(r##"{"Heat": "#f14124"}"##).unwrap();
        assert!(matches!(map, Palette::Mapping(ref entries) if entries.len() == 1));
    }
}
