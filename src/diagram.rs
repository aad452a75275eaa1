use thiserror::Error;
use tracing::debug;

use crate::config::{ColorKey, DiagramConfig};
use crate::format::{DecimalLocale, FormatSpec, format_value};
use crate::layout::{LayoutOptions, SankeyLayout, compute_sankey_layout};
use crate::palette::{ColorResolver, Palette, PaletteError};
use crate::table::EdgeTable;

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("no drawable rows after removing zero flows")]
    EmptyTable,
    #[error(transparent)]
    Palette(#[from] PaletteError),
}

/// How a plot fills its page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sizing {
    Fixed,
    StretchWidth,
}

/// A laid-out diagram ready for export.
///
/// `title_text`, `toolbar_enabled` and `sizing` are display state that the
/// export stage mutates after construction: the static png/svg exports see
/// the (possibly truncated) `title_text`, while the page export later
/// switches to the full `title` and stretch-width sizing.
#[derive(Debug, Clone)]
pub struct RenderedDiagram {
    pub title: String,
    pub title_text: Option<String>,
    pub toolbar_enabled: bool,
    pub sizing: Sizing,
    pub layout: SankeyLayout,
    pub fontsize: f32,
    pub label_font_size: f32,
}

/// Builds one diagram from an edge table.
///
/// Sanitizes the table, formats edge values into labels, resolves node and
/// edge colors through the palette, runs the layout engine and applies the
/// configured style. Palette exhaustion and an empty table are reported to
/// the caller; per-sheet isolation happens in the batch loop, not here.
pub fn build(
    table: &EdgeTable,
    title: &str,
    config: &DiagramConfig,
    palette: &Palette,
    locale: DecimalLocale,
) -> Result<RenderedDiagram, BuildError> {
    let clean = table.sanitized();
    if clean.is_empty() {
        return Err(BuildError::EmptyTable);
    }
    debug!(
        rows = clean.rows.len(),
        dropped = table.rows.len() - clean.rows.len(),
        "building diagram"
    );

    let mut layout = compute_sankey_layout(
        &clean,
        &LayoutOptions {
            width: config.width,
            height: config.height,
            node_width: config.node_width,
            node_padding: config.node_padding,
        },
    );

    // Sequence entries are consumed per distinct value of the color-key
    // column, in first-seen edge order; only those keys can exhaust the
    // palette. The remaining nodes are decoration and wrap around instead.
    let SankeyLayout { nodes, links, .. } = &mut layout;
    let mut resolver = ColorResolver::new(palette);
    for link in links.iter_mut() {
        let key_node = match config.edge_color_index {
            ColorKey::From => link.source,
            ColorKey::To => link.target,
        };
        link.color = resolver.resolve(&nodes[key_node].name)?;
    }
    for node in nodes.iter_mut() {
        node.color = resolver.resolve_cycling(&node.name);
    }

    let spec = FormatSpec {
        decimals: config.decimals.0,
        unit: config.unit.clone(),
        locale,
    };
    for link in &mut layout.links {
        link.label = format_value(link.value, &spec);
    }

    let mut diagram = RenderedDiagram {
        title: title.to_string(),
        title_text: None,
        // Only the page render looks at this; the static svg never
        // carries a toolbar.
        toolbar_enabled: config.toolbar,
        sizing: Sizing::Fixed,
        layout,
        fontsize: config.fontsize,
        label_font_size: config.label_font_size,
    };

    if config.export_title {
        let mut text = title.to_string();
        if let Some(max_chars) = config.title_max_chars {
            // Long embedded titles break downstream svg consumers such as
            // word processors.
            text = text.chars().take(max_chars).collect();
        }
        diagram.title_text = Some(text);
    }

    Ok(diagram)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::EdgeRow;

    fn table() -> EdgeTable {
        EdgeTable::new(vec![
            EdgeRow::new("Gas", "Boiler", 100.0),
            EdgeRow::new("Boiler", "Heat", 80.0),
            EdgeRow::new("Boiler", "Losses", 20.0),
        ])
    }

    fn build_default(config: &DiagramConfig) -> RenderedDiagram {
        build(
            &table(),
            "Example A",
            config,
            &config.palette(),
            DecimalLocale::from_tag("de_DE.UTF-8"),
        )
        .unwrap()
    }

    #[test]
    fn formats_edge_labels_with_locale() {
        let diagram = build_default(&DiagramConfig {
            unit: "kW".to_string(),
            ..DiagramConfig::default()
        });
        assert_eq!(diagram.layout.links[0].label, "100,00 kW");
    }

    #[test]
    fn edge_color_follows_target_by_default() {
        let diagram = build_default(&DiagramConfig::default());
        let boiler = diagram
            .layout
            .nodes
            .iter()
            .find(|node| node.name == "Boiler")
            .unwrap();
        assert_eq!(diagram.layout.links[0].color, boiler.color);
    }

    #[test]
    fn edge_color_can_follow_source() {
        let config = DiagramConfig {
            edge_color_index: ColorKey::From,
            ..DiagramConfig::default()
        };
        let diagram = build_default(&config);
        let gas = diagram
            .layout
            .nodes
            .iter()
            .find(|node| node.name == "Gas")
            .unwrap();
        assert_eq!(diagram.layout.links[0].color, gas.color);
    }

    #[test]
    fn exhaustion_counts_distinct_color_keys_not_nodes() {
        // Four nodes against a two-color palette, but only one distinct
        // target: the sheet must build.
        let table = EdgeTable::new(vec![
            EdgeRow::new("S1", "T", 1.0),
            EdgeRow::new("S2", "T", 2.0),
            EdgeRow::new("S3", "T", 3.0),
        ]);
        let config = DiagramConfig::default();
        let palette = Palette::Sequence(vec!["#111111".to_string(), "#222222".to_string()]);
        let diagram = build(&table, "t", &config, &palette, DecimalLocale::default()).unwrap();
        for link in &diagram.layout.links {
            assert_eq!(link.color, "#111111");
        }
        assert!(diagram.layout.nodes.iter().all(|node| !node.color.is_empty()));
    }

    #[test]
    fn title_is_absent_without_export_title() {
        let diagram = build_default(&DiagramConfig::default());
        assert!(diagram.title_text.is_none());
        assert_eq!(diagram.title, "Example A");
    }

    #[test]
    fn export_title_is_truncated_but_full_title_kept() {
        let config = DiagramConfig {
            export_title: true,
            title_max_chars: Some(4),
            ..DiagramConfig::default()
        };
        let diagram = build(
            &table(),
            "Example A",
            &config,
            &config.palette(),
            DecimalLocale::default(),
        )
        .unwrap();
        assert_eq!(diagram.title_text.as_deref(), Some("Exam"));
        assert_eq!(diagram.title, "Example A");
    }

    #[test]
    fn all_zero_table_is_an_error() {
        let table = EdgeTable::new(vec![EdgeRow::new("A", "B", 0.0)]);
        let config = DiagramConfig::default();
        let err = build(
            &table,
            "t",
            &config,
            &config.palette(),
            DecimalLocale::default(),
        )
        .unwrap_err();
        assert!(matches!(err, BuildError::EmptyTable));
    }

    #[test]
    fn palette_exhaustion_propagates() {
        let config = DiagramConfig::default();
        let palette = Palette::Sequence(vec!["#111111".to_string()]);
        let err = build(
            &table(),
            "t",
            &config,
            &palette,
            DecimalLocale::default(),
        )
        .unwrap_err();
        assert!(matches!(err, BuildError::Palette(_)));
    }

    #[test]
    fn toolbar_and_sizing_start_disabled_and_fixed() {
        let diagram = build_default(&DiagramConfig::default());
        assert!(!diagram.toolbar_enabled);
        assert_eq!(diagram.sizing, Sizing::Fixed);
    }
}
