use anyhow::{Context, Result};
use std::path::Path;
use tracing::{error, info, warn};

use crate::config::DiagramConfig;
use crate::diagram::{self, RenderedDiagram};
use crate::export::{self, path_with_ext};
use crate::format::DecimalLocale;
use crate::palette::Palette;
use crate::render::render_combined_page;
use crate::resource::RenderResource;
use crate::table::EdgeTable;

/// Builds and exports one diagram per named edge table, then writes a
/// combined page listing every success.
///
/// One sheet failing to build or export is logged and skipped; the batch
/// keeps going and still reports success. The render resource is acquired
/// once up front and shared across all exports; if acquisition fails the
/// batch runs degraded (no png/svg, pages still work). Returns `true` when
/// the batch ran to completion.
pub fn run(
    sheets: &[(String, EdgeTable)],
    output_dir: &Path,
    label: &str,
    config: &DiagramConfig,
    locale: DecimalLocale,
) -> Result<bool> {
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("creating output directory {}", output_dir.display()))?;

    // Owned by this scope: dropped on every exit path, including early
    // returns, so the release happens exactly once per batch.
    let resource = match RenderResource::acquire() {
        Ok(resource) => Some(resource),
        Err(err) => {
            warn!("render resource unavailable, png/svg export will be skipped: {err:#}");
            None
        }
    };

    let palette = config.palette();
    let mut diagrams: Vec<RenderedDiagram> = Vec::new();
    for (sheet, table) in sheets {
        info!("processing sheet {sheet:?}");
        let base = output_dir.join(format!("{label} {sheet}"));
        match process_sheet(table, sheet, &base, config, &palette, locale, resource.as_ref()) {
            Ok(diagram) => diagrams.push(diagram),
            Err(err) => error!("{sheet}: {err:#}"),
        }
    }

    let combined_base = output_dir.join(label);
    let combined_path = path_with_ext(&combined_base, "html");
    std::fs::write(&combined_path, render_combined_page(&diagrams, label))
        .with_context(|| format!("writing {}", combined_path.display()))?;
    info!(
        "combined page with {} diagram(s) written to {}",
        diagrams.len(),
        combined_path.display()
    );

    if config.show_plot {
        open::that(&combined_path)
            .with_context(|| format!("opening {}", combined_path.display()))?;
    }

    Ok(true)
}

fn process_sheet(
    table: &EdgeTable,
    sheet: &str,
    base: &Path,
    config: &DiagramConfig,
    palette: &Palette,
    locale: DecimalLocale,
    resource: Option<&RenderResource>,
) -> Result<RenderedDiagram> {
    let mut diagram = diagram::build(table, sheet, config, palette, locale)?;
    export::export(&mut diagram, base, config, resource)?;
    Ok(diagram)
}
