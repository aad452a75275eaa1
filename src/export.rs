use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::config::DiagramConfig;
use crate::diagram::{RenderedDiagram, Sizing};
use crate::render::{render_page, render_svg};
use crate::resource::RenderResource;

/// Writes the three artifacts for one diagram: `<base>.png`, `<base>.svg`
/// and `<base>.html`.
///
/// Raster and vector export are isolated per artifact: a failure is logged
/// and the remaining artifacts are still attempted. Directory creation and
/// the page export are fatal for this diagram and propagate to the batch
/// loop. The page export switches the diagram to its full title and
/// stretch-width sizing, independent of any static-export truncation.
pub fn export(
    diagram: &mut RenderedDiagram,
    base: &Path,
    config: &DiagramConfig,
    resource: Option<&RenderResource>,
) -> Result<()> {
    if let Some(dir) = base.parent()
        && !dir.as_os_str().is_empty()
    {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("creating output directory {}", dir.display()))?;
    }

    let static_svg = render_svg(diagram);
    let (width, height) = (diagram.layout.width, diagram.layout.height);

    let png_path = path_with_ext(base, "png");
    match resource {
        Some(resource) => {
            if let Err(err) = resource.write_png(&static_svg, &png_path, width, height) {
                warn!("png export of {} failed: {err:#}", png_path.display());
            }
        }
        None => warn!(
            "png export of {} skipped, render resource unavailable",
            png_path.display()
        ),
    }

    let svg_path = path_with_ext(base, "svg");
    match resource {
        Some(resource) => {
            if let Err(err) = resource.write_svg(&static_svg, &svg_path, width, height) {
                warn!("svg export of {} failed: {err:#}", svg_path.display());
            }
        }
        None => warn!(
            "svg export of {} skipped, render resource unavailable",
            svg_path.display()
        ),
    }

    diagram.title_text = Some(diagram.title.clone());
    diagram.sizing = Sizing::StretchWidth;

    let page_title = if config.title_html.is_empty() {
        diagram.title.clone()
    } else {
        config.title_html.clone()
    };
    let html_path = path_with_ext(base, "html");
    std::fs::write(&html_path, render_page(diagram, &page_title))
        .with_context(|| format!("writing {}", html_path.display()))?;

    if config.show_plot {
        open::that(&html_path).with_context(|| format!("opening {}", html_path.display()))?;
    }

    Ok(())
}

/// Appends an extension instead of replacing one, so sheet names containing
/// dots keep their full name.
pub(crate) fn path_with_ext(base: &Path, ext: &str) -> PathBuf {
    let mut name = base
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_default();
    name.push(format!(".{ext}"));
    base.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagram::build;
    use crate::format::DecimalLocale;
    use crate::table::{EdgeRow, EdgeTable};

    fn scratch(name: &str) -> PathBuf {
        let dir = PathBuf::from("target").join("export_tests").join(name);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn diagram(config: &DiagramConfig) -> RenderedDiagram {
        let table = EdgeTable::new(vec![
            EdgeRow::new("Gas", "Boiler", 100.0),
            EdgeRow::new("Boiler", "Heat", 80.0),
        ]);
        build(
            &table,
            "A very long diagram title",
            config,
            &config.palette(),
            DecimalLocale::default(),
        )
        .unwrap()
    }

    #[test]
    fn appends_extension_without_clobbering_dots() {
        let base = Path::new("out/Sankey 2024.Q1");
        assert_eq!(
            path_with_ext(base, "png"),
            PathBuf::from("out/Sankey 2024.Q1.png")
        );
    }

    #[test]
    fn page_is_written_even_without_render_resource() {
        let config = DiagramConfig::default();
        let mut diagram = diagram(&config);
        let base = scratch("no_resource").join("sheet");
        export(&mut diagram, &base, &config, None).unwrap();
        assert!(path_with_ext(&base, "html").exists());
        assert!(!path_with_ext(&base, "png").exists());
        assert!(!path_with_ext(&base, "svg").exists());
    }

    #[test]
    fn page_export_restores_full_title_and_stretch_sizing() {
        let config = DiagramConfig {
            export_title: true,
            title_max_chars: Some(6),
            ..DiagramConfig::default()
        };
        let mut diagram = diagram(&config);
        assert_eq!(diagram.title_text.as_deref(), Some("A very"));

        let base = scratch("titles").join("sheet");
        export(&mut diagram, &base, &config, None).unwrap();
        assert_eq!(
            diagram.title_text.as_deref(),
            Some("A very long diagram title")
        );
        assert_eq!(diagram.sizing, Sizing::StretchWidth);

        let html = std::fs::read_to_string(path_with_ext(&base, "html")).unwrap();
        assert!(html.contains("A very long diagram title"));
    }

    #[test]
    fn page_title_override_is_used() {
        let config = DiagramConfig {
            title_html: "Custom page".to_string(),
            ..DiagramConfig::default()
        };
        let mut diagram = diagram(&config);
        let base = scratch("page_title").join("sheet");
        export(&mut diagram, &base, &config, None).unwrap();
        let html = std::fs::read_to_string(path_with_ext(&base, "html")).unwrap();
        assert!(html.contains("<title>Custom page</title>"));
    }
}
