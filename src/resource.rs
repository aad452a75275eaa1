use anyhow::{Result, anyhow, bail};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;
use usvg::fontdb;

/// The shared rasterization resource for one batch: a loaded system font
/// database behind the usvg/resvg pipeline.
///
/// Loading system fonts is expensive, so the batch acquires this once and
/// every raster/vector export borrows it. Ownership guarantees the release
/// runs exactly once, on every exit path, when the batch scope ends.
pub struct RenderResource {
    fontdb: Arc<fontdb::Database>,
}

impl RenderResource {
    pub fn acquire() -> Result<Self> {
        let mut db = fontdb::Database::new();
        db.load_system_fonts();
        if db.is_empty() {
            bail!("no system fonts available, raster and vector export need at least one face");
        }
        debug!(faces = db.len(), "render resource acquired");
        Ok(Self {
            fontdb: Arc::new(db),
        })
    }

    fn usvg_options(&self, width: f32, height: f32) -> usvg::Options<'static> {
        let mut opt = usvg::Options::default();
        opt.font_family = "Helvetica".to_string();
        opt.default_size = usvg::Size::from_wh(width, height)
            .unwrap_or_else(|| usvg::Size::from_wh(800.0, 600.0).expect("static size"));
        opt.fontdb = self.fontdb.clone();
        opt
    }

    /// Rasterizes an SVG document to a png file.
    pub fn write_png(&self, svg: &str, output: &Path, width: f32, height: f32) -> Result<()> {
        let opt = self.usvg_options(width, height);
        let tree = usvg::Tree::from_str(svg, &opt)?;
        let size = tree.size().to_int_size();
        let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
            .ok_or_else(|| anyhow!("failed to allocate {}x{} pixmap", size.width(), size.height()))?;
        let mut pixmap_mut = pixmap.as_mut();
        resvg::render(&tree, resvg::tiny_skia::Transform::default(), &mut pixmap_mut);
        pixmap.save_png(output)?;
        Ok(())
    }

    /// Writes a self-contained SVG with text resolved to paths, so the file
    /// stays usable in viewers without the chart fonts installed.
    pub fn write_svg(&self, svg: &str, output: &Path, width: f32, height: f32) -> Result<()> {
        let opt = self.usvg_options(width, height);
        let tree = usvg::Tree::from_str(svg, &opt)?;
        let resolved = tree.to_string(&usvg::WriteOptions::default());
        std::fs::write(output, resolved)?;
        Ok(())
    }
}

impl Drop for RenderResource {
    fn drop(&mut self) {
        #[cfg(test)]
        counters::RELEASES.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        debug!("render resource released");
    }
}

#[cfg(test)]
pub(crate) mod counters {
    use std::sync::atomic::AtomicUsize;

    /// Total resource releases in this test process.
    pub static RELEASES: AtomicUsize = AtomicUsize::new(0);
}
