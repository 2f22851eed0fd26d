//! Export pipeline: flatten the scene into a PNG snapshot and push it out
//!
//! Export is fire-and-forget. The single registered consumer receives every
//! snapshot; failures are logged here and never reach the operation that
//! triggered the export.

use std::fmt;
use std::io;

use base64::{Engine as _, engine::general_purpose::STANDARD};
use image::RgbaImage;

use crate::render::{FontBook, RenderOptions, pixmap_to_rgba, render_scene};
use crate::scene::SceneStore;

/// The flattened design as a lossless PNG
#[derive(Clone, PartialEq, Eq)]
pub struct RasterSnapshot {
    pub width: u32,
    pub height: u32,
    pub png: Vec<u8>,
}

impl fmt::Debug for RasterSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RasterSnapshot")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("png_bytes", &self.png.len())
            .finish()
    }
}

impl RasterSnapshot {
    /// `data:image/png;base64,...` URL of the snapshot
    pub fn to_data_url(&self) -> String {
        format!("data:image/png;base64,{}", STANDARD.encode(&self.png))
    }

    /// Decode the PNG back into RGBA pixels
    pub fn decode(&self) -> anyhow::Result<RgbaImage> {
        Ok(image::load_from_memory_with_format(&self.png, image::ImageFormat::Png)?.to_rgba8())
    }

    pub fn save(&self, path: &std::path::Path) -> anyhow::Result<()> {
        Ok(std::fs::write(path, &self.png)?)
    }
}

pub(crate) fn write_png<W: io::Write>(w: W, image: &RgbaImage) -> Result<(), png::EncodingError> {
    let mut encoder = png::Encoder::new(w, image.width(), image.height());
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header()?;
    writer.write_image_data(image.as_raw())
}

/// Render the committed scene and encode it
pub fn snapshot(scene: &SceneStore, fonts: &FontBook) -> anyhow::Result<RasterSnapshot> {
    let pixmap = render_scene(scene, fonts, RenderOptions::default())
        .ok_or_else(|| anyhow::anyhow!("failed to allocate export surface"))?;
    let image = pixmap_to_rgba(&pixmap);
    let mut png = Vec::new();
    write_png(&mut png, &image)?;
    Ok(RasterSnapshot {
        width: image.width(),
        height: image.height(),
        png,
    })
}

/// Callback receiving every exported snapshot
pub type DesignChangeFn = Box<dyn FnMut(RasterSnapshot)>;

/// Pushes snapshots to the one registered consumer
pub struct Exporter {
    on_design_change: DesignChangeFn,
    exports: u64,
}

impl fmt::Debug for Exporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Exporter")
            .field("exports", &self.exports)
            .finish_non_exhaustive()
    }
}

impl Exporter {
    pub fn new(on_design_change: impl FnMut(RasterSnapshot) + 'static) -> Self {
        Self {
            on_design_change: Box::new(on_design_change),
            exports: 0,
        }
    }

    /// Render, encode and deliver the current scene
    pub fn export(&mut self, scene: &SceneStore, fonts: &FontBook) {
        match snapshot(scene, fonts) {
            Ok(snapshot) => {
                self.exports += 1;
                log::debug!(
                    "Export #{}: {} layers, {} PNG bytes",
                    self.exports,
                    scene.len(),
                    snapshot.png.len()
                );
                (self.on_design_change)(snapshot);
            }
            Err(err) => log::error!("Failed to export design: {:#}", err),
        }
    }

    /// Number of snapshots delivered so far
    pub fn exports(&self) -> u64 {
        self.exports
    }
}
