//! Text measurement and rasterization using ab_glyph
//!
//! Text is drawn bold with a fixed soft drop shadow into an RGBA sprite in
//! unscaled layer coordinates; the scene renderer then places the sprite with
//! the layer's transform.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use ab_glyph::{Font, FontArc, ScaleFont, point};
use anyhow::Context;
use image::{Rgba as Pixel, RgbaImage};

use super::geometry::text::{
    ESTIMATED_ADVANCE, LINE_HEIGHT, SHADOW_ALPHA, SHADOW_BLUR, SHADOW_OFFSET, SPRITE_PADDING,
};
use crate::config::DesignerConfig;
use crate::domain::{FontFamily, Point, Size, TextLayer, TextStyle, Transform, canvas};

/// Bold sans fonts tried when no fallback font is configured
const SYSTEM_FALLBACKS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/TTF/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Bold.ttf",
    "/usr/share/fonts/liberation-sans/LiberationSans-Bold.ttf",
    "/System/Library/Fonts/Supplemental/Arial Bold.ttf",
    "/Library/Fonts/Arial Bold.ttf",
    "C:\\Windows\\Fonts\\arialbd.ttf",
];

/// Bold sans font shipped with the crate, used when nothing else loads
const BUNDLED_FONT: &[u8] = include_bytes!("../../resources/fonts/DejaVuSans-Bold.ttf");

/// Loaded fonts for every family the text controls offer
#[derive(Clone, Default)]
pub struct FontBook {
    fonts: HashMap<FontFamily, FontArc>,
    fallback: Option<FontArc>,
}

impl std::fmt::Debug for FontBook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontBook")
            .field("families", &self.fonts.keys().collect::<Vec<_>>())
            .field("fallback", &self.fallback.is_some())
            .finish()
    }
}

impl FontBook {
    /// A font book without any fonts
    ///
    /// Text is measured by estimate only and not drawn; see [`Self::bundled`].
    pub fn empty() -> Self {
        Self::default()
    }

    /// A font book drawing every family with the bundled font
    pub fn bundled() -> Self {
        let mut book = Self::empty();
        book.fallback = bundled_font();
        book
    }

    /// Load the font files named in the configuration
    ///
    /// Files that fail to load are skipped with a warning. Families without
    /// their own file use the configured fallback, then a well-known system
    /// font, then the bundled font.
    pub fn from_config(config: &DesignerConfig) -> Self {
        let mut book = Self::empty();
        for (family, path) in &config.fonts {
            match load_font(path) {
                Ok(font) => {
                    book.fonts.insert(*family, font);
                }
                Err(err) => log::warn!("Skipping font for {}: {:#}", family.name(), err),
            }
        }

        let fallback_paths = config
            .fallback_font
            .iter()
            .cloned()
            .chain(SYSTEM_FALLBACKS.iter().map(PathBuf::from));
        for path in fallback_paths {
            if !path.exists() {
                continue;
            }
            match load_font(&path) {
                Ok(font) => {
                    log::debug!("Using fallback font {}", path.display());
                    book.fallback = Some(font);
                    break;
                }
                Err(err) => log::warn!("Skipping fallback font: {:#}", err),
            }
        }

        if book.fallback.is_none() {
            book.fallback = bundled_font();
        }
        if book.fonts.is_empty() && book.fallback.is_none() {
            log::warn!("No fonts available, text layers will not be visible in exports");
        }
        book
    }

    /// Register a font for a family from raw TrueType/OpenType bytes
    pub fn insert(&mut self, family: FontFamily, bytes: Vec<u8>) -> anyhow::Result<()> {
        let font = FontArc::try_from_vec(bytes)
            .with_context(|| format!("invalid font data for {}", family.name()))?;
        self.fonts.insert(family, font);
        Ok(())
    }

    /// Use the given font for every family without its own font
    pub fn set_fallback(&mut self, bytes: Vec<u8>) -> anyhow::Result<()> {
        self.fallback = Some(FontArc::try_from_vec(bytes).context("invalid fallback font data")?);
        Ok(())
    }

    /// Font used to draw `family`
    pub fn font_for(&self, family: FontFamily) -> Option<&FontArc> {
        self.fonts.get(&family).or(self.fallback.as_ref())
    }

    /// Box size of `content` drawn in `style`, at scale 1
    pub fn measure(&self, content: &str, style: &TextStyle) -> Size {
        let px = style.size.px() as f32;
        let lines: Vec<&str> = content.split('\n').collect();
        let height = lines.len() as f32 * px * LINE_HEIGHT;

        let width = match self.font_for(style.family) {
            Some(font) => lines
                .iter()
                .map(|line| line_width(font, px, line))
                .fold(0.0, f32::max),
            None => lines
                .iter()
                .map(|line| line.chars().count() as f32 * px * ESTIMATED_ADVANCE)
                .fold(0.0, f32::max),
        };

        // A zero-width box could never be hit by the pointer
        Size::new(width.max(1.0), height)
    }
}

fn bundled_font() -> Option<FontArc> {
    match FontArc::try_from_slice(BUNDLED_FONT) {
        Ok(font) => Some(font),
        Err(err) => {
            log::error!("Bundled font is unreadable: {}", err);
            None
        }
    }
}

fn load_font(path: &Path) -> anyhow::Result<FontArc> {
    let bytes =
        std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    FontArc::try_from_vec(bytes).with_context(|| format!("invalid font file {}", path.display()))
}

fn line_width(font: &FontArc, px: f32, line: &str) -> f32 {
    let scaled = font.as_scaled(px);
    let mut width = 0.0f32;
    let mut prev = None;
    for ch in line.chars() {
        let gid = font.glyph_id(ch);
        if let Some(prev_id) = prev {
            width += scaled.kern(prev_id, gid);
        }
        width += scaled.h_advance(gid);
        prev = Some(gid);
    }
    width
}

/// A rasterized text layer
///
/// Only the part of the layer box that can land on the canvas is drawn,
/// at no more than canvas resolution, so the sprite stays close to canvas
/// size whatever the text length or layer scale.
pub struct TextSprite {
    pub image: RgbaImage,
    /// Top-left of the sprite in unscaled box coordinates
    pub origin: (f32, f32),
    /// Sprite pixels per unscaled box pixel
    pub resolution: f32,
}

/// Part of the layer box, in unscaled box coordinates, that can reach the
/// canvas, widened by the sprite padding. `None` when nothing is visible.
fn visible_region(text: &TextLayer, transform: &Transform) -> Option<(f32, f32, f32, f32)> {
    let pad = SPRITE_PADDING as f32;
    let (w, h) = (canvas::WIDTH as f32, canvas::HEIGHT as f32);
    let corners = [(0.0, 0.0), (w, 0.0), (w, h), (0.0, h)]
        .map(|(x, y)| transform.canvas_to_box(text.size, Point::new(x, y)));

    let scale = transform.scale;
    let min_x = corners.iter().map(|p| p.x).fold(f32::INFINITY, f32::min) / scale - pad;
    let min_y = corners.iter().map(|p| p.y).fold(f32::INFINITY, f32::min) / scale - pad;
    let max_x = corners.iter().map(|p| p.x).fold(f32::NEG_INFINITY, f32::max) / scale + pad;
    let max_y = corners.iter().map(|p| p.y).fold(f32::NEG_INFINITY, f32::max) / scale + pad;

    let x0 = min_x.max(-pad).floor();
    let y0 = min_y.max(-pad).floor();
    let x1 = max_x.min(text.size.width + pad).ceil();
    let y1 = max_y.min(text.size.height + pad).ceil();
    (x0 < x1 && y0 < y1).then_some((x0, y0, x1, y1))
}

/// Draw a text layer into a sprite, or `None` if no font can draw it or the
/// layer lies entirely off canvas
pub fn rasterize_text(
    fonts: &FontBook,
    text: &TextLayer,
    transform: &Transform,
) -> Option<TextSprite> {
    let font = fonts.font_for(text.style.family)?;
    if transform.scale.is_nan() || transform.scale <= 0.0 {
        return None;
    }
    let resolution = transform.scale.min(1.0);
    let (x0, y0, x1, y1) = visible_region(text, transform)?;

    let width = ((x1 - x0) * resolution).ceil() as u32;
    let height = ((y1 - y0) * resolution).ceil() as u32;
    let len = (width as usize).checked_mul(height as usize)?;
    if len == 0 {
        return None;
    }

    // Glyph coverage per sprite pixel
    let mut coverage = vec![0.0f32; len];
    let px = text.style.size.px() as f32 * resolution;
    let scaled = font.as_scaled(px);
    let line_height = px * LINE_HEIGHT;
    let glyph_height = scaled.ascent() - scaled.descent();
    // Box origin in sprite pixels
    let (ox, oy) = (-x0 * resolution, -y0 * resolution);

    for (i, line) in text.content.split('\n').enumerate() {
        let top = oy + i as f32 * line_height;
        if top > height as f32 {
            break;
        }
        if top + line_height < 0.0 {
            continue;
        }
        let baseline = top + (line_height - glyph_height) / 2.0 + scaled.ascent();
        let mut cursor = ox;
        let mut prev = None;
        for ch in line.chars() {
            if cursor > width as f32 {
                break;
            }
            let gid = font.glyph_id(ch);
            if let Some(prev_id) = prev {
                cursor += scaled.kern(prev_id, gid);
            }
            let advance = scaled.h_advance(gid);
            if cursor + advance >= 0.0 {
                let glyph = gid.with_scale_and_position(px, point(cursor, baseline));
                if let Some(outlined) = font.outline_glyph(glyph) {
                    let bounds = outlined.px_bounds();
                    outlined.draw(|gx, gy, cov| {
                        let x = bounds.min.x as i64 + i64::from(gx);
                        let y = bounds.min.y as i64 + i64::from(gy);
                        if x >= 0 && y >= 0 && x < i64::from(width) && y < i64::from(height) {
                            let slot = &mut coverage[y as usize * width as usize + x as usize];
                            *slot = (*slot + cov).min(1.0);
                        }
                    });
                }
            }
            cursor += advance;
            prev = Some(gid);
        }
    }

    let shadow = shadow_from_coverage(&coverage, width, height, resolution);
    let [r, g, b, a] = text.style.fill.to_rgba_u8();
    let glyphs = RgbaImage::from_fn(width, height, |x, y| {
        let cov = coverage[y as usize * width as usize + x as usize];
        Pixel([r, g, b, (f32::from(a) * cov).round() as u8])
    });

    let mut image = shadow;
    image::imageops::overlay(&mut image, &glyphs, 0, 0);
    Some(TextSprite {
        image,
        origin: (x0, y0),
        resolution,
    })
}

/// Offset, blurred, half-transparent black copy of the glyph coverage
fn shadow_from_coverage(coverage: &[f32], width: u32, height: u32, resolution: f32) -> RgbaImage {
    let dx = (SHADOW_OFFSET.0 * resolution).round() as i64;
    let dy = (SHADOW_OFFSET.1 * resolution).round() as i64;
    let hard = RgbaImage::from_fn(width, height, |x, y| {
        let sx = i64::from(x) - dx;
        let sy = i64::from(y) - dy;
        let cov = if sx >= 0 && sy >= 0 {
            coverage[sy as usize * width as usize + sx as usize]
        } else {
            0.0
        };
        Pixel([0, 0, 0, (255.0 * SHADOW_ALPHA * cov).round() as u8])
    });
    // A blur radius of r corresponds roughly to a gaussian sigma of r / 2
    image::imageops::blur(&hard, (SHADOW_BLUR / 2.0 * resolution).max(0.5))
}
