//! Scene rasterization using tiny-skia
//!
//! These functions flatten the scene store onto an offscreen pixmap, either
//! for export or for an interactive preview frame.

use image::RgbaImage;
use tiny_skia::{
    ColorU8, FillRule, FilterQuality, Paint, PathBuilder, Pixmap, PixmapPaint, Stroke,
    Transform as SkiaTransform,
};

use super::geometry::{self, shape};
use super::text::{FontBook, rasterize_text};
use crate::domain::{BaseShape, Layer, LayerContent, Rgba, Size, Transform, canvas};
use crate::scene::SceneStore;

/// Per-render overrides that are not part of the committed scene
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderOptions<'a> {
    /// Transform to draw instead of the stored one (drag preview)
    pub preview: Option<(&'a Layer, Transform)>,
    /// Layer to decorate with a selection outline and grips
    pub selected: Option<&'a Layer>,
}

/// Convert RgbaImage to Pixmap, premultiplying alpha
pub fn rgba_to_pixmap(img: &RgbaImage) -> Option<Pixmap> {
    let mut pixmap = Pixmap::new(img.width(), img.height())?;
    for (dst, src) in pixmap.pixels_mut().iter_mut().zip(img.pixels()) {
        let [r, g, b, a] = src.0;
        *dst = ColorU8::from_rgba(r, g, b, a).premultiply();
    }
    Some(pixmap)
}

/// Convert Pixmap back to straight-alpha RgbaImage
pub fn pixmap_to_rgba(pixmap: &Pixmap) -> RgbaImage {
    RgbaImage::from_fn(pixmap.width(), pixmap.height(), |x, y| {
        let color = pixmap
            .pixel(x, y)
            .map(|p| p.demultiply())
            .unwrap_or(ColorU8::from_rgba(0, 0, 0, 0));
        image::Rgba([color.red(), color.green(), color.blue(), color.alpha()])
    })
}

fn paint_for(color: Rgba) -> Paint<'static> {
    let [r, g, b, a] = color.to_rgba_u8();
    let mut paint = Paint::default();
    paint.set_color_rgba8(r, g, b, a);
    paint.anti_alias = true;
    paint
}

/// Affine transform mapping unscaled layer coordinates to canvas space
pub fn layer_transform(transform: &Transform, size: Size) -> SkiaTransform {
    let scaled = size.scaled(transform.scale);
    SkiaTransform::from_translate(transform.x, transform.y)
        .pre_concat(SkiaTransform::from_rotate_at(
            transform.angle,
            scaled.width / 2.0,
            scaled.height / 2.0,
        ))
        .pre_scale(transform.scale, transform.scale)
}

/// Build a rounded rectangle path using cubic bezier corners
fn build_rounded_rect_path(
    x: f32,
    y: f32,
    width: f32,
    height: f32,
    radius: f32,
) -> Option<tiny_skia::Path> {
    let r = radius.min(width / 2.0).min(height / 2.0).max(0.0);
    let k = r * shape::BEZIER_K;
    let (right, bottom) = (x + width, y + height);

    let mut pb = PathBuilder::new();
    pb.move_to(x + r, y);

    // Top edge and top-right corner
    pb.line_to(right - r, y);
    pb.cubic_to(right - r + k, y, right, y + r - k, right, y + r);

    // Right edge and bottom-right corner
    pb.line_to(right, bottom - r);
    pb.cubic_to(right, bottom - r + k, right - r + k, bottom, right - r, bottom);

    // Bottom edge and bottom-left corner
    pb.line_to(x + r, bottom);
    pb.cubic_to(x + r - k, bottom, x, bottom - r + k, x, bottom - r);

    // Left edge and top-left corner
    pb.line_to(x, y + r);
    pb.cubic_to(x, y + r - k, x + r - k, y, x + r, y);

    pb.close();
    pb.finish()
}

/// Draw a base layer (mat or border)
fn draw_base_shape(pixmap: &mut Pixmap, shape: &BaseShape, transform: &Transform) {
    let Some(path) = build_rounded_rect_path(
        transform.x,
        transform.y,
        shape.width,
        shape.height,
        shape.radius,
    ) else {
        return;
    };

    if !shape.fill.is_transparent() {
        pixmap.fill_path(
            &path,
            &paint_for(shape.fill),
            FillRule::Winding,
            SkiaTransform::identity(),
            None,
        );
    }

    if shape.stroke_width > 0.0 && !shape.stroke.is_transparent() {
        let stroke = Stroke {
            width: shape.stroke_width,
            ..Default::default()
        };
        pixmap.stroke_path(
            &path,
            &paint_for(shape.stroke),
            &stroke,
            SkiaTransform::identity(),
            None,
        );
    }
}

/// Composite a straight-alpha sprite; `placement` maps sprite pixels to canvas
fn draw_sprite(pixmap: &mut Pixmap, sprite: &RgbaImage, placement: SkiaTransform) {
    let Some(sprite) = rgba_to_pixmap(sprite) else {
        return;
    };
    let paint = PixmapPaint {
        quality: FilterQuality::Bilinear,
        ..Default::default()
    };
    pixmap.draw_pixmap(0, 0, sprite.as_ref(), &paint, placement, None);
}

/// Draw one layer at the given transform
fn draw_layer(pixmap: &mut Pixmap, fonts: &FontBook, layer: &Layer, transform: &Transform) {
    match layer.content() {
        LayerContent::Background(shape) | LayerContent::Border(shape) => {
            draw_base_shape(pixmap, shape, transform);
        }
        LayerContent::Text(text) => {
            if let Some(sprite) = rasterize_text(fonts, text, transform) {
                let (x, y) = sprite.origin;
                let placement = layer_transform(transform, text.size)
                    .pre_translate(x, y)
                    .pre_scale(1.0 / sprite.resolution, 1.0 / sprite.resolution);
                draw_sprite(pixmap, &sprite.image, placement);
            }
        }
        LayerContent::Image(image) => {
            let placement = layer_transform(transform, image.natural_size());
            draw_sprite(pixmap, &image.pixels, placement);
        }
    }
}

/// Outline and grips around the selected layer (preview only)
fn draw_selection_overlay(pixmap: &mut Pixmap, layer: &Layer, transform: &Transform) {
    let size = layer.size();
    let [nw, ne, se, sw] = transform.corners(size);
    let handles = geometry::handle_points(transform, size);
    let (_, rotate) = handles[4];

    let mut pb = PathBuilder::new();
    pb.move_to(nw.x, nw.y);
    pb.line_to(ne.x, ne.y);
    pb.line_to(se.x, se.y);
    pb.line_to(sw.x, sw.y);
    pb.close();
    // Stem from the top edge to the rotation grip
    let top_mid = ((nw.x + ne.x) / 2.0, (nw.y + ne.y) / 2.0);
    pb.move_to(top_mid.0, top_mid.1);
    pb.line_to(rotate.x, rotate.y);

    let accent = paint_for(Rgba::rgb(0xdc, 0x26, 0x26));
    if let Some(path) = pb.finish() {
        let stroke = Stroke {
            width: 1.0,
            ..Default::default()
        };
        pixmap.stroke_path(&path, &accent, &stroke, SkiaTransform::identity(), None);
    }

    let half = geometry::handle::SIZE / 2.0;
    for (_, p) in handles {
        if let Some(rect) = tiny_skia::Rect::from_xywh(
            p.x - half,
            p.y - half,
            geometry::handle::SIZE,
            geometry::handle::SIZE,
        ) {
            pixmap.fill_rect(rect, &accent, SkiaTransform::identity(), None);
        }
    }
}

/// Flatten the scene onto a canvas-sized pixmap
///
/// Layers are drawn in store order over the surface color.
pub fn render_scene(scene: &SceneStore, fonts: &FontBook, options: RenderOptions<'_>) -> Option<Pixmap> {
    let mut pixmap = Pixmap::new(canvas::WIDTH, canvas::HEIGHT)?;
    let [r, g, b, a] = scene.surface_color().to_rgba_u8();
    pixmap.fill(tiny_skia::Color::from_rgba8(r, g, b, a));

    for layer in scene.layers() {
        let transform = match options.preview {
            Some((target, preview)) if target.id() == layer.id() => preview,
            _ => layer.transform(),
        };
        draw_layer(&mut pixmap, fonts, layer, &transform);
    }

    if let Some(selected) = options.selected {
        let transform = match options.preview {
            Some((target, preview)) if target.id() == selected.id() => preview,
            _ => selected.transform(),
        };
        draw_selection_overlay(&mut pixmap, selected, &transform);
    }

    Some(pixmap)
}
