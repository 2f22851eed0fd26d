//! Scene rendering module
//!
//! This module contains:
//! - Geometry shared between rendering and pointer hit testing
//! - Scene rasterization using tiny-skia (for export and previews)
//! - Text measurement and rasterization using ab_glyph

pub mod geometry;
pub mod image;
pub mod text;

pub use self::image::{RenderOptions, pixmap_to_rgba, render_scene};
pub use self::text::FontBook;
