//! Layer types for the design canvas
//!
//! A layer is one positionable object on the canvas. The two base layers
//! (backing shape and decorative border) are created by the scene store and
//! never leave it; everything else is user content.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use image::RgbaImage;
use serde::{Deserialize, Serialize};

use super::color::Rgba;
use super::geometry::{Size, Transform, canvas};

/// Opaque layer identifier, unique within one editing session
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LayerId(pub(crate) u64);

impl fmt::Debug for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LayerId({})", self.0)
    }
}

/// Discriminator of [`LayerContent`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LayerKind {
    Background,
    Border,
    Text,
    Image,
}

impl LayerKind {
    /// Base layers are permanent and never selectable
    pub fn is_base(self) -> bool {
        matches!(self, LayerKind::Background | LayerKind::Border)
    }
}

/// Font families offered by the text controls
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FontFamily {
    #[default]
    Arial,
    Helvetica,
    #[serde(rename = "Times New Roman")]
    TimesNewRoman,
    Georgia,
    Verdana,
    Impact,
    #[serde(rename = "Comic Sans MS")]
    ComicSansMs,
}

impl FontFamily {
    pub const ALL: [FontFamily; 7] = [
        FontFamily::Arial,
        FontFamily::Helvetica,
        FontFamily::TimesNewRoman,
        FontFamily::Georgia,
        FontFamily::Verdana,
        FontFamily::Impact,
        FontFamily::ComicSansMs,
    ];

    /// Display name as shown in the font picker
    pub fn name(self) -> &'static str {
        match self {
            FontFamily::Arial => "Arial",
            FontFamily::Helvetica => "Helvetica",
            FontFamily::TimesNewRoman => "Times New Roman",
            FontFamily::Georgia => "Georgia",
            FontFamily::Verdana => "Verdana",
            FontFamily::Impact => "Impact",
            FontFamily::ComicSansMs => "Comic Sans MS",
        }
    }
}

impl FromStr for FontFamily {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FontFamily::ALL
            .into_iter()
            .find(|family| family.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown font family: {s}"))
    }
}

/// Font sizes offered by the text controls, in pixels
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum FontSize {
    Px24,
    Px32,
    #[default]
    Px48,
    Px64,
    Px72,
    Px96,
}

impl FontSize {
    pub const ALL: [FontSize; 6] = [
        FontSize::Px24,
        FontSize::Px32,
        FontSize::Px48,
        FontSize::Px64,
        FontSize::Px72,
        FontSize::Px96,
    ];

    pub fn px(self) -> u32 {
        match self {
            FontSize::Px24 => 24,
            FontSize::Px32 => 32,
            FontSize::Px48 => 48,
            FontSize::Px64 => 64,
            FontSize::Px72 => 72,
            FontSize::Px96 => 96,
        }
    }
}

impl TryFrom<u32> for FontSize {
    type Error = String;

    fn try_from(px: u32) -> Result<Self, Self::Error> {
        FontSize::ALL
            .into_iter()
            .find(|size| size.px() == px)
            .ok_or_else(|| format!("unsupported font size: {px}px"))
    }
}

impl From<FontSize> for u32 {
    fn from(size: FontSize) -> Self {
        size.px()
    }
}

/// User-editable text style; weight (bold) and shadow are fixed
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextStyle {
    pub family: FontFamily,
    pub size: FontSize,
    pub fill: Rgba,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            family: FontFamily::Arial,
            size: FontSize::Px48,
            fill: Rgba::WHITE,
        }
    }
}

/// Partial update of a [`TextStyle`]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StyleDelta {
    pub family: Option<FontFamily>,
    pub size: Option<FontSize>,
    pub fill: Option<Rgba>,
}

impl StyleDelta {
    /// Delta that sets every field of `style`
    pub fn from_style(style: TextStyle) -> Self {
        Self {
            family: Some(style.family),
            size: Some(style.size),
            fill: Some(style.fill),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.family.is_none() && self.size.is_none() && self.fill.is_none()
    }

    /// Apply to a style, returning the updated copy
    pub fn applied_to(&self, style: TextStyle) -> TextStyle {
        TextStyle {
            family: self.family.unwrap_or(style.family),
            size: self.size.unwrap_or(style.size),
            fill: self.fill.unwrap_or(style.fill),
        }
    }
}

/// Rounded rectangle used by the two base layers
#[derive(Clone, Debug, PartialEq)]
pub struct BaseShape {
    pub width: f32,
    pub height: f32,
    pub radius: f32,
    /// Fill color (transparent for the border)
    pub fill: Rgba,
    pub stroke: Rgba,
    pub stroke_width: f32,
}

impl BaseShape {
    /// The mat itself
    pub fn background(fill: Rgba) -> Self {
        Self {
            width: canvas::BACKGROUND_WIDTH,
            height: canvas::BACKGROUND_HEIGHT,
            radius: canvas::BACKGROUND_RADIUS,
            fill,
            stroke: Rgba::rgb(0x44, 0x44, 0x44),
            stroke_width: canvas::BACKGROUND_STROKE_WIDTH,
        }
    }

    /// Unfilled edge line inset from the mat
    pub fn border() -> Self {
        Self {
            width: canvas::BORDER_WIDTH,
            height: canvas::BORDER_HEIGHT,
            radius: canvas::BORDER_RADIUS,
            fill: Rgba::TRANSPARENT,
            stroke: Rgba::rgb(0x55, 0x55, 0x55),
            stroke_width: canvas::BORDER_STROKE_WIDTH,
        }
    }
}

/// Text label content
#[derive(Clone, Debug, PartialEq)]
pub struct TextLayer {
    pub content: String,
    pub style: TextStyle,
    /// Measured box size at scale 1
    pub size: Size,
}

/// Uploaded raster image content
#[derive(Clone, Debug)]
pub struct ImageLayer {
    pub pixels: Arc<RgbaImage>,
    /// Uniform scale computed when the image was inserted
    pub fit_scale: f32,
}

impl ImageLayer {
    pub fn natural_size(&self) -> Size {
        Size::new(self.pixels.width() as f32, self.pixels.height() as f32)
    }
}

impl PartialEq for ImageLayer {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.pixels, &other.pixels) && self.fit_scale == other.fit_scale
    }
}

/// Payload of a layer, tagged by variant
#[derive(Clone, Debug, PartialEq)]
pub enum LayerContent {
    Background(BaseShape),
    Border(BaseShape),
    Text(TextLayer),
    Image(ImageLayer),
}

/// User content that may be appended to the scene
///
/// Base layers are deliberately not representable here.
#[derive(Clone, Debug, PartialEq)]
pub enum ContentLayer {
    Text(TextLayer),
    Image(ImageLayer),
}

impl From<ContentLayer> for LayerContent {
    fn from(content: ContentLayer) -> Self {
        match content {
            ContentLayer::Text(text) => LayerContent::Text(text),
            ContentLayer::Image(image) => LayerContent::Image(image),
        }
    }
}

/// One object in the scene
#[derive(Clone, Debug, PartialEq)]
pub struct Layer {
    pub(crate) id: LayerId,
    pub(crate) transform: Transform,
    pub(crate) content: LayerContent,
}

impl Layer {
    pub fn id(&self) -> LayerId {
        self.id
    }

    pub fn transform(&self) -> Transform {
        self.transform
    }

    pub fn content(&self) -> &LayerContent {
        &self.content
    }

    pub fn kind(&self) -> LayerKind {
        match self.content {
            LayerContent::Background(_) => LayerKind::Background,
            LayerContent::Border(_) => LayerKind::Border,
            LayerContent::Text(_) => LayerKind::Text,
            LayerContent::Image(_) => LayerKind::Image,
        }
    }

    pub fn is_base(&self) -> bool {
        self.kind().is_base()
    }

    /// Box size before the transform's scale is applied
    pub fn size(&self) -> Size {
        match &self.content {
            LayerContent::Background(shape) | LayerContent::Border(shape) => {
                Size::new(shape.width, shape.height)
            }
            LayerContent::Text(text) => text.size,
            LayerContent::Image(image) => image.natural_size(),
        }
    }

    pub fn as_text(&self) -> Option<&TextLayer> {
        match &self.content {
            LayerContent::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_image(&self) -> Option<&ImageLayer> {
        match &self.content {
            LayerContent::Image(image) => Some(image),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_font_family_names_round_trip() {
        for family in FontFamily::ALL {
            assert_eq!(family.name().parse::<FontFamily>(), Ok(family));
        }
        assert!("Papyrus".parse::<FontFamily>().is_err());

        let json = serde_json::to_string(&FontFamily::ComicSansMs).unwrap();
        assert_eq!(json, "\"Comic Sans MS\"");
    }

    #[test]
    fn test_font_size_only_accepts_listed_sizes() {
        assert_eq!(FontSize::try_from(48), Ok(FontSize::Px48));
        assert!(FontSize::try_from(50).is_err());
        assert_eq!(serde_json::to_string(&FontSize::Px96).unwrap(), "96");
        assert!(serde_json::from_str::<FontSize>("13").is_err());
    }

    #[test]
    fn test_style_delta_applies_only_set_fields() {
        let base = TextStyle::default();
        let delta = StyleDelta {
            fill: Some(Rgba::rgb(255, 0, 0)),
            ..Default::default()
        };
        let styled = delta.applied_to(base);
        assert_eq!(styled.fill, Rgba::rgb(255, 0, 0));
        assert_eq!(styled.family, base.family);
        assert_eq!(styled.size, base.size);
        assert!(StyleDelta::default().is_empty());
        assert!(!StyleDelta::from_style(base).is_empty());
    }
}
