//! Layered floor-mat designer
//!
//! A fixed 500x350 canvas with a rounded mat and an inner border line, onto
//! which text labels and uploaded images are placed, selected, restyled and
//! moved, scaled or rotated. Every committed change is rendered and pushed
//! to a consumer as a PNG snapshot.

pub mod config;
pub mod domain;
pub mod error;
pub mod export;
pub mod render;
pub mod scene;
pub mod session;
pub mod upload;
pub mod widget;

pub use config::{BackingColor, DesignerConfig};
pub use domain::{
    FontFamily, FontSize, Layer, LayerContent, LayerId, LayerKind, Point, Rgba, Selection,
    StyleDelta, TextStyle, Transform,
};
pub use error::DesignError;
pub use export::RasterSnapshot;
pub use render::FontBook;
pub use session::{DesignMsg, Designer, PointerEvent, handle_design_msg};
pub use upload::{DecodedImage, decode_image, decode_image_async};
