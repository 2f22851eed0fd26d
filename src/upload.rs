//! Decoding of user-uploaded images
//!
//! Decoding is the only potentially slow step of the editor. The async entry
//! point moves it onto tokio's blocking pool so the UI loop stays responsive.

use std::sync::Arc;

use image::RgbaImage;

use crate::domain::{Size, canvas};
use crate::error::DesignError;

/// An uploaded image ready to be inserted into the scene
#[derive(Clone, Debug)]
pub struct DecodedImage {
    pub rgba: Arc<RgbaImage>,
}

impl DecodedImage {
    /// Get the width of the image
    pub fn width(&self) -> u32 {
        self.rgba.width()
    }

    /// Get the height of the image
    pub fn height(&self) -> u32 {
        self.rgba.height()
    }

    pub fn natural_size(&self) -> Size {
        Size::new(self.width() as f32, self.height() as f32)
    }

    /// Uniform scale that fits the image into the insertion box
    pub fn fit_scale(&self) -> f32 {
        fit_scale(self.natural_size(), canvas::IMAGE_FIT_SIZE)
    }
}

/// Scale that makes the longer side exactly `max_dimension`
///
/// Small images are scaled up; this is fit-to-box, not shrink-only.
pub fn fit_scale(natural: Size, max_dimension: f32) -> f32 {
    (max_dimension / natural.width.max(1.0)).min(max_dimension / natural.height.max(1.0))
}

/// Decode uploaded bytes into an RGBA bitmap
pub fn decode_image(bytes: &[u8]) -> Result<DecodedImage, DesignError> {
    let format = image::guess_format(bytes)?;
    let decoded = image::load_from_memory_with_format(bytes, format)?;
    if decoded.width() == 0 || decoded.height() == 0 {
        return Err(DesignError::Decode("image has no pixels".to_string()));
    }
    let rgba = decoded.to_rgba8();
    log::debug!(
        "Decoded {:?} upload: {}x{} pixels",
        format,
        rgba.width(),
        rgba.height()
    );
    Ok(DecodedImage {
        rgba: Arc::new(rgba),
    })
}

/// Decode on the blocking pool; resolves exactly once with the result
pub async fn decode_image_async(bytes: Vec<u8>) -> Result<DecodedImage, DesignError> {
    tokio::task::spawn_blocking(move || decode_image(&bytes))
        .await
        .map_err(|err| DesignError::Decode(format!("decode task failed: {err}")))?
}
