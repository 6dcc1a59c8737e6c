use std::path::Path;

use image::RgbImage;
use thiserror::Error;

use super::math::Vec3;

#[derive(Error, Debug)]
pub enum TextureError {
    #[error("cannot load texture {path}: {source}")]
    Load {
        path: String,
        #[source]
        source: image::ImageError,
    },

    #[error("texture {0} has no pixels")]
    Empty(String),
}

/// Maps normalized `(u, v)` coordinates to a color.
pub trait TextureSampler: Sync {
    fn color_at(&self, u: f64, v: f64) -> Vec3;
}

/// A texture with the same color everywhere.
#[cfg(test)]
pub struct SolidTexture(pub Vec3);

#[cfg(test)]
impl TextureSampler for SolidTexture {
    fn color_at(&self, _u: f64, _v: f64) -> Vec3 {
        self.0
    }
}

/// An image sampled with nearest texel lookup, `v = 0` is the bottom row.
pub struct ImageTexture {
    image: RgbImage,
}

impl ImageTexture {
    pub fn open(path: impl AsRef<Path>) -> Result<ImageTexture, TextureError> {
        let path = path.as_ref();
        let image = image::open(path)
            .map_err(|source| TextureError::Load {
                path: path.display().to_string(),
                source,
            })?
            .to_rgb8();
        if image.width() == 0 || image.height() == 0 {
            return Err(TextureError::Empty(path.display().to_string()));
        }
        log::debug!(
            "loaded texture {} ({}x{})",
            path.display(),
            image.width(),
            image.height()
        );
        Ok(ImageTexture::from_image(image))
    }

    pub fn from_image(image: RgbImage) -> ImageTexture {
        ImageTexture { image }
    }
}

impl TextureSampler for ImageTexture {
    fn color_at(&self, u: f64, v: f64) -> Vec3 {
        let (width, height) = self.image.dimensions();
        if width == 0 || height == 0 {
            return Vec3::zero();
        }
        let x = ((u.clamp(0.0, 1.0) * width as f64) as u32).min(width - 1);
        let row = ((v.clamp(0.0, 1.0) * height as f64) as u32).min(height - 1);
        let pixel = self.image.get_pixel(x, height - 1 - row);
        Vec3::new(
            pixel[0] as f64 / 255.0,
            pixel[1] as f64 / 255.0,
            pixel[2] as f64 / 255.0,
        )
    }
}
