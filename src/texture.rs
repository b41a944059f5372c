//! Image loading for the baked and soft-shadow textures.

use std::path::Path;

use log::{info, warn};

/// Decoded RGBA8 pixels ready for GPU upload.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureData {
    pub label: String,
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl TextureData {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, TextureError> {
        let path = path.as_ref();
        let image = image::open(path).map_err(|source| TextureError::Decode {
            label: path.display().to_string(),
            source,
        })?;
        let rgba = image.to_rgba8();
        let (width, height) = rgba.dimensions();
        info!("Loaded texture {width}x{height} from {}", path.display());
        Ok(Self {
            label: path.display().to_string(),
            width,
            height,
            pixels: rgba.into_raw(),
        })
    }

    pub fn from_bytes(label: impl Into<String>, bytes: &[u8]) -> Result<Self, TextureError> {
        let label = label.into();
        let image = image::load_from_memory(bytes).map_err(|source| TextureError::Decode {
            label: label.clone(),
            source,
        })?;
        let rgba = image.to_rgba8();
        let (width, height) = rgba.dimensions();
        Ok(Self {
            label,
            width,
            height,
            pixels: rgba.into_raw(),
        })
    }

    /// Single opaque white texel, used when an image is missing.
    pub fn white(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            width: 1,
            height: 1,
            pixels: vec![255; 4],
        }
    }

    /// Loads `path`, logging and falling back to [`TextureData::white`] on failure.
    pub fn load_or_white(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::from_file(path) {
            Ok(texture) => texture,
            Err(err) => {
                warn!("{err}; using a blank texture instead");
                Self::white(path.display().to_string())
            }
        }
    }
}

/// The two images the scene samples.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneTextures {
    /// Color map with a pre-rendered shadow, sampled as sRGB.
    pub baked_shadow: TextureData,
    /// Radial falloff used as the fake shadow's alpha map (green channel).
    pub simple_shadow: TextureData,
}

impl SceneTextures {
    pub fn load(baked_shadow: impl AsRef<Path>, simple_shadow: impl AsRef<Path>) -> Self {
        Self {
            baked_shadow: TextureData::load_or_white(baked_shadow),
            simple_shadow: TextureData::load_or_white(simple_shadow),
        }
    }

    pub fn blank() -> Self {
        Self {
            baked_shadow: TextureData::white("baked-shadow"),
            simple_shadow: TextureData::white("simple-shadow"),
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum TextureError {
    #[error("failed to load texture {label}: {source}")]
    Decode {
        label: String,
        #[source]
        source: image::ImageError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgba, RgbaImage};
    use std::io::Cursor;

    fn png_fixture() -> Vec<u8> {
        let mut image = RgbaImage::new(2, 1);
        image.put_pixel(0, 0, Rgba([0, 0, 0, 255]));
        image.put_pixel(1, 0, Rgba([10, 200, 30, 255]));
        let mut bytes = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn decodes_png_bytes_to_rgba() {
        let texture = TextureData::from_bytes("fixture", &png_fixture()).unwrap();
        assert_eq!((texture.width, texture.height), (2, 1));
        assert_eq!(&texture.pixels[4..8], &[10, 200, 30, 255]);
    }

    #[test]
    fn missing_file_falls_back_to_white() {
        let dir = tempfile::tempdir().unwrap();
        let texture = TextureData::load_or_white(dir.path().join("nope.jpg"));
        assert_eq!((texture.width, texture.height), (1, 1));
        assert_eq!(texture.pixels, vec![255; 4]);
    }

    #[test]
    fn garbage_bytes_are_an_error() {
        assert!(TextureData::from_bytes("junk", b"not an image").is_err());
    }
}
