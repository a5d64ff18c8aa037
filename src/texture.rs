use std::path::Path;

use glium::texture::{MipmapsOption, RawImage2d, Texture2d};
use glium::uniforms::{MagnifySamplerFilter, MinifySamplerFilter, SamplerBehavior, SamplerWrapFunction};
use glium::Display;
use log::{debug, info};

use crate::error::ResourceError;

/// Decodes an image file and uploads it as an RGBA texture with mipmaps.
pub fn load_texture<P: AsRef<Path>>(display: &Display, path: P) -> Result<Texture2d, ResourceError> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|source| ResourceError::FileAccess {
        path: path.to_path_buf(),
        source,
    })?;
    let image = image::load_from_memory(&bytes)
        .map_err(|source| ResourceError::ImageDecode {
            path: path.to_path_buf(),
            source,
        })?
        .to_rgba8();
    let dimensions = image.dimensions();
    info!("loaded texture {} ({}x{})", path.display(), dimensions.0, dimensions.1);
    texture_from_rgba(display, image.into_raw(), dimensions)
}

/// Uploads tightly packed RGBA8 rows, top row first.
pub fn texture_from_rgba(display: &Display, pixels: Vec<u8>, dimensions: (u32, u32)) -> Result<Texture2d, ResourceError> {
    // GL expects the bottom row first
    let raw = RawImage2d::from_raw_rgba_reversed(&pixels, dimensions);
    let texture = Texture2d::with_mipmaps(display, raw, MipmapsOption::AutoGeneratedMipmaps)?;
    debug!("uploaded {}x{} texture", dimensions.0, dimensions.1);
    Ok(texture)
}

/// Expands 1, 2 or 3 channel 8-bit pixels to RGBA8. Other channel counts yield `None`.
pub fn expand_to_rgba(pixels: &[u8], channels: usize) -> Option<Vec<u8>> {
    match channels {
        4 => Some(pixels.to_vec()),
        3 => Some(
            pixels
                .chunks_exact(3)
                .flat_map(|p| [p[0], p[1], p[2], 255])
                .collect(),
        ),
        2 => Some(
            pixels
                .chunks_exact(2)
                .flat_map(|p| [p[0], p[0], p[0], p[1]])
                .collect(),
        ),
        1 => Some(pixels.iter().flat_map(|&l| [l, l, l, 255]).collect()),
        _ => None,
    }
}

/// Trilinear filtering with repeat wrapping.
pub fn sampler_behavior() -> SamplerBehavior {
    SamplerBehavior {
        minify_filter: MinifySamplerFilter::LinearMipmapLinear,
        magnify_filter: MagnifySamplerFilter::Linear,
        wrap_function: (
            SamplerWrapFunction::Repeat,
            SamplerWrapFunction::Repeat,
            SamplerWrapFunction::Repeat,
        ),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rgb_gets_opaque_alpha() {
        let rgba = expand_to_rgba(&[1, 2, 3, 4, 5, 6], 3).unwrap();
        assert_eq!(rgba, vec![1, 2, 3, 255, 4, 5, 6, 255]);
    }

    #[test]
    fn luma_alpha_is_spread_to_rgb() {
        assert_eq!(expand_to_rgba(&[9, 100], 2).unwrap(), vec![9, 9, 9, 100]);
        assert_eq!(expand_to_rgba(&[7], 1).unwrap(), vec![7, 7, 7, 255]);
    }

    #[test]
    fn unsupported_channel_count() {
        assert!(expand_to_rgba(&[0; 10], 5).is_none());
    }

    #[test]
    fn sampler_repeats_and_uses_mipmaps() {
        let sampler = sampler_behavior();
        assert_eq!(sampler.minify_filter, MinifySamplerFilter::LinearMipmapLinear);
        assert_eq!(sampler.wrap_function.0, SamplerWrapFunction::Repeat);
    }
}
