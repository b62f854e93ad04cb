//! Image decoding with a path-keyed cache.

use std::path::PathBuf;
use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::action::RgbaSurface;
use crate::error::EngineError;

/// Decoded images keyed by path. Repeated `^img{}` references across
/// re-evaluations hit the cache instead of the filesystem.
#[derive(Default)]
pub struct ImageCache {
    entries: FxHashMap<PathBuf, Arc<RgbaSurface>>,
}

impl ImageCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a PNG or JPEG, decoding at most once per path.
    pub fn load(&mut self, path: &str) -> Result<Arc<RgbaSurface>, EngineError> {
        barre_markup::image_kind(path)?;
        let key = PathBuf::from(path);
        if let Some(surface) = self.entries.get(&key) {
            return Ok(Arc::clone(surface));
        }
        let decoded = image::open(&key)
            .map_err(|source| EngineError::Image {
                path: key.clone(),
                source,
            })?
            .to_rgba8();
        let surface = Arc::new(RgbaSurface {
            width: decoded.width(),
            height: decoded.height(),
            pixels: decoded.into_raw(),
        });
        self.entries.insert(key, Arc::clone(&surface));
        Ok(surface)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_and_cache() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dot.png");
        let img = image::RgbaImage::from_pixel(2, 3, image::Rgba([255, 0, 0, 255]));
        img.save(&path).unwrap();

        let mut cache = ImageCache::new();
        let path_str = path.to_str().unwrap();
        let first = cache.load(path_str).unwrap();
        assert_eq!((first.width, first.height), (2, 3));
        assert_eq!(&first.pixels[..4], &[255, 0, 0, 255]);

        let second = cache.load(path_str).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_rejects_extension() {
        let mut cache = ImageCache::new();
        assert!(matches!(
            cache.load("vector.svg"),
            Err(EngineError::Markup(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        let mut cache = ImageCache::new();
        assert!(matches!(
            cache.load("/no/such/file.png"),
            Err(EngineError::Image { .. })
        ));
    }
}
