//! Texture lookup by logical name.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Decoded RGBA8 image data.
#[derive(Clone, Debug)]
pub struct SkyTexture {
    pub name: String,
    pub width: u32,
    pub height: u32,
    /// Tightly packed RGBA8 rows.
    pub rgba: Vec<u8>,
}

/// Errors returned when resolving a texture.
#[derive(Debug, Error)]
pub enum TextureError {
    #[error("texture {name:?} not found in {searched:?}")]
    NotFound { name: String, searched: Vec<PathBuf> },

    #[error("failed to decode texture {path:?}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// Resolves logical texture names to pixel data.
pub trait TextureSource {
    fn load(&self, name: &str) -> Result<SkyTexture, TextureError>;
}

/// Searches a list of directories in order and decodes the first match.
#[derive(Clone, Debug, Default)]
pub struct FileTextureSource {
    search_paths: Vec<PathBuf>,
}

impl FileTextureSource {
    pub fn new(search_paths: impl IntoIterator<Item = PathBuf>) -> Self {
        Self {
            search_paths: search_paths.into_iter().collect(),
        }
    }

    pub fn search_paths(&self) -> &[PathBuf] {
        &self.search_paths
    }

    /// The first existing candidate for `name`. Absolute names are used as-is.
    pub fn resolve(&self, name: &str) -> Option<PathBuf> {
        let direct = Path::new(name);
        if direct.is_absolute() {
            return direct.is_file().then(|| direct.to_path_buf());
        }
        self.search_paths
            .iter()
            .map(|dir| dir.join(name))
            .find(|candidate| candidate.is_file())
    }
}

impl TextureSource for FileTextureSource {
    fn load(&self, name: &str) -> Result<SkyTexture, TextureError> {
        let path = self.resolve(name).ok_or_else(|| TextureError::NotFound {
            name: name.to_string(),
            searched: self.search_paths.clone(),
        })?;

        let img = image::open(&path)
            .map_err(|source| TextureError::Decode {
                path: path.clone(),
                source,
            })?
            .to_rgba8();

        log::debug!(
            "Loaded texture {name} ({}x{}) from {}",
            img.width(),
            img.height(),
            path.display()
        );

        Ok(SkyTexture {
            name: name.to_string(),
            width: img.width(),
            height: img.height(),
            rgba: img.into_raw(),
        })
    }
}

/// A source with nothing in it. Useful for headless hosts.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoTextures;

impl TextureSource for NoTextures {
    fn load(&self, name: &str) -> Result<SkyTexture, TextureError> {
        Err(TextureError::NotFound {
            name: name.to_string(),
            searched: Vec::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_png(dir: &Path, name: &str, w: u32, h: u32) {
        let img = image::RgbaImage::from_pixel(w, h, image::Rgba([10, 20, 30, 255]));
        img.save(dir.join(name)).unwrap();
    }

    #[test]
    fn test_loads_from_first_matching_path() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        write_png(second.path(), "moon.png", 4, 2);

        let source = FileTextureSource::new([
            first.path().to_path_buf(),
            second.path().to_path_buf(),
        ]);
        let tex = source.load("moon.png").unwrap();
        assert_eq!((tex.width, tex.height), (4, 2));
        assert_eq!(tex.rgba.len(), 4 * 2 * 4);
        assert_eq!(&tex.rgba[..4], &[10, 20, 30, 255]);
    }

    #[test]
    fn test_missing_texture_reports_search_paths() {
        let dir = tempfile::tempdir().unwrap();
        let source = FileTextureSource::new([dir.path().to_path_buf()]);
        match source.load("absent.jpg") {
            Err(TextureError::NotFound { name, searched }) => {
                assert_eq!(name, "absent.jpg");
                assert_eq!(searched, vec![dir.path().to_path_buf()]);
            }
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[test]
    fn test_undecodable_file_is_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("junk.png"), b"not an image").unwrap();
        let source = FileTextureSource::new([dir.path().to_path_buf()]);
        assert!(matches!(
            source.load("junk.png"),
            Err(TextureError::Decode { .. })
        ));
    }

    #[test]
    fn test_no_textures_always_misses() {
        assert!(NoTextures.load("moon_1024x512.jpg").is_err());
    }
}
