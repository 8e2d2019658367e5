use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use eframe::egui::{self, Vec2, vec2};
use tracing::{debug, warn};

use crate::layout::TextMeasure;

/// Textures for deck images, loaded on first use and kept for the session.
/// Failed loads are remembered too, so a missing file is reported once.
pub struct ImageCache {
    base_path: PathBuf,
    textures: RefCell<HashMap<String, Option<egui::TextureHandle>>>,
    sizes: RefCell<HashMap<String, Option<Vec2>>>,
}

impl ImageCache {
    pub fn new(base_path: PathBuf) -> Self {
        Self {
            base_path,
            textures: RefCell::new(HashMap::new()),
            sizes: RefCell::new(HashMap::new()),
        }
    }

    /// Image paths are relative to the deck file unless absolute.
    pub fn resolve(&self, path: &str) -> PathBuf {
        let p = Path::new(path);
        if p.is_absolute() {
            p.to_path_buf()
        } else {
            self.base_path.join(p)
        }
    }

    pub fn get_or_load(&self, ctx: &egui::Context, path: &str) -> Option<egui::TextureHandle> {
        if let Some(entry) = self.textures.borrow().get(path) {
            return entry.clone();
        }

        let resolved = self.resolve(path);
        let texture = match load_color_image(&resolved) {
            Ok(image) => {
                debug!(path = %resolved.display(), "loaded image");
                Some(ctx.load_texture(path, image, egui::TextureOptions::LINEAR))
            }
            Err(e) => {
                warn!(path = %resolved.display(), error = %e, "image unavailable, drawing placeholder");
                None
            }
        };
        self.textures
            .borrow_mut()
            .insert(path.to_string(), texture.clone());
        texture
    }

    /// Pixel dimensions read from the file header, without decoding it.
    pub fn natural_size(&self, path: &str) -> Option<Vec2> {
        if let Some(size) = self.sizes.borrow().get(path) {
            return *size;
        }
        let size = image::image_dimensions(self.resolve(path))
            .ok()
            .map(|(w, h)| vec2(w as f32, h as f32));
        self.sizes.borrow_mut().insert(path.to_string(), size);
        size
    }

    pub fn len(&self) -> usize {
        self.textures.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.borrow().is_empty()
    }
}

/// Text metrics from `text`, image sizes from the deck's files.
pub struct WithImages<'a> {
    text: &'a dyn TextMeasure,
    images: &'a ImageCache,
}

impl<'a> WithImages<'a> {
    pub fn new(text: &'a dyn TextMeasure, images: &'a ImageCache) -> Self {
        Self { text, images }
    }
}

impl TextMeasure for WithImages<'_> {
    fn measure_text(&self, text: &str, size: f32, bold: bool, wrap_width: f32) -> Vec2 {
        self.text.measure_text(text, size, bold, wrap_width)
    }

    fn image_size(&self, path: &str) -> Option<Vec2> {
        self.images.natural_size(path)
    }
}

pub fn load_color_image(path: &Path) -> Result<egui::ColorImage, image::ImageError> {
    let rgba = image::open(path)?.into_rgba8();
    let size = [rgba.width() as usize, rgba.height() as usize];
    Ok(egui::ColorImage::from_rgba_unmultiplied(
        size,
        rgba.as_flat_samples().as_slice(),
    ))
}
