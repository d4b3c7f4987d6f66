// texture.rs: background image loading for the panorama sphere

use image::io::Reader as ImageReader;
use image::{GenericImageView, RgbaImage};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use std::thread;

/// Opaque colour used when the background image cannot be loaded (#1a1a2e).
pub const FALLBACK_COLOR: [u8; 4] = [0x1a, 0x1a, 0x2e, 0xff];

/// Completion signal of a background request. Exactly one is sent per request.
#[derive(Debug)]
pub enum TextureOutcome {
    Loaded(RgbaImage),
    Failed(String),
}

/// What the renderer paints on the inside of the sphere.
#[derive(Debug, Clone, PartialEq)]
pub enum SphereSurface {
    Texture(RgbaImage),
    Color([u8; 4]),
}

impl SphereSurface {
    pub fn from_outcome(outcome: TextureOutcome) -> Self {
        match outcome {
            TextureOutcome::Loaded(img) => SphereSurface::Texture(img),
            TextureOutcome::Failed(reason) => {
                log::warn!("background image unavailable ({reason}), using fallback colour");
                SphereSurface::Color(FALLBACK_COLOR)
            }
        }
    }

    /// Pixel data ready for upload: the image itself, or a 1x1 swatch.
    pub fn to_rgba(&self) -> RgbaImage {
        match self {
            SphereSurface::Texture(img) => img.clone(),
            SphereSurface::Color(c) => RgbaImage::from_pixel(1, 1, image::Rgba(*c)),
        }
    }
}

pub fn decode_file(path: &Path) -> Result<RgbaImage, String> {
    let file = File::open(path).map_err(|e| crate::i18n::tr_with("error.open_file", &[("err", e.to_string())]))?;

    let img = ImageReader::new(BufReader::new(file))
        .with_guessed_format()
        .map_err(image::ImageError::IoError)
        .and_then(|mut r| {
            r.no_limits();
            r.decode()
        })
        .map_err(|e| crate::i18n::tr_with("error.decode_image", &[("err", e.to_string())]))?;

    let (w, h) = img.dimensions();
    log::info!(
        "{}",
        crate::i18n::tr_with("log.image_loaded_size", &[("w", w.to_string()), ("h", h.to_string())])
    );
    Ok(img.to_rgba8())
}

/// Picture shown in the product dialog.
#[derive(Debug, Clone, PartialEq)]
pub enum ProductImage {
    Loaded(RgbaImage),
    /// Nothing usable on disk; the dialog paints a tile with this caption.
    Placeholder(String),
}

/// Decodes the product picture, or falls back to a placeholder captioned
/// with the product name when there is no path or it does not decode.
pub fn resolve_product_image(path: Option<&Path>, name: &str) -> ProductImage {
    let Some(path) = path else {
        return ProductImage::Placeholder(name.to_string());
    };
    match decode_file(path) {
        Ok(img) => ProductImage::Loaded(img),
        Err(reason) => {
            log::debug!("product image {} unavailable: {reason}", path.display());
            ProductImage::Placeholder(name.to_string())
        }
    }
}

/// Fire-and-forget load on a worker thread. No retry, no cancellation.
pub fn request_background(path: PathBuf, tx: Sender<TextureOutcome>) {
    thread::spawn(move || {
        log::info!(
            "{}",
            crate::i18n::tr_with("log.loading_image_bg", &[("path", format!("{:?}", path))])
        );

        let outcome = match decode_file(&path) {
            Ok(rgba) => TextureOutcome::Loaded(rgba),
            Err(reason) => TextureOutcome::Failed(reason),
        };

        if tx.send(outcome).is_err() {
            log::error!("{}", crate::i18n::tr("error.send_to_main_failed"));
        }
    });
}
