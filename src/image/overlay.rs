use crate::Result;
use ab_glyph::{FontVec, PxScale};
use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use imageproc::drawing::{draw_text_mut, text_size};
use std::fs;
use std::io::Cursor;
use std::path::PathBuf;
use tracing::warn;

/// Candidate fonts for the phone-number text, checked in order.
const FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

const OUTLINE_STROKE: i32 = 2;

/// Branding overlay for a generated image: a logo in the bottom-right corner
/// and a phone number in the bottom band.
pub struct BrandOverlay {
    logo_path: Option<PathBuf>,
    phone_number: Option<String>,
}

impl BrandOverlay {
    pub fn new(logo_path: Option<PathBuf>, phone_number: Option<String>) -> Self {
        Self {
            logo_path,
            phone_number,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.logo_path.is_none() && self.phone_number.is_none()
    }

    /// Composite the overlay onto `image_data` and re-encode as RGB PNG.
    ///
    /// An unreadable logo file skips the logo rather than failing the whole
    /// request; the phone number still lands.
    pub fn apply(&self, image_data: &[u8]) -> Result<Vec<u8>> {
        let mut img = image::load_from_memory(image_data)?.to_rgba8();
        let (width, _height) = img.dimensions();
        let margin = ((width as f32 * 0.01) as i64).max(10);

        let mut logo_left = None;
        if let Some(path) = &self.logo_path {
            match image::open(path) {
                Ok(logo) => logo_left = Some(draw_logo(&mut img, &logo, margin)),
                Err(e) => {
                    warn!("Logo not readable at {}, skipping: {}", path.display(), e);
                }
            }
        }

        if let Some(phone) = self.phone_number.as_deref() {
            draw_phone_number(&mut img, phone, margin, logo_left);
        }

        let mut out = Vec::new();
        let rgb = DynamicImage::ImageRgba8(img).to_rgb8();
        rgb.write_to(&mut Cursor::new(&mut out), ImageFormat::Png)?;
        Ok(out)
    }
}

/// Scale the logo to 10% of the image height (at least 40px) and composite it
/// at the bottom-right corner. Returns the logo's left edge for text layout.
fn draw_logo(img: &mut RgbaImage, logo: &DynamicImage, margin: i64) -> i64 {
    let (width, height) = img.dimensions();
    let logo = logo.to_rgba8();

    let new_h = ((height as f32 * 0.10) as u32).max(40);
    let ratio = logo.width() as f32 / logo.height().max(1) as f32;
    let new_w = ((new_h as f32 * ratio) as u32).max(1);
    let logo = imageops::resize(&logo, new_w, new_h, FilterType::Lanczos3);

    let x = width as i64 - new_w as i64 - margin;
    let y = height as i64 - new_h as i64 - margin;
    imageops::overlay(img, &logo, x, y);
    x
}

/// Render the phone number in the bottom band, left of the logo when one was
/// drawn, over a semi-transparent backdrop for readability.
fn draw_phone_number(img: &mut RgbaImage, phone: &str, margin: i64, logo_left: Option<i64>) {
    let height = img.height();
    let size = (height as f32 * 0.035).max(28.0);
    let scale = PxScale::from(size);
    let font = load_font();

    let (text_w, text_h) = match &font {
        Some(font) => text_size(scale, font, phone),
        // Rough advance-width estimate keeps the backdrop band sized sanely.
        None => ((size * 0.6) as u32 * phone.len() as u32, size as u32),
    };

    let x = match logo_left {
        Some(left) => (left - text_w as i64 - margin).max(margin),
        None => margin,
    };
    let y = height as i64 - text_h as i64 - margin;

    let pad = (text_h as f32 * 0.35) as i64;
    let backdrop = RgbaImage::from_pixel(
        text_w + 2 * pad as u32,
        text_h + 2 * pad as u32,
        Rgba([0, 0, 0, 120]),
    );
    imageops::overlay(img, &backdrop, x - pad, y - pad);

    match &font {
        Some(font) => {
            for dx in [-OUTLINE_STROKE, 0, OUTLINE_STROKE] {
                for dy in [-OUTLINE_STROKE, 0, OUTLINE_STROKE] {
                    if dx == 0 && dy == 0 {
                        continue;
                    }
                    draw_text_mut(
                        img,
                        Rgba([0, 0, 0, 255]),
                        x as i32 + dx,
                        y as i32 + dy,
                        scale,
                        font,
                        phone,
                    );
                }
            }
            draw_text_mut(
                img,
                Rgba([255, 255, 255, 255]),
                x as i32,
                y as i32,
                scale,
                font,
                phone,
            );
        }
        None => warn!("No usable font found, phone number rendered as backdrop band only"),
    }
}

fn load_font() -> Option<FontVec> {
    for candidate in FONT_CANDIDATES {
        if let Ok(bytes) = fs::read(candidate) {
            match FontVec::try_from_vec(bytes) {
                Ok(font) => return Some(font),
                Err(e) => warn!("Ignoring invalid font at {}: {}", candidate, e),
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;

    fn encode_png(img: &RgbImage) -> Vec<u8> {
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    fn white_base(width: u32, height: u32) -> Vec<u8> {
        encode_png(&RgbImage::from_pixel(
            width,
            height,
            image::Rgb([255, 255, 255]),
        ))
    }

    #[test]
    fn test_empty_overlay_reports_empty() {
        assert!(BrandOverlay::new(None, None).is_empty());
        assert!(!BrandOverlay::new(None, Some("0909 123 456".to_string())).is_empty());
    }

    #[test]
    fn test_phone_number_changes_pixels() {
        let base = white_base(400, 400);
        let overlay = BrandOverlay::new(None, Some("0909 123 456".to_string()));

        let branded = overlay.apply(&base).unwrap();

        let before = image::load_from_memory(&base).unwrap().to_rgb8();
        let after = image::load_from_memory(&branded).unwrap().to_rgb8();
        assert_eq!(before.dimensions(), after.dimensions());
        assert_ne!(before.as_raw(), after.as_raw());
    }

    #[test]
    fn test_missing_logo_is_skipped_without_error() {
        let base = white_base(200, 200);
        let overlay = BrandOverlay::new(Some(PathBuf::from("/nonexistent/logo.png")), None);

        let result = overlay.apply(&base).unwrap();

        let before = image::load_from_memory(&base).unwrap().to_rgb8();
        let after = image::load_from_memory(&result).unwrap().to_rgb8();
        assert_eq!(before.as_raw(), after.as_raw());
    }

    #[test]
    fn test_logo_lands_in_bottom_right_corner() {
        let dir = tempfile::tempdir().unwrap();
        let logo_path = dir.path().join("logo.png");
        let logo = RgbImage::from_pixel(50, 50, image::Rgb([255, 0, 0]));
        logo.save(&logo_path).unwrap();

        let base = white_base(200, 200);
        let overlay = BrandOverlay::new(Some(logo_path), None);
        let branded = overlay.apply(&base).unwrap();
        let after = image::load_from_memory(&branded).unwrap().to_rgb8();

        // Square logo scaled to 40px with a 10px margin sits at (150, 150).
        let pixel = after.get_pixel(170, 170);
        assert_eq!(pixel.0, [255, 0, 0]);
        // The far corner inside the margin stays untouched.
        let corner = after.get_pixel(195, 195);
        assert_eq!(corner.0, [255, 255, 255]);
    }

    #[test]
    fn test_phone_sits_left_of_logo() {
        let dir = tempfile::tempdir().unwrap();
        let logo_path = dir.path().join("logo.png");
        let logo = RgbImage::from_pixel(50, 50, image::Rgb([0, 0, 255]));
        logo.save(&logo_path).unwrap();

        let base = white_base(800, 800);
        let overlay = BrandOverlay::new(Some(logo_path), Some("0909 123 456".to_string()));
        let branded = overlay.apply(&base).unwrap();
        let after = image::load_from_memory(&branded).unwrap().to_rgb8();

        // Logo scaled to 80px with margin 10 occupies x in [710, 790); the
        // backdrop band must darken pixels strictly left of it.
        let mut darkened_left_of_logo = false;
        for x in 0..710u32 {
            let pixel = after.get_pixel(x, 770);
            if pixel.0 != [255, 255, 255] {
                darkened_left_of_logo = true;
                break;
            }
        }
        assert!(darkened_left_of_logo);
    }

    #[test]
    fn test_garbage_input_is_an_error() {
        let overlay = BrandOverlay::new(None, Some("0909".to_string()));
        assert!(overlay.apply(b"not an image").is_err());
    }
}
