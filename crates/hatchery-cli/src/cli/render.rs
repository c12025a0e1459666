//! PNG previews of exported SVG documents.
//!
//! The SVG is rasterized with resvg exactly as written, so the preview shows
//! what the plotter file contains.

use std::path::Path;

use anyhow::{Context, Result};
use image::RgbaImage;
use resvg::usvg;
use tiny_skia::{Pixmap, Transform};

/// Longest edge of the preview image, in pixels.
pub const PREVIEW_MAX_EDGE: u32 = 1200;

/// Rasterize `svg` to an RGBA image, scaled so it fits `max_edge` pixels.
pub fn rasterize(svg: &str, max_edge: u32) -> Result<RgbaImage> {
    let options = usvg::Options::default();
    let tree = usvg::Tree::from_str(svg, &options).context("failed to parse generated SVG")?;

    let size = tree.size();
    let scale = (max_edge as f32 / size.width().max(size.height())).min(1.0);
    let width = ((size.width() * scale).ceil() as u32).max(1);
    let height = ((size.height() * scale).ceil() as u32).max(1);

    let mut pixmap = Pixmap::new(width, height)
        .with_context(|| format!("failed to create {}x{} pixmap", width, height))?;

    resvg::render(&tree, Transform::from_scale(scale, scale), &mut pixmap.as_mut());

    RgbaImage::from_raw(width, height, pixmap.take())
        .context("pixmap size does not match image buffer")
}

/// Write a PNG preview next to the SVG output.
pub fn write_preview(svg: &str, path: &Path) -> Result<()> {
    let image = rasterize(svg, PREVIEW_MAX_EDGE)?;
    image
        .save(path)
        .with_context(|| format!("failed to write preview {}", path.display()))?;
    eprintln!("Preview: {} ({}x{})", path.display(), image.width(), image.height());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preview_fits_max_edge() {
        let svg = r#"<svg xmlns="http://www.w3.org/2000/svg" width="1200" height="1800">
            <rect width="1200" height="1800" fill="white"/>
            <line x1="0" y1="900" x2="1200" y2="900" stroke="black" stroke-width="20"/>
        </svg>"#;
        let image = rasterize(svg, 300).unwrap();

        assert_eq!(image.height(), 300);
        assert_eq!(image.width(), 200);
        // White background, black stroke through the middle
        assert_eq!(image.get_pixel(100, 10).0, [255, 255, 255, 255]);
        assert_eq!(image.get_pixel(100, 150).0[0], 0);
    }

    #[test]
    fn small_documents_are_not_upscaled() {
        let svg = r#"<svg xmlns="http://www.w3.org/2000/svg" width="40" height="20"/>"#;
        let image = rasterize(svg, 300).unwrap();
        assert_eq!((image.width(), image.height()), (40, 20));
    }

    #[test]
    fn invalid_svg_is_an_error() {
        assert!(rasterize("not svg", 100).is_err());
    }
}
