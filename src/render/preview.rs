//! Software rasterizer for tile sprites, used for PNG previews of a city view

use std::path::Path;

use glam::Vec2;
use image::{ImageBuffer, Rgba, RgbaImage};

use crate::core::types::Result;
use crate::render::culling::TileSprite;

/// Color behind the tiles
pub const BACKGROUND: [u8; 4] = [12, 14, 20, 255];

/// Color of the selection outline
pub const SELECTION_COLOR: [u8; 4] = [255, 220, 60, 255];

/// Paint sprites onto a fresh `width x height` image, in the given order.
///
/// Pixels are filled when their center lies inside a sprite's diamond, so
/// neighboring diamonds share edges without gaps or double coverage.
pub fn render_sprites<'a>(sprites: impl IntoIterator<Item = &'a TileSprite>, width: u32, height: u32) -> RgbaImage {
    let mut image: RgbaImage = ImageBuffer::from_pixel(width, height, Rgba(BACKGROUND));
    for sprite in sprites {
        fill_diamond(&mut image, sprite);
    }
    image
}

fn fill_diamond(image: &mut RgbaImage, sprite: &TileSprite) {
    let half = sprite.half_extent();
    if !(half.x > 0.0 && half.y > 0.0) {
        return;
    }
    let bounds = sprite.bounds();
    let Some((x0, x1)) = pixel_span(bounds.min.x, bounds.max.x, image.width()) else {
        return;
    };
    let Some((y0, y1)) = pixel_span(bounds.min.y, bounds.max.y, image.height()) else {
        return;
    };

    let center = sprite.center();
    for py in y0..y1 {
        let ny = ((py as f32 + 0.5) - center.y).abs() / half.y;
        for px in x0..x1 {
            let nx = ((px as f32 + 0.5) - center.x).abs() / half.x;
            if nx + ny <= 1.0 {
                image.put_pixel(px, py, Rgba(sprite.fill));
            }
        }
    }
}

/// Pixel index range `[start, end)` covered by `[min, max)`, clipped to `size`
fn pixel_span(min: f32, max: f32, size: u32) -> Option<(u32, u32)> {
    let start = min.floor().max(0.0);
    let end = max.ceil().min(size as f32);
    if !(start < end) {
        return None;
    }
    Some((start as u32, end as u32))
}

/// Draw a closed polygon outline, one pixel wide
pub fn outline_polygon(image: &mut RgbaImage, corners: &[Vec2], color: [u8; 4]) {
    if corners.len() < 2 {
        return;
    }
    for (i, &from) in corners.iter().enumerate() {
        let to = corners[(i + 1) % corners.len()];
        draw_line(image, from, to, color);
    }
}

fn draw_line(image: &mut RgbaImage, from: Vec2, to: Vec2, color: [u8; 4]) {
    if !from.is_finite() || !to.is_finite() {
        return;
    }
    let delta = to - from;
    let steps = delta.x.abs().max(delta.y.abs()).ceil().max(1.0) as u32;
    for step in 0..=steps {
        let p = from + delta * (step as f32 / steps as f32);
        let (x, y) = (p.x.floor(), p.y.floor());
        if x >= 0.0 && y >= 0.0 && (x as u32) < image.width() && (y as u32) < image.height() {
            image.put_pixel(x as u32, y as u32, Rgba(color));
        }
    }
}

/// Write an image as PNG
pub fn save_png(image: &RgbaImage, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    image.save(path)?;
    log::info!("Wrote {}x{} preview to {}", image.width(), image.height(), path.display());
    Ok(())
}
