use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};

pub const CARD_WIDTH: u32 = 1200;
pub const CARD_HEIGHT: u32 = 630;

pub const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// `#RRGGBB` to an opaque color.
pub fn parse_hex(hex: &str) -> Option<Rgba<u8>> {
    let hex = hex.trim().strip_prefix('#')?;
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some(Rgba([channel(0)?, channel(2)?, channel(4)?, 255]))
}

fn lerp(a: u8, b: u8, t: f32) -> u8 {
    (f32::from(a) + (f32::from(b) - f32::from(a)) * t).round() as u8
}

/// Color of a two-stop gradient running from the top-left corner to the
/// bottom-right corner, sampled at the centre of pixel `(x, y)`.
pub fn gradient_color(x: u32, y: u32, width: u32, height: u32, from: Rgba<u8>, to: Rgba<u8>) -> Rgba<u8> {
    let (w, h) = (width as f32, height as f32);
    let (px, py) = (x as f32 + 0.5, y as f32 + 0.5);
    let t = ((px * w + py * h) / (w * w + h * h)).clamp(0.0, 1.0);
    Rgba([
        lerp(from[0], to[0], t),
        lerp(from[1], to[1], t),
        lerp(from[2], to[2], t),
        255,
    ])
}

pub fn fill_diagonal_gradient(img: &mut RgbaImage, from: Rgba<u8>, to: Rgba<u8>) {
    let (w, h) = img.dimensions();
    for (x, y, px) in img.enumerate_pixels_mut() {
        *px = gradient_color(x, y, w, h, from, to);
    }
}

/// Source-over blend of `color` at `alpha` onto an opaque pixel.
pub fn blend(dst: Rgba<u8>, color: Rgba<u8>, alpha: f32) -> Rgba<u8> {
    let a = alpha.clamp(0.0, 1.0);
    let mix = |d: u8, s: u8| (f32::from(s) * a + f32::from(d) * (1.0 - a)).round() as u8;
    Rgba([mix(dst[0], color[0]), mix(dst[1], color[1]), mix(dst[2], color[2]), 255])
}

pub fn blend_at(img: &mut RgbaImage, x: i64, y: i64, color: Rgba<u8>, alpha: f32) {
    if x < 0 || y < 0 || x >= i64::from(img.width()) || y >= i64::from(img.height()) {
        return;
    }
    let px = img.get_pixel_mut(x as u32, y as u32);
    *px = blend(*px, color, alpha);
}

pub fn fill_rect(img: &mut RgbaImage, x: u32, y: u32, w: u32, h: u32, color: Rgba<u8>, alpha: f32) {
    let x_end = x.saturating_add(w).min(img.width());
    let y_end = y.saturating_add(h).min(img.height());
    for yy in y..y_end {
        for xx in x..x_end {
            let px = img.get_pixel_mut(xx, yy);
            *px = blend(*px, color, alpha);
        }
    }
}

/// Draws `src` scaled to `size`×`size` at `(x, y)`, visible only inside the
/// circle at `center` with `radius`. Edges are anti-aliased over one pixel.
pub fn composite_in_circle(
    img: &mut RgbaImage,
    src: &RgbaImage,
    x: u32,
    y: u32,
    size: u32,
    center: (f32, f32),
    radius: f32,
) {
    if size == 0 {
        return;
    }
    let scaled = imageops::resize(src, size, size, FilterType::Triangle);
    for (sx, sy, spx) in scaled.enumerate_pixels() {
        let (tx, ty) = (x + sx, y + sy);
        let dx = tx as f32 + 0.5 - center.0;
        let dy = ty as f32 + 0.5 - center.1;
        let coverage = (radius + 0.5 - (dx * dx + dy * dy).sqrt()).clamp(0.0, 1.0);
        if coverage <= 0.0 {
            continue;
        }
        let alpha = coverage * f32::from(spx[3]) / 255.0;
        blend_at(img, i64::from(tx), i64::from(ty), *spx, alpha);
    }
}
