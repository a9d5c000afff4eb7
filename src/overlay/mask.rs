use image::{GrayImage, Luma, RgbaImage};
use kurbo::{Point, RoundedRect, Shape as _};

use crate::foundation::core::Canvas;
use crate::foundation::error::{ReelError, ReelResult};
use crate::foundation::math::mul_div255_u8;

/// Samples per axis for anti-aliased corner pixels.
const SUPERSAMPLE: u32 = 4;

/// Rasterize an 8-bit coverage mask of a rounded rectangle filling `size`.
///
/// The radius is clamped to half the shorter side. Only the four `r x r` corner boxes are
/// supersampled; every other pixel is fully covered.
pub fn rounded_rect_mask(size: Canvas, radius: u32) -> GrayImage {
    let (w, h) = (size.width, size.height);
    let mut mask = GrayImage::from_pixel(w, h, Luma([255u8]));
    let r = radius.min(w / 2).min(h / 2);
    if r == 0 {
        return mask;
    }

    let shape = RoundedRect::new(0.0, 0.0, f64::from(w), f64::from(h), f64::from(r));
    let step = 1.0 / f64::from(SUPERSAMPLE);
    let total = SUPERSAMPLE * SUPERSAMPLE;

    let xs = (0..r).chain(w - r..w);
    for x in xs {
        for y in (0..r).chain(h - r..h) {
            let mut hits = 0u32;
            for sy in 0..SUPERSAMPLE {
                for sx in 0..SUPERSAMPLE {
                    let pt = Point::new(
                        f64::from(x) + (f64::from(sx) + 0.5) * step,
                        f64::from(y) + (f64::from(sy) + 0.5) * step,
                    );
                    if shape.contains(pt) {
                        hits += 1;
                    }
                }
            }
            let coverage = ((hits * 255 + total / 2) / total) as u8;
            mask.put_pixel(x, y, Luma([coverage]));
        }
    }
    mask
}

/// Multiply the straight alpha channel of `img` by `mask`.
pub fn apply_mask(img: &mut RgbaImage, mask: &GrayImage) -> ReelResult<()> {
    if img.dimensions() != mask.dimensions() {
        return Err(ReelError::composition(format!(
            "mask is {:?}, image is {:?}",
            mask.dimensions(),
            img.dimensions()
        )));
    }
    for (px, m) in img.pixels_mut().zip(mask.pixels()) {
        px.0[3] = mul_div255_u8(u16::from(px.0[3]), u16::from(m.0[0]));
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/overlay/mask.rs"]
mod tests;
