use std::path::{Path, PathBuf};

use image::RgbaImage;
use image::imageops::FilterType;

use crate::foundation::core::Canvas;
use crate::foundation::error::{ReelError, ReelResult};
use crate::foundation::math::premultiply_rgba8_in_place;
use crate::overlay::mask::{apply_mask, rounded_rect_mask};
use crate::timeline::Segment;

/// Premultiplied RGBA8 pixels ready to be composited.
#[derive(Clone, Debug)]
pub struct PremulImage {
    pub size: Canvas,
    pub data: Vec<u8>,
}

/// One timed overlay: a segment's screenshot with rounded corners, scaled for the frame.
#[derive(Clone, Debug)]
pub struct OverlayClip {
    pub segment_id: String,
    /// Masked image at its native size, as written to the working directory.
    pub masked_image_path: PathBuf,
    pub duration_secs: f64,
    pub corner_radius: u32,
    pub target_width: u32,
    pub raster: PremulImage,
}

/// Geometry for one overlay clip.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClipStyle {
    pub corner_radius: u32,
    /// Horizontal margin on each side of the frame.
    pub margin: u32,
}

/// Width an overlay is scaled to: the frame width minus the margin on both sides.
pub fn target_width(frame_width: u32, margin: u32) -> ReelResult<u32> {
    let w = i64::from(frame_width) - 2 * i64::from(margin);
    if w <= 0 {
        return Err(ReelError::composition(format!(
            "margin {margin}px leaves no room in a {frame_width}px wide frame"
        )));
    }
    Ok(w as u32)
}

/// Aspect-preserving size of `image` scaled to `width`, checked against the frame bounds.
pub fn fit_to_width(image: Canvas, width: u32, frame: Canvas) -> ReelResult<Canvas> {
    if image.width == 0 || image.height == 0 {
        return Err(ReelError::composition("overlay image has zero size"));
    }
    let height = (f64::from(image.height) * f64::from(width) / f64::from(image.width))
        .round()
        .max(1.0) as u32;
    let scaled = Canvas::new(width, height);
    if scaled.width > frame.width || scaled.height > frame.height {
        return Err(ReelError::composition(format!(
            "overlay scaled to {scaled} does not fit a {frame} frame"
        )));
    }
    Ok(scaled)
}

pub(crate) fn load_rgba(path: &Path) -> ReelResult<RgbaImage> {
    let img = image::open(path)
        .map_err(|e| ReelError::media_read(path, format!("decode image: {e}")))?;
    Ok(img.to_rgba8())
}

/// Mask `src` at its native size, then premultiply and scale it to `size`.
pub fn rasterize_overlay(
    mut src: RgbaImage,
    radius: u32,
    size: Canvas,
) -> ReelResult<(RgbaImage, PremulImage)> {
    let (w, h) = src.dimensions();
    let mask = rounded_rect_mask(Canvas::new(w, h), radius);
    apply_mask(&mut src, &mask)?;
    let masked = src;

    let mut premul = masked.clone().into_raw();
    premultiply_rgba8_in_place(&mut premul);
    let premul = RgbaImage::from_raw(w, h, premul)
        .ok_or_else(|| ReelError::composition("premultiplied buffer size mismatch"))?;

    let data = if (w, h) == (size.width, size.height) {
        premul.into_raw()
    } else {
        let mut scaled =
            image::imageops::resize(&premul, size.width, size.height, FilterType::Lanczos3)
                .into_raw();
        clamp_premul_in_place(&mut scaled);
        scaled
    };

    Ok((masked, PremulImage { size, data }))
}

/// Lanczos ringing can push color above alpha; keep the buffer valid premultiplied.
fn clamp_premul_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3];
        px[0] = px[0].min(a);
        px[1] = px[1].min(a);
        px[2] = px[2].min(a);
    }
}

/// Build the overlay clip for one segment and write its masked image to `masked_path`.
pub fn build_overlay_clip(
    segment: &Segment,
    frame: Canvas,
    style: ClipStyle,
    masked_path: &Path,
) -> ReelResult<OverlayClip> {
    if !segment.duration_secs.is_finite() || segment.duration_secs <= 0.0 {
        return Err(ReelError::composition(format!(
            "segment '{}' has non-positive duration {}",
            segment.id, segment.duration_secs
        )));
    }

    let src = load_rgba(&segment.image_path)?;
    let (w, h) = src.dimensions();
    let width = target_width(frame.width, style.margin)?;
    let size = fit_to_width(Canvas::new(w, h), width, frame)?;

    let (masked, raster) = rasterize_overlay(src, style.corner_radius, size)?;
    masked.save(masked_path).map_err(|e| {
        ReelError::composition(format!(
            "write masked image '{}': {e}",
            masked_path.display()
        ))
    })?;

    tracing::debug!(
        id = %segment.id,
        source = %Canvas::new(w, h),
        scaled = %size,
        radius = style.corner_radius,
        "overlay clip prepared"
    );

    Ok(OverlayClip {
        segment_id: segment.id.clone(),
        masked_image_path: masked_path.to_path_buf(),
        duration_secs: segment.duration_secs,
        corner_radius: style.corner_radius,
        target_width: width,
        raster,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/overlay/clip.rs"]
mod tests;
