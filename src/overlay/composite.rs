use std::path::PathBuf;

use crate::background::BackgroundClip;
use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts};
use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::{Canvas, FrameIndex, FrameRGBA, Fps};
use crate::foundation::error::{ReelError, ReelResult};
use crate::foundation::math::{mul_div255_u8, unit_to_u8};
use crate::media::decode::{FfmpegFrameSource, FrameSource};
use crate::media::probe::probe_video;
use crate::overlay::clip::{ClipStyle, PremulImage, build_overlay_clip};
use crate::overlay::track::OverlayTrack;
use crate::pipeline::context::PipelineContext;
use crate::timeline::Timeline;

pub type PremulRgba8 = [u8; 4];

/// Source-over for premultiplied pixels.
pub fn over(dst: PremulRgba8, src: PremulRgba8) -> PremulRgba8 {
    let sa = u16::from(src[3]);
    if sa == 0 {
        return dst;
    }
    if sa == 255 {
        return src;
    }
    let inv = 255u16 - sa;
    let mut out = [0u8; 4];
    for i in 0..4 {
        out[i] = src[i].saturating_add(mul_div255_u8(u16::from(dst[i]), inv));
    }
    out
}

/// Render a background frame at `opacity` over opaque black, in place.
///
/// The result is premultiplied and fully opaque whatever the input alpha was.
pub fn dim_over_black(frame: &mut FrameRGBA, opacity: f32) {
    let op = unit_to_u8(opacity);
    let premultiplied = frame.premultiplied;
    for px in frame.data.chunks_exact_mut(4) {
        let a = u16::from(px[3]);
        for c in &mut px[..3] {
            let v = if premultiplied {
                u16::from(*c)
            } else {
                u16::from(mul_div255_u8(u16::from(*c), a))
            };
            *c = mul_div255_u8(v, op);
        }
        px[3] = 255;
    }
    frame.premultiplied = true;
}

/// Top-left corner that centres `overlay` on `canvas`.
pub fn centered_origin(canvas: Canvas, overlay: Canvas) -> ReelResult<(u32, u32)> {
    if overlay.width > canvas.width || overlay.height > canvas.height {
        return Err(ReelError::composition(format!(
            "overlay {overlay} does not fit a {canvas} frame"
        )));
    }
    Ok((
        (canvas.width - overlay.width) / 2,
        (canvas.height - overlay.height) / 2,
    ))
}

/// Composite `overlay` centred on a premultiplied `frame`.
pub fn blit_centered(frame: &mut FrameRGBA, overlay: &PremulImage) -> ReelResult<()> {
    if !frame.premultiplied {
        return Err(ReelError::composition(
            "overlay target frame must be premultiplied",
        ));
    }
    let canvas = frame.canvas();
    if frame.data.len() != canvas.rgba_len() || overlay.data.len() != overlay.size.rgba_len() {
        return Err(ReelError::composition("rgba8 buffer size mismatch"));
    }
    let (x0, y0) = centered_origin(canvas, overlay.size)?;

    let dst_stride = canvas.width as usize * 4;
    let src_stride = overlay.size.width as usize * 4;
    for (row, src_row) in overlay.data.chunks_exact(src_stride).enumerate() {
        let start = (y0 as usize + row) * dst_stride + x0 as usize * 4;
        let dst_row = &mut frame.data[start..start + src_stride];
        for (d, s) in dst_row.chunks_exact_mut(4).zip(src_row.chunks_exact(4)) {
            let out = over([d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]]);
            d.copy_from_slice(&out);
        }
    }
    Ok(())
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CompositeStats {
    pub frames: u64,
    /// Output frames that reused the last background frame because the decoder ran out.
    pub held_frames: u64,
}

/// Stream every output frame: dimmed background plus the scheduled overlay clip.
pub fn composite_frames(
    source: &mut dyn FrameSource,
    track: &OverlayTrack,
    fps: Fps,
    opacity: f32,
    sink: &mut dyn FrameSink,
) -> ReelResult<CompositeStats> {
    let canvas = source.canvas();
    let schedule = track.frame_schedule(fps);
    if schedule.is_empty() {
        return Err(ReelError::composition("overlay track is shorter than one frame"));
    }

    sink.begin(SinkConfig {
        canvas,
        fps,
        frame_count: schedule.len() as u64,
    })?;

    // One frame of lookahead: a frame is copied only when it is the last the decoder yields.
    let mut pending = source.next_frame()?;
    let mut last_bg: Option<FrameRGBA> = None;
    let mut held_frames = 0u64;
    for (i, clip_idx) in schedule.iter().copied().enumerate() {
        let mut frame = match pending.take() {
            Some(frame) => {
                if frame.canvas() != canvas {
                    return Err(ReelError::composition(format!(
                        "background frame {} is {}, expected {canvas}",
                        i,
                        frame.canvas()
                    )));
                }
                if i + 1 < schedule.len() {
                    pending = source.next_frame()?;
                    if pending.is_none() {
                        last_bg = Some(frame.clone());
                    }
                }
                frame
            }
            None => {
                held_frames += 1;
                last_bg.clone().ok_or_else(|| {
                    ReelError::composition("background decoder produced no frames")
                })?
            }
        };

        dim_over_black(&mut frame, opacity);
        let clip = &track.clips()[clip_idx];
        blit_centered(&mut frame, &clip.raster)?;
        sink.push_frame(FrameIndex(i as u64), &frame)?;
    }
    sink.end()?;

    if held_frames > 0 {
        tracing::warn!(held_frames, "background ran short; held its last frame");
    }
    Ok(CompositeStats {
        frames: schedule.len() as u64,
        held_frames,
    })
}

/// The composited, silent video.
#[derive(Clone, Debug)]
pub struct CompositeVideo {
    pub path: PathBuf,
    pub duration_secs: f64,
    pub canvas: Canvas,
    pub fps: Fps,
    pub frames: u64,
}

/// BuildOverlayTrack stage: one masked, scaled clip per segment, in timeline order.
#[tracing::instrument(skip_all, fields(segments = timeline.len(), canvas = %canvas))]
pub fn build_overlay_track(
    ctx: &PipelineContext,
    timeline: &Timeline,
    canvas: Canvas,
) -> ReelResult<OverlayTrack> {
    let mut clips = Vec::with_capacity(timeline.len());
    for segment in timeline.segments() {
        let style = ClipStyle {
            corner_radius: ctx.config.radius_for(segment.is_title()),
            margin: ctx.config.margin_for(segment.is_title()),
        };
        let masked_path = ctx
            .workdir
            .artifact(&format!("overlay_{:02}.png", segment.order));
        clips.push(build_overlay_clip(segment, canvas, style, &masked_path)?);
    }
    let track = OverlayTrack::new(clips)?;

    let drift = (track.total_secs() - timeline.total_secs()).abs();
    if drift > 0.01 {
        return Err(ReelError::composition(format!(
            "overlay track is {:.3}s, timeline is {:.3}s",
            track.total_secs(),
            timeline.total_secs()
        )));
    }
    tracing::info!(total_secs = track.total_secs(), "overlay track built");
    Ok(track)
}

/// CompositeVideo stage: decode the background, dim it, lay the overlay track on top, encode.
#[tracing::instrument(skip_all, fields(background = %background.path.display()))]
pub fn composite_video(
    ctx: &PipelineContext,
    background: &BackgroundClip,
    track: &OverlayTrack,
) -> ReelResult<CompositeVideo> {
    let fps = ctx.config.output_fps()?;
    let canvas = background.canvas;
    if !canvas.is_even() {
        return Err(ReelError::composition(format!(
            "background canvas {canvas} must have even dimensions"
        )));
    }

    let out_path = ctx.workdir.artifact("composite.mp4");
    let mut source = FfmpegFrameSource::open(&background.path, canvas, fps)?;
    let mut sink = FfmpegSink::new(FfmpegSinkOpts::new(&out_path, &ctx.config.video_codec));
    let stats = composite_frames(
        &mut source,
        track,
        fps,
        ctx.config.background_opacity,
        &mut sink,
    )?;
    source.close()?;

    let written = probe_video(&out_path)?;
    if written.canvas != canvas {
        return Err(ReelError::composition(format!(
            "composite is {}, background is {canvas}",
            written.canvas
        )));
    }

    let duration_secs = fps.frames_to_secs(stats.frames);
    tracing::info!(frames = stats.frames, duration_secs, "composite encoded");
    Ok(CompositeVideo {
        path: out_path,
        duration_secs,
        canvas,
        fps,
        frames: stats.frames,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/overlay/composite.rs"]
mod tests;
