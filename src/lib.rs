//! reelcast assembles narrated short-form videos.
//!
//! A run takes an ordered list of segments (one title and several comments, each with a speech
//! file and a screenshot) plus a long background video, and produces one file:
//!
//! - segment durations are read from audio metadata and summed into a [`Timeline`]
//! - a random interval of matching length is cut from the background
//! - each screenshot becomes a rounded-corner overlay shown for exactly its segment's duration
//! - the overlays are composited over the dimmed background and encoded
//! - the speech files are concatenated and muxed with the video
//!
//! All media I/O goes through the system `ffmpeg` and `ffprobe` binaries; pixel work happens in
//! Rust on premultiplied RGBA8 buffers. Entry point: [`run_pipeline`].
#![forbid(unsafe_code)]

mod foundation;

/// Narration track assembly.
pub mod audio;
/// Background interval selection and extraction.
pub mod background;
/// Run configuration.
pub mod config;
/// Frame sinks.
pub mod encode;
/// `ffmpeg`/`ffprobe` plumbing.
pub mod media;
/// Final mux.
pub mod mux;
/// Rounded-corner overlays and compositing.
pub mod overlay;
/// Stage orchestration.
pub mod pipeline;
/// Segments and timelines.
pub mod timeline;
/// Per-run working directory.
pub mod workdir;

pub use crate::foundation::core::{Canvas, Fps, FrameIndex, FrameRGBA};
pub use crate::foundation::error::{ReelError, ReelResult};

pub use crate::audio::concat::AudioTrack;
pub use crate::background::{BackgroundClip, BackgroundSelection};
pub use crate::config::{RenderConfig, ShortSourcePolicy};
pub use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts};
pub use crate::encode::sink::{FrameSink, InMemorySink, SinkConfig};
pub use crate::media::decode::{FfmpegFrameSource, FrameSource, InMemoryFrameSource};
pub use crate::media::ffmpeg::{is_ffmpeg_on_path, is_ffprobe_on_path};
pub use crate::mux::FinalOutput;
pub use crate::overlay::composite::CompositeVideo;
pub use crate::overlay::mask::rounded_rect_mask;
pub use crate::pipeline::job::JobManifest;
pub use crate::pipeline::stage::{PipelineError, Stage};
pub use crate::pipeline::{RunReport, plan, run_pipeline, run_pipeline_with};
pub use crate::timeline::resolve::{DurationResolver, FfprobeDurations, ResolvedTimeline};
pub use crate::timeline::{Segment, SegmentKind, SegmentSource, Timeline};
