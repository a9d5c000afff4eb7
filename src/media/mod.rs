//! `ffmpeg` / `ffprobe` process plumbing: probing, decoding and tool discovery.

/// Audio PCM decode and streaming video frame sources.
pub mod decode;
/// Tool discovery and command helpers.
pub mod ffmpeg;
/// Metadata probing via `ffprobe`.
pub mod probe;
