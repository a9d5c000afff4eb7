//! Narration track assembly.

pub mod concat;
