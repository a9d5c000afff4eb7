//! Rounded-corner overlay clips, their track, and compositing over the background.

pub mod clip;
pub mod composite;
pub mod mask;
pub mod track;
