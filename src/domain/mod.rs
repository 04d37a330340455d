/// Domain layer: pure gameplay types and rules.
/// Nothing here touches the terminal, audio or the filesystem.

pub mod ai;
pub mod animation;
pub mod entity;
pub mod physics;
pub mod rules;
pub mod tile;
