/// Presentation layer: terminal, keyboard, gamepad and audio.

pub mod gamepad;
pub mod input;
pub mod renderer;
pub mod sound;
