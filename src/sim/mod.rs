/// Simulation layer: the session state and the per-tick update.

pub mod camera;
pub mod event;
pub mod level;
pub mod step;
pub mod world;
