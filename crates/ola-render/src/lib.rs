//! Rendering side of ola: software canvas, frame pacing and the wave renderer.
//!
//! The renderer is generic over the `Surface` and `FrameScheduler` traits of
//! `ola-core`; this crate ships the software implementations and a terminal
//! blitter for previews.

pub mod canvas;
pub mod renderer;
pub mod scheduler;
pub mod terminal;

pub use canvas::Canvas;
pub use renderer::{ContainerSize, LoopState, WaveRenderer};
pub use scheduler::{Debouncer, ManualScheduler, PacedScheduler};
