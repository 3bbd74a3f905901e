//! Types, math and configuration shared across the ola workspace.
//!
//! This crate contains the wave model, the tick clock, the RGBA backing
//! store and the host-capability traits the renderer is generic over.

pub mod clock;
pub mod color;
pub mod config;
pub mod error;
pub mod frame;
pub mod path;
pub mod traits;
pub mod wave;

pub use clock::TickClock;
pub use color::Rgba;
pub use config::RenderConfig;
pub use error::CoreError;
pub use frame::FrameBuffer;
pub use path::FillPath;
pub use traits::{FrameHandle, FrameScheduler, Surface};
pub use wave::{Wave, WaveSpec};
