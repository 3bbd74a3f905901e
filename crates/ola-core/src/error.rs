use thiserror::Error;

/// Errors originating from the core module.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    /// Invalid configuration value or structure.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// A wave layer violates one of its parameter invariants.
    #[error("invalid wave #{index}: {reason}")]
    InvalidWave {
        /// Position of the wave in the configured table.
        index: usize,
        /// Which invariant failed.
        reason: String,
    },

    /// Colour string could not be parsed as `rgba(r, g, b, a)` or `#rrggbb[aa]`.
    #[error("invalid colour: {input}")]
    InvalidColor {
        /// The offending input.
        input: String,
    },

    /// Invalid width/height dimensions for a backing store.
    #[error("invalid dimensions: {width}×{height}")]
    InvalidDimensions {
        /// Width value.
        width: u32,
        /// Height value.
        height: u32,
    },
}
