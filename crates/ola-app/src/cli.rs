use std::path::PathBuf;

use clap::Parser;
use ola_core::frame::MAX_BACKING_SIDE;

/// ola: animated layered-wave background.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// TOML configuration file. Default: config/default.toml.
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: PathBuf,

    /// Load a named preset from config/presets/ (overrides --config).
    #[arg(long)]
    pub preset: Option<String>,

    /// Render PNG frames into this directory instead of the live terminal preview.
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Number of ticks to export.
    #[arg(long, default_value_t = 120)]
    pub frames: u32,

    /// Export width in logical pixels.
    #[arg(long, default_value_t = 1280)]
    pub width: u32,

    /// Export height in logical pixels.
    #[arg(long, default_value_t = 720)]
    pub height: u32,

    /// Export pixel density ratio (backing store = logical × density).
    #[arg(long, default_value_t = 1.0)]
    pub density: f64,

    /// Target FPS of the live preview.
    #[arg(long)]
    pub fps: Option<u32>,

    /// Log level: error, warn, info, debug, trace.
    #[arg(long, default_value = "warn")]
    pub log_level: String,
}

impl Cli {
    /// Validate the export geometry.
    ///
    /// # Errors
    /// Returns an error if export settings are out of range.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.export.is_none() {
            return Ok(());
        }
        if self.frames == 0 {
            anyhow::bail!("--frames must be at least 1");
        }
        if !self.density.is_finite() || self.density < 1.0 {
            anyhow::bail!("--density must be a finite value >= 1 (got {})", self.density);
        }
        let backing_w = (f64::from(self.width) * self.density).round();
        let backing_h = (f64::from(self.height) * self.density).round();
        if self.width == 0
            || self.height == 0
            || backing_w > f64::from(MAX_BACKING_SIDE)
            || backing_h > f64::from(MAX_BACKING_SIDE)
        {
            anyhow::bail!(
                "export size {}×{} at density {} is outside 1..={MAX_BACKING_SIDE} device pixels",
                self.width,
                self.height,
                self.density
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::parse_from(std::iter::once("ola").chain(args.iter().copied()))
    }

    #[test]
    fn live_mode_needs_no_export_flags() {
        let cli = parse(&[]);
        assert!(cli.export.is_none());
        assert!(cli.validate().is_ok());
    }

    #[test]
    fn export_rejects_zero_frames_and_bad_density() {
        assert!(parse(&["--export", "out", "--frames", "0"]).validate().is_err());
        assert!(parse(&["--export", "out", "--density", "0.5"]).validate().is_err());
        assert!(
            parse(&["--export", "out", "--width", "9000", "--density", "2"])
                .validate()
                .is_err()
        );
        assert!(
            parse(&["--export", "out", "--width", "64", "--height", "32"])
                .validate()
                .is_ok()
        );
    }
}
