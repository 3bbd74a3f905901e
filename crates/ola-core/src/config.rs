use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::clock::{DEFAULT_TIME_STEP, MIN_TIME_STEP};
use crate::color::Rgba;
use crate::error::CoreError;
use crate::wave::WaveSpec;

/// Configuration complète du rendu, hot-rechargeable.
///
/// Sérialisable en TOML. Chaque champ a une valeur par défaut saine ; le
/// défaut reproduit le fond de référence à quatre vagues.
///
/// # Example
/// ```
/// use ola_core::config::RenderConfig;
/// let config = RenderConfig::default();
/// assert_eq!(config.waves.len(), 4);
/// assert_eq!(config.resize_debounce_ms, 100);
/// ```
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct RenderConfig {
    // === Animation ===
    /// Time added to the clock on every tick.
    pub time_step: f64,
    /// Horizontal distance between curve samples, logical px.
    pub sample_step: f64,

    // === Surface ===
    /// Quiet period before a resize burst reconfigures the surface.
    pub resize_debounce_ms: u64,
    /// Page colour the transparent canvas is composited onto when displayed or exported.
    pub background: Rgba,

    // === Performance ===
    /// Frame pacing of the live host [15, 120].
    pub target_fps: u32,

    // === Layers ===
    /// Wave layers, drawn back to front.
    pub waves: Vec<WaveSpec>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            time_step: DEFAULT_TIME_STEP,
            sample_step: 2.0,
            resize_debounce_ms: 100,
            background: Rgba::opaque(10, 10, 10),
            target_fps: 60,
            waves: WaveSpec::reference_table(),
        }
    }
}

impl RenderConfig {
    /// Clamp all numeric fields to their valid ranges.
    /// Called after TOML deserialization to prevent out-of-range values.
    pub fn clamp_all(&mut self) {
        if !self.time_step.is_finite() {
            self.time_step = DEFAULT_TIME_STEP;
        }
        self.time_step = self.time_step.clamp(MIN_TIME_STEP, 10.0);
        if !self.sample_step.is_finite() {
            self.sample_step = 2.0;
        }
        self.sample_step = self.sample_step.clamp(0.5, 64.0);
        self.resize_debounce_ms = self.resize_debounce_ms.min(5_000);
        self.target_fps = self.target_fps.clamp(15, 120);
    }

    /// Check every wave layer.
    ///
    /// # Errors
    /// Returns [`CoreError::Config`] for an empty layer table, otherwise the
    /// first [`CoreError::InvalidWave`] found.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.waves.is_empty() {
            return Err(CoreError::Config("at least one wave layer is required".into()));
        }
        for (i, spec) in self.waves.iter().enumerate() {
            spec.validate(i)?;
        }
        Ok(())
    }
}

/// Structure TOML intermédiaire pour désérialisation avec valeurs optionnelles.
#[derive(Deserialize)]
struct ConfigFile {
    render: Option<RenderSection>,
    waves: Option<Vec<WaveSpec>>,
}

/// Render section of the TOML config, all fields optional for partial override.
#[derive(Deserialize)]
struct RenderSection {
    time_step: Option<f64>,
    sample_step: Option<f64>,
    resize_debounce_ms: Option<u64>,
    background: Option<Rgba>,
    target_fps: Option<u32>,
}

/// Parse un document TOML et fusionne avec les valeurs par défaut.
///
/// A `[[waves]]` array replaces the whole reference table.
///
/// # Errors
/// Returns an error if the document is not valid TOML or a wave is invalid.
///
/// # Example
/// ```
/// use ola_core::config::parse_config;
/// let config = parse_config("[render]\ntarget_fps = 30\n").unwrap();
/// assert_eq!(config.target_fps, 30);
/// assert_eq!(config.waves.len(), 4);
/// ```
pub fn parse_config(content: &str) -> Result<RenderConfig> {
    let file: ConfigFile = toml::from_str(content).context("TOML parse error")?;

    let mut config = RenderConfig::default();

    if let Some(r) = file.render {
        if let Some(v) = r.time_step {
            config.time_step = v;
        }
        if let Some(v) = r.sample_step {
            config.sample_step = v;
        }
        if let Some(v) = r.resize_debounce_ms {
            config.resize_debounce_ms = v;
        }
        if let Some(v) = r.background {
            config.background = v;
        }
        if let Some(v) = r.target_fps {
            config.target_fps = v;
        }
    }
    if let Some(waves) = file.waves {
        config.waves = waves;
    }

    config.clamp_all();
    config.validate()?;
    Ok(config)
}

/// Charge un fichier TOML et fusionne avec les valeurs par défaut.
///
/// # Errors
/// Returns an error if the file cannot be read or parsed.
///
/// # Example
/// ```no_run
/// use ola_core::config::load_config;
/// use std::path::Path;
/// let config = load_config(Path::new("config/default.toml")).unwrap();
/// ```
pub fn load_config(path: &Path) -> Result<RenderConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read {}", path.display()))?;
    parse_config(&content).with_context(|| format!("invalid config in {}", path.display()))
}
