use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};

use serde::{Deserialize, Serialize};

use crate::color::Rgba;
use crate::error::CoreError;

/// Temporal frequency of the primary speed drift.
pub const SPEED_DRIFT_K1: f64 = 0.005;
/// Temporal frequency of the secondary speed drift.
pub const SPEED_DRIFT_K2: f64 = 0.003;

/// Configuration entry for one wave layer.
///
/// `baseline` is the centre line as a fraction of the logical surface height;
/// it becomes an absolute `base_y` when the layer is built against a height.
///
/// # Example
/// ```
/// use ola_core::wave::WaveSpec;
/// let spec = &WaveSpec::reference_table()[0];
/// let wave = spec.build(400.0);
/// assert_eq!(wave.base_y, 280.0);
/// assert_eq!(wave.speed, wave.base_speed);
/// ```
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct WaveSpec {
    /// Peak displacement of the primary sinusoid (logical px).
    pub amplitude: f64,
    /// Spatial angular frequency (rad / px).
    pub frequency: f64,
    /// Nominal temporal angular velocity, signed.
    pub base_speed: f64,
    /// Amplitude of the smooth speed drift.
    pub speed_variation: f64,
    /// Phase offset (rad).
    pub offset: f64,
    /// Translucent fill colour.
    pub color: Rgba,
    /// Centre line as a fraction of height [0.0, 1.0].
    pub baseline: f64,
    /// Amplitude of the sin·cos noise term.
    pub turbulence: f64,
}

impl WaveSpec {
    /// Hand-tuned four-layer table of the reference background.
    #[must_use]
    pub fn reference_table() -> Vec<WaveSpec> {
        vec![
            WaveSpec {
                amplitude: 30.0,
                frequency: 0.01,
                base_speed: 0.04,
                speed_variation: 0.01,
                offset: 0.0,
                color: Rgba::new(0, 180, 216, 0.15),
                baseline: 0.7,
                turbulence: 0.3,
            },
            WaveSpec {
                amplitude: 25.0,
                frequency: 0.015,
                base_speed: -0.03,
                speed_variation: 0.008,
                offset: FRAC_PI_4,
                color: Rgba::new(57, 255, 20, 0.1),
                baseline: 0.6,
                turbulence: 0.25,
            },
            WaveSpec {
                amplitude: 40.0,
                frequency: 0.008,
                base_speed: 0.05,
                speed_variation: 0.012,
                offset: FRAC_PI_2,
                color: Rgba::new(144, 224, 239, 0.12),
                baseline: 0.8,
                turbulence: 0.4,
            },
            WaveSpec {
                amplitude: 20.0,
                frequency: 0.02,
                base_speed: -0.06,
                speed_variation: 0.016,
                offset: PI,
                color: Rgba::new(202, 240, 248, 0.08),
                baseline: 0.5,
                turbulence: 0.2,
            },
        ]
    }

    /// Check the layer invariants.
    ///
    /// # Errors
    /// Returns [`CoreError::InvalidWave`] naming the first violated invariant.
    pub fn validate(&self, index: usize) -> Result<(), CoreError> {
        let fail = |reason: &str| {
            Err(CoreError::InvalidWave {
                index,
                reason: reason.to_string(),
            })
        };
        let finite = [
            self.amplitude,
            self.frequency,
            self.base_speed,
            self.speed_variation,
            self.offset,
            self.baseline,
            self.turbulence,
        ]
        .iter()
        .all(|v| v.is_finite());
        if !finite {
            return fail("non-finite parameter");
        }
        if self.amplitude < 0.0 {
            return fail("amplitude must be >= 0");
        }
        if self.frequency < 0.0 {
            return fail("frequency must be >= 0");
        }
        if self.turbulence < 0.0 {
            return fail("turbulence must be >= 0");
        }
        if self.speed_variation < 0.0 {
            return fail("speed_variation must be >= 0");
        }
        if !(0.0..=1.0).contains(&self.baseline) {
            return fail("baseline must be within [0, 1]");
        }
        if !(self.color.a > 0.0 && self.color.a <= 1.0) {
            return fail("color alpha must be within (0, 1]");
        }
        Ok(())
    }

    /// Instantiate the layer for a surface of the given logical height.
    #[must_use]
    pub fn build(&self, height: f64) -> Wave {
        Wave {
            amplitude: self.amplitude,
            frequency: self.frequency,
            base_speed: self.base_speed,
            speed: self.base_speed,
            speed_variation: self.speed_variation,
            offset: self.offset,
            color: self.color,
            base_y: height * self.baseline,
            turbulence: self.turbulence,
        }
    }
}

/// One live wave layer.
///
/// Shape parameters never change after [`WaveSpec::build`]; only `speed` is
/// recomputed each frame.
#[derive(Clone, Debug, PartialEq)]
pub struct Wave {
    pub amplitude: f64,
    pub frequency: f64,
    pub base_speed: f64,
    /// Effective velocity of the last drawn frame.
    pub speed: f64,
    pub speed_variation: f64,
    pub offset: f64,
    pub color: Rgba,
    /// Absolute centre line (logical px).
    pub base_y: f64,
    pub turbulence: f64,
}

impl Wave {
    /// Speed for time `t`: base speed plus two slow, bounded sinusoidal drifts.
    ///
    /// Always within `base_speed ± 1.5 × speed_variation`.
    #[inline]
    #[must_use]
    pub fn speed_at(&self, t: f64) -> f64 {
        let a = self.speed_variation;
        let b = self.speed_variation * 0.5;
        self.base_speed
            + a * (t * SPEED_DRIFT_K1 + self.offset).sin()
            + b * (t * SPEED_DRIFT_K2 + 2.0 * self.offset).sin()
    }

    /// Recompute and store `speed` for time `t`.
    #[inline]
    pub fn update_speed(&mut self, t: f64) {
        self.speed = self.speed_at(t);
    }

    /// Vertical position of the curve at `x` for time `t`, using the current `speed`.
    ///
    /// Pure in `(x, t, self)`.
    #[inline(always)]
    #[must_use]
    pub fn y_at(&self, x: f64, t: f64) -> f64 {
        let ts = t * self.speed;
        let primary = self.amplitude * (x * self.frequency + ts + self.offset).sin();
        let harmonic1 = 0.3 * self.amplitude * (x * self.frequency * 0.5 + ts * 1.5).sin();
        let harmonic2 = 0.15 * self.amplitude * (x * self.frequency * 1.8 + ts * 0.7).sin();
        let noise = self.turbulence * (x * 0.05 + t * 0.1).sin() * (x * 0.03 + t * 0.08).cos();
        self.base_y + primary + harmonic1 + harmonic2 + noise
    }

    /// Sample the curve from `x = 0` to `width` inclusive every `step` px into `out`.
    ///
    /// `out` is cleared first so callers can reuse its allocation.
    ///
    /// # Example
    /// ```
    /// use ola_core::wave::WaveSpec;
    /// let wave = WaveSpec::reference_table()[0].build(400.0);
    /// let mut pts = Vec::new();
    /// wave.sample_curve(800.0, 2.0, 0.0, &mut pts);
    /// assert_eq!(pts.len(), 401);
    /// assert_eq!(pts[0], (0.0, 280.0));
    /// ```
    pub fn sample_curve(&self, width: f64, step: f64, t: f64, out: &mut Vec<(f64, f64)>) {
        out.clear();
        if step.is_nan() || step <= 0.0 || width.is_nan() || width < 0.0 {
            return;
        }
        // Integer stepping avoids accumulating float drift along x.
        let count = (width / step).floor() as usize;
        out.reserve(count + 1);
        for i in 0..=count {
            let x = i as f64 * step;
            out.push((x, self.y_at(x, t)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_table_is_valid() {
        let table = WaveSpec::reference_table();
        assert_eq!(table.len(), 4);
        for (i, spec) in table.iter().enumerate() {
            spec.validate(i).unwrap();
        }
    }

    #[test]
    fn speed_stays_bounded() {
        for spec in WaveSpec::reference_table() {
            let wave = spec.build(100.0);
            let bound = 1.5 * wave.speed_variation + 1e-12;
            let mut t = 0.0;
            while t < 20_000.0 {
                let s = wave.speed_at(t);
                assert!(
                    (s - wave.base_speed).abs() <= bound,
                    "speed {s} escaped base {} ± {bound} at t={t}",
                    wave.base_speed
                );
                t += 7.25;
            }
        }
    }

    #[test]
    fn speed_bound_holds_for_arbitrary_parameters() {
        let mut seed = 0x9e37_79b9_u32;
        let mut rand = || {
            seed = seed.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
            f64::from(seed) / f64::from(u32::MAX)
        };
        for _ in 0..2_000 {
            let mut wave = WaveSpec::reference_table()[0].build(1.0);
            wave.base_speed = rand() * 2.0 - 1.0;
            wave.speed_variation = rand() * 3.0;
            wave.offset = rand() * 100.0 - 50.0;
            let t = rand() * 1.0e6;
            wave.update_speed(t);
            assert!((wave.speed - wave.base_speed).abs() <= 1.5 * wave.speed_variation + 1e-9);
        }
    }

    #[test]
    fn first_wave_starts_on_its_baseline() {
        let wave = WaveSpec::reference_table()[0].build(400.0);
        assert_eq!(wave.base_y, 280.0);
        // offset = 0 and t = 0: every sinusoid is sin(0) and the cosine factor multiplies sin(0).
        assert_eq!(wave.y_at(0.0, 0.0), 280.0);
    }

    #[test]
    fn sampling_is_reproducible() {
        let mut wave = WaveSpec::reference_table()[2].build(333.0);
        wave.update_speed(1234.5);
        let mut a = Vec::new();
        let mut b = Vec::new();
        wave.sample_curve(517.0, 2.0, 1234.5, &mut a);
        wave.clone().sample_curve(517.0, 2.0, 1234.5, &mut b);
        assert_eq!(a.len(), 259);
        assert!(a.iter().zip(&b).all(|(p, q)| p.0.to_bits() == q.0.to_bits() && p.1.to_bits() == q.1.to_bits()));
    }

    #[test]
    fn degenerate_sampling_inputs_yield_nothing() {
        let wave = WaveSpec::reference_table()[0].build(10.0);
        let mut pts = vec![(1.0, 1.0)];
        wave.sample_curve(100.0, 0.0, 0.0, &mut pts);
        assert!(pts.is_empty());
        wave.sample_curve(f64::NAN, 2.0, 0.0, &mut pts);
        assert!(pts.is_empty());
    }

    #[test]
    fn zero_width_samples_single_point() {
        let wave = WaveSpec::reference_table()[1].build(0.0);
        let mut pts = Vec::new();
        wave.sample_curve(0.0, 2.0, 0.0, &mut pts);
        assert_eq!(pts.len(), 1);
    }

    #[test]
    fn validate_rejects_broken_layers() {
        let base = WaveSpec::reference_table()[0].clone();

        let mut w = base.clone();
        w.amplitude = -1.0;
        assert!(matches!(w.validate(3), Err(CoreError::InvalidWave { index: 3, .. })));

        let mut w = base.clone();
        w.baseline = 1.2;
        assert!(w.validate(0).is_err());

        let mut w = base.clone();
        w.color = Rgba::new(0, 0, 0, 0.0);
        assert!(w.validate(0).is_err());

        let mut w = base;
        w.frequency = f64::INFINITY;
        assert!(w.validate(0).is_err());
    }
}
