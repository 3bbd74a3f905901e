/// Default time advance per tick.
pub const DEFAULT_TIME_STEP: f64 = 0.5;
/// Plus petit pas accepté : le temps doit toujours avancer.
pub const MIN_TIME_STEP: f64 = 0.01;

/// Horloge d'animation en ticks.
///
/// Le temps ne dépend que du nombre de ticks livrés, jamais de l'horloge murale :
/// un écran à 144 Hz anime plus vite qu'un écran à 60 Hz, comme dans un
/// navigateur. Monotone, démarre à 0, jamais remise à zéro.
///
/// # Example
/// ```
/// use ola_core::clock::TickClock;
/// let mut clock = TickClock::new(0.5);
/// assert_eq!(clock.time(), 0.0);
/// clock.advance();
/// clock.advance();
/// assert_eq!(clock.time(), 1.0);
/// assert_eq!(clock.ticks(), 2);
/// ```
#[derive(Clone, Debug)]
pub struct TickClock {
    /// Temps écoulé, en unités d'animation.
    time: f64,
    /// Incrément par tick.
    step: f64,
    /// Nombre de ticks livrés.
    ticks: u64,
}

impl TickClock {
    /// Crée une horloge à `t = 0`.
    ///
    /// Un pas non fini retombe sur [`DEFAULT_TIME_STEP`], un pas trop petit
    /// est relevé à [`MIN_TIME_STEP`].
    #[must_use]
    pub fn new(step: f64) -> Self {
        Self {
            time: 0.0,
            step: sanitize_step(step),
            ticks: 0,
        }
    }

    /// Temps courant.
    #[inline]
    #[must_use]
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Incrément appliqué à chaque tick.
    #[inline]
    #[must_use]
    pub fn step(&self) -> f64 {
        self.step
    }

    /// Nombre de ticks écoulés.
    #[inline]
    #[must_use]
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Avance d'un tick.
    #[inline]
    pub fn advance(&mut self) {
        self.time += self.step;
        self.ticks += 1;
    }

    /// Change the step for future ticks (config reload). Elapsed time is kept.
    pub fn set_step(&mut self, step: f64) {
        self.step = sanitize_step(step);
    }
}

impl Default for TickClock {
    fn default() -> Self {
        Self::new(DEFAULT_TIME_STEP)
    }
}

fn sanitize_step(step: f64) -> f64 {
    if step.is_finite() {
        step.max(MIN_TIME_STEP)
    } else {
        DEFAULT_TIME_STEP
    }
}
