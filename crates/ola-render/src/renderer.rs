use std::time::{Duration, Instant};

use ola_core::clock::TickClock;
use ola_core::config::RenderConfig;
use ola_core::error::CoreError;
use ola_core::path::FillPath;
use ola_core::traits::{FrameHandle, FrameScheduler, Surface};
use ola_core::wave::{Wave, WaveSpec};

use crate::scheduler::Debouncer;

/// Measured box of the element hosting the surface, in logical pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ContainerSize {
    pub width: f64,
    pub height: f64,
}

impl ContainerSize {
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Negative or non-finite sides collapse to zero (hidden container).
    fn sanitized(self) -> Self {
        let side = |v: f64| if v.is_finite() && v > 0.0 { v } else { 0.0 };
        Self {
            width: side(self.width),
            height: side(self.height),
        }
    }
}

/// État de la boucle d'animation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopState {
    /// A frame is requested after every tick.
    Running,
    /// No frame pending; only [`WaveRenderer::start`] leaves this state.
    Stopped,
}

/// Renderer de vagues superposées.
///
/// Possède la surface, l'ordonnanceur de frames injecté, les couches de vagues
/// et l'horloge en ticks. L'hôte livre les frames via [`WaveRenderer::on_frame`]
/// et les échéances de resize via [`WaveRenderer::poll_resize`], sur un seul
/// thread.
///
/// # Example
/// ```
/// use ola_core::config::RenderConfig;
/// use ola_render::canvas::Canvas;
/// use ola_render::renderer::{ContainerSize, WaveRenderer};
/// use ola_render::scheduler::ManualScheduler;
///
/// let config = RenderConfig::default();
/// let mut renderer = WaveRenderer::mount(
///     Some(Canvas::new()),
///     ManualScheduler::new(),
///     ContainerSize::new(80.0, 40.0),
///     1.0,
///     &config,
/// )
/// .unwrap();
/// let handle = renderer.scheduler_mut().take_next().unwrap();
/// assert!(renderer.on_frame(handle));
/// assert_eq!(renderer.time(), 0.5);
/// renderer.destroy();
/// assert_eq!(renderer.scheduler().pending_count(), 0);
/// ```
pub struct WaveRenderer<S: Surface, F: FrameScheduler> {
    surface: S,
    scheduler: F,
    specs: Vec<WaveSpec>,
    waves: Vec<Wave>,
    clock: TickClock,
    sample_step: f64,
    width: f64,
    height: f64,
    density: f64,
    state: LoopState,
    pending_frame: Option<FrameHandle>,
    resize: Debouncer,
    pending_resize: Option<(ContainerSize, f64)>,
    /// Resize notifications are accepted only while attached.
    listening: bool,
    curve: Vec<(f64, f64)>,
    path: FillPath,
}

impl<S: Surface, F: FrameScheduler> WaveRenderer<S, F> {
    /// Build an idle renderer: no geometry, no waves, loop stopped.
    #[must_use]
    pub fn new(surface: S, scheduler: F, config: &RenderConfig) -> Self {
        Self {
            surface,
            scheduler,
            specs: config.waves.clone(),
            waves: Vec::new(),
            clock: TickClock::new(config.time_step),
            sample_step: config.sample_step,
            width: 0.0,
            height: 0.0,
            density: 1.0,
            state: LoopState::Stopped,
            pending_frame: None,
            resize: Debouncer::new(Duration::from_millis(config.resize_debounce_ms)),
            pending_resize: None,
            listening: false,
            curve: Vec::new(),
            path: FillPath::new(),
        }
    }

    /// Monte le renderer sur une surface optionnelle et démarre l'animation.
    ///
    /// Sans surface, retourne `None` sans erreur : le fond est décoratif.
    #[must_use]
    pub fn mount(
        surface: Option<S>,
        scheduler: F,
        container: ContainerSize,
        density: f64,
        config: &RenderConfig,
    ) -> Option<Self> {
        let Some(surface) = surface else {
            log::debug!("No wave surface to mount, background disabled");
            return None;
        };
        let mut renderer = Self::new(surface, scheduler, config);
        renderer.configure_surface(container, density);
        renderer.build_waves();
        renderer.start();
        Some(renderer)
    }

    /// Size the backing store for `container × density` and reset the transform
    /// to a pure `density` scale. Failures are logged and leave the previous
    /// geometry in place.
    pub fn configure_surface(&mut self, container: ContainerSize, density: f64) {
        if let Err(e) = self.try_configure_surface(container, density) {
            log::warn!("Surface setup failed, keeping previous geometry: {e}");
        }
    }

    /// Fallible core of [`WaveRenderer::configure_surface`].
    ///
    /// # Errors
    /// Returns the surface's error when the backing store cannot be allocated.
    pub fn try_configure_surface(
        &mut self,
        container: ContainerSize,
        density: f64,
    ) -> Result<(), CoreError> {
        let container = container.sanitized();
        let density = if density.is_finite() && density >= 1.0 {
            density
        } else {
            1.0
        };
        let backing_w = (container.width * density).round() as u32;
        let backing_h = (container.height * density).round() as u32;

        self.surface.resize_backing(backing_w, backing_h)?;
        self.surface
            .set_display_size(container.width, container.height);
        self.surface.set_scale(density);

        self.width = container.width;
        self.height = container.height;
        self.density = density;
        log::debug!(
            "Surface configured: {}×{} logical, {backing_w}×{backing_h} backing (density {density})",
            self.width,
            self.height
        );
        Ok(())
    }

    /// Regenerate every layer from the configured table against the current height.
    pub fn build_waves(&mut self) {
        self.waves = self.specs.iter().map(|s| s.build(self.height)).collect();
    }

    /// Recompute the drifting speed of one layer for the current time.
    pub fn update_speed(&mut self, index: usize) {
        let t = self.clock.time();
        if let Some(wave) = self.waves.get_mut(index) {
            wave.update_speed(t);
        }
    }

    /// Update the speed of layer `index` and composite its filled curve onto the surface.
    pub fn draw_wave(&mut self, index: usize) {
        self.update_speed(index);
        let Some(wave) = self.waves.get(index) else {
            return;
        };
        let t = self.clock.time();
        wave.sample_curve(self.width, self.sample_step, t, &mut self.curve);

        self.path.reset();
        self.path.move_to(0.0, self.height);
        for &(x, y) in &self.curve {
            self.path.line_to(x, y);
        }
        self.path.line_to(self.width, self.height);
        self.path.line_to(0.0, self.height);
        self.path.close();

        self.surface.fill_path(&self.path, wave.color);
    }

    /// Clear the surface and draw every layer back to front, without advancing time.
    pub fn render_frame(&mut self) {
        self.surface.clear();
        for i in 0..self.waves.len() {
            self.draw_wave(i);
        }
    }

    /// Stopped → Running: attach the resize listener and request the first frame.
    pub fn start(&mut self) {
        self.listening = true;
        if self.state == LoopState::Running {
            return;
        }
        self.state = LoopState::Running;
        self.pending_frame = Some(self.scheduler.request_frame());
    }

    /// Frame callback. Stale handles and ticks after teardown are ignored.
    ///
    /// Returns `true` when a frame was drawn.
    pub fn on_frame(&mut self, handle: FrameHandle) -> bool {
        if self.state != LoopState::Running || self.pending_frame != Some(handle) {
            log::trace!("Ignoring stale frame {handle:?}");
            return false;
        }
        self.pending_frame = None;

        self.render_frame();
        self.clock.advance();
        log::trace!("Tick {} (t = {})", self.clock.ticks(), self.clock.time());

        self.pending_frame = Some(self.scheduler.request_frame());
        true
    }

    /// Record a container resize and (re)arm the debounce task.
    pub fn handle_resize(&mut self, container: ContainerSize, density: f64, now: Instant) {
        if !self.listening {
            return;
        }
        self.pending_resize = Some((container, density));
        self.resize.arm(now);
    }

    /// Run the debounced resize if its quiet period is over.
    ///
    /// Time and wave speeds are kept; only geometry and baselines change.
    pub fn poll_resize(&mut self, now: Instant) -> bool {
        if !self.resize.fire_if_due(now) {
            return false;
        }
        let Some((container, density)) = self.pending_resize.take() else {
            return false;
        };
        self.configure_surface(container, density);
        self.build_waves();
        true
    }

    /// Time left before a pending resize fires.
    #[must_use]
    pub fn resize_due_in(&self, now: Instant) -> Option<Duration> {
        self.resize.time_until_due(now)
    }

    /// Swap in a reloaded configuration. Time is kept; layers are rebuilt.
    pub fn apply_config(&mut self, config: &RenderConfig) {
        self.specs.clone_from(&config.waves);
        self.sample_step = config.sample_step;
        self.clock.set_step(config.time_step);
        self.resize
            .set_wait(Duration::from_millis(config.resize_debounce_ms));
        self.build_waves();
    }

    /// Teardown: cancel the pending frame and resize task, detach the listener.
    ///
    /// Idempotent; an in-flight tick is not interrupted.
    pub fn destroy(&mut self) {
        if let Some(handle) = self.pending_frame.take() {
            self.scheduler.cancel_frame(handle);
        }
        self.resize.cancel();
        self.pending_resize = None;
        self.listening = false;
        self.state = LoopState::Stopped;
    }

    #[must_use]
    pub fn state(&self) -> LoopState {
        self.state
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.state == LoopState::Running
    }

    /// Elapsed animation time.
    #[must_use]
    pub fn time(&self) -> f64 {
        self.clock.time()
    }

    #[must_use]
    pub fn ticks(&self) -> u64 {
        self.clock.ticks()
    }

    #[must_use]
    pub fn waves(&self) -> &[Wave] {
        &self.waves
    }

    /// Logical (width, height).
    #[must_use]
    pub fn logical_size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    #[must_use]
    pub fn density(&self) -> f64 {
        self.density
    }

    #[must_use]
    pub fn pending_frame(&self) -> Option<FrameHandle> {
        self.pending_frame
    }

    #[must_use]
    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    #[must_use]
    pub fn scheduler(&self) -> &F {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut F {
        &mut self.scheduler
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::Canvas;
    use crate::scheduler::ManualScheduler;

    fn mounted(w: f64, h: f64) -> WaveRenderer<Canvas, ManualScheduler> {
        WaveRenderer::mount(
            Some(Canvas::new()),
            ManualScheduler::new(),
            ContainerSize::new(w, h),
            1.0,
            &RenderConfig::default(),
        )
        .unwrap()
    }

    fn step(r: &mut WaveRenderer<Canvas, ManualScheduler>) -> bool {
        match r.scheduler_mut().take_next() {
            Some(h) => r.on_frame(h),
            None => false,
        }
    }

    #[test]
    fn mount_without_surface_is_silent() {
        let r: Option<WaveRenderer<Canvas, ManualScheduler>> = WaveRenderer::mount(
            None,
            ManualScheduler::new(),
            ContainerSize::new(10.0, 10.0),
            1.0,
            &RenderConfig::default(),
        );
        assert!(r.is_none());
    }

    #[test]
    fn mount_requests_first_frame() {
        let r = mounted(100.0, 50.0);
        assert!(r.is_running());
        assert_eq!(r.scheduler().pending_count(), 1);
        assert_eq!(r.time(), 0.0);
        assert_eq!(r.waves().len(), 4);
    }

    #[test]
    fn each_tick_advances_time_and_reschedules() {
        let mut r = mounted(64.0, 32.0);
        for _ in 0..4 {
            assert!(step(&mut r));
        }
        assert!((r.time() - 2.0).abs() < f64::EPSILON);
        assert_eq!(r.ticks(), 4);
        assert_eq!(r.scheduler().pending_count(), 1);
    }

    #[test]
    fn stale_handle_is_ignored() {
        let mut r = mounted(10.0, 10.0);
        let first = r.scheduler_mut().take_next().unwrap();
        assert!(r.on_frame(first));
        assert!(!r.on_frame(first));
        assert_eq!(r.ticks(), 1);
    }

    #[test]
    fn density_scales_backing_not_logical_size() {
        let mut r = mounted(100.0, 40.0);
        r.configure_surface(ContainerSize::new(100.0, 40.0), 2.0);
        assert_eq!(r.logical_size(), (100.0, 40.0));
        assert_eq!(r.surface().backing_size(), (200, 80));
        assert_eq!(r.surface().display_size(), (100.0, 40.0));
        assert_eq!(r.surface().scale(), 2.0);
    }

    #[test]
    fn sub_unit_density_is_treated_as_one() {
        let mut r = mounted(10.0, 10.0);
        r.configure_surface(ContainerSize::new(10.0, 10.0), 0.5);
        assert_eq!(r.density(), 1.0);
        r.configure_surface(ContainerSize::new(10.0, 10.0), f64::NAN);
        assert_eq!(r.density(), 1.0);
    }

    #[test]
    fn failed_setup_keeps_previous_geometry() {
        let mut r = mounted(120.0, 60.0);
        r.configure_surface(ContainerSize::new(1.0e6, 60.0), 1.0);
        assert_eq!(r.logical_size(), (120.0, 60.0));
        assert_eq!(r.surface().backing_size(), (120, 60));
        assert!(
            r.try_configure_surface(ContainerSize::new(1.0e6, 60.0), 1.0)
                .is_err()
        );
    }

    #[test]
    fn zero_sized_container_keeps_ticking() {
        let mut r = mounted(0.0, 0.0);
        assert!(step(&mut r));
        assert!(step(&mut r));
        assert_eq!(r.surface().backing_size(), (0, 0));
        assert!((r.time() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn negative_container_collapses_to_zero() {
        let r = mounted(-5.0, f64::INFINITY);
        assert_eq!(r.logical_size(), (0.0, 0.0));
    }

    #[test]
    fn destroy_stops_the_loop() {
        let mut r = mounted(10.0, 10.0);
        let h = r.pending_frame().unwrap();
        r.destroy();
        assert!(!r.on_frame(h));
        assert_eq!(r.state(), LoopState::Stopped);
        assert_eq!(r.scheduler().cancelled(), 1);
    }

    #[test]
    fn restart_continues_time() {
        let mut r = mounted(10.0, 10.0);
        step(&mut r);
        r.destroy();
        r.start();
        step(&mut r);
        assert!((r.time() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn apply_config_keeps_time() {
        let mut r = mounted(50.0, 100.0);
        step(&mut r);
        let mut config = RenderConfig::default();
        config.waves.truncate(2);
        config.time_step = 1.0;
        r.apply_config(&config);
        assert_eq!(r.waves().len(), 2);
        step(&mut r);
        assert!((r.time() - 1.5).abs() < f64::EPSILON);
    }

    #[test]
    fn draw_wave_updates_its_speed() {
        let mut r = mounted(40.0, 40.0);
        for _ in 0..10 {
            step(&mut r);
        }
        let t = r.time();
        r.draw_wave(0);
        let w = &r.waves()[0];
        assert_eq!(w.speed, w.speed_at(t));
        r.draw_wave(99);
    }
}
