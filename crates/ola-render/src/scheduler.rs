use std::collections::VecDeque;
use std::time::{Duration, Instant};

use ola_core::traits::{FrameHandle, FrameScheduler};

/// Ordonnanceur pas-à-pas : les frames ne sont livrées que sur demande explicite.
///
/// Utilisé par les tests et par l'export PNG, où chaque tick doit être
/// déterministe et indépendant de l'horloge murale.
///
/// # Example
/// ```
/// use ola_core::traits::FrameScheduler;
/// use ola_render::scheduler::ManualScheduler;
///
/// let mut s = ManualScheduler::new();
/// let h = s.request_frame();
/// assert_eq!(s.pending_count(), 1);
/// assert_eq!(s.take_next(), Some(h));
/// assert_eq!(s.take_next(), None);
/// ```
#[derive(Debug, Default)]
pub struct ManualScheduler {
    next_id: u64,
    pending: VecDeque<FrameHandle>,
    requested: u64,
    cancelled: u64,
}

impl ManualScheduler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pop the oldest pending request; the host then delivers it to the renderer.
    pub fn take_next(&mut self) -> Option<FrameHandle> {
        self.pending.pop_front()
    }

    /// Number of requests not yet delivered nor cancelled.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Total requests ever made.
    #[must_use]
    pub fn requested(&self) -> u64 {
        self.requested
    }

    /// Total requests cancelled before delivery.
    #[must_use]
    pub fn cancelled(&self) -> u64 {
        self.cancelled
    }
}

impl FrameScheduler for ManualScheduler {
    fn request_frame(&mut self) -> FrameHandle {
        self.next_id += 1;
        self.requested += 1;
        let handle = FrameHandle(self.next_id);
        self.pending.push_back(handle);
        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        if let Some(pos) = self.pending.iter().position(|&h| h == handle) {
            self.pending.remove(pos);
            self.cancelled += 1;
        }
    }
}

/// Ordonnanceur cadencé : au plus une frame par intervalle `1 / fps`.
///
/// Stands in for the display refresh callback in the terminal host.
///
/// # Example
/// ```
/// use std::time::{Duration, Instant};
/// use ola_core::traits::FrameScheduler;
/// use ola_render::scheduler::PacedScheduler;
///
/// let start = Instant::now();
/// let mut s = PacedScheduler::new(50);
/// s.request_frame();
/// assert!(s.take_due(start).is_some());
/// s.request_frame();
/// assert!(s.take_due(start + Duration::from_millis(5)).is_none());
/// assert!(s.take_due(start + Duration::from_millis(20)).is_some());
/// ```
#[derive(Debug)]
pub struct PacedScheduler {
    queue: ManualScheduler,
    interval: Duration,
    last_delivery: Option<Instant>,
}

impl PacedScheduler {
    #[must_use]
    pub fn new(fps: u32) -> Self {
        Self {
            queue: ManualScheduler::new(),
            interval: interval_for(fps),
            last_delivery: None,
        }
    }

    /// Change pacing (config reload).
    pub fn set_fps(&mut self, fps: u32) {
        self.interval = interval_for(fps);
    }

    /// Pop a pending request if its slot has come.
    pub fn take_due(&mut self, now: Instant) -> Option<FrameHandle> {
        if self.time_until_due(now)? > Duration::ZERO {
            return None;
        }
        let handle = self.queue.take_next()?;
        self.last_delivery = Some(now);
        Some(handle)
    }

    /// Time left before the next pending request may be delivered, `None` when idle.
    #[must_use]
    pub fn time_until_due(&self, now: Instant) -> Option<Duration> {
        if self.queue.pending_count() == 0 {
            return None;
        }
        Some(match self.last_delivery {
            Some(last) => (last + self.interval).saturating_duration_since(now),
            None => Duration::ZERO,
        })
    }

    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.queue.pending_count()
    }
}

impl FrameScheduler for PacedScheduler {
    fn request_frame(&mut self) -> FrameHandle {
        self.queue.request_frame()
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        self.queue.cancel_frame(handle);
    }
}

fn interval_for(fps: u32) -> Duration {
    Duration::from_secs_f64(1.0 / f64::from(fps.max(1)))
}

/// Tâche différée annulable : regroupe une rafale d'appels en un seul déclenchement.
///
/// Trailing mode fires once `wait` after the last `arm`; leading mode fires on
/// the first `arm` of a burst and stays silent until the burst has been quiet
/// for `wait`.
///
/// # Example
/// ```
/// use std::time::{Duration, Instant};
/// use ola_render::scheduler::Debouncer;
///
/// let t0 = Instant::now();
/// let mut d = Debouncer::new(Duration::from_millis(100));
/// d.arm(t0);
/// d.arm(t0 + Duration::from_millis(60));
/// assert!(!d.fire_if_due(t0 + Duration::from_millis(120)));
/// assert!(d.fire_if_due(t0 + Duration::from_millis(160)));
/// assert!(!d.is_pending());
/// ```
#[derive(Clone, Debug)]
pub struct Debouncer {
    wait: Duration,
    leading: bool,
    deadline: Option<Instant>,
}

impl Debouncer {
    /// Trailing-edge debouncer.
    #[must_use]
    pub fn new(wait: Duration) -> Self {
        Self {
            wait,
            leading: false,
            deadline: None,
        }
    }

    /// Leading-edge debouncer.
    #[must_use]
    pub fn leading(wait: Duration) -> Self {
        Self {
            leading: true,
            ..Self::new(wait)
        }
    }

    /// (Re)start the quiet period. Returns `true` when the caller must act now
    /// (leading edge of a burst).
    pub fn arm(&mut self, now: Instant) -> bool {
        let call_now = self.leading && self.deadline.is_none();
        self.deadline = Some(now + self.wait);
        call_now
    }

    /// `true` exactly once per expired trailing deadline.
    pub fn fire_if_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                !self.leading
            }
            _ => false,
        }
    }

    /// Drop the pending deadline, if any.
    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Time left before the deadline, `None` when idle.
    #[must_use]
    pub fn time_until_due(&self, now: Instant) -> Option<Duration> {
        self.deadline.map(|d| d.saturating_duration_since(now))
    }

    /// Change the quiet period for future arms.
    pub fn set_wait(&mut self, wait: Duration) {
        self.wait = wait;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn cancel_removes_only_matching_request() {
        let mut s = ManualScheduler::new();
        let a = s.request_frame();
        let b = s.request_frame();
        s.cancel_frame(a);
        s.cancel_frame(a);
        assert_eq!(s.pending_count(), 1);
        assert_eq!(s.cancelled(), 1);
        assert_eq!(s.take_next(), Some(b));
        s.cancel_frame(b);
        assert_eq!(s.cancelled(), 1);
    }

    #[test]
    fn handles_are_unique() {
        let mut s = ManualScheduler::new();
        let a = s.request_frame();
        s.take_next();
        let b = s.request_frame();
        assert_ne!(a, b);
        assert_eq!(s.requested(), 2);
    }

    #[test]
    fn paced_scheduler_idles_without_requests() {
        let mut s = PacedScheduler::new(60);
        let now = Instant::now();
        assert_eq!(s.time_until_due(now), None);
        assert_eq!(s.take_due(now), None);
    }

    #[test]
    fn paced_scheduler_reports_remaining_time() {
        let t0 = Instant::now();
        let mut s = PacedScheduler::new(10);
        s.request_frame();
        assert!(s.take_due(t0).is_some());
        s.request_frame();
        assert_eq!(s.time_until_due(t0 + ms(40)), Some(ms(60)));
        s.set_fps(100);
        assert_eq!(s.time_until_due(t0 + ms(40)), Some(Duration::ZERO));
    }

    #[test]
    fn trailing_burst_fires_once() {
        let t0 = Instant::now();
        let mut d = Debouncer::new(ms(100));
        for i in 0..10 {
            assert!(!d.arm(t0 + ms(i * 30)));
        }
        assert!(!d.fire_if_due(t0 + ms(300)));
        assert!(d.fire_if_due(t0 + ms(370)));
        assert!(!d.fire_if_due(t0 + ms(1000)));
    }

    #[test]
    fn leading_burst_acts_immediately_then_stays_silent() {
        let t0 = Instant::now();
        let mut d = Debouncer::leading(ms(100));
        assert!(d.arm(t0));
        assert!(!d.arm(t0 + ms(50)));
        assert!(!d.fire_if_due(t0 + ms(200)));
        assert!(!d.is_pending());
        assert!(d.arm(t0 + ms(300)));
    }

    #[test]
    fn cancel_prevents_fire() {
        let t0 = Instant::now();
        let mut d = Debouncer::new(ms(10));
        d.arm(t0);
        d.cancel();
        d.cancel();
        assert!(!d.fire_if_due(t0 + ms(50)));
        assert_eq!(d.time_until_due(t0), None);
    }
}
