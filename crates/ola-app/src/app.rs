use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use arc_swap::ArcSwap;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ola_core::config::RenderConfig;
use ola_render::canvas::Canvas;
use ola_render::renderer::{ContainerSize, WaveRenderer};
use ola_render::scheduler::{Debouncer, PacedScheduler};
use ola_render::terminal::{canvas_size_for, render_halfblock};
use ratatui::DefaultTerminal;
use ratatui::layout::Rect;

/// Attente maximale entre deux polls quand rien n'est planifié (pause).
const IDLE_POLL: Duration = Duration::from_millis(250);
/// Auto-repeat of a held Space key must not flicker between pause and resume.
const PAUSE_REPEAT_GUARD: Duration = Duration::from_millis(250);

/// Application state.
///
/// # Example
/// ```
/// use ola_app::app::AppState;
/// let state = AppState::Running;
/// assert!(matches!(state, AppState::Running));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AppState {
    /// Animation en cours.
    Running,
    /// Boucle de frames arrêtée, dernière image conservée à l'écran.
    Paused,
    /// Fermeture : doit se terminer au prochain tour de boucle.
    Quitting,
}

/// Live terminal preview: one wave renderer paced to `target_fps`.
pub struct App {
    pub state: AppState,
    /// Config courante (rechargée à chaud par le watcher).
    pub config: Arc<ArcSwap<RenderConfig>>,
    renderer: WaveRenderer<Canvas, PacedScheduler>,
    reload_rx: Option<flume::Receiver<()>>,
    /// Leading-edge guard: first Space of a burst toggles, repeats are dropped.
    pause_guard: Debouncer,
    needs_redraw: bool,
}

impl App {
    /// Mount the renderer on a canvas sized to the current terminal.
    ///
    /// # Errors
    /// Returns an error if the terminal size cannot be read.
    pub fn new(
        config: Arc<ArcSwap<RenderConfig>>,
        reload_rx: Option<flume::Receiver<()>>,
    ) -> Result<Self> {
        let (cols, rows) = crossterm::terminal::size().context("cannot read terminal size")?;
        Self::with_size(config, reload_rx, cols, rows)
    }

    /// Mount the renderer for a terminal of `cols × rows` cells.
    ///
    /// # Errors
    /// Returns an error if the wave surface cannot be mounted.
    pub fn with_size(
        config: Arc<ArcSwap<RenderConfig>>,
        reload_rx: Option<flume::Receiver<()>>,
        cols: u16,
        rows: u16,
    ) -> Result<Self> {
        let (w, h) = canvas_size_for(Rect::new(0, 0, cols, rows));

        let current = config.load();
        let renderer = WaveRenderer::mount(
            Some(Canvas::new()),
            PacedScheduler::new(current.target_fps),
            ContainerSize::new(w, h),
            1.0,
            &current,
        )
        .context("wave surface could not be mounted")?;
        drop(current);

        Ok(Self {
            state: AppState::Running,
            config,
            renderer,
            reload_rx,
            pause_guard: Debouncer::leading(PAUSE_REPEAT_GUARD),
            needs_redraw: true,
        })
    }

    /// Main event loop.
    ///
    /// # Errors
    /// Returns an error if terminal operations fail.
    pub fn run(&mut self, mut terminal: DefaultTerminal) -> Result<()> {
        loop {
            if self.state == AppState::Quitting {
                break;
            }

            // === Attente : prochaine frame ou fin du debounce de resize ===
            let now = Instant::now();
            let timeout = [
                self.renderer.scheduler().time_until_due(now),
                self.renderer.resize_due_in(now),
            ]
            .into_iter()
            .flatten()
            .min()
            .unwrap_or(IDLE_POLL);

            if event::poll(timeout)? {
                self.handle_event(&event::read()?);
                while event::poll(Duration::ZERO)? {
                    self.handle_event(&event::read()?);
                }
            }

            self.apply_reloads();

            // === Resize avant la livraison de frame ===
            let now = Instant::now();
            self.pause_guard.fire_if_due(now);
            if self.renderer.poll_resize(now) {
                self.needs_redraw = true;
                if self.state == AppState::Paused {
                    self.renderer.render_frame();
                }
            }
            if let Some(handle) = self.renderer.scheduler_mut().take_due(now)
                && self.renderer.on_frame(handle)
            {
                self.needs_redraw = true;
            }

            if self.needs_redraw {
                self.needs_redraw = false;
                let background = self.config.load().background;
                let canvas = self.renderer.surface();
                terminal.draw(|frame| {
                    let area = frame.area();
                    render_halfblock(frame.buffer_mut(), area, canvas.frame(), background);
                })?;
            }
        }
        self.renderer.destroy();
        Ok(())
    }

    fn handle_event(&mut self, event: &Event) {
        match *event {
            Event::Key(KeyEvent {
                code,
                modifiers,
                kind: KeyEventKind::Press,
                ..
            }) => self.handle_key(code, modifiers, Instant::now()),
            Event::Resize(cols, rows) => {
                let (w, h) = canvas_size_for(Rect::new(0, 0, cols, rows));
                self.renderer
                    .handle_resize(ContainerSize::new(w, h), 1.0, Instant::now());
            }
            _ => {}
        }
    }

    fn handle_key(&mut self, code: KeyCode, modifiers: KeyModifiers, now: Instant) {
        if modifiers.contains(KeyModifiers::CONTROL) && code == KeyCode::Char('c') {
            self.state = AppState::Quitting;
            return;
        }
        match code {
            KeyCode::Char('q') | KeyCode::Esc => self.state = AppState::Quitting,
            KeyCode::Char(' ') => {
                if self.pause_guard.arm(now) {
                    self.toggle_pause();
                }
            }
            _ => {}
        }
    }

    /// Pause = teardown of the frame loop; resume re-fits the canvas to the
    /// terminal and restarts from the current time.
    fn toggle_pause(&mut self) {
        match self.state {
            AppState::Running => {
                self.renderer.destroy();
                self.state = AppState::Paused;
                log::info!("Paused at t = {}", self.renderer.time());
            }
            AppState::Paused => {
                match crossterm::terminal::size() {
                    Ok((cols, rows)) => {
                        let (w, h) = canvas_size_for(Rect::new(0, 0, cols, rows));
                        self.renderer
                            .configure_surface(ContainerSize::new(w, h), 1.0);
                        self.renderer.build_waves();
                    }
                    Err(e) => log::warn!("Cannot read terminal size on resume: {e}"),
                }
                self.renderer.start();
                self.state = AppState::Running;
                log::info!("Resumed at t = {}", self.renderer.time());
            }
            AppState::Quitting => {}
        }
    }

    /// Drain reload notifications and push the newest config into the renderer.
    fn apply_reloads(&mut self) {
        let Some(rx) = self.reload_rx.as_ref() else {
            return;
        };
        if rx.try_iter().count() == 0 {
            return;
        }
        let config = self.config.load();
        self.renderer.apply_config(&config);
        self.renderer.scheduler_mut().set_fps(config.target_fps);
        if self.state == AppState::Paused {
            self.renderer.render_frame();
        }
        self.needs_redraw = true;
        log::debug!("Applied reloaded config ({} waves)", config.waves.len());
    }
}
