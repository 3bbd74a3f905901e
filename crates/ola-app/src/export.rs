use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use ola_core::config::RenderConfig;
use ola_render::canvas::Canvas;
use ola_render::renderer::{ContainerSize, WaveRenderer};
use ola_render::scheduler::ManualScheduler;

/// Offline export settings.
#[derive(Clone, Debug)]
pub struct ExportJob {
    pub out_dir: PathBuf,
    pub frames: u32,
    pub width: u32,
    pub height: u32,
    pub density: f64,
}

/// Render `job.frames` ticks and write each one as `frame_NNNNN.png`.
///
/// Frames are stepped through a manual scheduler, so the output only depends
/// on the configuration, never on machine speed.
///
/// # Errors
/// Returns an error if the directory cannot be created or a PNG cannot be written.
pub fn run_export(job: &ExportJob, config: &RenderConfig) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(&job.out_dir)
        .with_context(|| format!("cannot create {}", job.out_dir.display()))?;

    let mut renderer = WaveRenderer::mount(
        Some(Canvas::new()),
        ManualScheduler::new(),
        ContainerSize::new(f64::from(job.width), f64::from(job.height)),
        job.density,
        config,
    )
    .context("wave surface could not be mounted")?;

    let mut written = Vec::with_capacity(job.frames as usize);
    for i in 0..job.frames {
        let handle = renderer
            .scheduler_mut()
            .take_next()
            .context("frame loop stopped before the export finished")?;
        renderer.on_frame(handle);

        let path = job.out_dir.join(format!("frame_{i:05}.png"));
        write_png(&renderer.surface().flatten(config.background), &path)?;
        log::debug!("Wrote {}", path.display());
        written.push(path);
    }
    renderer.destroy();

    log::info!(
        "Exported {} frames ({}×{} @ {}x) to {}",
        written.len(),
        job.width,
        job.height,
        job.density,
        job.out_dir.display()
    );
    Ok(written)
}

fn write_png(frame: &ola_core::frame::FrameBuffer, path: &Path) -> Result<()> {
    let image = image::RgbaImage::from_raw(frame.width, frame.height, frame.data.clone())
        .context("frame buffer size does not match its dimensions")?;
    image
        .save(path)
        .with_context(|| format!("cannot write {}", path.display()))
}
