use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use arc_swap::ArcSwap;
use notify::{Event, EventKind, RecursiveMode, Watcher};
use ola_core::config::RenderConfig;

/// Lance un watcher qui recharge le fichier config et met à jour l'ArcSwap.
///
/// Each successful reload is announced on `reloaded` so the frame loop can
/// rebuild its layers between two ticks. Retourne le Watcher (doit rester
/// vivant tant que l'app tourne).
///
/// # Errors
/// Returns an error if the watcher cannot be created or the path cannot be watched.
pub fn spawn_config_watcher(
    config_path: &Path,
    config: &Arc<ArcSwap<RenderConfig>>,
    reloaded: flume::Sender<()>,
) -> Result<impl Watcher + use<>> {
    let config = Arc::clone(config);
    let path = config_path.to_path_buf();

    let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
        let Ok(event) = res else {
            return;
        };
        if !matches!(event.kind, EventKind::Modify(_)) {
            return;
        }
        match ola_core::config::load_config(&path) {
            Ok(new_config) => {
                config.store(Arc::new(new_config));
                log::info!("Config reloaded from {}", path.display());
                // The loop may already be gone during shutdown.
                let _ = reloaded.send(());
            }
            Err(e) => {
                log::warn!("Config reload failed, keeping previous: {e:#}");
            }
        }
    })?;

    watcher.watch(config_path, RecursiveMode::NonRecursive)?;
    Ok(watcher)
}
