use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use arc_swap::ArcSwap;
use clap::Parser;
use ola_core::config::RenderConfig;

pub mod app;
pub mod cli;
pub mod export;
pub mod hotreload;

fn main() -> Result<()> {
    // 1. Parser CLI
    let cli = cli::Cli::parse();

    // 2. Initialiser le logging
    env_logger::Builder::new()
        .filter_level(cli.log_level.parse().unwrap_or(log::LevelFilter::Warn))
        .init();

    // 3. Valider les arguments d'export
    cli.validate()?;

    // 4. Charger la config + overrides CLI
    let mut config = resolve_config(&cli)?;
    if let Some(fps) = cli.fps {
        config.target_fps = fps;
        config.clamp_all();
    }

    // Export PNG offline
    if let Some(ref out_dir) = cli.export {
        let job = export::ExportJob {
            out_dir: out_dir.clone(),
            frames: cli.frames,
            width: cli.width,
            height: cli.height,
            density: cli.density,
        };
        export::run_export(&job, &config)?;
        return Ok(());
    }

    let config = Arc::new(ArcSwap::from_pointee(config));

    // 5. Hot-reload config (thread interne notify)
    let (reload_tx, reload_rx) = flume::unbounded();
    let watched = config_path(&cli);
    let _watcher = match hotreload::spawn_config_watcher(&watched, &config, reload_tx) {
        Ok(w) => Some(w),
        Err(e) => {
            log::warn!("Hot-reload indisponible pour {} : {e:#}", watched.display());
            None
        }
    };

    // 6. Initialiser le terminal ratatui
    let terminal = ratatui::init();

    // 7. Boucle principale
    let result = app::App::new(config, Some(reload_rx)).and_then(|mut app| app.run(terminal));

    // 8. Restaurer le terminal (TOUJOURS, même en cas d'erreur)
    ratatui::restore();

    result
}

fn config_path(cli: &cli::Cli) -> PathBuf {
    match cli.preset {
        Some(ref name) => PathBuf::from(format!("config/presets/{name}.toml")),
        None => cli.config.clone(),
    }
}

/// Resolve config: preset takes priority over --config.
fn resolve_config(cli: &cli::Cli) -> Result<RenderConfig> {
    let path = config_path(cli);
    if let Some(ref name) = cli.preset {
        if path.exists() {
            ola_core::config::load_config(&path)
        } else {
            anyhow::bail!("Preset inconnu : {name}. Voir config/presets/ (ex: tide)");
        }
    } else if path.exists() {
        ola_core::config::load_config(&path)
    } else {
        log::warn!(
            "Config introuvable : {}. Utilisation des défauts.",
            path.display()
        );
        Ok(RenderConfig::default())
    }
}
