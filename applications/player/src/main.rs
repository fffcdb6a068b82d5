/// Tagtune - tag-triggered music player and question game
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tagtune_audio_host::{FsTrackSource, SharedGain, SimulatedSpeaker, SymphoniaOpener};
use tagtune_core::{Clock, MonotonicClock, TrackSource};
use tagtune_player::{
    boot,
    controller::{Controller, Devices},
    display::ConsoleDisplay,
    peripherals::ConsolePeripherals,
    DeviceConfig,
};
use tagtune_playback::{playback_core, RenderWorker};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "tagtune")]
#[command(about = "Tag-triggered music player and question game", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the player, reading buttons and tags from stdin
    Run {
        /// Media directory (overrides paths.media_root)
        #[arg(short, long)]
        media: Option<PathBuf>,
        /// Catalog file (overrides paths.catalog)
        #[arg(long)]
        catalog: Option<PathBuf>,
        /// Decode as fast as possible instead of in real time
        #[arg(long)]
        unpaced: bool,
    },
    /// Load a catalog and report what the loader adjusted
    CheckCatalog {
        /// Catalog file path
        path: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tagtune=info,tagtune_player=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            media,
            catalog,
            unpaced,
        } => {
            let mut config = DeviceConfig::load(cli.config.as_deref())?;
            if let Some(media) = media {
                config.paths.media_root = media;
            }
            if let Some(catalog) = catalog {
                config.paths.catalog = catalog;
            }
            config.validate()?;
            run(&config, unpaced)?;
        }
        Commands::CheckCatalog { path } => {
            check_catalog(&path)?;
        }
    }

    Ok(())
}

fn run(config: &DeviceConfig, unpaced: bool) -> anyhow::Result<()> {
    tracing::info!("Starting Tagtune");
    tracing::info!("Media root: {}", config.paths.media_root.display());

    let mut display = ConsoleDisplay::new();
    let fs = FsTrackSource::new(&config.paths.media_root);
    let retry = Duration::from_millis(u64::from(config.timing.storage_retry_ms));
    boot::wait_for_storage(&fs, &mut display, || thread::sleep(retry));

    let loaded = boot::load_catalog_or_empty(&config.catalog_path());
    let catalog = Arc::new(loaded.catalog);
    let settings = boot::open_settings(&config.paths.settings)?;

    // Playback core: control side stays here, worker side goes to its thread
    let gain = SharedGain::default();
    let speaker = if unpaced {
        SimulatedSpeaker::unpaced(gain.clone())
    } else {
        SimulatedSpeaker::new(gain.clone())
    };
    let tracks: Arc<dyn TrackSource> = Arc::new(fs.clone());
    let (control, ports) = playback_core();
    let worker = RenderWorker::new(
        ports,
        Box::new(SymphoniaOpener::new(fs)),
        Arc::clone(&tracks),
        Box::new(speaker),
    )
    .spawn()?;
    tracing::info!("Render worker spawned");

    let console = ConsolePeripherals::from_stdin()?;
    let input_closed = console.closed.clone();
    let devices = Devices {
        scanner: Box::new(console.scanner),
        buttons: Box::new(console.buttons),
        display: Box::new(display),
        output: Box::new(gain),
        settings: Box::new(settings),
        tracks,
    };

    let mut controller =
        Controller::new(catalog, control, devices, config.controller_options());
    let clock = MonotonicClock::new();
    let interval = Duration::from_millis(u64::from(config.timing.loop_interval_ms));

    tracing::info!("Ready: type play/next/prev/up/down/music or a tag uid");
    while !input_closed.is_closed() {
        controller.tick(clock.now_ms());
        thread::sleep(interval);
    }
    // Pick up anything typed right before end of input
    controller.tick(clock.now_ms());

    tracing::info!("Shutting down");
    controller.shutdown();
    worker.shutdown();
    Ok(())
}

fn check_catalog(path: &std::path::Path) -> anyhow::Result<()> {
    let loaded = boot::load_catalog(path)?;
    let report = &loaded.report;
    if report.is_clean() {
        println!("{}: OK", path.display());
    } else {
        println!("{}: {} warnings", path.display(), report.warnings().len());
        for warning in report.warnings() {
            println!("  - {warning}");
        }
    }
    Ok(())
}
