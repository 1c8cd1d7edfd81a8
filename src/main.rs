use std::io::{self, BufRead};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use sysinfo::System;

use sfx_dispatch::audio_system::{Registry, RodioOutput, SoundEffectName, VirtualOutput};
use sfx_dispatch::config::{LifecycleStrategy, RegistryConfig};
use sfx_dispatch::messaging::{sound_effect_channel, spawn_dispatcher, SoundEffectPort};
use sfx_dispatch::AppResult;

const LOG_TARGET_STARTUP: &str = "sfx_dispatch::startup";

const USAGE: &str = "\
Usage: sfx-dispatch [OPTIONS]

Reads sound effect names from stdin, one per line, and plays them.

Options:
  --config <PATH>        Sound effect config (default: <exe dir>/config/sound_effects.json)
  --strategy <STRATEGY>  ephemeral (overlapping) or pooled (restarting) [default: ephemeral]
  --no-audio             Record playback without opening an audio device
  -h, --help             Print this help";

/// Command-line options
#[derive(Debug, Default, PartialEq, Eq)]
struct Options {
    config_path: Option<PathBuf>,
    strategy: LifecycleStrategy,
    no_audio: bool,
}

/// Parse arguments (without the program name); `None` means help was requested
fn parse_args(args: impl IntoIterator<Item = String>) -> AppResult<Option<Options>> {
    let mut options = Options::default();
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                let path = args.next().context("--config requires a path")?;
                options.config_path = Some(PathBuf::from(path));
            }
            "--strategy" => {
                let value = args.next().context("--strategy requires a value")?;
                options.strategy = value.parse()?;
            }
            "--no-audio" => options.no_audio = true,
            "-h" | "--help" => return Ok(None),
            other => bail!("Unrecognized argument: {}", other),
        }
    }

    Ok(Some(options))
}

/// Initialize tracing with file rotation
///
/// Logs are written to `<config dir>/SfxDispatch/logs/sfx-dispatch.YYYY-MM-DD.log`.
/// Debug builds also log to stderr.
fn initialize_tracing() {
    use tracing_appender::rolling;
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    // Get log directory in user config folder
    // (~/Library/Application Support on macOS, %APPDATA% on Windows, ~/.config on Linux)
    let log_dir = dirs::config_dir()
        .map(|dir| dir.join("SfxDispatch").join("logs"))
        .unwrap_or_else(|| PathBuf::from("logs"));

    // Create log directory if it doesn't exist
    if let Err(e) = std::fs::create_dir_all(&log_dir) {
        eprintln!("Warning: Failed to create log directory: {}", e);
    }

    // Create file appender with daily rotation
    let file_appender = rolling::daily(&log_dir, "sfx-dispatch.log");

    // Configure filter (info level by default)
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    // File layer keeps targets and line numbers for bug reports
    let file_layer = fmt::layer()
        .with_writer(file_appender)
        .with_ansi(false)
        .with_target(true)
        .with_thread_names(true)
        .with_line_number(true);

    // In debug builds, also log to stderr (stdin/stdout belong to the event stream)
    #[cfg(debug_assertions)]
    {
        let console_layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(true)
            .with_target(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(file_layer)
            .with(console_layer)
            .init();
    }

    // In release builds, only log to file
    #[cfg(not(debug_assertions))]
    {
        tracing_subscriber::registry()
            .with(filter)
            .with(file_layer)
            .init();
    }

    tracing::info!("Log directory: {}", log_dir.display());
}

fn log_runtime_environment() {
    let version = env!("CARGO_PKG_VERSION");
    let os_name = System::long_os_version()
        .or_else(System::name)
        .unwrap_or_else(|| "Unknown OS".to_string());
    let kernel = System::kernel_version().unwrap_or_else(|| "Unknown Kernel".to_string());
    let architecture = std::env::consts::ARCH;

    tracing::info!(target: LOG_TARGET_STARTUP, "Starting sfx-dispatch v{} on ({})", version, architecture);
    tracing::info!(target: LOG_TARGET_STARTUP, "Operating System: {} (kernel {})", os_name, kernel);
}

/// Forward stdin lines to the dispatcher until EOF
fn forward_stdin(port: &SoundEffectPort) -> AppResult<usize> {
    let mut forwarded = 0;
    for line in io::stdin().lock().lines() {
        let line = line.context("Failed to read stdin")?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        match line.parse::<SoundEffectName>() {
            Ok(name) => {
                if !port.emit(name) {
                    tracing::error!("Dispatcher stopped; no longer reading sound effects");
                    break;
                }
                forwarded += 1;
            }
            Err(e) => tracing::error!("{}", e),
        }
    }
    Ok(forwarded)
}

fn main() -> AppResult<()> {
    let Some(options) = parse_args(std::env::args().skip(1))? else {
        println!("{}", USAGE);
        return Ok(());
    };

    initialize_tracing();
    log_runtime_environment();

    let config_path = match options.config_path {
        Some(path) => path,
        None => RegistryConfig::default_path()?,
    };
    let config = RegistryConfig::load_or_create(&config_path)
        .with_context(|| format!("Failed to read sound effects from {}", config_path.display()))?;

    tracing::info!(
        target: LOG_TARGET_STARTUP,
        "Lifecycle strategy: {} ({} sound effects)",
        options.strategy,
        config.len()
    );
    let registry = Arc::new(Registry::initialize_degraded(&config, options.strategy));
    let names: Vec<&str> = registry.names().iter().map(|name| name.as_str()).collect();
    tracing::info!(target: LOG_TARGET_STARTUP, "Registered: {}", names.join(", "));

    let (port, events) = sound_effect_channel();
    let dispatch = if options.no_audio {
        spawn_dispatcher(registry, events, || Ok(VirtualOutput::new()))?
    } else {
        spawn_dispatcher(registry, events, RodioOutput::new)?
    };

    let forwarded = forward_stdin(&port)?;
    drop(port);

    let stats = dispatch.join()?;
    tracing::info!(
        "Forwarded {} sound effects: {} started, {} restarted, {} muted, {} unknown, {} load failures",
        forwarded,
        stats.started,
        stats.restarted,
        stats.muted,
        stats.unknown,
        stats.load_failures
    );
    Ok(())
}
