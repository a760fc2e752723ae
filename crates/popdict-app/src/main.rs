use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use popdict_config::Config;
use tokio::io::BufReader;
use tokio::signal;
use tokio::task::JoinSet;
use tracing_subscriber::EnvFilter;

mod commands;
mod controller;
mod render;


use self::controller::AppController;
use self::render::Renderer;

#[derive(Parser)]
#[command(name = "popdict")]
#[command(about = "Terminal dictionary popover backed by a provider process")]
struct Args {
    /// Word to look up at start-up
    word: Option<String>,

    /// Provider command line, overrides POPDICT_PROVIDER
    #[arg(long)]
    provider: Option<String>,

    /// Settings JSON file, overrides POPDICT_SETTINGS_PATH
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Give up on a lookup after this many milliseconds
    #[arg(long, env = "POPDICT_LOOKUP_TIMEOUT_MS")]
    timeout_ms: Option<u64>,
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let args = Args::parse();
    let runtime = tokio::runtime::Runtime::new()?;
    let result = runtime.block_on(run(args));

    // a pending stdin read holds a blocking thread that cannot be interrupted
    runtime.shutdown_timeout(Duration::from_millis(200));
    result
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if std::env::var("LOG_FORMAT").is_ok_and(|format| format == "json") {
        builder.json().init();
    } else {
        builder.with_ansi(atty::is(atty::Stream::Stderr)).init();
    }
}

fn load_config(args: &Args) -> Config {
    let mut config = Config::new();

    if let Some(provider) = &args.provider {
        config.provider_command = provider.clone();
    }
    if let Some(settings) = &args.settings {
        config.settings_path = Some(settings.clone());
    }
    if args.timeout_ms.is_some() {
        config.lookup_timeout_ms = args.timeout_ms;
    }

    config
}

async fn run(args: Args) -> anyhow::Result<()> {
    let config = load_config(&args);
    tracing::debug!(?config, "Configuration loaded");

    let renderer = Renderer::new(atty::is(atty::Stream::Stdout));
    let controller = AppController::new(config, renderer);

    let mut tasks = JoinSet::new();
    let store = controller.settings_store(&mut tasks).await;
    let (_provider, gateway) = controller.spawn_provider()?;

    let handle = controller.spawn_tasks(
        &mut tasks,
        gateway,
        store,
        BufReader::new(tokio::io::stdin()),
        tokio::io::stdout(),
    );
    if let Some(word) = args.word {
        handle.activate(word).await?;
    }
    drop(handle);

    tokio::select! {
        _ = signal::ctrl_c() => {
            tracing::info!("Shutdown requested");
        }
        Some(result) = tasks.join_next() => {
            match result {
                Ok(Ok(())) => tracing::debug!("Task finished, shutting down"),
                Ok(Err(e)) => tracing::error!("Task failed: {e:#}"),
                Err(e) => tracing::error!("Task panicked: {e}"),
            }
        }
    }

    controller.shutdown();

    // let the popover release its subscription and in-flight work
    let drain = async {
        while let Some(result) = tasks.join_next().await {
            if let Ok(Err(e)) = result {
                tracing::warn!("Task failed during shutdown: {e:#}");
            }
        }
    };
    if tokio::time::timeout(Duration::from_secs(1), drain).await.is_err() {
        tracing::debug!("Tasks still running after shutdown, aborting");
    }

    Ok(())
}
