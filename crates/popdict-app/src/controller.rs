use std::process::Stdio;
use std::sync::Arc;

use anyhow::Context;
use kanal::{AsyncReceiver, AsyncSender};
use popdict_config::Config;
use popdict_core::{
    Command, GatewayPlayback, MessageGateway, Notice, Output, Popover, PopoverDeps, PopoverHandle,
    PopoverOptions, View,
};
use popdict_io::{MemorySettingsStore, PipeGateway, SettingsFileSync};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::process::Child;
use tokio::sync::RwLock;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::commands::{self, HELP, Input};
use crate::render::Renderer;

/// Popover -> host channel
pub struct ChannelSet {
    pub popover_to_host: (AsyncSender<Output>, AsyncReceiver<Output>),
}

impl ChannelSet {
    pub fn new(capacity: usize) -> Self {
        Self {
            popover_to_host: kanal::bounded_async(capacity),
        }
    }
}

/// Last view written to the terminal, used to resolve `:play` targets
pub type LastView = Arc<RwLock<Option<View>>>;

/// Application controller for task spawning and lifecycle
pub struct AppController {
    config: Config,
    cancel_token: CancellationToken,
    renderer: Renderer,
    last_view: LastView,
}

impl AppController {
    pub fn new(config: Config, renderer: Renderer) -> Self {
        Self {
            config,
            cancel_token: CancellationToken::new(),
            renderer,
            last_view: Arc::default(),
        }
    }

    /// Start the provider process. Killed when the returned child is dropped.
    pub fn spawn_provider(&self) -> anyhow::Result<(Child, Arc<PipeGateway>)> {
        let mut parts = self.config.provider_command.split_whitespace();
        let program = parts.next().context("provider command is empty")?;

        let mut child = tokio::process::Command::new(program)
            .args(parts)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("starting provider `{}`", self.config.provider_command))?;

        let stdin = child.stdin.take().context("provider stdin not piped")?;
        let stdout = child.stdout.take().context("provider stdout not piped")?;
        tracing::info!("Provider started: {}", self.config.provider_command);

        Ok((child, Arc::new(PipeGateway::new(stdout, stdin))))
    }

    /// Seed the settings store from the settings file and keep it in sync
    pub async fn settings_store(&self, tasks: &mut JoinSet<anyhow::Result<()>>) -> MemorySettingsStore {
        let store = MemorySettingsStore::new();

        let Some(path) = self.config.settings_path.clone() else {
            tracing::info!("No settings file configured, settings stay absent");
            return store;
        };

        let mut sync = SettingsFileSync::new(&path, self.config.settings_key.clone(), store.clone());
        if let Err(e) = sync.sync().await {
            tracing::warn!("Initial settings load failed: {e:#}");
        }

        tasks.spawn(sync.watch(
            self.config.settings_poll_interval(),
            self.cancel_token.child_token(),
        ));

        store
    }

    pub fn spawn_tasks<R, W>(
        &self,
        tasks: &mut JoinSet<anyhow::Result<()>>,
        gateway: Arc<dyn MessageGateway>,
        store: MemorySettingsStore,
        input: R,
        screen: W,
    ) -> PopoverHandle
    where
        R: AsyncBufRead + Send + Unpin + 'static,
        W: AsyncWrite + Send + Unpin + 'static,
    {
        // the popover owns the only sender, so the screen stops once it is gone
        let (output_tx, output_rx) = ChannelSet::new(self.config.output_capacity).popover_to_host;

        let deps = PopoverDeps {
            playback: Arc::new(GatewayPlayback::new(gateway.clone())),
            gateway,
            settings: Arc::new(store),
        };
        let (popover, handle) = Popover::mount(
            deps,
            PopoverOptions::from_config(&self.config),
            output_tx,
            self.cancel_token.child_token(),
        );

        // Popover
        tasks.spawn(async move {
            popover.run().await;
            Ok(())
        });

        // Screen
        tasks.spawn(screen_loop(
            output_rx,
            screen,
            self.renderer,
            self.last_view.clone(),
        ));

        // Keyboard
        tasks.spawn(input_loop(
            input,
            handle.clone(),
            self.last_view.clone(),
            self.cancel_token.child_token(),
        ));

        handle
    }

    pub fn shutdown(&self) {
        self.cancel_token.cancel();
    }
}

/// Print every view and favorite change the popover publishes
pub async fn screen_loop<W>(
    output_rx: AsyncReceiver<Output>,
    mut screen: W,
    renderer: Renderer,
    last_view: LastView,
) -> anyhow::Result<()>
where
    W: AsyncWrite + Unpin,
{
    while let Ok(output) = output_rx.recv().await {
        let text = match output {
            Output::Render(view) => {
                let text = renderer.view(&view);
                *last_view.write().await = Some(view);
                format!("\n{text}\n")
            }
            Output::Notice(Notice::FavoriteChanged(state)) => {
                format!("> {}\n", renderer.favorite_changed(state))
            }
            Output::Notice(Notice::ActionFailed(e)) => {
                // secondary actions fail silently
                tracing::debug!("Action failed: {e}");
                continue;
            }
        };

        screen.write_all(text.as_bytes()).await?;
        screen.flush().await?;
    }

    tracing::debug!("Output channel closed");
    Ok(())
}

/// Turn typed lines into popover commands until `:q`, EOF or cancellation
pub async fn input_loop<R>(
    input: R,
    handle: PopoverHandle,
    last_view: LastView,
    cancel: CancellationToken,
) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();

    loop {
        let line = tokio::select! {
            _ = cancel.cancelled() => break,
            line = lines.next_line() => line?,
        };

        let Some(line) = line else {
            tracing::info!("Input closed");
            handle.send(Command::Close).await?;
            break;
        };

        let command = match commands::parse(&line) {
            Ok(Input::Word(word)) => Command::Activate(word),
            Ok(Input::Favorite) => Command::ToggleFavorite,
            Ok(Input::Examples) => Command::RequestExamples,
            Ok(Input::Play(target)) => {
                let url = last_view
                    .read()
                    .await
                    .as_ref()
                    .and_then(|view| commands::audio_url(view, target));
                match url {
                    Some(url) => Command::PlayAudio(url),
                    None => {
                        eprintln!("No audio there");
                        continue;
                    }
                }
            }
            Ok(Input::Help) => {
                eprintln!("{HELP}");
                continue;
            }
            Ok(Input::Quit) => {
                handle.send(Command::Close).await?;
                break;
            }
            Ok(Input::Blank) => continue,
            Err(e) => {
                eprintln!("{e}");
                continue;
            }
        };

        handle.send(command).await?;
    }

    Ok(())
}
