use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use kanal::{AsyncReceiver, AsyncSender};
use popdict_config::links::Links;
use popdict_config::settings::SETTINGS_KEY;
use popdict_config::{Config, DisplaySettings};
use popdict_types::{ExampleSentence, SavedState};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::audio::AudioDispatcher;
use crate::error::{ActionError, SettingsError};
use crate::examples::{self, ExampleLoader};
use crate::favorite::{self, MutateThenFlip};
use crate::gateway::{MessageGateway, PlaybackSurface};
use crate::lookup::{self, LookupController, LookupState, Ticket};
use crate::preprocess::{Preprocessor, WordPreprocessor};
use crate::settings::{SettingsReader, SettingsStore};
use crate::view::{self, View, ViewInput};

/// User-initiated actions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Show the popover for a word; a different word resets everything
    Activate(String),
    ToggleFavorite,
    RequestExamples,
    PlayAudio(String),
    Close,
}

/// Side-channel messages for the host
#[derive(Debug)]
pub enum Notice {
    /// Favorite toggle succeeded, carrying the new local state
    FavoriteChanged(SavedState),
    /// A secondary action failed; the view does not show it
    ActionFailed(ActionError),
}

#[derive(Debug)]
pub enum Output {
    Render(View),
    Notice(Notice),
}

pub(crate) enum Event {
    Command(Command),
    SettingsLoaded(Result<Option<DisplaySettings>, SettingsError>),
    SettingsChanged(Option<DisplaySettings>),
    LookupSettled {
        ticket: Ticket,
        state: LookupState,
    },
    ExamplesSettled {
        ticket: Ticket,
        result: Result<Vec<ExampleSentence>, ActionError>,
    },
    FavoriteSettled {
        ticket: Ticket,
        mutation: MutateThenFlip<SavedState>,
        result: Result<(), ActionError>,
    },
}

/// External collaborators of a popover
pub struct PopoverDeps {
    pub gateway: Arc<dyn MessageGateway>,
    pub settings: Arc<dyn SettingsStore>,
    pub playback: Arc<dyn PlaybackSurface>,
}

#[derive(Debug, Clone)]
pub struct PopoverOptions {
    pub settings_key: String,
    pub links: Links,
    pub lookup_timeout: Option<Duration>,
}

impl Default for PopoverOptions {
    fn default() -> Self {
        Self {
            settings_key: SETTINGS_KEY.to_string(),
            links: Links::default(),
            lookup_timeout: None,
        }
    }
}

impl PopoverOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            settings_key: config.settings_key.clone(),
            links: config.links.clone(),
            lookup_timeout: config.lookup_timeout(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Popover closed")]
pub struct PopoverClosed;

/// Sending side for [`Command`]s
#[derive(Clone)]
pub struct PopoverHandle {
    tx: AsyncSender<Event>,
}

impl PopoverHandle {
    pub async fn send(&self, command: Command) -> Result<(), PopoverClosed> {
        self.tx
            .send(Event::Command(command))
            .await
            .map_err(|_| PopoverClosed)
    }

    pub async fn activate(&self, word: impl Into<String>) -> Result<(), PopoverClosed> {
        self.send(Command::Activate(word.into())).await
    }
}

enum Flow {
    Render,
    Quiet,
    Stop,
}

impl Flow {
    fn render_if(changed: bool) -> Self {
        if changed { Flow::Render } else { Flow::Quiet }
    }
}

/// One popover instance.
///
/// All state lives here and is only touched from [`Popover::step`], one
/// event at a time. Requests run on spawned tasks and come back as events
/// tagged with the activation they belong to.
pub struct Popover {
    gateway: Arc<dyn MessageGateway>,
    options: PopoverOptions,

    lookup: LookupController,
    settings: SettingsReader,
    audio: AudioDispatcher,
    examples: ExampleLoader,

    events_tx: AsyncSender<Event>,
    events_rx: AsyncReceiver<Event>,
    output: AsyncSender<Output>,
    notices: Vec<Notice>,
    tasks: JoinSet<()>,
    cancel: CancellationToken,
}

impl Popover {
    /// Build the popover, subscribe to settings and start the initial settings read.
    ///
    /// Must be called inside a tokio runtime.
    pub fn mount(
        deps: PopoverDeps,
        options: PopoverOptions,
        output: AsyncSender<Output>,
        cancel: CancellationToken,
    ) -> (Self, PopoverHandle) {
        let (events_tx, events_rx) = kanal::unbounded_async();

        let mut popover = Self {
            gateway: deps.gateway,
            options,
            lookup: LookupController::new(),
            settings: SettingsReader::new(),
            audio: AudioDispatcher::new(deps.playback),
            examples: ExampleLoader::new(),
            events_tx: events_tx.clone(),
            events_rx,
            output,
            notices: Vec::new(),
            tasks: JoinSet::new(),
            cancel,
        };
        popover.mount_settings(deps.settings);

        (popover, PopoverHandle { tx: events_tx })
    }

    fn mount_settings(&mut self, store: Arc<dyn SettingsStore>) {
        let key = self.options.settings_key.clone();

        let tx = self.events_tx.clone();
        let subscription = store.subscribe(
            &key,
            Box::new(move |value| {
                if let Err(e) = tx.try_send(Event::SettingsChanged(value)) {
                    tracing::debug!("Settings change after teardown: {e}");
                }
            }),
        );
        self.settings.attach(subscription);

        self.spawn(async move { Event::SettingsLoaded(store.get(&key).await) });
    }

    /// Process events until closed, cancelled or the host stops listening
    pub async fn run(mut self) {
        tracing::info!("Popover mounted");

        if self.output.send(Output::Render(self.view())).await.is_ok() {
            while self.step().await {}
        }

        self.teardown();
    }

    /// Wait for one event and apply it. Returns false once the popover should stop.
    pub async fn step(&mut self) -> bool {
        let event = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => {
                tracing::info!("Popover cancelled");
                return false;
            }
            event = self.events_rx.recv() => match event {
                Ok(event) => event,
                Err(_) => return false,
            },
        };

        let flow = self.handle(event);
        if let Flow::Stop = flow {
            return false;
        }

        // reap finished request tasks
        while self.tasks.try_join_next().is_some() {}

        if !self.flush(flow).await {
            tracing::info!("Output channel closed");
            return false;
        }
        true
    }

    pub fn lookup_state(&self) -> &LookupState {
        self.lookup.state()
    }

    pub fn settings(&self) -> Option<&DisplaySettings> {
        self.settings.current()
    }

    pub fn examples(&self) -> Option<&[ExampleSentence]> {
        self.examples.examples()
    }

    pub fn view(&self) -> View {
        let settings = self.settings.current();
        view::project(&ViewInput {
            lookup: self.lookup.state(),
            examples: self.examples.examples(),
            settings,
            example_trigger: self.examples.offers_trigger(settings),
            links: &self.options.links,
        })
    }

    fn handle(&mut self, event: Event) -> Flow {
        match event {
            Event::Command(command) => self.handle_command(command),
            Event::SettingsLoaded(result) => Flow::render_if(self.settings.on_loaded(result)),
            Event::SettingsChanged(value) => Flow::render_if(self.settings.on_changed(value)),
            Event::LookupSettled { ticket, state } => self.on_lookup_settled(ticket, state),
            Event::ExamplesSettled { ticket, result } => self.on_examples_settled(ticket, result),
            Event::FavoriteSettled {
                ticket,
                mutation,
                result,
            } => self.on_favorite_settled(ticket, mutation, result),
        }
    }

    fn handle_command(&mut self, command: Command) -> Flow {
        tracing::debug!("Command: {:?}", command);
        match command {
            Command::Activate(word) => self.activate(word),
            Command::ToggleFavorite => self.toggle_favorite(),
            Command::RequestExamples => self.load_examples(),
            Command::PlayAudio(url) => {
                self.audio.play(&url);
                Flow::Quiet
            }
            Command::Close => Flow::Stop,
        }
    }

    fn activate(&mut self, word: String) -> Flow {
        let word = WordPreprocessor.process(&word);
        if self.lookup.is_active_for(&word) {
            tracing::debug!("'{word}' is already shown");
            return Flow::Quiet;
        }

        let ticket = self.lookup.activate(word.clone());
        self.audio.rearm();
        self.examples.reset();
        tracing::info!("Lookup '{}' (activation {})", word, ticket.generation());

        if word.is_empty() {
            self.lookup.settle(&ticket, LookupState::NotFound);
            return Flow::Render;
        }

        let gateway = self.gateway.clone();
        let timeout = self.options.lookup_timeout;
        self.spawn(async move {
            let state = lookup::fetch(gateway.as_ref(), &word, timeout).await;
            Event::LookupSettled { ticket, state }
        });

        Flow::Render
    }

    fn on_lookup_settled(&mut self, ticket: Ticket, state: LookupState) -> Flow {
        if !self.lookup.settle(&ticket, state) {
            return Flow::Quiet;
        }

        let settings = self.settings.current().cloned();
        if let Some(entry) = self.lookup.state().entry() {
            self.audio.autoplay(entry, settings.as_ref());

            if ExampleLoader::auto_fetch(settings.as_ref()) {
                self.load_examples();
            }
        }

        Flow::Render
    }

    fn load_examples(&mut self) -> Flow {
        let Some(entry) = self.lookup.state().entry() else {
            tracing::debug!("Examples requested before an entry loaded");
            return Flow::Quiet;
        };
        let Some(id) = self.examples.begin(entry) else {
            return Flow::Quiet;
        };

        tracing::debug!("Fetching examples for {id}");
        let ticket = self.lookup.ticket().clone();
        let gateway = self.gateway.clone();
        self.spawn(async move {
            let result = examples::fetch(gateway.as_ref(), id).await;
            Event::ExamplesSettled { ticket, result }
        });

        Flow::Render
    }

    fn on_examples_settled(
        &mut self,
        ticket: Ticket,
        result: Result<Vec<ExampleSentence>, ActionError>,
    ) -> Flow {
        if !self.lookup.is_current(&ticket) {
            tracing::debug!("Dropping examples for stale '{}'", ticket.word());
            return Flow::Quiet;
        }

        if let Err(e) = self.examples.settle(result) {
            self.notices.push(Notice::ActionFailed(e));
        }
        Flow::Render
    }

    fn toggle_favorite(&mut self) -> Flow {
        let Some(entry) = self.lookup.state().entry() else {
            return Flow::Quiet;
        };
        let mutation = match favorite::prepare(entry) {
            Ok(mutation) => mutation,
            Err(e) => {
                tracing::debug!("Favorite toggle skipped: {e}");
                return Flow::Quiet;
            }
        };

        let ticket = self.lookup.ticket().clone();
        let gateway = self.gateway.clone();
        self.spawn(async move {
            let result = mutation.send(gateway.as_ref()).await;
            Event::FavoriteSettled {
                ticket,
                mutation,
                result,
            }
        });

        Flow::Quiet
    }

    fn on_favorite_settled(
        &mut self,
        ticket: Ticket,
        mutation: MutateThenFlip<SavedState>,
        result: Result<(), ActionError>,
    ) -> Flow {
        if !self.lookup.is_current(&ticket) {
            return Flow::Quiet;
        }

        if let Err(e) = result {
            tracing::debug!("Favorite toggle failed: {e}");
            self.notices.push(Notice::ActionFailed(e));
            return Flow::Quiet;
        }

        let Some(entry) = self.lookup.state_mut().entry_mut() else {
            return Flow::Quiet;
        };
        mutation.apply(&mut entry.saved_state);
        let saved_state = entry.saved_state;

        tracing::info!("Favorite toggled, now {:?}", saved_state);
        self.notices.push(Notice::FavoriteChanged(saved_state));
        Flow::Render
    }

    fn spawn<F>(&mut self, work: F)
    where
        F: Future<Output = Event> + Send + 'static,
    {
        let tx = self.events_tx.clone();
        self.tasks.spawn(async move {
            let event = work.await;
            if tx.send(event).await.is_err() {
                tracing::debug!("Completion arrived after teardown");
            }
        });
    }

    async fn flush(&mut self, flow: Flow) -> bool {
        if let Flow::Render = flow
            && self.output.send(Output::Render(self.view())).await.is_err()
        {
            return false;
        }

        for notice in std::mem::take(&mut self.notices) {
            if self.output.send(Output::Notice(notice)).await.is_err() {
                return false;
            }
        }
        true
    }

    fn teardown(&mut self) {
        self.settings.release();
        self.tasks.abort_all();
        tracing::info!("Popover torn down");
    }
}
