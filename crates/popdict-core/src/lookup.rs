use std::time::Duration;

use popdict_types::{Envelope, Request, WordEntry};

use crate::error::GatewayError;
use crate::gateway::MessageGateway;

/// What the popover is showing for the current activation.
///
/// `Loading` is the only non-terminal state; the other four stay put until
/// the word changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupState {
    Loading,
    Ready(WordEntry),
    NotFound,
    AuthError,
    GenericError,
}

impl LookupState {
    /// Route a lookup exchange into its terminal state
    pub fn from_response(result: Result<Envelope, GatewayError>) -> Self {
        let envelope = match result {
            Ok(envelope) => envelope,
            Err(e) => {
                tracing::warn!("Lookup transport failure: {e}");
                return LookupState::GenericError;
            }
        };

        match envelope.status {
            200 => match envelope.decode::<WordEntry>() {
                Ok(entry) => LookupState::Ready(entry),
                Err(e) => {
                    tracing::warn!("Lookup payload did not decode: {e}");
                    LookupState::GenericError
                }
            },
            404 => LookupState::NotFound,
            400 | 401 | 403 => LookupState::AuthError,
            status => {
                tracing::warn!("Lookup failed with status {status}");
                LookupState::GenericError
            }
        }
    }

    pub fn entry(&self) -> Option<&WordEntry> {
        match self {
            LookupState::Ready(entry) => Some(entry),
            _ => None,
        }
    }

    pub fn entry_mut(&mut self) -> Option<&mut WordEntry> {
        match self {
            LookupState::Ready(entry) => Some(entry),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, LookupState::Loading)
    }
}

/// Identifies one activation. Completions carry it back so stale ones can be told apart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    generation: u64,
    word: String,
}

impl Ticket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn word(&self) -> &str {
        &self.word
    }
}

/// Drives the primary lookup state machine
pub struct LookupController {
    ticket: Ticket,
    state: LookupState,
}

impl Default for LookupController {
    fn default() -> Self {
        Self::new()
    }
}

impl LookupController {
    pub fn new() -> Self {
        Self {
            ticket: Ticket {
                generation: 0,
                word: String::new(),
            },
            state: LookupState::Loading,
        }
    }

    /// Start a new activation for `word` and reset to `Loading`
    pub fn activate(&mut self, word: String) -> Ticket {
        self.ticket = Ticket {
            generation: self.ticket.generation + 1,
            word,
        };
        self.state = LookupState::Loading;
        self.ticket.clone()
    }

    /// True when `word` is what the current activation is already about
    pub fn is_active_for(&self, word: &str) -> bool {
        self.ticket.generation > 0 && self.ticket.word == word
    }

    pub fn ticket(&self) -> &Ticket {
        &self.ticket
    }

    pub fn is_current(&self, ticket: &Ticket) -> bool {
        self.ticket == *ticket
    }

    /// Apply the result of the lookup issued under `ticket`.
    ///
    /// Returns false, leaving state untouched, when the ticket is stale or the
    /// activation already settled.
    pub fn settle(&mut self, ticket: &Ticket, state: LookupState) -> bool {
        if !self.is_current(ticket) {
            tracing::debug!(
                "Dropping stale lookup for '{}' (generation {}, current {})",
                ticket.word,
                ticket.generation,
                self.ticket.generation
            );
            return false;
        }

        if self.state.is_terminal() {
            return false;
        }

        self.state = state;
        true
    }

    pub fn state(&self) -> &LookupState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut LookupState {
        &mut self.state
    }
}

/// Perform the lookup exchange for `word`
pub async fn fetch(
    gateway: &dyn MessageGateway,
    word: &str,
    timeout: Option<Duration>,
) -> LookupState {
    let request = Request::Lookup {
        word: word.to_string(),
    };

    let exchange = gateway.send(request);
    let result = match timeout {
        Some(limit) => tokio::time::timeout(limit, exchange)
            .await
            .unwrap_or(Err(GatewayError::TimedOut(limit))),
        None => exchange.await,
    };

    tracing::debug!("Lookup '{}' -> {:?}", word, result.as_ref().map(|e| e.status));
    LookupState::from_response(result)
}
