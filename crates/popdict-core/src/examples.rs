use popdict_config::DisplaySettings;
use popdict_types::{EntryId, ExampleSentence, Request, WordEntry};

use crate::error::ActionError;
use crate::gateway::MessageGateway;

/// Lazily fetched example sentences for the current entry
#[derive(Debug, Default)]
pub struct ExampleLoader {
    examples: Option<Vec<ExampleSentence>>,
    in_flight: bool,
    attempts: u32,
}

impl ExampleLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether examples should be requested as soon as an entry is ready.
    /// Absent settings count as "yes".
    pub fn auto_fetch(settings: Option<&DisplaySettings>) -> bool {
        !settings.is_some_and(|s| s.show_example_affordance)
    }

    /// Forget everything, a new activation started
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Claim the fetch for `entry`.
    ///
    /// Returns the id to request, or None when the entry has no id, a fetch
    /// is already running, or examples are already stored.
    pub fn begin(&mut self, entry: &WordEntry) -> Option<EntryId> {
        if self.in_flight || self.examples.is_some() {
            return None;
        }
        let id = entry.id.clone()?;
        self.in_flight = true;
        self.attempts += 1;
        Some(id)
    }

    /// Apply a fetch result, handing a failure back to the caller.
    ///
    /// An empty list leaves examples absent, indistinguishable from a failure
    /// in the view.
    pub fn settle(
        &mut self,
        result: Result<Vec<ExampleSentence>, ActionError>,
    ) -> Result<(), ActionError> {
        self.in_flight = false;

        let examples = result?;
        if examples.is_empty() {
            tracing::debug!("Provider returned no examples");
        } else {
            tracing::debug!("Stored {} examples", examples.len());
            self.examples = Some(examples);
        }
        Ok(())
    }

    pub fn examples(&self) -> Option<&[ExampleSentence]> {
        self.examples.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight
    }

    /// Whether a manual "show examples" trigger should be offered
    pub fn offers_trigger(&self, settings: Option<&DisplaySettings>) -> bool {
        if self.examples.is_some() || self.in_flight {
            return false;
        }
        !Self::auto_fetch(settings) || self.attempts > 0
    }
}

/// Request the examples for `id`, normalizing their markup
pub async fn fetch(
    gateway: &dyn MessageGateway,
    id: EntryId,
) -> Result<Vec<ExampleSentence>, ActionError> {
    let request = Request::GetWordExample { id };
    let action = request.kind();
    let envelope = gateway.send(request).await?;

    if !envelope.is_ok() {
        return Err(ActionError::Rejected {
            action,
            status: envelope.status,
        });
    }

    let examples: Vec<ExampleSentence> = envelope
        .decode()
        .map_err(|source| ActionError::Malformed { action, source })?;

    Ok(examples
        .into_iter()
        .map(ExampleSentence::normalized)
        .collect())
}
