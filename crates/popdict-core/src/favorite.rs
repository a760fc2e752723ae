use std::fmt;

use popdict_types::{Request, SavedState, WordEntry};

use crate::error::ActionError;
use crate::gateway::MessageGateway;

/// A mutation whose local effect is applied on success without re-reading
/// the server's view of the result.
///
/// Local state can drift from the server (two tabs toggling the same word);
/// nothing here reconciles that.
pub struct MutateThenFlip<T> {
    request: Request,
    transform: fn(&T) -> T,
}

impl<T> MutateThenFlip<T> {
    pub fn new(request: Request, transform: fn(&T) -> T) -> Self {
        Self { request, transform }
    }

    pub fn request(&self) -> &Request {
        &self.request
    }

    /// Send the mutation. Anything but a 200 is an error.
    pub async fn send(&self, gateway: &dyn MessageGateway) -> Result<(), ActionError> {
        let envelope = gateway.send(self.request.clone()).await?;
        if envelope.is_ok() {
            Ok(())
        } else {
            Err(ActionError::Rejected {
                action: self.request.kind(),
                status: envelope.status,
            })
        }
    }

    /// Apply the local transform to `target`
    pub fn apply(&self, target: &mut T) {
        *target = (self.transform)(target);
    }
}

impl<T> fmt::Debug for MutateThenFlip<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MutateThenFlip")
            .field("request", &self.request)
            .finish_non_exhaustive()
    }
}

/// Build the add-or-forget mutation for `entry`, refusing when the entry
/// lacks an id or content, or its saved state is unknown.
pub fn prepare(entry: &WordEntry) -> Result<MutateThenFlip<SavedState>, ActionError> {
    if !entry.saved_state.is_known() {
        return Err(ActionError::SavedStateUnknown);
    }
    let word_id = entry.id.clone().ok_or(ActionError::MissingId)?;
    let word = entry.word().ok_or(ActionError::MissingContent)?.to_string();

    Ok(MutateThenFlip::new(
        Request::AddOrForget { word, word_id },
        SavedState::flipped,
    ))
}
