use std::sync::Arc;

use popdict_types::{Envelope, Request};

use crate::error::GatewayError;

/// Request/response channel to the process that does the actual network work
#[async_trait::async_trait]
pub trait MessageGateway: Send + Sync {
    /// Send a request and wait for its envelope.
    ///
    /// `Err` only for transport problems; a non-200 status is a successful
    /// exchange and comes back as `Ok`.
    async fn send(&self, request: Request) -> Result<Envelope, GatewayError>;
}

/// Something that can play an audio URL
pub trait PlaybackSurface: Send + Sync {
    /// Fire-and-forget, must not block
    fn play(&self, url: &str);
}

/// Playback that forwards the URL to the provider process over the gateway
pub struct GatewayPlayback {
    gateway: Arc<dyn MessageGateway>,
}

impl GatewayPlayback {
    pub fn new(gateway: Arc<dyn MessageGateway>) -> Self {
        Self { gateway }
    }
}

impl PlaybackSurface for GatewayPlayback {
    fn play(&self, url: &str) {
        let gateway = self.gateway.clone();
        let request = Request::ForwardAudio {
            url: url.to_string(),
        };

        tokio::spawn(async move {
            if let Err(e) = gateway.send(request).await {
                tracing::debug!("forward-audio dropped: {e}");
            }
        });
    }
}
