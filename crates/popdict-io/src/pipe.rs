use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use popdict_core::{GatewayError, MessageGateway};
use popdict_types::{Envelope, Request};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use uuid::Uuid;

/// Requests waiting for a reply. `None` once the read side is gone.
type Pending = Arc<Mutex<Option<HashMap<Uuid, oneshot::Sender<Reply>>>>>;

type Reply = Result<Envelope, GatewayError>;

#[derive(Serialize)]
struct OutboundFrame<'a> {
    #[serde(rename = "correlationId")]
    correlation_id: Uuid,
    #[serde(flatten)]
    request: &'a Request,
}

// The envelope is decoded separately so a bad one still reaches its waiter
#[derive(Deserialize)]
struct InboundFrame {
    #[serde(rename = "correlationId")]
    correlation_id: Uuid,
    #[serde(flatten)]
    rest: Map<String, Value>,
}

/// Removes a request from the pending map when its caller stops waiting
struct PendingGuard<'a> {
    gateway: &'a PipeGateway,
    correlation_id: Uuid,
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.gateway.forget(&self.correlation_id);
    }
}

/// Message gateway speaking JSON lines over a pair of byte streams,
/// typically the stdin/stdout of the provider process.
///
/// Replies may arrive in any order; they are matched to requests by
/// correlation id.
pub struct PipeGateway {
    writer: tokio::sync::Mutex<Box<dyn AsyncWrite + Send + Unpin>>,
    pending: Pending,
    reader: JoinHandle<()>,
}

impl PipeGateway {
    /// Must be called inside a tokio runtime
    pub fn new<R, W>(reader: R, writer: W) -> Self
    where
        R: AsyncRead + Send + Unpin + 'static,
        W: AsyncWrite + Send + Unpin + 'static,
    {
        let pending: Pending = Arc::new(Mutex::new(Some(HashMap::new())));
        let reader = tokio::spawn(read_replies(reader, pending.clone()));

        Self {
            writer: tokio::sync::Mutex::new(Box::new(writer)),
            pending,
            reader,
        }
    }

    fn register(&self, correlation_id: Uuid) -> Result<oneshot::Receiver<Reply>, GatewayError> {
        let (tx, rx) = oneshot::channel();
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        let waiting = pending.as_mut().ok_or(GatewayError::Closed)?;
        waiting.insert(correlation_id, tx);
        Ok(rx)
    }

    fn forget(&self, correlation_id: &Uuid) {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(waiting) = pending.as_mut() {
            waiting.remove(correlation_id);
        }
    }

    #[cfg(test)]
    pub(crate) fn pending_count(&self) -> usize {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map_or(0, HashMap::len)
    }

    async fn write_line(&self, line: &str) -> std::io::Result<()> {
        let mut writer = self.writer.lock().await;
        writer.write_all(line.as_bytes()).await?;
        writer.write_all(b"\n").await?;
        writer.flush().await
    }
}

#[async_trait::async_trait]
impl MessageGateway for PipeGateway {
    async fn send(&self, request: Request) -> Result<Envelope, GatewayError> {
        let correlation_id = Uuid::new_v4();
        let line = serde_json::to_string(&OutboundFrame {
            correlation_id,
            request: &request,
        })?;

        let reply = self.register(correlation_id)?;
        let _guard = PendingGuard {
            gateway: self,
            correlation_id,
        };
        tracing::debug!("-> {} ({correlation_id})", request.kind());

        self.write_line(&line)
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        let envelope = reply.await.map_err(|_| GatewayError::Closed)??;
        tracing::debug!("<- {} {} ({correlation_id})", request.kind(), envelope.status);
        Ok(envelope)
    }
}

impl Drop for PipeGateway {
    fn drop(&mut self) {
        self.reader.abort();
    }
}

async fn read_replies<R>(reader: R, pending: Pending)
where
    R: AsyncRead + Unpin,
{
    let mut lines = BufReader::new(reader).lines();

    loop {
        match lines.next_line().await {
            Ok(Some(line)) => route_reply(&line, &pending),
            Ok(None) => {
                tracing::info!("Provider closed the pipe");
                break;
            }
            Err(e) => {
                tracing::error!("Reading provider replies failed: {e}");
                break;
            }
        }
    }

    // dropping the senders fails every request still waiting
    pending
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .take();
}

fn route_reply(line: &str, pending: &Pending) {
    if line.trim().is_empty() {
        return;
    }

    let frame: InboundFrame = match serde_json::from_str(line) {
        Ok(frame) => frame,
        Err(e) => {
            tracing::warn!("Unreadable provider reply: {e}");
            return;
        }
    };

    let reply = serde_json::from_value::<Envelope>(Value::Object(frame.rest)).map_err(|e| {
        tracing::warn!("Malformed reply for {}: {e}", frame.correlation_id);
        GatewayError::Codec(e)
    });

    let waiter = pending
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .as_mut()
        .and_then(|waiting| waiting.remove(&frame.correlation_id));

    match waiter {
        Some(tx) => {
            // the requester may have given up already
            let _ = tx.send(reply);
        }
        None => tracing::warn!("Reply for unknown request {}", frame.correlation_id),
    }
}
