//! Seam to the peer-to-peer negotiation stack.
//!
//! The stack (offer/answer, ICE, media transport) lives outside this crate.
//! Instead of registering callbacks, it hands results back through channels:
//! a [`CallHandle`] resolves once with the remote stream, and inbound calls
//! arrive as [`IncomingCall`] values on an `mpsc` queue.

use async_trait::async_trait;
use huddle_common::RoomError;
use tokio::sync::oneshot;

use crate::media::MediaStream;

#[async_trait]
pub trait Negotiator: Send + Sync {
    /// Start an outbound call to `peer_id`, offering `local`.
    async fn call(&self, peer_id: &str, local: &MediaStream) -> Result<CallHandle, RoomError>;
}

/// A call in progress. Resolves once, when the remote stream arrives.
#[derive(Debug)]
pub struct CallHandle {
    peer_id: String,
    stream_rx: oneshot::Receiver<MediaStream>,
}

impl CallHandle {
    pub fn new(peer_id: impl Into<String>, stream_rx: oneshot::Receiver<MediaStream>) -> Self {
        Self {
            peer_id: peer_id.into(),
            stream_rx,
        }
    }

    /// A handle plus the sender the negotiation stack fires on stream arrival.
    pub fn pair(peer_id: impl Into<String>) -> (Self, oneshot::Sender<MediaStream>) {
        let (tx, rx) = oneshot::channel();
        (Self::new(peer_id, rx), tx)
    }

    pub fn peer_id(&self) -> &str {
        &self.peer_id
    }

    /// Wait for the remote stream. `None` if the stack gave up on the call.
    pub async fn remote_stream(self) -> Option<MediaStream> {
        self.stream_rx.await.ok()
    }
}

/// An inbound call waiting to be answered.
#[derive(Debug)]
pub struct IncomingCall {
    peer_id: String,
    answer_tx: oneshot::Sender<MediaStream>,
    stream_rx: oneshot::Receiver<MediaStream>,
}

impl IncomingCall {
    pub fn new(
        peer_id: impl Into<String>,
        answer_tx: oneshot::Sender<MediaStream>,
        stream_rx: oneshot::Receiver<MediaStream>,
    ) -> Self {
        Self {
            peer_id: peer_id.into(),
            answer_tx,
            stream_rx,
        }
    }

    pub fn peer_id(&self) -> &str {
        &self.peer_id
    }

    /// Answer with the local stream. Synchronous: the stack picks the answer
    /// up from the channel.
    pub fn answer(self, local: &MediaStream) -> CallHandle {
        if self.answer_tx.send(local.clone()).is_err() {
            tracing::debug!(peer_id = %self.peer_id, "caller hung up before answer");
        }
        CallHandle::new(self.peer_id, self.stream_rx)
    }
}
