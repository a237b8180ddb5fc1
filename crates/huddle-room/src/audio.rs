//! Local audio capture and mute state.
//!
//! Capture is requested lazily and at most once; the resulting stream is
//! reused for every call. This is the only place track enabled flags and the
//! merged output's mute flag are changed.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use huddle_common::{Event, RoomError};
use tokio::sync::{OnceCell, RwLock};
use tracing::info;

use crate::media::{MediaCapture, MediaStream, MergedOutput};
use crate::notifier::Notifier;

pub struct AudioSession {
    capture: Arc<dyn MediaCapture>,
    local: OnceCell<MediaStream>,
    local_muted: AtomicBool,
    remote_muted: AtomicBool,
    output: Arc<RwLock<MergedOutput>>,
    notifier: Notifier,
}

impl AudioSession {
    pub fn new(
        capture: Arc<dyn MediaCapture>,
        output: Arc<RwLock<MergedOutput>>,
        notifier: Notifier,
    ) -> Self {
        Self {
            capture,
            local: OnceCell::new(),
            local_muted: AtomicBool::new(false),
            remote_muted: AtomicBool::new(false),
            output,
            notifier,
        }
    }

    /// Obtain microphone capture, or return the stream obtained earlier.
    ///
    /// Concurrent callers wait on the same request. A failed request is not
    /// cached, so the next call asks again.
    pub async fn acquire_capture(&self) -> Result<MediaStream, RoomError> {
        let stream = self
            .local
            .get_or_try_init(|| async {
                let stream = self.capture.capture_audio().await?;
                info!(
                    stream_id = stream.id(),
                    tracks = stream.audio_tracks().len(),
                    "Microphone captured"
                );
                Ok::<_, RoomError>(stream)
            })
            .await?;
        Ok(stream.clone())
    }

    /// The captured stream, if capture has completed.
    pub fn local_stream(&self) -> Option<MediaStream> {
        self.local.get().cloned()
    }

    pub fn is_captured(&self) -> bool {
        self.local.initialized()
    }

    /// Flip local mute, keeping every local track's enabled flag in lock-step.
    /// No-op before capture. Returns the resulting mute flag.
    pub fn toggle_local_mute(&self) -> bool {
        let Some(stream) = self.local.get() else {
            return self.local_muted();
        };
        let muted = !self.local_muted.load(Ordering::SeqCst);
        for track in stream.audio_tracks() {
            track.set_enabled(!muted);
        }
        self.local_muted.store(muted, Ordering::SeqCst);
        self.notifier.publish(Event::LocalMuteChanged(muted));
        info!(muted, "Local mute toggled");
        muted
    }

    /// Flip mute on the merged remote output. Returns the resulting flag.
    pub async fn toggle_remote_mute(&self) -> bool {
        let mut output = self.output.write().await;
        let muted = !self.remote_muted.load(Ordering::SeqCst);
        output.set_muted(muted);
        self.remote_muted.store(muted, Ordering::SeqCst);
        drop(output);
        self.notifier.publish(Event::RemoteMuteChanged(muted));
        info!(muted, "Remote mute toggled");
        muted
    }

    pub fn local_muted(&self) -> bool {
        self.local_muted.load(Ordering::SeqCst)
    }

    pub fn remote_muted(&self) -> bool {
        self.remote_muted.load(Ordering::SeqCst)
    }
}
