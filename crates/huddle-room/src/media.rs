//! Audio track, stream, and merged-output model.
//!
//! Tracks behave like browser media track handles: cloning a track yields a
//! second handle onto the same enabled flag, so muting the local capture is
//! visible to every call that was handed the stream.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use huddle_common::{new_short_id, RoomError};

#[derive(Debug, Clone)]
pub struct AudioTrack {
    id: String,
    enabled: Arc<AtomicBool>,
}

impl AudioTrack {
    pub fn new() -> Self {
        Self::with_id(new_short_id())
    }

    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            enabled: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    pub(crate) fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::SeqCst);
    }
}

impl Default for AudioTrack {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for AudioTrack {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for AudioTrack {}

/// A set of audio tracks from one source (local capture or one remote peer).
#[derive(Debug, Clone)]
pub struct MediaStream {
    id: String,
    tracks: Vec<AudioTrack>,
}

impl MediaStream {
    pub fn new(tracks: Vec<AudioTrack>) -> Self {
        Self {
            id: new_short_id(),
            tracks,
        }
    }

    /// Stream with a single fresh audio track.
    pub fn single_track() -> Self {
        Self::new(vec![AudioTrack::new()])
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn audio_tracks(&self) -> &[AudioTrack] {
        &self.tracks
    }
}

/// A remote track and the participant that contributed it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteTrack {
    pub peer_id: String,
    pub track: AudioTrack,
}

/// The single sink every active call's remote audio is played through.
#[derive(Debug, Clone, Default)]
pub struct MergedOutput {
    tracks: Vec<RemoteTrack>,
    muted: bool,
}

impl MergedOutput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `track` for `peer_id`. Returns `false` if the track is already present.
    pub(crate) fn add_track(&mut self, peer_id: &str, track: AudioTrack) -> bool {
        if self.tracks.iter().any(|t| t.track == track) {
            return false;
        }
        self.tracks.push(RemoteTrack {
            peer_id: peer_id.to_string(),
            track,
        });
        true
    }

    /// Removes every track contributed by `peer_id`, leaving other peers untouched.
    pub(crate) fn remove_peer(&mut self, peer_id: &str) -> usize {
        let before = self.tracks.len();
        self.tracks.retain(|t| t.peer_id != peer_id);
        before - self.tracks.len()
    }

    pub(crate) fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    pub fn tracks(&self) -> &[RemoteTrack] {
        &self.tracks
    }

    pub fn tracks_for(&self, peer_id: &str) -> Vec<&AudioTrack> {
        self.tracks
            .iter()
            .filter(|t| t.peer_id == peer_id)
            .map(|t| &t.track)
            .collect()
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}

/// Microphone access, e.g. an OS capture API behind a permission prompt.
#[async_trait]
pub trait MediaCapture: Send + Sync {
    /// Request microphone-only capture. Resolves once access is granted.
    async fn capture_audio(&self) -> Result<MediaStream, RoomError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cloned_track_shares_enabled_flag() {
        let track = AudioTrack::new();
        let handle = track.clone();
        track.set_enabled(false);
        assert!(!handle.is_enabled());
    }

    #[test]
    fn new_track_is_enabled() {
        assert!(AudioTrack::with_id("t1").is_enabled());
    }

    #[test]
    fn merged_output_ignores_duplicate_track() {
        let mut out = MergedOutput::new();
        let track = AudioTrack::with_id("t1");
        assert!(out.add_track("a", track.clone()));
        assert!(!out.add_track("a", track));
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn remove_peer_keeps_other_peers() {
        let mut out = MergedOutput::new();
        out.add_track("a", AudioTrack::with_id("a1"));
        out.add_track("b", AudioTrack::with_id("b1"));
        out.add_track("a", AudioTrack::with_id("a2"));

        assert_eq!(out.remove_peer("a"), 2);
        assert_eq!(out.len(), 1);
        assert_eq!(out.tracks_for("b")[0].id(), "b1");
    }

    #[test]
    fn remove_unknown_peer_is_noop() {
        let mut out = MergedOutput::new();
        out.add_track("a", AudioTrack::with_id("a1"));
        assert_eq!(out.remove_peer("zz"), 0);
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn mute_flag_is_independent_of_tracks() {
        let mut out = MergedOutput::new();
        let track = AudioTrack::with_id("a1");
        out.add_track("a", track.clone());
        out.set_muted(true);
        assert!(out.is_muted());
        assert!(track.is_enabled());
    }

    #[test]
    fn single_track_stream() {
        let stream = MediaStream::single_track();
        assert_eq!(stream.audio_tracks().len(), 1);
        assert_eq!(stream.id().len(), 8);
    }
}
