//! Evidence recorder and the in-memory evidence vault.
//!
//! ## Recorder lifecycle
//!
//! ```text
//!            begin(s)              opened(s, Ok)
//!   IDLE ─────────────▶ OPENING ─────────────────▶ RECORDING
//!    ▲                    │  opened(s, Err)            │
//!    │◀───────────────────┘  finish()                  │ collect() drains
//!    │◀────────────────────────────────────────────────┘ finish() → artifact
//! ```
//!
//! The recorder never awaits anything itself.  The runtime opens the capture
//! device in a task and hands the result back through [`EvidenceRecorder::opened`],
//! tagged with the session that asked for it.  A stream arriving for a session
//! that is no longer opening is released on the spot.

use std::collections::VecDeque;

use chrono::{DateTime, SecondsFormat, Utc};
use log::{debug, info, warn};

use crate::app::ports::CaptureStream;
use crate::error::RecordingError;

// ───────────────────────────────────────────────────────────────
// Artifact
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvidenceKind {
    Video,
    Audio,
}

/// Finalised capture.  Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvidenceArtifact {
    pub id: String,
    /// Wall-clock epoch milliseconds at stop.
    pub captured_at_ms: u64,
    pub media: Vec<u8>,
    pub kind: EvidenceKind,
}

// ───────────────────────────────────────────────────────────────
// Recorder
// ───────────────────────────────────────────────────────────────

enum Phase<S> {
    Idle,
    Opening { session: u32 },
    Recording { session: u32, stream: S, buffer: Vec<u8> },
}

/// What became of a capture-open result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenOutcome {
    /// Capture is live.
    Started { has_video: bool },
    /// The device refused; recorder is idle again.
    Failed(RecordingError),
    /// Result belonged to an abandoned request.
    Discarded,
}

pub struct EvidenceRecorder<S: CaptureStream> {
    phase: Phase<S>,
}

impl<S: CaptureStream> EvidenceRecorder<S> {
    pub fn new() -> Self {
        Self { phase: Phase::Idle }
    }

    /// Claim the recorder for `session`.  Returns `false` (and changes
    /// nothing) if a capture is already opening or running.
    pub fn begin(&mut self, session: u32) -> bool {
        match self.phase {
            Phase::Idle => {
                self.phase = Phase::Opening { session };
                debug!("Recorder opening capture for session {}", session);
                true
            }
            _ => {
                debug!("Recorder busy, start ignored");
                false
            }
        }
    }

    /// Feed back the result of the device open requested by [`begin`](Self::begin).
    pub fn opened(&mut self, session: u32, result: Result<S, RecordingError>) -> OpenOutcome {
        let pending = matches!(self.phase, Phase::Opening { session: s } if s == session);
        match (pending, result) {
            (true, Ok(stream)) => {
                let has_video = stream.has_video();
                self.phase = Phase::Recording {
                    session,
                    stream,
                    buffer: Vec::new(),
                };
                info!("Recording started (video={})", has_video);
                OpenOutcome::Started { has_video }
            }
            (true, Err(e)) => {
                self.phase = Phase::Idle;
                warn!("Recording failed: {}", e);
                OpenOutcome::Failed(e)
            }
            (false, Ok(mut stream)) => {
                stream.release();
                debug!("Late capture stream for session {} released", session);
                OpenOutcome::Discarded
            }
            (false, Err(_)) => OpenOutcome::Discarded,
        }
    }

    /// Drain accumulated media into the buffer.  Returns bytes moved.
    pub fn collect(&mut self) -> usize {
        if let Phase::Recording { stream, buffer, .. } = &mut self.phase {
            let chunk = stream.take_data();
            buffer.extend_from_slice(&chunk);
            chunk.len()
        } else {
            0
        }
    }

    /// Stop capturing.  Produces an artifact only if a capture was running;
    /// an open still in flight is abandoned.
    pub fn finish(&mut self, captured_at_ms: u64) -> Option<EvidenceArtifact> {
        match core::mem::replace(&mut self.phase, Phase::Idle) {
            Phase::Recording {
                mut stream,
                mut buffer,
                ..
            } => {
                buffer.extend_from_slice(&stream.take_data());
                let kind = if stream.has_video() {
                    EvidenceKind::Video
                } else {
                    EvidenceKind::Audio
                };
                stream.release();
                info!("Recording stopped: {} bytes ({:?})", buffer.len(), kind);
                Some(EvidenceArtifact {
                    id: captured_at_ms.to_string(),
                    captured_at_ms,
                    media: buffer,
                    kind,
                })
            }
            Phase::Opening { session } => {
                debug!("Recorder stop abandoned pending open for session {}", session);
                None
            }
            Phase::Idle => None,
        }
    }

    pub fn is_recording(&self) -> bool {
        matches!(self.phase, Phase::Recording { .. })
    }

    /// Opening or recording.
    pub fn is_busy(&self) -> bool {
        !matches!(self.phase, Phase::Idle)
    }

    /// Session currently holding the recorder.
    pub fn session(&self) -> Option<u32> {
        match self.phase {
            Phase::Idle => None,
            Phase::Opening { session } | Phase::Recording { session, .. } => Some(session),
        }
    }
}

impl<S: CaptureStream> Default for EvidenceRecorder<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: CaptureStream> Drop for EvidenceRecorder<S> {
    fn drop(&mut self) {
        if let Phase::Recording { stream, .. } = &mut self.phase {
            stream.release();
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Vault
// ───────────────────────────────────────────────────────────────

/// App-lifetime evidence collection, most recent first.
#[derive(Debug, Default)]
pub struct EvidenceVault {
    items: VecDeque<EvidenceArtifact>,
}

impl EvidenceVault {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert at the front.  Colliding ids get a `_` suffix.
    pub fn push(&mut self, mut artifact: EvidenceArtifact) -> &EvidenceArtifact {
        while self.items.iter().any(|a| a.id == artifact.id) {
            artifact.id.push('_');
        }
        self.items.push_front(artifact);
        &self.items[0]
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &EvidenceArtifact> {
        self.items.iter()
    }

    pub fn latest(&self) -> Option<&EvidenceArtifact> {
        self.items.front()
    }

    pub fn get(&self, id: &str) -> Option<&EvidenceArtifact> {
        self.items.iter().find(|a| a.id == id)
    }

    /// Explicit user deletion.
    pub fn remove(&mut self, id: &str) -> Option<EvidenceArtifact> {
        let idx = self.items.iter().position(|a| a.id == id)?;
        self.items.remove(idx)
    }
}

/// `SafeGuard_Evidence_<ISO-8601 UTC>.webm`
pub fn export_file_name(artifact: &EvidenceArtifact) -> String {
    let stamp = i64::try_from(artifact.captured_at_ms)
        .ok()
        .and_then(DateTime::<Utc>::from_timestamp_millis)
        .map(|t| t.to_rfc3339_opts(SecondsFormat::Millis, true))
        .unwrap_or_else(|| artifact.captured_at_ms.to_string());
    format!("SafeGuard_Evidence_{}.webm", stamp)
}
