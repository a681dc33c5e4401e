//! Unified error types for the SafeGuard core.
//!
//! Every subsystem failure is session-scoped and non-fatal: it lands in an
//! advisory field on the orchestrator and the rest of the emergency session
//! carries on.  All variants are `Copy` so they can be stored in the FSM
//! context and cloned into outbound events without allocation.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Every fallible operation in the crate funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Position acquisition failed.
    Location(LocationError),
    /// Evidence capture could not start.
    Recording(RecordingError),
    /// The audio subsystem is missing; the siren is silent.
    Audio(AudioUnavailable),
    /// The persisted profile could not be read or written.
    Profile(ProfileError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Location(e) => write!(f, "location: {e}"),
            Self::Recording(e) => write!(f, "recording: {e}"),
            Self::Audio(e) => write!(f, "audio: {e}"),
            Self::Profile(e) => write!(f, "profile: {e}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Location errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationError {
    /// The user (or OS) refused geolocation access.
    PermissionDenied,
    /// No provider could produce a fix.
    PositionUnavailable,
    /// No fix arrived within the request timeout.
    Timeout,
    /// Any other platform failure, including missing geolocation support.
    Unknown,
}

impl LocationError {
    /// User-facing advisory text.
    pub const fn message(self) -> &'static str {
        match self {
            Self::PermissionDenied => "Location permission denied. Please enable GPS.",
            Self::PositionUnavailable => "Location info unavailable. Check your network/GPS.",
            Self::Timeout => "Location request timed out.",
            Self::Unknown => "Unknown location error",
        }
    }
}

impl fmt::Display for LocationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

impl From<LocationError> for Error {
    fn from(e: LocationError) -> Self {
        Self::Location(e)
    }
}

// ---------------------------------------------------------------------------
// Recording errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordingError {
    /// Camera or microphone access was refused.
    PermissionDenied,
    /// No capture device is present or it is held by another app.
    DeviceUnavailable,
    /// The platform cannot record combined audio/video.
    Unsupported,
}

impl fmt::Display for RecordingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PermissionDenied => write!(f, "capture permission denied"),
            Self::DeviceUnavailable => write!(f, "capture device unavailable"),
            Self::Unsupported => write!(f, "capture unsupported"),
        }
    }
}

impl From<RecordingError> for Error {
    fn from(e: RecordingError) -> Self {
        Self::Recording(e)
    }
}

// ---------------------------------------------------------------------------
// Audio
// ---------------------------------------------------------------------------

/// The oscillator could not be created.  The siren degrades to silence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioUnavailable;

impl fmt::Display for AudioUnavailable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "audio output unavailable")
    }
}

impl From<AudioUnavailable> for Error {
    fn from(e: AudioUnavailable) -> Self {
        Self::Audio(e)
    }
}

// ---------------------------------------------------------------------------
// Profile persistence
// ---------------------------------------------------------------------------

/// Errors from [`ProfileStore`](crate::app::ports::ProfileStore) operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileError {
    /// Stored blob failed deserialization.
    Corrupted,
    /// A field failed range validation.
    ValidationFailed(&'static str),
    /// The backing store refused the write.
    Storage(StorageError),
}

impl fmt::Display for ProfileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Corrupted => write!(f, "profile corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {msg}"),
            Self::Storage(e) => write!(f, "storage: {e}"),
        }
    }
}

impl From<ProfileError> for Error {
    fn from(e: ProfileError) -> Self {
        Self::Profile(e)
    }
}

/// Errors from [`StoragePort`](crate::app::ports::StoragePort) operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageError {
    /// Requested key does not exist.
    NotFound,
    /// Quota exhausted.
    Full,
    /// Generic I/O error.
    IoError,
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "key not found"),
            Self::Full => write!(f, "storage full"),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

impl From<StorageError> for ProfileError {
    fn from(e: StorageError) -> Self {
        Self::Storage(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_messages_are_distinct() {
        let all = [
            LocationError::PermissionDenied,
            LocationError::PositionUnavailable,
            LocationError::Timeout,
            LocationError::Unknown,
        ];
        for (i, a) in all.iter().enumerate() {
            for b in &all[i + 1..] {
                assert_ne!(a.message(), b.message());
            }
        }
    }

    #[test]
    fn top_level_display_prefixes_subsystem() {
        let e: Error = RecordingError::DeviceUnavailable.into();
        assert_eq!(e.to_string(), "recording: capture device unavailable");
        let e: Error = LocationError::Timeout.into();
        assert_eq!(e.to_string(), "location: Location request timed out.");
    }
}
