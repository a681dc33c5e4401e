//! One-shot, time-bounded position acquisition.
//!
//! Requests a high-accuracy fix with no cached-position reuse.  The
//! platform is given the timeout in the request; a reactor timer races
//! the query as a backstop so a platform that never answers still
//! settles as [`LocationError::Timeout`].
//!
//! Failure is advisory: the caller records it and the emergency session
//! carries on without a map link.

use core::time::Duration;

use log::{debug, warn};

use crate::app::ports::{LocationPort, Position, PositionFailure, PositionRequest};
use crate::error::LocationError;
use crate::outreach::map_link;

/// A settled, user-presentable fix.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationFix {
    pub latitude: f64,
    pub longitude: f64,
    /// Rounded to the nearest metre.
    pub accuracy_m: u32,
    pub captured_at_ms: u64,
    /// Map URL embedding the raw coordinates.
    pub map_link: String,
}

impl LocationFix {
    pub fn from_position(pos: &Position) -> Self {
        Self {
            latitude: pos.latitude,
            longitude: pos.longitude,
            accuracy_m: pos.accuracy_m.max(0.0).round() as u32,
            captured_at_ms: pos.timestamp_ms,
            map_link: map_link(pos.latitude, pos.longitude),
        }
    }
}

/// Map a platform failure code onto the advisory taxonomy.
pub fn classify_failure(failure: PositionFailure) -> LocationError {
    match failure {
        PositionFailure::PermissionDenied => LocationError::PermissionDenied,
        PositionFailure::PositionUnavailable => LocationError::PositionUnavailable,
        PositionFailure::Timeout => LocationError::Timeout,
        PositionFailure::Unsupported | PositionFailure::Other(_) => LocationError::Unknown,
    }
}

pub struct LocationAcquirer {
    request: PositionRequest,
}

impl LocationAcquirer {
    pub fn new(timeout_ms: u64) -> Self {
        Self {
            request: PositionRequest {
                high_accuracy: true,
                timeout_ms,
                maximum_age_ms: 0,
            },
        }
    }

    /// The options handed to the platform.
    pub fn request(&self) -> PositionRequest {
        self.request
    }

    /// Single attempt, no retry.
    pub async fn acquire(&self, port: &impl LocationPort) -> Result<LocationFix, LocationError> {
        let query = async {
            port.current_position(&self.request)
                .await
                .map_err(classify_failure)
        };
        let deadline = async {
            async_io_mini::Timer::after(Duration::from_millis(self.request.timeout_ms)).await;
            Err(LocationError::Timeout)
        };

        match futures_lite::future::or(query, deadline).await {
            Ok(pos) => {
                let fix = LocationFix::from_position(&pos);
                debug!(
                    "Location fix {:.5},{:.5} ±{}m",
                    fix.latitude, fix.longitude, fix.accuracy_m
                );
                Ok(fix)
            }
            Err(e) => {
                warn!("Location failed: {}", e);
                Err(e)
            }
        }
    }
}
