//! Rendering session identity
//!
//! A session is created once per rendering window and handed to whatever
//! needs to know when it started. There is no global session state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::utils::time::elapsed_millis;

/// Identity and start time of a rendering session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionInfo {
    /// Free-form label, e.g. the name of the screen being rendered
    pub label: String,

    /// When the session started
    pub started_at: DateTime<Utc>,
}

impl SessionInfo {
    /// Start a new session now
    pub fn start(label: impl Into<String>) -> Self {
        Self::with_start(label, Utc::now())
    }

    /// Session with an explicit start time
    pub fn with_start(label: impl Into<String>, started_at: DateTime<Utc>) -> Self {
        Self {
            label: label.into(),
            started_at,
        }
    }

    /// Session start as milliseconds since UNIX epoch
    pub fn timestamp_millis(&self) -> i64 {
        self.started_at.timestamp_millis()
    }

    /// Milliseconds from session start to `now`
    pub fn uptime_millis(&self, now: DateTime<Utc>) -> u64 {
        elapsed_millis(self.started_at, now)
    }
}

impl Default for SessionInfo {
    fn default() -> Self {
        Self::start("default")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn test_uptime() {
        let start = Utc.timestamp_millis_opt(1_700_000_000_000).unwrap();
        let session = SessionInfo::with_start("basic-globe", start);
        assert_eq!(session.timestamp_millis(), 1_700_000_000_000);
        assert_eq!(session.uptime_millis(start + Duration::seconds(3)), 3000);
    }
}
