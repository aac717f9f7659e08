//! Timing windows that drive context resolution and hysteresis.

use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};

/// Default lookahead for upcoming meetings.
pub const DEFAULT_PREP_WINDOW_MINUTES: u32 = 45;

/// Default lookback for recently ended meetings.
pub const DEFAULT_SYNTHESIS_WINDOW_MINUTES: u32 = 60;

/// Default slack around a meeting's start and end.
pub const DEFAULT_MEETING_GRACE_MINUTES: u32 = 2;

/// Default minimum time between two committed switches.
pub const DEFAULT_MINIMUM_HOLD_MS: u64 = 5_000;

const MS_PER_MINUTE: i64 = 60_000;

/// Immutable timing configuration, one per engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimingConfig {
    /// How far ahead an upcoming meeting triggers prep.
    #[serde(default = "default_prep_window")]
    pub prep_window_minutes: u32,

    /// How long after a meeting ends synthesis stays relevant.
    #[serde(default = "default_synthesis_window")]
    pub synthesis_window_minutes: u32,

    /// Slack on both edges of a meeting that still counts as live.
    /// Absorbs clock skew and polling jitter.
    #[serde(default = "default_meeting_grace")]
    pub meeting_grace_minutes: u32,

    /// Hysteresis: minimum dwell after a committed switch.
    #[serde(default = "default_minimum_hold")]
    pub minimum_hold_ms: u64,
}

fn default_prep_window() -> u32 {
    DEFAULT_PREP_WINDOW_MINUTES
}
fn default_synthesis_window() -> u32 {
    DEFAULT_SYNTHESIS_WINDOW_MINUTES
}
fn default_meeting_grace() -> u32 {
    DEFAULT_MEETING_GRACE_MINUTES
}
fn default_minimum_hold() -> u64 {
    DEFAULT_MINIMUM_HOLD_MS
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            prep_window_minutes: DEFAULT_PREP_WINDOW_MINUTES,
            synthesis_window_minutes: DEFAULT_SYNTHESIS_WINDOW_MINUTES,
            meeting_grace_minutes: DEFAULT_MEETING_GRACE_MINUTES,
            minimum_hold_ms: DEFAULT_MINIMUM_HOLD_MS,
        }
    }
}

impl TimingConfig {
    /// Parse a JSON document and validate it. Missing fields take defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: TimingConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations whose windows make slots unreachable.
    ///
    /// The grace period must be strictly shorter than both the prep and the
    /// synthesis windows, otherwise "current" swallows the whole window.
    pub fn validate(&self) -> Result<()> {
        if self.prep_window_minutes == 0 {
            return Err(ConfigError::InvalidValue {
                field: "prepWindowMinutes",
                message: "must be at least 1 minute".to_string(),
            });
        }
        if self.synthesis_window_minutes == 0 {
            return Err(ConfigError::InvalidValue {
                field: "synthesisWindowMinutes",
                message: "must be at least 1 minute".to_string(),
            });
        }
        if self.meeting_grace_minutes >= self.prep_window_minutes {
            return Err(ConfigError::InvalidValue {
                field: "meetingGraceMinutes",
                message: format!(
                    "{} must be shorter than prepWindowMinutes ({})",
                    self.meeting_grace_minutes, self.prep_window_minutes
                ),
            });
        }
        if self.meeting_grace_minutes >= self.synthesis_window_minutes {
            return Err(ConfigError::InvalidValue {
                field: "meetingGraceMinutes",
                message: format!(
                    "{} must be shorter than synthesisWindowMinutes ({})",
                    self.meeting_grace_minutes, self.synthesis_window_minutes
                ),
            });
        }
        Ok(())
    }

    pub fn prep_window_ms(&self) -> i64 {
        i64::from(self.prep_window_minutes) * MS_PER_MINUTE
    }

    pub fn synthesis_window_ms(&self) -> i64 {
        i64::from(self.synthesis_window_minutes) * MS_PER_MINUTE
    }

    pub fn grace_ms(&self) -> i64 {
        i64::from(self.meeting_grace_minutes) * MS_PER_MINUTE
    }
}
