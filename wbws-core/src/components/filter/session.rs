//! Intraday session window filter.
//!
//! Pure function of the bar's wall-clock hour and minute; timestamps are
//! assumed to be in session-local time already. The window is half-open:
//! `start <= t < end`. Overnight windows are not supported.

use crate::components::indicator::IndicatorValues;
use crate::components::signal::{FilterVerdict, SignalEvaluation, SignalEvent};
use crate::domain::Bar;
use chrono::{NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use super::SignalFilter;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SessionError {
    #[error("invalid session time {hour:02}:{minute:02}")]
    InvalidTime { hour: u32, minute: u32 },

    #[error("session start ({start}) must be strictly before end ({end}); overnight sessions are not supported")]
    EmptyWindow { start: SessionTime, end: SessionTime },
}

/// Wall-clock time of day, minute resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SessionTime {
    pub hour: u32,
    pub minute: u32,
}

impl SessionTime {
    pub fn new(hour: u32, minute: u32) -> Result<Self, SessionError> {
        if hour > 23 || minute > 59 {
            return Err(SessionError::InvalidTime { hour, minute });
        }
        Ok(Self { hour, minute })
    }

    pub fn minutes(self) -> u32 {
        self.hour * 60 + self.minute
    }
}

impl fmt::Display for SessionTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

/// Session status of a single timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionInfo {
    pub is_in_trading_hours: bool,
    pub timestamp: NaiveDateTime,
    pub hour: u32,
    pub minute: u32,
    pub session_start: String,
    pub session_end: String,
    pub session_type: String,
}

#[derive(Debug, Clone)]
pub struct SessionFilter {
    start: SessionTime,
    end: SessionTime,
    enabled: bool,
}

impl SessionFilter {
    /// Fails when enabled with `start >= end`. A disabled filter still
    /// requires valid times but any ordering.
    pub fn new(start: SessionTime, end: SessionTime, enabled: bool) -> Result<Self, SessionError> {
        let start = SessionTime::new(start.hour, start.minute)?;
        let end = SessionTime::new(end.hour, end.minute)?;
        if enabled && start.minutes() >= end.minutes() {
            return Err(SessionError::EmptyWindow { start, end });
        }
        if enabled {
            tracing::debug!(%start, %end, "session filter initialised");
        } else {
            tracing::debug!("session filter disabled");
        }
        Ok(Self {
            start,
            end,
            enabled,
        })
    }

    pub fn start(&self) -> SessionTime {
        self.start
    }

    pub fn end(&self) -> SessionTime {
        self.end
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_in_session(&self, timestamp: NaiveDateTime) -> bool {
        if !self.enabled {
            return true;
        }
        let minutes = timestamp.hour() * 60 + timestamp.minute();
        self.start.minutes() <= minutes && minutes < self.end.minutes()
    }

    pub fn session_info(&self, timestamp: NaiveDateTime) -> SessionInfo {
        SessionInfo {
            is_in_trading_hours: self.is_in_session(timestamp),
            timestamp,
            hour: timestamp.hour(),
            minute: timestamp.minute(),
            session_start: self.start.to_string(),
            session_end: self.end.to_string(),
            session_type: "intraday".to_string(),
        }
    }
}

impl SignalFilter for SessionFilter {
    fn name(&self) -> &str {
        "session_filter"
    }

    fn evaluate(
        &self,
        signal: &SignalEvent,
        _bars: &[Bar],
        _bar_index: usize,
        _indicators: &IndicatorValues,
    ) -> SignalEvaluation {
        let minute_of_day = signal.timestamp.hour() * 60 + signal.timestamp.minute();
        let verdict = if self.is_in_session(signal.timestamp) {
            FilterVerdict::Passed
        } else {
            FilterVerdict::FilteredBySession
        };
        SignalEvaluation {
            signal_event_id: signal.id,
            filter_name: self.name().to_string(),
            verdict,
            filter_state: HashMap::from([("minute_of_day".to_string(), minute_of_day as f64)]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 15)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    fn default_window() -> SessionFilter {
        SessionFilter::new(
            SessionTime::new(8, 30).unwrap(),
            SessionTime::new(20, 30).unwrap(),
            true,
        )
        .unwrap()
    }

    #[test]
    fn boundaries_are_half_open() {
        let f = default_window();
        assert!(!f.is_in_session(at(8, 29)));
        assert!(f.is_in_session(at(8, 30)));
        assert!(f.is_in_session(at(20, 29)));
        assert!(!f.is_in_session(at(20, 30)));
    }

    #[test]
    fn seconds_are_ignored() {
        let f = default_window();
        let ts = NaiveDate::from_ymd_opt(2024, 3, 15)
            .unwrap()
            .and_hms_opt(20, 29, 59)
            .unwrap();
        assert!(f.is_in_session(ts));
    }

    #[test]
    fn overnight_window_rejected() {
        let err = SessionFilter::new(
            SessionTime::new(22, 0).unwrap(),
            SessionTime::new(6, 0).unwrap(),
            true,
        )
        .unwrap_err();
        assert!(matches!(err, SessionError::EmptyWindow { .. }));
        assert!(err.to_string().contains("22:00"));
    }

    #[test]
    fn equal_bounds_rejected_when_enabled_only() {
        let t = SessionTime::new(9, 0).unwrap();
        assert!(SessionFilter::new(t, t, true).is_err());
        let disabled = SessionFilter::new(t, t, false).unwrap();
        assert!(disabled.is_in_session(at(3, 0)));
    }

    #[test]
    fn invalid_time() {
        assert_eq!(
            SessionTime::new(24, 0),
            Err(SessionError::InvalidTime { hour: 24, minute: 0 })
        );
        assert!(SessionTime::new(12, 60).is_err());
    }

    #[test]
    fn session_info_fields() {
        let info = default_window().session_info(at(7, 5));
        assert!(!info.is_in_trading_hours);
        assert_eq!(info.hour, 7);
        assert_eq!(info.minute, 5);
        assert_eq!(info.session_start, "08:30");
        assert_eq!(info.session_end, "20:30");
    }
}
