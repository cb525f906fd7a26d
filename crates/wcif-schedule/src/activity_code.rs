//! WCIF activity codes.
//!
//! Codes are either `other-<kind>` (lunch, awards, registration...) or
//! `<event>[-r<round>][-g<group>][-a<attempt>]`, e.g. `333-r1`, `333fm-r1-a2`.

use std::fmt;

use chrono::Duration;

use crate::error::ScheduleError;

/// Events and `other-*` kinds that get a one hour slot by default.
const LONG_EVENTS: [&str; 4] = ["333fm", "333mbf", "other-lunch", "other-awards"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActivityCode {
    Event {
        event_id: String,
        round: Option<u32>,
        group: Option<u32>,
        attempt: Option<u32>,
    },
    Other(String),
}

impl ActivityCode {
    pub fn parse(code: &str) -> Result<Self, ScheduleError> {
        let invalid = || ScheduleError::InvalidActivityCode(format!("'{}'", code));

        if let Some(kind) = code.strip_prefix("other-") {
            if kind.is_empty() {
                return Err(invalid());
            }
            return Ok(ActivityCode::Other(kind.to_string()));
        }

        let mut parts = code.split('-');
        let event_id = parts.next().filter(|e| is_event_id(e)).ok_or_else(invalid)?;

        let mut round = None;
        let mut group = None;
        let mut attempt = None;
        // r, g and a may each appear once, in that order.
        let mut last_rank = 0;
        for part in parts {
            let (rank, slot) = match part.as_bytes().first() {
                Some(b'r') => (1, &mut round),
                Some(b'g') => (2, &mut group),
                Some(b'a') => (3, &mut attempt),
                _ => return Err(invalid()),
            };
            if rank <= last_rank {
                return Err(invalid());
            }
            last_rank = rank;
            let digits = &part[1..];
            if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                return Err(invalid());
            }
            *slot = Some(digits.parse().map_err(|_| invalid())?);
        }

        Ok(ActivityCode::Event {
            event_id: event_id.to_string(),
            round,
            group,
            attempt,
        })
    }

    /// The event id, or `other-<kind>` for non-event activities.
    pub fn event_id(&self) -> String {
        match self {
            ActivityCode::Event { event_id, .. } => event_id.clone(),
            ActivityCode::Other(kind) => format!("other-{kind}"),
        }
    }

    /// How long a freshly added activity with this code lasts.
    pub fn default_duration(&self) -> Duration {
        if LONG_EVENTS.contains(&self.event_id().as_str()) {
            Duration::minutes(60)
        } else {
            Duration::minutes(30)
        }
    }
}

impl fmt::Display for ActivityCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActivityCode::Other(kind) => write!(f, "other-{kind}"),
            ActivityCode::Event {
                event_id,
                round,
                group,
                attempt,
            } => {
                write!(f, "{event_id}")?;
                if let Some(r) = round {
                    write!(f, "-r{r}")?;
                }
                if let Some(g) = group {
                    write!(f, "-g{g}")?;
                }
                if let Some(a) = attempt {
                    write!(f, "-a{a}")?;
                }
                Ok(())
            }
        }
    }
}

/// Default duration for a raw activity code string.
pub fn default_duration(code: &str) -> Result<Duration, ScheduleError> {
    Ok(ActivityCode::parse(code)?.default_duration())
}

fn is_event_id(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_alphanumeric())
}
