//! Archive creation timestamps.

use std::fmt;

use chrono::{DateTime, Local, TimeZone};

/// The time stamped into an archive's PCRT and PMOD blocks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timestamp {
    raw: u32,
    text: String,
}

impl Timestamp {
    /// The current local time.
    pub fn now() -> Self {
        Self::from_datetime(&Local::now())
    }

    /// Build a timestamp from any zoned date-time.
    ///
    /// The text uses the classic `ctime` layout, trailing newline included.
    /// The raw value is the Unix time truncated to 32 bits.
    pub fn from_datetime<Tz>(time: &DateTime<Tz>) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: fmt::Display,
    {
        Self {
            raw: time.timestamp() as u32,
            text: time.format("%a %b %e %H:%M:%S %Y\n").to_string(),
        }
    }

    /// Raw 32-bit time value.
    pub fn raw(&self) -> u32 {
        self.raw
    }

    /// Human-readable date text.
    pub fn text(&self) -> &str {
        &self.text
    }
}
