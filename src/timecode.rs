/*!
 * Clock time codec for the caption exchange format.
 *
 * A `ClockTime` is a non-negative offset from the start of the document,
 * rendered canonically as `HH:MM:SS,mmm`. Values are held as whole
 * milliseconds so ordering and arithmetic never drift.
 */

use std::fmt;
use std::str::FromStr;

use crate::errors::SubtitleError;

const MS_PER_SECOND: u64 = 1_000;
const MS_PER_MINUTE: u64 = 60 * MS_PER_SECOND;
const MS_PER_HOUR: u64 = 60 * MS_PER_MINUTE;

/// Timestamp with millisecond precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ClockTime {
    total_ms: u64,
}

impl ClockTime {
    /// Zero offset.
    pub const ZERO: ClockTime = ClockTime { total_ms: 0 };

    /// Build from individual fields. Minutes and seconds overflow into the
    /// next field instead of being rejected.
    pub fn new(hours: u64, minutes: u64, seconds: u64, millis: u64) -> Self {
        Self {
            total_ms: hours * MS_PER_HOUR
                + minutes * MS_PER_MINUTE
                + seconds * MS_PER_SECOND
                + millis,
        }
    }

    /// Build from a millisecond count.
    pub fn from_millis(total_ms: u64) -> Self {
        Self { total_ms }
    }

    /// Total milliseconds since document start.
    pub fn as_millis(&self) -> u64 {
        self.total_ms
    }

    pub fn hours(&self) -> u64 {
        self.total_ms / MS_PER_HOUR
    }

    pub fn minutes(&self) -> u64 {
        (self.total_ms % MS_PER_HOUR) / MS_PER_MINUTE
    }

    pub fn seconds(&self) -> u64 {
        (self.total_ms % MS_PER_MINUTE) / MS_PER_SECOND
    }

    pub fn millis(&self) -> u64 {
        self.total_ms % MS_PER_SECOND
    }

    /// Parse a `HH:MM:SS,mmm` string.
    ///
    /// Hours may have any number of digits; minutes and seconds take exactly
    /// two digits below 60 and milliseconds exactly three.
    pub fn parse(s: &str) -> Result<Self, SubtitleError> {
        let format_error = || SubtitleError::Format(s.to_string());

        let (clock, millis) = s.split_once(',').ok_or_else(format_error)?;
        let mut fields = clock.split(':');
        let (Some(hours), Some(minutes), Some(seconds), None) =
            (fields.next(), fields.next(), fields.next(), fields.next())
        else {
            return Err(format_error());
        };

        let numeric = |field: &str, width: Option<usize>| -> Result<u64, SubtitleError> {
            let width_ok = width.map_or(!field.is_empty(), |w| field.len() == w);
            if !width_ok || !field.bytes().all(|b| b.is_ascii_digit()) {
                return Err(format_error());
            }
            field.parse::<u64>().map_err(|_| format_error())
        };

        let hours = numeric(hours, None)?;
        let minutes = numeric(minutes, Some(2))?;
        let seconds = numeric(seconds, Some(2))?;
        let millis = numeric(millis, Some(3))?;

        if minutes >= 60 || seconds >= 60 {
            return Err(format_error());
        }

        Ok(Self::new(hours, minutes, seconds, millis))
    }

    /// `H*3600 + M*60 + S + ms/1000`
    pub fn to_seconds(&self) -> f64 {
        let whole = (self.total_ms / MS_PER_SECOND) as f64;
        whole + self.millis() as f64 / 1000.0
    }

    /// Convert float seconds back to a clock time.
    ///
    /// Whole seconds are floored and the fraction rounded to the nearest
    /// millisecond; a fraction that rounds to 1000 ms carries into the
    /// seconds field. Negative, NaN and infinite inputs clamp to zero.
    pub fn from_seconds(seconds: f64) -> Self {
        if !seconds.is_finite() || seconds <= 0.0 {
            return Self::ZERO;
        }

        let whole = seconds.floor();
        let mut millis = ((seconds - whole) * 1000.0).round() as u64;
        let mut whole = whole as u64;
        if millis >= MS_PER_SECOND {
            whole += millis / MS_PER_SECOND;
            millis %= MS_PER_SECOND;
        }

        Self::from_millis(whole * MS_PER_SECOND + millis)
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02}:{:02},{:03}",
            self.hours(),
            self.minutes(),
            self.seconds(),
            self.millis()
        )
    }
}

impl FromStr for ClockTime {
    type Err = SubtitleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
