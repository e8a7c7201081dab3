//! Signed percentage speech rate, e.g. `+25%`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lowest accepted adjustment (0.25x speed).
const MIN_PERCENT: i32 = -75;
/// Highest accepted adjustment (4x speed).
const MAX_PERCENT: i32 = 300;

/// Rate adjustment relative to the voice's normal speed.
///
/// Written the way neural TTS services expect it (`+25%`, `-10%`) and
/// converted to a speed multiplier for endpoints that take one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SpeechRate {
    percent: i32,
}

impl SpeechRate {
    /// Build a rate from a signed percentage, clamped to the accepted range.
    pub fn from_percent(percent: i32) -> Self {
        Self {
            percent: percent.clamp(MIN_PERCENT, MAX_PERCENT),
        }
    }

    /// Signed percentage adjustment.
    pub fn percent(&self) -> i32 {
        self.percent
    }

    /// Speed multiplier: `+25%` is 1.25.
    pub fn multiplier(&self) -> f32 {
        1.0 + self.percent as f32 / 100.0
    }
}

impl Default for SpeechRate {
    fn default() -> Self {
        Self { percent: 0 }
    }
}

impl fmt::Display for SpeechRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:+}%", self.percent)
    }
}

impl FromStr for SpeechRate {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let number = trimmed
            .strip_suffix('%')
            .ok_or_else(|| format!("rate '{s}' must end with '%', e.g. +25%"))?;
        let percent: i32 = number
            .trim()
            .parse()
            .map_err(|_| format!("rate '{s}' is not a signed percentage, e.g. +25%"))?;
        if !(MIN_PERCENT..=MAX_PERCENT).contains(&percent) {
            return Err(format!(
                "rate '{s}' out of range ({MIN_PERCENT:+}% to {MAX_PERCENT:+}%)"
            ));
        }
        Ok(Self { percent })
    }
}

impl TryFrom<String> for SpeechRate {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SpeechRate> for String {
    fn from(rate: SpeechRate) -> Self {
        rate.to_string()
    }
}
