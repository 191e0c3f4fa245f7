// Copyright 2026 the AR Cubes Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Frame timestamps.
//!
//! XR frame callbacks receive a [`DOMHighResTimeStamp`][mdn] in fractional
//! milliseconds. [`HostTime`] stores it as whole microsecond ticks so trace
//! events stay `Eq`.
//!
//! [mdn]: https://developer.mozilla.org/en-US/docs/Web/API/DOMHighResTimeStamp

use core::fmt;

/// A frame timestamp in microsecond ticks since the page's time origin.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct HostTime(pub u64);

impl HostTime {
    /// Converts a frame callback timestamp (milliseconds) into ticks.
    ///
    /// Negative and non-finite inputs clamp to zero.
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        reason = "checked finite and positive; page uptime in µs fits in u64"
    )]
    pub fn from_millis_f64(ms: f64) -> Self {
        if ms.is_finite() && ms > 0.0 {
            Self((ms * 1000.0) as u64)
        } else {
            Self(0)
        }
    }

    /// Returns the raw tick value.
    #[inline]
    #[must_use]
    pub const fn ticks(self) -> u64 {
        self.0
    }

    /// Returns the time as fractional milliseconds, for display.
    #[must_use]
    pub fn as_millis_f64(self) -> f64 {
        self.0 as f64 / 1000.0
    }
}

impl fmt::Debug for HostTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3}ms", self.as_millis_f64())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::format;

    #[test]
    fn millis_to_micros() {
        assert_eq!(HostTime::from_millis_f64(16.5), HostTime(16_500));
        assert_eq!(HostTime(16_500).as_millis_f64(), 16.5);
    }

    #[test]
    fn bad_timestamps_clamp_to_zero() {
        assert_eq!(HostTime::from_millis_f64(-3.0), HostTime(0));
        assert_eq!(HostTime::from_millis_f64(f64::NAN), HostTime(0));
        assert_eq!(HostTime::from_millis_f64(f64::INFINITY), HostTime(0));
    }

    #[test]
    fn debug_shows_millis() {
        assert_eq!(format!("{:?}", HostTime(1_234_500)), "1234.500ms");
    }
}
