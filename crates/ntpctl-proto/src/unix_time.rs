// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

//! Wall-clock time in NTP timestamp form.
//!
//! Signed mode 7 requests carry the current time so the daemon can reject
//! replays, and `info_sys` reports the daemon's last reference time. Both use
//! the 64-bit `l_fp` format, whose 32-bit seconds field wraps every era.

use std::time::{SystemTime, UNIX_EPOCH};

use crate::protocol::TimestampFormat;

/// Seconds from 1900-01-01 (NTP epoch) to 1970-01-01 (Unix epoch).
pub const EPOCH_DELTA: i64 = 2_208_988_800;

const NANOS_PER_SEC: u64 = 1_000_000_000;

/// A point in time as seconds and nanoseconds since the Unix epoch.
#[derive(Copy, Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Instant {
    secs: i64,
    subsec_nanos: u32,
}

impl Instant {
    /// An instant `secs` seconds plus `subsec_nanos` nanoseconds after the
    /// Unix epoch. Nanoseconds of a second or more carry into `secs`.
    pub const fn new(secs: i64, subsec_nanos: u32) -> Instant {
        Instant {
            secs: secs + (subsec_nanos as u64 / NANOS_PER_SEC) as i64,
            subsec_nanos: (subsec_nanos as u64 % NANOS_PER_SEC) as u32,
        }
    }

    /// The current system time. A clock set before 1970 reads as the epoch.
    ///
    /// ```
    /// let now = ntpctl_proto::unix_time::Instant::now();
    /// assert!(now.secs() > 0);
    /// ```
    pub fn now() -> Self {
        let since_epoch = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        Instant::new(since_epoch.as_secs() as i64, since_epoch.subsec_nanos())
    }

    /// Whole seconds since the Unix epoch.
    pub fn secs(&self) -> i64 {
        self.secs
    }

    /// Nanoseconds past [`secs`](Self::secs).
    pub fn subsec_nanos(&self) -> u32 {
        self.subsec_nanos
    }
}

/// Resolve `ts` to the instant closest to `pivot`, which picks the NTP era.
pub fn timestamp_to_instant(ts: TimestampFormat, pivot: &Instant) -> Instant {
    let pivot_ntp = (pivot.secs + EPOCH_DELTA) as u32;
    // Signed distance within half an era either side of the pivot.
    let delta = i64::from(ts.seconds.wrapping_sub(pivot_ntp) as i32);
    let nanos = (u64::from(ts.fraction) * NANOS_PER_SEC) >> 32;
    Instant::new(pivot.secs + delta, nanos as u32)
}

impl From<Instant> for TimestampFormat {
    /// The era is dropped; only the low 32 bits of the seconds are kept.
    fn from(t: Instant) -> Self {
        TimestampFormat {
            seconds: (t.secs + EPOCH_DELTA) as u32,
            fraction: ((u64::from(t.subsec_nanos) << 32) / NANOS_PER_SEC) as u32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // 2024-01-01T00:00:00Z
    const NEW_YEAR_2024: i64 = 1_704_067_200;
    const NEW_YEAR_2024_NTP: u32 = 3_913_056_000;

    #[test]
    fn to_timestamp() {
        let ts = TimestampFormat::from(Instant::new(NEW_YEAR_2024, 500_000_000));
        assert_eq!(ts.seconds, NEW_YEAR_2024_NTP);
        assert_eq!(ts.fraction, 0x8000_0000);
    }

    #[test]
    fn from_timestamp_same_era() {
        let ts = TimestampFormat {
            seconds: NEW_YEAR_2024_NTP - 60,
            fraction: 0x4000_0000,
        };
        let t = timestamp_to_instant(ts, &Instant::new(NEW_YEAR_2024, 0));
        assert_eq!(t.secs(), NEW_YEAR_2024 - 60);
        assert_eq!(t.subsec_nanos(), 250_000_000);
    }

    #[test]
    fn from_timestamp_next_era() {
        // Shortly before the 2036 rollover a small timestamp is just after it.
        let pivot = Instant::new((1i64 << 32) - EPOCH_DELTA - 100, 0);
        let ts = TimestampFormat {
            seconds: 1000,
            fraction: 0,
        };
        let t = timestamp_to_instant(ts, &pivot);
        assert_eq!(t.secs(), (1i64 << 32) + 1000 - EPOCH_DELTA);
    }

    #[test]
    fn nanos_carry() {
        let t = Instant::new(5, 2_500_000_000);
        assert_eq!((t.secs(), t.subsec_nanos()), (7, 500_000_000));
    }
}
