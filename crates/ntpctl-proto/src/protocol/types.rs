use core::fmt;

use super::ConstPackedSizeBytes;

// 2^32, the scale of an l_fp fraction.
const FRAC: f64 = 4_294_967_296.0;

// 2^16, the scale of a u_fp / s_fp value.
const SHORT_FRAC: f64 = 65_536.0;

/// **NTP Short Format** (`u_fp` / `s_fp`) - Used in delay and dispersion fields of mode 7 data
/// items. It includes a 16-bit seconds field and a 16-bit fraction field.
///
/// Whether the seconds field is signed depends on the item field; see
/// [`ShortFormat::as_unsigned_seconds`] and [`ShortFormat::as_signed_seconds`].
///
/// ### Layout
///
/// ```ignore
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |          Seconds              |           Fraction            |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ShortFormat {
    /// Seconds component.
    pub seconds: u16,
    /// Fractional seconds component.
    pub fraction: u16,
}

impl ShortFormat {
    /// Build from the raw 32-bit wire value.
    pub fn from_bits(bits: u32) -> Self {
        ShortFormat {
            seconds: (bits >> 16) as u16,
            fraction: bits as u16,
        }
    }

    /// The raw 32-bit wire value.
    pub fn to_bits(self) -> u32 {
        (u32::from(self.seconds) << 16) | u32::from(self.fraction)
    }

    /// Interpret as an unsigned `u_fp` value in seconds.
    pub fn as_unsigned_seconds(self) -> f64 {
        f64::from(self.to_bits()) / SHORT_FRAC
    }

    /// Interpret as a signed `s_fp` value in seconds.
    pub fn as_signed_seconds(self) -> f64 {
        f64::from(self.to_bits() as i32) / SHORT_FRAC
    }
}

/// **NTP Timestamp Format** (`l_fp`) - A 32-bit seconds field and a 32-bit fraction field.
///
/// Timestamps count from the prime epoch, 0 h 1 January 1900 UTC. Mode 7 also uses this
/// layout for signed offsets, where the seconds field is two's complement.
///
/// ### Layout
///
/// ```ignore
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                            Seconds                            |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                            Fraction                           |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct TimestampFormat {
    /// Seconds (unsigned for timestamps, two's complement for offsets).
    pub seconds: u32,
    /// Fractional seconds (resolution of ~232 picoseconds).
    pub fraction: u32,
}

impl TimestampFormat {
    /// Interpret as a signed offset in seconds.
    pub fn as_signed_seconds(self) -> f64 {
        f64::from(self.seconds as i32) + f64::from(self.fraction) / FRAC
    }

    /// Add two values with carry from the fraction into the seconds, wrapping on overflow.
    pub fn wrapping_add(self, other: TimestampFormat) -> TimestampFormat {
        let (fraction, carry) = self.fraction.overflowing_add(other.fraction);
        let seconds = self
            .seconds
            .wrapping_add(other.seconds)
            .wrapping_add(u32::from(carry));
        TimestampFormat { seconds, fraction }
    }
}

/// A 3-bit integer representing the NTP version number carried in control headers.
///
/// Mode 6 requests are sent with [`Version::V4`]. Mode 7 requests are sent with
/// [`Version::V2`] (one above the oldest supported version) so that every ntpd
/// release accepts them. Responses are accepted for any version from V1 to V4.
#[derive(Copy, Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Version(pub(crate) u8);

impl Version {
    /// NTP version 1, the oldest version a daemon may answer with.
    pub const V1: Self = Version(1);
    /// NTP version 2, used for mode 7 requests.
    pub const V2: Self = Version(2);
    /// NTP version 3.
    pub const V3: Self = Version(3);
    /// NTP version 4, used for mode 6 requests.
    pub const V4: Self = Version(4);

    /// Decode the 3-bit version field. Values outside 0..=7 are masked.
    pub fn from_bits(bits: u8) -> Self {
        Version(bits & 0b111)
    }

    /// The raw 3-bit value.
    pub fn value(self) -> u8 {
        self.0
    }

    /// Whether a response with this version should be processed.
    pub fn is_known(self) -> bool {
        self >= Version::V1 && self <= Version::V4
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

impl ConstPackedSizeBytes for ShortFormat {
    const PACKED_SIZE_BYTES: usize = 4;
}

impl ConstPackedSizeBytes for TimestampFormat {
    const PACKED_SIZE_BYTES: usize = 8;
}
