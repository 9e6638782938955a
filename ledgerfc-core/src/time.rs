//! Time points and durations.
//!
//! [`TimePoint`] has microsecond resolution and packs as an `i64`;
//! [`TimePointSec`] has second resolution and packs as a `u32`. Both convert to
//! variants as ISO-8601 strings in UTC without a zone suffix.

use std::fmt;
use std::io::{Read, Write};
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};
use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::{FcError, Result};
use crate::raw::{Pack, Packer, Unpack, Unpacker};
use crate::variant::{FromVariant, ToVariant, Variant};

const USEC_PER_MSEC: i64 = 1_000;
const USEC_PER_SEC: i64 = 1_000_000;

// ═══════════════════════════════════════════════════════════════════════════════
// DURATION
// ═══════════════════════════════════════════════════════════════════════════════

/// Signed duration in microseconds.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Microseconds(i64);

impl Microseconds {
    pub const fn new(count: i64) -> Self {
        Self(count)
    }

    pub const fn maximum() -> Self {
        Self(i64::MAX)
    }

    // Unit constructors and arithmetic saturate at the i64 range, so
    // `maximum()` stays unbounded.

    pub const fn seconds(s: i64) -> Self {
        Self(s.saturating_mul(USEC_PER_SEC))
    }

    pub const fn milliseconds(ms: i64) -> Self {
        Self(ms.saturating_mul(USEC_PER_MSEC))
    }

    pub const fn minutes(m: i64) -> Self {
        Self::seconds(m.saturating_mul(60))
    }

    pub const fn hours(h: i64) -> Self {
        Self::minutes(h.saturating_mul(60))
    }

    pub const fn days(d: i64) -> Self {
        Self::hours(d.saturating_mul(24))
    }

    pub const fn count(self) -> i64 {
        self.0
    }

    /// Whole seconds, truncated toward zero.
    pub const fn to_seconds(self) -> i64 {
        self.0 / USEC_PER_SEC
    }
}

impl Add for Microseconds {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl Sub for Microseconds {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self(self.0.saturating_sub(rhs.0))
    }
}

impl Neg for Microseconds {
    type Output = Self;

    fn neg(self) -> Self {
        Self(self.0.saturating_neg())
    }
}

impl AddAssign for Microseconds {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl SubAssign for Microseconds {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl Pack for Microseconds {
    fn pack<W: Write>(&self, s: &mut Packer<W>) -> Result<()> {
        self.0.pack(s)
    }
}

impl Unpack for Microseconds {
    fn unpack<R: Read>(s: &mut Unpacker<R>) -> Result<Self> {
        i64::unpack(s).map(Self)
    }
}

impl ToVariant for Microseconds {
    fn to_variant(&self) -> Result<Variant> {
        Ok(Variant::Int64(self.0))
    }
}

impl FromVariant for Microseconds {
    fn from_variant(v: &Variant) -> Result<Self> {
        v.as_i64().map(Self)
    }
}

/// Parses `"<count> <unit>"`, e.g. `"30 s"` or `"5min"`.
///
/// Units: `us`, `ms`, `s`, `m`, `h`, `d`, `w` and their long spellings. A bare
/// count is seconds. `"-1"` means unbounded ([`Microseconds::maximum`]).
pub fn parse_duration(text: &str) -> Result<Microseconds> {
    let invalid = || FcError::InvalidDuration(text.to_owned());

    let trimmed = text.trim();
    if trimmed == "-1" {
        return Ok(Microseconds::maximum());
    }

    let split = trimmed
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(trimmed.len());
    let (digits, unit) = trimmed.split_at(split);
    if digits.is_empty() {
        return Err(invalid());
    }
    let count: i64 = digits.parse().map_err(|_| invalid())?;

    let multiplier = match unit.trim() {
        "us" | "usec" | "microsec" | "microsecond" | "microseconds" => 1,
        "ms" | "msec" | "millisec" | "millisecond" | "milliseconds" => USEC_PER_MSEC,
        "" | "s" | "sec" | "second" | "seconds" => USEC_PER_SEC,
        "m" | "min" | "minute" | "minutes" => USEC_PER_SEC * 60,
        "h" | "hour" | "hours" => USEC_PER_SEC * 3_600,
        "d" | "day" | "days" => USEC_PER_SEC * 86_400,
        "w" | "week" | "weeks" => USEC_PER_SEC * 604_800,
        _ => return Err(invalid()),
    };

    count
        .checked_mul(multiplier)
        .map(Microseconds)
        .ok_or_else(invalid)
}

// ═══════════════════════════════════════════════════════════════════════════════
// TIME POINTS
// ═══════════════════════════════════════════════════════════════════════════════

const ISO_EXTENDED: &str = "%Y-%m-%dT%H:%M:%S%.f";
const ISO_BASIC: &str = "%Y%m%dT%H%M%S%.f";

fn parse_iso(text: &str) -> Result<NaiveDateTime> {
    let s = text.trim().trim_end_matches('Z');
    let format = if s.as_bytes().get(4) == Some(&b'-') {
        ISO_EXTENDED
    } else {
        ISO_BASIC
    };
    NaiveDateTime::parse_from_str(s, format).map_err(|_| FcError::InvalidTime(text.to_owned()))
}

/// Microseconds since the Unix epoch.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct TimePoint(Microseconds);

impl TimePoint {
    pub const fn new(since_epoch: Microseconds) -> Self {
        Self(since_epoch)
    }

    pub fn now() -> Self {
        Self(Microseconds(chrono::Utc::now().timestamp_micros()))
    }

    pub const fn maximum() -> Self {
        Self(Microseconds::maximum())
    }

    pub const fn min() -> Self {
        Self(Microseconds(0))
    }

    pub const fn time_since_epoch(self) -> Microseconds {
        self.0
    }

    pub const fn sec_since_epoch(self) -> i64 {
        self.0.to_seconds()
    }

    /// `YYYY-MM-DDTHH:MM:SS.ffffff`, with trailing fraction zeros trimmed down
    /// to milliseconds.
    pub fn to_iso_string(self) -> String {
        let secs = self.0 .0.div_euclid(USEC_PER_SEC);
        let micros = self.0 .0.rem_euclid(USEC_PER_SEC);
        match DateTime::from_timestamp(secs, 0) {
            Some(dt) => {
                let mut fraction = format!("{micros:06}");
                while fraction.len() > 3 && fraction.ends_with('0') {
                    fraction.pop();
                }
                format!("{}.{fraction}", dt.naive_utc().format("%Y-%m-%dT%H:%M:%S"))
            }
            None => format!("{}us", self.0 .0),
        }
    }

    /// Parses the extended or basic ISO-8601 form, with optional fraction.
    pub fn from_iso_string(text: &str) -> Result<Self> {
        let dt = parse_iso(text)?.and_utc();
        Ok(Self(Microseconds(dt.timestamp_micros())))
    }
}

impl Add<Microseconds> for TimePoint {
    type Output = Self;

    fn add(self, rhs: Microseconds) -> Self {
        Self(self.0 + rhs)
    }
}

impl Sub<Microseconds> for TimePoint {
    type Output = Self;

    fn sub(self, rhs: Microseconds) -> Self {
        Self(self.0 - rhs)
    }
}

impl Sub for TimePoint {
    type Output = Microseconds;

    fn sub(self, rhs: Self) -> Microseconds {
        self.0 - rhs.0
    }
}

impl AddAssign<Microseconds> for TimePoint {
    fn add_assign(&mut self, rhs: Microseconds) {
        self.0 += rhs;
    }
}

impl fmt::Display for TimePoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_iso_string())
    }
}

impl FromStr for TimePoint {
    type Err = FcError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_iso_string(s)
    }
}

/// Whole seconds since the Unix epoch.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct TimePointSec(u32);

impl TimePointSec {
    pub const fn new(seconds: u32) -> Self {
        Self(seconds)
    }

    pub fn now() -> Self {
        Self::from(TimePoint::now())
    }

    pub const fn maximum() -> Self {
        Self(u32::MAX)
    }

    pub const fn min() -> Self {
        Self(0)
    }

    pub const fn sec_since_epoch(self) -> u32 {
        self.0
    }

    /// `YYYY-MM-DDTHH:MM:SS`.
    pub fn to_iso_string(self) -> String {
        match DateTime::from_timestamp(i64::from(self.0), 0) {
            Some(dt) => dt.naive_utc().format("%Y-%m-%dT%H:%M:%S").to_string(),
            None => self.0.to_string(),
        }
    }

    /// Parses an ISO-8601 time, dropping any fraction.
    pub fn from_iso_string(text: &str) -> Result<Self> {
        let secs = parse_iso(text)?.and_utc().timestamp();
        u32::try_from(secs)
            .map(Self)
            .map_err(|_| FcError::InvalidTime(text.to_owned()))
    }
}

/// Truncates to whole seconds, clamping to the `u32` range.
impl From<TimePoint> for TimePointSec {
    fn from(tp: TimePoint) -> Self {
        let secs = tp.sec_since_epoch().clamp(0, i64::from(u32::MAX));
        Self(secs as u32)
    }
}

impl From<TimePointSec> for TimePoint {
    fn from(tps: TimePointSec) -> Self {
        Self(Microseconds::seconds(i64::from(tps.0)))
    }
}

impl Add<u32> for TimePointSec {
    type Output = Self;

    fn add(self, rhs: u32) -> Self {
        Self(self.0.wrapping_add(rhs))
    }
}

impl Add<Microseconds> for TimePointSec {
    type Output = TimePoint;

    fn add(self, rhs: Microseconds) -> TimePoint {
        TimePoint::from(self) + rhs
    }
}

impl Sub<u32> for TimePointSec {
    type Output = Self;

    fn sub(self, rhs: u32) -> Self {
        Self(self.0.wrapping_sub(rhs))
    }
}

impl Sub for TimePointSec {
    type Output = Microseconds;

    fn sub(self, rhs: Self) -> Microseconds {
        Microseconds::seconds(i64::from(self.0) - i64::from(rhs.0))
    }
}

impl fmt::Display for TimePointSec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_iso_string())
    }
}

impl FromStr for TimePointSec {
    type Err = FcError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_iso_string(s)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// CODECS
// ═══════════════════════════════════════════════════════════════════════════════

impl Pack for TimePoint {
    fn pack<W: Write>(&self, s: &mut Packer<W>) -> Result<()> {
        self.0.pack(s)
    }
}

impl Unpack for TimePoint {
    fn unpack<R: Read>(s: &mut Unpacker<R>) -> Result<Self> {
        Microseconds::unpack(s).map(Self)
    }
}

impl Pack for TimePointSec {
    fn pack<W: Write>(&self, s: &mut Packer<W>) -> Result<()> {
        self.0.pack(s)
    }
}

impl Unpack for TimePointSec {
    fn unpack<R: Read>(s: &mut Unpacker<R>) -> Result<Self> {
        u32::unpack(s).map(Self)
    }
}

impl ToVariant for TimePoint {
    fn to_variant(&self) -> Result<Variant> {
        Ok(Variant::String(self.to_iso_string()))
    }
}

impl FromVariant for TimePoint {
    fn from_variant(v: &Variant) -> Result<Self> {
        Self::from_iso_string(v.as_str()?)
    }
}

impl ToVariant for TimePointSec {
    fn to_variant(&self) -> Result<Variant> {
        Ok(Variant::String(self.to_iso_string()))
    }
}

impl FromVariant for TimePointSec {
    fn from_variant(v: &Variant) -> Result<Self> {
        Self::from_iso_string(v.as_str()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raw::{pack, unpack};
    use test_case::test_case;

    #[test]
    fn test_duration_constructors() {
        assert_eq!(Microseconds::seconds(2).count(), 2_000_000);
        assert_eq!(Microseconds::milliseconds(3).count(), 3_000);
        assert_eq!(Microseconds::hours(1), Microseconds::minutes(60));
        assert_eq!(Microseconds::days(1).to_seconds(), 86_400);
    }

    #[test_case("10 us", 10 ; "micro short")]
    #[test_case("10 microseconds", 10 ; "micro long")]
    #[test_case("7ms", 7_000 ; "milli no space")]
    #[test_case("3 s", 3_000_000 ; "seconds")]
    #[test_case("3", 3_000_000 ; "bare count is seconds")]
    #[test_case("2 min", 120_000_000 ; "minutes")]
    #[test_case(" 1 h ", 3_600_000_000 ; "hours padded")]
    #[test_case("1 day", 86_400_000_000 ; "days")]
    #[test_case("1 w", 604_800_000_000 ; "weeks")]
    fn test_parse_duration(text: &str, micros: i64) {
        assert_eq!(parse_duration(text).unwrap().count(), micros);
    }

    #[test]
    fn test_parse_duration_infinite() {
        assert_eq!(parse_duration("-1").unwrap(), Microseconds::maximum());
    }

    #[test_case("" ; "empty")]
    #[test_case("abc" ; "no number")]
    #[test_case("5 fortnights" ; "unknown unit")]
    #[test_case("-5 s" ; "negative")]
    #[test_case("99999999999999999 w" ; "overflow")]
    fn test_parse_duration_invalid(text: &str) {
        assert!(matches!(
            parse_duration(text),
            Err(FcError::InvalidDuration(_))
        ));
    }

    #[test]
    fn test_time_point_sec_iso() {
        let t = TimePointSec::new(1_000_000_000);
        assert_eq!(t.to_iso_string(), "2001-09-09T01:46:40");
        assert_eq!(TimePointSec::from_iso_string("2001-09-09T01:46:40").unwrap(), t);
        assert_eq!(TimePointSec::from_iso_string("20010909T014640").unwrap(), t);
    }

    #[test]
    fn test_time_point_iso_fraction() {
        let t = TimePoint::new(Microseconds::new(1_000_000_000_123_456));
        assert_eq!(t.to_iso_string(), "2001-09-09T01:46:40.123456");

        let millis = TimePoint::new(Microseconds::new(1_000_000_000_120_000));
        assert_eq!(millis.to_iso_string(), "2001-09-09T01:46:40.120");
        let whole = TimePoint::new(Microseconds::seconds(1_000_000_000));
        assert_eq!(whole.to_iso_string(), "2001-09-09T01:46:40.000");

        let parsed = TimePoint::from_iso_string("2001-09-09T01:46:40.123456").unwrap();
        assert_eq!(parsed, t);

        let whole = TimePoint::from_iso_string("2001-09-09T01:46:40").unwrap();
        assert_eq!(whole.sec_since_epoch(), 1_000_000_000);
    }

    #[test]
    fn test_invalid_time() {
        assert!(matches!(
            TimePointSec::from_iso_string("yesterday"),
            Err(FcError::InvalidTime(_))
        ));
        // before the epoch does not fit u32 seconds
        assert!(TimePointSec::from_iso_string("1969-12-31T23:59:59").is_err());
    }

    #[test]
    fn test_wire_forms() {
        let tps = TimePointSec::new(0x0102_0304);
        assert_eq!(pack(&tps).unwrap(), vec![4, 3, 2, 1]);
        let tp = TimePoint::from(tps);
        assert_eq!(pack(&tp).unwrap().len(), 8);
        assert_eq!(unpack::<TimePoint>(&pack(&tp).unwrap()).unwrap(), tp);
    }

    #[test]
    fn test_variant_forms() {
        let tps = TimePointSec::new(60);
        assert_eq!(tps.to_variant().unwrap(), Variant::from("1970-01-01T00:01:00"));
        let back = TimePointSec::from_variant(&Variant::from("1970-01-01T00:01:00")).unwrap();
        assert_eq!(back, tps);
        assert!(TimePoint::from_variant(&Variant::Uint64(5)).is_err());
    }

    #[test_case(1_500_000_000_123_456 ; "sub millisecond")]
    #[test_case(1_500_000_000_000_001 ; "single microsecond")]
    #[test_case(1_500_000_000_120_000 ; "millisecond")]
    #[test_case(0 ; "epoch")]
    fn test_time_point_variant_roundtrip(micros: i64) {
        let t = TimePoint::new(Microseconds::new(micros));
        assert_eq!(TimePoint::from_variant(&t.to_variant().unwrap()).unwrap(), t);
    }

    #[test]
    fn test_time_point_sec_wraps() {
        assert_eq!(TimePointSec::maximum() + 1, TimePointSec::min());
        assert_eq!(TimePointSec::min() - 1, TimePointSec::maximum());
    }

    #[test]
    fn test_duration_saturates() {
        assert_eq!(Microseconds::maximum() + Microseconds::seconds(1), Microseconds::maximum());
        assert_eq!(Microseconds::days(i64::MAX), Microseconds::maximum());
        assert_eq!(-Microseconds::new(i64::MIN), Microseconds::maximum());

        let mut d = Microseconds::new(i64::MIN);
        d -= Microseconds::new(1);
        assert_eq!(d.count(), i64::MIN);
    }

    #[test]
    fn test_arithmetic() {
        let start = TimePointSec::new(100);
        let later = start + Microseconds::seconds(5);
        assert_eq!(TimePointSec::from(later).sec_since_epoch(), 105);
        assert_eq!(later - TimePoint::from(start), Microseconds::seconds(5));
        assert_eq!((start + 10) - start, Microseconds::seconds(10));
    }
}
