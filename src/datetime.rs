use crate::{CMPIError, CMPIResult};
use chrono::prelude::*;
use chrono::FixedOffset;
use serde::{de, ser};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

const CIM_DATETIME_LEN: usize = 25;
const SECS_PER_DAY: u64 = 24 * 60 * 60;

/// A CIM datetime value, which is either a point in time or an interval.
///
/// Both forms are 25 characters on the wire:
/// `yyyymmddhhmmss.mmmmmmsutc` for a timestamp (`s` is `+` or `-`, `utc` the offset in minutes),
/// and `ddddddddhhmmss.mmmmmm:000` for an interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CIMDateTime {
    Timestamp(DateTime<FixedOffset>),
    Interval(Duration),
}

impl CIMDateTime {
    pub fn is_interval(&self) -> bool {
        matches!(self, CIMDateTime::Interval(_))
    }

    pub fn timestamp(&self) -> Option<&DateTime<FixedOffset>> {
        match self {
            CIMDateTime::Timestamp(dt) => Some(dt),
            CIMDateTime::Interval(_) => None,
        }
    }

    pub fn interval(&self) -> Option<Duration> {
        match self {
            CIMDateTime::Interval(d) => Some(*d),
            CIMDateTime::Timestamp(_) => None,
        }
    }
}

fn digits(s: &str, range: std::ops::Range<usize>) -> CMPIResult<u32> {
    let part = s
        .get(range)
        .filter(|p| p.bytes().all(|b| b.is_ascii_digit()))
        .ok_or_else(|| CMPIError::ConvertDatetimeError(s.into()))?;

    Ok(part.parse()?)
}

fn parse_interval(s: &str) -> CMPIResult<CIMDateTime> {
    if &s[21..] != ":000" {
        return Err(CMPIError::ConvertDatetimeError(s.into()));
    }

    let days = u64::from(digits(s, 0..8)?);
    let hours = u64::from(digits(s, 8..10)?);
    let minutes = u64::from(digits(s, 10..12)?);
    let seconds = u64::from(digits(s, 12..14)?);
    let micros = u64::from(digits(s, 15..21)?);

    let secs = days * SECS_PER_DAY + hours * 3600 + minutes * 60 + seconds;

    Ok(CIMDateTime::Interval(
        Duration::from_secs(secs) + Duration::from_micros(micros),
    ))
}

fn parse_timestamp(s: &str) -> CMPIResult<CIMDateTime> {
    let bad = || CMPIError::ConvertDatetimeError(s.into());

    let sign = match &s[21..22] {
        "+" => 1,
        "-" => -1,
        _ => return Err(bad()),
    };
    let tz_min = digits(s, 22..25)? as i32 * sign;
    let tz = FixedOffset::east_opt(tz_min * 60).ok_or_else(bad)?;

    let date = NaiveDate::from_ymd_opt(digits(s, 0..4)? as i32, digits(s, 4..6)?, digits(s, 6..8)?)
        .ok_or_else(bad)?;
    let naive = date
        .and_hms_micro_opt(
            digits(s, 8..10)?,
            digits(s, 10..12)?,
            digits(s, 12..14)?,
            digits(s, 15..21)?,
        )
        .ok_or_else(bad)?;

    let dt = tz.from_local_datetime(&naive).single().ok_or_else(bad)?;

    Ok(CIMDateTime::Timestamp(dt))
}

impl FromStr for CIMDateTime {
    type Err = CMPIError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != CIM_DATETIME_LEN || !s.is_ascii() || &s[14..15] != "." {
            return Err(CMPIError::ConvertDatetimeError(s.into()));
        }

        if &s[21..22] == ":" {
            parse_interval(s)
        } else {
            parse_timestamp(s)
        }
    }
}

impl fmt::Display for CIMDateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CIMDateTime::Timestamp(dt) => {
                let offset_min = dt.offset().local_minus_utc() / 60;
                write!(
                    f,
                    "{}.{:06}{:+04}",
                    dt.format("%Y%m%d%H%M%S"),
                    dt.nanosecond() / 1_000,
                    offset_min
                )
            }
            CIMDateTime::Interval(d) => {
                let secs = d.as_secs();
                write!(
                    f,
                    "{:08}{:02}{:02}{:02}.{:06}:000",
                    secs / SECS_PER_DAY,
                    (secs % SECS_PER_DAY) / 3600,
                    (secs % 3600) / 60,
                    secs % 60,
                    d.subsec_micros()
                )
            }
        }
    }
}

impl From<DateTime<FixedOffset>> for CIMDateTime {
    fn from(dt: DateTime<FixedOffset>) -> Self {
        CIMDateTime::Timestamp(dt)
    }
}

impl From<Duration> for CIMDateTime {
    fn from(d: Duration) -> Self {
        CIMDateTime::Interval(d)
    }
}

struct DateTimeVisitor;

impl<'de> de::Visitor<'de> for DateTimeVisitor {
    type Value = CIMDateTime;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        write!(formatter, "a timestamp or interval in CIM format")
    }

    fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        value.parse().map_err(|err| E::custom(format!("{}", err)))
    }
}

impl<'de> de::Deserialize<'de> for CIMDateTime {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: de::Deserializer<'de>,
    {
        deserializer.deserialize_str(DateTimeVisitor)
    }
}

impl ser::Serialize for CIMDateTime {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: ser::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::CIMDateTime;
    use chrono::{Datelike, Timelike};
    use serde_json;

    #[test]
    fn it_works_with_negative_offset() {
        let dt: CIMDateTime = "20190113200517.500000-180".parse().unwrap();
        let ts = dt.timestamp().unwrap();

        assert_eq!(ts.offset().local_minus_utc(), -180 * 60);
        assert_eq!((ts.year(), ts.month(), ts.day()), (2019, 1, 13));
        assert_eq!((ts.hour(), ts.minute(), ts.second()), (20, 5, 17));
        assert_eq!(ts.nanosecond(), 500_000_000);
    }

    #[test]
    fn it_works_with_positive_offset() {
        let dt: CIMDateTime = "20190113200517.000500+060".parse().unwrap();

        assert_eq!(dt.timestamp().unwrap().offset().local_minus_utc(), 3600);
        assert_eq!(dt.to_string(), "20190113200517.000500+060");
    }

    #[test]
    fn it_parses_intervals() {
        let dt: CIMDateTime = "00000005141436.100001:000".parse().unwrap();
        let d = dt.interval().unwrap();

        assert!(dt.is_interval());
        assert_eq!(d.as_secs(), 5 * 86400 + 14 * 3600 + 14 * 60 + 36);
        assert_eq!(d.subsec_micros(), 100001);
        assert_eq!(dt.to_string(), "00000005141436.100001:000");
    }

    #[test]
    fn it_fails_with_malformed_str() {
        let dt_res: Result<CIMDateTime, _> = "20190113200517".parse();

        assert!(dt_res.is_err());
    }

    #[test]
    fn it_fails_with_malformed_str_with_no_tz() {
        let dt_res: Result<CIMDateTime, _> = "20190113200517.000500".parse();

        assert!(dt_res.is_err());
    }

    #[test]
    fn it_fails_with_bad_month() {
        let dt_res: Result<CIMDateTime, _> = "20191313200517.000000+000".parse();

        assert!(dt_res.is_err());
    }

    #[test]
    fn it_serializes_to_cim_string() {
        let dt: CIMDateTime = "20190113200517.500000-180".parse().unwrap();

        let v = serde_json::to_string(&dt).unwrap();
        assert_eq!(v, "\"20190113200517.500000-180\"");
    }
}
