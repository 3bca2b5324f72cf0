//! Calendar month index used by the monthly grid.
//!
//! Months are totally ordered and support integer shifts, so a lag of `L`
//! months is plain arithmetic on the ordinal rather than a positional shift
//! over whatever months happen to be present.

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Serialized as `"YYYY-MM"` so monthly maps are valid JSON objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Month {
    year: i32,
    month: u32,
}

impl Month {
    /// Returns `None` unless `month` is in 1..=12.
    pub fn new(year: i32, month: u32) -> Option<Self> {
        if (1..=12).contains(&month) {
            Some(Self { year, month })
        } else {
            None
        }
    }

    /// The UTC calendar month containing `ts`.
    pub fn of(ts: &DateTime<Utc>) -> Self {
        Self {
            year: ts.year(),
            month: ts.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// Months since January of year 0.
    pub fn ordinal(&self) -> i64 {
        self.year as i64 * 12 + (self.month as i64 - 1)
    }

    pub fn from_ordinal(ordinal: i64) -> Self {
        Self {
            year: ordinal.div_euclid(12) as i32,
            month: ordinal.rem_euclid(12) as u32 + 1,
        }
    }

    /// Move `months` forward (positive) or backward (negative).
    pub fn shift(self, months: i32) -> Self {
        Self::from_ordinal(self.ordinal() + months as i64)
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for Month {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (year, month) = s
            .split_once('-')
            .ok_or_else(|| format!("expected YYYY-MM, got '{s}'"))?;
        let year: i32 = year.parse().map_err(|_| format!("bad year in '{s}'"))?;
        let month: u32 = month.parse().map_err(|_| format!("bad month in '{s}'"))?;
        Month::new(year, month).ok_or_else(|| format!("month out of range in '{s}'"))
    }
}

impl Serialize for Month {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Month {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn rejects_out_of_range_month() {
        assert!(Month::new(2024, 0).is_none());
        assert!(Month::new(2024, 13).is_none());
        assert!(Month::new(2024, 12).is_some());
    }

    #[test]
    fn shift_crosses_year_boundaries() {
        let jan = Month::new(2024, 1).unwrap();
        assert_eq!(jan.shift(-1), Month::new(2023, 12).unwrap());
        assert_eq!(jan.shift(11), Month::new(2024, 12).unwrap());
        assert_eq!(jan.shift(12), Month::new(2025, 1).unwrap());
        assert_eq!(jan.shift(-25), Month::new(2021, 12).unwrap());
    }

    #[test]
    fn ordinal_roundtrip() {
        let m = Month::new(1999, 7).unwrap();
        assert_eq!(Month::from_ordinal(m.ordinal()), m);
    }

    #[test]
    fn of_uses_utc_calendar() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 31, 23, 59, 59).unwrap();
        assert_eq!(Month::of(&ts), Month::new(2024, 3).unwrap());
        assert_eq!(Month::new(2024, 3).unwrap().to_string(), "2024-03");
    }

    #[test]
    fn parses_display_form() {
        assert_eq!("2024-03".parse::<Month>(), Ok(Month::new(2024, 3).unwrap()));
        assert!("2024-13".parse::<Month>().is_err());
        assert!("202403".parse::<Month>().is_err());
    }

    #[test]
    fn monthly_maps_serialize_as_json_objects() {
        let mut map = std::collections::BTreeMap::new();
        map.insert(Month::new(2024, 1).unwrap(), 1.5);
        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, r#"{"2024-01":1.5}"#);
        let back: std::collections::BTreeMap<Month, f64> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, map);
    }
}
