//! Tests for business dates and fee periods

use chrono::{NaiveDate, TimeZone, Utc};
use core_kernel::{FeePeriod, Timezone};

#[test]
fn test_default_timezone_is_jakarta() {
    assert_eq!(Timezone::default().0.name(), "Asia/Jakarta");
}

#[test]
fn test_parse_timezone() {
    assert!(Timezone::parse("Asia/Makassar").is_ok());
    assert!(Timezone::parse("Mars/Olympus").is_err());
}

#[test]
fn test_date_before_utc_midnight_stays_same_day() {
    let tz = Timezone::default();
    let instant = Utc.with_ymd_and_hms(2024, 5, 2, 10, 0, 0).unwrap();
    assert_eq!(tz.date_of(instant), NaiveDate::from_ymd_opt(2024, 5, 2).unwrap());
}

#[test]
fn test_fee_period_of_date() {
    let period = FeePeriod::of(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
    assert_eq!(period, FeePeriod::new(2024, 2).unwrap());
    assert_eq!(period.first_day(), NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
    assert!(period.contains(NaiveDate::from_ymd_opt(2024, 2, 10).unwrap()));
    assert!(!period.contains(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()));
}

#[test]
fn test_fee_period_ordering() {
    let jan = FeePeriod::new(2024, 1).unwrap();
    let dec = FeePeriod::new(2023, 12).unwrap();
    assert!(dec < jan);
}

#[test]
fn test_fee_period_serde() {
    let period = FeePeriod::new(2024, 7).unwrap();
    let json = serde_json::to_string(&period).unwrap();
    assert_eq!(json, "\"2024-07\"");
    let back: FeePeriod = serde_json::from_str(&json).unwrap();
    assert_eq!(back, period);
}
