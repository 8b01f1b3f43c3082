//! 时间工具函数: 业务时区 (UTC+5:30)
//!
//! 账单号日期与订单时间范围都按固定 +05:30 偏移计算，
//! repository 层只接收 `i64` Unix millis。

use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, Offset, TimeZone, Utc};

/// Business offset in minutes east of UTC
pub const BUSINESS_OFFSET_MINUTES: i32 = 330;

/// Fixed +05:30 offset
pub fn business_offset() -> FixedOffset {
    // east_opt only rejects offsets beyond ±24h
    FixedOffset::east_opt(BUSINESS_OFFSET_MINUTES * 60).unwrap_or_else(|| Utc.fix())
}

/// Instant in the business frame
pub fn to_business(instant: DateTime<Utc>) -> DateTime<FixedOffset> {
    instant.with_timezone(&business_offset())
}

/// Civil date of an instant in the business frame
pub fn business_date(instant: DateTime<Utc>) -> NaiveDate {
    to_business(instant).date_naive()
}

/// Local midnight of `date` in the business frame, as Unix millis
pub fn day_start_millis(date: NaiveDate) -> i64 {
    let naive = date.and_time(chrono::NaiveTime::MIN);
    business_offset()
        .from_local_datetime(&naive)
        .single()
        .map(|dt| dt.timestamp_millis())
        .unwrap_or_else(|| naive.and_utc().timestamp_millis())
}

/// Lower bound (inclusive) in Unix millis for a list time range
///
/// - `today`: since local midnight
/// - `week`: last 7 days
/// - `month`: since the first of the local month
/// - `all`: no bound
pub fn range_start_millis(range: TimeRange, now: DateTime<Utc>) -> Option<i64> {
    match range {
        TimeRange::Today => Some(day_start_millis(business_date(now))),
        TimeRange::Week => Some((now - Duration::days(7)).timestamp_millis()),
        TimeRange::Month => {
            let today = business_date(now);
            let first = today.with_day(1).unwrap_or(today);
            Some(day_start_millis(first))
        }
        TimeRange::All => None,
    }
}

/// Time range filter of list endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeRange {
    Today,
    Week,
    Month,
    #[default]
    All,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_business_date_rolls_over_at_1830_utc() {
        let before = Utc.with_ymd_and_hms(2025, 3, 9, 18, 29, 59).unwrap();
        let after = Utc.with_ymd_and_hms(2025, 3, 9, 18, 30, 0).unwrap();
        assert_eq!(business_date(before), NaiveDate::from_ymd_opt(2025, 3, 9).unwrap());
        assert_eq!(business_date(after), NaiveDate::from_ymd_opt(2025, 3, 10).unwrap());
    }

    #[test]
    fn test_day_start_is_previous_utc_evening() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        let expected = Utc.with_ymd_and_hms(2025, 3, 9, 18, 30, 0).unwrap();
        assert_eq!(day_start_millis(date), expected.timestamp_millis());
    }

    #[test]
    fn test_range_start() {
        let now = Utc.with_ymd_and_hms(2025, 3, 15, 12, 0, 0).unwrap();
        assert_eq!(range_start_millis(TimeRange::All, now), None);
        assert_eq!(
            range_start_millis(TimeRange::Week, now),
            Some((now - Duration::days(7)).timestamp_millis())
        );
        let month_start = Utc.with_ymd_and_hms(2025, 2, 28, 18, 30, 0).unwrap();
        assert_eq!(
            range_start_millis(TimeRange::Month, now),
            Some(month_start.timestamp_millis())
        );
    }
}
