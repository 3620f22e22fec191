/// Utilities for date and time formatting
///
/// Фильтры хранят дату в виде `MM/DD/YYYY h:mm A` (так её показывает поле
/// ввода и так она попадает в адресную строку), API принимает unix-время.
use chrono::{DateTime, Duration, Local, NaiveDate, NaiveDateTime, TimeZone, Timelike};

const FILTER_FORMATS: &[&str] = &["%m/%d/%Y %I:%M %p", "%m/%d/%Y %H:%M", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M"];

/// Format a datetime the way filter inputs show it
/// Example: 2017-04-13 09:05 → "04/13/2017 9:05 AM"
pub fn format_filter_datetime<Tz: TimeZone>(dt: &DateTime<Tz>) -> String {
    let naive = dt.naive_local();
    let (is_pm, hour) = naive.hour12();
    format!(
        "{} {}:{:02} {}",
        naive.format("%m/%d/%Y"),
        hour,
        naive.minute(),
        if is_pm { "PM" } else { "AM" }
    )
}

fn parse_naive(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    FILTER_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%m/%d/%Y")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Parse a filter value as local time in `tz` and return the unix timestamp
pub fn filter_datetime_to_unix<Tz: TimeZone>(value: &str, tz: &Tz) -> Option<i64> {
    let naive = parse_naive(value)?;
    tz.from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.timestamp())
}

/// Same as [`filter_datetime_to_unix`] in the browser's zone
pub fn filter_datetime_to_unix_local(value: &str) -> Option<i64> {
    filter_datetime_to_unix(value, &Local)
}

/// Default `incidentStart` filter: `now - hours`
pub fn default_incident_start<Tz: TimeZone>(now: &DateTime<Tz>, hours: i64) -> String {
    format_filter_datetime(&(now.clone() - Duration::hours(hours)))
}

/// Unix seconds → "2017/04/13 09:05:12"
pub fn format_unix_in<Tz: TimeZone>(ts: i64, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    match tz.timestamp_opt(ts, 0).single() {
        Some(dt) => dt.format("%Y/%m/%d %H:%M:%S").to_string(),
        None => ts.to_string(),
    }
}

pub fn format_unix(ts: i64) -> String {
    format_unix_in(ts, &Local)
}

pub fn format_opt_unix(ts: Option<i64>) -> String {
    ts.map(format_unix).unwrap_or_default()
}

/// Label of a plan/template version: "ID 42 - 2017/04/13 09:05:12 GMT+0200 by alice"
pub fn version_label_in<Tz: TimeZone>(id: i64, created: i64, creator: &str, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let when = match tz.timestamp_opt(created, 0).single() {
        Some(dt) => dt.format("%Y/%m/%d %H:%M:%S GMT%z").to_string(),
        None => created.to_string(),
    };
    format!("ID {} - {} by {}", id, when, creator)
}

pub fn version_label(id: i64, created: i64, creator: &str) -> String {
    version_label_in(id, created, creator, &Local)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};

    #[test]
    fn test_format_filter_datetime() {
        let dt = Utc.with_ymd_and_hms(2017, 4, 13, 9, 5, 0).unwrap();
        assert_eq!(format_filter_datetime(&dt), "04/13/2017 9:05 AM");
        let dt = Utc.with_ymd_and_hms(2017, 4, 13, 21, 30, 0).unwrap();
        assert_eq!(format_filter_datetime(&dt), "04/13/2017 9:30 PM");
        let dt = Utc.with_ymd_and_hms(2017, 4, 13, 0, 0, 0).unwrap();
        assert_eq!(format_filter_datetime(&dt), "04/13/2017 12:00 AM");
    }

    #[test]
    fn test_filter_datetime_to_unix() {
        assert_eq!(
            filter_datetime_to_unix("04/13/2017 9:05 AM", &Utc),
            Some(Utc.with_ymd_and_hms(2017, 4, 13, 9, 5, 0).unwrap().timestamp())
        );
        let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();
        assert_eq!(
            filter_datetime_to_unix("04/13/2017 11:05 AM", &plus_two),
            filter_datetime_to_unix("04/13/2017 9:05 AM", &Utc)
        );
        assert_eq!(filter_datetime_to_unix("not a date", &Utc), None);
        assert_eq!(filter_datetime_to_unix("", &Utc), None);
    }

    #[test]
    fn test_round_trip_through_filter_format() {
        let dt = Utc.with_ymd_and_hms(2024, 3, 15, 14, 2, 0).unwrap();
        let shown = format_filter_datetime(&dt);
        assert_eq!(filter_datetime_to_unix(&shown, &Utc), Some(dt.timestamp()));
    }

    #[test]
    fn test_default_incident_start() {
        let now = Utc.with_ymd_and_hms(2017, 4, 14, 9, 5, 0).unwrap();
        assert_eq!(default_incident_start(&now, 24), "04/13/2017 9:05 AM");
    }

    #[test]
    fn test_version_label() {
        let created = Utc.with_ymd_and_hms(2017, 4, 13, 9, 5, 12).unwrap().timestamp();
        assert_eq!(
            version_label_in(42, created, "alice", &Utc),
            "ID 42 - 2017/04/13 09:05:12 GMT+0000 by alice"
        );
        assert_eq!(format_unix_in(created, &Utc), "2017/04/13 09:05:12");
    }
}
