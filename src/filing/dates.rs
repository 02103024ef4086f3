use chrono::{DateTime, Datelike, Duration, Months, NaiveDate, NaiveDateTime};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Rendered in place of any date that cannot be resolved
pub const NOT_SET: &str = "Not set";

/// Deadlines this close (in days) are flagged as due soon
pub const DUE_SOON_DAYS: i64 = 30;

/// Parse a date-like string leniently.
///
/// Accepts `YYYY-MM-DD`, RFC 3339 timestamps, naive `YYYY-MM-DDTHH:MM:SS[.fff]`
/// and UK `dd/mm/yyyy`. Anything else is `None`.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(date);
    }
    // Timestamps keep the date as written, the offset is not applied
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    NaiveDate::parse_from_str(s, "%d/%m/%Y").ok()
}

/// Parse a timestamp string leniently, date-only values land on midnight.
///
/// Like `parse_date`, the wall-clock time is kept as written and the offset is dropped.
pub fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local());
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    parse_date(s).and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Add calendar months, clamping to the end of the target month
pub fn add_months(date: NaiveDate, months: u32) -> Option<NaiveDate> {
    date.checked_add_months(Months::new(months))
}

/// Add calendar months, keeping a month-end date on the month end.
///
/// Statutory periods ending on the last day of a month run to the last day
/// of the target month, so 30 June plus nine months is 31 March.
pub fn add_months_month_end(date: NaiveDate, months: u32) -> Option<NaiveDate> {
    let shifted = add_months(date, months)?;
    let is_month_end = date.succ_opt().is_some_and(|next| next.month() != date.month());
    if is_month_end {
        last_day_of_month(shifted.year(), shifted.month())
    } else {
        Some(shifted)
    }
}

/// Add whole years. 29 February lands on 28 February in common years.
pub fn add_years(date: NaiveDate, years: u32) -> Option<NaiveDate> {
    years.checked_mul(12).and_then(|m| add_months(date, m))
}

pub fn add_days(date: NaiveDate, days: i64) -> Option<NaiveDate> {
    date.checked_add_signed(Duration::days(days))
}

pub fn last_day_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|first| add_months(first, 1))
        .and_then(|next| next.pred_opt())
}

/// Format as `dd/mm/yyyy`, or "Not set"
pub fn format_uk_date(date: Option<NaiveDate>) -> String {
    match date {
        Some(d) => d.format("%d/%m/%Y").to_string(),
        None => NOT_SET.to_string(),
    }
}

/// Signed number of days from `today` until `date`
pub fn days_until(date: NaiveDate, today: NaiveDate) -> i64 {
    (date - today).num_days()
}

/// Human readable distance to a deadline, e.g. "Due in 3 days" or "2 days overdue"
pub fn describe_due(date: Option<NaiveDate>, today: NaiveDate) -> String {
    let Some(date) = date else {
        return NOT_SET.to_string();
    };
    match days_until(date, today) {
        0 => "Due today".to_string(),
        1 => "Due in 1 day".to_string(),
        -1 => "1 day overdue".to_string(),
        n if n > 0 => format!("Due in {n} days"),
        n => format!("{} days overdue", -n),
    }
}

/// Badge classification for a deadline relative to today
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum Urgency {
    Overdue,
    DueSoon,
    Upcoming,
    NotSet,
}

impl Urgency {
    pub fn classify(date: Option<NaiveDate>, today: NaiveDate) -> Self {
        match date.map(|d| days_until(d, today)) {
            None => Urgency::NotSet,
            Some(n) if n < 0 => Urgency::Overdue,
            Some(n) if n <= DUE_SOON_DAYS => Urgency::DueSoon,
            Some(_) => Urgency::Upcoming,
        }
    }

    pub fn display(&self) -> &'static str {
        match self {
            Urgency::Overdue => "Overdue",
            Urgency::DueSoon => "Due soon",
            Urgency::Upcoming => "Upcoming",
            Urgency::NotSet => NOT_SET,
        }
    }
}

impl fmt::Display for Urgency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display())
    }
}

/// Day/month pair a company's accounting periods end on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct AccountingReferenceDate {
    pub day: u32,
    pub month: u32,
}

impl AccountingReferenceDate {
    /// Validates against a leap year so that 29/02 is accepted
    pub fn new(day: u32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(2000, month, day).map(|_| AccountingReferenceDate { day, month })
    }

    /// Parse day and month given as text, e.g. Companies House's `"31"` / `"03"`
    pub fn parse(day: &str, month: &str) -> Option<Self> {
        let day = day.trim().parse().ok()?;
        let month = month.trim().parse().ok()?;
        Self::new(day, month)
    }

    /// The reference date in `year`, 29/02 clamps to 28/02 in common years
    pub fn in_year(&self, year: i32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(year, self.month, self.day)
            .or_else(|| last_day_of_month(year, self.month).filter(|d| d.day() < self.day))
    }

    /// First occurrence strictly after `today`
    pub fn next_after(&self, today: NaiveDate) -> Option<NaiveDate> {
        let this_year = self.in_year(today.year())?;
        if this_year <= today {
            self.in_year(today.year() + 1)
        } else {
            Some(this_year)
        }
    }
}

impl fmt::Display for AccountingReferenceDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}/{:02}", self.day, self.month)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn parse_date_formats() {
        assert_eq!(parse_date("2024-03-31"), Some(d(2024, 3, 31)));
        assert_eq!(parse_date("2024-03-31T00:00:00.000Z"), Some(d(2024, 3, 31)));
        assert_eq!(parse_date("2024-03-31T10:15:00+01:00"), Some(d(2024, 3, 31)));
        assert_eq!(parse_date("2024-03-31T10:15:00"), Some(d(2024, 3, 31)));
        assert_eq!(parse_date("2024-03-31 10:15:00.250"), Some(d(2024, 3, 31)));
        assert_eq!(parse_date(" 31/03/2024 "), Some(d(2024, 3, 31)));
    }

    #[test]
    fn parse_date_rejects_garbage() {
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("   "), None);
        assert_eq!(parse_date("not a date"), None);
        assert_eq!(parse_date("2024-02-30"), None);
        assert_eq!(parse_date("31/13/2024"), None);
    }

    #[test]
    fn parse_datetime_keeps_time() {
        let dt = parse_datetime("2024-05-01T09:30:00Z").unwrap();
        assert_eq!(dt, d(2024, 5, 1).and_hms_opt(9, 30, 0).unwrap());
        // Offset dropped, same wall clock as parse_date
        let bst = parse_datetime("2024-05-01T00:30:00+01:00").unwrap();
        assert_eq!(bst, d(2024, 5, 1).and_hms_opt(0, 30, 0).unwrap());
        assert_eq!(Some(bst.date()), parse_date("2024-05-01T00:30:00+01:00"));
        let midnight = parse_datetime("2024-05-01").unwrap();
        assert_eq!(midnight, d(2024, 5, 1).and_hms_opt(0, 0, 0).unwrap());
        assert_eq!(parse_datetime("yesterday"), None);
    }

    #[test]
    fn add_years_clamps_leap_day() {
        assert_eq!(add_years(d(2024, 2, 29), 1), Some(d(2025, 2, 28)));
        assert_eq!(add_years(d(2024, 2, 29), 4), Some(d(2028, 2, 29)));
        assert_eq!(add_years(d(2023, 12, 31), 1), Some(d(2024, 12, 31)));
    }

    #[test]
    fn add_months_clamps_to_month_end() {
        assert_eq!(add_months(d(2024, 3, 31), 9), Some(d(2024, 12, 31)));
        assert_eq!(add_months(d(2024, 5, 31), 9), Some(d(2025, 2, 28)));
        assert_eq!(add_months(d(2024, 1, 31), 1), Some(d(2024, 2, 29)));
    }

    #[test]
    fn month_end_dates_stay_on_month_end() {
        assert_eq!(add_months_month_end(d(2023, 6, 30), 9), Some(d(2024, 3, 31)));
        assert_eq!(add_months_month_end(d(2023, 2, 28), 12), Some(d(2024, 2, 29)));
        assert_eq!(add_months_month_end(d(2023, 6, 29), 9), Some(d(2024, 3, 29)));
        assert_eq!(add_months_month_end(d(2024, 4, 30), 9), Some(d(2025, 1, 31)));
    }

    #[test]
    fn last_day_of_each_month() {
        assert_eq!(last_day_of_month(2024, 2), Some(d(2024, 2, 29)));
        assert_eq!(last_day_of_month(2023, 2), Some(d(2023, 2, 28)));
        assert_eq!(last_day_of_month(2024, 12), Some(d(2024, 12, 31)));
        assert_eq!(last_day_of_month(2024, 13), None);
    }

    #[test]
    fn format_uk() {
        assert_eq!(format_uk_date(Some(d(2025, 3, 31))), "31/03/2025");
        assert_eq!(format_uk_date(Some(d(2025, 1, 5))), "05/01/2025");
        assert_eq!(format_uk_date(None), "Not set");
    }

    #[test]
    fn describe_due_phrases() {
        let today = d(2024, 6, 1);
        assert_eq!(describe_due(Some(today), today), "Due today");
        assert_eq!(describe_due(Some(d(2024, 6, 2)), today), "Due in 1 day");
        assert_eq!(describe_due(Some(d(2024, 6, 11)), today), "Due in 10 days");
        assert_eq!(describe_due(Some(d(2024, 5, 31)), today), "1 day overdue");
        assert_eq!(describe_due(Some(d(2024, 5, 2)), today), "30 days overdue");
        assert_eq!(describe_due(None, today), "Not set");
    }

    #[test]
    fn urgency_thresholds() {
        let today = d(2024, 6, 1);
        assert_eq!(Urgency::classify(None, today), Urgency::NotSet);
        assert_eq!(Urgency::classify(Some(d(2024, 5, 31)), today), Urgency::Overdue);
        assert_eq!(Urgency::classify(Some(today), today), Urgency::DueSoon);
        assert_eq!(Urgency::classify(Some(d(2024, 7, 1)), today), Urgency::DueSoon);
        assert_eq!(Urgency::classify(Some(d(2024, 7, 2)), today), Urgency::Upcoming);
    }

    #[test]
    fn reference_date_validation() {
        assert!(AccountingReferenceDate::new(31, 3).is_some());
        assert!(AccountingReferenceDate::new(29, 2).is_some());
        assert!(AccountingReferenceDate::new(30, 2).is_none());
        assert!(AccountingReferenceDate::new(31, 4).is_none());
        assert!(AccountingReferenceDate::new(0, 1).is_none());
        assert!(AccountingReferenceDate::new(1, 13).is_none());
        assert_eq!(
            AccountingReferenceDate::parse("31", "03"),
            AccountingReferenceDate::new(31, 3)
        );
        assert_eq!(AccountingReferenceDate::parse("x", "03"), None);
    }

    #[test]
    fn reference_date_leap_day_clamps() {
        let ard = AccountingReferenceDate::new(29, 2).unwrap();
        assert_eq!(ard.in_year(2024), Some(d(2024, 2, 29)));
        assert_eq!(ard.in_year(2025), Some(d(2025, 2, 28)));
    }

    #[test]
    fn reference_date_next_after() {
        let ard = AccountingReferenceDate::new(31, 3).unwrap();
        assert_eq!(ard.next_after(d(2024, 6, 1)), Some(d(2025, 3, 31)));
        assert_eq!(ard.next_after(d(2024, 3, 31)), Some(d(2025, 3, 31)));
        assert_eq!(ard.next_after(d(2024, 3, 30)), Some(d(2024, 3, 31)));
        assert_eq!(ard.to_string(), "31/03");
    }
}
