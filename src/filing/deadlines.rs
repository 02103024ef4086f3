//! UK statutory deadlines for a limited company client.
//!
//! Every function here is pure: "today" is passed in, missing or invalid
//! inputs resolve to `None`, nothing panics. Year-end precedence is
//! `last_accounts_made_up_to` > accounting reference date > not set.

use super::dates::{add_days, add_months, add_months_month_end, add_years, AccountingReferenceDate};
use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::fmt;

/// Months after year-end a private company must file accounts
const ACCOUNTS_FILING_MONTHS: u32 = 9;
/// Months after incorporation the first accounts are due
const FIRST_ACCOUNTS_MONTHS: u32 = 21;
/// Longest first accounting period, used to recognise a first year-end
const MAX_FIRST_PERIOD_MONTHS: u32 = 18;
/// CT600 return is due 12 months after the period ends
const CT_RETURN_MONTHS: u32 = 12;
/// Corporation tax is payable 9 months and 1 day after the period ends
const CT_PAYMENT_MONTHS: u32 = 9;
/// Days allowed to file a confirmation statement after the review period
const CONFIRMATION_GRACE_DAYS: i64 = 14;

/// Source dates the deadlines are derived from
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeadlineInputs {
    pub accounting_reference_date: Option<AccountingReferenceDate>,
    pub last_accounts_made_up_to: Option<NaiveDate>,
    pub incorporation_date: Option<NaiveDate>,
    pub last_confirmation_made_up_to: Option<NaiveDate>,
}

/// Whether a due date was calculated or entered by hand
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DueSource {
    #[default]
    Auto,
    Manual,
}

impl fmt::Display for DueSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DueSource::Auto => write!(f, "auto"),
            DueSource::Manual => write!(f, "manual"),
        }
    }
}

/// A due date together with where it came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct DueDate {
    pub date: Option<NaiveDate>,
    pub source: DueSource,
}

impl DueDate {
    pub fn auto(date: Option<NaiveDate>) -> Self {
        DueDate {
            date,
            source: DueSource::Auto,
        }
    }

    pub fn manual(date: NaiveDate) -> Self {
        DueDate {
            date: Some(date),
            source: DueSource::Manual,
        }
    }
}

/// Next statutory year-end.
///
/// Exactly one year after the last accounts made-up date when known,
/// otherwise the first occurrence of the accounting reference date after today.
pub fn year_end(inputs: &DeadlineInputs, today: NaiveDate) -> Option<NaiveDate> {
    if let Some(last) = inputs.last_accounts_made_up_to {
        return add_years(last, 1);
    }
    inputs
        .accounting_reference_date
        .and_then(|ard| ard.next_after(today))
}

/// CT600 return due date: year-end plus 12 months
pub fn corporation_tax_due(inputs: &DeadlineInputs, today: NaiveDate) -> Option<NaiveDate> {
    year_end(inputs, today).and_then(|ye| add_months(ye, CT_RETURN_MONTHS))
}

/// Corporation tax due date, a manual override always wins
pub fn corporation_tax_due_with_override(
    inputs: &DeadlineInputs,
    manual: Option<NaiveDate>,
    today: NaiveDate,
) -> DueDate {
    match manual {
        Some(date) => DueDate::manual(date),
        None => DueDate::auto(corporation_tax_due(inputs, today)),
    }
}

/// Corporation tax payment date: year-end plus 9 months and 1 day
pub fn corporation_tax_payment_due(inputs: &DeadlineInputs, today: NaiveDate) -> Option<NaiveDate> {
    year_end(inputs, today)
        .and_then(|ye| add_months_month_end(ye, CT_PAYMENT_MONTHS))
        .and_then(|d| add_days(d, 1))
}

/// Accounts for a period ending on `period_end` are due nine months later
pub fn accounts_filing_deadline(period_end: NaiveDate) -> Option<NaiveDate> {
    add_months_month_end(period_end, ACCOUNTS_FILING_MONTHS)
}

/// Companies House accounts filing deadline.
///
/// Nine months after year-end. A company that has never filed and whose
/// year-end closes its first period files 21 months after incorporation
/// instead, as does one with no resolvable year-end at all.
pub fn accounts_due(inputs: &DeadlineInputs, today: NaiveDate) -> Option<NaiveDate> {
    let first_accounts = || {
        inputs
            .incorporation_date
            .and_then(|inc| add_months(inc, FIRST_ACCOUNTS_MONTHS))
    };

    let Some(ye) = year_end(inputs, today) else {
        return first_accounts();
    };

    if inputs.last_accounts_made_up_to.is_none() {
        if let Some(inc) = inputs.incorporation_date {
            let first_period_end = add_months(inc, MAX_FIRST_PERIOD_MONTHS)?;
            if inc < ye && ye <= first_period_end {
                return first_accounts();
            }
        }
    }
    accounts_filing_deadline(ye)
}

/// Confirmation statement deadline: end of the review period plus 14 days.
///
/// The review period ends a year after the last statement. Without one it
/// ends on an incorporation anniversary: the earliest whose deadline has
/// not yet passed.
pub fn confirmation_due(inputs: &DeadlineInputs, today: NaiveDate) -> Option<NaiveDate> {
    if let Some(last) = inputs.last_confirmation_made_up_to {
        return add_years(last, 1).and_then(|d| add_days(d, CONFIRMATION_GRACE_DAYS));
    }

    let inc = inputs.incorporation_date?;
    let elapsed = u32::try_from(today.year() - inc.year()).unwrap_or(0);
    let start = elapsed.saturating_sub(1).max(1);
    (start..start + 3)
        .filter_map(|n| add_years(inc, n).and_then(|d| add_days(d, CONFIRMATION_GRACE_DAYS)))
        .find(|due| *due >= today)
}

/// All statutory dates for one client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Deadlines {
    pub year_end: Option<NaiveDate>,
    pub accounts_due: Option<NaiveDate>,
    pub corporation_tax_due: DueDate,
    pub corporation_tax_payment_due: Option<NaiveDate>,
    pub confirmation_due: Option<NaiveDate>,
}

impl Deadlines {
    pub fn calculate(
        inputs: &DeadlineInputs,
        ct_override: Option<NaiveDate>,
        today: NaiveDate,
    ) -> Self {
        let deadlines = Deadlines {
            year_end: year_end(inputs, today),
            accounts_due: accounts_due(inputs, today),
            corporation_tax_due: corporation_tax_due_with_override(inputs, ct_override, today),
            corporation_tax_payment_due: corporation_tax_payment_due(inputs, today),
            confirmation_due: confirmation_due(inputs, today),
        };
        log::debug!("Deadlines from {:?} at {}: {:?}", inputs, today, deadlines);
        deadlines
    }

    /// The earliest deadline, with its name
    pub fn next(&self) -> Option<(&'static str, NaiveDate)> {
        [
            ("Accounts", self.accounts_due),
            ("CT payment", self.corporation_tax_payment_due),
            ("CT600", self.corporation_tax_due.date),
            ("Confirmation", self.confirmation_due),
        ]
        .into_iter()
        .filter_map(|(name, date)| date.map(|d| (name, d)))
        .min_by_key(|(_, d)| *d)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn with_ard(day: u32, month: u32) -> DeadlineInputs {
        DeadlineInputs {
            accounting_reference_date: AccountingReferenceDate::new(day, month),
            ..Default::default()
        }
    }

    #[test]
    fn year_end_from_reference_date() {
        let inputs = with_ard(31, 3);
        let today = d(2024, 6, 1);
        assert_eq!(year_end(&inputs, today), Some(d(2025, 3, 31)));
        assert_eq!(corporation_tax_due(&inputs, today), Some(d(2026, 3, 31)));
    }

    #[test]
    fn year_end_on_reference_date_advances() {
        let inputs = with_ard(31, 3);
        assert_eq!(year_end(&inputs, d(2024, 3, 31)), Some(d(2025, 3, 31)));
        assert_eq!(year_end(&inputs, d(2024, 3, 30)), Some(d(2024, 3, 31)));
    }

    #[test]
    fn last_accounts_take_precedence() {
        let inputs = DeadlineInputs {
            last_accounts_made_up_to: Some(d(2023, 12, 31)),
            ..with_ard(31, 3)
        };
        let today = d(2024, 6, 1);
        assert_eq!(year_end(&inputs, today), Some(d(2024, 12, 31)));
        assert_eq!(corporation_tax_due(&inputs, today), Some(d(2025, 12, 31)));
    }

    #[test]
    fn nothing_set_resolves_to_none() {
        let inputs = DeadlineInputs::default();
        let today = d(2024, 6, 1);
        assert_eq!(year_end(&inputs, today), None);
        assert_eq!(corporation_tax_due(&inputs, today), None);
        assert_eq!(corporation_tax_payment_due(&inputs, today), None);
        assert_eq!(accounts_due(&inputs, today), None);
        assert_eq!(confirmation_due(&inputs, today), None);
        assert_eq!(Deadlines::calculate(&inputs, None, today).next(), None);
    }

    #[test]
    fn reference_year_end_within_a_year_of_today() {
        let todays = [d(2024, 1, 1), d(2024, 2, 29), d(2024, 6, 1), d(2023, 12, 31)];
        for today in todays {
            for month in 1..=12 {
                for day in 1..=31 {
                    let inputs = with_ard(day, month);
                    if inputs.accounting_reference_date.is_none() {
                        assert_eq!(year_end(&inputs, today), None);
                        continue;
                    }
                    let ye = year_end(&inputs, today).unwrap();
                    assert!(ye >= today, "{ye} before {today}");
                    assert!(ye <= add_years(today, 1).unwrap(), "{ye} too far from {today}");
                    assert_eq!(corporation_tax_due(&inputs, today), add_years(ye, 1));
                    assert_eq!(year_end(&inputs, today), Some(ye));
                }
            }
        }
    }

    #[test]
    fn leap_day_last_accounts() {
        let inputs = DeadlineInputs {
            last_accounts_made_up_to: Some(d(2024, 2, 29)),
            ..Default::default()
        };
        let today = d(2024, 6, 1);
        assert_eq!(year_end(&inputs, today), Some(d(2025, 2, 28)));
        assert_eq!(corporation_tax_due(&inputs, today), Some(d(2026, 2, 28)));
    }

    #[test]
    fn manual_override_wins() {
        let inputs = with_ard(31, 3);
        let today = d(2024, 6, 1);
        let auto = corporation_tax_due_with_override(&inputs, None, today);
        assert_eq!(auto, DueDate::auto(Some(d(2026, 3, 31))));

        let manual = corporation_tax_due_with_override(&inputs, Some(d(2026, 1, 15)), today);
        assert_eq!(manual.date, Some(d(2026, 1, 15)));
        assert_eq!(manual.source, DueSource::Manual);

        let only_manual =
            corporation_tax_due_with_override(&DeadlineInputs::default(), Some(d(2026, 1, 15)), today);
        assert_eq!(only_manual.source, DueSource::Manual);
        assert_eq!(DueSource::Manual.to_string(), "manual");
    }

    #[test]
    fn payment_due_nine_months_and_a_day() {
        let inputs = with_ard(31, 3);
        assert_eq!(
            corporation_tax_payment_due(&inputs, d(2024, 6, 1)),
            Some(d(2026, 1, 1))
        );
        let dec = with_ard(31, 12);
        assert_eq!(
            corporation_tax_payment_due(&dec, d(2024, 6, 1)),
            Some(d(2025, 10, 1))
        );
    }

    #[test]
    fn accounts_due_nine_months_after_year_end() {
        let inputs = DeadlineInputs {
            last_accounts_made_up_to: Some(d(2023, 3, 31)),
            incorporation_date: Some(d(2010, 5, 4)),
            ..Default::default()
        };
        assert_eq!(accounts_due(&inputs, d(2024, 6, 1)), Some(d(2024, 12, 31)));
    }

    #[test]
    fn month_end_periods_file_on_month_end() {
        let inputs = DeadlineInputs {
            last_accounts_made_up_to: Some(d(2022, 6, 30)),
            ..Default::default()
        };
        let today = d(2024, 6, 1);
        assert_eq!(year_end(&inputs, today), Some(d(2023, 6, 30)));
        assert_eq!(accounts_due(&inputs, today), Some(d(2024, 3, 31)));
        assert_eq!(corporation_tax_payment_due(&inputs, today), Some(d(2024, 4, 1)));
        assert_eq!(corporation_tax_due(&inputs, today), Some(d(2024, 6, 30)));
    }

    #[test]
    fn first_accounts_due_21_months_after_incorporation() {
        let inputs = DeadlineInputs {
            incorporation_date: Some(d(2024, 1, 15)),
            ..with_ard(31, 1)
        };
        let today = d(2024, 6, 1);
        assert_eq!(year_end(&inputs, today), Some(d(2025, 1, 31)));
        assert_eq!(accounts_due(&inputs, today), Some(d(2025, 10, 15)));
    }

    #[test]
    fn established_company_without_filing_history_uses_year_end() {
        let inputs = DeadlineInputs {
            incorporation_date: Some(d(2015, 1, 15)),
            ..with_ard(31, 1)
        };
        assert_eq!(accounts_due(&inputs, d(2024, 6, 1)), Some(d(2025, 10, 31)));
    }

    #[test]
    fn accounts_due_from_incorporation_only() {
        let inputs = DeadlineInputs {
            incorporation_date: Some(d(2024, 5, 31)),
            ..Default::default()
        };
        assert_eq!(accounts_due(&inputs, d(2024, 6, 1)), Some(d(2026, 2, 28)));
    }

    #[test]
    fn confirmation_due_from_last_statement() {
        let inputs = DeadlineInputs {
            last_confirmation_made_up_to: Some(d(2024, 4, 10)),
            incorporation_date: Some(d(2018, 4, 10)),
            ..Default::default()
        };
        assert_eq!(confirmation_due(&inputs, d(2024, 6, 1)), Some(d(2025, 4, 24)));
    }

    #[test]
    fn confirmation_due_from_incorporation_anniversary() {
        let inputs = DeadlineInputs {
            incorporation_date: Some(d(2018, 4, 10)),
            ..Default::default()
        };
        assert_eq!(confirmation_due(&inputs, d(2024, 6, 1)), Some(d(2025, 4, 24)));
        // Still inside this year's 14 day window
        assert_eq!(confirmation_due(&inputs, d(2024, 4, 20)), Some(d(2024, 4, 24)));
        assert_eq!(confirmation_due(&inputs, d(2024, 4, 24)), Some(d(2024, 4, 24)));
        assert_eq!(confirmation_due(&inputs, d(2024, 4, 25)), Some(d(2025, 4, 24)));
    }

    #[test]
    fn confirmation_due_for_new_company() {
        let inputs = DeadlineInputs {
            incorporation_date: Some(d(2024, 3, 1)),
            ..Default::default()
        };
        assert_eq!(confirmation_due(&inputs, d(2024, 6, 1)), Some(d(2025, 3, 15)));
        // Incorporated after "today"
        assert_eq!(confirmation_due(&inputs, d(2023, 6, 1)), Some(d(2025, 3, 15)));
    }

    #[test]
    fn next_picks_earliest() {
        let inputs = DeadlineInputs {
            last_accounts_made_up_to: Some(d(2023, 12, 31)),
            incorporation_date: Some(d(2015, 8, 20)),
            ..Default::default()
        };
        let deadlines = Deadlines::calculate(&inputs, None, d(2024, 6, 1));
        assert_eq!(deadlines.confirmation_due, Some(d(2024, 9, 3)));
        assert_eq!(deadlines.next(), Some(("Confirmation", d(2024, 9, 3))));
    }
}
