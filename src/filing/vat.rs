//! VAT stagger groups and quarterly return periods.

use super::dates::{add_days, add_months, last_day_of_month};
use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::fmt;

/// Days after the end of the following month that a return is due
const FILING_GRACE_DAYS: i64 = 7;

/// HMRC stagger group, deciding which months quarters end in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Stagger {
    /// Quarters ending March, June, September, December
    One,
    /// Quarters ending April, July, October, January
    Two,
    /// Quarters ending May, August, November, February
    Three,
}

impl Stagger {
    pub fn from_number(n: u8) -> Option<Self> {
        match n {
            1 => Some(Stagger::One),
            2 => Some(Stagger::Two),
            3 => Some(Stagger::Three),
            _ => None,
        }
    }

    /// Stagger whose quarters end in the given month
    pub fn for_month(month: u32) -> Option<Self> {
        match month {
            1..=12 => Self::from_number((month % 3 + 1) as u8),
            _ => None,
        }
    }

    fn ends_in(&self, month: u32) -> bool {
        Self::for_month(month) == Some(*self)
    }
}

/// One VAT return period
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct VatQuarter {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl VatQuarter {
    /// The quarter of `stagger` that contains `date`
    pub fn containing(stagger: Stagger, date: NaiveDate) -> Option<Self> {
        let (mut year, mut month) = (date.year(), date.month());
        while !stagger.ends_in(month) {
            month += 1;
            if month > 12 {
                month = 1;
                year += 1;
            }
        }
        Self::ending(year, month)
    }

    fn ending(year: i32, month: u32) -> Option<Self> {
        let end = last_day_of_month(year, month)?;
        let start = NaiveDate::from_ymd_opt(year, month, 1)?.checked_sub_months(chrono::Months::new(2))?;
        Some(VatQuarter { start, end })
    }

    pub fn next(&self) -> Option<Self> {
        let following = add_days(self.end, 1)?;
        let end = add_months(following, 2)?;
        Self::ending(end.year(), end.month())
    }

    pub fn deadline(&self) -> Option<NaiveDate> {
        return_deadline(self.end)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

impl fmt::Display for VatQuarter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Q/E {}", self.end.format("%b %Y"))
    }
}

/// Return and payment deadline: one calendar month and seven days after the period
pub fn return_deadline(period_end: NaiveDate) -> Option<NaiveDate> {
    let following = add_months(NaiveDate::from_ymd_opt(period_end.year(), period_end.month(), 1)?, 1)?;
    last_day_of_month(following.year(), following.month()).and_then(|d| add_days(d, FILING_GRACE_DAYS))
}

/// Quarters overlapping `from..=to`, in order
pub fn quarters_between(stagger: Stagger, from: NaiveDate, to: NaiveDate) -> Vec<VatQuarter> {
    let mut quarters = Vec::new();
    if to < from {
        return quarters;
    }
    let mut current = VatQuarter::containing(stagger, from);
    while let Some(q) = current {
        if q.start > to {
            break;
        }
        quarters.push(q);
        current = q.next();
    }
    quarters
}
