use serde::Serialize;
use std::fmt;

/// Data quality warnings raised while reading records. Never fatal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum Warning {
    /// A date field held text that could not be read as a date.
    /// The field is treated as not set.
    UnparseableDate { field: String, value: String },
    /// Accounting reference day/month do not form a calendar date
    InvalidReferenceDate { day: String, month: String },
    /// A later milestone is recorded while an earlier required one is missing
    MilestoneGap { stage: String, missing: String },
    /// Milestone timestamps run backwards relative to stage order
    MilestoneOutOfOrder { earlier: String, later: String },
}

impl Warning {
    pub fn kind(&self) -> &'static str {
        match self {
            Warning::UnparseableDate { .. } => "UnparseableDate",
            Warning::InvalidReferenceDate { .. } => "InvalidReferenceDate",
            Warning::MilestoneGap { .. } => "MilestoneGap",
            Warning::MilestoneOutOfOrder { .. } => "MilestoneOutOfOrder",
        }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::UnparseableDate { field, value } => {
                write!(f, "{field}: '{value}' is not a date, treated as not set")
            }
            Warning::InvalidReferenceDate { day, month } => {
                write!(f, "accounting reference date {day}/{month} is not a calendar date")
            }
            Warning::MilestoneGap { stage, missing } => {
                write!(f, "{stage} recorded but earlier milestone {missing} is missing")
            }
            Warning::MilestoneOutOfOrder { earlier, later } => {
                write!(f, "{later} is timestamped before {earlier}")
            }
        }
    }
}
