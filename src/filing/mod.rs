pub mod client;
pub mod dates;
pub mod deadlines;
pub mod lenient;
pub mod stages;
pub mod vat;
pub mod warnings;
pub mod workflow;

// Flat public surface for domain types and functions.
pub use client::{CachedField, Client, ClientInput, ClientRecord, Drift};
pub use dates::{
    describe_due, format_uk_date, parse_date, AccountingReferenceDate, Urgency, NOT_SET,
};
pub use deadlines::{
    accounts_due, confirmation_due, corporation_tax_due, corporation_tax_due_with_override,
    corporation_tax_payment_due, year_end, DeadlineInputs, Deadlines, DueDate, DueSource,
};
pub use stages::{humanize, AccountsStage, Stage, StageInfo, VatStage, WorkflowKind};
pub use vat::{quarters_between, Stagger, VatQuarter};
pub use warnings::Warning;
pub use workflow::{
    period_deadline, set_stage_all, Milestone, StageError, TransitionPolicy, Workflow,
    WorkflowInput, WorkflowRecord,
};

/// Description of one column of a flat input file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub name: &'static str,
    pub required: bool,
    pub description: &'static str,
}
