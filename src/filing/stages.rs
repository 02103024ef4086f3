//! Fixed stage enumerations for each workflow type.
//!
//! The registry is purely descriptive: any stage may follow any other.
//! Ordering only matters for display and for the milestone audit.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

/// Kind of filing workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowKind {
    VatQuarter,
    LtdAccounts,
}

impl WorkflowKind {
    pub fn display(&self) -> &'static str {
        match self {
            WorkflowKind::VatQuarter => "VAT quarter",
            WorkflowKind::LtdAccounts => "Ltd accounts",
        }
    }

    /// Stage table for this workflow type
    pub fn stages(&self) -> Vec<StageInfo> {
        match self {
            WorkflowKind::VatQuarter => stage_infos::<VatStage>(),
            WorkflowKind::LtdAccounts => stage_infos::<AccountsStage>(),
        }
    }

    /// Display label for a persisted stage code. Unknown codes are humanized.
    pub fn label(&self, code: &str) -> Cow<'static, str> {
        let known = match self {
            WorkflowKind::VatQuarter => VatStage::from_code(code).map(VatStage::label),
            WorkflowKind::LtdAccounts => AccountsStage::from_code(code).map(AccountsStage::label),
        };
        match known {
            Some(label) => Cow::Borrowed(label),
            None => Cow::Owned(humanize(code)),
        }
    }
}

impl fmt::Display for WorkflowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display())
    }
}

/// A stage in one workflow type's fixed enumeration
pub trait Stage: Copy + Eq + Ord + fmt::Debug + 'static {
    const KIND: WorkflowKind;
    /// Every stage, in workflow order
    const ALL: &'static [Self];

    fn code(self) -> &'static str;
    fn label(self) -> &'static str;

    /// Optional stages may be skipped without leaving a milestone gap
    fn is_required(self) -> bool {
        true
    }

    /// Reaching a terminal stage completes the workflow
    fn is_terminal(self) -> bool;

    fn from_code(code: &str) -> Option<Self> {
        let code = code.trim();
        Self::ALL.iter().copied().find(|s| s.code() == code)
    }

    fn position(self) -> usize {
        Self::ALL.iter().position(|s| *s == self).unwrap_or(0)
    }

    fn first() -> Self {
        Self::ALL[0]
    }
}

/// VAT quarterly return stages
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum VatStage {
    AwaitingRecords,
    RecordsRequested,
    RecordsReceived,
    InProgress,
    QueryRaised,
    ReadyForReview,
    Reviewed,
    SentToClient,
    ClientApproved,
    Filed,
}

impl Stage for VatStage {
    const KIND: WorkflowKind = WorkflowKind::VatQuarter;
    const ALL: &'static [Self] = &[
        VatStage::AwaitingRecords,
        VatStage::RecordsRequested,
        VatStage::RecordsReceived,
        VatStage::InProgress,
        VatStage::QueryRaised,
        VatStage::ReadyForReview,
        VatStage::Reviewed,
        VatStage::SentToClient,
        VatStage::ClientApproved,
        VatStage::Filed,
    ];

    fn code(self) -> &'static str {
        match self {
            VatStage::AwaitingRecords => "awaiting_records",
            VatStage::RecordsRequested => "records_requested",
            VatStage::RecordsReceived => "records_received",
            VatStage::InProgress => "in_progress",
            VatStage::QueryRaised => "query_raised",
            VatStage::ReadyForReview => "ready_for_review",
            VatStage::Reviewed => "reviewed",
            VatStage::SentToClient => "sent_to_client",
            VatStage::ClientApproved => "client_approved",
            VatStage::Filed => "filed",
        }
    }

    fn label(self) -> &'static str {
        match self {
            VatStage::AwaitingRecords => "Awaiting Records",
            VatStage::RecordsRequested => "Records Requested",
            VatStage::RecordsReceived => "Records Received",
            VatStage::InProgress => "In Progress",
            VatStage::QueryRaised => "Query Raised",
            VatStage::ReadyForReview => "Ready for Review",
            VatStage::Reviewed => "Reviewed",
            VatStage::SentToClient => "Sent to Client",
            VatStage::ClientApproved => "Client Approved",
            VatStage::Filed => "Filed with HMRC",
        }
    }

    fn is_required(self) -> bool {
        !matches!(self, VatStage::AwaitingRecords | VatStage::QueryRaised)
    }

    fn is_terminal(self) -> bool {
        self == VatStage::Filed
    }
}

/// Ltd company annual accounts stages
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AccountsStage {
    AwaitingRecords,
    RecordsRequested,
    RecordsReceived,
    Bookkeeping,
    AccountsDrafted,
    QueryRaised,
    PartnerReview,
    SentToClient,
    ClientApproved,
    AccountsFiled,
    Ct600Filed,
    Filed,
}

impl Stage for AccountsStage {
    const KIND: WorkflowKind = WorkflowKind::LtdAccounts;
    const ALL: &'static [Self] = &[
        AccountsStage::AwaitingRecords,
        AccountsStage::RecordsRequested,
        AccountsStage::RecordsReceived,
        AccountsStage::Bookkeeping,
        AccountsStage::AccountsDrafted,
        AccountsStage::QueryRaised,
        AccountsStage::PartnerReview,
        AccountsStage::SentToClient,
        AccountsStage::ClientApproved,
        AccountsStage::AccountsFiled,
        AccountsStage::Ct600Filed,
        AccountsStage::Filed,
    ];

    fn code(self) -> &'static str {
        match self {
            AccountsStage::AwaitingRecords => "awaiting_records",
            AccountsStage::RecordsRequested => "records_requested",
            AccountsStage::RecordsReceived => "records_received",
            AccountsStage::Bookkeeping => "bookkeeping",
            AccountsStage::AccountsDrafted => "accounts_drafted",
            AccountsStage::QueryRaised => "query_raised",
            AccountsStage::PartnerReview => "partner_review",
            AccountsStage::SentToClient => "sent_to_client",
            AccountsStage::ClientApproved => "client_approved",
            AccountsStage::AccountsFiled => "accounts_filed",
            AccountsStage::Ct600Filed => "ct600_filed",
            AccountsStage::Filed => "filed",
        }
    }

    fn label(self) -> &'static str {
        match self {
            AccountsStage::AwaitingRecords => "Awaiting Records",
            AccountsStage::RecordsRequested => "Records Requested",
            AccountsStage::RecordsReceived => "Records Received",
            AccountsStage::Bookkeeping => "Bookkeeping",
            AccountsStage::AccountsDrafted => "Accounts Drafted",
            AccountsStage::QueryRaised => "Query Raised",
            AccountsStage::PartnerReview => "Partner Review",
            AccountsStage::SentToClient => "Sent to Client",
            AccountsStage::ClientApproved => "Client Approved",
            AccountsStage::AccountsFiled => "Accounts Filed at Companies House",
            AccountsStage::Ct600Filed => "CT600 Filed",
            AccountsStage::Filed => "Filed",
        }
    }

    fn is_required(self) -> bool {
        !matches!(
            self,
            AccountsStage::AwaitingRecords | AccountsStage::QueryRaised | AccountsStage::Bookkeeping
        )
    }

    fn is_terminal(self) -> bool {
        self == AccountsStage::Filed
    }
}

/// Registry row for listing and bulk update choices
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageInfo {
    pub position: usize,
    pub code: &'static str,
    pub label: &'static str,
    pub required: bool,
    pub terminal: bool,
}

fn stage_infos<S: Stage>() -> Vec<StageInfo> {
    S::ALL
        .iter()
        .enumerate()
        .map(|(position, s)| StageInfo {
            position,
            code: s.code(),
            label: s.label(),
            required: s.is_required(),
            terminal: s.is_terminal(),
        })
        .collect()
}

/// `"sent_to_client"` -> `"Sent To Client"`
pub fn humanize(code: &str) -> String {
    code.split(['_', ' '])
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}
