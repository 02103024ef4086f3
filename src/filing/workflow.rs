use super::dates::{parse_date, parse_datetime};
use super::deadlines::accounts_filing_deadline;
use super::stages::{Stage, WorkflowKind};
use super::vat::return_deadline;
use super::warnings::Warning;
use chrono::{NaiveDate, NaiveDateTime};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum StageError {
    #[error("unknown {kind} stage: {code}")]
    UnknownStage { kind: WorkflowKind, code: String },
    #[error("cannot move to {stage}: missing milestones {}", .missing.join(", "))]
    MilestonesMissing { stage: String, missing: Vec<String> },
    #[error("invalid timestamp for {stage}: {value}")]
    InvalidTimestamp { stage: String, value: String },
}

/// How stage changes are checked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransitionPolicy {
    /// Any stage may be set at any time, including backwards for corrections
    #[default]
    Arbitrary,
    /// A stage may only be set once every earlier required milestone is recorded
    MilestoneOrdered,
}

/// When a stage was reached and by whom
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Milestone {
    pub at: NaiveDateTime,
    pub by: Option<String>,
}

/// One filing period's progress through a workflow
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workflow<S: Stage> {
    pub current_stage: S,
    pub is_completed: bool,
    pub assignee: Option<String>,
    pub period_end: Option<NaiveDate>,
    milestones: BTreeMap<S, Milestone>,
}

impl<S: Stage> Workflow<S> {
    pub fn new(period_end: Option<NaiveDate>) -> Self {
        Workflow {
            current_stage: S::first(),
            is_completed: false,
            assignee: None,
            period_end,
            milestones: BTreeMap::new(),
        }
    }

    pub fn milestone(&self, stage: S) -> Option<&Milestone> {
        self.milestones.get(&stage)
    }

    pub fn milestones(&self) -> impl Iterator<Item = (S, &Milestone)> {
        self.milestones.iter().map(|(s, m)| (*s, m))
    }

    /// Required stages before `stage` that have no milestone
    pub fn missing_before(&self, stage: S) -> Vec<S> {
        S::ALL
            .iter()
            .copied()
            .take_while(|s| *s != stage)
            .filter(|s| s.is_required() && !self.milestones.contains_key(s))
            .collect()
    }

    /// Move to `stage`, recording its milestone.
    ///
    /// Reaching a terminal stage completes the workflow, moving off it reopens it.
    pub fn set_stage(
        &mut self,
        stage: S,
        at: NaiveDateTime,
        by: Option<String>,
        policy: TransitionPolicy,
    ) -> Result<(), StageError> {
        if policy == TransitionPolicy::MilestoneOrdered {
            let missing = self.missing_before(stage);
            if !missing.is_empty() {
                return Err(StageError::MilestonesMissing {
                    stage: stage.code().to_string(),
                    missing: missing.iter().map(|s| s.code().to_string()).collect(),
                });
            }
        }
        log::debug!(
            "{} stage {} -> {} at {}",
            S::KIND,
            self.current_stage.code(),
            stage.code(),
            at
        );
        self.current_stage = stage;
        self.is_completed = stage.is_terminal();
        self.milestones.insert(stage, Milestone { at, by });
        Ok(())
    }

    /// Gaps and backwards timestamps in the recorded milestones
    pub fn audit(&self) -> Vec<Warning> {
        let mut warnings = Vec::new();

        if let Some((latest, _)) = self.milestones.iter().next_back() {
            for missing in self.missing_before(*latest) {
                warnings.push(Warning::MilestoneGap {
                    stage: latest.code().to_string(),
                    missing: missing.code().to_string(),
                });
            }
        }

        let recorded: Vec<_> = self.milestones.iter().collect();
        for pair in recorded.windows(2) {
            let (earlier, first) = pair[0];
            let (later, second) = pair[1];
            if second.at < first.at {
                warnings.push(Warning::MilestoneOutOfOrder {
                    earlier: earlier.code().to_string(),
                    later: later.code().to_string(),
                });
            }
        }
        warnings
    }
}

/// Move several workflows to the same stage, returning failures by index
pub fn set_stage_all<S: Stage>(
    workflows: &mut [Workflow<S>],
    stage: S,
    at: NaiveDateTime,
    by: Option<&str>,
    policy: TransitionPolicy,
) -> Vec<(usize, StageError)> {
    workflows
        .iter_mut()
        .enumerate()
        .filter_map(|(i, wf)| {
            wf.set_stage(stage, at, by.map(str::to_string), policy)
                .err()
                .map(|e| (i, e))
        })
        .collect()
}

/// Statutory deadline for the filing period a workflow covers
pub fn period_deadline(kind: WorkflowKind, period_end: NaiveDate) -> Option<NaiveDate> {
    match kind {
        WorkflowKind::VatQuarter => return_deadline(period_end),
        WorkflowKind::LtdAccounts => accounts_filing_deadline(period_end),
    }
}

/// Input root for workflow JSON
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct WorkflowInput {
    pub workflows: Vec<WorkflowRecord>,
}

/// A workflow instance as stored
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct WorkflowRecord {
    pub id: String,
    pub client_code: String,
    pub kind: WorkflowKind,
    /// Last day of the VAT quarter or accounting period
    #[serde(default)]
    pub period_end: Option<String>,
    pub current_stage: String,
    #[serde(default)]
    pub is_completed: bool,
    #[serde(default)]
    pub assignee: Option<String>,
    /// Stage code to milestone
    #[serde(default)]
    pub milestones: BTreeMap<String, MilestoneRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct MilestoneRecord {
    pub at: String,
    #[serde(default)]
    pub by: Option<String>,
}

impl WorkflowRecord {
    /// Strictly read a record as a workflow of stage type `S`
    pub fn to_workflow<S: Stage>(&self) -> Result<Workflow<S>, StageError> {
        let stage = |code: &str| {
            S::from_code(code).ok_or_else(|| StageError::UnknownStage {
                kind: S::KIND,
                code: code.to_string(),
            })
        };

        let mut workflow = Workflow::new(self.period_end.as_deref().and_then(parse_date));
        workflow.current_stage = stage(&self.current_stage)?;
        workflow.is_completed = self.is_completed;
        workflow.assignee = self.assignee.clone();
        for (code, record) in &self.milestones {
            let at = parse_datetime(&record.at).ok_or_else(|| StageError::InvalidTimestamp {
                stage: code.clone(),
                value: record.at.clone(),
            })?;
            workflow.milestones.insert(
                stage(code)?,
                Milestone {
                    at,
                    by: record.by.clone(),
                },
            );
        }
        Ok(workflow)
    }

    /// Move the stored record to stage `code` under `policy`.
    ///
    /// Only the target code must be known. The stored stage and milestones
    /// are read strictly under `MilestoneOrdered` alone, so an arbitrary move
    /// can correct a record holding a legacy code. The record is left
    /// untouched when the move is rejected.
    pub fn set_stage<S: Stage>(
        &mut self,
        code: &str,
        at: NaiveDateTime,
        by: Option<String>,
        policy: TransitionPolicy,
    ) -> Result<(), StageError> {
        let stage = S::from_code(code).ok_or_else(|| StageError::UnknownStage {
            kind: S::KIND,
            code: code.to_string(),
        })?;
        if policy == TransitionPolicy::MilestoneOrdered {
            let mut workflow = self.to_workflow::<S>()?;
            workflow.set_stage(stage, at, by.clone(), policy)?;
        }

        self.current_stage = stage.code().to_string();
        self.is_completed = stage.is_terminal();
        self.milestones.insert(
            stage.code().to_string(),
            MilestoneRecord {
                at: at.format("%Y-%m-%dT%H:%M:%S").to_string(),
                by,
            },
        );
        Ok(())
    }
}
