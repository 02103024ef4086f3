//! Advance command - move workflows to a new stage and print the updated records

use super::read_workflows;
use crate::filing::dates::parse_datetime;
use crate::filing::{
    AccountsStage, StageError, TransitionPolicy, VatStage, WorkflowInput, WorkflowKind,
    WorkflowRecord,
};
use chrono::NaiveDateTime;
use clap::Args;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct AdvanceCommand {
    /// JSON file containing workflow records
    #[arg(short, long)]
    workflows: PathBuf,

    /// Stage code to move to, e.g. records_received
    stage: String,

    /// Workflow IDs to update (repeatable), defaults to every workflow
    #[arg(long = "id")]
    ids: Vec<String>,

    /// Only update workflows for this client code
    #[arg(long)]
    client: Option<String>,

    /// Who made the change
    #[arg(long)]
    by: Option<String>,

    /// When the stage was reached, defaults to now
    #[arg(long, value_parser = parse_timestamp)]
    at: Option<NaiveDateTime>,

    /// Refuse moves that skip a required earlier milestone
    #[arg(long)]
    ordered: bool,
}

fn parse_timestamp(s: &str) -> Result<NaiveDateTime, String> {
    parse_datetime(s).ok_or_else(|| format!("invalid timestamp: {s}"))
}

impl AdvanceCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let mut workflows = read_workflows(&self.workflows)?;
        let at = self
            .at
            .unwrap_or_else(|| chrono::Local::now().naive_local());
        let policy = if self.ordered {
            TransitionPolicy::MilestoneOrdered
        } else {
            TransitionPolicy::Arbitrary
        };

        let mut updated = 0;
        let mut failures = Vec::new();
        for record in workflows.iter_mut().filter(|r| self.selects(r)) {
            match self.apply(record, at, policy) {
                Ok(()) => updated += 1,
                Err(err) => {
                    log::warn!("Workflow {}: {}", record.id, err);
                    failures.push((record.id.clone(), err));
                }
            }
        }
        log::info!("Moved {} workflows to {}", updated, self.stage);

        println!(
            "{}",
            serde_json::to_string_pretty(&WorkflowInput { workflows })?
        );

        if !failures.is_empty() {
            eprintln!("\u{26A0} {} workflow(s) not updated:", failures.len());
            for (id, err) in &failures {
                eprintln!("  {}: {}", id, err);
            }
            std::process::exit(1);
        }
        Ok(())
    }

    fn selects(&self, record: &WorkflowRecord) -> bool {
        (self.ids.is_empty() || self.ids.contains(&record.id))
            && self
                .client
                .as_ref()
                .is_none_or(|c| record.client_code.eq_ignore_ascii_case(c))
    }

    fn apply(
        &self,
        record: &mut WorkflowRecord,
        at: NaiveDateTime,
        policy: TransitionPolicy,
    ) -> Result<(), StageError> {
        let by = self.by.clone();
        match record.kind {
            WorkflowKind::VatQuarter => record.set_stage::<VatStage>(&self.stage, at, by, policy),
            WorkflowKind::LtdAccounts => {
                record.set_stage::<AccountsStage>(&self.stage, at, by, policy)
            }
        }
    }
}
