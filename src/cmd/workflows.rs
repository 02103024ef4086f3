//! Workflows command - progress, deadlines and milestone audit for filing workflows

use super::{read_workflows, write_csv, TodayArgs};
use crate::filing::{
    describe_due, format_uk_date, parse_date, period_deadline, AccountsStage, Stage, VatStage,
    Warning, WorkflowKind, WorkflowRecord,
};
use chrono::NaiveDate;
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;
use tabled::{settings::Style, Table, Tabled};

#[derive(Args, Debug)]
pub struct WorkflowsCommand {
    /// JSON file containing workflow records
    #[arg(short, long)]
    workflows: PathBuf,

    #[command(flatten)]
    today: TodayArgs,

    /// Hide completed workflows
    #[arg(long)]
    open: bool,

    /// Filter by assignee
    #[arg(short, long)]
    assignee: Option<String>,

    /// Output as JSON instead of formatted table
    #[arg(long, conflicts_with = "csv")]
    json: bool,

    /// Output as CSV instead of formatted table
    #[arg(long)]
    csv: bool,
}

/// Row for the workflows table output
#[derive(Debug, Clone, Tabled, Serialize)]
pub struct WorkflowRow {
    #[tabled(rename = "ID")]
    pub id: String,

    #[tabled(rename = "Client")]
    pub client_code: String,

    #[tabled(rename = "Type")]
    pub kind: String,

    #[tabled(rename = "Period End")]
    pub period_end: String,

    #[tabled(rename = "Stage")]
    pub stage: String,

    #[tabled(rename = "Done")]
    pub completed: String,

    #[tabled(rename = "Assignee")]
    pub assignee: String,

    #[tabled(rename = "Deadline")]
    pub deadline: String,

    #[tabled(rename = "Due")]
    pub due: String,

    #[tabled(rename = "Issues")]
    pub issues: usize,

    #[tabled(skip)]
    #[serde(skip)]
    pub notes: Vec<String>,
}

impl WorkflowsCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let today = self.today.resolve();
        let records = read_workflows(&self.workflows)?;

        let rows: Vec<WorkflowRow> = records
            .iter()
            .filter(|r| !self.open || !r.is_completed)
            .filter(|r| {
                self.assignee
                    .as_ref()
                    .is_none_or(|a| r.assignee.as_ref().is_some_and(|ra| ra.eq_ignore_ascii_case(a)))
            })
            .map(|r| build_row(r, today))
            .collect();

        if self.json {
            println!("{}", serde_json::to_string_pretty(&rows)?);
            Ok(())
        } else if self.csv {
            write_csv(&rows)
        } else {
            print_table(&rows);
            Ok(())
        }
    }
}

fn build_row(record: &WorkflowRecord, today: NaiveDate) -> WorkflowRow {
    let notes = match record.kind {
        WorkflowKind::VatQuarter => audit::<VatStage>(record),
        WorkflowKind::LtdAccounts => audit::<AccountsStage>(record),
    };
    let period_end = record.period_end.as_deref().and_then(parse_date);
    let deadline = period_end.and_then(|end| period_deadline(record.kind, end));
    let due = if record.is_completed {
        "Completed".to_string()
    } else {
        describe_due(deadline, today)
    };

    WorkflowRow {
        id: record.id.clone(),
        client_code: record.client_code.clone(),
        kind: record.kind.to_string(),
        period_end: format_uk_date(period_end),
        stage: record.kind.label(&record.current_stage).into_owned(),
        completed: if record.is_completed { "yes" } else { "" }.to_string(),
        assignee: record.assignee.clone().unwrap_or_default(),
        deadline: format_uk_date(deadline),
        due,
        issues: notes.len(),
        notes,
    }
}

/// Milestone warnings, or the reason the record could not be read strictly
fn audit<S: Stage>(record: &WorkflowRecord) -> Vec<String> {
    match record.to_workflow::<S>() {
        Ok(workflow) => {
            let mut notes: Vec<String> = workflow.audit().iter().map(Warning::to_string).collect();
            if workflow.is_completed != workflow.current_stage.is_terminal() {
                notes.push(format!(
                    "completion flag {} disagrees with stage {}",
                    workflow.is_completed,
                    workflow.current_stage.code()
                ));
            }
            notes
        }
        Err(err) => {
            log::warn!("Workflow {}: {}", record.id, err);
            vec![err.to_string()]
        }
    }
}

fn print_table(rows: &[WorkflowRow]) {
    if rows.is_empty() {
        println!("No workflows found matching filters");
        return;
    }

    println!();
    println!("FILING WORKFLOWS");
    println!();
    println!("{}", Table::new(rows).with(Style::rounded()));

    let flagged: Vec<_> = rows.iter().filter(|r| !r.notes.is_empty()).collect();
    if !flagged.is_empty() {
        println!();
        println!("\u{26A0} Milestone issues:");
        for row in flagged {
            for note in &row.notes {
                println!("  {} ({}): {}", row.id, row.client_code, note);
            }
        }
    }
}
