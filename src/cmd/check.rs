//! Check command - find cached due dates that no longer match their source dates

use super::{read_clients, write_csv, TodayArgs};
use crate::filing::{format_uk_date, ClientRecord, Drift};
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct CheckCommand {
    /// CSV or JSON file containing client records
    #[arg(short, long)]
    clients: PathBuf,

    #[command(flatten)]
    today: TodayArgs,

    /// Output as JSON instead of formatted text
    #[arg(long, conflicts_with = "refresh")]
    json: bool,

    /// Print every record as CSV with cached dates recalculated
    #[arg(long)]
    refresh: bool,
}

/// A check issue for output
#[derive(Debug, Clone, Serialize)]
struct CheckIssue {
    #[serde(rename = "type")]
    issue_type: String,
    code: String,
    field: String,
    message: String,
}

/// JSON output structure
#[derive(Debug, Serialize)]
struct CheckOutput {
    as_at: String,
    client_count: usize,
    issue_count: usize,
    issues: Vec<CheckIssue>,
}

impl CheckCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let today = self.today.resolve();
        let clients = read_clients(&self.clients)?;

        if self.refresh {
            let refreshed: Vec<ClientRecord> = clients
                .into_iter()
                .map(|mut loaded| {
                    loaded.client.refresh(today);
                    ClientRecord::from(&loaded.client)
                })
                .collect();
            return write_csv(refreshed);
        }

        let issues: Vec<CheckIssue> = clients
            .iter()
            .flat_map(|loaded| {
                let code = &loaded.client.code;
                let warnings = loaded.warnings.iter().map(move |w| CheckIssue {
                    issue_type: w.kind().to_string(),
                    code: code.clone(),
                    field: String::new(),
                    message: w.to_string(),
                });
                let drift = loaded
                    .client
                    .drift(today)
                    .into_iter()
                    .map(move |d| drift_issue(code, &d));
                warnings.chain(drift)
            })
            .collect();

        let as_at = format_uk_date(Some(today));
        if self.json {
            let output = CheckOutput {
                as_at,
                client_count: clients.len(),
                issue_count: issues.len(),
                issues,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
            if output.issue_count > 0 {
                std::process::exit(1);
            }
        } else {
            print_text(&issues, clients.len(), &as_at);
            if !issues.is_empty() {
                std::process::exit(1);
            }
        }
        Ok(())
    }
}

fn drift_issue(code: &str, drift: &Drift) -> CheckIssue {
    let issue_type = match (drift.cached, drift.derived) {
        (None, Some(_)) => "MissingCachedDate",
        (Some(_), None) => "UnderivableCachedDate",
        _ => "StaleCachedDate",
    };
    CheckIssue {
        issue_type: issue_type.to_string(),
        code: code.to_string(),
        field: drift.field.to_string(),
        message: drift.to_string(),
    }
}

fn print_text(issues: &[CheckIssue], client_count: usize, as_at: &str) {
    println!();
    println!("CACHED DEADLINE CHECK ({} clients, as at {})", client_count, as_at);
    println!();

    if issues.is_empty() {
        println!("\u{2713} All cached due dates match their source dates.");
        return;
    }

    println!("\u{26A0} {} issue(s) found:", issues.len());
    println!();
    for (i, issue) in issues.iter().enumerate() {
        println!("  {}. [{}] {}", i + 1, issue.issue_type, issue.code);
        println!("     {}", issue.message);
        println!();
    }
}
