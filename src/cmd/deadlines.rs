//! Deadlines command - statutory due dates for every client

use super::{read_clients, write_csv, LoadedClient, TodayArgs};
use crate::filing::{describe_due, format_uk_date, Deadlines, Urgency};
use chrono::NaiveDate;
use clap::{Args, ValueEnum};
use serde::Serialize;
use std::path::PathBuf;
use tabled::{
    settings::{object::Rows, Alignment, Modify, Style},
    Table, Tabled,
};

#[derive(Args, Debug)]
pub struct DeadlinesCommand {
    /// CSV or JSON file containing client records
    #[arg(short, long)]
    clients: PathBuf,

    #[command(flatten)]
    today: TodayArgs,

    /// Only show clients whose next deadline has this urgency
    #[arg(short, long, value_enum)]
    urgency: Option<UrgencyFilter>,

    /// Filter by client code
    #[arg(long)]
    code: Option<String>,

    /// Output as JSON instead of formatted table
    #[arg(long, conflicts_with = "csv")]
    json: bool,

    /// Output as CSV instead of formatted table
    #[arg(long)]
    csv: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum UrgencyFilter {
    Overdue,
    DueSoon,
    Upcoming,
    NotSet,
}

impl From<UrgencyFilter> for Urgency {
    fn from(filter: UrgencyFilter) -> Self {
        match filter {
            UrgencyFilter::Overdue => Urgency::Overdue,
            UrgencyFilter::DueSoon => Urgency::DueSoon,
            UrgencyFilter::Upcoming => Urgency::Upcoming,
            UrgencyFilter::NotSet => Urgency::NotSet,
        }
    }
}

/// Row for the deadlines table output
#[derive(Debug, Clone, Tabled, Serialize)]
pub struct DeadlineRow {
    #[tabled(rename = "Code")]
    pub code: String,

    #[tabled(rename = "Client")]
    pub name: String,

    #[tabled(rename = "Year End")]
    pub year_end: String,

    #[tabled(rename = "Accounts Due")]
    pub accounts_due: String,

    #[tabled(rename = "CT600 Due")]
    pub ct_due: String,

    #[tabled(rename = "CT Source")]
    pub ct_source: String,

    #[tabled(rename = "CT Payment")]
    pub ct_payment_due: String,

    #[tabled(rename = "Confirmation Due")]
    pub confirmation_due: String,

    #[tabled(rename = "Next")]
    pub next: String,

    #[tabled(rename = "Status")]
    pub status: String,
}

/// JSON output per client
#[derive(Debug, Serialize)]
struct ClientDeadlines<'a> {
    code: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    company_number: Option<&'a str>,
    deadlines: Deadlines,
    next: Option<NextDeadline>,
    urgency: Urgency,
    warnings: Vec<String>,
}

#[derive(Debug, Serialize)]
struct NextDeadline {
    name: &'static str,
    date: NaiveDate,
    description: String,
}

impl DeadlinesCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let today = self.today.resolve();
        let clients = read_clients(&self.clients)?;

        let selected: Vec<(&LoadedClient, Deadlines)> = clients
            .iter()
            .filter(|c| {
                self.code
                    .as_ref()
                    .is_none_or(|code| c.client.code.eq_ignore_ascii_case(code))
            })
            .map(|c| (c, c.client.deadlines(today)))
            .filter(|(_, d)| {
                self.urgency
                    .is_none_or(|u| urgency(d, today) == Urgency::from(u))
            })
            .collect();

        if self.json {
            self.print_json(&selected, today)
        } else {
            let rows: Vec<DeadlineRow> = selected
                .iter()
                .map(|(c, d)| build_row(c, d, today))
                .collect();
            if self.csv {
                write_csv(&rows)
            } else {
                print_table(&rows, &selected, today);
                Ok(())
            }
        }
    }

    fn print_json(&self, selected: &[(&LoadedClient, Deadlines)], today: NaiveDate) -> anyhow::Result<()> {
        let output: Vec<ClientDeadlines> = selected
            .iter()
            .map(|(c, d)| ClientDeadlines {
                code: &c.client.code,
                company_number: c.client.company_number.as_deref(),
                deadlines: *d,
                next: d.next().map(|(name, date)| NextDeadline {
                    name,
                    date,
                    description: describe_due(Some(date), today),
                }),
                urgency: urgency(d, today),
                warnings: c.warnings.iter().map(ToString::to_string).collect(),
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&output)?);
        Ok(())
    }
}

fn urgency(deadlines: &Deadlines, today: NaiveDate) -> Urgency {
    Urgency::classify(deadlines.next().map(|(_, d)| d), today)
}

fn build_row(loaded: &LoadedClient, deadlines: &Deadlines, today: NaiveDate) -> DeadlineRow {
    let client = &loaded.client;
    let ct = deadlines.corporation_tax_due;
    let next = match deadlines.next() {
        Some((name, date)) => format!("{}: {}", name, describe_due(Some(date), today)),
        None => describe_due(None, today),
    };
    DeadlineRow {
        code: client.code.clone(),
        name: client.display_name().to_string(),
        year_end: format_uk_date(deadlines.year_end),
        accounts_due: format_uk_date(deadlines.accounts_due),
        ct_due: format_uk_date(ct.date),
        ct_source: ct.date.map(|_| ct.source.to_string()).unwrap_or_default(),
        ct_payment_due: format_uk_date(deadlines.corporation_tax_payment_due),
        confirmation_due: format_uk_date(deadlines.confirmation_due),
        next,
        status: urgency(deadlines, today).to_string(),
    }
}

fn print_table(rows: &[DeadlineRow], selected: &[(&LoadedClient, Deadlines)], today: NaiveDate) {
    if rows.is_empty() {
        println!("No clients found matching filters");
        return;
    }

    println!();
    println!("STATUTORY DEADLINES (as at {})", format_uk_date(Some(today)));
    println!();
    let table = Table::new(rows)
        .with(Style::rounded())
        .with(Modify::new(Rows::new(1..)).with(Alignment::left()))
        .to_string();
    println!("{}", table);

    let warnings: Vec<_> = selected
        .iter()
        .flat_map(|(c, _)| c.warnings.iter().map(move |w| (c.client.code.as_str(), w)))
        .collect();
    if !warnings.is_empty() {
        println!();
        println!("\u{26A0} {} warning(s):", warnings.len());
        for (code, warning) in warnings {
            println!("  {}: {}", code, warning);
        }
    }
}
