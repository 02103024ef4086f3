//! VAT command - quarterly return periods and deadlines for a stagger group

use super::TodayArgs;
use crate::filing::{describe_due, format_uk_date, quarters_between, Stagger, Urgency};
use crate::filing::dates::add_months;
use chrono::NaiveDate;
use clap::Args;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

#[derive(Args, Debug)]
pub struct VatCommand {
    /// HMRC stagger group (1: Mar/Jun/Sep/Dec, 2: Apr/Jul/Oct/Jan, 3: May/Aug/Nov/Feb)
    #[arg(short, long, value_parser = clap::value_parser!(u8).range(1..=3))]
    stagger: u8,

    /// First date to cover, defaults to today
    #[arg(long)]
    from: Option<NaiveDate>,

    /// Last date to cover, defaults to a year after the first
    #[arg(long)]
    to: Option<NaiveDate>,

    #[command(flatten)]
    today: TodayArgs,

    /// Output as JSON instead of formatted table
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Tabled, Serialize)]
struct QuarterRow {
    #[tabled(rename = "Quarter")]
    quarter: String,
    #[tabled(rename = "Start")]
    start: String,
    #[tabled(rename = "End")]
    end: String,
    #[tabled(rename = "Deadline")]
    deadline: String,
    #[tabled(rename = "Due")]
    due: String,
    #[tabled(rename = "Status")]
    status: String,
}

impl VatCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let Some(stagger) = Stagger::from_number(self.stagger) else {
            anyhow::bail!("Unknown stagger group {}", self.stagger);
        };
        let today = self.today.resolve();
        let from = self.from.unwrap_or(today);
        let to = match self.to {
            Some(to) => to,
            None => add_months(from, 12)
                .ok_or_else(|| anyhow::anyhow!("Date out of range: {}", from))?,
        };
        if to < from {
            anyhow::bail!("--to {} is before --from {}", to, from);
        }

        let rows: Vec<QuarterRow> = quarters_between(stagger, from, to)
            .into_iter()
            .map(|q| {
                let deadline = q.deadline();
                QuarterRow {
                    quarter: q.to_string(),
                    start: format_uk_date(Some(q.start)),
                    end: format_uk_date(Some(q.end)),
                    deadline: format_uk_date(deadline),
                    due: describe_due(deadline, today),
                    status: Urgency::classify(deadline, today).to_string(),
                }
            })
            .collect();

        if self.json {
            println!("{}", serde_json::to_string_pretty(&rows)?);
        } else {
            println!();
            println!("VAT QUARTERS (stagger {})", self.stagger);
            println!();
            println!("{}", Table::new(rows).with(Style::rounded()));
        }
        Ok(())
    }
}
