//! Stages command - list workflow stages or look up a stage label

use crate::filing::{StageInfo, WorkflowKind};
use clap::{Args, ValueEnum};
use tabled::{settings::Style, Table, Tabled};

#[derive(Args, Debug)]
pub struct StagesCommand {
    /// Workflow type
    #[arg(value_enum)]
    kind: KindArg,

    /// Print the display label for this stage code instead of the full list
    #[arg(long)]
    code: Option<String>,

    /// Output as JSON instead of formatted table
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum KindArg {
    Vat,
    Accounts,
}

impl From<KindArg> for WorkflowKind {
    fn from(arg: KindArg) -> Self {
        match arg {
            KindArg::Vat => WorkflowKind::VatQuarter,
            KindArg::Accounts => WorkflowKind::LtdAccounts,
        }
    }
}

#[derive(Tabled)]
struct StageRow {
    #[tabled(rename = "#")]
    position: usize,
    #[tabled(rename = "Code")]
    code: &'static str,
    #[tabled(rename = "Label")]
    label: &'static str,
    #[tabled(rename = "Required")]
    required: &'static str,
}

impl From<&StageInfo> for StageRow {
    fn from(info: &StageInfo) -> Self {
        StageRow {
            position: info.position + 1,
            code: info.code,
            label: info.label,
            required: if info.required { "yes" } else { "" },
        }
    }
}

impl StagesCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let kind: WorkflowKind = self.kind.into();

        if let Some(code) = &self.code {
            let label = kind.label(code);
            if self.json {
                println!("{}", serde_json::json!({ "code": code, "label": label }));
            } else {
                println!("{}", label);
            }
            return Ok(());
        }

        let stages = kind.stages();
        if self.json {
            println!("{}", serde_json::to_string_pretty(&stages)?);
        } else {
            println!();
            println!("{} STAGES", kind.display().to_uppercase());
            println!();
            let rows: Vec<StageRow> = stages.iter().map(StageRow::from).collect();
            println!("{}", Table::new(rows).with(Style::rounded()));
        }
        Ok(())
    }
}
