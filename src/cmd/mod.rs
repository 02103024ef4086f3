pub mod advance;
pub mod check;
pub mod deadlines;
pub mod schema;
pub mod stages;
pub mod vat;
pub mod workflows;

use crate::filing::{Client, ClientInput, ClientRecord, Warning, WorkflowInput, WorkflowRecord};
use chrono::NaiveDate;
use clap::Args;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

/// Reference date shared by every command that measures deadlines
#[derive(Args, Debug, Clone)]
pub struct TodayArgs {
    /// Date to measure deadlines from (YYYY-MM-DD), defaults to the local date
    #[arg(long, env = "FILINGC_TODAY")]
    today: Option<NaiveDate>,
}

impl TodayArgs {
    pub fn resolve(&self) -> NaiveDate {
        self.today
            .unwrap_or_else(|| chrono::Local::now().date_naive())
    }
}

/// A client read from file along with anything that had to be ignored
pub struct LoadedClient {
    pub client: Client,
    pub warnings: Vec<Warning>,
}

/// Read client records from CSV or JSON (or JSON on stdin with "-")
pub fn read_clients(path: &Path) -> anyhow::Result<Vec<LoadedClient>> {
    let records = if path.as_os_str() == "-" {
        let input: ClientInput = serde_json::from_slice(&read_stdin()?)?;
        input.clients
    } else if is_json(path) {
        let input: ClientInput = serde_json::from_reader(BufReader::new(File::open(path)?))?;
        input.clients
    } else {
        let mut rdr = csv::Reader::from_reader(File::open(path)?);
        rdr.deserialize::<ClientRecord>()
            .collect::<Result<Vec<_>, _>>()?
    };
    log::info!("Read {} client records", records.len());

    Ok(records
        .into_iter()
        .map(|record| {
            let (client, warnings) = Client::from_record(&record);
            LoadedClient { client, warnings }
        })
        .collect())
}

/// Read workflow records from JSON (or stdin with "-")
pub fn read_workflows(path: &Path) -> anyhow::Result<Vec<WorkflowRecord>> {
    let input: WorkflowInput = if path.as_os_str() == "-" {
        serde_json::from_slice(&read_stdin()?)?
    } else {
        serde_json::from_reader(BufReader::new(File::open(path)?))?
    };
    log::info!("Read {} workflow records", input.workflows.len());
    Ok(input.workflows)
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

fn read_stdin() -> anyhow::Result<Vec<u8>> {
    let mut buffer = Vec::new();
    io::stdin().lock().read_to_end(&mut buffer)?;
    if buffer.is_empty() {
        anyhow::bail!("No input received. Provide a file or pipe data to stdin.");
    }
    Ok(buffer)
}

/// Serialize rows as CSV to stdout
pub fn write_csv<I, R>(rows: I) -> anyhow::Result<()>
where
    I: IntoIterator<Item = R>,
    R: serde::Serialize,
{
    let mut wtr = csv::Writer::from_writer(io::stdout());
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}
