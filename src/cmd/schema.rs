//! Schema command - print expected input formats

use crate::filing::{ClientInput, ClientRecord, WorkflowInput};
use clap::{Args, ValueEnum};
use schemars::schema_for;

#[derive(Args, Debug)]
pub struct SchemaCommand {
    /// Which input file to describe
    #[arg(value_enum)]
    input: SchemaInput,

    /// Output format: json-schema, csv-header or csv-fields
    #[arg(value_enum, default_value = "json-schema")]
    format: SchemaFormat,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SchemaInput {
    /// Client records (CSV or JSON)
    Clients,
    /// Workflow records (JSON only)
    Workflows,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SchemaFormat {
    /// JSON Schema for the input format
    JsonSchema,
    /// CSV header row with column names
    CsvHeader,
    /// CSV column descriptions
    CsvFields,
}

impl SchemaCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        match (self.input, self.format) {
            (SchemaInput::Clients, SchemaFormat::JsonSchema) => {
                println!("{}", serde_json::to_string_pretty(&schema_for!(ClientInput))?);
            }
            (SchemaInput::Workflows, SchemaFormat::JsonSchema) => {
                println!("{}", serde_json::to_string_pretty(&schema_for!(WorkflowInput))?);
            }
            (SchemaInput::Clients, SchemaFormat::CsvHeader) => print_csv_header(),
            (SchemaInput::Clients, SchemaFormat::CsvFields) => print_csv_fields(),
            (SchemaInput::Workflows, _) => {
                anyhow::bail!("Workflow records are JSON only, use json-schema");
            }
        }
        Ok(())
    }
}

fn print_csv_header() {
    let names: Vec<&str> = ClientRecord::columns().iter().map(|c| c.name).collect();
    println!("{}", names.join(","));
}

fn print_csv_fields() {
    println!("Client CSV Format");
    println!("=================");
    println!();
    for column in ClientRecord::columns() {
        let req = if column.required { "required" } else { "optional" };
        println!("{:30} ({:8})  {}", column.name, req, column.description);
    }
    println!();
    println!("Dates: YYYY-MM-DD, dd/mm/yyyy or RFC 3339; unreadable dates count as not set");
}
