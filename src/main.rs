mod cmd;

use clap::{Parser, Subcommand};
use filingc::filing;

#[derive(Parser, Debug)]
#[command(name = "filingc", version, about = "UK statutory filing deadlines and workflow stages")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show statutory deadlines for each client
    Deadlines(cmd::deadlines::DeadlinesCommand),
    /// Check cached due dates against their source dates
    Check(cmd::check::CheckCommand),
    /// List workflow stages or look up a stage label
    Stages(cmd::stages::StagesCommand),
    /// Show filing workflow progress and milestone issues
    Workflows(cmd::workflows::WorkflowsCommand),
    /// Move workflows to a new stage
    Advance(cmd::advance::AdvanceCommand),
    /// List VAT quarters and their deadlines
    Vat(cmd::vat::VatCommand),
    /// Print expected input formats
    Schema(cmd::schema::SchemaCommand),
}

fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();

    let cli = Cli::parse();
    match cli.command {
        Command::Deadlines(cmd) => cmd.exec(),
        Command::Check(cmd) => cmd.exec(),
        Command::Stages(cmd) => cmd.exec(),
        Command::Workflows(cmd) => cmd.exec(),
        Command::Advance(cmd) => cmd.exec(),
        Command::Vat(cmd) => cmd.exec(),
        Command::Schema(cmd) => cmd.exec(),
    }
}
