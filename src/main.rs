use clap::{Parser, Subcommand};
use ihtc::cmd::calculate::CalculateCommand;
use ihtc::cmd::schema::SchemaCommand;
use ihtc::cmd::trust::{ExitCommand, TenYearCommand};

#[derive(Parser, Debug)]
#[command(name = "ihtc", version, about = "UK Inheritance Tax calculator")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Calculate IHT for an estate
    Calculate(CalculateCommand),
    /// Ten-year periodic charge for a relevant-property trust
    TenYear(TenYearCommand),
    /// Exit charge on property leaving a relevant-property trust
    Exit(ExitCommand),
    /// Print the expected estate input schema
    Schema(SchemaCommand),
}

fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();

    let cli = Cli::parse();
    match cli.command {
        Command::Calculate(cmd) => cmd.exec(),
        Command::TenYear(cmd) => cmd.exec(),
        Command::Exit(cmd) => cmd.exec(),
        Command::Schema(cmd) => cmd.exec(),
    }
}
