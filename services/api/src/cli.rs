use crate::demo::{run_demo, run_roster, DemoArgs, RosterArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use family_estate::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Family Estate",
    about = "Run and demonstrate the family estate tenancy service",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Run a scripted tenant lifecycle against in-memory stores
    Demo(DemoArgs),
    /// Export the occupancy roster of a property catalog as CSV
    Roster(RosterArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Demo(args) => run_demo(args),
        Command::Roster(args) => run_roster(args),
    }
}
