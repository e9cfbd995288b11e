use crate::demo::{run_demo, run_end_date, DemoArgs, EndDateArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use intern_track::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Internship Application Service",
    about = "Run and demonstrate the internship application service from the command line",
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
    /// Work with the working-day calendar
    Calendar {
        #[command(subcommand)]
        command: CalendarCommand,
    },
    /// Run an end-to-end CLI demo covering one application lifecycle
    Demo(DemoArgs),
}

#[derive(Subcommand, Debug)]
enum CalendarCommand {
    /// Derive an internship end date from a start date and a working-day count
    EndDate(EndDateArgs),
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
        Command::Calendar {
            command: CalendarCommand::EndDate(args),
        } => run_end_date(args),
        Command::Demo(args) => run_demo(args),
    }
}
