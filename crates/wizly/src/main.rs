mod cli;
mod commands;
mod config;
mod error;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use wizly_core::Controller;

use crate::cli::{Cli, Command};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.global.verbose, cli.global.quiet);

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8, quiet: bool) {
    let filter = match (quiet, verbosity) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, 2) => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        // Config commands resolve their own connection when needed
        Command::Config(args) => commands::config_cmd::handle(args, &cli.global).await,

        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "wizly", &mut std::io::stdout());
            Ok(())
        }

        // Everything else talks to Wizarr
        cmd => {
            let resolved = config::resolve(&cli.global)?;
            let controller = Controller::new(resolved.client.clone())?;

            tracing::debug!(command = ?cmd, profile = %resolved.profile_name, "dispatching command");
            commands::dispatch(cmd, &controller, &resolved, &cli.global)
                .await
                .map_err(|e| e.for_profile(&resolved.profile_name))
        }
    }
}
