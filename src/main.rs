use std::process::ExitCode;

use clap::{CommandFactory, Parser};
use log::debug;
use tcping::cli::Cli;
use tcping::config::AppConfig;
use tcping::{AddressResolver, ConsoleReporter, TcpProber, TcpingError};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(
        if cli.verbose { "debug" } else { "warn" }
    ))
    .init();

    if cli.version {
        println!("tcping v{}", env!("CARGO_PKG_VERSION"));
        return ExitCode::SUCCESS;
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(TcpingError::MissingHost) => {
            eprintln!("{}", Cli::command().render_help());
            ExitCode::from(TcpingError::MissingHost.exit_code())
        }
        Err(e) => {
            eprintln!("{e}");
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run(cli: Cli) -> Result<(), TcpingError> {
    let defaults = match &cli.config {
        Some(path) => AppConfig::load_from(path),
        None => AppConfig::load(),
    };
    let config = cli.to_configuration(&defaults)?;
    debug!("{config:?}");

    let mut reporter = ConsoleReporter::stdout();
    let target = tcping::resolve_target(&config, &AddressResolver::new(), &mut reporter).await?;

    tcping::run(&config, target, TcpProber::new(), reporter, tcping::shutdown_signal()).await?;
    Ok(())
}
