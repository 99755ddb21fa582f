use clap::Parser;
use console::style;
use std::io::Write;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use treeops::config::Cli;
use treeops::Config;

fn init_logging(verbose: bool) {
    let default = if verbose { "treeops=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: &Cli) -> anyhow::Result<ExitCode> {
    // Convert CLI args to Config - this validates immediately
    let config = Config::try_from(cli)?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let code = treeops::commands::run(cli, &config, &mut out)?;
    out.flush()?;
    Ok(code)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(&cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {:#}", style("error:").red().bold(), e);
            ExitCode::from(2)
        }
    }
}
