use clap::error::ErrorKind;
use clap::Parser;
use tracing_subscriber::fmt::SubscriberBuilder;
use xasafe::{config, diag, supervisor, Cli, SUPERVISOR_ERROR};

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            err.exit()
        }
        Err(err) => {
            diag::report(config::usage_error(&err));
            std::process::exit(SUPERVISOR_ERROR);
        }
    };
    if let Some(level) = cli.log {
        SubscriberBuilder::default()
            .with_target(false)
            .with_max_level(level)
            .with_writer(std::io::stderr)
            .init();
    }
    std::process::exit(supervisor::run(&cli));
}
