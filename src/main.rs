use std::process::ExitCode;

use anyhow::Context as _;
use clap::Parser as _;

fn main() -> ExitCode {
    if let Err(err) = try_main() {
        eprintln!("{err:#}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

fn try_main() -> anyhow::Result<()> {
    bookmigrate::logging::init().context("init logging")?;

    let cli = bookmigrate::cli::Cli::parse();
    tracing::debug!(?cli, "parsed cli");

    match cli.command {
        bookmigrate::cli::Command::Migrate(args) => {
            bookmigrate::migrate::run(args).context("migrate")?;
        }
        bookmigrate::cli::Command::Contributors(args) => {
            bookmigrate::contributor_index::run(args).context("contributors")?;
        }
    }

    Ok(())
}
