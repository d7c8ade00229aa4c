//! monorel - release every package of a pnpm workspace under one version
//!
//! The manifests are rewritten to the release version only for the duration
//! of the publish; they are always rolled back afterwards.

use clap::Parser;
use monorel::cli::CliArgs;
use monorel::command::ShellRunner;
use monorel::config::{resolve_working_dir, ReleaseSettings, ResolvedConfig};
use monorel::log::Logger;
use monorel::orchestrator::ReleaseOrchestrator;
use monorel::prompt::TerminalPrompter;
use monorel::registry::{HttpClient, NpmRegistry};
use std::io::{self, IsTerminal};
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let args = CliArgs::parse();
    let logger = Logger::new(args.verbose);

    match run(&args, logger).await {
        Ok(exit_code) => exit_code,
        Err(e) => {
            if args.verbose {
                logger.error(format!("{:?}", e));
            } else {
                logger.error(format!("ERROR: {}", e));
            }
            ExitCode::FAILURE
        }
    }
}

/// Main application logic
async fn run(args: &CliArgs, logger: Logger) -> anyhow::Result<ExitCode> {
    let working_dir = resolve_working_dir(&args.dir)?;
    let settings = ReleaseSettings::load(&working_dir, args.config.as_deref())?;
    let config = ResolvedConfig::from_sources(args, &settings, working_dir)?;

    logger.debug(format!("monorel v{}", env!("CARGO_PKG_VERSION")));
    logger.debug(format!("Workspace: {}", config.request.working_dir.display()));
    logger.debug(format!("Registry: {}", config.registry_url));

    let runner = ShellRunner::new(&config.request.working_dir, logger);
    let registry = NpmRegistry::new(HttpClient::new()?, &config.registry_url);

    let orchestrator = ReleaseOrchestrator::new(
        config.request,
        Box::new(runner),
        Box::new(registry),
        Box::new(TerminalPrompter::new()),
        logger,
    )
    .with_progress(io::stderr().is_terminal());

    let outcome = orchestrator.run().await?;

    if outcome.published {
        logger.success(format!("Released version {}", outcome.version));
    } else {
        logger.success(format!("Dry run of version {} completed", outcome.version));
    }
    if outcome.tagged {
        let pushed = if outcome.tag_pushed { " and pushed" } else { "" };
        logger.success(format!("Tagged {}{}", outcome.git_tag, pushed));
    }

    Ok(ExitCode::SUCCESS)
}
