use anyhow::Context as _;
use stickr_core::{EnvToggles, RunConfig, Target};

use crate::cli::Cli;
use crate::exit_codes::ExitCode;
use crate::output;
use crate::run_error::RunError;

pub async fn run(cli: Cli) -> Result<ExitCode, RunError> {
    let config = run_config(&cli, EnvToggles::from_process_env()).map_err(RunError::InvalidInput)?;
    config.validate()?;

    let out = output::formatter(cli.output);
    out.print_header(&config);

    let summary = stickr_core::run_http(config, out.progress()).await?;

    out.print_summary(&summary)
        .map_err(RunError::RuntimeError)?;

    Ok(ExitCode::from_report(&summary.report))
}

/// Environment toggles set the baseline; the CLI flags can only switch features off.
pub(crate) fn run_config(cli: &Cli, toggles: EnvToggles) -> anyhow::Result<RunConfig> {
    let target = Target::parse(&cli.url).with_context(|| format!("invalid target `{}`", cli.url))?;

    let mut config = RunConfig::new(target).with_toggles(toggles);
    config.workers = cli.workers;
    config.requests_per_worker = cli.requests;
    config.request_delay = cli.delay;
    config.connect_timeout = Some(cli.connect_timeout);
    config.request_timeout = Some(cli.timeout);

    if cli.close_connections {
        config.reuse_connection = false;
    }
    if cli.no_stickiness {
        config.check_stickiness = false;
    }

    tracing::debug!(
        reuse_connection = config.reuse_connection,
        check_stickiness = config.check_stickiness,
        "resolved run config"
    );

    Ok(config)
}
