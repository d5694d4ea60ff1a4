use std::sync::Arc;

use engine_logging::{engine_error, engine_info};
use log::LevelFilter;
use reelgrab_core::Phase;
use reelgrab_engine::{
    Collaborators, DirectorySaveAction, FormatPrompt, Orchestrator, ReqwestMediaService,
};

use super::cli::Cli;
use super::config::{self, AppConfig};
use super::ui::prompt::{AutoConfirm, LinePrompt};
use super::ui::terminal::TerminalUi;

/// Runs one cycle for the URL on the command line. `Ok(true)` means the artifact was delivered.
pub fn run_app(cli: Cli) -> anyhow::Result<bool> {
    let file = AppConfig::load(cli.config.as_deref())?;
    let resolved = config::resolve(&cli, file)?;

    engine_logging::initialize(resolved.log.clone(), level_for(cli.verbose));
    engine_info!(
        "reelgrab starting server={} output={}",
        resolved.settings.base_url,
        resolved.output_dir.display()
    );

    let service = Arc::new(ReqwestMediaService::new(resolved.settings.clone())?);
    let prompt: Arc<dyn FormatPrompt> = if cli.no_prompt {
        Arc::new(AutoConfirm)
    } else {
        Arc::new(LinePrompt::stdin())
    };
    let collaborators = Collaborators {
        service: service.clone(),
        progress: service,
        ui: Arc::new(TerminalUi::stdout()),
        prompt,
        saver: Arc::new(DirectorySaveAction::new(resolved.output_dir)),
    };
    let orchestrator = Orchestrator::new(resolved.settings, collaborators);

    let runtime = tokio::runtime::Runtime::new()?;
    let report = runtime.block_on(orchestrator.run_cycle(&cli.url));

    if let Some(path) = &report.saved_to {
        println!("{}", path.display());
    }
    if let Some(err) = &report.error {
        engine_error!("Cycle failed ({:?}): {}", err.kind, err.message);
    }
    Ok(report.phase == Phase::Delivered)
}

fn level_for(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}
