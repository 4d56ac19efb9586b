//! CLI entrypoint for panel-consult
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, bail};
use clap::Parser;
use panel_application::{
    ApprovalPort, AutoApproveAll, ConsultationOutcome, ConsultationProgressNotifier,
    GenerationService, GraphStore, NoProgress, OrchestratorController, RoleCatalog, SessionHandle,
};
use panel_domain::{ConversationTurn, NodeId, ProjectId, TurnRole};
use panel_infrastructure::{
    ConfigLoader, FileConfig, InMemoryGraphStore, JsonlSessionLogger, OpenAiGenerationService,
    StaticRoleCatalog,
};
use panel_presentation::{
    Cli, ConsoleFormatter, InteractiveApproval, OutputFormat, ProgressReporter,
};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let _log_guard = init_logging(&cli)?;

    if cli.show_config {
        ConfigLoader::print_config_sources(cli.config.as_ref());
        return Ok(());
    }

    let question = match cli.question.clone() {
        Some(q) => q,
        None => bail!("A question is required. Run with --help for usage."),
    };

    info!("Starting panel-consult");

    // === Configuration ===
    let mut config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref()).context("Failed to load configuration")?
    };
    apply_overrides(&mut config, &cli);
    config.validate().context("Invalid configuration")?;
    let params = config.consultation.to_params()?;

    // === Dependency Injection ===
    let provider = OpenAiGenerationService::new(&config.provider)
        .context("Failed to create generation provider")?;
    info!(model = provider.model(), "Generation provider ready");
    let generation: Arc<dyn GenerationService> = Arc::new(provider);
    let graph = Arc::new(InMemoryGraphStore::new());
    let catalog: Arc<dyn RoleCatalog> = Arc::new(StaticRoleCatalog::with_configured(&config.roles));

    let project_id = ProjectId::new(cli.project.clone());
    let title = cli.title.clone().unwrap_or_else(|| "Consultation".to_string());
    let master_node_id = graph
        .add_root(
            project_id.clone(),
            title,
            vec![ConversationTurn::user(question.clone())],
        )
        .context("Failed to create master node")?;

    let progress: Arc<dyn ConsultationProgressNotifier> = if cli.quiet {
        Arc::new(NoProgress)
    } else {
        Arc::new(ProgressReporter::new())
    };

    let mut controller = OrchestratorController::new(
        generation,
        Arc::clone(&graph) as Arc<dyn GraphStore>,
        catalog,
    )
    .with_params(params)
    .with_progress(progress);

    if let Some(dir) = &config.logging.session_log_dir {
        match JsonlSessionLogger::in_dir(dir) {
            Some(logger) => {
                info!(path = %logger.path().display(), "Writing session log");
                controller = controller.with_session_logger(Arc::new(logger));
            }
            None => warn!(dir = %dir.display(), "Session log disabled"),
        }
    }
    let controller = Arc::new(controller);

    let handle = controller.start(master_node_id, project_id, &question)?;
    spawn_interrupt_handler(Arc::clone(&controller), handle.clone());

    let approval: Box<dyn ApprovalPort> = if cli.yes {
        Box::new(AutoApproveAll)
    } else {
        Box::new(InteractiveApproval::new())
    };

    let outcome = controller.run(&handle, approval.as_ref()).await?;
    info!(?outcome, "Consultation finished");

    // Output results
    let session = handle.snapshot();
    let output = match cli.output {
        OutputFormat::Full => ConsoleFormatter::format(&session),
        OutputFormat::Synthesis => ConsoleFormatter::format_synthesis_only(&session),
        OutputFormat::Json => ConsoleFormatter::format_json(&session),
    };

    println!("{}", output);
    if cli.output == OutputFormat::Full {
        print_canvas(&graph, session.master_node_id());
    }

    if let ConsultationOutcome::Failed { message } = outcome {
        bail!(message);
    }

    Ok(())
}

/// List the specialist nodes the consultation left on the canvas
fn print_canvas(graph: &InMemoryGraphStore, master: &NodeId) {
    let delegates = graph.linked_from(master);
    if delegates.is_empty() {
        return;
    }
    println!("Canvas: {} specialist node(s) linked to the master node", delegates.len());
    for node in delegates {
        let answered = node.turns.iter().any(|t| t.role == TurnRole::Assistant);
        println!(
            "  {} {} [{}]",
            if answered { "v" } else { "x" },
            node.title,
            node.id
        );
    }
}

/// Initialize logging based on verbosity level; `RUST_LOG` wins when set.
fn init_logging(cli: &Cli) -> Result<Option<WorkerGuard>> {
    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace", // -vvv or more
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    match &cli.log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            let (writer, guard) = tracing_appender::non_blocking(file);
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(writer)
                .with_ansi(false)
                .init();
            Ok(Some(guard))
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
            Ok(None)
        }
    }
}

/// Command line flags take precedence over every configuration source.
fn apply_overrides(config: &mut FileConfig, cli: &Cli) {
    if let Some(model) = &cli.model {
        config.provider.model = model.clone();
    }
    if let Some(max) = cli.max_concurrency {
        config.consultation.max_concurrency = max;
    }
    if let Some(seconds) = cli.timeout {
        config.consultation.delegate_timeout_seconds = seconds;
    }
    if let Some(max) = cli.max_roles {
        config.consultation.max_roles = max;
    }
    if let Some(level) = cli.level {
        config.consultation.expertise_level = level.as_str().to_string();
    }
    if cli.master_context {
        config.consultation.include_master_context = true;
    }
}

/// First Ctrl-C cancels the consultation; a second one exits immediately.
fn spawn_interrupt_handler(controller: Arc<OrchestratorController>, handle: SessionHandle) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_err() {
            return;
        }
        eprintln!("\nCancelling consultation... (press Ctrl-C again to exit)");
        controller.cancel(&handle);

        if tokio::signal::ctrl_c().await.is_ok() {
            std::process::exit(130);
        }
    });
}
