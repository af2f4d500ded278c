//! CLI entrypoint for skycast
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

mod telemetry;

use anyhow::{Context, Result, anyhow, bail};
use clap::Parser;
use skycast_application::{ChatSession, LlmGateway, RunTurnUseCase, WeatherToolset};
use skycast_domain::ToolProvider;
use skycast_infrastructure::config::DEFAULT_SERVER_COMMAND;
use skycast_infrastructure::{
    ConfigLoader, FileConfig, JsonlConversationLogger, McpClient, OpenAiGateway,
    OpenWeatherClient, StdioServerParams, expand_path,
};
use skycast_presentation::{ChatRepl, Cli, ConsoleFormatter, ReplConfig, ReplExit, ask};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.show_config {
        ConfigLoader::print_config_sources(cli.config.as_deref());
        return Ok(());
    }

    // === Configuration ===
    let mut config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_deref())
            .map_err(|e| anyhow!("Failed to load configuration: {}", e))?
    };
    apply_overrides(&mut config, &cli);

    let problems = config.validate();
    if !problems.is_empty() {
        let list = problems
            .iter()
            .map(|p| format!("  - {}", p))
            .collect::<Vec<_>>()
            .join("\n");
        bail!("Invalid configuration:\n{}", list);
    }

    let _log_guard = telemetry::init(cli.verbose, config.logging.file.as_deref())?;
    info!("Starting skycast");

    // === Dependency Injection ===
    let model_settings = config.model.to_settings();
    if model_settings.api_key.is_none() {
        warn!(
            "No API key found in {}; sending unauthenticated requests",
            config.model.api_key_env
        );
    }
    let gateway: Arc<dyn LlmGateway> = Arc::new(OpenAiGateway::new(model_settings)?);

    let mut mcp: Option<Arc<McpClient>> = None;
    let provider: Arc<dyn ToolProvider> = if cli.in_process {
        let source = Arc::new(OpenWeatherClient::new(config.weather.to_settings())?);
        Arc::new(WeatherToolset::new(source))
    } else {
        let params = server_params(&config);
        let client = McpClient::spawn(&params, config.tool_server.startup_timeout())
            .await
            .with_context(|| format!("Failed to start tool server '{}'", params.command))?;
        let client = Arc::new(client);
        mcp = Some(client.clone());
        client
    };

    let mut run_turn = RunTurnUseCase::new(
        gateway,
        provider.clone(),
        config.agent.to_execution_params(),
    );
    if let Some(path) = &config.logging.conversation_log {
        let logger = JsonlConversationLogger::open(expand_path(path))
            .with_context(|| format!("Failed to open conversation log {}", path))?;
        info!("Conversation log: {}", logger.path().display());
        run_turn = run_turn.with_conversation_logger(Arc::new(logger));
    }

    let result = run(cli, config, run_turn, provider.id().to_string()).await;

    if let Some(client) = mcp {
        client.shutdown().await;
    }
    result
}

async fn run(cli: Cli, config: FileConfig, run_turn: RunTurnUseCase, tool_source: String) -> Result<()> {
    let mut session = ChatSession::start(run_turn, config.agent.system_prompt.as_deref()).await?;
    let repl_config = ReplConfig {
        show_progress: config.repl.show_progress,
        history_file: config.repl.history_file.as_deref().map(expand_path),
    };

    // Single question mode
    if let Some(question) = cli.question {
        let reply = tokio::select! {
            reply = ask(&mut session, &question, repl_config.show_progress) => reply?,
            _ = tokio::signal::ctrl_c() => bail!("Interrupted"),
        };
        println!("{}", ConsoleFormatter::reply(&reply));
        return Ok(());
    }

    // Chat mode
    if !cli.quiet {
        print!(
            "{}",
            ConsoleFormatter::banner(session.model_name(), &tool_source, session.catalog())
        );
        println!();
    }
    let mut repl = ChatRepl::new(session, repl_config);
    let exit = repl.run().await?;
    info!("Chat ended: {:?}", exit);
    if exit == ReplExit::Interrupted {
        println!("Session interrupted.");
    }
    Ok(())
}

/// Fold command-line flags into the loaded configuration.
fn apply_overrides(config: &mut FileConfig, cli: &Cli) {
    if let Some(model) = &cli.model {
        config.model.name = model.clone();
    }
    if let Some(n) = cli.max_iterations {
        config.agent.max_iterations = n;
    }
    if cli.quiet {
        config.repl.show_progress = false;
    }
}

/// Launch parameters for the tool server. The default command resolves to the
/// server binary installed next to this executable when there is one.
fn server_params(config: &FileConfig) -> StdioServerParams {
    let mut params = config.tool_server.to_params();
    if params.command == DEFAULT_SERVER_COMMAND
        && let Some(sibling) = sibling_binary(DEFAULT_SERVER_COMMAND)
    {
        params.command = sibling.to_string_lossy().into_owned();
    }
    params
}

fn sibling_binary(name: &str) -> Option<PathBuf> {
    let exe = std::env::current_exe().ok()?;
    let candidate = exe
        .parent()?
        .join(format!("{}{}", name, std::env::consts::EXE_SUFFIX));
    candidate.is_file().then_some(candidate)
}
