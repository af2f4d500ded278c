//! CLI command definitions

use clap::Parser;
use std::path::PathBuf;

/// CLI arguments for the skycast chat client
#[derive(Parser, Debug)]
#[command(name = "skycast")]
#[command(author, version, about = "Weather assistant - a tool-calling LLM backed by an MCP weather server")]
#[command(long_about = r#"
skycast answers weather questions with a function-calling language model.
The model gets the current conditions and forecasts by calling tools served
by an MCP weather server (skycast-weather-server), which is started for the
duration of the session.

Configuration files are loaded from (in priority order):
1. SKYCAST_* environment variables (e.g. SKYCAST_MODEL__NAME)
2. --config <path>     Explicit config file
3. ./skycast.toml      Project-level config
4. ~/.config/skycast/config.toml   Global config

Example:
  skycast "What's the weather in Lisbon?"
  skycast -m gpt-4o "Will it rain in Tokyo over the next three days?"
  skycast                      (interactive chat)
"#)]
pub struct Cli {
    /// Question to answer; starts an interactive chat when omitted
    pub question: Option<String>,

    /// Model to query (overrides [model] name)
    #[arg(short, long, value_name = "MODEL")]
    pub model: Option<String>,

    /// Maximum model queries per question (overrides [agent] max_iterations)
    #[arg(long, value_name = "N")]
    pub max_iterations: Option<usize>,

    /// Call the weather API directly instead of spawning the MCP server
    #[arg(long)]
    pub in_process: bool,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,
}

/// CLI arguments for the MCP weather server
#[derive(Parser, Debug)]
#[command(name = "skycast-weather-server")]
#[command(author, version, about = "MCP server exposing OpenWeatherMap current weather and forecast tools over stdio")]
pub struct ServerCli {
    /// Verbosity level for stderr logs (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
        ServerCli::command().debug_assert();
    }

    #[test]
    fn test_one_shot_arguments() {
        let cli = Cli::parse_from([
            "skycast",
            "-vv",
            "--model",
            "gpt-4o",
            "--max-iterations",
            "3",
            "Weather in Oslo?",
        ]);
        assert_eq!(cli.question.as_deref(), Some("Weather in Oslo?"));
        assert_eq!(cli.model.as_deref(), Some("gpt-4o"));
        assert_eq!(cli.max_iterations, Some(3));
        assert_eq!(cli.verbose, 2);
        assert!(!cli.in_process);
    }

    #[test]
    fn test_interactive_defaults() {
        let cli = Cli::parse_from(["skycast", "--in-process", "-q"]);
        assert!(cli.question.is_none());
        assert!(cli.in_process);
        assert!(cli.quiet);
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_server_arguments() {
        let cli = ServerCli::parse_from(["skycast-weather-server", "-c", "/etc/skycast.toml", "-v"]);
        assert_eq!(cli.config, Some(PathBuf::from("/etc/skycast.toml")));
        assert_eq!(cli.verbose, 1);
    }
}
