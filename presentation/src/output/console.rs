//! Console output formatter for chat sessions

use colored::Colorize;
use skycast_application::{TurnOutcome, TurnReply};
use skycast_domain::util::preview;
use skycast_domain::{Conversation, MISSING_DESCRIPTION, Role, ToolDescriptor};

/// Longest turn text shown by `/history`.
const HISTORY_PREVIEW_BYTES: usize = 160;

/// Formats session output for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Welcome banner: model, tool source and the discovered tools.
    pub fn banner(model: &str, tool_source: &str, tools: &[ToolDescriptor]) -> String {
        let mut output = String::new();
        output.push('\n');
        output.push_str("╭─────────────────────────────────────────────╮\n");
        output.push_str("│            skycast - Weather Chat           │\n");
        output.push_str("╰─────────────────────────────────────────────╯\n\n");
        output.push_str(&format!("{} {}\n", "Model:".cyan().bold(), model));
        output.push_str(&format!("{} {}\n", "Tools from:".cyan().bold(), tool_source));
        output.push_str(&Self::tools(tools));
        output.push('\n');
        output.push_str(&format!(
            "{}\n",
            "Ask about the weather anywhere. Type /help for commands, 'exit' to quit.".dimmed()
        ));
        output
    }

    /// Tool list with descriptions.
    pub fn tools(tools: &[ToolDescriptor]) -> String {
        if tools.is_empty() {
            return format!("{}\n", "No tools available.".yellow());
        }
        let mut output = format!("{} ({})\n", "Available tools:".cyan().bold(), tools.len());
        for tool in tools {
            let description = tool
                .description
                .as_deref()
                .filter(|d| !d.trim().is_empty())
                .unwrap_or(MISSING_DESCRIPTION);
            let first_line = description.lines().next().unwrap_or_default();
            output.push_str(&format!("  • {} - {}\n", tool.name.green(), first_line));
        }
        output
    }

    /// The assistant's answer. Fallback answers are highlighted.
    pub fn reply(reply: &TurnReply) -> String {
        match reply.outcome {
            TurnOutcome::Answered => reply.text.clone(),
            TurnOutcome::EmptyFallback | TurnOutcome::BudgetExhausted => {
                reply.text.yellow().to_string()
            }
        }
    }

    /// Compact one-line summary of what a turn did.
    pub fn turn_stats(reply: &TurnReply) -> String {
        format!(
            "({} model {}, {} tool {})",
            reply.iterations,
            if reply.iterations == 1 { "query" } else { "queries" },
            reply.tool_calls,
            if reply.tool_calls == 1 { "call" } else { "calls" },
        )
        .dimmed()
        .to_string()
    }

    /// Conversation so far, one line per turn.
    pub fn history(conversation: &Conversation) -> String {
        let mut output = String::new();
        for turn in conversation.turns() {
            let label = match turn.role {
                Role::System => "system".dimmed(),
                Role::User => "you".cyan().bold(),
                Role::Assistant => "assistant".green().bold(),
                Role::Tool => "tool".yellow(),
            };

            if turn.tool_calls.is_empty() {
                output.push_str(&format!(
                    "[{}] {}\n",
                    label,
                    preview(turn.text(), HISTORY_PREVIEW_BYTES)
                ));
            } else {
                let calls = turn
                    .tool_calls
                    .iter()
                    .map(|c| format!("{}({})", c.name, c.arguments))
                    .collect::<Vec<_>>()
                    .join(", ");
                output.push_str(&format!("[{}] → {}\n", label, calls));
            }
        }
        output
    }

    pub fn error(message: impl std::fmt::Display) -> String {
        format!("{} {}", "Error:".red().bold(), message)
    }

    pub fn help() -> String {
        let mut output = String::new();
        output.push_str("Commands:\n");
        output.push_str("  /help, /h, /?   - Show this help\n");
        output.push_str("  /tools          - List the available tools\n");
        output.push_str("  /history        - Show the conversation so far\n");
        output.push_str("  /quit           - Exit (also: exit, quit, q, выход)\n");
        output
    }
}
