//! Progress reporting while a turn runs

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use skycast_application::{TurnOutcome, TurnProgressNotifier};
use skycast_domain::ToolInvocationOutcome;
use skycast_domain::util;
use std::time::Duration;

/// Longest argument or result text echoed in the tool trace.
const TRACE_PREVIEW_BYTES: usize = 80;

/// Reports progress with a spinner and prints a tool trace above it
pub struct ProgressReporter {
    spinner: ProgressBar,
}

impl ProgressReporter {
    pub fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(Self::spinner_style());
        spinner.enable_steady_tick(Duration::from_millis(100));
        Self { spinner }
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ProgressReporter {
    fn drop(&mut self) {
        if !self.spinner.is_finished() {
            self.spinner.finish_and_clear();
        }
    }
}

fn preview(text: &str) -> String {
    util::preview(text, TRACE_PREVIEW_BYTES)
}

fn outcome_line(tool_name: &str, outcome: &ToolInvocationOutcome) -> String {
    match outcome {
        ToolInvocationOutcome::Success(text) => {
            format!("  {} {} {}", "v".green(), tool_name, preview(text).dimmed())
        }
        ToolInvocationOutcome::EmptyResult => {
            format!("  {} {} {}", "v".green(), tool_name, "(empty result)".dimmed())
        }
        ToolInvocationOutcome::Failure(message) => {
            format!("  {} {} {}", "x".red(), tool_name, preview(message).red())
        }
    }
}

impl TurnProgressNotifier for ProgressReporter {
    fn on_model_query(&self, iteration: usize, max_iterations: usize) {
        self.spinner
            .set_message(format!("Thinking... ({}/{})", iteration, max_iterations));
    }

    fn on_tool_call(&self, tool_name: &str, args_preview: &str) {
        self.spinner.set_message(format!("Calling {}...", tool_name));
        self.spinner.println(format!(
            "  {} {}({})",
            "->".cyan(),
            tool_name.bold(),
            preview(args_preview)
        ));
    }

    fn on_tool_result(&self, tool_name: &str, outcome: &ToolInvocationOutcome) {
        self.spinner.println(outcome_line(tool_name, outcome));
    }

    fn on_turn_complete(&self, _outcome: TurnOutcome) {
        self.spinner.finish_and_clear();
    }
}

/// Simple text-based progress (no spinner)
pub struct SimpleProgress;

impl TurnProgressNotifier for SimpleProgress {
    fn on_tool_call(&self, tool_name: &str, args_preview: &str) {
        println!("  {} {}({})", "->".cyan(), tool_name.bold(), preview(args_preview));
    }

    fn on_tool_result(&self, tool_name: &str, outcome: &ToolInvocationOutcome) {
        println!("{}", outcome_line(tool_name, outcome));
    }

    fn on_turn_complete(&self, outcome: TurnOutcome) {
        if outcome != TurnOutcome::Answered {
            println!("  {} {}", "!".yellow(), outcome.as_str());
        }
    }
}
