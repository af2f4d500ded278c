//! REPL (Read-Eval-Print Loop) for interactive chat

use crate::config::ReplConfig;
use crate::{ConsoleFormatter, ProgressReporter, SimpleProgress};
use colored::Colorize;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use skycast_application::{ChatSession, NoProgress, RunTurnError, TurnProgressNotifier, TurnReply};
use std::io::IsTerminal;
use tracing::{debug, warn};

/// Words that end the session when typed on their own.
const EXIT_WORDS: &[&str] = &["exit", "quit", "q", "выход"];

/// Whether `line` asks to leave the chat.
pub fn is_exit_command(line: &str) -> bool {
    let line = line.trim();
    if line == "/quit" || line == "/exit" {
        return true;
    }
    let lower = line.to_lowercase();
    EXIT_WORDS.contains(&lower.as_str())
}

/// How the REPL ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplExit {
    /// An exit keyword was entered.
    UserQuit,
    /// Input reached end of file (Ctrl-D).
    EndOfInput,
    /// Ctrl-C, at the prompt or while a turn was running.
    Interrupted,
}

enum Command {
    Quit,
    Continue,
}

/// Interactive chat REPL
pub struct ChatRepl {
    session: ChatSession,
    config: ReplConfig,
}

impl ChatRepl {
    pub fn new(session: ChatSession, config: ReplConfig) -> Self {
        Self { session, config }
    }

    pub fn session(&self) -> &ChatSession {
        &self.session
    }

    /// Run the interactive REPL until the user leaves.
    pub async fn run(&mut self) -> rustyline::Result<ReplExit> {
        let mut rl = DefaultEditor::new()?;

        let history_path = self.config.history_path();
        if let Some(ref path) = history_path {
            if let Some(parent) = path.parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            if rl.load_history(path).is_err() {
                debug!("No history loaded from {}", path.display());
            }
        }

        let exit = loop {
            let line = match rl.readline("you> ") {
                Ok(line) => line,
                Err(ReadlineError::Interrupted) => {
                    println!("^C");
                    break ReplExit::Interrupted;
                }
                Err(ReadlineError::Eof) => break ReplExit::EndOfInput,
                Err(err) => {
                    self.save_history(&mut rl);
                    return Err(err);
                }
            };

            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let _ = rl.add_history_entry(line);

            if is_exit_command(line) {
                break ReplExit::UserQuit;
            }
            if line.starts_with('/') {
                match self.handle_command(line) {
                    Command::Quit => break ReplExit::UserQuit,
                    Command::Continue => continue,
                }
            }

            tokio::select! {
                _ = self.process_question(line) => {}
                _ = tokio::signal::ctrl_c() => {
                    println!();
                    println!("{}", "Interrupted.".yellow());
                    break ReplExit::Interrupted;
                }
            }
        };

        println!("Bye!");
        self.save_history(&mut rl);
        Ok(exit)
    }

    fn save_history(&self, rl: &mut DefaultEditor) {
        if let Some(path) = self.config.history_path()
            && let Err(e) = rl.save_history(&path)
        {
            warn!("Failed to save history to {}: {}", path.display(), e);
        }
    }

    fn handle_command(&self, cmd: &str) -> Command {
        match cmd {
            "/help" | "/h" | "/?" => {
                println!();
                print!("{}", ConsoleFormatter::help());
                println!();
                Command::Continue
            }
            "/tools" => {
                println!();
                print!("{}", ConsoleFormatter::tools(self.session.catalog()));
                println!();
                Command::Continue
            }
            "/history" => {
                println!();
                print!("{}", ConsoleFormatter::history(self.session.conversation()));
                println!();
                Command::Continue
            }
            "/q" => Command::Quit,
            _ => {
                println!("Unknown command: {}", cmd);
                println!("Type /help for available commands");
                Command::Continue
            }
        }
    }

    async fn process_question(&mut self, question: &str) {
        let result = ask(&mut self.session, question, self.config.show_progress).await;
        match result {
            Ok(reply) => {
                println!();
                println!("{} {}", "assistant>".green().bold(), ConsoleFormatter::reply(&reply));
                if self.config.show_progress {
                    println!("{}", ConsoleFormatter::turn_stats(&reply));
                }
                println!();
            }
            Err(e) => {
                eprintln!("{}", ConsoleFormatter::error(&e));
                println!();
            }
        }
    }
}

/// Run one turn. With progress on, a spinner is used when stderr is a
/// terminal and plain trace lines otherwise.
pub async fn ask(
    session: &mut ChatSession,
    question: &str,
    show_progress: bool,
) -> Result<TurnReply, RunTurnError> {
    let progress: Box<dyn TurnProgressNotifier> = if !show_progress {
        Box::new(NoProgress)
    } else if std::io::stderr().is_terminal() {
        Box::new(ProgressReporter::new())
    } else {
        Box::new(SimpleProgress)
    };
    session.ask_with_progress(question, progress.as_ref()).await
}
