//! Interactive chat REPL.

use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use crate::context::ConversationContext;
use crate::workflow::{Mode, Orchestrator, WorkflowOutcome};

/// REPL commands, handled before anything reaches the pipeline.
#[derive(Debug, PartialEq, Eq)]
enum ReplCommand {
    Quit,
    Clear,
    Mode(Mode),
    Help,
    Unknown(String),
}

fn parse_command(line: &str) -> Option<ReplCommand> {
    let rest = line.strip_prefix('/')?;
    let mut parts = rest.split_whitespace();
    let command = match parts.next().unwrap_or_default() {
        "quit" | "exit" => ReplCommand::Quit,
        "clear" => ReplCommand::Clear,
        "help" => ReplCommand::Help,
        "mode" => match parts.next().map(str::parse::<Mode>) {
            Some(Ok(mode)) => ReplCommand::Mode(mode),
            _ => ReplCommand::Unknown(line.to_string()),
        },
        _ => ReplCommand::Unknown(line.to_string()),
    };
    Some(command)
}

fn render(outcome: &WorkflowOutcome) -> String {
    match (&outcome.tool_used, outcome.workflow_steps) {
        (Some(tool), Some(steps)) => format!("[{} · {} steps] {}", tool, steps, outcome.response),
        (Some(tool), None) => format!("[{}] {}", tool, outcome.response),
        (None, _) => outcome.response.clone(),
    }
}

/// Run the REPL until EOF or `/quit`.
pub async fn run_chat(
    orchestrator: &Orchestrator,
    mut mode: Mode,
    max_turns: usize,
) -> anyhow::Result<()> {
    let mut editor = DefaultEditor::new()?;
    let mut context = ConversationContext::new(max_turns);

    println!("toolflow chat ({} mode). /help for commands, /quit to leave.", mode);

    loop {
        let line = match editor.readline(&format!("{}> ", mode)) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) => continue,
            Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e.into()),
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let _ = editor.add_history_entry(line);

        match parse_command(line) {
            Some(ReplCommand::Quit) => break,
            Some(ReplCommand::Clear) => {
                context.clear();
                println!("Conversation cleared.");
            }
            Some(ReplCommand::Mode(new_mode)) => {
                mode = new_mode;
                println!("Switched to {} mode.", mode);
            }
            Some(ReplCommand::Help) => {
                println!("/mode heuristic|assisted|workflow  switch entry point");
                println!("/clear                             forget the conversation");
                println!("/quit                              leave");
            }
            Some(ReplCommand::Unknown(cmd)) => println!("Unknown command: {}", cmd),
            None => match orchestrator.handle(line, mode, &mut context).await {
                Ok(outcome) => println!("{}", render(&outcome)),
                Err(e) => println!("Error: {}", e),
            },
        }
    }

    Ok(())
}
