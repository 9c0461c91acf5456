use anyhow::Result;
use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use crate::session::Session;
use crate::sink::{OutputSink, TerminalSink};

/// What the user typed for one cell
enum CellInput {
    Cell(String),
    Exit,
}

/// Run the interactive terminal host
///
/// A cell is every line typed until an empty line; `exit` or `quit` on its
/// own ends the session.
pub async fn run_repl_mode(session: &mut Session) -> Result<()> {
    println!("{}", "🦙 Ollama kernel - prompt session".bright_cyan().bold());
    println!(
        "{}",
        "Finish a cell with an empty line. Lines starting with %% are commands (%%help lists them). Type 'exit' to quit.\n"
            .bright_black()
    );

    let mut editor = DefaultEditor::new()?;
    let mut sink = TerminalSink::new();

    loop {
        let input = read_cell(&mut editor, session.execution_count() + 1)?;
        let code = match input {
            CellInput::Exit => break,
            CellInput::Cell(code) => code,
        };
        if code.trim().is_empty() {
            continue;
        }

        let _ = editor.add_history_entry(code.replace('\n', " "));
        session.execute(&code, &mut sink).await;
        sink.stdout("\n\n");
    }

    session.shutdown().await;
    println!("{}", "Goodbye!".bright_cyan());
    Ok(())
}

fn read_cell(editor: &mut DefaultEditor, count: u32) -> Result<CellInput> {
    let mut lines: Vec<String> = Vec::new();

    loop {
        let prompt = if lines.is_empty() {
            format!("In [{}]: ", count)
        } else {
            format!("{}...: ", " ".repeat(format!("In [{}]", count).len() - 3))
        };

        match editor.readline(&prompt) {
            Ok(line) => {
                if lines.is_empty() && matches!(line.trim(), "exit" | "quit") {
                    return Ok(CellInput::Exit);
                }
                if line.trim().is_empty() {
                    return Ok(CellInput::Cell(lines.join("\n")));
                }
                lines.push(line);
            }
            Err(ReadlineError::Interrupted) => {
                println!("{}", "^C (cell discarded)".bright_black());
                lines.clear();
            }
            Err(ReadlineError::Eof) => {
                if lines.is_empty() {
                    return Ok(CellInput::Exit);
                }
                return Ok(CellInput::Cell(lines.join("\n")));
            }
            Err(err) => return Err(err.into()),
        }
    }
}
