use std::io;

use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

/// Result of asking the user for one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    Line(String),
    EndOfInput,
    Interrupted,
}

/// Where the chat loop gets its input from.
pub trait LineSource {
    fn read_line(&mut self, prompt: &str) -> io::Result<ReadOutcome>;

    /// Record a dispatched line so it can be recalled later.
    fn remember(&mut self, _line: &str) {}
}

/// Interactive terminal input with line editing and in-session history.
pub struct EditorLineSource {
    editor: DefaultEditor,
}

impl EditorLineSource {
    pub fn new() -> rustyline::Result<Self> {
        Ok(Self {
            editor: DefaultEditor::new()?,
        })
    }
}

impl LineSource for EditorLineSource {
    fn read_line(&mut self, prompt: &str) -> io::Result<ReadOutcome> {
        match self.editor.readline(prompt) {
            Ok(line) => Ok(ReadOutcome::Line(line)),
            Err(ReadlineError::Eof) => Ok(ReadOutcome::EndOfInput),
            Err(ReadlineError::Interrupted) => Ok(ReadOutcome::Interrupted),
            Err(ReadlineError::Io(err)) => Err(err),
            Err(err) => Err(io::Error::other(err.to_string())),
        }
    }

    fn remember(&mut self, line: &str) {
        let _ = self.editor.add_history_entry(line);
    }
}
