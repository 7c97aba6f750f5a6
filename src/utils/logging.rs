use crate::core::message::Turn;
use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Plain-text transcript of the conversation, appended turn by turn.
pub struct TranscriptLog {
    file_path: Option<PathBuf>,
}

impl TranscriptLog {
    pub fn disabled() -> Self {
        Self { file_path: None }
    }

    /// Enable logging to `path`, failing up front if it cannot be written.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, Box<dyn std::error::Error>> {
        let path = path.into();
        test_file_access(&path)?;
        Ok(Self {
            file_path: Some(path),
        })
    }

    pub fn is_active(&self) -> bool {
        self.file_path.is_some()
    }

    /// Append one completed exchange: the user's prompt, then the reply.
    pub fn log_exchange(&self, user: &Turn, reply: &Turn) -> Result<(), Box<dyn std::error::Error>> {
        let Some(file_path) = self.file_path.as_ref() else {
            return Ok(());
        };

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(file_path)?;
        let mut writer = BufWriter::new(file);

        for line in format!("You: {}", user.content).lines() {
            writeln!(writer, "{line}")?;
        }
        writeln!(writer)?;

        for line in reply.content.lines() {
            writeln!(writer, "{line}")?;
        }
        writeln!(writer)?;

        writer.flush()?;
        Ok(())
    }

    pub fn get_status_string(&self) -> String {
        match &self.file_path {
            None => "disabled".to_string(),
            Some(path) => format!(
                "active ({})",
                path.file_name().unwrap_or_default().to_string_lossy()
            ),
        }
    }
}

fn test_file_access(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    file.flush()?;
    Ok(())
}
