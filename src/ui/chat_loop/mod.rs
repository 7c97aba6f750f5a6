//! Line-based conversation loop.
//!
//! Reads a prompt, sends it to the active provider while the busy indicator
//! spins, prints the reply, and repeats until an exit word, end of input, or
//! an interrupt. A failed request is reported and the loop carries on.
//!
//! Ctrl-C at the prompt reaches the loop through the [`LineSource`]. While a
//! request is in flight it arrives as a signal instead, so each dispatch
//! races the request against an [`InterruptSignal`].

use std::future::Future;
use std::io::{self, Write};
use std::pin::Pin;

use tracing::debug;

use crate::core::message::Turn;
use crate::core::providers::Provider;
use crate::ui::spinner::BusyIndicator;
use crate::utils::logging::TranscriptLog;

mod line_source;

pub use line_source::{EditorLineSource, LineSource, ReadOutcome};

pub const EXIT_WORDS: &[&str] = &["exit", "Exit", "quit", "Quit"];
pub const PROMPT: &str = "Prompt: ";
const TURN_SEPARATOR: &str = "######";

/// Resolves when the user asks to stop while a request is in flight.
pub type InterruptSignal = Pin<Box<dyn Future<Output = ()> + Send>>;

/// Ctrl-C as delivered to the process.
pub fn ctrl_c() -> InterruptSignal {
    Box::pin(async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            debug!(%err, "could not listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    })
}

/// Why the loop stopped. All of these are a normal exit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    ExitWord,
    EndOfInput,
    Interrupted,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationSettings {
    pub max_tokens: u32,
    /// Passed through to the provider, which may ignore it.
    pub temperature: Option<f32>,
}

pub struct ChatSession<W: Write + Send + 'static> {
    provider: Box<dyn Provider>,
    settings: GenerationSettings,
    indicator: BusyIndicator<W>,
    transcript: TranscriptLog,
    interrupt: Box<dyn FnMut() -> InterruptSignal + Send>,
}

impl<W: Write + Send + 'static> ChatSession<W> {
    pub fn new(
        provider: Box<dyn Provider>,
        settings: GenerationSettings,
        indicator: BusyIndicator<W>,
        transcript: TranscriptLog,
    ) -> Self {
        Self {
            provider,
            settings,
            indicator,
            transcript,
            interrupt: Box::new(ctrl_c),
        }
    }

    /// Replace the source of in-flight interrupts, which defaults to [`ctrl_c`].
    pub fn with_interrupt(
        mut self,
        interrupt: impl FnMut() -> InterruptSignal + Send + 'static,
    ) -> Self {
        self.interrupt = Box::new(interrupt);
        self
    }

    pub fn provider(&self) -> &dyn Provider {
        self.provider.as_ref()
    }

    pub fn write_banner(&self, out: &mut impl Write) -> io::Result<()> {
        writeln!(
            out,
            "Starting conversation with {}.",
            self.provider.provider_name()
        )?;
        writeln!(out, "Model: {}", self.provider.model())?;
        if self.transcript.is_active() {
            writeln!(out, "Transcript: {}", self.transcript.get_status_string())?;
        }
        writeln!(out, "Type 'exit' or 'quit' to end the conversation.")?;
        writeln!(out)?;
        out.flush()
    }

    pub async fn run(
        &mut self,
        input: &mut impl LineSource,
        out: &mut impl Write,
    ) -> io::Result<Termination> {
        loop {
            let line = match input.read_line(PROMPT)? {
                ReadOutcome::Line(line) => line,
                ReadOutcome::EndOfInput => {
                    writeln!(out, "\n\nConversation ended.")?;
                    return Ok(Termination::EndOfInput);
                }
                ReadOutcome::Interrupted => {
                    writeln!(out, "\n\nConversation interrupted by user.")?;
                    return Ok(Termination::Interrupted);
                }
            };

            if EXIT_WORDS.contains(&line.as_str()) {
                writeln!(out, "Conversation ended.")?;
                return Ok(Termination::ExitWord);
            }

            if line.trim().is_empty() {
                continue;
            }

            input.remember(&line);
            if let Some(termination) = self.dispatch(&line, out).await? {
                return Ok(termination);
            }
        }
    }

    /// One round trip. Returns a termination only when interrupted.
    async fn dispatch(
        &mut self,
        line: &str,
        out: &mut impl Write,
    ) -> io::Result<Option<Termination>> {
        writeln!(out)?;
        out.flush()?;

        let interrupt = (self.interrupt)();
        let GenerationSettings {
            max_tokens,
            temperature,
        } = self.settings;

        self.indicator.start();
        let outcome = tokio::select! {
            result = self.provider.send_message(line, max_tokens, temperature) => Some(result),
            () = interrupt => None,
        };
        self.indicator.stop()?;

        let Some(result) = outcome else {
            debug!("request abandoned on interrupt");
            writeln!(out, "\n\nConversation interrupted by user.")?;
            out.flush()?;
            return Ok(Some(Termination::Interrupted));
        };

        match result {
            Ok(reply) => {
                writeln!(out, "{}: {}", self.provider.provider_name(), reply)?;
                if let Err(err) = self
                    .transcript
                    .log_exchange(&Turn::user(line), &Turn::assistant(reply))
                {
                    debug!(%err, "could not append to transcript");
                }
            }
            Err(err) => {
                debug!(error = ?err, "chat request failed");
                writeln!(out, "Error: {err}")?;
            }
        }

        writeln!(out, "{TURN_SEPARATOR}")?;
        writeln!(out)?;
        out.flush()?;
        Ok(None)
    }
}
