//! Command-line interface parsing and startup
//!
//! This module parses arguments, resolves the provider, and hands control to
//! the chat loop.

use std::error::Error;
use std::io::{self, Write};
use std::path::PathBuf;

use clap::builder::PossibleValuesParser;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::core::builtin_providers::{
    builtin_providers, create_with_options, supported_names, ProviderOptions, SelectorError,
};
use crate::core::config::{Config, TEMPERATURE_RANGE};
use crate::ui::chat_loop::{ChatSession, EditorLineSource, GenerationSettings};
use crate::ui::spinner::{BusyIndicator, DEFAULT_MESSAGE};
use crate::utils::logging::TranscriptLog;

pub const LOG_FILTER_ENV: &str = "PARLEY_LOG";

#[derive(Parser, Debug)]
#[command(name = "parley", version)]
#[command(about = "Unified chat interface for LLM providers")]
#[command(
    long_about = "Parley is a line-based terminal chat client. Pick a provider, type a \
prompt, and the reply is printed once it arrives. The whole conversation is sent \
as context with every prompt.",
    after_help = "Examples:\n  \
  parley --provider chatgpt\n  \
  parley --provider claude\n  \
  parley --provider chatgpt --model gpt-4o-mini\n\n\
Environment Variables:\n  \
  OPENAI_API_KEY       API key for ChatGPT\n  \
  ANTHROPIC_API_KEY    API key for Claude\n  \
  OPENAI_BASE_URL      Custom ChatGPT endpoint (optional)\n  \
  ANTHROPIC_BASE_URL   Custom Claude endpoint (optional)\n  \
  PARLEY_CONFIG_DIR    Directory holding config.toml (optional)\n  \
  PARLEY_LOG           Diagnostic log filter, e.g. debug (optional)\n\n\
Type 'exit' or 'quit' to end the conversation."
)]
pub struct Args {
    /// LLM provider to use
    #[arg(short = 'p', long, ignore_case = true, value_parser = provider_parser())]
    pub provider: String,

    /// Model identifier (uses the provider default if not specified)
    #[arg(short = 'm', long)]
    pub model: Option<String>,

    /// Maximum tokens in each response [default: 2048]
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub max_tokens: Option<u32>,

    /// Sampling temperature between 0 and 2 (ChatGPT only) [default: 0.5]
    #[arg(long, value_parser = parse_temperature)]
    pub temperature: Option<f32>,

    /// Append the conversation to this file
    #[arg(short = 'l', long, value_name = "FILE")]
    pub log: Option<PathBuf>,
}

fn provider_parser() -> PossibleValuesParser {
    PossibleValuesParser::new(supported_names())
}

fn parse_temperature(value: &str) -> Result<f32, String> {
    let temperature: f32 = value
        .parse()
        .map_err(|_| format!("`{value}` is not a number"))?;
    if !TEMPERATURE_RANGE.contains(&temperature) {
        return Err(format!(
            "{value} is not in {}..={}",
            TEMPERATURE_RANGE.start(),
            TEMPERATURE_RANGE.end()
        ));
    }
    Ok(temperature)
}

/// Run the CLI and return the process exit code.
pub fn main() -> i32 {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) => {
            let _ = err.print();
            return if err.use_stderr() { 1 } else { 0 };
        }
    };

    init_tracing();

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(err) => {
            println!("Error: failed to start async runtime: {err}");
            return 1;
        }
    };

    match runtime.block_on(async_main(args)) {
        Ok(code) => code,
        Err(err) => {
            println!("Error: {err}");
            1
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_FILTER_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

async fn async_main(args: Args) -> Result<i32, Box<dyn Error>> {
    let config = Config::load()?;
    let provider_name = args.provider.to_lowercase();

    let options = ProviderOptions {
        model: config.resolve_model(&provider_name, args.model),
        api_key: None,
        base_url: config.get_base_url(&provider_name).cloned(),
    };
    let provider = match create_with_options(&provider_name, options) {
        Ok(provider) => provider,
        Err(err) => {
            write_startup_error(&mut io::stdout(), &err)?;
            return Ok(err.exit_code());
        }
    };

    let transcript = match args.log {
        Some(path) => TranscriptLog::open(path)?,
        None => TranscriptLog::disabled(),
    };

    let settings = GenerationSettings {
        max_tokens: config.resolve_max_tokens(args.max_tokens),
        temperature: config.resolve_temperature(args.temperature),
    };

    let mut session = ChatSession::new(
        provider,
        settings,
        BusyIndicator::stdout(DEFAULT_MESSAGE),
        transcript,
    );
    let mut stdout = io::stdout();
    session.write_banner(&mut stdout)?;

    let mut input = EditorLineSource::new()?;
    let termination = session.run(&mut input, &mut stdout).await?;
    tracing::debug!(?termination, "chat loop finished");
    Ok(0)
}

/// Print a fatal startup error with hints on how to fix it.
pub fn write_startup_error(out: &mut impl Write, err: &SelectorError) -> io::Result<()> {
    let SelectorError::Initialization(init_err) = err else {
        writeln!(out, "Error: {err}")?;
        return out.flush();
    };

    writeln!(out, "Error initializing provider: {init_err}")?;
    let fixes = init_err.quick_fixes();
    if !fixes.is_empty() {
        writeln!(out)?;
        writeln!(out, "Quick fixes:")?;
        for fix in fixes {
            writeln!(out, "  • {fix}")?;
        }
    }
    writeln!(out)?;
    writeln!(out, "Please check your API key is set in environment variables:")?;
    for provider in builtin_providers() {
        writeln!(out, "  - For {}: {}", provider.display_name, provider.api_key_env)?;
    }

    out.flush()
}
