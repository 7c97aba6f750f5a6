//! Parley is a line-based terminal chat client for remote LLM APIs.
//!
//! The crate is organized around a small set of collaborating layers:
//! - [`core`] owns the conversation model, provider selection, the provider
//!   implementations, and configuration loading.
//! - [`ui`] runs the interactive read loop and the busy indicator shown while
//!   a request is outstanding.
//! - [`api`] defines the chat payloads exchanged with each provider.
//!
//! Runtime entrypoints live in the binary crate (`src/main.rs`) and route
//! through [`crate::cli::main`], which resolves a provider and hands it to
//! [`ui::chat_loop`].

pub mod api;
pub mod cli;
pub mod core;
pub mod ui;
pub mod utils;
