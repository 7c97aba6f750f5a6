//! Terminal interaction for chat sessions.
//!
//! - [`chat_loop`]: reads prompts, dispatches them to the active provider and
//!   prints replies.
//! - [`spinner`]: the busy indicator shown while a request is in flight.

pub mod chat_loop;
pub mod spinner;
