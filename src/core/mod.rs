pub mod builtin_providers;
pub mod config;
pub mod message;
pub mod providers;
