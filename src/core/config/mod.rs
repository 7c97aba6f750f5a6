pub mod data;
pub mod io;

pub use data::{Config, TEMPERATURE_RANGE};
pub use io::ConfigError;
