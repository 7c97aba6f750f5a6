//! Built-in provider table
//!
//! Maps the provider names accepted on the command line to their display
//! label, default model, credential variable and constructor.

use std::error::Error;
use std::fmt;

use crate::core::providers::anthropic::{self, ClaudeProvider};
use crate::core::providers::openai::{self, ChatGptProvider};
use crate::core::providers::{InitializationError, Provider, ProviderInit};

type Constructor = fn(ProviderInit) -> Result<Box<dyn Provider>, InitializationError>;

#[derive(Clone, Copy)]
pub struct BuiltinProvider {
    pub id: &'static str,
    pub display_name: &'static str,
    pub default_model: &'static str,
    pub api_key_env: &'static str,
    construct: Constructor,
}

impl fmt::Debug for BuiltinProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuiltinProvider")
            .field("id", &self.id)
            .field("display_name", &self.display_name)
            .field("default_model", &self.default_model)
            .field("api_key_env", &self.api_key_env)
            .finish()
    }
}

const BUILTIN_PROVIDERS: &[BuiltinProvider] = &[
    BuiltinProvider {
        id: "chatgpt",
        display_name: openai::DISPLAY_NAME,
        default_model: openai::DEFAULT_MODEL,
        api_key_env: openai::API_KEY_ENV,
        construct: ChatGptProvider::boxed,
    },
    BuiltinProvider {
        id: "claude",
        display_name: anthropic::DISPLAY_NAME,
        default_model: anthropic::DEFAULT_MODEL,
        api_key_env: anthropic::API_KEY_ENV,
        construct: ClaudeProvider::boxed,
    },
];

/// Optional overrides applied when building a provider.
#[derive(Clone, Debug, Default)]
pub struct ProviderOptions {
    pub model: Option<String>,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsupportedProviderError {
    pub name: String,
    pub supported: Vec<&'static str>,
}

impl fmt::Display for UnsupportedProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Unsupported provider: {}. Supported providers: {}",
            self.name,
            self.supported.join(", ")
        )
    }
}

impl Error for UnsupportedProviderError {}

#[derive(Debug)]
pub enum SelectorError {
    Unsupported(UnsupportedProviderError),
    Initialization(InitializationError),
}

impl SelectorError {
    pub fn exit_code(&self) -> i32 {
        match self {
            SelectorError::Unsupported(_) => 1,
            SelectorError::Initialization(err) => err.exit_code(),
        }
    }
}

impl fmt::Display for SelectorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectorError::Unsupported(err) => write!(f, "{err}"),
            SelectorError::Initialization(err) => write!(f, "{err}"),
        }
    }
}

impl Error for SelectorError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            SelectorError::Unsupported(err) => Some(err),
            SelectorError::Initialization(err) => Some(err),
        }
    }
}

impl From<UnsupportedProviderError> for SelectorError {
    fn from(err: UnsupportedProviderError) -> Self {
        SelectorError::Unsupported(err)
    }
}

impl From<InitializationError> for SelectorError {
    fn from(err: InitializationError) -> Self {
        SelectorError::Initialization(err)
    }
}

pub fn builtin_providers() -> &'static [BuiltinProvider] {
    BUILTIN_PROVIDERS
}

/// Find a built-in provider by name (case-insensitive)
pub fn find_builtin_provider(name: &str) -> Result<&'static BuiltinProvider, UnsupportedProviderError> {
    BUILTIN_PROVIDERS
        .iter()
        .find(|provider| provider.id.eq_ignore_ascii_case(name.trim()))
        .ok_or_else(|| UnsupportedProviderError {
            name: name.to_lowercase(),
            supported: supported_names(),
        })
}

pub fn supported_names() -> Vec<&'static str> {
    BUILTIN_PROVIDERS.iter().map(|provider| provider.id).collect()
}

pub fn default_model_for(name: &str) -> Result<&'static str, UnsupportedProviderError> {
    find_builtin_provider(name).map(|provider| provider.default_model)
}

/// Build the provider registered under `name`, falling back to its default
/// model when `model` is `None`.
pub fn create(
    name: &str,
    model: Option<String>,
    api_key: Option<String>,
) -> Result<Box<dyn Provider>, SelectorError> {
    create_with_options(
        name,
        ProviderOptions {
            model,
            api_key,
            base_url: None,
        },
    )
}

pub fn create_with_options(
    name: &str,
    options: ProviderOptions,
) -> Result<Box<dyn Provider>, SelectorError> {
    let provider = find_builtin_provider(name)?;
    let model = options
        .model
        .filter(|model| !model.trim().is_empty())
        .unwrap_or_else(|| provider.default_model.to_string());

    let instance = (provider.construct)(ProviderInit {
        model,
        api_key: options.api_key,
        base_url: options.base_url,
    })?;
    Ok(instance)
}
