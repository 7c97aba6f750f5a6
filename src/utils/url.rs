//! Endpoint URL helpers shared by the provider clients.

/// Pick the base URL for a provider: an explicit override wins, then the
/// provider's environment variable, then its public endpoint. Blank values
/// are ignored and trailing slashes are dropped.
pub fn resolve_base_url(explicit: Option<&str>, env_var: &str, default: &str) -> String {
    let from_env = std::env::var(env_var).ok();
    let chosen = explicit
        .filter(|value| !value.trim().is_empty())
        .or_else(|| from_env.as_deref().filter(|value| !value.trim().is_empty()))
        .unwrap_or(default);
    chosen.trim().trim_end_matches('/').to_string()
}

/// Join a base URL and an endpoint path without doubling the slash.
///
/// ```
/// use parley::utils::url::construct_api_url;
///
/// assert_eq!(
///     construct_api_url("https://api.anthropic.com/v1/", "/messages"),
///     "https://api.anthropic.com/v1/messages"
/// );
/// ```
pub fn construct_api_url(base_url: &str, endpoint: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        endpoint.trim_start_matches('/')
    )
}
