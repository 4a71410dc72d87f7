//! Completion provider configuration and the built-in provider catalog

use indexmap::IndexMap;
use secrecy::SecretString;
use serde::Deserialize;
use url::Url;

/// Configuration for a single OpenAI-compatible provider
///
/// Every field is optional so a table can override just one aspect of a
/// built-in provider, e.g. point `openai` at a local proxy.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProviderConfig {
    /// Base URL of the chat completions API (without `/chat/completions`)
    #[serde(default)]
    pub base_url: Option<Url>,
    /// API key sent as a bearer token
    #[serde(default)]
    pub api_key: Option<SecretString>,
    /// Environment variable holding the API key, read at startup
    #[serde(default)]
    pub api_key_env: Option<String>,
}

/// A provider known without any configuration
#[derive(Debug, Clone, Copy)]
pub struct BuiltinProvider {
    /// Name used in requests (`"moonshot"`, `"openai"`, ...)
    pub name: &'static str,
    /// Default API base URL
    pub base_url: &'static str,
    /// Environment variable conventionally holding the key
    pub api_key_env: Option<&'static str>,
}

/// OpenAI-compatible providers available out of the box
pub const BUILTIN_PROVIDERS: &[BuiltinProvider] = &[
    BuiltinProvider {
        name: "openai",
        base_url: "https://api.openai.com/v1",
        api_key_env: Some("OPENAI_API_KEY"),
    },
    BuiltinProvider {
        name: "moonshot",
        base_url: "https://api.moonshot.ai/v1",
        api_key_env: Some("MOONSHOT_API_KEY"),
    },
    BuiltinProvider {
        name: "deepseek",
        base_url: "https://api.deepseek.com/v1",
        api_key_env: Some("DEEPSEEK_API_KEY"),
    },
    BuiltinProvider {
        name: "groq",
        base_url: "https://api.groq.com/openai/v1",
        api_key_env: Some("GROQ_API_KEY"),
    },
    BuiltinProvider {
        name: "mistral",
        base_url: "https://api.mistral.ai/v1",
        api_key_env: Some("MISTRAL_API_KEY"),
    },
    BuiltinProvider {
        name: "openrouter",
        base_url: "https://openrouter.ai/api/v1",
        api_key_env: Some("OPENROUTER_API_KEY"),
    },
    BuiltinProvider {
        name: "together_ai",
        base_url: "https://api.together.xyz/v1",
        api_key_env: Some("TOGETHERAI_API_KEY"),
    },
    BuiltinProvider {
        name: "xai",
        base_url: "https://api.x.ai/v1",
        api_key_env: Some("XAI_API_KEY"),
    },
    BuiltinProvider {
        name: "ollama",
        base_url: "http://localhost:11434/v1",
        api_key_env: None,
    },
];

/// Look up a built-in provider by name
pub fn builtin_provider(name: &str) -> Option<&'static BuiltinProvider> {
    BUILTIN_PROVIDERS.iter().find(|p| p.name == name)
}

/// Fully resolved settings for one provider
#[derive(Debug, Clone)]
pub struct ProviderSettings {
    /// Name used in requests
    pub name: String,
    /// API base URL
    pub base_url: Url,
    /// Bearer token, if any
    pub api_key: Option<SecretString>,
}

/// Resolve the built-in catalog merged with configured providers
///
/// Configured tables override built-ins of the same name. Keys come from
/// the table itself, then from its `api_key_env`, then from the built-in
/// variable. `lookup_env` is the only place environment values enter.
///
/// # Errors
///
/// Returns an error if a configured provider has no base URL and is not
/// a built-in
pub fn resolve_providers<F>(
    configured: &IndexMap<String, ProviderConfig>,
    lookup_env: F,
) -> anyhow::Result<Vec<ProviderSettings>>
where
    F: Fn(&str) -> Option<String>,
{
    let mut resolved = Vec::with_capacity(BUILTIN_PROVIDERS.len() + configured.len());

    for builtin in BUILTIN_PROVIDERS {
        if configured.contains_key(builtin.name) {
            continue;
        }

        resolved.push(ProviderSettings {
            name: builtin.name.to_owned(),
            base_url: Url::parse(builtin.base_url)?,
            api_key: builtin.api_key_env.and_then(|var| env_secret(&lookup_env, var)),
        });
    }

    for (name, config) in configured {
        let builtin = builtin_provider(name);

        let base_url = match (&config.base_url, builtin) {
            (Some(url), _) => url.clone(),
            (None, Some(builtin)) => Url::parse(builtin.base_url)?,
            (None, None) => anyhow::bail!("provider '{name}' must set base_url"),
        };

        let api_key = config.api_key.clone().or_else(|| {
            config
                .api_key_env
                .as_deref()
                .or_else(|| builtin.and_then(|b| b.api_key_env))
                .and_then(|var| env_secret(&lookup_env, var))
        });

        resolved.push(ProviderSettings {
            name: name.clone(),
            base_url,
            api_key,
        });
    }

    Ok(resolved)
}

fn env_secret<F>(lookup_env: &F, var: &str) -> Option<SecretString>
where
    F: Fn(&str) -> Option<String>,
{
    lookup_env(var)
        .filter(|value| !value.is_empty())
        .map(SecretString::from)
}
