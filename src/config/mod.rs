use serde::{Deserialize, Serialize};
use std::str::FromStr;

const DEFAULT_API_URL: &str = "http://localhost:8080";
const DEFAULT_OAUTH_PROVIDER: &str = "kakao";
const DEFAULT_LOG_LEVEL: &str = "info";

/// Runtime configuration injected by the hosting page as `window.ENV`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub(crate) struct EnvConfig {
    pub api_url: String,
    pub oauth_provider: String,
    pub log_level: String,
}

impl EnvConfig {
    pub fn new() -> Self {
        let env = web_sys::window()
            .and_then(|w| w.get("ENV"))
            .filter(|env| !env.is_undefined() && env.is_object());

        let Some(env) = env else {
            return Self::from_lookup(|_| None);
        };

        Self::from_lookup(|key| {
            js_sys::Reflect::get(&env, &key.into())
                .ok()
                .and_then(|v| v.as_string())
        })
    }

    /// Builds the config from a key lookup.
    ///
    /// Both `API_URL` (documented) and `api_url` (legacy) spellings are accepted;
    /// the upper-case key wins when both are set.
    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |upper: &str, lower: &str, default: &str| {
            lookup(upper)
                .or_else(|| lookup(lower))
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        Self {
            api_url: read("API_URL", "api_url", DEFAULT_API_URL)
                .trim_end_matches('/')
                .to_string(),
            oauth_provider: read("OAUTH_PROVIDER", "oauth_provider", DEFAULT_OAUTH_PROVIDER),
            log_level: read("LOG_LEVEL", "log_level", DEFAULT_LOG_LEVEL),
        }
    }

    /// Falls back to `INFO` on unknown level names.
    pub(crate) fn max_level(&self) -> tracing::Level {
        tracing::Level::from_str(&self.log_level).unwrap_or(tracing::Level::INFO)
    }
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_env_missing() {
        let cfg = EnvConfig::from_lookup(|_| None);
        assert_eq!(cfg.api_url, "http://localhost:8080");
        assert_eq!(cfg.oauth_provider, "kakao");
        assert_eq!(cfg.max_level(), tracing::Level::INFO);
    }

    #[test]
    fn test_upper_case_key_wins_over_legacy() {
        let cfg = EnvConfig::from_lookup(lookup_from(&[
            ("API_URL", "https://books.example.com/"),
            ("api_url", "http://legacy:1"),
        ]));
        assert_eq!(cfg.api_url, "https://books.example.com");
    }

    #[test]
    fn test_legacy_keys_are_honoured() {
        let cfg = EnvConfig::from_lookup(lookup_from(&[
            ("api_url", "http://legacy:1"),
            ("oauth_provider", "google"),
            ("log_level", "debug"),
        ]));
        assert_eq!(cfg.api_url, "http://legacy:1");
        assert_eq!(cfg.oauth_provider, "google");
        assert_eq!(cfg.max_level(), tracing::Level::DEBUG);
    }

    #[test]
    fn test_blank_values_fall_back_to_defaults() {
        let cfg = EnvConfig::from_lookup(lookup_from(&[("API_URL", "  "), ("LOG_LEVEL", "loud")]));
        assert_eq!(cfg.api_url, "http://localhost:8080");
        assert_eq!(cfg.max_level(), tracing::Level::INFO);
    }
}
