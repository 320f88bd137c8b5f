use crate::api::ApiClient;
use crate::config::EnvConfig;
use crate::storage::{self, REDIRECT_KEY};
use leptos::prelude::*;

pub(crate) const OAUTH_CALLBACK_PATH: &str = "/oauth2/callback";

/// Session context shared by every page.
///
/// Created once in `App`; pages read the client through it instead of
/// touching localStorage themselves.
#[derive(Clone, Copy)]
pub(crate) struct AppState {
    pub config: StoredValue<EnvConfig>,
    pub api_client: RwSignal<ApiClient>,
}

impl AppState {
    pub fn new(config: EnvConfig) -> Self {
        let stored_client = ApiClient::load_from_storage(&config);
        Self {
            config: StoredValue::new(config),
            api_client: RwSignal::new(stored_client),
        }
    }

    pub fn client(&self) -> ApiClient {
        self.api_client.get_untracked()
    }

    pub fn is_authenticated(&self) -> bool {
        self.api_client.with(ApiClient::is_authenticated)
    }

    /// Remember where we are and hand the browser to the OAuth provider.
    pub fn login(&self) {
        let location = window().location();
        let here = format!(
            "{}{}",
            location.pathname().unwrap_or_default(),
            location.search().unwrap_or_default()
        );
        storage::save_item(REDIRECT_KEY, &here);

        let provider = self.config.with_value(|c| c.oauth_provider.clone());
        let url = self.client().authorization_url(&provider);
        tracing::info!(%provider, "redirecting to login");
        let _ = location.set_href(&url);
    }

    /// Persist the token from the OAuth callback; returns where to go next.
    pub fn complete_login(&self, token: String) -> String {
        let mut client = self.client();
        client.set_token(token);
        client.save_to_storage();
        self.api_client.set(client);

        sanitize_redirect(storage::take_item(REDIRECT_KEY).as_deref())
    }

    pub fn logout(&self) {
        let mut client = self.client();
        client.logout();
        self.api_client.set(client);
        tracing::info!("logged out");
    }
}

#[derive(Clone, Copy)]
pub(crate) struct AppContext(pub AppState);

/// Only same-origin absolute paths are followed after login.
pub(crate) fn sanitize_redirect(path: Option<&str>) -> String {
    match path.map(str::trim) {
        Some(p)
            if p.starts_with('/')
                && !p.starts_with("//")
                && !p.starts_with(OAUTH_CALLBACK_PATH) =>
        {
            p.to_string()
        }
        _ => "/".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_redirect_keeps_local_paths() {
        assert_eq!(sanitize_redirect(Some("/books/978?x=1")), "/books/978?x=1");
        assert_eq!(sanitize_redirect(Some("/")), "/");
    }

    #[test]
    fn test_sanitize_redirect_rejects_foreign_and_loops() {
        assert_eq!(sanitize_redirect(None), "/");
        assert_eq!(sanitize_redirect(Some("")), "/");
        assert_eq!(sanitize_redirect(Some("https://evil.example")), "/");
        assert_eq!(sanitize_redirect(Some("//evil.example")), "/");
        assert_eq!(sanitize_redirect(Some("/oauth2/callback?token=t")), "/");
    }
}

#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use crate::storage::TOKEN_KEY;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_complete_login_persists_token_and_returns_redirect() {
        let owner = Owner::new();
        owner.set();

        ApiClient::clear_storage();
        storage::save_item(REDIRECT_KEY, "/books/42");
        let state = AppState::new(EnvConfig::from_lookup(|_| None));
        assert!(!state.is_authenticated());

        let next = state.complete_login("t1".to_string());
        assert_eq!(next, "/books/42");
        assert!(state.is_authenticated());
        assert_eq!(storage::load_item(TOKEN_KEY).as_deref(), Some("t1"));

        state.logout();
        assert!(!state.is_authenticated());
        assert!(storage::load_item(TOKEN_KEY).is_none());
    }
}
