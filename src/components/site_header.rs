use crate::components::ui::{Button, ButtonSize, ButtonVariant};
use crate::state::AppContext;
use leptos::prelude::*;

#[component]
pub fn SiteHeader() -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let is_authenticated = move || app_state.0.is_authenticated();
    let login_label = app_state
        .0
        .config
        .with_value(|c| format!("Log in with {}", provider_label(&c.oauth_provider)));

    view! {
        <header class="sticky top-0 z-40 border-b border-border bg-background/95 backdrop-blur">
            <div class="mx-auto flex h-14 w-full max-w-5xl items-center justify-between gap-4 px-4">
                <a href="/" class="text-sm font-semibold text-foreground">"Book Reviews"</a>

                <nav class="flex items-center gap-1">
                    <Button variant=ButtonVariant::Ghost size=ButtonSize::Sm href="/">
                        "Home"
                    </Button>
                    <Button variant=ButtonVariant::Ghost size=ButtonSize::Sm href="/reviews/new">
                        "Write a review"
                    </Button>

                    <Show
                        when=is_authenticated
                        fallback=move || {
                            let login_label = login_label.clone();
                            view! {
                                <Button
                                    size=ButtonSize::Sm
                                    on:click=move |_| app_state.0.login()
                                >
                                    {login_label}
                                </Button>
                            }
                        }
                    >
                        <Button
                            variant=ButtonVariant::Outline
                            size=ButtonSize::Sm
                            on:click=move |_| app_state.0.logout()
                        >
                            "Log out"
                        </Button>
                    </Show>
                </nav>
            </div>
        </header>
    }
}

/// `"kakao"` -> `"Kakao"`.
fn provider_label(provider: &str) -> String {
    let mut chars = provider.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_label() {
        assert_eq!(provider_label("kakao"), "Kakao");
        assert_eq!(provider_label("Google"), "Google");
        assert_eq!(provider_label(""), "");
    }
}
