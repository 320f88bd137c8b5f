use crate::state::AppContext;
use leptos::prelude::*;
use leptos_router::hooks::use_query_map;

#[component]
pub fn OAuthCallbackPage() -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let query = use_query_map();
    let failed: RwSignal<bool> = RwSignal::new(false);

    Effect::new(move |_| {
        let token = query.with(|q| q.get("token")).filter(|t| !t.trim().is_empty());
        match token {
            Some(token) => {
                let next = app_state.0.complete_login(token);
                tracing::info!(%next, "login completed");
                // Full reload so every view starts from the new session.
                let _ = window().location().set_href(&next);
            }
            None => {
                tracing::warn!("oauth callback without a token");
                failed.set(true);
            }
        }
    });

    view! {
        <div class="mx-auto flex min-h-[50vh] w-full max-w-sm flex-col items-center justify-center gap-2 px-4 text-center">
            <Show
                when=move || failed.get()
                fallback=|| view! { <p class="text-sm text-muted-foreground">"Signing you in..."</p> }
            >
                <p class="text-sm font-medium">"Login failed."</p>
                <a class="text-xs text-primary underline underline-offset-4" href="/">"Back to home"</a>
            </Show>
        </div>
    }
}
