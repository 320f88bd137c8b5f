use crate::components::SiteHeader;
use crate::config::EnvConfig;
use crate::pages::{BookDetailPage, OAuthCallbackPage, RecentReviewsPage, ReviewCreatePage};
use crate::state::{AppContext, AppState};
use leptos::prelude::*;
use leptos_router::components::{Route, Router, Routes};
use leptos_router::path;

#[component]
pub fn App() -> impl IntoView {
    provide_context(AppContext(AppState::new(EnvConfig::new())));

    // IMPORTANT:
    // - Leptos CSR requires the `csr` feature on `leptos`.
    // - router hooks require a <Router> context.
    view! {
        <Router>
            <div class="min-h-screen bg-background text-foreground">
                <SiteHeader />
                <main>
                    <Routes fallback=|| view! { <div class="px-4 py-8 text-xs text-muted-foreground">"Not found"</div> }>
                        <Route path=path!("") view=RecentReviewsPage />
                        <Route path=path!("books/:isbn") view=BookDetailPage />
                        <Route path=path!("reviews/new") view=ReviewCreatePage />
                        <Route path=path!("oauth2/callback") view=OAuthCallbackPage />
                    </Routes>
                </main>
            </div>
        </Router>
    }
}
