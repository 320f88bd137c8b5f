use crate::components::hooks::use_infinite_feed;
use crate::components::ui::{Button, ButtonSize, ButtonVariant, Card, CardContent, Spinner};
use crate::components::ReviewFeed;
use crate::feed::FeedSpec;
use crate::models::{Book, Review};
use crate::state::AppContext;
use crate::util::display_authors;
use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_router::hooks::use_params;
use leptos_router::params::Params;

const PLACEHOLDER_COVER: &str = "/placeholder-book.png";

#[derive(Params, PartialEq, Clone, Debug)]
pub struct BookRouteParams {
    pub isbn: Option<String>,
}

#[component]
pub fn BookDetailPage() -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let params = use_params::<BookRouteParams>();
    let isbn = Memo::new(move |_| {
        params
            .get()
            .ok()
            .and_then(|p| p.isbn)
            .unwrap_or_default()
    });

    let book: RwSignal<Option<Book>> = RwSignal::new(None);
    let loading: RwSignal<bool> = RwSignal::new(true);
    let request_id: RwSignal<u64> = RwSignal::new(0);

    Effect::new(move |_| {
        let isbn = isbn.get();
        let rid = request_id.get_untracked().wrapping_add(1);
        request_id.set(rid);
        book.set(None);

        if isbn.is_empty() {
            loading.set(false);
            return;
        }
        loading.set(true);

        let client = app_state.0.client();
        spawn_local(async move {
            let result = client.get_book(&isbn).await;
            // Ignore stale responses after navigating to another book.
            if request_id.try_get_untracked() != Some(rid) {
                return;
            }
            match result {
                Ok(b) => book.set(Some(b)),
                Err(e) => tracing::warn!(%isbn, error = %e, "failed to load book"),
            }
            loading.set(false);
        });
    });

    view! {
        <section class="mx-auto w-full max-w-3xl space-y-6 px-4 py-6">
            <Show
                when=move || !loading.get()
                fallback=|| view! {
                    <div class="flex items-center gap-2 text-xs text-muted-foreground">
                        <Spinner />
                        "Loading..."
                    </div>
                }
            >
                {move || match book.get() {
                    Some(b) => view! {
                        <BookInfo book=b />
                        <BookReviews isbn=isbn.get_untracked() />
                    }
                    .into_any(),
                    None => view! {
                        <p class="text-sm text-muted-foreground">"Book not found."</p>
                    }
                    .into_any(),
                }}
            </Show>
        </section>
    }
}

#[component]
fn BookInfo(book: Book) -> impl IntoView {
    let Book {
        title,
        author,
        publisher,
        published_date,
        description,
        image_url,
        isbn,
    } = book;

    let cover = image_url
        .filter(|u| !u.trim().is_empty())
        .unwrap_or_else(|| PLACEHOLDER_COVER.to_string());
    let authors = author.as_deref().map(display_authors).unwrap_or_default();
    let meta = [publisher, published_date]
        .into_iter()
        .flatten()
        .filter(|s| !s.trim().is_empty())
        .collect::<Vec<_>>()
        .join(" · ");

    view! {
        <Card class="py-4">
            <CardContent class="flex flex-col gap-4 px-4 sm:flex-row">
                <img
                    src=cover
                    alt=title.clone()
                    class="h-48 w-32 shrink-0 rounded-md border border-border object-cover"
                />
                <div class="min-w-0 space-y-2">
                    <h1 class="text-xl font-semibold leading-snug">{title}</h1>
                    <div class="text-sm text-muted-foreground">{authors}</div>
                    <div class="text-xs text-muted-foreground">{meta}</div>
                    <div class="text-xs text-muted-foreground">"ISBN " {isbn}</div>
                    {description.map(|d| view! {
                        <p class="text-sm whitespace-pre-line">{d}</p>
                    })}
                    <Button
                        variant=ButtonVariant::Outline
                        size=ButtonSize::Sm
                        href="/reviews/new"
                    >
                        "Write a review"
                    </Button>
                </div>
            </CardContent>
        </Card>
    }
}

/// Owns the per-book feed; re-created (and torn down) whenever the ISBN changes.
#[component]
fn BookReviews(isbn: String) -> impl IntoView {
    let feed = use_infinite_feed::<Review>(FeedSpec::book_reviews(&isbn));

    view! {
        <div class="space-y-3">
            <h2 class="text-base font-semibold">"Reviews"</h2>
            <ReviewFeed feed=feed show_book=false empty_label="No reviews for this book yet." />
        </div>
    }
}
