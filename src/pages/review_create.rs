use crate::api::{ApiError, CreateReviewRequest};
use crate::components::ui::{
    Alert, AlertDescription, Button, ButtonSize, ButtonVariant, Card, CardContent, Input, Label,
    Spinner,
};
use crate::models::{BookSearchItem, ReadingStatus};
use crate::state::AppContext;
use crate::util::{display_authors, MAX_RATING};
use leptos::ev;
use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_dom::helpers::window_event_listener;
use strum::IntoEnumIterator;
use wasm_bindgen::JsCast;

const DEFAULT_RATING: u8 = 5;

/// Checks the form and builds the request body.
pub(crate) fn build_review_request(
    isbn: &str,
    rating: u8,
    content: &str,
    reading_status: ReadingStatus,
) -> Result<CreateReviewRequest, &'static str> {
    if isbn.trim().is_empty() {
        return Err("Pick a book first.");
    }
    if !(1..=MAX_RATING).contains(&rating) {
        return Err("Rating must be between 1 and 5.");
    }
    let content = content.trim();
    if content.is_empty() {
        return Err("Write a few words about the book.");
    }
    Ok(CreateReviewRequest {
        isbn: isbn.to_string(),
        rating,
        content: content.to_string(),
        reading_status,
    })
}

fn submit_error_message(e: &ApiError) -> String {
    if e.is_unauthorized() {
        "Please log in to post a review.".to_string()
    } else {
        e.to_string()
    }
}

#[component]
pub fn ReviewCreatePage() -> impl IntoView {
    let app_state = expect_context::<AppContext>();

    // Search
    let query: RwSignal<String> = RwSignal::new(String::new());
    let results: RwSignal<Vec<BookSearchItem>> = RwSignal::new(vec![]);
    let searching: RwSignal<bool> = RwSignal::new(false);
    let searched: RwSignal<bool> = RwSignal::new(false);
    let search_error: RwSignal<Option<String>> = RwSignal::new(None);
    let search_request_id: RwSignal<u64> = RwSignal::new(0);

    // Review modal
    let selected: RwSignal<Option<BookSearchItem>> = RwSignal::new(None);
    let rating: RwSignal<u8> = RwSignal::new(DEFAULT_RATING);
    let reading_status: RwSignal<ReadingStatus> = RwSignal::new(ReadingStatus::default());
    let content: RwSignal<String> = RwSignal::new(String::new());
    let submitting: RwSignal<bool> = RwSignal::new(false);
    let submit_error: RwSignal<Option<String>> = RwSignal::new(None);
    let success: RwSignal<Option<String>> = RwSignal::new(None);

    let reset_form = move || {
        rating.set(DEFAULT_RATING);
        reading_status.set(ReadingStatus::default());
        content.set(String::new());
        submit_error.set(None);
    };

    let close_modal = move || {
        if submitting.get_untracked() {
            return;
        }
        selected.set(None);
        reset_form();
    };

    let run_search = move || {
        let q = query.get_untracked().trim().to_string();
        if q.is_empty() {
            return;
        }

        let rid = search_request_id.get_untracked().wrapping_add(1);
        search_request_id.set(rid);
        searching.set(true);
        search_error.set(None);
        success.set(None);

        let client = app_state.0.client();
        spawn_local(async move {
            let result = client.search_books(&q).await;
            if search_request_id.try_get_untracked() != Some(rid) {
                return;
            }
            match result {
                Ok(items) => {
                    tracing::debug!(query = %q, hits = items.len(), "book search");
                    results.set(items);
                }
                Err(e) => {
                    tracing::warn!(query = %q, error = %e, "book search failed");
                    results.set(vec![]);
                    search_error.set(Some(e.to_string()));
                }
            }
            searched.set(true);
            searching.set(false);
        });
    };

    let on_search_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        run_search();
    };

    let on_submit_review = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        if submitting.get_untracked() {
            return;
        }
        let Some(book) = selected.get_untracked() else {
            return;
        };

        let body = match build_review_request(
            &book.isbn,
            rating.get_untracked(),
            &content.get_untracked(),
            reading_status.get_untracked(),
        ) {
            Ok(body) => body,
            Err(msg) => {
                submit_error.set(Some(msg.to_string()));
                return;
            }
        };

        submitting.set(true);
        submit_error.set(None);

        let client = app_state.0.client();
        spawn_local(async move {
            match client.create_review(&body).await {
                Ok(()) => {
                    tracing::info!(isbn = %body.isbn, "review posted");
                    submitting.set(false);
                    selected.set(None);
                    reset_form();
                    success.set(Some(format!("Your review of \"{}\" was posted.", book.title)));
                }
                Err(e) => {
                    tracing::warn!(isbn = %body.isbn, error = %e, "review submit failed");
                    submit_error.set(Some(submit_error_message(&e)));
                    submitting.set(false);
                }
            }
        });
    };

    let key_handle = window_event_listener(ev::keydown, move |ev: web_sys::KeyboardEvent| {
        if ev.key() == "Escape" && selected.get_untracked().is_some() {
            ev.prevent_default();
            close_modal();
        }
    });
    on_cleanup(move || key_handle.remove());

    view! {
        <section class="mx-auto w-full max-w-5xl space-y-4 px-4 py-6">
            <div class="space-y-1">
                <h1 class="text-xl font-semibold">"Write a review"</h1>
                <p class="text-xs text-muted-foreground">"Search for a book, then tell us what you thought."</p>
            </div>

            <form class="flex items-center gap-2" on:submit=on_search_submit>
                <Label html_for="book-search" class="sr-only">"Search books"</Label>
                <Input
                    id="book-search"
                    r#type="search"
                    placeholder="Title, author or ISBN"
                    bind_value=query
                    class="h-9 text-sm"
                />
                <Button size=ButtonSize::Sm attr:disabled=move || searching.get()>
                    <span class="inline-flex items-center gap-2">
                        <Show when=move || searching.get() fallback=|| ().into_view()>
                            <Spinner />
                        </Show>
                        "Search"
                    </span>
                </Button>
            </form>

            <Show when=move || success.get().is_some() fallback=|| ().into_view()>
                {move || success.get().map(|msg| view! {
                    <Alert class="border-success/30">
                        <AlertDescription class="text-xs">{msg}</AlertDescription>
                    </Alert>
                })}
            </Show>

            <Show when=move || search_error.get().is_some() fallback=|| ().into_view()>
                {move || search_error.get().map(|e| view! {
                    <Alert class="border-destructive/30">
                        <AlertDescription class="text-destructive text-xs">{e}</AlertDescription>
                    </Alert>
                })}
            </Show>

            <Show
                when=move || !searched.get() || !results.with(Vec::is_empty)
                fallback=|| view! { <p class="text-sm text-muted-foreground">"No books found."</p> }
            >
                <div class="grid grid-cols-2 gap-3 sm:grid-cols-3 md:grid-cols-4">
                    <For
                        each=move || results.get()
                        key=|item| item.isbn.clone()
                        children=move |item| {
                            let pick = item.clone();
                            view! {
                                <SearchResultCard
                                    item=item
                                    on_pick=Callback::new(move |_| {
                                        success.set(None);
                                        submit_error.set(None);
                                        selected.set(Some(pick.clone()));
                                    })
                                />
                            }
                        }
                    />
                </div>
            </Show>

            <Show when=move || selected.get().is_some() fallback=|| ().into_view()>
                <div
                    class="fixed inset-0 z-50 flex items-center justify-center bg-black/30 px-4"
                    on:click=move |ev: web_sys::MouseEvent| {
                        // Backdrop clicks close; clicks inside the dialog bubble here too.
                        let on_backdrop = ev
                            .target()
                            .zip(ev.current_target())
                            .is_some_and(|(t, c)| t == c);
                        if on_backdrop {
                            close_modal();
                        }
                    }
                >
                    <div
                        class="w-full max-w-md rounded-md border border-border bg-background p-4 shadow-lg"
                        role="dialog"
                        aria-modal="true"
                    >
                        <div class="mb-3 space-y-1">
                            <div class="text-sm font-medium">
                                {move || selected.get().map(|b| b.title).unwrap_or_default()}
                            </div>
                            <div class="text-xs text-muted-foreground">
                                {move || {
                                    selected
                                        .get()
                                        .and_then(|b| b.author)
                                        .map(|a| display_authors(&a))
                                        .unwrap_or_default()
                                }}
                            </div>
                        </div>

                        <form class="space-y-3" on:submit=on_submit_review>
                            <div class="space-y-1">
                                <Label class="text-xs">"Rating"</Label>
                                <div class="flex items-center gap-1" role="radiogroup">
                                    {(1..=MAX_RATING)
                                        .map(|n| {
                                            view! {
                                                <button
                                                    type="button"
                                                    class=move || {
                                                        if n <= rating.get() {
                                                            "text-2xl leading-none text-yellow-500"
                                                        } else {
                                                            "text-2xl leading-none text-muted-foreground/40"
                                                        }
                                                    }
                                                    aria-label=format!("{n} stars")
                                                    on:click=move |_| rating.set(n)
                                                >
                                                    "★"
                                                </button>
                                            }
                                        })
                                        .collect_view()}
                                </div>
                            </div>

                            <div class="space-y-1">
                                <Label html_for="reading-status" class="text-xs">"Reading status"</Label>
                                <select
                                    id="reading-status"
                                    class="border-input h-8 w-full rounded-md border bg-background px-2 text-sm"
                                    prop:value=move || reading_status.get().to_string()
                                    on:change=move |ev: web_sys::Event| {
                                        let value = ev
                                            .target()
                                            .and_then(|t| t.dyn_into::<web_sys::HtmlSelectElement>().ok())
                                            .map(|el| el.value());
                                        if let Some(status) = value.and_then(|v| v.parse::<ReadingStatus>().ok()) {
                                            reading_status.set(status);
                                        }
                                    }
                                >
                                    {ReadingStatus::iter()
                                        .map(|s| view! { <option value=s.to_string()>{s.label()}</option> })
                                        .collect_view()}
                                </select>
                            </div>

                            <div class="space-y-1">
                                <Label html_for="review-content" class="text-xs">"Review"</Label>
                                <textarea
                                    id="review-content"
                                    rows="5"
                                    class="border-input w-full rounded-md border bg-background px-3 py-2 text-sm"
                                    placeholder="What did you think?"
                                    prop:value=move || content.get()
                                    on:input=move |ev: web_sys::Event| {
                                        if let Some(el) = ev
                                            .target()
                                            .and_then(|t| t.dyn_into::<web_sys::HtmlTextAreaElement>().ok())
                                        {
                                            content.set(el.value());
                                        }
                                    }
                                ></textarea>
                            </div>

                            <Show when=move || submit_error.get().is_some() fallback=|| ().into_view()>
                                {move || submit_error.get().map(|e| view! {
                                    <Alert class="border-destructive/30">
                                        <AlertDescription class="text-destructive text-xs">{e}</AlertDescription>
                                    </Alert>
                                })}
                            </Show>

                            <div class="flex items-center justify-end gap-2 pt-2">
                                <Button
                                    variant=ButtonVariant::Outline
                                    size=ButtonSize::Sm
                                    attr:r#type="button"
                                    attr:disabled=move || submitting.get()
                                    on:click=move |_| close_modal()
                                >
                                    "Cancel"
                                </Button>
                                <Button size=ButtonSize::Sm attr:disabled=move || submitting.get()>
                                    <span class="inline-flex items-center gap-2">
                                        <Show when=move || submitting.get() fallback=|| ().into_view()>
                                            <Spinner />
                                        </Show>
                                        {move || if submitting.get() { "Posting..." } else { "Post review" }}
                                    </span>
                                </Button>
                            </div>
                        </form>
                    </div>
                </div>
            </Show>
        </section>
    }
}

#[component]
fn SearchResultCard(item: BookSearchItem, on_pick: Callback<()>) -> impl IntoView {
    let BookSearchItem {
        title,
        author,
        publisher,
        image,
        ..
    } = item;
    let authors = author.as_deref().map(display_authors).unwrap_or_default();

    view! {
        <Card class="gap-2 py-3">
            <CardContent class="flex flex-col gap-2 px-3">
                {image.filter(|u| !u.trim().is_empty()).map(|src| view! {
                    <img src=src alt=title.clone() class="h-40 w-full rounded-md object-contain" />
                })}
                <div class="text-sm font-medium leading-snug line-clamp-2">{title}</div>
                <div class="text-xs text-muted-foreground truncate">{authors}</div>
                <div class="text-xs text-muted-foreground truncate">{publisher.unwrap_or_default()}</div>
                <Button
                    variant=ButtonVariant::Secondary
                    size=ButtonSize::Sm
                    class="w-full"
                    on:click=move |_| on_pick.run(())
                >
                    "Review this book"
                </Button>
            </CardContent>
        </Card>
    }
}
