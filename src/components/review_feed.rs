use crate::components::hooks::FeedHandle;
use crate::components::ui::{Button, ButtonSize, ButtonVariant, Spinner};
use crate::components::ReviewCard;
use crate::feed::FeedPhase;
use crate::models::Review;
use leptos::prelude::*;

/// Renders an infinite review feed and wires the last card up as its sentinel.
#[component]
pub fn ReviewFeed(
    feed: FeedHandle<Review>,
    #[prop(optional)] horizontal: bool,
    #[prop(default = true)] show_book: bool,
    #[prop(into)] empty_label: String,
) -> impl IntoView {
    let on_toggle_like = Callback::new(move |(review_id, liked): (i64, bool)| {
        feed.toggle_like(review_id, liked);
    });

    let list_class = if horizontal {
        "flex gap-4 overflow-x-auto pb-2 snap-x"
    } else {
        "flex flex-col gap-3"
    };
    let card_class = if horizontal { "w-72 shrink-0 snap-start" } else { "" };

    // Keyed on everything a card shows that can change, plus whether it is last.
    let entries = move || {
        let items = feed.items();
        let last = items.len().saturating_sub(1);
        items
            .into_iter()
            .enumerate()
            .map(|(i, review)| (i == last, review))
            .collect::<Vec<_>>()
    };

    let is_empty = move || {
        feed.phase.get() == FeedPhase::Exhausted && feed.core.with(|c| c.items().is_empty())
    };

    view! {
        <div class=list_class>
            <For
                each=entries
                key=|(is_last, review)| (review.id, review.liked, review.like_count, *is_last)
                children=move |(is_last, review)| {
                    let node_ref = if is_last { feed.last_item } else { NodeRef::new() };
                    view! {
                        <ReviewCard
                            review=review
                            node_ref=node_ref
                            on_toggle_like=on_toggle_like
                            show_book=show_book
                            class=card_class
                        />
                    }
                }
            />

            <Show when=move || feed.phase.get().is_loading() fallback=|| ().into_view()>
                <div class="flex shrink-0 items-center justify-center gap-2 p-4 text-xs text-muted-foreground">
                    <Spinner />
                    "Loading..."
                </div>
            </Show>
        </div>

        <Show when=is_empty fallback=|| ().into_view()>
            <p class="py-6 text-center text-sm text-muted-foreground">{empty_label.clone()}</p>
        </Show>

        // Nothing rendered means no sentinel, so retrying needs a button.
        <Show when=move || feed.failed_empty() fallback=|| ().into_view()>
            <div class="flex flex-col items-center gap-2 py-6 text-sm text-muted-foreground">
                <p>"Couldn't load reviews."</p>
                <Button
                    variant=ButtonVariant::Outline
                    size=ButtonSize::Sm
                    on:click=move |_| feed.load_more()
                >
                    "Try again"
                </Button>
            </div>
        </Show>
    }
}
