use crate::components::ui::{Button, ButtonSize, ButtonVariant};
use crate::models::Review;
use crate::util::{display_authors, format_local_date, star_flags, MAX_RATING};
use leptos::html;
use leptos::prelude::*;
use tw_merge::tw_merge;

#[component]
pub fn StarRating(rating: u8, #[prop(into, optional)] class: String) -> impl IntoView {
    let merged_class = tw_merge!("inline-flex items-center gap-0.5 text-sm leading-none", class);
    let label = format!("{} out of {}", rating.min(MAX_RATING), MAX_RATING);

    view! {
        <span class=merged_class role="img" aria-label=label>
            {star_flags(rating)
                .into_iter()
                .map(|filled| {
                    if filled {
                        view! { <span class="text-yellow-500">"★"</span> }
                    } else {
                        view! { <span class="text-muted-foreground/40">"☆"</span> }
                    }
                })
                .collect_view()}
        </span>
    }
}

/// One review in a feed.
///
/// `node_ref` is only bound on the last card, which doubles as the scroll sentinel.
#[component]
pub fn ReviewCard(
    review: Review,
    #[prop(into)] on_toggle_like: Callback<(i64, bool)>,
    #[prop(optional)] node_ref: NodeRef<html::Div>,
    #[prop(default = true)] show_book: bool,
    #[prop(into, optional)] class: String,
) -> impl IntoView {
    let merged_class = tw_merge!(
        "bg-card text-card-foreground flex flex-col gap-3 rounded-xl border p-4 shadow-sm",
        class
    );

    let Review {
        id,
        isbn,
        book_title,
        book_authors,
        publisher,
        rating,
        content,
        member_name,
        created_at,
        like_count,
        liked,
        ..
    } = review;

    let book_header = show_book.then(|| {
        let authors = display_authors(&book_authors);
        let publisher = (!publisher.is_empty()).then(|| format!(" · {publisher}"));
        let title = match isbn {
            Some(isbn) => {
                let href = format!("/books/{}", urlencoding::encode(&isbn));
                view! { <a class="hover:underline underline-offset-4" href=href>{book_title}</a> }
                    .into_any()
            }
            None => view! { <span>{book_title}</span> }.into_any(),
        };
        view! {
            <div class="space-y-0.5">
                <div class="text-sm font-semibold leading-snug">{title}</div>
                <div class="text-xs text-muted-foreground truncate">
                    {authors}
                    {publisher}
                </div>
            </div>
        }
    });

    view! {
        <div node_ref=node_ref data-review-id=id class=merged_class>
            {book_header}

            <StarRating rating=rating />

            <p class="text-sm whitespace-pre-line break-words">{content}</p>

            <div class="mt-auto flex items-center justify-between gap-2 text-xs text-muted-foreground">
                <div class="flex min-w-0 flex-col">
                    <span class="truncate font-medium text-foreground">{member_name}</span>
                    <span>{format_local_date(&created_at)}</span>
                </div>

                <Button
                    variant=ButtonVariant::Ghost
                    size=ButtonSize::Sm
                    attr:aria-pressed=if liked { "true" } else { "false" }
                    attr:title=if liked { "Unlike" } else { "Like" }
                    on:click=move |_| on_toggle_like.run((id, liked))
                >
                    <span class=if liked { "text-red-500" } else { "" }>
                        {if liked { "♥" } else { "♡" }}
                    </span>
                    <span>{like_count}</span>
                </Button>
            </div>
        </div>
    }
}
