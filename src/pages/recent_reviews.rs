use crate::components::hooks::use_infinite_feed;
use crate::components::ReviewFeed;
use crate::feed::FeedSpec;
use crate::models::Review;
use leptos::prelude::*;

#[component]
pub fn RecentReviewsPage() -> impl IntoView {
    let feed = use_infinite_feed::<Review>(FeedSpec::recent_reviews());

    view! {
        <section class="mx-auto w-full max-w-5xl space-y-3 px-4 py-6">
            <div class="space-y-1">
                <h1 class="text-xl font-semibold">"Recent reviews"</h1>
                <p class="text-xs text-muted-foreground">"What people are reading right now."</p>
            </div>

            <ReviewFeed feed=feed horizontal=true empty_label="No reviews yet." />
        </section>
    }
}
