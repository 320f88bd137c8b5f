mod book_detail;
mod oauth_callback;
mod recent_reviews;
mod review_create;

pub use book_detail::BookDetailPage;
pub use oauth_callback::OAuthCallbackPage;
pub use recent_reviews::RecentReviewsPage;
pub use review_create::ReviewCreatePage;
