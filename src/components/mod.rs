pub mod hooks;
pub mod review_card;
pub mod review_feed;
pub mod site_header;
pub mod ui;

pub(crate) use review_card::ReviewCard;
pub(crate) use review_feed::ReviewFeed;
pub(crate) use site_header::SiteHeader;
