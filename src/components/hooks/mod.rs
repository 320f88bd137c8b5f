pub mod use_infinite_feed;

pub(crate) use use_infinite_feed::{use_infinite_feed, FeedHandle};
