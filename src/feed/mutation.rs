use super::{FeedCell, FeedCore};
use crate::api::ApiResult;
use crate::models::Review;

pub(crate) trait LikeApi {
    /// `liked = true` adds a like, `false` removes it.
    async fn set_liked(&self, review_id: i64, liked: bool) -> ApiResult<()>;
}

/// Moves the matching review into the `liked` state and adjusts its count by one.
///
/// Returns `false` when no review matched or it was already in that state.
pub(crate) fn apply_like(core: &mut FeedCore<Review>, review_id: i64, liked: bool) -> bool {
    let Some(review) = core.items_mut().iter_mut().find(|r| r.id == review_id) else {
        return false;
    };
    if review.liked == liked {
        return false;
    }

    review.liked = liked;
    review.like_count = if liked {
        review.like_count.saturating_add(1)
    } else {
        review.like_count.saturating_sub(1)
    };
    true
}

/// Flips the like state of `review_id` on the server, then locally.
///
/// Local state only changes after the server confirms.
pub(crate) async fn toggle_like<C, A>(
    cell: &C,
    api: &A,
    review_id: i64,
    currently_liked: bool,
) -> ApiResult<bool>
where
    C: FeedCell<Review>,
    A: LikeApi,
{
    let target = !currently_liked;

    if let Err(e) = api.set_liked(review_id, target).await {
        tracing::warn!(review_id, liked = target, error = %e, "like toggle failed");
        return Err(e);
    }

    Ok(cell
        .with_core(|core| apply_like(core, review_id, target))
        .unwrap_or(false))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiError;
    use crate::feed::{CursorPage, FeedCore};
    use futures::executor::block_on;
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;

    struct RecordingLikeApi {
        fail: bool,
        calls: RefCell<Vec<(i64, bool)>>,
    }

    impl RecordingLikeApi {
        fn new(fail: bool) -> Self {
            Self {
                fail,
                calls: RefCell::new(Vec::new()),
            }
        }
    }

    impl LikeApi for RecordingLikeApi {
        async fn set_liked(&self, review_id: i64, liked: bool) -> ApiResult<()> {
            self.calls.borrow_mut().push((review_id, liked));
            if self.fail {
                Err(ApiError::Network("connection refused".to_string()))
            } else {
                Ok(())
            }
        }
    }

    fn loaded_feed() -> RefCell<FeedCore<Review>> {
        let items: Vec<Review> = serde_json::from_value(serde_json::json!([
            {"id": 1, "likeCount": 0, "liked": false},
            {"id": 2, "likeCount": 4, "liked": false},
            {"id": 3, "likeCount": 7, "liked": true}
        ]))
        .expect("review fixtures");

        let mut core = FeedCore::new();
        let req = core.begin_fetch().expect("idle");
        core.complete(
            &req,
            Ok(CursorPage {
                items,
                next_cursor: None,
                has_next: false,
            }),
        );
        RefCell::new(core)
    }

    #[test]
    fn test_like_success_updates_only_matching_record() {
        let cell = loaded_feed();
        let before = cell.borrow().items().to_vec();
        let api = RecordingLikeApi::new(false);

        let changed = block_on(toggle_like(&cell, &api, 2, false)).expect("like should succeed");

        assert!(changed);
        assert_eq!(*api.calls.borrow(), vec![(2, true)]);
        let core = cell.borrow();
        let after = core.items();
        assert!(after[1].liked);
        assert_eq!(after[1].like_count, 5);
        assert_eq!(after[0], before[0]);
        assert_eq!(after[2], before[2]);
    }

    #[test]
    fn test_unlike_sends_remove_and_decrements() {
        let cell = loaded_feed();
        let api = RecordingLikeApi::new(false);

        block_on(toggle_like(&cell, &api, 3, true)).expect("unlike should succeed");

        assert_eq!(*api.calls.borrow(), vec![(3, false)]);
        let core = cell.borrow();
        assert!(!core.items()[2].liked);
        assert_eq!(core.items()[2].like_count, 6);
    }

    #[test]
    fn test_failed_toggle_leaves_collection_unchanged() {
        let cell = loaded_feed();
        let before = cell.borrow().items().to_vec();
        let api = RecordingLikeApi::new(true);

        let err = block_on(toggle_like(&cell, &api, 1, false)).expect_err("should fail");

        assert_eq!(err, ApiError::Network("connection refused".to_string()));
        assert_eq!(cell.borrow().items(), before.as_slice());
    }

    #[test]
    fn test_apply_like_is_idempotent_and_saturates() {
        let cell = loaded_feed();
        let mut core = cell.borrow_mut();
        assert!(!apply_like(&mut core, 3, true));
        assert_eq!(core.items()[2].like_count, 7);

        assert!(!apply_like(&mut core, 99, true));

        core.items_mut()[1].liked = true;
        core.items_mut()[1].like_count = 0;
        assert!(apply_like(&mut core, 2, false));
        assert_eq!(core.items()[1].like_count, 0);
    }
}
