//! Cursor-paginated feeds.
//!
//! A feed is a [`FeedCore`] (collection + cursor + phase) driven by
//! [`fetch_next`] against a [`PageSource`]. The UI owns the core inside a
//! signal and calls `fetch_next` from the scroll sentinel; tests own it inside
//! a `RefCell` and drive it with mock sources.

pub(crate) mod mutation;
pub(crate) mod sentinel;

use crate::api::{ApiClient, ApiError, ApiResult};
use crate::models::FeedItem;
use futures::future::{AbortHandle, AbortRegistration, Abortable};
use serde::de::DeserializeOwned;
use std::cell::RefCell;
use std::collections::HashSet;

pub(crate) const RECENT_REVIEWS_PAGE_SIZE: u32 = 3;
pub(crate) const BOOK_REVIEWS_PAGE_SIZE: u32 = 5;

/// Fraction of the last item that must be visible before the next page loads.
pub(crate) const SENTINEL_THRESHOLD: f64 = 1.0;

// Browsers report ratios like 0.9999 for fully visible elements on fractional pixels.
const SENTINEL_RATIO_SLOP: f64 = 0.01;

/// One page as returned by a list endpoint.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct CursorPage<T> {
    pub items: Vec<T>,
    pub next_cursor: Option<String>,
    pub has_next: bool,
}

/// Endpoint, page size and response-field mapping for one kind of feed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct FeedSpec {
    pub path: String,
    pub page_size: u32,
    pub items_field: &'static str,
}

impl FeedSpec {
    pub fn recent_reviews() -> Self {
        Self {
            path: "/api/reviews".to_string(),
            page_size: RECENT_REVIEWS_PAGE_SIZE,
            items_field: "reviews",
        }
    }

    pub fn book_reviews(isbn: &str) -> Self {
        Self {
            path: format!("/api/books/{}/reviews", urlencoding::encode(isbn)),
            page_size: BOOK_REVIEWS_PAGE_SIZE,
            items_field: "reviews",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) enum FeedPhase {
    /// Ready for the next page.
    #[default]
    Idle,
    /// A request is in flight; further triggers are ignored.
    Loading,
    /// The server reported no more pages. Terminal.
    Exhausted,
}

impl FeedPhase {
    pub fn is_loading(self) -> bool {
        self == Self::Loading
    }

    pub fn has_more(self) -> bool {
        self != Self::Exhausted
    }
}

/// Ticket for one in-flight page request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct PageRequest {
    pub seq: u64,
    pub cursor: Option<String>,
}

impl PageRequest {
    /// A request without a cursor replaces the collection instead of appending.
    pub fn replaces(&self) -> bool {
        self.cursor.is_none()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum FetchOutcome {
    /// The gate was closed (loading or exhausted); nothing was sent.
    Skipped,
    Loaded { added: usize, exhausted: bool },
    Failed(ApiError),
    /// The response arrived for a cancelled request or a disposed view.
    Discarded,
}

/// What the scroll sentinel depends on.
///
/// The observer is rebuilt whenever this changes. Every merged page bumps
/// `pages_loaded`, even one that adds no new last item; a failed fetch changes
/// nothing, so failures never re-arm the observer on their own.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct SentinelKey {
    pub has_more: bool,
    pub pages_loaded: u64,
}

#[derive(Clone, Debug)]
pub(crate) struct FeedCore<T> {
    items: Vec<T>,
    cursor: Option<String>,
    phase: FeedPhase,
    seq: u64,
    pages_loaded: u64,
    last_failed: bool,
}

impl<T> Default for FeedCore<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            cursor: None,
            phase: FeedPhase::Idle,
            seq: 0,
            pages_loaded: 0,
            last_failed: false,
        }
    }
}

impl<T: FeedItem> FeedCore<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn items_mut(&mut self) -> &mut [T] {
        &mut self.items
    }

    pub fn cursor(&self) -> Option<&str> {
        self.cursor.as_deref()
    }

    pub fn phase(&self) -> FeedPhase {
        self.phase
    }

    /// The most recent completed fetch failed.
    pub fn last_fetch_failed(&self) -> bool {
        self.last_failed
    }

    /// Idle with nothing to show because the last fetch failed.
    pub fn failed_empty(&self) -> bool {
        self.phase == FeedPhase::Idle && self.items.is_empty() && self.last_failed
    }

    pub fn sentinel_key(&self) -> SentinelKey {
        SentinelKey {
            has_more: self.phase.has_more(),
            pages_loaded: self.pages_loaded,
        }
    }

    /// `Idle -> Loading`. Returns `None` when loading or exhausted.
    pub fn begin_fetch(&mut self) -> Option<PageRequest> {
        if self.phase != FeedPhase::Idle {
            return None;
        }
        self.phase = FeedPhase::Loading;
        self.seq = self.seq.wrapping_add(1);
        Some(PageRequest {
            seq: self.seq,
            cursor: self.cursor.clone(),
        })
    }

    /// Applies the result of `request`. Always leaves the `Loading` phase.
    pub fn complete(&mut self, request: &PageRequest, result: ApiResult<CursorPage<T>>) -> FetchOutcome {
        if self.phase != FeedPhase::Loading || request.seq != self.seq {
            return FetchOutcome::Discarded;
        }

        match result {
            Ok(page) => {
                let added = self.merge(request.replaces(), page.items);
                let exhausted = !page.has_next || page.next_cursor.is_none();
                if page.has_next && page.next_cursor.is_none() {
                    tracing::warn!("list endpoint reported more pages without a cursor; stopping");
                }
                self.cursor = page.next_cursor;
                self.pages_loaded += 1;
                self.last_failed = false;
                self.phase = if exhausted {
                    FeedPhase::Exhausted
                } else {
                    FeedPhase::Idle
                };
                FetchOutcome::Loaded { added, exhausted }
            }
            Err(e) => {
                self.phase = FeedPhase::Idle;
                self.last_failed = true;
                FetchOutcome::Failed(e)
            }
        }
    }

    /// Drops whatever is in flight so its response is discarded.
    pub fn cancel(&mut self) {
        if self.phase == FeedPhase::Loading {
            self.phase = FeedPhase::Idle;
        }
        self.seq = self.seq.wrapping_add(1);
    }

    fn merge(&mut self, replace: bool, incoming: Vec<T>) -> usize {
        if replace {
            self.items.clear();
        }
        let mut seen: HashSet<i64> = self.items.iter().map(FeedItem::item_id).collect();
        let before = self.items.len();
        for item in incoming {
            if seen.insert(item.item_id()) {
                self.items.push(item);
            }
        }
        self.items.len() - before
    }
}

/// Whether an intersection event on the last item should load the next page.
pub(crate) fn sentinel_should_fetch(is_intersecting: bool, ratio: f64, phase: FeedPhase) -> bool {
    is_intersecting && ratio >= SENTINEL_THRESHOLD - SENTINEL_RATIO_SLOP && phase == FeedPhase::Idle
}

/// Somewhere a feed's state lives.
///
/// Returns `None` when the owner is gone (disposed signal).
pub(crate) trait FeedCell<T> {
    fn with_core<R>(&self, f: impl FnOnce(&mut FeedCore<T>) -> R) -> Option<R>;
}

impl<T> FeedCell<T> for RefCell<FeedCore<T>> {
    fn with_core<R>(&self, f: impl FnOnce(&mut FeedCore<T>) -> R) -> Option<R> {
        Some(f(&mut self.borrow_mut()))
    }
}

pub(crate) trait PageSource<T> {
    async fn fetch_page(&self, cursor: Option<&str>) -> ApiResult<CursorPage<T>>;
}

/// A backend list endpoint described by a [`FeedSpec`].
#[derive(Clone, Debug)]
pub(crate) struct ListSource {
    pub client: ApiClient,
    pub spec: FeedSpec,
}

impl ListSource {
    pub fn new(client: ApiClient, spec: FeedSpec) -> Self {
        Self { client, spec }
    }
}

impl<T: DeserializeOwned> PageSource<T> for ListSource {
    async fn fetch_page(&self, cursor: Option<&str>) -> ApiResult<CursorPage<T>> {
        self.client.fetch_list_page(&self.spec, cursor).await
    }
}

/// Loads the next page into `cell` if the feed is idle.
///
/// At most one request per feed is in flight: a call made while another is
/// pending returns [`FetchOutcome::Skipped`] without touching the source.
pub(crate) async fn fetch_next<T, C, S>(cell: &C, source: &S) -> FetchOutcome
where
    T: FeedItem,
    C: FeedCell<T>,
    S: PageSource<T>,
{
    let Some(request) = cell.with_core(FeedCore::<T>::begin_fetch).flatten() else {
        return FetchOutcome::Skipped;
    };
    complete_fetch(cell, source, request).await
}

/// Runs an already-started `request` and applies its response to `cell`.
pub(crate) async fn complete_fetch<T, C, S>(cell: &C, source: &S, request: PageRequest) -> FetchOutcome
where
    T: FeedItem,
    C: FeedCell<T>,
    S: PageSource<T>,
{
    let result = source.fetch_page(request.cursor.as_deref()).await;
    if let Err(e) = &result {
        tracing::warn!(cursor = ?request.cursor, error = %e, "feed page fetch failed");
    }

    let outcome = cell
        .with_core(|core| core.complete(&request, result))
        .unwrap_or(FetchOutcome::Discarded);

    if let FetchOutcome::Loaded { added, exhausted } = &outcome {
        tracing::debug!(cursor = ?request.cursor, added, exhausted, "feed page merged");
    }
    outcome
}

/// Abort handle for the one request a feed may have outstanding.
#[derive(Debug, Default)]
pub(crate) struct InFlight {
    current: Option<(u64, AbortHandle)>,
}

impl InFlight {
    /// Registers `request` as the outstanding one.
    ///
    /// Only called after the feed's gate was taken, so any previous handle
    /// belongs to a request that is already over.
    pub fn start(&mut self, request: &PageRequest) -> AbortRegistration {
        let (handle, registration) = AbortHandle::new_pair();
        self.current = Some((request.seq, handle));
        registration
    }

    /// Forgets `request` once it settled, unless a newer one replaced it.
    pub fn finish(&mut self, request: &PageRequest) {
        if matches!(self.current, Some((seq, _)) if seq == request.seq) {
            self.current = None;
        }
    }

    pub fn is_active(&self) -> bool {
        self.current.is_some()
    }

    /// Aborts the outstanding request. Returns whether there was one.
    pub fn abort(&mut self) -> bool {
        match self.current.take() {
            Some((_, handle)) => {
                handle.abort();
                true
            }
            None => false,
        }
    }
}

/// [`complete_fetch`] that resolves to `None` when aborted through its registration.
pub(crate) async fn abortable_fetch<T, C, S>(
    cell: &C,
    source: &S,
    request: PageRequest,
    registration: AbortRegistration,
) -> Option<FetchOutcome>
where
    T: FeedItem,
    C: FeedCell<T>,
    S: PageSource<T>,
{
    Abortable::new(complete_fetch(cell, source, request), registration)
        .await
        .ok()
}
