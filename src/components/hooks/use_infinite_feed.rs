use crate::api::ApiClient;
use crate::feed::mutation::toggle_like;
use crate::feed::sentinel::SentinelSlot;
use crate::feed::{
    abortable_fetch, sentinel_should_fetch, FeedCell, FeedCore, FeedPhase, FeedSpec, FetchOutcome,
    InFlight, ListSource, SENTINEL_THRESHOLD,
};
use crate::models::{FeedItem, Review};
use crate::state::AppContext;
use leptos::html;
use leptos::prelude::*;
use leptos::task::spawn_local;
use serde::de::DeserializeOwned;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};

impl<T: Send + Sync + 'static> FeedCell<T> for RwSignal<FeedCore<T>> {
    fn with_core<R>(&self, f: impl FnOnce(&mut FeedCore<T>) -> R) -> Option<R> {
        // `None` once the owning view has been disposed.
        self.try_update(f)
    }
}

/// Reactive handle to one infinite feed.
///
/// Attach `last_item` to the last rendered item; the hook observes it and
/// loads the next page once it is fully in view.
pub(crate) struct FeedHandle<T: Send + Sync + 'static> {
    pub core: RwSignal<FeedCore<T>>,
    pub phase: Memo<FeedPhase>,
    pub last_item: NodeRef<html::Div>,
    spec: StoredValue<FeedSpec>,
    api_client: RwSignal<ApiClient>,
    in_flight: StoredValue<InFlight>,
}

impl<T: Send + Sync + 'static> Clone for FeedHandle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: Send + Sync + 'static> Copy for FeedHandle<T> {}

impl<T> FeedHandle<T>
where
    T: FeedItem + DeserializeOwned + Clone + Send + Sync + 'static,
{
    /// Tracked snapshot of the collection.
    pub fn items(&self) -> Vec<T> {
        self.core.with(|c| c.items().to_vec())
    }

    /// Starts loading the next page unless the feed is loading or exhausted.
    ///
    /// The gate is taken synchronously, so a second trigger in the same tick
    /// is a no-op.
    pub fn load_more(self) {
        let (Some(spec), Some(client)) = (
            self.spec.try_get_value(),
            self.api_client.try_get_untracked(),
        ) else {
            return;
        };
        let Some(request) = self.core.try_update(FeedCore::<T>::begin_fetch).flatten() else {
            return;
        };
        let Some(registration) = self.in_flight.try_update_value(|f| f.start(&request)) else {
            return;
        };

        let source = ListSource::new(client, spec);
        let core = self.core;
        let in_flight = self.in_flight;
        spawn_local(async move {
            let settled = request.clone();
            let outcome = abortable_fetch(&core, &source, request, registration).await;
            in_flight.try_update_value(|f| f.finish(&settled));
            match outcome {
                Some(FetchOutcome::Loaded { added, exhausted }) => {
                    tracing::debug!(added, exhausted, "feed advanced");
                }
                Some(FetchOutcome::Failed(e)) if e.is_unauthorized() => {
                    tracing::info!("feed request rejected; session token missing or expired");
                }
                Some(_) => {}
                None => tracing::debug!("feed fetch aborted on teardown"),
            }
        });
    }

    /// Whether the last completed fetch failed and left nothing to show.
    pub fn failed_empty(&self) -> bool {
        self.core.with(FeedCore::failed_empty)
    }

    /// Aborts the in-flight request so a late response never lands.
    fn teardown(self) {
        if self.in_flight.try_update_value(InFlight::abort) == Some(true) {
            tracing::debug!("aborted in-flight feed request");
        }
        let _ = self.core.try_update(FeedCore::cancel);
    }
}

impl FeedHandle<Review> {
    pub fn toggle_like(self, review_id: i64, currently_liked: bool) {
        let Some(client) = self.api_client.try_get_untracked() else {
            return;
        };
        let core = self.core;
        spawn_local(async move {
            // Failures are logged inside `toggle_like`; nothing to show.
            let _ = toggle_like(&core, &client, review_id, currently_liked).await;
        });
    }
}

/// One live `IntersectionObserver`; disconnected on drop.
struct SentinelObserver {
    observer: web_sys::IntersectionObserver,
    _callback: Closure<dyn FnMut(js_sys::Array, web_sys::IntersectionObserver)>,
}

impl SentinelObserver {
    fn attach(
        target: &web_sys::Element,
        on_entry: impl Fn(bool, f64) + 'static,
    ) -> Result<Self, JsValue> {
        let callback = Closure::<dyn FnMut(js_sys::Array, web_sys::IntersectionObserver)>::new(
            move |entries: js_sys::Array, _observer: web_sys::IntersectionObserver| {
                for entry in entries.iter() {
                    let entry: web_sys::IntersectionObserverEntry = entry.unchecked_into();
                    on_entry(entry.is_intersecting(), entry.intersection_ratio());
                }
            },
        );

        let options = web_sys::IntersectionObserverInit::new();
        options.set_threshold(&JsValue::from_f64(SENTINEL_THRESHOLD));

        let observer = web_sys::IntersectionObserver::new_with_options(
            callback.as_ref().unchecked_ref(),
            &options,
        )?;
        observer.observe(target);

        Ok(Self {
            observer,
            _callback: callback,
        })
    }
}

impl Drop for SentinelObserver {
    fn drop(&mut self) {
        self.observer.disconnect();
    }
}

/// Cursor-paginated feed with infinite scroll.
///
/// The first page is requested on mount. The observer is rebuilt when the
/// last item changes, a page is merged, or the feed runs out; the callback
/// reads live state, so there are no stale flags to capture.
pub(crate) fn use_infinite_feed<T>(spec: FeedSpec) -> FeedHandle<T>
where
    T: FeedItem + DeserializeOwned + Clone + Send + Sync + 'static,
{
    let app_state = expect_context::<AppContext>();

    let core = RwSignal::new(FeedCore::<T>::new());
    let phase = Memo::new(move |_| core.with(|c| c.phase()));
    let handle = FeedHandle {
        core,
        phase,
        last_item: NodeRef::new(),
        spec: StoredValue::new(spec),
        api_client: app_state.0.api_client,
        in_flight: StoredValue::new(InFlight::default()),
    };

    let observer: StoredValue<SentinelSlot<SentinelObserver>, LocalStorage> =
        StoredValue::new_local(SentinelSlot::default());
    let sentinel_key = Memo::new(move |_| core.with(FeedCore::sentinel_key));

    Effect::new(move |_| {
        let target = handle.last_item.get();
        let key = sentinel_key.get();

        let on_entry = move |intersecting: bool, ratio: f64| {
            let Some(phase) = core.try_with_untracked(|c| c.phase()) else {
                return;
            };
            if sentinel_should_fetch(intersecting, ratio, phase) {
                handle.load_more();
            }
        };

        observer.update_value(|slot| {
            slot.rearm(key.has_more, target, |target| {
                SentinelObserver::attach(&target, on_entry)
            });
        });
    });

    // Initial page, cursor = null.
    Effect::new(move |_| {
        handle.load_more();
    });

    on_cleanup(move || {
        observer.try_update_value(SentinelSlot::disarm);
        observer.dispose();
        handle.teardown();
    });

    handle
}
