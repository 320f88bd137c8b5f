use std::fmt::Debug;

/// Holds at most one live sentinel observer.
///
/// Dropping an observer disconnects it, so the old one is always released
/// before a new one is attached.
#[derive(Debug)]
pub(crate) struct SentinelSlot<O> {
    current: Option<O>,
}

impl<O> Default for SentinelSlot<O> {
    fn default() -> Self {
        Self { current: None }
    }
}

impl<O> SentinelSlot<O> {
    pub fn is_armed(&self) -> bool {
        self.current.is_some()
    }

    pub fn disarm(&mut self) {
        self.current = None;
    }

    /// Replaces the observer for `target`. Stays empty once the feed has no
    /// more pages or there is nothing rendered to observe.
    pub fn rearm<E, X: Debug>(
        &mut self,
        has_more: bool,
        target: Option<E>,
        attach: impl FnOnce(E) -> Result<O, X>,
    ) -> bool {
        self.disarm();
        if !has_more {
            return false;
        }
        let Some(target) = target else {
            return false;
        };

        match attach(target) {
            Ok(observer) => {
                self.current = Some(observer);
                true
            }
            Err(e) => {
                tracing::error!(error = ?e, "failed to observe feed sentinel");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    /// Counts how many observers are connected at once.
    struct CountingObserver {
        live: Rc<Cell<usize>>,
    }

    impl CountingObserver {
        fn attach(live: &Rc<Cell<usize>>) -> Result<Self, String> {
            live.set(live.get() + 1);
            Ok(Self { live: live.clone() })
        }
    }

    impl Drop for CountingObserver {
        fn drop(&mut self) {
            self.live.set(self.live.get() - 1);
        }
    }

    #[test]
    fn test_rearm_keeps_a_single_observer() {
        let live = Rc::new(Cell::new(0));
        let mut slot = SentinelSlot::default();

        for target in ["card-3", "card-6", "card-6", "card-9"] {
            assert!(slot.rearm(true, Some(target), |_| CountingObserver::attach(&live)));
            assert_eq!(live.get(), 1);
        }
        assert!(slot.is_armed());
    }

    #[test]
    fn test_exhausted_feed_releases_observer() {
        let live = Rc::new(Cell::new(0));
        let mut slot = SentinelSlot::default();
        slot.rearm(true, Some("card-3"), |_| CountingObserver::attach(&live));
        assert_eq!(live.get(), 1);

        let attached = slot.rearm(false, Some("card-5"), |_| CountingObserver::attach(&live));

        assert!(!attached);
        assert!(!slot.is_armed());
        assert_eq!(live.get(), 0);
    }

    #[test]
    fn test_no_target_or_attach_failure_leaves_slot_empty() {
        let live = Rc::new(Cell::new(0));
        let mut slot = SentinelSlot::default();
        slot.rearm(true, Some("card-3"), |_| CountingObserver::attach(&live));

        assert!(!slot.rearm(true, None::<&str>, |_| CountingObserver::attach(&live)));
        assert_eq!(live.get(), 0);

        assert!(!slot.rearm(true, Some("card-3"), |_| {
            Err::<CountingObserver, _>("not supported".to_string())
        }));
        assert!(!slot.is_armed());
    }

    #[test]
    fn test_disarm_disconnects_on_teardown() {
        let live = Rc::new(Cell::new(0));
        let mut slot = SentinelSlot::default();
        slot.rearm(true, Some("card-3"), |_| CountingObserver::attach(&live));

        slot.disarm();

        assert_eq!(live.get(), 0);
        assert!(!slot.is_armed());
    }
}
