// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scroll-triggered visibility for a single region.

use smallvec::SmallVec;
use understory_timing::TimerId;

use crate::{
    IntersectionSource, MotionPreference, ObservationConfig, RevealError, StaleDelay,
    TimerSource,
};

/// Visibility flags exposed to the rendering layer.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrackerState {
    /// Whether the region currently reads as in view.
    pub is_in_view: bool,
    /// One-way latch set by the first reveal of a `trigger_once` tracker.
    pub has_triggered: bool,
}

/// A change of [`TrackerState::is_in_view`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Transition {
    /// The region became visible.
    Shown,
    /// The region stopped being visible.
    Hidden,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
enum Phase {
    #[default]
    Idle,
    Observing,
    // Reduced motion: visible without observing.
    Bypassed,
}

/// Tracks whether one region is in view.
///
/// ## Usage
///
/// 1) Build a [`VisibilityTracker`] for a region key with an [`ObservationConfig`].
/// 2) Call [`VisibilityTracker::activate`] when the region mounts. This reads the
///    reduced-motion preference once and subscribes to intersection notifications.
/// 3) Forward each notification to [`VisibilityTracker::on_intersection`] and each
///    fired timer to [`VisibilityTracker::on_timer`].
/// 4) Read [`VisibilityTracker::is_in_view`] while rendering.
/// 5) Call [`VisibilityTracker::deactivate`] when the region unmounts.
///
/// ## Transitions
///
/// | notification | `delay_ms` | `trigger_once` | effect |
/// |---|---|---|---|
/// | intersecting | `0` | any | shown now, latched if `trigger_once` |
/// | intersecting | `> 0` | any | reveal timer scheduled |
/// | not intersecting | any | `true` | none |
/// | not intersecting | any | `false` | hidden now |
///
/// Reveal timers are not deduplicated: each intersecting notification schedules
/// its own. See [`StaleDelay`] for what happens when one outlives the intersection.
///
/// ```
/// use understory_reveal::{
///     IntersectionSource, ObservationConfig, ObserveOptions, VisibilityTracker,
/// };
/// use understory_timing::TimerQueue;
///
/// struct Noop;
/// impl IntersectionSource<u32> for Noop {
///     fn subscribe(&mut self, _: &u32, _: &ObserveOptions) {}
///     fn unsubscribe(&mut self, _: &u32) {}
/// }
///
/// let config = ObservationConfig::default().with_delay_ms(200);
/// let mut tracker = VisibilityTracker::new(7_u32, config).unwrap();
/// let mut timers = TimerQueue::new();
///
/// tracker.activate(&false, &mut Noop);
/// tracker.on_intersection(true, &mut timers);
/// assert!(!tracker.is_in_view());
///
/// timers.advance_to(200);
/// while let Some(fired) = timers.pop_due() {
///     tracker.on_timer(fired.id);
/// }
/// assert!(tracker.is_in_view());
/// assert!(tracker.has_triggered());
/// ```
#[derive(Clone, Debug)]
pub struct VisibilityTracker<R> {
    region: R,
    config: ObservationConfig,
    phase: Phase,
    state: TrackerState,
    pending: SmallVec<[TimerId; 2]>,
}

impl<R> VisibilityTracker<R> {
    /// Creates an inactive tracker for `region`.
    ///
    /// Returns [`RevealError::InvalidThreshold`] if `config` fails
    /// [`ObservationConfig::validate`].
    pub fn new(region: R, config: ObservationConfig) -> Result<Self, RevealError> {
        config.validate()?;
        Ok(Self::with_valid_config(region, config))
    }

    pub(crate) fn with_valid_config(region: R, config: ObservationConfig) -> Self {
        Self {
            region,
            config,
            phase: Phase::Idle,
            state: TrackerState::default(),
            pending: SmallVec::new(),
        }
    }

    /// Returns the region key.
    #[must_use]
    pub fn region(&self) -> &R {
        &self.region
    }

    /// Returns the configuration this tracker was built with.
    #[must_use]
    pub fn config(&self) -> &ObservationConfig {
        &self.config
    }

    /// Returns `true` if the region currently reads as in view.
    #[must_use]
    pub fn is_in_view(&self) -> bool {
        self.state.is_in_view
    }

    /// Returns `true` once a `trigger_once` tracker has latched.
    #[must_use]
    pub fn has_triggered(&self) -> bool {
        self.state.has_triggered
    }

    /// Returns a copy of the current flags.
    #[must_use]
    pub fn state(&self) -> TrackerState {
        self.state
    }

    /// Returns `true` between [`activate`](Self::activate) and [`deactivate`](Self::deactivate).
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.phase != Phase::Idle
    }

    /// Returns `true` if activation found reduced motion preferred and skipped
    /// observation.
    #[must_use]
    pub fn is_bypassed(&self) -> bool {
        self.phase == Phase::Bypassed
    }

    /// Returns the reveal timers scheduled but not yet delivered.
    #[must_use]
    pub fn pending_timers(&self) -> &[TimerId] {
        &self.pending
    }

    /// Returns `true` if `id` is one of this tracker's pending reveal timers.
    #[must_use]
    pub fn owns_timer(&self, id: TimerId) -> bool {
        self.pending.contains(&id)
    }

    /// Starts observing the region.
    ///
    /// The reduced-motion preference is read here and nowhere else. When it is
    /// set, the region is shown immediately and `source` is never subscribed.
    /// Activating an active tracker does nothing.
    pub fn activate<M, S>(&mut self, motion: &M, source: &mut S) -> Option<Transition>
    where
        M: MotionPreference + ?Sized,
        S: IntersectionSource<R> + ?Sized,
    {
        if self.phase != Phase::Idle {
            return None;
        }
        if motion.prefers_reduced_motion() {
            self.phase = Phase::Bypassed;
            tracing::debug!("reduced motion preferred, revealing without observation");
            return self.show();
        }
        source.subscribe(&self.region, &self.config.observe_options());
        self.phase = Phase::Observing;
        tracing::debug!(
            threshold = self.config.threshold,
            trigger_once = self.config.trigger_once,
            delay_ms = self.config.delay_ms,
            "observing region"
        );
        None
    }

    /// Applies one intersection notification.
    ///
    /// Ignored unless the tracker is observing.
    pub fn on_intersection<T>(&mut self, is_intersecting: bool, timers: &mut T) -> Option<Transition>
    where
        T: TimerSource<R> + ?Sized,
    {
        if self.phase != Phase::Observing {
            return None;
        }

        if is_intersecting {
            if self.is_latched() {
                return None;
            }
            if self.config.delay_ms == 0 {
                return self.show();
            }
            let id = timers.schedule_once(&self.region, self.config.delay_ms);
            self.pending.push(id);
            tracing::trace!(
                delay_ms = self.config.delay_ms,
                pending = self.pending.len(),
                "reveal scheduled"
            );
            return None;
        }

        if self.config.stale_delay == StaleDelay::CancelOnExit {
            self.cancel_pending(timers);
        }
        if self.config.trigger_once {
            return None;
        }
        self.hide()
    }

    /// Delivers a fired timer.
    ///
    /// Returns `None` for ids this tracker does not own, so hosts may offer
    /// every fired id to every tracker.
    pub fn on_timer(&mut self, id: TimerId) -> Option<Transition> {
        let index = self.pending.iter().position(|pending| *pending == id)?;
        self.pending.swap_remove(index);
        self.show()
    }

    /// Stops observing, cancels pending reveal timers and discards state.
    pub fn deactivate<S, T>(&mut self, source: &mut S, timers: &mut T)
    where
        S: IntersectionSource<R> + ?Sized,
        T: TimerSource<R> + ?Sized,
    {
        match self.phase {
            Phase::Idle => return,
            Phase::Observing => source.unsubscribe(&self.region),
            Phase::Bypassed => {}
        }
        let cancelled = self.pending.len();
        self.cancel_pending(timers);
        self.phase = Phase::Idle;
        self.state = TrackerState::default();
        tracing::debug!(cancelled, "stopped observing region");
    }

    fn is_latched(&self) -> bool {
        self.config.trigger_once && self.state.has_triggered
    }

    fn show(&mut self) -> Option<Transition> {
        if self.config.trigger_once {
            self.state.has_triggered = true;
        }
        if self.state.is_in_view {
            return None;
        }
        self.state.is_in_view = true;
        tracing::trace!("region shown");
        Some(Transition::Shown)
    }

    fn hide(&mut self) -> Option<Transition> {
        if !self.state.is_in_view {
            return None;
        }
        self.state.is_in_view = false;
        tracing::trace!("region hidden");
        Some(Transition::Hidden)
    }

    fn cancel_pending<T>(&mut self, timers: &mut T)
    where
        T: TimerSource<R> + ?Sized,
    {
        for id in self.pending.drain(..) {
            timers.cancel(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ObserveOptions;
    use understory_timing::TimerQueue;

    #[derive(Default)]
    struct Source {
        subscribed: u32,
        unsubscribed: u32,
    }

    impl IntersectionSource<u8> for Source {
        fn subscribe(&mut self, _: &u8, _: &ObserveOptions) {
            self.subscribed += 1;
        }

        fn unsubscribe(&mut self, _: &u8) {
            self.unsubscribed += 1;
        }
    }

    fn tracker(config: ObservationConfig) -> VisibilityTracker<u8> {
        VisibilityTracker::new(0, config).unwrap()
    }

    fn pump(queue: &mut TimerQueue<u8>, now: u64, tracker: &mut VisibilityTracker<u8>) {
        queue.advance_to(now);
        while let Some(fired) = queue.pop_due() {
            tracker.on_timer(fired.id);
        }
    }

    #[test]
    fn new_rejects_invalid_threshold() {
        let err = VisibilityTracker::new(0_u8, ObservationConfig::default().with_threshold(2.0))
            .unwrap_err();
        assert_eq!(err, RevealError::InvalidThreshold(2.0));
    }

    #[test]
    fn inactive_tracker_ignores_events() {
        let mut t = tracker(ObservationConfig::default());
        let mut timers = TimerQueue::new();
        assert_eq!(t.on_intersection(true, &mut timers), None);
        assert!(!t.is_in_view());
        assert!(!t.is_active());
    }

    #[test]
    fn immediate_show_latches_when_trigger_once() {
        let mut t = tracker(ObservationConfig::default());
        let mut source = Source::default();
        let mut timers = TimerQueue::new();

        t.activate(&false, &mut source);
        assert_eq!(source.subscribed, 1);
        assert_eq!(t.on_intersection(true, &mut timers), Some(Transition::Shown));
        assert!(t.has_triggered());

        assert_eq!(t.on_intersection(false, &mut timers), None);
        assert!(t.is_in_view());
    }

    #[test]
    fn latched_tracker_schedules_nothing() {
        let config = ObservationConfig::default().with_delay_ms(50);
        let mut t = tracker(config);
        let mut timers = TimerQueue::new();
        t.activate(&false, &mut Source::default());

        t.on_intersection(true, &mut timers);
        pump(&mut timers, 50, &mut t);
        assert!(t.has_triggered());

        t.on_intersection(false, &mut timers);
        t.on_intersection(true, &mut timers);
        assert!(timers.is_empty());
        assert!(t.pending_timers().is_empty());
    }

    #[test]
    fn rapid_enters_are_not_deduplicated() {
        let config = ObservationConfig::default().with_delay_ms(100);
        let mut t = tracker(config);
        let mut timers = TimerQueue::new();
        t.activate(&false, &mut Source::default());

        t.on_intersection(true, &mut timers);
        t.on_intersection(true, &mut timers);
        assert_eq!(t.pending_timers().len(), 2);
        assert_eq!(timers.len(), 2);
    }

    #[test]
    fn foreign_timer_is_ignored() {
        let config = ObservationConfig::default().with_delay_ms(10);
        let mut t = tracker(config);
        let mut timers = TimerQueue::new();
        t.activate(&false, &mut Source::default());
        t.on_intersection(true, &mut timers);

        let other = timers.schedule(0, 9);
        assert!(!t.owns_timer(other));
        assert_eq!(t.on_timer(other), None);
        assert!(!t.is_in_view());
    }

    #[test]
    fn double_activate_subscribes_once() {
        let mut t = tracker(ObservationConfig::default());
        let mut source = Source::default();
        t.activate(&false, &mut source);
        t.activate(&false, &mut source);
        assert_eq!(source.subscribed, 1);
    }

    #[test]
    fn deactivate_resets_state_and_allows_reactivation() {
        let mut t = tracker(ObservationConfig::default());
        let mut source = Source::default();
        let mut timers = TimerQueue::new();

        t.activate(&false, &mut source);
        t.on_intersection(true, &mut timers);
        t.deactivate(&mut source, &mut timers);
        assert_eq!(source.unsubscribed, 1);
        assert_eq!(t.state(), TrackerState::default());

        t.activate(&false, &mut source);
        assert_eq!(source.subscribed, 2);
        assert!(!t.is_in_view());
    }

    #[test]
    fn deactivate_when_idle_does_nothing() {
        let mut t = tracker(ObservationConfig::default());
        let mut source = Source::default();
        t.deactivate(&mut source, &mut TimerQueue::new());
        assert_eq!(source.unsubscribed, 0);
    }

    #[test]
    fn bypassed_tracker_never_unsubscribes() {
        let mut t = tracker(ObservationConfig::default());
        let mut source = Source::default();
        let mut timers = TimerQueue::new();

        assert_eq!(t.activate(&true, &mut source), Some(Transition::Shown));
        assert!(t.is_bypassed());
        assert_eq!(t.on_intersection(false, &mut timers), None);
        assert!(t.is_in_view());

        t.deactivate(&mut source, &mut timers);
        assert_eq!(source.subscribed, 0);
        assert_eq!(source.unsubscribed, 0);
    }
}
