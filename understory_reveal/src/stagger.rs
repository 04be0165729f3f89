// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Staggered reveal of indexed items behind one visibility tracker.

use alloc::vec;
use alloc::vec::Vec;

use understory_timing::TimerId;

use crate::{
    IntersectionSource, MotionPreference, ObservationConfig, RevealError, TimerSource,
    Transition, VisibilityTracker,
};

/// Reveals `item_count` items one at a time once their shared region comes into view.
///
/// On the first time the internal tracker shows the region, item `i` is
/// scheduled to appear `i * delay_ms` milliseconds later. Revealed items stay
/// revealed until [`deactivate`](Self::deactivate), whatever the region does
/// afterwards, and a region that re-enters view never restarts the sequence.
///
/// Counts and delays are unsigned, so negative values cannot be expressed.
///
/// ```
/// use understory_reveal::{IntersectionSource, ObserveOptions, StaggerSequencer};
/// use understory_timing::TimerQueue;
///
/// struct Noop;
/// impl IntersectionSource<&'static str> for Noop {
///     fn subscribe(&mut self, _: &&'static str, _: &ObserveOptions) {}
///     fn unsubscribe(&mut self, _: &&'static str) {}
/// }
///
/// let mut cards = StaggerSequencer::new("features", 3, 100);
/// let mut timers = TimerQueue::new();
///
/// cards.activate(&false, &mut Noop, &mut timers);
/// cards.on_intersection(true, &mut timers);
///
/// timers.advance_to(150);
/// while let Some(fired) = timers.pop_due() {
///     cards.on_timer(fired.id, &mut timers);
/// }
/// assert_eq!(cards.is_item_visible(0), Ok(true));
/// assert_eq!(cards.is_item_visible(1), Ok(true));
/// assert_eq!(cards.is_item_visible(2), Ok(false));
/// assert!(cards.is_item_visible(3).is_err());
/// ```
#[derive(Clone, Debug)]
pub struct StaggerSequencer<R> {
    tracker: VisibilityTracker<R>,
    item_count: usize,
    delay_ms: u64,
    visible: Vec<bool>,
    revealed: usize,
    pending: Vec<(TimerId, usize)>,
}

impl<R> StaggerSequencer<R> {
    /// Creates an inactive sequencer observing `region` with the default
    /// [`ObservationConfig`].
    #[must_use]
    pub fn new(region: R, item_count: usize, delay_ms: u64) -> Self {
        let tracker = VisibilityTracker::with_valid_config(region, ObservationConfig::default());
        Self::from_tracker(tracker, item_count, delay_ms)
    }

    /// Creates an inactive sequencer whose tracker uses `config`.
    pub fn with_config(
        region: R,
        item_count: usize,
        delay_ms: u64,
        config: ObservationConfig,
    ) -> Result<Self, RevealError> {
        let tracker = VisibilityTracker::new(region, config)?;
        Ok(Self::from_tracker(tracker, item_count, delay_ms))
    }

    fn from_tracker(tracker: VisibilityTracker<R>, item_count: usize, delay_ms: u64) -> Self {
        Self {
            tracker,
            item_count,
            delay_ms,
            visible: vec![false; item_count],
            revealed: 0,
            pending: Vec::new(),
        }
    }

    /// Returns the tracker that gates the sequence.
    #[must_use]
    pub fn tracker(&self) -> &VisibilityTracker<R> {
        &self.tracker
    }

    /// Returns the number of items in the sequence.
    #[must_use]
    pub fn item_count(&self) -> usize {
        self.item_count
    }

    /// Returns the interval between consecutive reveals.
    #[must_use]
    pub fn delay_ms(&self) -> u64 {
        self.delay_ms
    }

    /// Returns whether item `index` has been revealed.
    ///
    /// Returns [`RevealError::IndexOutOfRange`] for `index >= item_count`.
    pub fn is_item_visible(&self, index: usize) -> Result<bool, RevealError> {
        self.visible
            .get(index)
            .copied()
            .ok_or(RevealError::IndexOutOfRange {
                index,
                len: self.item_count,
            })
    }

    /// Returns how many items have been revealed.
    #[must_use]
    pub fn visible_count(&self) -> usize {
        self.revealed
    }

    /// Returns the revealed indices in ascending order.
    pub fn visible_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.visible
            .iter()
            .enumerate()
            .filter_map(|(index, visible)| visible.then_some(index))
    }

    /// Returns `true` once every item has been revealed.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.revealed == self.item_count
    }

    /// Returns `true` if `id` belongs to this sequencer or its tracker.
    #[must_use]
    pub fn owns_timer(&self, id: TimerId) -> bool {
        self.tracker.owns_timer(id) || self.pending.iter().any(|(pending, _)| *pending == id)
    }

    /// Activates the internal tracker.
    ///
    /// With reduced motion preferred the tracker is visible immediately, so
    /// the reveal timers are scheduled right away.
    pub fn activate<M, S, T>(&mut self, motion: &M, source: &mut S, timers: &mut T)
    where
        M: MotionPreference + ?Sized,
        S: IntersectionSource<R> + ?Sized,
        T: TimerSource<R> + ?Sized,
    {
        let transition = self.tracker.activate(motion, source);
        self.follow(transition, timers);
    }

    /// Forwards an intersection notification to the internal tracker.
    pub fn on_intersection<T>(&mut self, is_intersecting: bool, timers: &mut T)
    where
        T: TimerSource<R> + ?Sized,
    {
        let transition = self.tracker.on_intersection(is_intersecting, timers);
        self.follow(transition, timers);
    }

    /// Delivers a fired timer.
    ///
    /// Returns `false` for ids owned by neither this sequencer nor its tracker.
    pub fn on_timer<T>(&mut self, id: TimerId, timers: &mut T) -> bool
    where
        T: TimerSource<R> + ?Sized,
    {
        if let Some(slot) = self.pending.iter().position(|(pending, _)| *pending == id) {
            let (_, index) = self.pending.remove(slot);
            if !self.visible[index] {
                self.visible[index] = true;
                self.revealed += 1;
                tracing::trace!(index, revealed = self.revealed, "item revealed");
            }
            return true;
        }
        if self.tracker.owns_timer(id) {
            let transition = self.tracker.on_timer(id);
            self.follow(transition, timers);
            return true;
        }
        false
    }

    /// Deactivates the tracker, cancels every unfired reveal and forgets which
    /// items were revealed.
    pub fn deactivate<S, T>(&mut self, source: &mut S, timers: &mut T)
    where
        S: IntersectionSource<R> + ?Sized,
        T: TimerSource<R> + ?Sized,
    {
        let cancelled = self.pending.len();
        for (id, _) in self.pending.drain(..) {
            timers.cancel(id);
        }
        self.tracker.deactivate(source, timers);
        self.visible.fill(false);
        self.revealed = 0;
        tracing::debug!(cancelled, "stagger stopped");
    }

    fn follow<T>(&mut self, transition: Option<Transition>, timers: &mut T)
    where
        T: TimerSource<R> + ?Sized,
    {
        if transition != Some(Transition::Shown) {
            return;
        }
        // Only the first reveal starts the sequence.
        if self.revealed > 0 || !self.pending.is_empty() {
            return;
        }
        let mut offset = 0_u64;
        for index in 0..self.item_count {
            let id = timers.schedule_once(self.tracker.region(), offset);
            self.pending.push((id, index));
            offset = offset.saturating_add(self.delay_ms);
        }
        tracing::debug!(
            items = self.item_count,
            delay_ms = self.delay_ms,
            "stagger started"
        );
    }
}
