// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Host collaborators: intersection notifications, timers, and motion preference.
//!
//! The state machines in this crate never call back into the host on their own.
//! They subscribe and schedule through these traits, and the host feeds results
//! back in through `on_intersection` and `on_timer`.

use alloc::rc::Rc;
use core::cell::Cell;
use core::fmt;

use understory_timing::{TimerId, TimerQueue};

use crate::ObserveOptions;

/// Viewport-intersection notifications for host regions.
///
/// `R` is the host's key for an observed region. After `subscribe`, the host
/// reports each change by calling `on_intersection` on the owning tracker, in
/// the order its observation mechanism emits them.
pub trait IntersectionSource<R> {
    /// Starts observing `region` with the given options.
    fn subscribe(&mut self, region: &R, options: &ObserveOptions);

    /// Stops observing `region`.
    fn unsubscribe(&mut self, region: &R);
}

/// One-shot cancellable timers.
///
/// When a scheduled timer fires, the host delivers its id to the owner's
/// `on_timer`. `owner` lets hosts that share one timer source across many
/// trackers route the id back.
pub trait TimerSource<R> {
    /// Schedules a timer `delay_ms` milliseconds from now.
    fn schedule_once(&mut self, owner: &R, delay_ms: u64) -> TimerId;

    /// Cancels a pending timer. Cancelling a fired or unknown id is a no-op.
    fn cancel(&mut self, id: TimerId);
}

impl<R: Clone> TimerSource<R> for TimerQueue<R> {
    fn schedule_once(&mut self, owner: &R, delay_ms: u64) -> TimerId {
        self.schedule(delay_ms, owner.clone())
    }

    fn cancel(&mut self, id: TimerId) {
        Self::cancel(self, id);
    }
}

/// Point-in-time read of the user's reduced-motion preference.
///
/// Trackers read this once, on activation.
pub trait MotionPreference {
    /// Returns `true` if animation should be minimized or skipped.
    fn prefers_reduced_motion(&self) -> bool;
}

impl MotionPreference for bool {
    fn prefers_reduced_motion(&self) -> bool {
        *self
    }
}

impl<P: MotionPreference + ?Sized> MotionPreference for &P {
    fn prefers_reduced_motion(&self) -> bool {
        (**self).prefers_reduced_motion()
    }
}

/// A reduced-motion flag shared between a preference listener and trackers.
///
/// Clones share the same flag. The listener calls [`set`](Self::set) when the
/// platform preference changes; trackers activated afterwards observe the new
/// value, trackers already active are unaffected.
#[derive(Clone, Debug, Default)]
pub struct SharedMotionPreference(Rc<Cell<bool>>);

impl SharedMotionPreference {
    /// Creates a flag with the given initial value.
    #[must_use]
    pub fn new(reduced: bool) -> Self {
        Self(Rc::new(Cell::new(reduced)))
    }

    /// Updates the preference.
    pub fn set(&self, reduced: bool) {
        self.0.set(reduced);
    }

    /// Returns the current preference.
    #[must_use]
    pub fn get(&self) -> bool {
        self.0.get()
    }
}

impl MotionPreference for SharedMotionPreference {
    fn prefers_reduced_motion(&self) -> bool {
        self.get()
    }
}

/// A [`MotionPreference`] backed by a closure. See [`motion_preference_fn`].
#[derive(Clone, Copy)]
pub struct FromFn<F>(F);

impl<F> fmt::Debug for FromFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FromFn").finish_non_exhaustive()
    }
}

impl<F: Fn() -> bool> MotionPreference for FromFn<F> {
    fn prefers_reduced_motion(&self) -> bool {
        (self.0)()
    }
}

/// Wraps a closure that queries the platform preference.
///
/// ```
/// use understory_reveal::{MotionPreference, motion_preference_fn};
///
/// let pref = motion_preference_fn(|| true);
/// assert!(pref.prefers_reduced_motion());
/// ```
pub fn motion_preference_fn<F: Fn() -> bool>(f: F) -> FromFn<F> {
    FromFn(f)
}
