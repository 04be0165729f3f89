// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Deadline-ordered one-shot timer storage.

use alloc::collections::BinaryHeap;
use core::cmp::Reverse;
use core::fmt;

use hashbrown::HashMap;

/// Opaque handle for a scheduled timer.
///
/// Handles are unique for the lifetime of the [`TimerQueue`] that minted them and
/// are never reused, so a stale handle can be cancelled safely.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

impl TimerId {
    /// Creates a handle from a raw value.
    ///
    /// This is intended for hosts that mint their own handles (for example a
    /// platform timer API) and need to hand them to code that speaks [`TimerId`].
    #[must_use]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw value of this handle.
    #[must_use]
    pub const fn to_raw(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TimerId").field(&self.0).finish()
    }
}

/// A timer popped from the queue once its deadline was reached.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Fired<T> {
    /// Handle returned when the timer was scheduled.
    pub id: TimerId,
    /// Absolute deadline in queue milliseconds.
    pub deadline: u64,
    /// Payload supplied when the timer was scheduled.
    pub payload: T,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
struct Slot {
    deadline: u64,
    id: TimerId,
}

/// One-shot timers against a host-driven millisecond clock.
///
/// The clock starts at `0` and only moves forward through [`advance_to`] or
/// [`advance_by`]. A timer is due once `deadline <= now`. Due timers are yielded
/// in deadline order; timers sharing a deadline are yielded in the order they were
/// scheduled.
///
/// Cancellation is O(1): the payload is dropped immediately and the heap slot is
/// discarded lazily when it reaches the front.
///
/// [`advance_to`]: TimerQueue::advance_to
/// [`advance_by`]: TimerQueue::advance_by
#[derive(Clone, Debug)]
pub struct TimerQueue<T> {
    now: u64,
    next_id: u64,
    heap: BinaryHeap<Reverse<Slot>>,
    live: HashMap<TimerId, T>,
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> TimerQueue<T> {
    /// Creates an empty queue with the clock at `0`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            now: 0,
            next_id: 0,
            heap: BinaryHeap::new(),
            live: HashMap::new(),
        }
    }

    /// Returns the current clock value in milliseconds.
    #[must_use]
    pub fn now(&self) -> u64 {
        self.now
    }

    /// Moves the clock to `now`.
    ///
    /// The clock is monotonic: a value earlier than the current time is ignored.
    pub fn advance_to(&mut self, now: u64) {
        if now > self.now {
            self.now = now;
        }
    }

    /// Moves the clock forward by `ms` milliseconds, saturating at `u64::MAX`.
    pub fn advance_by(&mut self, ms: u64) {
        self.now = self.now.saturating_add(ms);
    }

    /// Schedules `payload` to fire `delay_ms` milliseconds from now.
    ///
    /// A zero delay makes the timer due on the next [`pop_due`](Self::pop_due).
    pub fn schedule(&mut self, delay_ms: u64, payload: T) -> TimerId {
        self.schedule_at(self.now.saturating_add(delay_ms), payload)
    }

    /// Schedules `payload` to fire at the absolute clock value `deadline`.
    ///
    /// Deadlines in the past are due immediately.
    pub fn schedule_at(&mut self, deadline: u64, payload: T) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.heap.push(Reverse(Slot { deadline, id }));
        self.live.insert(id, payload);
        id
    }

    /// Cancels a pending timer, returning its payload.
    ///
    /// Returns `None` if the timer already fired, was already cancelled, or was
    /// never scheduled on this queue.
    pub fn cancel(&mut self, id: TimerId) -> Option<T> {
        let payload = self.live.remove(&id)?;
        self.compact();
        Some(payload)
    }

    /// Returns `true` if `id` is scheduled and has not fired or been cancelled.
    #[must_use]
    pub fn is_pending(&self, id: TimerId) -> bool {
        self.live.contains_key(&id)
    }

    /// Returns the number of pending timers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.live.len()
    }

    /// Returns `true` if no timers are pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    /// Cancels every pending timer. The clock is left untouched.
    pub fn clear(&mut self) {
        self.heap.clear();
        self.live.clear();
    }

    /// Returns the earliest pending deadline, if any.
    ///
    /// Hosts can use this to sleep until the next timer is due. Cancelled
    /// entries at the front of the queue are dropped along the way.
    #[must_use]
    pub fn next_deadline(&mut self) -> Option<u64> {
        while let Some(&Reverse(slot)) = self.heap.peek() {
            if self.live.contains_key(&slot.id) {
                return Some(slot.deadline);
            }
            self.heap.pop();
        }
        None
    }

    /// Pops the next due timer, if any.
    ///
    /// Timers scheduled between calls are considered, so a loop over `pop_due`
    /// also yields zero-delay timers scheduled by earlier payload handlers.
    pub fn pop_due(&mut self) -> Option<Fired<T>> {
        while let Some(&Reverse(slot)) = self.heap.peek() {
            if slot.deadline > self.now {
                return None;
            }
            self.heap.pop();
            if let Some(payload) = self.live.remove(&slot.id) {
                return Some(Fired {
                    id: slot.id,
                    deadline: slot.deadline,
                    payload,
                });
            }
        }
        None
    }

    /// Returns an iterator that pops every timer due at the current clock value.
    ///
    /// The iterator borrows the queue mutably; use a [`pop_due`](Self::pop_due)
    /// loop when handlers need to schedule new timers while draining.
    pub fn drain_due(&mut self) -> DrainDue<'_, T> {
        DrainDue { queue: self }
    }

    // Drop cancelled slots once they dominate the heap.
    fn compact(&mut self) {
        if self.heap.len() > 2 * self.live.len() + 32 {
            let live = &self.live;
            self.heap.retain(|Reverse(slot)| live.contains_key(&slot.id));
        }
    }
}

/// Iterator returned by [`TimerQueue::drain_due`].
#[derive(Debug)]
pub struct DrainDue<'a, T> {
    queue: &'a mut TimerQueue<T>,
}

impl<T> Iterator for DrainDue<'_, T> {
    type Item = Fired<T>;

    fn next(&mut self) -> Option<Self::Item> {
        self.queue.pop_due()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    #[test]
    fn new_queue_is_empty_at_zero() {
        let mut q = TimerQueue::<u8>::new();
        assert!(q.is_empty());
        assert_eq!(q.now(), 0);
        assert_eq!(q.next_deadline(), None);
        assert!(q.pop_due().is_none());
    }

    #[test]
    fn timer_is_not_due_before_deadline() {
        let mut q = TimerQueue::new();
        q.schedule(100, 'a');

        q.advance_to(99);
        assert!(q.pop_due().is_none(), "timer must not fire one ms early");

        q.advance_to(100);
        let fired = q.pop_due().unwrap();
        assert_eq!(fired.payload, 'a');
        assert_eq!(fired.deadline, 100);
        assert!(q.is_empty());
    }

    #[test]
    fn equal_deadlines_fire_in_schedule_order() {
        let mut q = TimerQueue::new();
        q.schedule(10, 1);
        q.schedule(10, 2);
        q.schedule(5, 0);
        q.schedule(10, 3);

        q.advance_to(10);
        let order: Vec<_> = q.drain_due().map(|f| f.payload).collect();
        assert_eq!(order, [0, 1, 2, 3]);
    }

    #[test]
    fn cancel_returns_payload_once() {
        let mut q = TimerQueue::new();
        let id = q.schedule(10, "x");

        assert_eq!(q.cancel(id), Some("x"));
        assert_eq!(q.cancel(id), None);
        assert!(!q.is_pending(id));

        q.advance_to(50);
        assert!(q.pop_due().is_none());
    }

    #[test]
    fn cancelled_head_is_skipped_by_next_deadline() {
        let mut q = TimerQueue::new();
        let early = q.schedule(5, ());
        q.schedule(20, ());

        q.cancel(early);
        assert_eq!(q.next_deadline(), Some(20));
    }

    #[test]
    fn clock_never_moves_backwards() {
        let mut q = TimerQueue::<()>::new();
        q.advance_to(40);
        q.advance_to(10);
        assert_eq!(q.now(), 40);

        q.advance_by(u64::MAX);
        assert_eq!(q.now(), u64::MAX);
    }

    #[test]
    fn delay_is_relative_to_current_clock() {
        let mut q = TimerQueue::new();
        q.advance_to(1_000);
        q.schedule(250, ());
        assert_eq!(q.next_deadline(), Some(1_250));
    }

    #[test]
    fn past_deadline_is_due_immediately() {
        let mut q = TimerQueue::new();
        q.advance_to(500);
        q.schedule_at(100, 'p');
        assert_eq!(q.pop_due().map(|f| f.payload), Some('p'));
    }

    #[test]
    fn ids_are_not_reused_after_firing() {
        let mut q = TimerQueue::new();
        let a = q.schedule(0, ());
        q.pop_due();
        let b = q.schedule(0, ());
        assert_ne!(a, b);
        assert!(q.cancel(a).is_none());
        assert!(q.is_pending(b));
    }

    #[test]
    fn heavy_cancellation_compacts_heap() {
        let mut q = TimerQueue::new();
        let ids: Vec<_> = (0..200).map(|i| q.schedule(1_000 + i, i)).collect();
        for id in &ids[..190] {
            q.cancel(*id);
        }
        assert_eq!(q.len(), 10);
        assert!(q.heap.len() <= 2 * q.len() + 32);
        assert_eq!(q.next_deadline(), Some(1_190));
    }
}
