// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_timing --heading-base-level=0

//! Understory Timing: host-agnostic timer queue primitives for UI runtimes.
//!
//! UI state machines often need "do this in 300ms" without owning an event loop.
//! This crate provides a small [`TimerQueue`] that stores one-shot timers against a
//! host-driven monotonic clock. The queue never reads a system clock and never
//! sleeps; the host decides what "now" is and asks for the timers that are due.
//!
//! The core concepts are:
//!
//! - [`TimerId`]: an opaque, cancellable handle returned when a timer is scheduled.
//! - [`TimerQueue`]: deadline-ordered storage with a millisecond clock that only
//!   moves forward. Ties fire in scheduling order.
//! - [`Fired`]: a due timer popped from the queue, carrying its payload.
//!
//! ## Minimal example
//!
//! ```rust
//! use understory_timing::TimerQueue;
//!
//! let mut timers = TimerQueue::new();
//! let a = timers.schedule(100, "fade");
//! let b = timers.schedule(50, "slide");
//! timers.cancel(a);
//!
//! timers.advance_to(120);
//! let fired: Vec<_> = timers.drain_due().map(|f| f.payload).collect();
//! assert_eq!(fired, vec!["slide"]);
//! assert!(!timers.is_pending(b));
//! ```
//!
//! ## Host integration
//!
//! A host typically stores whatever it needs to route a timer back to its owner
//! in the payload (a widget id, a region key) and pumps the queue once per frame:
//!
//! ```rust
//! use understory_timing::TimerQueue;
//!
//! let mut timers = TimerQueue::<u32>::new();
//! timers.schedule(16, 7);
//!
//! let frame_time = 16;
//! timers.advance_to(frame_time);
//! while let Some(fired) = timers.pop_due() {
//!     // Owners may schedule follow-up timers here; `pop_due` picks them up
//!     // on the same pass if they are already due.
//!     assert_eq!(fired.payload, 7);
//! }
//! assert_eq!(timers.next_deadline(), None);
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod queue;

pub use queue::{DrainDue, Fired, TimerId, TimerQueue};
