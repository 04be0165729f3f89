// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_reveal --heading-base-level=0

//! Understory Reveal: scroll-triggered visibility and staggered reveal state machines.
//!
//! Content that animates in as it scrolls into view needs two small pieces of
//! state: whether a region has been seen, and which of its children have been
//! revealed so far. This crate provides both as host-agnostic state machines:
//!
//! - [`VisibilityTracker`]: derives an "in view" flag for one region from
//!   intersection notifications, honoring a reduced-motion bypass, an optional
//!   reveal delay, and a trigger-once latch.
//! - [`StaggerSequencer`]: reveals `N` indexed items at a fixed interval once its
//!   tracker first shows the region.
//!
//! The crate does not observe anything itself. Hosts plug in three collaborators:
//!
//! - [`IntersectionSource`]: subscribe/unsubscribe a region with [`ObserveOptions`];
//!   the host forwards each notification to `on_intersection`.
//! - [`TimerSource`]: schedule/cancel one-shot timers; the host forwards each fired
//!   [`TimerId`] to `on_timer`. [`understory_timing::TimerQueue`] implements it.
//! - [`MotionPreference`]: the reduced-motion preference, read once on activation.
//!
//! ## Minimal example
//!
//! ```rust
//! use understory_reveal::{
//!     IntersectionSource, ObservationConfig, ObserveOptions, VisibilityTracker,
//! };
//! use understory_timing::TimerQueue;
//!
//! #[derive(Default)]
//! struct Observer {
//!     observed: Vec<u32>,
//! }
//!
//! impl IntersectionSource<u32> for Observer {
//!     fn subscribe(&mut self, region: &u32, _: &ObserveOptions) {
//!         self.observed.push(*region);
//!     }
//!     fn unsubscribe(&mut self, region: &u32) {
//!         self.observed.retain(|r| r != region);
//!     }
//! }
//!
//! let mut observer = Observer::default();
//! let mut timers = TimerQueue::new();
//! let config = ObservationConfig::default().with_trigger_once(false);
//! let mut hero = VisibilityTracker::new(1, config).unwrap();
//!
//! hero.activate(&false, &mut observer);
//! assert_eq!(observer.observed, [1]);
//!
//! hero.on_intersection(true, &mut timers);
//! assert!(hero.is_in_view());
//! hero.on_intersection(false, &mut timers);
//! assert!(!hero.is_in_view());
//!
//! hero.deactivate(&mut observer, &mut timers);
//! assert!(observer.observed.is_empty());
//! ```
//!
//! ## Threading
//!
//! Everything here is single-threaded and callback-free. All mutation happens
//! inside the `activate`, `on_intersection`, `on_timer` and `deactivate` calls
//! the host makes from its event loop; the read accessors never block.
//!
//! ## Logging
//!
//! Lifecycle changes are reported through [`tracing`] at `debug` level and
//! individual transitions at `trace` level. No subscriber is installed.
//!
//! ## Features
//!
//! - `std` (default): forwards `std` to dependencies.
//! - `kurbo` (default): enables [`RootMargin::resolve`] against a `kurbo::Rect`.
//! - `libm`: `no_std` float math for `kurbo`.
//! - `serde`: `Serialize`/`Deserialize` for [`ObservationConfig`], [`RootMargin`],
//!   [`StaleDelay`] and [`TrackerState`].
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod config;
mod error;
mod margin;
mod source;
mod stagger;
mod tracker;

pub use config::{ObservationConfig, ObserveOptions, StaleDelay};
pub use error::RevealError;
pub use margin::{MarginLength, RootMargin};
pub use source::{
    FromFn, IntersectionSource, MotionPreference, SharedMotionPreference, TimerSource,
    motion_preference_fn,
};
pub use stagger::StaggerSequencer;
pub use tracker::{TrackerState, Transition, VisibilityTracker};
pub use understory_timing::TimerId;
