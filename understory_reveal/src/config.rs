// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Observation configuration.

use crate::{RevealError, RootMargin};

/// What happens to a pending delayed reveal when the region leaves view first.
///
/// Only meaningful for trackers that are not `trigger_once`; a latched tracker
/// never hides again.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum StaleDelay {
    /// Let the timer fire anyway: the region reads as in view even though it
    /// already left.
    #[default]
    Fire,
    /// Cancel every pending delayed reveal on each exit event.
    CancelOnExit,
}

/// Options handed to an [`IntersectionSource`](crate::IntersectionSource) on subscribe.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ObserveOptions {
    /// Fraction of the region that must be visible to count as intersecting.
    pub threshold: f64,
    /// Margin applied to the root before intersections are computed.
    pub root_margin: RootMargin,
}

/// Per-tracker observation settings.
///
/// A tracker copies its configuration at construction; changing any setting
/// means building a new tracker and re-activating it.
///
/// ```
/// use understory_reveal::{ObservationConfig, StaleDelay};
///
/// let config = ObservationConfig::default()
///     .with_threshold(0.25)
///     .with_root_margin("0px 0px -80px".parse().unwrap())
///     .with_trigger_once(false)
///     .with_delay_ms(150)
///     .with_stale_delay(StaleDelay::CancelOnExit);
/// assert!(config.validate().is_ok());
///
/// assert!(ObservationConfig::default().with_threshold(1.5).validate().is_err());
/// ```
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct ObservationConfig {
    /// Fraction of the region, in `[0, 1]`, that must be visible.
    pub threshold: f64,
    /// Margin applied to the intersection root.
    pub root_margin: RootMargin,
    /// Latch the first reveal so later exits never hide the region again.
    pub trigger_once: bool,
    /// Delay between an intersecting notification and the reveal.
    pub delay_ms: u64,
    /// Policy for delayed reveals that outlive the intersection.
    pub stale_delay: StaleDelay,
}

impl ObservationConfig {
    /// Threshold used by [`ObservationConfig::default`].
    pub const DEFAULT_THRESHOLD: f64 = 0.1;

    /// Returns this configuration with `threshold` replaced.
    #[must_use]
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Returns this configuration with `root_margin` replaced.
    #[must_use]
    pub fn with_root_margin(mut self, root_margin: RootMargin) -> Self {
        self.root_margin = root_margin;
        self
    }

    /// Returns this configuration with `trigger_once` replaced.
    #[must_use]
    pub fn with_trigger_once(mut self, trigger_once: bool) -> Self {
        self.trigger_once = trigger_once;
        self
    }

    /// Returns this configuration with `delay_ms` replaced.
    #[must_use]
    pub fn with_delay_ms(mut self, delay_ms: u64) -> Self {
        self.delay_ms = delay_ms;
        self
    }

    /// Returns this configuration with `stale_delay` replaced.
    #[must_use]
    pub fn with_stale_delay(mut self, stale_delay: StaleDelay) -> Self {
        self.stale_delay = stale_delay;
        self
    }

    /// Checks the preconditions a tracker relies on.
    ///
    /// Delays are unsigned, so the only checked value is the threshold, which
    /// must be finite and in `[0, 1]`.
    pub fn validate(&self) -> Result<(), RevealError> {
        if self.threshold.is_finite() && (0.0..=1.0).contains(&self.threshold) {
            Ok(())
        } else {
            Err(RevealError::InvalidThreshold(self.threshold))
        }
    }

    /// The subset of settings an intersection source needs.
    #[must_use]
    pub fn observe_options(&self) -> ObserveOptions {
        ObserveOptions {
            threshold: self.threshold,
            root_margin: self.root_margin,
        }
    }
}

impl Default for ObservationConfig {
    fn default() -> Self {
        Self {
            threshold: Self::DEFAULT_THRESHOLD,
            root_margin: RootMargin::ZERO,
            trigger_once: true,
            delay_ms: 0,
            stale_delay: StaleDelay::Fire,
        }
    }
}
