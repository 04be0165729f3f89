// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Errors for caller misuse.

use alloc::string::String;

/// Caller misuse rejected at the API boundary.
///
/// Nothing in this crate performs fallible I/O; every variant reports input
/// that violates a documented precondition.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum RevealError {
    /// The intersection threshold was not a finite ratio in `[0, 1]`.
    #[error("threshold {0} is not a finite ratio in [0, 1]")]
    InvalidThreshold(f64),
    /// A root margin string could not be parsed.
    #[error("invalid root margin {input:?}: {reason}")]
    InvalidRootMargin {
        /// The rejected input.
        input: String,
        /// What was wrong with it.
        reason: &'static str,
    },
    /// A stagger item was queried outside `[0, len)`.
    #[error("item index {index} is out of range for {len} items")]
    IndexOutOfRange {
        /// The requested index.
        index: usize,
        /// The number of items in the sequence.
        len: usize,
    },
}
