// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! CSS-style root margins.

use alloc::string::{String, ToString};
use core::fmt;
use core::str::FromStr;

use crate::RevealError;

/// One side of a [`RootMargin`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum MarginLength {
    /// An absolute length in logical pixels.
    Px(f64),
    /// A percentage of the root's extent along the same axis.
    Percent(f64),
}

impl MarginLength {
    /// Resolves this length against `basis`, the root extent along the same axis.
    #[must_use]
    pub fn resolve(self, basis: f64) -> f64 {
        match self {
            Self::Px(px) => px,
            Self::Percent(pct) => basis * pct / 100.0,
        }
    }
}

impl Default for MarginLength {
    fn default() -> Self {
        Self::Px(0.0)
    }
}

impl fmt::Display for MarginLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Px(px) => write!(f, "{px}px"),
            Self::Percent(pct) => write!(f, "{pct}%"),
        }
    }
}

/// Grows (or, with negative lengths, shrinks) the intersection root before
/// intersections are computed.
///
/// Parsed from the same syntax as CSS `margin`: one to four lengths in
/// `top right bottom left` order, where missing sides mirror their opposite.
/// Each length is `<number>px`, `<number>%`, or a bare `0`.
///
/// ```
/// use understory_reveal::{MarginLength, RootMargin};
///
/// let margin: RootMargin = "-10% 20px".parse().unwrap();
/// assert_eq!(margin.top, MarginLength::Percent(-10.0));
/// assert_eq!(margin.left, MarginLength::Px(20.0));
/// assert_eq!(margin.to_string(), "-10% 20px -10% 20px");
///
/// assert!("10em".parse::<RootMargin>().is_err());
/// ```
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "String", into = "String")
)]
pub struct RootMargin {
    /// Top edge.
    pub top: MarginLength,
    /// Right edge.
    pub right: MarginLength,
    /// Bottom edge.
    pub bottom: MarginLength,
    /// Left edge.
    pub left: MarginLength,
}

impl RootMargin {
    /// No margin on any side.
    pub const ZERO: Self = Self::uniform(MarginLength::Px(0.0));

    /// Creates a margin with explicit sides.
    #[must_use]
    pub const fn new(
        top: MarginLength,
        right: MarginLength,
        bottom: MarginLength,
        left: MarginLength,
    ) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    /// Creates a margin with the same length on every side.
    #[must_use]
    pub const fn uniform(length: MarginLength) -> Self {
        Self::new(length, length, length, length)
    }

    /// Expands `root` by this margin.
    ///
    /// Percentages on the left and right resolve against the root's width;
    /// top and bottom resolve against its height.
    #[cfg(feature = "kurbo")]
    #[must_use]
    pub fn resolve(&self, root: kurbo::Rect) -> kurbo::Rect {
        let width = root.width();
        let height = root.height();
        kurbo::Rect::new(
            root.x0 - self.left.resolve(width),
            root.y0 - self.top.resolve(height),
            root.x1 + self.right.resolve(width),
            root.y1 + self.bottom.resolve(height),
        )
    }
}

impl fmt::Display for RootMargin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            self.top, self.right, self.bottom, self.left
        )
    }
}

impl FromStr for RootMargin {
    type Err = RevealError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let invalid = |reason| RevealError::InvalidRootMargin {
            input: input.to_string(),
            reason,
        };

        let mut sides = [MarginLength::default(); 4];
        let mut count = 0;
        for token in input.split_ascii_whitespace() {
            if count == sides.len() {
                return Err(invalid("expected at most four lengths"));
            }
            sides[count] = parse_length(token)
                .ok_or_else(|| invalid("lengths must be `<number>px`, `<number>%`, or `0`"))?;
            count += 1;
        }

        let [a, b, c, d] = sides;
        match count {
            0 => Err(invalid("expected at least one length")),
            1 => Ok(Self::uniform(a)),
            2 => Ok(Self::new(a, b, a, b)),
            3 => Ok(Self::new(a, b, c, b)),
            _ => Ok(Self::new(a, b, c, d)),
        }
    }
}

fn parse_length(token: &str) -> Option<MarginLength> {
    let (number, unit): (&str, fn(f64) -> MarginLength) =
        if let Some(number) = token.strip_suffix("px") {
            (number, MarginLength::Px)
        } else if let Some(number) = token.strip_suffix('%') {
            (number, MarginLength::Percent)
        } else {
            (token, MarginLength::Px)
        };

    let value: f64 = number.parse().ok()?;
    if !value.is_finite() {
        return None;
    }
    // Only zero may omit its unit.
    if number.len() == token.len() && value != 0.0 {
        return None;
    }
    Some(unit(value))
}

impl TryFrom<String> for RootMargin {
    type Error = RevealError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<RootMargin> for String {
    fn from(margin: RootMargin) -> Self {
        margin.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn px(v: f64) -> MarginLength {
        MarginLength::Px(v)
    }

    #[test]
    fn single_value_applies_to_all_sides() {
        let m: RootMargin = "12px".parse().unwrap();
        assert_eq!(m, RootMargin::uniform(px(12.0)));
    }

    #[test]
    fn css_shorthand_expansion() {
        let two: RootMargin = "1px 2px".parse().unwrap();
        assert_eq!(two, RootMargin::new(px(1.0), px(2.0), px(1.0), px(2.0)));

        let three: RootMargin = "1px 2px 3px".parse().unwrap();
        assert_eq!(three, RootMargin::new(px(1.0), px(2.0), px(3.0), px(2.0)));

        let four: RootMargin = "1px 2px 3px 4px".parse().unwrap();
        assert_eq!(four, RootMargin::new(px(1.0), px(2.0), px(3.0), px(4.0)));
    }

    #[test]
    fn bare_zero_and_extra_whitespace_are_accepted() {
        let m: RootMargin = "  0 \t -50px ".parse().unwrap();
        assert_eq!(m, RootMargin::new(px(0.0), px(-50.0), px(0.0), px(-50.0)));
    }

    #[test]
    fn rejects_malformed_input() {
        for bad in ["", "   ", "10", "10em", "px", "1px 2px 3px 4px 5px", "NaNpx", "infpx"] {
            let err = bad.parse::<RootMargin>().unwrap_err();
            assert!(
                matches!(err, RevealError::InvalidRootMargin { .. }),
                "{bad:?} should be rejected, got {err:?}"
            );
        }
    }

    #[test]
    fn display_is_canonical_four_value_form() {
        assert_eq!(RootMargin::ZERO.to_string(), "0px 0px 0px 0px");
        let m: RootMargin = "0px 0px -100px".parse().unwrap();
        assert_eq!(m.to_string(), "0px 0px -100px 0px");
        assert_eq!(m.to_string().parse::<RootMargin>().unwrap(), m);
    }

    #[test]
    fn percent_resolves_against_basis() {
        assert_eq!(MarginLength::Percent(25.0).resolve(400.0), 100.0);
        assert_eq!(MarginLength::Px(7.0).resolve(400.0), 7.0);
    }

    #[cfg(feature = "kurbo")]
    #[test]
    fn resolve_expands_root_rect() {
        use kurbo::Rect;

        let m: RootMargin = "10% 0px -20px 5px".parse().unwrap();
        let root = Rect::new(0.0, 0.0, 800.0, 600.0);
        assert_eq!(m.resolve(root), Rect::new(-5.0, -60.0, 800.0, 580.0));
    }
}
