// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Loading observation settings from site configuration.

#![cfg(feature = "serde")]

use understory_reveal::{MarginLength, ObservationConfig, RootMargin, StaleDelay};

#[test]
fn partial_config_fills_defaults() {
    let config: ObservationConfig =
        serde_json::from_str(r#"{ "threshold": 0.3, "root_margin": "0px 0px -100px" }"#).unwrap();

    assert_eq!(config.threshold, 0.3);
    assert_eq!(config.root_margin.bottom, MarginLength::Px(-100.0));
    assert_eq!(config.root_margin.left, MarginLength::Px(0.0));
    assert!(config.trigger_once);
    assert_eq!(config.delay_ms, 0);
    assert_eq!(config.stale_delay, StaleDelay::Fire);
}

#[test]
fn margin_serializes_as_css_string() {
    let config = ObservationConfig::default()
        .with_root_margin("10%".parse().unwrap())
        .with_stale_delay(StaleDelay::CancelOnExit);
    let json = serde_json::to_value(config).unwrap();

    assert_eq!(json["root_margin"], "10% 10% 10% 10%");
    assert_eq!(json["stale_delay"], "cancel_on_exit");
}

#[test]
fn malformed_margin_is_rejected() {
    let err = serde_json::from_str::<RootMargin>(r#""12 px""#).unwrap_err();
    assert!(err.to_string().contains("invalid root margin"));
}
