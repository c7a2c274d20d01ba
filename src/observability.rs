// SPDX-License-Identifier: MIT
//! Tracing setup for embedding hosts.

use tracing::info;

/// Install the global tracing subscriber.
///
/// `filter` is an env-filter string such as `"info"` or
/// `"info,ghostline=debug"`; `format` is `"pretty"` (compact human output,
/// the default) or `"json"` (structured, for log aggregators). Call at most
/// once per process; hosts that already install their own subscriber should
/// skip this.
pub fn init_tracing(filter: &str, format: &str) {
    if format == "json" {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).compact().init();
    }
    info!(version = env!("CARGO_PKG_VERSION"), "ghostline tracing initialized");
}
