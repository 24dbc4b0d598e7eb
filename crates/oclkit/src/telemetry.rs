// SPDX-License-Identifier: AGPL-3.0-or-later

//! Process-wide tracing setup.

use std::io::IsTerminal;
use std::sync::OnceLock;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Registry};

static INIT: OnceLock<()> = OnceLock::new();

/// Install the default subscriber: `RUST_LOG`-style filtering (falling back
/// to `info`) with ANSI colours only when stdout is a terminal.
///
/// Idempotent, and a subscriber installed by the embedding application
/// wins over ours.
pub fn init_tracing() {
    INIT.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let fmt_layer = fmt::layer()
            .with_target(true)
            .with_ansi(std::io::stdout().is_terminal());
        let _ = Registry::default().with(filter).with(fmt_layer).try_init();
    });
}
